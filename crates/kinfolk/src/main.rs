//! `kinfolk` - CLI and web server for personal records
//!
//! This binary runs the web application and offers a few terminal commands
//! for searching the record store and inspecting configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use kinfolk::cli::{Cli, Command, ConfigCommand, OutputFormat, SearchCommand, ServeCommand};
use kinfolk::web::{self, AppState};
use kinfolk::{init_logging, Config, Person, PersonStore, Storage, UploadStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(&config, serve_cmd).await,
        Command::Search(search_cmd) => handle_search(&config, &search_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(config: &Config, cmd: ServeCommand) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(bind) = cmd.bind {
        config.server.bind_address = bind;
    }
    let addr = config.bind_address()?;

    let storage = Storage::open(config.database_path())?;
    let uploads = UploadStore::new(&config.storage.upload_dir);
    let state = AppState::new(Arc::new(storage), uploads, &config.server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let limit = cmd.limit.unwrap_or(config.server.page_size);
    let people = storage.search(&cmd.query, cmd.page, limit)?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&people)?),
        OutputFormat::Table => print_table(&people),
        OutputFormat::Plain => {
            for person in &people {
                println!(
                    "{}\t{}\t{}",
                    person.id.unwrap_or_default(),
                    person.full_name(),
                    person.gender.code()
                );
            }
        }
    }

    if people.is_empty() && cmd.format != OutputFormat::Json {
        println!("No people match \"{}\".", cmd.query);
    }
    Ok(())
}

fn print_table(people: &[Person]) {
    if people.is_empty() {
        return;
    }
    let name_width = people
        .iter()
        .map(|p| p.full_name().chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    println!(
        "{:>5}  {:<name_width$}  {:<6}  {:<11}  {}",
        "ID", "Name", "Gender", "Identity", "Birth date"
    );
    println!("{}", "-".repeat(5 + 2 + name_width + 2 + 6 + 2 + 11 + 2 + 10));
    for person in people {
        println!(
            "{:>5}  {:<name_width$}  {:<6}  {:<11}  {}",
            person.id.unwrap_or_default(),
            person.full_name(),
            person.gender.label(),
            person.identity_num,
            person.birth_date
        );
    }
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let count = storage.count()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "upload_dir": config.storage.upload_dir,
            "bind_address": config.server.bind_address,
            "people": count,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("kinfolk status");
        println!("--------------");
        println!("Database:      {}", storage.path().display());
        println!("Uploads:       {}", config.storage.upload_dir.display());
        println!("Bind address:  {}", config.server.bind_address);
        println!("People:        {count}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!("  Page size:          {}", config.server.page_size);
                println!("  Max upload bytes:   {}", config.server.max_upload_bytes);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!(
                    "  Upload dir:         {}",
                    config.storage.upload_dir.display()
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
