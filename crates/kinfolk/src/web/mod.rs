//! Web interface for kinfolk.
//!
//! Routes:
//!
//! | Method | Path         | Action                                  |
//! |--------|--------------|-----------------------------------------|
//! | GET    | `/`          | landing page                            |
//! | GET    | `/add`       | creation form                           |
//! | POST   | `/add`       | create a person, redirect to `/`        |
//! | GET    | `/search`    | landing page with `q` matches           |
//! | GET    | `/edit/:id`  | edit form                               |
//! | POST   | `/edit/:id`  | update a person, redirect to `/`        |
//! | GET    | `/uploads/*` | uploaded photos                         |
//!
//! Every error reaching a handler boundary becomes a 500 response carrying
//! `{"error": "<message>"}`.

pub mod form;
pub mod views;

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::person::Person;
use crate::storage::{Page, PersonStore};
use crate::uploads::{UploadStore, PUBLIC_PREFIX};

use self::form::PersonForm;
use self::views::SearchResults;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<dyn PersonStore>,
    uploads: UploadStore,
    page_size: u32,
    max_upload_bytes: usize,
}

impl AppState {
    /// Bundle a store and an upload directory with the server settings.
    #[must_use]
    pub fn new(store: Arc<dyn PersonStore>, uploads: UploadStore, server: &ServerConfig) -> Self {
        Self {
            store,
            uploads,
            page_size: server.page_size,
            max_upload_bytes: server.max_upload_bytes,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(AnyOrigin).allow_methods([
        Method::POST,
        Method::GET,
        Method::OPTIONS,
        Method::PUT,
        Method::DELETE,
    ]);

    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form).post(add_person))
        .route("/search", get(search))
        .route("/edit/:id", get(edit_form).post(edit_person))
        .nest_service(
            &format!("/{PUBLIC_PREFIX}"),
            ServeDir::new(state.uploads.dir()),
        )
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_validation() || self.is_not_found() {
            warn!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }
        error_response(&self.to_string())
    }
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    error_response("an internal error occurred")
}

/// 302 back to the landing page.
fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| Error::InvalidId(raw.to_string()))
}

async fn index() -> Html<String> {
    Html(views::index(None))
}

async fn add_form() -> Html<String> {
    Html(views::add_form())
}

async fn add_person(State(state): State<AppState>, request: Request) -> Result<Response> {
    let form = PersonForm::extract(request).await?;
    let mut person = form.draft.into_person()?;

    let saved = match &form.photo {
        Some(photo) => Some(state.uploads.save(&photo.file_name, &photo.bytes).await?),
        None => None,
    };
    if let Some(path) = &saved {
        person.photo_path.clone_from(path);
    }

    let name = person.full_name();
    match with_store(&state, move |store| store.create(&person)).await {
        Ok(id) => {
            info!("Created person {} ({})", id, name);
            Ok(redirect_home())
        }
        Err(e) => {
            discard_upload(&state, saved).await;
            Err(e)
        }
    }
}

/// Query string of `/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Name fragment.
    #[serde(default)]
    pub q: String,
    /// One-based page number, as sent.
    pub page: Option<String>,
}

impl SearchParams {
    /// The requested page number; missing or blank means the first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] if `page` is not an unsigned integer.
    pub fn page_number(&self) -> Result<u32> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::form(format!("invalid page number: {raw}"))),
        }
    }
}

async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Html<String>> {
    let Query(params) = params.map_err(|rejection| Error::form(rejection.body_text()))?;
    if params.q.is_empty() {
        return Ok(Html(views::index(None)));
    }

    let page = Page::new(params.page_number()?, state.page_size);
    let term = params.q.clone();
    let people =
        with_store(&state, move |store| store.search(&term, page.number, page.size)).await?;
    let results = SearchResults {
        query: &params.q,
        page,
        people: &people,
    };
    Ok(Html(views::index(Some(&results))))
}

async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let person = with_store(&state, move |store| store.get_by_id(id)).await?;
    Ok(Html(views::edit_form(&person)))
}

async fn edit_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response> {
    let id = parse_id(&id)?;
    info!("Update requested for person {}", id);

    let form = PersonForm::extract(request).await?;
    let mut person: Person = with_store(&state, move |store| store.get_by_id(id)).await?;
    person.apply(&form.draft)?;

    let saved = match &form.photo {
        Some(photo) => Some(state.uploads.save(&photo.file_name, &photo.bytes).await?),
        None => None,
    };
    if let Some(path) = &saved {
        person.photo_path.clone_from(path);
    }

    match with_store(&state, move |store| store.update(&person)).await {
        Ok(()) => Ok(redirect_home()),
        Err(e) => {
            discard_upload(&state, saved).await;
            Err(e)
        }
    }
}

/// Run a store call on the blocking thread pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&dyn PersonStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| Error::internal(format!("store task failed: {e}")))?
}

/// Remove a photo saved for a write that then failed.
async fn discard_upload(state: &AppState, saved: Option<String>) {
    if let Some(path) = saved {
        state.uploads.remove(&path).await;
    }
}
