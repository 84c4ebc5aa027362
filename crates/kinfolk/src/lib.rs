//! `kinfolk` - A small web application for personal records and parent links
//!
//! This library provides the person model and its validation rules, the
//! `SQLite` record store with name search, photo upload storage, and the
//! axum router that serves the add/edit/search pages.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod person;
pub mod storage;
pub mod uploads;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use person::{Gender, Person, PersonDraft, ValidationError};
pub use storage::{PersonStore, Storage};
pub use uploads::UploadStore;
