//! Async HTTP client for the Starc document API.
//!
//! Every authenticated call attaches the bearer token read from the shared
//! [`starc_core::Session`]. A `401` triggers one token refresh shared by all
//! concurrent callers, then a single retry.

mod account;
mod auth;
mod client;
mod documents;
/// API error type and error taxonomy.
pub mod error;
mod files;
mod history;
mod rewrite;
/// URL helpers for API endpoints.
pub mod url;

pub use client::ApiClient;
pub use error::{ApiError, ErrorClass};
pub use files::is_pdf_path;
pub use starc_core::models;
