//! A small HTTP server for a QWeb-based single page application.
//!
//! `/` serves the application's HTML page, `/loadqweb` returns the
//! application's XML templates merged into one document, and the static
//! directory is mounted under its configured prefix.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod templates;
