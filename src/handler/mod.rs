//! Request handler module
//!
//! Route dispatch plus the three endpoints: the index page, the QWeb
//! template load and static assets.

pub mod index;
pub mod qweb;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
