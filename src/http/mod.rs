//! HTTP protocol layer module
//!
//! Response builders, MIME detection and `ETag` handling, independent of the
//! routes that use them.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_cached_response, build_html_response, build_json_response,
    build_options_response,
};
