//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific
//! business logic: query-string parsing and response builders.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::QueryParams;
pub use response::{
    build_bad_request_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_options_response, build_text_response,
};
