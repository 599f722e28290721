//! Browser surface: query-string parsing, handlers and templates around the
//! pure `data::view::render`.

pub mod error;
pub mod handlers;
pub mod params;
pub mod templates;
