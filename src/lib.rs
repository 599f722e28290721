//! paper-table: a browser dashboard over a research paper table.
//!
//! The table is loaded once at startup (`data::loader`), then every request
//! maps the current control values through the pure `data::view::render`.

pub mod app;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
