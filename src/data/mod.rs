//! Data layer: core types, loading, filtering and table views.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → Dataset (once, at startup)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset  │  Vec<Record>, column order, dropdown options
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  title / authors / year / category → row indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   view   │  header filters, sort, paginate → TableView
//!   └──────────┘
//! ```
//!
//! Nothing in here knows about HTTP.

pub mod column_filter;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
