use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use minijinja::Environment;

use crate::config::Config;
use crate::data::model::Dataset;
use crate::ui::templates;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything a request handler needs. Built once at startup and never
/// mutated afterwards.
pub struct AppState {
    /// The loaded paper table.
    pub dataset: Dataset,

    /// Page and table templates.
    pub templates: Environment<'static>,

    /// Whether error details and live reload are enabled.
    pub debug: bool,

    /// Changes on every restart; the live-reload script polls it.
    pub boot_id: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(dataset: Dataset, config: &Config) -> Result<Self, minijinja::Error> {
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Ok(Self {
            dataset,
            templates: templates::environment()?,
            debug: config.debug,
            boot_id: format!("{}-{started}", std::process::id()),
        })
    }
}
