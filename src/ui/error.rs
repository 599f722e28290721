use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// A failure while producing a page. Only template rendering can fail once
/// the dataset is loaded.
#[derive(Debug)]
pub struct AppError {
    source: anyhow::Error,
    verbose: bool,
}

impl AppError {
    pub fn new(source: impl Into<anyhow::Error>, verbose: bool) -> Self {
        Self {
            source: source.into(),
            verbose,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {:#}", self.source);
        let body = if self.verbose {
            format!("{:?}", self.source)
        } else {
            "Internal Server Error".to_string()
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
