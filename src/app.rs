use std::sync::Arc;
use std::time::Instant;

use axum::{Router, extract::Request, middleware::{self, Next}, response::Response, routing::get};
use tower_http::compression::CompressionLayer;

use crate::state::{AppState, SharedState};
use crate::ui::handlers::{api_papers, index, reload, script, stylesheet, table};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Page and the table fragment it re-fetches on every control change
        .route("/", get(index))
        .route("/table", get(table))
        .route("/api/papers", get(api_papers))

        // Embedded assets
        .route("/assets/dashboard.css", get(stylesheet))
        .route("/assets/dashboard.js", get(script))
        .route("/_reload", get(reload))

        // Middleware
        .layer(middleware::from_fn(log_request))
        .layer(CompressionLayer::new())
        .with_state(shared)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    log::debug!(
        "{method} {uri} -> {} in {:?}",
        response.status(),
        started.elapsed()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use tempfile::TempDir;

    use crate::config::Config;
    use crate::data::loader::load_file;
    use crate::data::model::{Dataset, tests::papers};

    fn router_for(dataset: Dataset, debug: bool) -> Router {
        let config = Config {
            data: "papers.csv".into(),
            addr: "127.0.0.1:0".parse().unwrap(),
            debug,
        };
        build_router(AppState::new(dataset, &config).unwrap())
    }

    fn router(debug: bool) -> Router {
        let dataset = papers(&[
            ("Deep Learning Basics", "A. Smith", 2020, "ML"),
            ("Shallow Parsing", "B. Lee", 2021, "NLP"),
            ("<b>Bold</b> Claims", "C. Doe", 2019, "ML"),
        ]);
        router_for(dataset, debug)
    }

    fn router_from_file(name: &str, contents: &str) -> Router {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        router_for(load_file(&path).unwrap(), false)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn index_renders_controls_and_table() {
        let (status, body) = get(router(false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Research Papers Table"));
        assert!(body.contains(r#"placeholder="Search by title...""#));
        assert!(body.contains(r#"<option value="2019">2019</option>"#));
        assert!(body.contains("Shallow Parsing"));
        assert!(body.contains(r#"data-live-reload="false""#));
    }

    #[tokio::test]
    async fn index_keeps_selected_options() {
        let (_, body) = get(router(false), "/?year=2021&category=NLP").await;
        assert!(body.contains(r#"<option value="2021" selected>2021</option>"#));
        assert!(body.contains(r#"<option value="NLP" selected>NLP</option>"#));
        assert!(body.contains(r#"<option value="ML">ML</option>"#));
    }

    #[tokio::test]
    async fn table_fragment_applies_filters() {
        let (status, body) = get(router(false), "/table?title=DEEP").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Deep Learning Basics"));
        assert!(!body.contains("Shallow Parsing"));
        assert!(!body.contains("<html"));
    }

    #[tokio::test]
    async fn cells_are_escaped() {
        let (_, body) = get(router(false), "/table").await;
        assert!(body.contains("&lt;b&gt;Bold"));
        assert!(!body.contains("<b>Bold</b>"));
    }

    #[tokio::test]
    async fn api_returns_json_view() {
        let (status, body) = get(router(false), "/api/papers?year=2021&year=2019&sort=year").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_rows"], 2);
        assert_eq!(json["page_size"], 10);
        assert_eq!(json["rows"][0]["cells"][2], 2019);
        assert_eq!(json["rows"][1]["cells"][0], "Shallow Parsing");
    }

    #[tokio::test]
    async fn nonsense_inputs_give_empty_result() {
        let (status, body) = get(router(false), "/api/papers?year=abc&page=-3").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_rows"], 0);
        assert_eq!(json["columns"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn repeated_renders_are_identical() {
        let uri = "/table?authors=smith&sort=title:desc&filter=year%3D%3E2000";
        let (_, first) = get(router(false), uri).await;
        let (_, second) = get(router(false), uri).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn reload_only_in_debug() {
        let (status, _) = get(router(false), "/_reload").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(router(true), "/_reload").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());

        let (_, page) = get(router(true), "/").await;
        assert!(page.contains(r#"data-live-reload="true""#));
    }

    #[tokio::test]
    async fn assets_have_content_types() {
        let response = router(false)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/assets/dashboard.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );

        let (status, css) = get(router(false), "/assets/dashboard.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(css.contains("text-overflow: ellipsis"));
    }

    #[tokio::test]
    async fn text_years_select_rows() {
        let json = r#"[
            {"title": "Deep Learning Basics", "authors": "A. Smith", "year": "2020", "category": "1"},
            {"title": "Shallow Parsing", "authors": "B. Lee", "year": "2021", "category": "2"}
        ]"#;
        let app = router_from_file("papers.json", json);

        let (_, body) = get(app.clone(), "/api/papers?year=2020").await;
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(view["total_rows"], 1);
        assert_eq!(view["rows"][0]["cells"][2], "2020");

        let (_, body) = get(app.clone(), "/api/papers?category=2").await;
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(view["total_rows"], 1);
        assert_eq!(view["rows"][0]["cells"][0], "Shallow Parsing");

        let (_, page) = get(app, "/?year=2020").await;
        assert!(page.contains(r#"<option value="2020" selected>2020</option>"#));
    }

    #[tokio::test]
    async fn float_years_select_rows_and_read_the_same_everywhere() {
        let csv = "title,authors,year,category\n\
                   Deep Learning Basics,A. Smith,2020.0,0.5\n\
                   Shallow Parsing,B. Lee,2021.0,1.5\n";
        let app = router_from_file("papers.csv", csv);

        let (_, body) = get(app.clone(), "/api/papers?year=2021.0&category=1.5").await;
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(view["total_rows"], 1);
        assert_eq!(view["rows"][0]["cells"][0], "Shallow Parsing");

        let (_, page) = get(app, "/?year=2021.0").await;
        assert!(page.contains(r#"<option value="2021.0" selected>2021.0</option>"#));
        assert!(page.contains(r#"<option value="2020.0">2020.0</option>"#));
        assert!(page.contains(r#"<td contenteditable="true">2021.0</td>"#));
    }
}
