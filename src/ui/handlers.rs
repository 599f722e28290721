//! HTTP handlers: each one turns the query string into a `FilterState` and
//! `TableQuery`, calls `render`, and presents the result.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use axum_extra::extract::Query;
use minijinja::context;
use serde::Serialize;

use super::error::AppError;
use super::params::DashboardParams;
use super::templates::{SCRIPT, STYLESHEET};
use crate::data::filter::FilterState;
use crate::data::model::CellValue;
use crate::data::view::{TableView, render};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
struct OptionItem {
    label: String,
    value: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct HeaderItem {
    name: String,
    /// "asc" / "desc" when the column takes part in the sort.
    sort: Option<&'static str>,
    /// 1-based position among several sort keys.
    sort_rank: Option<usize>,
    filter: String,
    filter_valid: bool,
}

/// A page row with its cells as display text.
#[derive(Debug, Serialize)]
struct RowItem {
    index: usize,
    cells: Vec<String>,
}

fn options(values: &[CellValue], selected: &std::collections::BTreeSet<CellValue>) -> Vec<OptionItem> {
    values
        .iter()
        .map(|v| OptionItem {
            label: v.to_string(),
            value: v.to_string(),
            selected: selected.contains(v),
        })
        .collect()
}

fn headers(view: &TableView) -> Vec<HeaderItem> {
    let ranked = view.sort_by.len() > 1;
    view.columns
        .iter()
        .map(|name| {
            let sort = view.sort_by.iter().position(|k| &k.column == name);
            let filter = view.column_filters.iter().find(|f| &f.column == name);
            HeaderItem {
                name: name.clone(),
                sort: sort.map(|i| if view.sort_by[i].descending { "desc" } else { "asc" }),
                sort_rank: sort.filter(|_| ranked).map(|i| i + 1),
                filter: filter.map(|f| f.expression.clone()).unwrap_or_default(),
                filter_valid: filter.map_or(true, |f| f.valid),
            }
        })
        .collect()
}

/// Cells go through `CellValue`'s `Display`, the same text the dropdown
/// options use.
fn rows(view: &TableView) -> Vec<RowItem> {
    view.rows
        .iter()
        .map(|row| RowItem {
            index: row.index,
            cells: row.cells.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

fn render_view(state: &SharedState, params: &DashboardParams) -> (FilterState, TableView) {
    let filters = params.filter_state(&state.dataset);
    let view = render(&state.dataset, &filters, &params.table_query());
    log::debug!(
        "Rendered {} of {} papers (page {}/{})",
        view.total_rows,
        state.dataset.len(),
        view.page + 1,
        view.page_count
    );
    (filters, view)
}

/// GET / - full page with the filter controls and the first table render
pub async fn index(
    State(state): State<SharedState>,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, AppError> {
    let (filters, view) = render_view(&state, &params);
    let page = state
        .templates
        .get_template("dashboard.html")
        .and_then(|t| {
            t.render(context! {
                title => params.title.as_deref().unwrap_or_default(),
                authors => params.authors.as_deref().unwrap_or_default(),
                year_options => options(state.dataset.year_options(), &filters.years),
                category_options => options(state.dataset.category_options(), &filters.categories),
                headers => headers(&view),
                rows => rows(&view),
                view => view,
                live_reload => state.debug,
            })
        })
        .map_err(|e| AppError::new(e, state.debug))?;
    Ok(Html(page))
}

/// GET /table - the table region only, fetched by the page script
pub async fn table(
    State(state): State<SharedState>,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, AppError> {
    let (_, view) = render_view(&state, &params);
    let fragment = state
        .templates
        .get_template("table.html")
        .and_then(|t| {
            t.render(context! {
                headers => headers(&view),
                rows => rows(&view),
                view => view,
            })
        })
        .map_err(|e| AppError::new(e, state.debug))?;
    Ok(Html(fragment))
}

/// GET /api/papers - the same view as JSON
pub async fn api_papers(
    State(state): State<SharedState>,
    Query(params): Query<DashboardParams>,
) -> Json<TableView> {
    Json(render_view(&state, &params).1)
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPT)
}

/// GET /_reload - boot id for the live-reload script, debug only
pub async fn reload(State(state): State<SharedState>) -> Result<String, StatusCode> {
    if state.debug {
        Ok(state.boot_id.clone())
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
