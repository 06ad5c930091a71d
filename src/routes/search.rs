use crate::models::filter::{FilterState, SearchMode};
use crate::models::responses::{BookTile, PageView, SearchResponse};
use crate::routes::AppState;
use crate::services::controller::{FetchStatus, ResultController};
use crate::services::query::build_request;
use crate::utils::input::{parse_toggle, sanitize_language, sanitize_year};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub mode: Option<String>,
    pub q: Option<String>,
    pub year_start: Option<String>,
    pub year_end: Option<String>,
    pub language: Option<String>,
    pub ebooks: Option<String>,
    pub page: Option<u32>,
}

fn filters_from_params(params: &SearchParams) -> Result<FilterState, StatusCode> {
    let mut filters = FilterState::empty();

    if let Some(ref mode) = params.mode {
        let mode: SearchMode = mode.parse().map_err(|e| {
            warn!("{}", e);
            StatusCode::BAD_REQUEST
        })?;
        filters.set_mode(mode);
    }
    if let Some(ref q) = params.q {
        filters.set_query(q.as_str());
    }
    filters.set_year_start(params.year_start.as_deref().and_then(sanitize_year));
    filters.set_year_end(params.year_end.as_deref().and_then(sanitize_year));
    filters.set_language(params.language.as_deref().and_then(sanitize_language));
    if let Some(ref ebooks) = params.ebooks {
        let ebooks = parse_toggle(ebooks).ok_or(StatusCode::BAD_REQUEST)?;
        filters.set_ebooks_only(ebooks);
    }

    // page last: every other setter puts it back to 1
    filters.set_page(params.page.unwrap_or(1));

    Ok(filters)
}

pub async fn search_books(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, StatusCode> {
    info!("Search query: {:?}", params);

    let filters = filters_from_params(&params)?;
    let spec = build_request(&state.config.api_url, &filters);

    let mut controller = ResultController::new();
    let (status, error) = match controller.refresh(&spec, state.transport.as_ref()).await {
        FetchStatus::Error(message) => ("error", Some(message.clone())),
        _ => ("success", None),
    };

    let page = controller.page();
    let results = page
        .items
        .iter()
        .cloned()
        .map(|book| BookTile::new(book, &state.config.covers_url, &state.config.site_url))
        .collect();

    Ok(Json(SearchResponse {
        request: spec.url().to_string(),
        status: status.to_string(),
        error,
        pagination: PageView::from(page),
        results,
    }))
}
