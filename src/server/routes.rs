//! Route handlers

use super::request::{ErrorResponse, RequestError, ScrapeRequest, ScrapeResponse};
use super::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// `GET /` - static service description
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Flipkart Scraper API",
        "endpoints": {
            "POST /scrape": "Scrape Flipkart search results"
        },
        "status": "Running"
    }))
}

/// `POST /scrape` - scrape a search page and enrich its products
///
/// Returns 400 on validation failure, 500 with the partial log when the search
/// page cannot be fetched or parsed, and 200 with products and logs otherwise.
pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        // A body sent without a JSON content type carries no fields
        Err(JsonRejection::MissingJsonContentType(_)) => ScrapeRequest::default(),
        Err(rejection) => return RequestError::InvalidBody(rejection.body_text()).into_response(),
    };

    let (url, limit) = match request.validate(state.default_limit) {
        Ok(validated) => validated,
        Err(e) => return e.into_response(),
    };

    let log = state.coordinator.new_log();
    match state.coordinator.run_and_flush(&url, limit, &log).await {
        Ok(products) => Json(ScrapeResponse {
            products,
            logs: log.entries(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                logs: Some(log.entries()),
            }),
        )
            .into_response(),
    }
}
