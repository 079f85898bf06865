// HTTP handlers - HTML pages and a small JSON API over the account book

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::{AccountBook, Entry, Summary};
use crate::error::{RenderError, StorageError};
use crate::template::{ListTemplate, SummaryTemplate};

/// Number of entries shown on the list page
pub const RECENT_ENTRIES: usize = 10;

/// Shared application state
///
/// The templates are built once and never mutated, so they are shared
/// without a lock. The connection is used by one request at a time.
#[derive(Clone)]
pub struct AppState {
    book: Arc<Mutex<AccountBook>>,
    list_template: Arc<ListTemplate>,
    summary_template: Arc<SummaryTemplate>,
}

impl AppState {
    pub fn new(book: AccountBook) -> Result<Self, RenderError> {
        Ok(Self {
            book: Arc::new(Mutex::new(book)),
            list_template: Arc::new(ListTemplate::new()?),
            summary_template: Arc::new(SummaryTemplate::new()?),
        })
    }
}

/// Terminal error boundary for handlers.
///
/// The client only sees a generic 500 message; the cause goes to the log.
#[derive(Debug)]
pub enum AppError {
    Storage(StorageError),
    Render(RenderError),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Storage(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Storage(e) => {
                error!(error = %e, "account book query failed");
                "Internal Server Error: failed to read the account book"
            }
            AppError::Render(e) => {
                error!(error = %e, "page rendering failed");
                "Internal Server Error: failed to render the page"
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Summary with the derived average filled in
#[derive(Serialize)]
struct SummaryResponse {
    category: String,
    count: i64,
    sum: i64,
    average: f64,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            average: summary.average(),
            category: summary.category,
            count: summary.count,
            sum: summary.sum,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    pub category: String,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct EntriesParams {
    pub limit: Option<usize>,
}

// ============================================================================
// Pages
// ============================================================================

/// GET / - Latest entries
pub async fn list_entries(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let entries = state.book.lock().list_recent(RECENT_ENTRIES)?;
    let page = state.list_template.render(&entries)?;

    Ok(Html(page))
}

/// GET /summary - Totals per category
pub async fn list_summaries(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let summaries = state.book.lock().list_summaries()?;
    let page = state.summary_template.render(&summaries)?;

    Ok(Html(page))
}

/// POST /save - Add an entry from the list page form
pub async fn save_entry(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<Redirect, AppError> {
    let id = state.book.lock().add_entry(&form.category, form.price)?;
    info!(id, category = %form.category, price = form.price, "saved entry");

    Ok(Redirect::to("/"))
}

// ============================================================================
// API
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/entries?limit=N - Latest entries as JSON
async fn api_entries(
    State(state): State<AppState>,
    Query(params): Query<EntriesParams>,
) -> Result<Json<ApiResponse<Vec<Entry>>>, AppError> {
    let limit = params.limit.unwrap_or(RECENT_ENTRIES);
    let entries = state.book.lock().list_recent(limit)?;

    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/summaries - Per-category aggregates as JSON
async fn api_summaries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SummaryResponse>>>, AppError> {
    let summaries = state.book.lock().list_summaries()?;
    let response = summaries.into_iter().map(SummaryResponse::from).collect();

    Ok(Json(ApiResponse::ok(response)))
}

/// Routes for the HTML pages and the JSON API
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/entries", get(api_entries))
        .route("/summaries", get(api_summaries));

    Router::new()
        .route("/", get(list_entries))
        .route("/summary", get(list_summaries))
        .route("/save", post(save_entry))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn create_test_state(entries: &[(&str, i64)]) -> AppState {
        let book = AccountBook::open_in_memory().unwrap();
        book.ensure_schema().unwrap();
        for (category, price) in entries {
            book.add_entry(category, *price).unwrap();
        }
        AppState::new(book).unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_page_with_entries() {
        let state = create_test_state(&[("food", 500), ("transport", 230), ("books", 1800)]);

        let (status, body) = send(state, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Latest 3 entries"));
        assert_eq!(body.matches("<tr><td>").count(), 3);
        assert!(body.contains("<tr><td>food</td><td>500 yen</td></tr>"));
    }

    #[tokio::test]
    async fn test_list_page_shows_newest_ten() {
        let entries: Vec<(&str, i64)> = (1..=12).map(|price| ("misc", price)).collect();
        let state = create_test_state(&entries);

        let (status, body) = send(state, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Latest 10 entries"));
        assert!(body.contains("<td>12 yen</td>"));
        assert!(!body.contains("<td>2 yen</td>"));
    }

    #[tokio::test]
    async fn test_list_page_empty() {
        let state = create_test_state(&[]);

        let (status, body) = send(state, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("no data"));
        assert!(!body.contains("<table"));
    }

    #[tokio::test]
    async fn test_list_page_store_failure() {
        // No schema, so the query is rejected
        let book = AccountBook::open_in_memory().unwrap();
        let state = AppState::new(book).unwrap();

        let response = router(state).oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("<table"));
        assert!(!body.contains("no such table"));
    }

    #[tokio::test]
    async fn test_summary_page() {
        let state = create_test_state(&[("food", 100), ("food", 300), ("transport", 50)]);

        let (status, body) = send(state, get_request("/summary")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<tr><td>food</td><td>2</td><td>400 yen</td><td>200.00 yen</td></tr>"));
        assert!(body.contains("<tr><td>transport</td><td>1</td><td>50 yen</td><td>50.00 yen</td></tr>"));
    }

    #[tokio::test]
    async fn test_save_entry_redirects() {
        let state = create_test_state(&[]);
        let request = Request::builder()
            .method("POST")
            .uri("/save")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("category=food&price=500"))
            .unwrap();

        let response = router(state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let entries = state.book.lock().list_recent(1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "food");
        assert_eq!(entries[0].price, 500);
    }

    #[tokio::test]
    async fn test_save_entry_rejects_bad_price() {
        let state = create_test_state(&[]);
        let request = Request::builder()
            .method("POST")
            .uri("/save")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("category=food&price=lots"))
            .unwrap();

        let response = router(state.clone()).oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(state.book.lock().count_entries().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_api_entries_limit() {
        let state = create_test_state(&[("a", 1), ("b", 2), ("c", 3)]);

        let (status, body) = send(state, get_request("/api/entries?limit=2")).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["category"], "c");
        assert_eq!(data[1]["category"], "b");
    }

    #[tokio::test]
    async fn test_api_summaries() {
        let state = create_test_state(&[("food", 100), ("food", 300)]);

        let (status, body) = send(state, get_request("/api/summaries")).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"][0]["category"], "food");
        assert_eq!(json["data"][0]["count"], 2);
        assert_eq!(json["data"][0]["sum"], 400);
        assert_eq!(json["data"][0]["average"], 200.0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = create_test_state(&[]);

        let (status, body) = send(state, get_request("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"OK\""));
    }
}
