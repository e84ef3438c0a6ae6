//! Chart Routes
//!
//! - GET / - The page as an HTML document
//! - GET /api/v1/scene - Scene summary
//! - GET /api/v1/records - Records of the last rendered pass
//! - POST /api/v1/resize - Host resize event
//! - POST /api/v1/reload - Refetch the dataset and render again

use axum::{extract::State, response::Html, Json};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::{PassResponse, RecordView, RecordsResponse, ResizeRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chart::CanvasSize;
use crate::session::SceneSummary;

/// GET /
pub async fn document(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut session = state.session.lock().await;
    session.tick(Instant::now());
    Html(session.document())
}

/// GET /api/v1/scene
pub async fn scene(State(state): State<Arc<AppState>>) -> Json<SceneSummary> {
    let mut session = state.session.lock().await;
    session.tick(Instant::now());
    Json(session.summary())
}

/// GET /api/v1/records
pub async fn records(State(state): State<Arc<AppState>>) -> ApiResult<Json<RecordsResponse>> {
    let session = state.session.lock().await;
    let records = session
        .records()
        .ok_or_else(|| ApiError::Conflict("No chart has been rendered yet".to_string()))?;

    Ok(Json(RecordsResponse {
        count: records.len(),
        records: records.iter().map(RecordView::from).collect(),
    }))
}

/// POST /api/v1/resize
///
/// Runs a full pass at the new size. The dataset comes from the cache when
/// an earlier pass succeeded.
pub async fn resize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResizeRequest>,
) -> ApiResult<Json<PassResponse>> {
    validate_dimension("width", request.width)?;
    validate_dimension("height", request.height)?;

    let size = CanvasSize::new(request.width, request.height);
    let (outcome, scene) = state.run_pass(Some(size), false).await;

    Ok(Json(PassResponse { outcome, scene }))
}

/// POST /api/v1/reload
pub async fn reload(State(state): State<Arc<AppState>>) -> Json<PassResponse> {
    let (outcome, scene) = state.run_pass(None, true).await;
    Json(PassResponse { outcome, scene })
}

fn validate_dimension(name: &str, value: f64) -> ApiResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimension() {
        assert!(validate_dimension("width", 800.0).is_ok());
        assert!(validate_dimension("width", 0.0).is_err());
        assert!(validate_dimension("height", -10.0).is_err());
        assert!(validate_dimension("height", f64::NAN).is_err());
    }
}
