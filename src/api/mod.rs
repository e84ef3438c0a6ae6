//! Chart HTTP API
//!
//! Serves the chart page and forwards host and pointer events to the
//! session, built with Axum.
//!
//! # Endpoints
//!
//! ## Page
//! - `GET /` - The rendered HTML document
//! - `GET /api/v1/scene` - Scene summary
//! - `GET /api/v1/records` - Normalized records
//!
//! ## Host events
//! - `POST /api/v1/resize` - Resize the canvas and run a pass
//! - `POST /api/v1/reload` - Refetch the dataset and run a pass
//!
//! ## Pointer events
//! - `POST /api/v1/legend/:category/toggle` - Legend click
//! - `POST /api/v1/markers/:index/enter` - Hover a marker
//! - `POST /api/v1/markers/leave` - Leave the hovered marker
//! - `GET /api/v1/tooltip` - Tooltip state
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status
//!
//! The page at `GET /` is a snapshot of the scene. Its only wiring is a
//! short script that posts hover, leave and legend clicks to the pointer
//! event routes above and then refetches the page; any other client drives
//! the chart through those routes directly. Hovering a marker hidden by the
//! legend answers 404.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/scene", get(routes::chart::scene))
        .route("/records", get(routes::chart::records))
        .route("/resize", post(routes::chart::resize))
        .route("/reload", post(routes::chart::reload))
        .route("/legend/:category/toggle", post(routes::interact::toggle_legend))
        .route("/markers/leave", post(routes::interact::pointer_leave))
        .route("/markers/:index/enter", post(routes::interact::pointer_enter))
        .route("/tooltip", get(routes::interact::tooltip));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::chart::document))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Run the initial pass, then start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let (outcome, summary) = state.run_pass(None, false).await;
    tracing::info!(
        ?outcome,
        markers = summary.markers,
        "Initial pass finished"
    );

    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Chart server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Chart server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::fixtures::{sample_source, CountingSource};
    use crate::dataset::Loader;
    use crate::session::ChartSession;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let loader = Arc::new(Loader::new(Arc::new(sample_source())));
        let state = AppState::new(ChartSession::from_config(&Config::default()), loader);
        state.run_pass(None, false).await;
        build_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app().await;
        let response = send(&app, "GET", "/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app().await;
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["dataset"], "sample");
        assert_eq!(body["markers"], 5);
    }

    #[tokio::test]
    async fn test_document() {
        let app = create_test_app().await;
        let response = send(&app, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<svg class=\"canvas\""));
        assert!(html.contains("class=\"legend\""));
        assert!(html.contains("fetch(\"/api/v1\" + path"));
    }

    #[tokio::test]
    async fn test_records() {
        let app = create_test_app().await;
        let body = json(send(&app, "GET", "/api/v1/records", None).await).await;

        assert_eq!(body["count"], 5);
        assert_eq!(body["records"][0]["name"], "Marco Pantani");
        assert_eq!(body["records"][0]["time"], "36:50");
        assert_eq!(body["records"][0]["year"], 1995);
        assert_eq!(body["records"][0]["category"], "doping");
        assert_eq!(body["records"][2]["category"], "no-doping");
    }

    #[tokio::test]
    async fn test_resize_keeps_single_chart() {
        let app = create_test_app().await;

        let response = send(
            &app,
            "POST",
            "/api/v1/resize",
            Some(r#"{"width": 800, "height": 500}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["outcome"]["status"], "rendered");
        assert_eq!(body["scene"]["width"], 800.0);
        assert_eq!(body["scene"]["axis_groups"], 2);
        assert_eq!(body["scene"]["markers"], 5);
        assert_eq!(body["scene"]["legends"], 1);
    }

    #[tokio::test]
    async fn test_resize_rejects_bad_size() {
        let app = create_test_app().await;
        let response = send(
            &app,
            "POST",
            "/api/v1/resize",
            Some(r#"{"width": -1, "height": 500}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_resize_invalid_json() {
        let app = create_test_app().await;
        let response = send(&app, "POST", "/api/v1/resize", Some("not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legend_toggle() {
        let app = create_test_app().await;

        let body = json(send(&app, "POST", "/api/v1/legend/doping/toggle", None).await).await;
        assert_eq!(body["active"], false);
        assert_eq!(body["markers"], 3);

        let scene = json(send(&app, "GET", "/api/v1/scene", None).await).await;
        assert_eq!(scene["hidden_markers"], 3);

        let body = json(send(&app, "POST", "/api/v1/legend/doping/toggle", None).await).await;
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn test_legend_unknown_category() {
        let app = create_test_app().await;
        let response = send(&app, "POST", "/api/v1/legend/purple/toggle", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hover_and_leave() {
        let app = create_test_app().await;

        let body = json(send(&app, "POST", "/api/v1/markers/0/enter", None).await).await;
        assert_eq!(body["phase"], "visible");
        assert_eq!(body["hovered"], 0);
        assert_eq!(body["lines"][0], "Marco Pantani, ITA, #1");
        assert_eq!(body["placement"]["vertical"], "below");
        assert_eq!(body["placement"]["horizontal"], "right");

        let body = json(send(&app, "POST", "/api/v1/markers/leave", None).await).await;
        assert_eq!(body["phase"], "fading_out");
    }

    #[tokio::test]
    async fn test_hover_hidden_marker() {
        let app = create_test_app().await;
        send(&app, "POST", "/api/v1/legend/doping/toggle", None).await;

        let response = send(&app, "POST", "/api/v1/markers/0/enter", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let tooltip = json(send(&app, "GET", "/api/v1/tooltip", None).await).await;
        assert_eq!(tooltip["phase"], "hidden");
    }

    #[tokio::test]
    async fn test_hover_unknown_marker() {
        let app = create_test_app().await;
        let response = send(&app, "POST", "/api/v1/markers/42/enter", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_empty_page() {
        let loader = Arc::new(Loader::new(CountingSource::failing()));
        let state = AppState::new(ChartSession::from_config(&Config::default()), loader);
        state.run_pass(None, false).await;
        let app = build_router(state);

        let health = json(send(&app, "GET", "/health", None).await).await;
        assert_eq!(health["status"], "degraded");

        let scene = json(send(&app, "GET", "/api/v1/scene", None).await).await;
        assert_eq!(scene["markers"], 0);
        assert_eq!(scene["axis_groups"], 0);

        let response = send(&app, "POST", "/api/v1/markers/0/enter", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(&app, "GET", "/api/v1/records", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
