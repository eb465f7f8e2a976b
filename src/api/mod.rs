//! HTTP surface of the service.
//!
//! Two routes: a config write and a status read. CORS is open to every
//! origin with credentials, and any OPTIONS request succeeds with an empty body.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    routing::{get, post},
};
use chrono::SecondsFormat;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::model::Status;
use crate::service::WidgetService;

mod dto;
pub use dto::{ConfigRequest, ConfigResponse, StatusResponse, coerce_slots};

mod error;
pub use error::{ApiError, ApiResult};

/// Build the application router.
pub fn router(service: WidgetService) -> Router {
    Router::new()
        .route("/api/config", post(set_config).options(preflight))
        .route(
            "/api/status/{widget_id}",
            get(get_status).options(preflight),
        )
        .fallback(fallback)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the router on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, service: WidgetService) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "slot counter listening");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn cors_layer() -> CorsLayer {
    // Mirroring the origin admits every caller while staying valid with credentials.
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn set_config(
    State(service): State<WidgetService>,
    request: ConfigRequest,
) -> ApiResult<Json<ConfigResponse>> {
    let widget = request.widget_id.unwrap_or_default();
    let record = service.configure(&widget, request.total, request.sold)?;

    Ok(Json(ConfigResponse {
        message: "Configuration saved".to_string(),
        data: record,
    }))
}

async fn get_status(
    State(service): State<WidgetService>,
    Path(widget): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    match service.status(&widget)? {
        Status::Available {
            remaining,
            total,
            timestamp,
        } => Ok(Json(StatusResponse {
            remaining,
            total,
            last_updated: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
        Status::Revoked => Err(ApiError::forbidden(
            "Service unavailable or access revoked",
        )),
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> StatusCode {
    if method == Method::OPTIONS {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}
