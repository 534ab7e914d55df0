use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{Order, OrderId},
    error::{ApiError, ErrorCode},
    protocol::{
        CreateOrderRequest, OrderStatusQuery, OrderStatusResponse, TriggerTopupRequest,
        TriggerTopupResponse, CREATE_ORDER_PATH, ORDER_STATUS_PATH, TRIGGER_TOPUP_PATH,
    },
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{sandbox_fail_route, sandbox_pay_route, ApiContext};
use app_state::AppState;
use config::load_settings;

const MAX_REQUEST_BYTES: usize = 16 * 1024;

type ApiRejection = (StatusCode, Json<ApiError>);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SandboxFailQuery {
    order_id: OrderId,
    detail: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let public_url = settings.public_url();
    let api = ApiContext::new(public_url.clone(), settings.auto_pay_after_polls);
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        %public_url,
        auto_pay_after_polls = ?settings.auto_pay_after_polls,
        "sandbox storefront backend listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("sandbox storefront backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(CREATE_ORDER_PATH, post(http_create_order))
        .route(ORDER_STATUS_PATH, get(http_order_status))
        .route(TRIGGER_TOPUP_PATH, post(http_trigger_topup))
        .route(sandbox_pay_route(), get(sandbox_pay))
        .route(sandbox_fail_route(), get(sandbox_fail))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

fn status_for(code: Option<ErrorCode>) -> StatusCode {
    match code {
        Some(ErrorCode::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorCode::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::Conflict) => StatusCode::CONFLICT,
        Some(ErrorCode::Internal) | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> ApiRejection {
    let status = status_for(err.code);
    warn!(%status, message = ?err.message, "sandbox request rejected");
    (status, Json(err))
}

fn reject_json(rejection: JsonRejection) -> ApiRejection {
    reject(ApiError::new(ErrorCode::Validation, rejection.body_text()))
}

fn reject_query(rejection: QueryRejection) -> ApiRejection {
    reject(ApiError::new(ErrorCode::Validation, rejection.body_text()))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiRejection> {
    let Json(req) = payload.map_err(reject_json)?;
    api::create_order(&state.api, req)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_order_status(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OrderStatusQuery>, QueryRejection>,
) -> Result<Json<OrderStatusResponse>, ApiRejection> {
    let Query(query) = query.map_err(reject_query)?;
    api::order_status(&state.api, &query.order_id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_trigger_topup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TriggerTopupRequest>, JsonRejection>,
) -> Result<Json<TriggerTopupResponse>, ApiRejection> {
    let Json(req) = payload.map_err(reject_json)?;
    api::trigger_topup(&state.api, &req.order_id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn sandbox_pay(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OrderStatusQuery>, QueryRejection>,
) -> Result<Html<String>, ApiRejection> {
    let Query(query) = query.map_err(reject_query)?;
    let status = api::mark_paid(&state.api, &query.order_id)
        .await
        .map_err(reject)?;
    Ok(Html(format!(
        "<h1>FPX sandbox</h1><p>Order {} status: {status}. Kembali ke storefront.</p>",
        query.order_id
    )))
}

async fn sandbox_fail(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SandboxFailQuery>, QueryRejection>,
) -> Result<Html<String>, ApiRejection> {
    let Query(query) = query.map_err(reject_query)?;
    let status = api::mark_failed(&state.api, &query.order_id, query.detail)
        .await
        .map_err(reject)?;
    Ok(Html(format!(
        "<h1>FPX sandbox</h1><p>Order {} status: {status}.</p>",
        query.order_id
    )))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
