use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{Currency, OrderDraft, OrderId, OrderStatus},
    protocol::CreateOrderRequest,
};
use tokio::net::TcpListener;

use crate::{
    backend::{HttpStorefrontBackend, StorefrontBackend},
    controller::{FlowEvent, OrderFlowController},
    error::StorefrontError,
    messages,
    poller::{OrderStatusPoller, PollConfig, PollOutcome},
    topup::TopupOutcome,
};

#[derive(Clone, Default)]
struct ServerState {
    create_bodies: Arc<Mutex<Vec<Value>>>,
    status_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    topup_bodies: Arc<Mutex<Vec<Value>>>,
    statuses: Arc<Mutex<Vec<&'static str>>>,
}

async fn handle_create_order(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .create_bodies
        .lock()
        .expect("bodies lock")
        .push(body.clone());
    match body["playerId"].as_str() {
        Some("blocked") => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Player diblokir" })),
        ),
        Some("silent") => (StatusCode::BAD_REQUEST, Json(json!({}))),
        _ => (
            StatusCode::OK,
            Json(json!({ "orderId": "ORD-42", "payUrl": "https://pay.test/ORD-42" })),
        ),
    }
}

async fn handle_order_status(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state
        .status_queries
        .lock()
        .expect("queries lock")
        .push(query);
    let mut statuses = state.statuses.lock().expect("statuses lock");
    let status = if statuses.is_empty() {
        "pending"
    } else {
        statuses.remove(0)
    };
    match status {
        "busy" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "db busy" })),
        )
            .into_response(),
        "gateway" => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
        _ => Json(json!({ "status": status })).into_response(),
    }
}

async fn handle_trigger_topup(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .topup_bodies
        .lock()
        .expect("bodies lock")
        .push(body.clone());
    if body["orderId"] == "ORD-unpaid" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Order belum dibayar" })),
        );
    }
    (StatusCode::OK, Json(json!({ "status": "delivered" })))
}

async fn spawn_storefront_server(state: ServerState) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/create-order", post(handle_create_order))
        .route("/api/order-status", get(handle_order_status))
        .route("/api/trigger-topup", post(handle_trigger_topup))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn request(player_id: &str) -> CreateOrderRequest {
    CreateOrderRequest::from(&OrderDraft {
        player_id: player_id.to_string(),
        zone: 3,
        package_code: "MLBB_86".to_string(),
        quantity: 2,
        currency: Currency::Myr,
    })
}

#[tokio::test]
async fn create_order_posts_camel_case_body() {
    let state = ServerState::default();
    let url = spawn_storefront_server(state.clone()).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let order = backend
        .create_order(&request("123456789"))
        .await
        .expect("order");

    assert_eq!(order.order_id, OrderId::from("ORD-42"));
    assert_eq!(order.pay_url.as_deref(), Some("https://pay.test/ORD-42"));
    let bodies = state.create_bodies.lock().expect("bodies lock");
    assert_eq!(
        bodies[0],
        json!({
            "playerId": "123456789",
            "zone": 3,
            "packageCode": "MLBB_86",
            "qty": 2,
            "currency": "MYR",
        })
    );
}

#[tokio::test]
async fn create_order_error_prefers_backend_message() {
    let url = spawn_storefront_server(ServerState::default()).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let err = backend
        .create_order(&request("blocked"))
        .await
        .expect_err("forbidden");
    assert_eq!(err.backend_status(), Some(403));
    assert_eq!(err.to_string(), "Player diblokir");

    let err = backend
        .create_order(&request("silent"))
        .await
        .expect_err("bad request");
    assert_eq!(err.backend_status(), Some(400));
    assert_eq!(err.to_string(), messages::CREATE_ORDER_FAILED);
}

#[tokio::test]
async fn order_status_sends_order_id_query() {
    let state = ServerState::default();
    state.statuses.lock().expect("statuses lock").push("paid");
    let url = spawn_storefront_server(state.clone()).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let response = backend
        .order_status(&OrderId::from("ORD 42/x"))
        .await
        .expect("status");

    assert_eq!(response.status, Some(OrderStatus::Paid));
    let queries = state.status_queries.lock().expect("queries lock");
    assert_eq!(queries[0].get("orderId").map(String::as_str), Some("ORD 42/x"));
}

#[tokio::test]
async fn order_status_error_body_reads_as_pending() {
    let state = ServerState::default();
    state.statuses.lock().expect("statuses lock").push("busy");
    let url = spawn_storefront_server(state).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let response = backend
        .order_status(&OrderId::from("ORD-42"))
        .await
        .expect("readable error body");

    assert_eq!(response.status, None);
}

#[tokio::test]
async fn order_status_unreadable_error_body_is_backend_error() {
    let state = ServerState::default();
    state.statuses.lock().expect("statuses lock").push("gateway");
    let url = spawn_storefront_server(state).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let err = backend
        .order_status(&OrderId::from("ORD-42"))
        .await
        .expect_err("plain text body");

    assert_eq!(err.backend_status(), Some(502));
}

#[tokio::test]
async fn poll_keeps_going_after_unavailable_status_reply() {
    let state = ServerState::default();
    state
        .statuses
        .lock()
        .expect("statuses lock")
        .extend(["busy", "paid"]);
    let url = spawn_storefront_server(state.clone()).await;
    let backend: Arc<dyn StorefrontBackend> =
        Arc::new(HttpStorefrontBackend::new(&url).expect("backend"));
    let poller = OrderStatusPoller::new(
        backend,
        PollConfig {
            interval: Duration::from_millis(5),
            max_attempts: 20,
        },
    );

    let outcome = poller.run(&OrderId::from("ORD-42"), |_| {}).await;

    assert_eq!(outcome, PollOutcome::Topup(TopupOutcome::Delivered));
    assert_eq!(state.status_queries.lock().expect("queries lock").len(), 2);
    assert_eq!(state.topup_bodies.lock().expect("bodies lock").len(), 1);
}

#[tokio::test]
async fn trigger_topup_reports_conflict_message() {
    let url = spawn_storefront_server(ServerState::default()).await;
    let backend = HttpStorefrontBackend::new(&url).expect("backend");

    let err = backend
        .trigger_topup(&OrderId::from("ORD-unpaid"))
        .await
        .expect_err("conflict");
    assert_eq!(err.backend_status(), Some(409));
    assert_eq!(err.to_string(), "Order belum dibayar");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = HttpStorefrontBackend::new(&format!("http://{addr}")).expect("backend");

    let err = backend
        .order_status(&OrderId::from("ORD-1"))
        .await
        .expect_err("connection refused");
    assert!(err.is_network());
}

#[test]
fn rejects_malformed_backend_url() {
    let err = HttpStorefrontBackend::new("not a url")
        .err()
        .expect("invalid url");
    assert!(matches!(err, StorefrontError::InvalidBackendUrl(_)));
}

#[tokio::test]
async fn full_flow_over_http_delivers_topup() {
    let state = ServerState::default();
    state
        .statuses
        .lock()
        .expect("statuses lock")
        .extend(["pending", "processing", "paid"]);
    let url = spawn_storefront_server(state.clone()).await;
    let backend = Arc::new(HttpStorefrontBackend::new(&url).expect("backend"));
    let controller = OrderFlowController::new(
        backend,
        PollConfig {
            interval: Duration::from_millis(5),
            max_attempts: 20,
        },
    );

    controller
        .create_order(&OrderDraft {
            player_id: "123456789".to_string(),
            ..OrderDraft::default()
        })
        .await
        .expect("order");
    let mut events = controller.subscribe_events();
    assert_eq!(
        controller.pay_now().as_deref(),
        Some("https://pay.test/ORD-42")
    );

    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(FlowEvent::PollFinished { outcome, .. }) = events.recv().await {
                return outcome;
            }
        }
    })
    .await
    .expect("poll run should finish");

    assert_eq!(outcome, PollOutcome::Topup(TopupOutcome::Delivered));
    assert_eq!(state.status_queries.lock().expect("queries lock").len(), 3);
    assert_eq!(
        state.topup_bodies.lock().expect("bodies lock")[0],
        json!({ "orderId": "ORD-42" })
    );
}
