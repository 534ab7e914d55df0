use super::*;
use shared::protocol::TriggerTopupResponse;

use crate::support::{status, Reply, ScriptedBackend};

fn fast_config() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
    }
}

async fn run_poller(backend: Arc<ScriptedBackend>) -> (PollOutcome, Vec<String>) {
    let poller = OrderStatusPoller::new(backend, fast_config());
    let mut messages = Vec::new();
    let outcome = poller
        .run(&OrderId::from("ORD-1"), |update| {
            if let PollUpdate::Message(message) = update {
                messages.push(message);
            }
        })
        .await;
    (outcome, messages)
}

#[test]
fn next_step_maps_statuses() {
    let response = |status, detail: Option<&str>| OrderStatusResponse {
        status,
        detail: detail.map(str::to_string),
    };
    assert_eq!(
        next_step(&response(Some(OrderStatus::Paid), None)),
        PollStep::TriggerTopup
    );
    assert_eq!(
        next_step(&response(Some(OrderStatus::Delivered), None)),
        PollStep::Delivered
    );
    assert_eq!(
        next_step(&response(Some(OrderStatus::Failed), Some(""))),
        PollStep::Failed(None)
    );
    assert_eq!(
        next_step(&response(Some(OrderStatus::Unknown), None)),
        PollStep::Wait
    );
    assert_eq!(next_step(&response(None, None)), PollStep::Wait);
}

#[tokio::test]
async fn paid_after_two_pending_triggers_exactly_one_topup() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([
        status(OrderStatus::Pending),
        status(OrderStatus::Pending),
        status(OrderStatus::Paid),
    ]));

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(outcome, PollOutcome::Topup(TopupOutcome::Delivered));
    assert!(outcome.is_delivered());
    assert_eq!(backend.status_calls(), 3);
    assert_eq!(backend.topup_calls(), 1);
    assert_eq!(
        messages,
        vec![
            messages::PAYMENT_RECEIVED.to_string(),
            messages::TOPUP_DELIVERED.to_string(),
        ]
    );
}

#[tokio::test]
async fn twenty_one_pending_polls_exhaust_without_topup() {
    let backend = Arc::new(ScriptedBackend::new());

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(outcome, PollOutcome::Exhausted { polls: 21 });
    assert_eq!(backend.status_calls(), 21);
    assert_eq!(backend.topup_calls(), 0);
    assert_eq!(messages, vec![messages::STILL_PENDING.to_string()]);
}

#[tokio::test]
async fn failed_status_stops_with_detail_verbatim() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([
        status(OrderStatus::Pending),
        Reply::Ok(OrderStatusResponse {
            status: Some(OrderStatus::Failed),
            detail: Some("FPX session expired".to_string()),
        }),
        status(OrderStatus::Paid),
    ]));

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(
        outcome,
        PollOutcome::Failed {
            detail: Some("FPX session expired".to_string())
        }
    );
    assert_eq!(backend.status_calls(), 2);
    assert_eq!(backend.topup_calls(), 0);
    assert_eq!(messages, vec!["Transaksi gagal: FPX session expired".to_string()]);
}

#[tokio::test]
async fn failed_status_without_detail_reports_unknown() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([status(OrderStatus::Failed)]));

    let (outcome, messages) = run_poller(backend).await;

    assert_eq!(outcome, PollOutcome::Failed { detail: None });
    assert_eq!(messages, vec!["Transaksi gagal: unknown".to_string()]);
}

#[tokio::test]
async fn delivered_status_is_terminal_success() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([
        status(OrderStatus::Pending),
        status(OrderStatus::Delivered),
    ]));

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(outcome, PollOutcome::Delivered);
    assert_eq!(backend.topup_calls(), 0);
    assert_eq!(messages, vec![messages::DELIVERED.to_string()]);
}

#[tokio::test]
async fn status_error_ends_run_without_retry() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([
        status(OrderStatus::Pending),
        Reply::Backend(502, "bad gateway".to_string()),
        status(OrderStatus::Paid),
    ]));

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(outcome, PollOutcome::Errored("bad gateway".to_string()));
    assert_eq!(backend.status_calls(), 2);
    assert_eq!(backend.topup_calls(), 0);
    assert_eq!(messages, vec!["Gagal cek status order: bad gateway".to_string()]);
}

#[tokio::test]
async fn non_delivered_topup_echoes_status() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_statuses([status(OrderStatus::Paid)])
            .with_topup_reply(Reply::Ok(TriggerTopupResponse {
                status: Some("queued".to_string()),
            })),
    );

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(
        outcome,
        PollOutcome::Topup(TopupOutcome::Processing(Some("queued".to_string())))
    );
    assert!(!outcome.is_delivered());
    assert_eq!(backend.status_calls(), 1);
    assert_eq!(messages.last().map(String::as_str), Some("Top-up diproses: queued"));
}

#[tokio::test]
async fn topup_without_status_reports_processing() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_statuses([status(OrderStatus::Paid)])
            .with_topup_reply(Reply::Ok(TriggerTopupResponse { status: None })),
    );

    let (_, messages) = run_poller(backend).await;

    assert_eq!(
        messages.last().map(String::as_str),
        Some("Top-up diproses: processing")
    );
}

#[tokio::test]
async fn topup_backend_failure_uses_backend_message() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_statuses([status(OrderStatus::Paid)])
            .with_topup_reply(Reply::Backend(500, "Saldo reseller habis".to_string())),
    );

    let (outcome, messages) = run_poller(Arc::clone(&backend)).await;

    assert_eq!(
        outcome,
        PollOutcome::Topup(TopupOutcome::Failed("Saldo reseller habis".to_string()))
    );
    assert_eq!(backend.topup_calls(), 1);
    assert_eq!(
        messages.last().map(String::as_str),
        Some("Error topup: Saldo reseller habis")
    );
}

#[tokio::test]
async fn polling_updates_report_each_attempt() {
    let backend = Arc::new(ScriptedBackend::new().with_statuses([
        status(OrderStatus::Pending),
        status(OrderStatus::Delivered),
    ]));
    let poller = OrderStatusPoller::new(backend, fast_config());
    let mut attempts = Vec::new();

    poller
        .run(&OrderId::from("ORD-1"), |update| {
            if let PollUpdate::Polling { attempt } = update {
                attempts.push(attempt);
            }
        })
        .await;

    assert_eq!(attempts, vec![0, 1]);
}
