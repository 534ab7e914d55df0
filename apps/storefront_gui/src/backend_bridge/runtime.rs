//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    FlowEvent, HttpStorefrontBackend, OrderFlowController, StorefrontBackend, StorefrontSettings,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: StorefrontSettings,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_worker(cmd_rx, ui_tx, settings));
    })
}

async fn run_worker(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: StorefrontSettings,
) {
    let backend: Arc<dyn StorefrontBackend> =
        match HttpStorefrontBackend::new(&settings.backend_url) {
            Ok(backend) => Arc::new(backend),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                tracing::error!(backend_url = %settings.backend_url, "invalid backend url: {err}");
                return;
            }
        };

    let controller = OrderFlowController::new(backend, settings.poll_config());
    let forwarder = tokio::spawn(forward_flow_events(
        controller.subscribe_events(),
        ui_tx.clone(),
    ));
    let _ = ui_tx.try_send(UiEvent::Info(format!(
        "Terhubung ke {}",
        settings.backend_url
    )));
    tracing::info!(backend_url = %settings.backend_url, "backend worker ready");

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::CreateOrder { draft } => {
                if let Err(err) = controller.create_order(&draft).await {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_storefront(
                        UiErrorContext::CreateOrder,
                        &err,
                    )));
                }
            }
            BackendCommand::PayNow => {
                controller.pay_now();
            }
            BackendCommand::CancelPolling => controller.cancel_polling(),
            BackendCommand::Shutdown => break,
        }
    }

    controller.shutdown();
    forwarder.abort();
    tracing::info!("backend worker stopped");
}

async fn forward_flow_events(
    mut events: tokio::sync::broadcast::Receiver<FlowEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => match ui_tx.try_send(UiEvent::Flow(event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("ui event queue full; dropping flow event");
                }
                Err(TrySendError::Disconnected(_)) => break,
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "flow event forwarder lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
