//! Backend commands queued from UI to backend worker.

use shared::domain::OrderDraft;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    CreateOrder { draft: OrderDraft },
    PayNow,
    CancelPolling,
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::CreateOrder { .. } => "create_order",
            BackendCommand::PayNow => "pay_now",
            BackendCommand::CancelPolling => "cancel_polling",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
