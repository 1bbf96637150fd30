use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Facts published after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: i32,
        tenant_id: i32,
        total: Decimal,
    },
    OrderStatusChanged {
        order_id: i32,
        old_status: String,
        new_status: String,
    },
    PaymentPreferenceCreated {
        order_id: i32,
        preference_id: String,
    },
}

/// Publishes `event` if a sender is configured. Failures are logged only;
/// the write that produced the event has already succeeded.
pub async fn publish(sender: Option<&EventSender>, event: Event) {
    if let Some(sender) = sender {
        if let Err(e) = sender.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Drains events and logs them. Hosts that need real delivery run their own consumer.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "Domain event");
    }
}
