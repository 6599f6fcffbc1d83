use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::DeskEvent;

/// Envelope wrapping a desk event with its emission time.
#[derive(Debug, Clone)]
pub struct DeskEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: DeskEvent,
}

/// Handle for emitting desk events.
///
/// Cheaply cloneable and shareable across tasks. Emission never fails the
/// caller: a full or closed channel is logged and dropped.
#[derive(Clone)]
pub struct NotifyHandle {
    tx: mpsc::Sender<DeskEventEnvelope>,
}

impl NotifyHandle {
    /// Create a handle from a channel sender.
    pub fn new(tx: mpsc::Sender<DeskEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an event asynchronously.
    pub async fn emit(&self, event: DeskEvent) {
        let envelope = DeskEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Failed to emit desk event: {}", e);
        }
    }

    /// Try to emit without blocking. Returns whether the event was sent.
    pub fn try_emit(&self, event: DeskEvent) -> bool {
        let envelope = DeskEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to emit desk event: {}", e);
                false
            }
        }
    }
}

/// Create a notifier channel pair.
pub fn create_notifier(buffer: usize) -> (NotifyHandle, mpsc::Receiver<DeskEventEnvelope>) {
    let (tx, rx) = mpsc::channel(buffer);
    (NotifyHandle::new(tx), rx)
}

/// Drain events into the log until all handles are dropped.
///
/// The server spawns this as its default event consumer; a UI would instead
/// forward the envelopes to its toast layer.
pub async fn run_logger(mut rx: mpsc::Receiver<DeskEventEnvelope>) {
    while let Some(envelope) = rx.recv().await {
        match &envelope.event {
            DeskEvent::MoveFailed {
                ticket_id, error, ..
            } => {
                tracing::warn!("move of ticket {} rolled back: {}", ticket_id, error);
            }
            DeskEvent::RefreshFailed { error } => {
                tracing::warn!("ticket refresh failed, keeping previous data: {}", error);
            }
            event => {
                tracing::info!("desk event: {:?}", event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_event() {
        let (handle, mut rx) = create_notifier(10);

        handle
            .emit(DeskEvent::ServiceStarted {
                version: "0.1.0".to_string(),
                config_hash: "abc123".to_string(),
            })
            .await;

        let envelope = rx.recv().await.expect("Should receive event");
        assert!(matches!(envelope.event, DeskEvent::ServiceStarted { .. }));
    }

    #[tokio::test]
    async fn test_multiple_handles_same_channel() {
        let (handle1, mut rx) = create_notifier(10);
        let handle2 = handle1.clone();

        handle1
            .emit(DeskEvent::TicketDeleted {
                ticket_id: "t-1".to_string(),
            })
            .await;
        handle2
            .emit(DeskEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;

        let e1 = rx.recv().await.expect("Should receive first event");
        let e2 = rx.recv().await.expect("Should receive second event");
        assert!(matches!(e1.event, DeskEvent::TicketDeleted { .. }));
        assert!(matches!(e2.event, DeskEvent::ServiceStopped { .. }));
    }

    #[test]
    fn test_try_emit_full_channel() {
        let (handle, _rx) = create_notifier(1);

        let first = handle.try_emit(DeskEvent::TicketUpdated {
            ticket_id: "t-1".to_string(),
        });
        assert!(first);

        // Channel full: dropped, not blocked.
        let second = handle.try_emit(DeskEvent::TicketUpdated {
            ticket_id: "t-2".to_string(),
        });
        assert!(!second);
    }

    #[tokio::test]
    async fn test_emit_closed_channel_does_not_panic() {
        let (handle, rx) = create_notifier(10);
        drop(rx);

        handle
            .emit(DeskEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;
    }

    #[test]
    fn test_envelope_has_timestamp() {
        let (handle, mut rx) = create_notifier(10);

        let before = Utc::now();
        handle.try_emit(DeskEvent::TicketUpdated {
            ticket_id: "t-1".to_string(),
        });
        let after = Utc::now();

        let envelope = rx.try_recv().expect("Should receive event");
        assert!(envelope.timestamp >= before);
        assert!(envelope.timestamp <= after);
    }
}
