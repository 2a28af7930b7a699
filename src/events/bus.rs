use super::types::{EventSequence, IntakeEvent, IntakeEventPayload};
use crate::error::IntakeError;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

pub type EventReceiver = broadcast::Receiver<IntakeEvent>;
pub type EventSender = broadcast::Sender<IntakeEvent>;

/// Fan-out of intake events to the view layer and handlers
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: EventSender,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Publish an event and return its sequence number.
    ///
    /// The sequence is consumed even when nobody is subscribed.
    pub fn publish(
        &self,
        session_id: &str,
        payload: IntakeEventPayload,
    ) -> Result<EventSequence, IntakeError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);

        let event = IntakeEvent {
            sequence,
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            payload,
        };

        self.sender
            .send(event)
            .map(|_| sequence)
            .map_err(|e| IntakeError::Event(format!("Failed to publish event: {}", e)))
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Sequence number the next event will get
    pub fn current_sequence(&self) -> EventSequence {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
