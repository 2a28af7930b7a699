use super::{EventBus, IntakeEvent, IntakeEventPayload};
use crate::logging::{log_error, log_info, log_intake_event};
use crate::shutdown::ShutdownCoordinator;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const COMPONENT: &str = "events";

/// Handler that mirrors every intake event into the intake log
pub struct LoggingEventHandler {
    event_bus: EventBus,
    shutdown: ShutdownCoordinator,
}

impl LoggingEventHandler {
    pub fn new(event_bus: EventBus, shutdown: ShutdownCoordinator) -> Self {
        Self {
            event_bus,
            shutdown,
        }
    }

    /// Spawn the handler loop. The task resolves to the number of events it
    /// logged once the bus closes or shutdown is signalled.
    pub fn start(self) -> JoinHandle<u64> {
        // Subscribe before spawning so no event published after start() is missed
        let mut rx = self.event_bus.subscribe();
        let mut shutdown_rx = self.shutdown.subscribe();
        let shutdown = self.shutdown;

        tokio::spawn(async move {
            // Holding the coordinator keeps shutdown_rx from reporting Closed
            let _shutdown = shutdown;
            let mut handled = 0u64;

            loop {
                tokio::select! {
                    // Drain queued events before honouring shutdown
                    biased;
                    result = rx.recv() => {
                        match result {
                            Ok(event) => {
                                Self::handle_event(&event);
                                handled += 1;
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                log_info(COMPONENT, "Logging handler stopped (event bus closed)").unwrap_or_default();
                                break;
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                log_error(COMPONENT, &format!("Logging handler lagged {} events", n))
                                    .unwrap_or_default();
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        log_info(COMPONENT, "Logging handler gracefully shutting down").unwrap_or_default();
                        break;
                    }
                }
            }

            handled
        })
    }

    fn handle_event(event: &IntakeEvent) {
        let level = match &event.payload {
            IntakeEventPayload::FilesRejected { .. } => "WARN",
            IntakeEventPayload::StatusChanged { .. } => "DEBUG",
            _ => "INFO",
        };

        let details = serde_json::to_value(&event.payload).ok();
        log_intake_event(
            "intake",
            level,
            &format!("[{}#{}] {}", event.session_id, event.sequence, event.summary()),
            details,
        )
        .unwrap_or_default();
    }
}
