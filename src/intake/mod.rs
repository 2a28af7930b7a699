// Module declarations
mod format;
mod status;
mod transport;
mod types;
mod validation;

pub use format::format_size;
pub use status::{Generation, StatusTracker};
pub use transport::{DispatchSummary, SimulatedTransport, UploadTransport};
pub use types::*;
pub use validation::{is_supported_format, is_within_size_limit, rejection_message, validate_file};

use crate::config::IntakeConfig;
use crate::events::{EventBus, EventReceiver, IntakeEventPayload};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct SessionState {
    files: IndexMap<FileId, AcceptedFile>,
    status: StatusTracker,
}

/// One upload widget's accepted files and status.
///
/// Cloning yields another handle to the same session. Pending status
/// reverts are cancelled by [`IntakeSession::teardown`] or when the last
/// handle is dropped.
#[derive(Clone)]
pub struct IntakeSession {
    id: String,
    state: Arc<Mutex<SessionState>>,
    events: EventBus,
    success_reset: Duration,
    error_reset: Duration,
    cancel: CancellationToken,
    _cancel_on_drop: Arc<DropGuard>,
}

impl std::fmt::Debug for IntakeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeSession")
            .field("id", &self.id)
            .field("state", &"<accepted files>")
            .field("events", &self.events)
            .field("success_reset", &self.success_reset)
            .field("error_reset", &self.error_reset)
            .field("torn_down", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new(&IntakeConfig::default())
    }
}

impl IntakeSession {
    pub fn new(config: &IntakeConfig) -> Self {
        Self::with_event_bus(config, EventBus::new(config.event_bus_capacity))
    }

    /// Build a session publishing onto an existing bus
    pub fn with_event_bus(config: &IntakeConfig, events: EventBus) -> Self {
        let cancel = CancellationToken::new();
        Self {
            id: Uuid::new_v4().to_string(),
            state: Arc::new(Mutex::new(SessionState::default())),
            events,
            success_reset: config.success_reset(),
            error_reset: config.error_reset(),
            _cancel_on_drop: Arc::new(cancel.clone().drop_guard()),
            cancel,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock_recovering(&self.state)
    }

    /// Validate a batch, append the accepted files and update the status.
    ///
    /// Accepted files keep input order. A mixed batch ends in `Error`,
    /// reverting after the error delay; the earlier success revert is
    /// superseded. An empty batch changes nothing.
    pub fn intake<I>(&self, files: I) -> IntakeReport
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        let mut report = IntakeReport::default();

        for file in files {
            let outcome = validate_file(&file);
            match outcome.error_reason {
                None => report.accepted.push(AcceptedFile::from_selected(&file)),
                Some(reason) => report.rejected_reasons.push(rejection_message(&file, reason)),
            }
        }

        if !report.accepted.is_empty() {
            tracing::debug!(session = %self.id, "Accepted {} file(s)", report.accepted.len());
        }
        if report.has_rejections() {
            tracing::warn!(
                session = %self.id,
                "Upload errors: {}",
                report.rejected_reasons.join("; ")
            );
        }

        // Events go out under the lock so their order matches the transitions
        let mut state = self.lock_state();

        if !report.accepted.is_empty() {
            for file in &report.accepted {
                state.files.insert(file.id.clone(), file.clone());
            }
            self.publish(IntakeEventPayload::FilesAccepted {
                files: report.accepted.clone(),
            });
        }
        if report.has_rejections() {
            self.publish(IntakeEventPayload::FilesRejected {
                reasons: report.rejected_reasons.clone(),
            });
        }

        if !report.accepted.is_empty() {
            let generation = state.status.transition(UploadStatus::Success);
            self.publish(IntakeEventPayload::StatusChanged {
                status: UploadStatus::Success,
            });
            self.schedule_revert(generation, self.success_reset);
        }
        if report.has_rejections() {
            let generation = state.status.transition(UploadStatus::Error);
            self.publish(IntakeEventPayload::StatusChanged {
                status: UploadStatus::Error,
            });
            self.schedule_revert(generation, self.error_reset);
        }
        drop(state);

        report
    }

    /// Remove an accepted file. Unknown ids are a no-op.
    ///
    /// Returns whether a file was removed.
    pub fn remove(&self, id: &FileId) -> bool {
        let mut state = self.lock_state();
        let removed = state.files.shift_remove(id).is_some();
        if removed {
            self.publish(IntakeEventPayload::FileRemoved { id: id.clone() });
        }
        removed
    }

    /// Accepted files, oldest first
    pub fn files(&self) -> Vec<AcceptedFile> {
        self.lock_state().files.values().cloned().collect()
    }

    pub fn get(&self, id: &FileId) -> Option<AcceptedFile> {
        self.lock_state().files.get(id).cloned()
    }

    pub fn status(&self) -> UploadStatus {
        self.lock_state().status.status()
    }

    pub fn len(&self) -> usize {
        self.lock_state().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().files.is_empty()
    }

    /// Cancel every pending status revert. The current status stays as is.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Hand every accepted file to `transport`, in order.
    ///
    /// The accepted collection is not modified; failures are collected.
    pub async fn dispatch(&self, transport: &dyn UploadTransport) -> DispatchSummary {
        let files = self.files();
        let mut summary = DispatchSummary::default();

        for file in &files {
            match transport.send(file).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    tracing::warn!(
                        transport = transport.name(),
                        file = %file.name,
                        "upload failed: {}",
                        e
                    );
                    summary.failed.push((file.id.clone(), e.to_string()));
                }
            }
        }

        summary
    }

    fn publish(&self, payload: IntakeEventPayload) {
        // No subscribers is the normal headless case
        if let Err(e) = self.events.publish(&self.id, payload) {
            tracing::debug!(session = %self.id, "event not delivered: {}", e);
        }
    }

    fn schedule_revert(&self, generation: Generation, delay: Duration) {
        if self.cancel.is_cancelled() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    session = %self.id,
                    "no tokio runtime; status will not revert to idle"
                );
                return;
            }
        };

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let session_id = self.id.clone();
        let cancel = self.cancel.clone();

        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let mut state = lock_recovering(&state);
                    if state.status.revert_if_current(generation) {
                        let _ = events.publish(
                            &session_id,
                            IntakeEventPayload::StatusChanged { status: UploadStatus::Idle },
                        );
                    }
                }
            }
        });
    }
}

// The state holds no cross-field invariant a panic could break midway,
// so a poisoned lock is recovered rather than propagated.
fn lock_recovering(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
