//! Seam for handing accepted files to an upload transport.
//!
//! Validation never depends on a transport. The only implementation shipped
//! here is [`SimulatedTransport`], a timed no-op matching the landing page's
//! placeholder behaviour; a networked transport plugs in behind the same trait.

use super::types::{AcceptedFile, FileId};
use crate::error::IntakeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn send(&self, file: &AcceptedFile) -> Result<(), IntakeError>;
}

/// Waits `delay` per file and reports success. Never touches file bytes
/// or the network.
#[derive(Debug)]
pub struct SimulatedTransport {
    delay: Duration,
    sent: AtomicUsize,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sent: AtomicUsize::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadTransport for SimulatedTransport {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn send(&self, file: &AcceptedFile) -> Result<(), IntakeError> {
        tokio::time::sleep(self.delay).await;
        self.sent.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(file = %file.name, id = %file.id, "simulated upload finished");
        Ok(())
    }
}

/// Outcome of handing every accepted file to a transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: Vec<(FileId, String)>,
}
