use crate::intake::{AcceptedFile, FileId, UploadStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequence number for ordering events
pub type EventSequence = u64;

/// Everything an intake session reports to the view layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeEvent {
    pub sequence: EventSequence,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub payload: IntakeEventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeEventPayload {
    /// Files appended to the accepted collection, in input order
    FilesAccepted { files: Vec<AcceptedFile> },

    /// `"<filename>: <reason>"` lines for files left out of a batch
    FilesRejected { reasons: Vec<String> },

    FileRemoved { id: FileId },

    StatusChanged { status: UploadStatus },
}

impl IntakeEvent {
    pub fn payload_type(&self) -> &str {
        match &self.payload {
            IntakeEventPayload::FilesAccepted { .. } => "files_accepted",
            IntakeEventPayload::FilesRejected { .. } => "files_rejected",
            IntakeEventPayload::FileRemoved { .. } => "file_removed",
            IntakeEventPayload::StatusChanged { .. } => "status_changed",
        }
    }

    /// One-line summary used by the logging handler
    pub fn summary(&self) -> String {
        match &self.payload {
            IntakeEventPayload::FilesAccepted { files } => {
                let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
                format!("accepted {} file(s): {}", files.len(), names.join(", "))
            }
            IntakeEventPayload::FilesRejected { reasons } => {
                format!("rejected {} file(s): {}", reasons.len(), reasons.join("; "))
            }
            IntakeEventPayload::FileRemoved { id } => format!("removed file {}", id),
            IntakeEventPayload::StatusChanged { status } => format!("status is now {}", status),
        }
    }
}
