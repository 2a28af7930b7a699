//! Type definitions for the upload intake.
//!
//! Defines the intake data model (SelectedFile, AcceptedFile, UploadStatus,
//! IntakeReport) and the fixed validation constants.

use crate::error::IntakeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Allowed CAD/mesh extensions, lower-case, compared case-insensitively
pub const SUPPORTED_FORMATS: [&str; 6] = ["iges", "stl", "fbx", "dxf", "step", "stp"];

/// Largest accepted file (50MB), inclusive
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub const SUCCESS_RESET: Duration = Duration::from_secs(3);
pub const ERROR_RESET: Duration = Duration::from_secs(5);

/// Filter string for native file pickers. Advisory only: intake re-validates.
pub const PICKER_ACCEPT: &str = ".iges,.stl,.fbx,.dxf,.step,.stp";

static NEXT_FILE_SEQ: AtomicU64 = AtomicU64::new(1);

/// A file offered by a drop target or picker. Only metadata is carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }

    /// Describe a local file from its metadata. Contents are not opened.
    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(IntakeError::Other(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| IntakeError::Other(format!("No file name: {}", path.display())))?;

        Ok(Self::new(name, metadata.len()))
    }

    /// Lower-cased text after the final `.`; `None` when the name has no dot
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnsupportedFormat,
    TooLarge,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::UnsupportedFormat => "Unsupported file format",
            RejectionReason::TooLarge => "File too large (max 50MB)",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error_reason: Option<RejectionReason>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_reason: None,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            is_valid: false,
            error_reason: Some(reason),
        }
    }
}

/// Identifier of an accepted file: a process-wide sequence number joined
/// with a random UUID, so duplicate file names never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn mint() -> Self {
        let seq = NEXT_FILE_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}", seq, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Validated and waiting for a transport
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedFile {
    pub id: FileId,
    pub name: String,
    pub size_bytes: u64,
    /// Extension as shown in the UI, e.g. `STL`
    pub extension_upper: String,
    pub status: FileStatus,
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedFile {
    /// Build the session record for a file that already passed validation
    pub(crate) fn from_selected(file: &SelectedFile) -> Self {
        Self {
            id: FileId::mint(),
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            extension_upper: file.extension().unwrap_or_default().to_uppercase(),
            status: FileStatus::Ready,
            accepted_at: Utc::now(),
        }
    }
}

/// Transient summary of the most recent intake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Success,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeReport {
    pub accepted: Vec<AcceptedFile>,
    pub rejected_reasons: Vec<String>,
}

impl IntakeReport {
    pub fn has_rejections(&self) -> bool {
        !self.rejected_reasons.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected_reasons.is_empty()
    }
}
