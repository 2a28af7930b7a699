//! Format and size checks for selected files.
//!
//! Reads only `name` and `size_bytes`; file contents are never inspected.

use super::types::{
    RejectionReason, SelectedFile, ValidationOutcome, MAX_FILE_SIZE, SUPPORTED_FORMATS,
};

pub fn is_supported_format(extension: &str) -> bool {
    SUPPORTED_FORMATS
        .iter()
        .any(|format| format.eq_ignore_ascii_case(extension))
}

pub fn is_within_size_limit(size_bytes: u64) -> bool {
    size_bytes <= MAX_FILE_SIZE
}

/// Classify one file.
///
/// When a file fails both checks the format failure is reported.
pub fn validate_file(file: &SelectedFile) -> ValidationOutcome {
    let format_ok = file
        .extension()
        .is_some_and(|ext| is_supported_format(&ext));

    if !format_ok {
        return ValidationOutcome::rejected(RejectionReason::UnsupportedFormat);
    }

    if !is_within_size_limit(file.size_bytes) {
        return ValidationOutcome::rejected(RejectionReason::TooLarge);
    }

    ValidationOutcome::valid()
}

/// `"<filename>: <reason>"` as shown to the user
pub fn rejection_message(file: &SelectedFile, reason: RejectionReason) -> String {
    format!("{}: {}", file.name, reason)
}
