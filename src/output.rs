//! Error text shown to the user.

use poketo_core::metadata::{InputKind, MetadataError};

/// Formats a failure line for stderr.
pub(crate) fn error_line(message: &str) -> String {
    format!("> Error! {message}")
}

/// Maps a metadata failure for `target` onto a user-facing sentence.
pub(crate) fn metadata_error_message(
    error: &MetadataError,
    kind: InputKind,
    target: &str,
) -> String {
    match error {
        MetadataError::UnsupportedSite { .. } => format!("{target} is not a supported site"),
        MetadataError::InvalidUrl { .. } => format!("{target} is not a supported URL"),
        e if e.is_not_found() => format!("Could not find a {kind} at {target}"),
        e => e.to_string(),
    }
}
