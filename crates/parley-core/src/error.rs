//! Error types shared by the Parley crates.
//!
//! Two layers: [`ValidationError`] rejects user input before any backend call
//! is made, [`BackendError`] reports what the realtime backend refused or
//! could not deliver. Neither is retried automatically.

use thiserror::Error;

/// Errors reported by a [`crate::Backend`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend refused the operation (permissions, quota, bad path).
    #[error("backend rejected operation on {path}: {reason}")]
    Rejected {
        /// Path the operation targeted.
        path: String,
        /// Reason given by the backend.
        reason: String,
    },

    /// Transport is not connected.
    #[error("backend transport disconnected")]
    Disconnected,

    /// Snapshot could not be decoded into the expected shape.
    #[error("cannot decode snapshot {key}: {reason}")]
    Decode {
        /// Key of the snapshot.
        key: String,
        /// Decoder message.
        reason: String,
    },
}

impl BackendError {
    /// Returns true if the operation may succeed when retried by the user.
    ///
    /// Decode failures are never transient: the stored data has the wrong
    /// shape and will decode the same way next time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

/// Input rejected on the client before any backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required form field is empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the field.
        field: &'static str,
    },

    /// Upload submitted without a file.
    #[error("no file selected")]
    NoFileSelected,

    /// Upload MIME type is not on the allow-list.
    #[error("file type of {file_name} ({}) is not allowed", .content_type.as_deref().unwrap_or("unknown"))]
    DisallowedFileType {
        /// Name of the rejected file.
        file_name: String,
        /// MIME type guessed from the file name. `None` if unknown.
        content_type: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_disconnect_is_transient() {
        assert!(BackendError::Disconnected.is_transient());
        assert!(
            !BackendError::Rejected { path: "/channels".into(), reason: "denied".into() }
                .is_transient()
        );
        assert!(!BackendError::Decode { key: "c1".into(), reason: "bad".into() }.is_transient());
    }

    #[test]
    fn disallowed_type_message_names_file() {
        let err = ValidationError::DisallowedFileType {
            file_name: "notes.txt".into(),
            content_type: Some("text/plain".into()),
        };
        assert_eq!(err.to_string(), "file type of notes.txt (text/plain) is not allowed");

        let unknown =
            ValidationError::DisallowedFileType { file_name: "blob".into(), content_type: None };
        assert_eq!(unknown.to_string(), "file type of blob (unknown) is not allowed");
    }
}
