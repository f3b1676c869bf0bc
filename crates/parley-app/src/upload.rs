//! Media upload modal.
//!
//! Holds the file the user picked, checks its content type against the
//! configured allow-list and hands it to a [`FileStore`].

use parley_core::{BackendError, ValidationError};

use crate::SessionError;

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name including extension.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Create a selected file.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

/// Metadata stored alongside an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    /// MIME type guessed from the file name.
    pub content_type: String,
}

/// Object storage accepting uploads.
pub trait FileStore {
    /// Store `file` with `metadata`.
    fn upload(&mut self, file: &SelectedFile, metadata: &UploadMetadata)
    -> Result<(), BackendError>;
}

/// Content type guessed from a file name's extension.
pub fn content_type_of(file_name: &str) -> Option<&'static str> {
    mime_guess::from_path(file_name).first_raw()
}

/// State of the upload modal.
#[derive(Debug, Clone)]
pub struct UploadModal {
    allowed_types: Vec<String>,
    file: Option<SelectedFile>,
    open: bool,
}

impl UploadModal {
    /// Create a closed modal accepting `allowed_types`.
    pub fn new(allowed_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed_types: allowed_types.into_iter().map(Into::into).collect(),
            file: None,
            open: false,
        }
    }

    /// Show the modal.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the modal and forget the selected file.
    pub fn close(&mut self) {
        self.open = false;
        self.file = None;
    }

    /// True while the modal is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Store or clear the selected file.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.file = file;
    }

    /// The selected file, if any.
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// True if the file name's guessed type is in the allow-list.
    pub fn validate_file_type(&self, file_name: &str) -> bool {
        content_type_of(file_name).is_some_and(|ty| self.allowed_types.iter().any(|a| a == ty))
    }

    /// Submit is disabled until a file is selected.
    pub fn can_submit(&self) -> bool {
        self.file.is_some()
    }

    /// Upload the selected file.
    ///
    /// Validation failures leave the modal unchanged. On upload failure the
    /// modal stays open and keeps the file. On success the file is cleared
    /// and the modal closes.
    pub fn send_file<S: FileStore>(&mut self, store: &mut S) -> Result<(), SessionError> {
        let file = self.file.as_ref().ok_or(ValidationError::NoFileSelected)?;

        let content_type = content_type_of(&file.name);
        let Some(content_type) = content_type.filter(|_| self.validate_file_type(&file.name))
        else {
            return Err(ValidationError::DisallowedFileType {
                file_name: file.name.clone(),
                content_type: content_type.map(str::to_owned),
            }
            .into());
        };

        let metadata = UploadMetadata { content_type: content_type.to_owned() };
        if let Err(e) = store.upload(file, &metadata) {
            tracing::warn!(file = %file.name, error = %e, "upload failed");
            return Err(e.into());
        }

        tracing::info!(file = %file.name, content_type, "file uploaded");
        self.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockStore {
        uploads: Vec<(String, UploadMetadata)>,
        fail: bool,
    }

    impl FileStore for MockStore {
        fn upload(
            &mut self,
            file: &SelectedFile,
            metadata: &UploadMetadata,
        ) -> Result<(), BackendError> {
            if self.fail {
                return Err(BackendError::Disconnected);
            }
            self.uploads.push((file.name.clone(), metadata.clone()));
            Ok(())
        }
    }

    fn modal() -> UploadModal {
        let mut modal = UploadModal::new(["image/jpeg", "image/png"]);
        modal.open();
        modal
    }

    #[test]
    fn file_type_follows_allow_list() {
        let modal = modal();
        assert!(modal.validate_file_type("cat.png"));
        assert!(modal.validate_file_type("cat.JPG"));
        assert!(!modal.validate_file_type("notes.txt"));
        assert!(!modal.validate_file_type("no_extension"));
    }

    #[test]
    fn submit_disabled_without_file() {
        let mut modal = modal();
        assert!(!modal.can_submit());

        let err = modal.send_file(&mut MockStore::default()).unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::NoFileSelected));
        assert!(modal.is_open());
    }

    #[test]
    fn disallowed_type_never_reaches_store() {
        let mut modal = modal();
        let mut store = MockStore::default();
        modal.select_file(Some(SelectedFile::new("notes.txt", b"hi".to_vec())));

        let err = modal.send_file(&mut store).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::DisallowedFileType { ref file_name, .. })
                if file_name == "notes.txt"
        ));
        assert!(store.uploads.is_empty());
        assert!(modal.can_submit());
    }

    #[test]
    fn successful_upload_closes_modal() {
        let mut modal = modal();
        let mut store = MockStore::default();
        modal.select_file(Some(SelectedFile::new("cat.png", vec![0x89, 0x50])));

        modal.send_file(&mut store).unwrap();

        assert_eq!(store.uploads.len(), 1);
        assert_eq!(store.uploads[0].1.content_type, "image/png");
        assert!(!modal.is_open());
        assert!(modal.file().is_none());
    }

    #[test]
    fn failed_upload_keeps_file() {
        let mut modal = modal();
        let mut store = MockStore { fail: true, ..MockStore::default() };
        modal.select_file(Some(SelectedFile::new("cat.jpeg", vec![0xff])));

        let err = modal.send_file(&mut store).unwrap_err();

        assert!(err.is_transient());
        assert!(modal.is_open());
        assert_eq!(modal.file().map(|f| f.name.as_str()), Some("cat.jpeg"));
    }
}
