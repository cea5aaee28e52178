//! Single-file selection and the drop-target acceptance rule.

use thiserror::Error;

use crate::analysis::collaborators::UploadFile;
use crate::format::format_size;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{name} is not a PDF")]
    NotPdf { name: String },

    #[error("{name} is larger than {limit}")]
    TooLarge { name: String, limit: String },

    #[error("{name} is empty")]
    Empty { name: String },
}

/// Acceptance policy of the drop target: PDF only, bounded size.
#[derive(Debug, Clone, Copy)]
pub struct SelectionPolicy {
    pub max_bytes: u64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl SelectionPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Checks one candidate file.
    pub fn accept(&self, file: UploadFile) -> Result<UploadFile, SelectionError> {
        if file.bytes.is_empty() {
            return Err(SelectionError::Empty { name: file.name });
        }
        if file.size() > self.max_bytes {
            return Err(SelectionError::TooLarge {
                name: file.name,
                limit: format_size(self.max_bytes),
            });
        }
        if !looks_like_pdf(&file) {
            return Err(SelectionError::NotPdf { name: file.name });
        }
        Ok(file)
    }

    /// Multiple files dropped at once: only the first candidate counts.
    pub fn accept_many(
        &self,
        files: impl IntoIterator<Item = UploadFile>,
    ) -> Option<Result<UploadFile, SelectionError>> {
        files.into_iter().next().map(|file| self.accept(file))
    }
}

fn looks_like_pdf(file: &UploadFile) -> bool {
    let declared = file
        .content_type
        .to_ascii_lowercase()
        .starts_with(PDF_CONTENT_TYPE)
        || file.name.to_ascii_lowercase().ends_with(".pdf");
    declared && file.bytes.starts_with(PDF_MAGIC)
}

/// Holds at most one selected file.
#[derive(Debug, Default, Clone)]
pub struct FileSelection {
    selected: Option<UploadFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previously selected file.
    pub fn select(&mut self, file: UploadFile) {
        self.selected = Some(file);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Callback shape used by the drop target: a file, or nothing to clear.
    pub fn on_file_select(&mut self, file: Option<UploadFile>) {
        match file {
            Some(file) => self.select(file),
            None => self.clear(),
        }
    }

    pub fn selected(&self) -> Option<&UploadFile> {
        self.selected.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// `"name (size)"` for the selected file.
    pub fn summary(&self) -> Option<String> {
        self.selected
            .as_ref()
            .map(|f| format!("{} ({})", f.name, format_size(f.size())))
    }
}
