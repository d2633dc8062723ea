//! The upload form: client-side checks plus a guard against double submission

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::identifiers::ResumeId;
use crate::models::UploadReceipt;
use crate::session::StorageBackend;
use log::debug;
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

pub const MSG_NO_FILE: &str = "Please select a resume file";
pub const MSG_NOT_PDF: &str = "Please upload a PDF file";
pub const MSG_NO_JOB_DESCRIPTION: &str = "Please enter a job description";
pub const MSG_IN_FLIGHT: &str = "An upload is already in progress";

/// A résumé file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ResumeFile {
    /// In-memory file with a declared content type (as a browser file picker would report)
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        ResumeFile {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Reads a file from disk. It counts as a PDF only with both a `.pdf` extension and the PDF
    /// magic header.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::validation(format!("Could not read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();
        let has_pdf_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        let content_type = if has_pdf_ext && bytes.starts_with(PDF_MAGIC) {
            PDF_MIME
        } else {
            "application/octet-stream"
        };
        debug!(
            "loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            content_type
        );
        Ok(ResumeFile {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_MIME
    }
}

/// Checks done before any upload request is made. The server remains the authority.
pub fn validate_upload(file: Option<&ResumeFile>, job_description: &str) -> Result<()> {
    let file = file.ok_or_else(|| ClientError::validation(MSG_NO_FILE))?;
    if !file.is_pdf() {
        return Err(ClientError::validation(MSG_NOT_PDF));
    }
    if job_description.trim().is_empty() {
        return Err(ClientError::validation(MSG_NO_JOB_DESCRIPTION));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Editing; `error` is the inline message from the last rejected or failed submission
    Idle { error: Option<String> },
    Submitting,
}

/// A validated submission, handed out by [`UploadForm::begin_submit`]
#[derive(Debug, Clone)]
pub struct Submission {
    pub file: ResumeFile,
    pub job_description: String,
}

#[derive(Debug, Clone)]
pub struct UploadForm {
    file: Option<ResumeFile>,
    job_description: String,
    state: UploadState,
}

impl Default for UploadForm {
    fn default() -> Self {
        UploadForm {
            file: None,
            job_description: String::new(),
            state: UploadState::Idle { error: None },
        }
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == UploadState::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UploadState::Idle { error } => error.as_deref(),
            UploadState::Submitting => None,
        }
    }

    /// Picks a file. A non-PDF is refused right away and the previous selection is kept.
    pub fn select_file(&mut self, file: ResumeFile) -> Result<()> {
        if self.is_submitting() {
            return Err(ClientError::validation(MSG_IN_FLIGHT));
        }
        if !file.is_pdf() {
            self.state = UploadState::Idle {
                error: Some(MSG_NOT_PDF.to_string()),
            };
            return Err(ClientError::validation(MSG_NOT_PDF));
        }
        self.file = Some(file);
        self.state = UploadState::Idle { error: None };
        Ok(())
    }

    pub fn set_job_description(&mut self, text: &str) {
        self.job_description = text.to_string();
    }

    /// Moves to Submitting if the form is valid and nothing is in flight.
    ///
    /// A rejected submission leaves an inline error and does not touch the network.
    pub fn begin_submit(&mut self) -> Result<Submission> {
        if self.is_submitting() {
            return Err(ClientError::validation(MSG_IN_FLIGHT));
        }
        if let Err(err) = validate_upload(self.file.as_ref(), &self.job_description) {
            self.state = UploadState::Idle {
                error: Some(err.to_string()),
            };
            return Err(err);
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| ClientError::validation(MSG_NO_FILE))?;
        self.state = UploadState::Submitting;
        Ok(Submission {
            file,
            job_description: self.job_description.clone(),
        })
    }

    /// Settles an in-flight submission. On success returns the id of the new analysis (where the
    /// front-end navigates to); on failure the form goes back to Idle showing the message.
    pub fn finish(&mut self, outcome: Result<UploadReceipt>) -> Result<ResumeId> {
        let outcome = outcome.and_then(|receipt| receipt.id());
        self.state = UploadState::Idle {
            error: outcome.as_ref().err().map(|e| e.to_string()),
        };
        outcome
    }

    /// Full submission round: guard, validate, upload once, settle
    pub async fn submit<B: StorageBackend>(&mut self, client: &ApiClient<B>) -> Result<ResumeId> {
        let submission = self.begin_submit()?;
        let outcome = client
            .upload_resume(&submission.file, &submission.job_description)
            .await;
        self.finish(outcome)
    }
}
