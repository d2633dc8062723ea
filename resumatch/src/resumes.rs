//! Resume endpoints: upload, fetch analysis, history listing, delete

use crate::client::ApiClient;
use crate::error::Result;
use crate::identifiers::ResumeId;
use crate::models::{AnalysisResult, HistoryQuery, ResumePage, UploadReceipt};
use crate::session::StorageBackend;
use crate::upload::{validate_upload, ResumeFile, PDF_MIME};
use reqwest::multipart::{Form, Part};
use reqwest::Method;

impl<B: StorageBackend> ApiClient<B> {
    /// Uploads a PDF résumé with the job description it should be matched against.
    ///
    /// Input is checked locally first; an invalid upload never reaches the network. Success only
    /// promises the new resume id; fetch the analysis with [`ApiClient::get_resume_analysis`].
    pub async fn upload_resume(
        &self,
        file: &ResumeFile,
        job_description: &str,
    ) -> Result<UploadReceipt> {
        validate_upload(Some(file), job_description)?;
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(PDF_MIME)?;
        let form = Form::new()
            .part("resume", part)
            .text("jobDescription", job_description.to_string());
        let req = self.request(Method::POST, "/resumes/upload").multipart(form);
        self.send_envelope(req, "Failed to upload resume").await
    }

    pub async fn get_resume_analysis(&self, id: &ResumeId) -> Result<AnalysisResult> {
        let req = self.request(Method::GET, &format!("/resumes/{id}"));
        self.send_envelope(req, "Failed to fetch resume analysis")
            .await
    }

    /// One page of the analysis history. The page is checked against its own pagination counters.
    pub async fn get_all_resumes(&self, query: &HistoryQuery) -> Result<ResumePage> {
        query.validate()?;
        let req = self
            .request(Method::GET, "/resumes")
            .query(&query.to_params());
        let page: ResumePage = self.send_envelope(req, "Failed to fetch resumes").await?;
        page.pagination.check(page.resumes.len(), query.limit)?;
        Ok(page)
    }

    pub async fn delete_resume(&self, id: &ResumeId) -> Result<Option<String>> {
        let req = self.request(Method::DELETE, &format!("/resumes/{id}"));
        self.send_confirmation(req, "Failed to delete resume").await
    }
}
