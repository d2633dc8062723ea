use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::identifiers::{CoverLetterId, ResumeId};
use crate::models::{CoverLetter, CoverLetterPage, CoverLetterRequest};
use crate::session::StorageBackend;
use reqwest::Method;

impl<B: StorageBackend> ApiClient<B> {
    /// Asks the backend to write a cover letter for an already-analysed résumé.
    ///
    /// `tone` and `length` are not checked here; the backend decides what it accepts.
    pub async fn generate_cover_letter(
        &self,
        resume_id: &ResumeId,
        tone: &str,
        length: &str,
    ) -> Result<CoverLetter> {
        let body = CoverLetterRequest {
            tone: tone.to_string(),
            length: length.to_string(),
        };
        let req = self
            .request(Method::POST, &format!("/cover-letters/generate/{resume_id}"))
            .json(&body);
        self.send_envelope(req, "Failed to generate cover letter")
            .await
    }

    pub async fn get_cover_letter(&self, id: &CoverLetterId) -> Result<CoverLetter> {
        let req = self.request(Method::GET, &format!("/cover-letters/{id}"));
        self.send_envelope(req, "Cover letter not found").await
    }

    pub async fn get_all_cover_letters(&self, page: u32, limit: u32) -> Result<CoverLetterPage> {
        if page == 0 || limit == 0 {
            return Err(ClientError::validation(
                "page and limit must both be at least 1",
            ));
        }
        let req = self
            .request(Method::GET, "/cover-letters")
            .query(&[("page", page), ("limit", limit)]);
        let listing: CoverLetterPage = self
            .send_envelope(req, "Failed to fetch cover letters")
            .await?;
        listing
            .pagination
            .check(listing.cover_letters.len(), limit)?;
        Ok(listing)
    }

    pub async fn delete_cover_letter(&self, id: &CoverLetterId) -> Result<Option<String>> {
        let req = self.request(Method::DELETE, &format!("/cover-letters/{id}"));
        self.send_confirmation(req, "Failed to delete cover letter")
            .await
    }
}
