// resumatch API types (manually entered)

pub mod cover_letter;
pub mod resume;

pub use cover_letter::{CoverLetter, CoverLetterPage, CoverLetterRequest, CoverLetterSummary};
pub use resume::{
    Analysis, AnalysisResult, HistoryEntry, HistoryQuery, ResumePage, Score, ScoreBand, SortBy,
    UploadReceipt,
};

use crate::error::ClientError;
use serde_json::Value;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    /// Whatever else the backend decides to put on the profile
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Result of signup or login
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl AuthSession {
    /// Auth endpoints have shipped both bare `{token, user}` bodies and the usual
    /// `{status, data: {token, user}}` envelope; accept either.
    pub fn from_value(mut value: Value) -> Result<Self, ClientError> {
        if let Some(status) = value.get("status").and_then(Value::as_str) {
            if status != "success" {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Authentication failed")
                    .to_string();
                return Err(ClientError::Api {
                    status: None,
                    message,
                });
            }
        }
        let inner = match value.get_mut("data") {
            Some(data) if data.get("token").is_some() => data.take(),
            _ => value,
        };
        serde_json::from_value(inner).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

/// Generic response wrapper: `{ "status": "success", "data": ..., "message": ... }`
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct Envelope {
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// Checks the status flag and decodes the `data` payload.
    ///
    /// `fallback` is the message used if the backend flags a failure without saying why.
    pub fn into_data<T: serde::de::DeserializeOwned>(
        self,
        fallback: &str,
    ) -> Result<T, ClientError> {
        if !self.is_success() {
            return Err(ClientError::Api {
                status: None,
                message: self
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            });
        }
        let data = self
            .data
            .ok_or_else(|| ClientError::MalformedResponse("response has no data".to_string()))?;
        serde_json::from_value(data).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: Option<u32>,
    pub total_pages: u32,
    // each listing names its item count differently; some send more than one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_resumes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cover_letters: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn expected_pages(total_items: u64, limit: u32) -> u64 {
        if limit == 0 {
            return 0;
        }
        (total_items + u64::from(limit) - 1) / u64::from(limit)
    }

    /// Total number of items across all pages
    pub fn total_items(&self) -> u64 {
        self.total_resumes
            .or(self.total_cover_letters)
            .or(self.total)
            .unwrap_or(0)
    }

    /// Verifies a page of `item_count` entries fetched with `limit` is consistent with these
    /// counters.
    pub fn check(&self, item_count: usize, limit: u32) -> Result<(), ClientError> {
        if item_count as u64 > u64::from(limit) {
            return Err(ClientError::MalformedResponse(format!(
                "got {item_count} entries for a page limit of {limit}"
            )));
        }
        let total_items = self.total_items();
        let expected = Self::expected_pages(total_items, limit);
        // an empty listing is sometimes reported as a single empty page
        let empty_ok = total_items == 0 && self.total_pages <= 1;
        if u64::from(self.total_pages) != expected && !empty_ok {
            return Err(ClientError::MalformedResponse(format!(
                "totalPages={} does not match {} items at {} per page",
                self.total_pages, total_items, limit
            )));
        }
        Ok(())
    }
}
