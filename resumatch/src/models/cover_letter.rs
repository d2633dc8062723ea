use crate::error::ClientError;
use crate::identifiers::CoverLetterId;
use std::str::FromStr;

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_LENGTH: &str = "medium";

/// Body of a generation request. Tone and length are passed through to the backend unchecked.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct CoverLetterRequest {
    pub tone: String,
    pub length: String,
}

impl Default for CoverLetterRequest {
    fn default() -> Self {
        CoverLetterRequest {
            tone: DEFAULT_TONE.to_string(),
            length: DEFAULT_LENGTH.to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    pub cover_letter_id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    pub tone: String,
    pub length: String,
    pub generated_at: String,
    pub cover_letter_content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CoverLetter {
    pub fn id(&self) -> Result<CoverLetterId, ClientError> {
        CoverLetterId::from_str(&self.cover_letter_id).map_err(|_| {
            ClientError::MalformedResponse(format!("bad coverLetterId: {:?}", self.cover_letter_id))
        })
    }

    pub fn word_count(&self) -> usize {
        self.cover_letter_content.split_whitespace().count()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter_id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl CoverLetterSummary {
    /// `_id` if present, else `coverLetterId`
    pub fn id(&self) -> Option<&str> {
        self.object_id
            .as_deref()
            .or(self.cover_letter_id.as_deref())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterPage {
    pub cover_letters: Vec<CoverLetterSummary>,
    pub pagination: super::Pagination,
}

#[test]
fn test_cover_letter_schema() {
    use serde_json::json;

    let letter: CoverLetter = serde_json::from_value(json!({
        "coverLetterId": "cl-01",
        "companyName": "Acme",
        "jobRole": "Platform Engineer",
        "tone": "enthusiastic",
        "length": "short",
        "generatedAt": "2024-03-05T14:07:31Z",
        "coverLetterContent": "Dear hiring team,\n\nI am writing to apply.",
        "keywords": ["Rust"]
    }))
    .unwrap();
    assert_eq!(letter.id().unwrap().as_str(), "cl-01");
    assert_eq!(letter.word_count(), 8);

    let page: CoverLetterPage = serde_json::from_value(json!({
        "coverLetters": [
            {"_id": "cl-01", "companyName": "Acme"},
            {"_id": "cl-02", "coverLetterId": "cl-02"},
            {"coverLetterId": "cl-03"}
        ],
        "pagination": {"totalPages": 1, "totalCoverLetters": 3}
    }))
    .unwrap();
    assert_eq!(page.cover_letters[0].id(), Some("cl-01"));
    assert_eq!(page.cover_letters[1].id(), Some("cl-02"));
    assert_eq!(page.cover_letters[2].id(), Some("cl-03"));
    assert_eq!(page.pagination.total_items(), 3);

    assert_eq!(
        serde_json::to_value(CoverLetterRequest::default()).unwrap(),
        json!({"tone": "professional", "length": "medium"})
    );
}
