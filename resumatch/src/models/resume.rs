use crate::error::ClientError;
use crate::identifiers::ResumeId;
use std::fmt;
use std::str::FromStr;

fn parse_resume_id(raw: &str) -> Result<ResumeId, ClientError> {
    ResumeId::from_str(raw)
        .map_err(|_| ClientError::MalformedResponse(format!("bad resume id: {raw:?}")))
}

/// A 0-100 percentage score, as computed by the backend.
///
/// The backend sometimes sends fractional values; these are rounded.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "f64", into = "u8")]
pub struct Score(u8);

impl TryFrom<f64> for Score {
    type Error = String;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        if val.is_finite() && (0.0..=100.0).contains(&val) {
            Ok(Score(val.round() as u8))
        } else {
            Err(format!("score out of range 0-100: {val}"))
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Score {
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Coarse label shown next to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl ScoreBand {
    /// Banding used on the single-analysis view
    pub fn for_analysis(score: Score) -> Self {
        match score.0 {
            70..=100 => ScoreBand::Good,
            50..=69 => ScoreBand::Average,
            _ => ScoreBand::NeedsImprovement,
        }
    }

    /// Banding used on the history listing, which is a bit finer
    pub fn for_history(score: Score) -> Self {
        match score.0 {
            80..=100 => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Average,
            _ => ScoreBand::NeedsImprovement,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Average => "Average",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub ats_score: Score,
    pub suitability_percentage: Score,
    #[serde(default)]
    pub mistakes: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub resume_id: String,
    pub file_name: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub job_role: Option<String>,
    pub analysis: Analysis,
}

impl AnalysisResult {
    pub fn id(&self) -> Result<ResumeId, ClientError> {
        parse_resume_id(&self.resume_id)
    }
}

/// Answer to an upload. Only `resumeId` is relied on; the full analysis is kept when the backend
/// sends it along.
#[derive(Debug, serde::Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub resume_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl<'de> serde::Deserialize<'de> for UploadReceipt {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Ack {
            resume_id: String,
        }

        let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
        let ack: Ack = serde_json::from_value(value.clone()).map_err(serde::de::Error::custom)?;
        Ok(UploadReceipt {
            resume_id: ack.resume_id,
            analysis: serde_json::from_value(value).ok(),
        })
    }
}

impl UploadReceipt {
    pub fn id(&self) -> Result<ResumeId, ClientError> {
        parse_resume_id(&self.resume_id)
    }
}

/// The analysis part of a history row; the listing may omit any of it
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAnalysis {
    #[serde(default)]
    pub ats_score: Option<Score>,
    #[serde(default)]
    pub suitability_percentage: Option<Score>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    // listings have carried the document id as `_id`, `id`, or both
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub plain_id: Option<String>,
    pub file_name: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub analysis: Option<HistoryAnalysis>,
}

impl HistoryEntry {
    /// `_id` if present, else `id`
    pub fn id(&self) -> Option<&str> {
        self.object_id.as_deref().or(self.plain_id.as_deref())
    }

    pub fn resume_id(&self) -> Result<ResumeId, ClientError> {
        let raw = self
            .id()
            .ok_or_else(|| ClientError::MalformedResponse("history entry has no id".to_string()))?;
        parse_resume_id(raw)
    }

    pub fn ats_score(&self) -> Score {
        self.analysis
            .as_ref()
            .and_then(|a| a.ats_score)
            .unwrap_or(Score(0))
    }

    pub fn suitability(&self) -> Score {
        self.analysis
            .as_ref()
            .and_then(|a| a.suitability_percentage)
            .unwrap_or(Score(0))
    }

    pub fn company(&self) -> Option<&str> {
        self.analysis.as_ref().and_then(|a| a.company_name.as_deref())
    }

    pub fn role(&self) -> Option<&str> {
        self.job_role
            .as_deref()
            .or_else(|| self.analysis.as_ref().and_then(|a| a.role.as_deref()))
    }

    pub fn keywords(&self) -> &[String] {
        self.analysis
            .as_ref()
            .map(|a| a.keywords.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ResumePage {
    pub resumes: Vec<HistoryEntry>,
    pub pagination: super::Pagination,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SortBy {
    Date,
    Score,
}

impl FromStr for SortBy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortBy::Date),
            "score" => Ok(SortBy::Score),
            _ => Err(ClientError::validation(format!("unknown sort order: {s}"))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Date => write!(f, "date"),
            SortBy::Score => write!(f, "score"),
        }
    }
}

/// Parameters for one page of the history listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        HistoryQuery {
            page: 1,
            limit: 10,
            search: None,
            sort_by: None,
        }
    }
}

impl HistoryQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        HistoryQuery {
            page,
            limit,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.page == 0 {
            return Err(ClientError::validation("page numbers start at 1"));
        }
        if self.limit == 0 {
            return Err(ClientError::validation("limit must be at least 1"));
        }
        Ok(())
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search.trim().to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            params.push(("sortBy", sort_by.to_string()));
        }
        params
    }
}
