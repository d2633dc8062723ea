use crate::error::ClientError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    /// Backend ids are opaque (in practice 24-char hex object ids), but they always end up as a
    /// single URL path segment, so only allow characters that never need escaping.
    static ref ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ResumeId(String);

impl FromStr for ResumeId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ID_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ClientError::validation(format!("invalid resume id: {s:?}")))
        }
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResumeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct CoverLetterId(String);

impl FromStr for CoverLetterId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ID_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ClientError::validation(format!(
                "invalid cover letter id: {s:?}"
            )))
        }
    }
}

impl fmt::Display for CoverLetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CoverLetterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[test]
fn test_resume_id() {
    assert!(ResumeId::from_str("64f1c2a9e4b0a1b2c3d4e5f6").is_ok());
    assert!(ResumeId::from_str("unknown-id").is_ok());
    assert!(ResumeId::from_str("snake_case_1").is_ok());

    assert!(ResumeId::from_str("").is_err());
    assert!(ResumeId::from_str(" ").is_err());
    assert!(ResumeId::from_str("../admin").is_err());
    assert!(ResumeId::from_str("a/b").is_err());
    assert!(ResumeId::from_str("id?page=2").is_err());
    assert!(ResumeId::from_str(&"x".repeat(129)).is_err());

    let id = ResumeId::from_str("64f1c2a9e4b0a1b2c3d4e5f6").unwrap();
    assert_eq!(id.to_string(), "64f1c2a9e4b0a1b2c3d4e5f6");
    assert_eq!(id.as_str(), "64f1c2a9e4b0a1b2c3d4e5f6");
}

#[test]
fn test_cover_letter_id() {
    assert!(CoverLetterId::from_str("cl-0001").is_ok());
    assert!(CoverLetterId::from_str("cl 0001").is_err());
    let err = CoverLetterId::from_str("%2e%2e").unwrap_err();
    assert!(err.to_string().contains("invalid cover letter id"));
}
