use anyhow::{anyhow, Context};
pub use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

pub mod pretty;

/// Outcome of a delete command, as printed (or emitted with `--json`)
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Deletion {
    pub kind: &'static str,
    pub id: String,
    pub message: String,
}

impl Deletion {
    /// Uses the server's confirmation message when it sent one
    pub fn new(kind: &'static str, id: &str, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Deleted {kind} {id}"));
        Deletion {
            kind,
            id: id.to_string(),
            message,
        }
    }
}

/// Where the job description comes from on the command line: inline text, a file, or `-` for
/// stdin (as a file path).
pub fn job_description_from(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(_), Some(_)) => Err(anyhow!(
            "pass either --job-description or --job-description-file, not both"
        )),
        (Some(text), None) => Ok(text),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
                .context("reading job description from stdin")?;
            Ok(buf)
        }
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading job description from {}", path.display())),
        // left empty on purpose: the upload form reports the missing description itself
        (None, None) => Ok(String::new()),
    }
}

/// Fixed-width text gauge for a 0-100 score, like `[######----]`
pub fn score_bar(value: u8, width: usize) -> String {
    let filled = (usize::from(value.min(100)) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[test]
fn test_job_description_from() {
    assert_eq!(
        job_description_from(Some("Rust developer".to_string()), None).unwrap(),
        "Rust developer"
    );
    assert_eq!(job_description_from(None, None).unwrap(), "");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jd.txt");
    std::fs::write(&path, "Site reliability engineer\n").unwrap();
    assert_eq!(
        job_description_from(None, Some(path.clone())).unwrap(),
        "Site reliability engineer\n"
    );
    assert!(job_description_from(Some("x".to_string()), Some(path)).is_err());
    assert!(job_description_from(None, Some(dir.path().join("missing.txt"))).is_err());
}

#[test]
fn test_score_bar() {
    assert_eq!(score_bar(0, 10), "[----------]");
    assert_eq!(score_bar(100, 10), "[##########]");
    assert_eq!(score_bar(62, 10), "[######----]");
    assert_eq!(score_bar(65, 10), "[#######---]");
    assert_eq!(score_bar(250, 4), "[####]");
}

#[test]
fn test_deletion() {
    let d = Deletion::new("analysis", "r1", None);
    assert_eq!(d.message, "Deleted analysis r1");
    assert_eq!(
        serde_json::to_value(&d).unwrap(),
        serde_json::json!({"kind": "analysis", "id": "r1", "message": "Deleted analysis r1"})
    );
    let d = Deletion::new(
        "cover letter",
        "cl-1",
        Some("Cover letter deleted successfully".to_string()),
    );
    assert_eq!(d.message, "Cover letter deleted successfully");
    assert_eq!(
        Deletion::new("analysis", "r2", Some(" ".to_string())).message,
        "Deleted analysis r2"
    );
}
