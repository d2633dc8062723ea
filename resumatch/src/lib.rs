pub mod client;
pub mod config;
pub mod cover_letters;
pub mod error;
pub mod identifiers;
pub mod models;
pub mod page;
pub mod resumes;
pub mod session;
pub mod upload;

pub use client::ApiClient;
pub use error::{ClientError, Result};
pub use identifiers::{CoverLetterId, ResumeId};
pub use page::{Page, PageState};
pub use session::{FileStorage, MemoryStorage, SessionStore, StorageBackend};
pub use upload::{ResumeFile, UploadForm, UploadState};

/// Helper to render a backend timestamp (RFC 3339) for humans.
///
/// The backend stores timestamps in UTC, so the output is always UTC, minute precision.
///
/// Returns something like "2024-03-05 14:07 UTC". Falls back to the raw string if it does not
/// parse.
pub fn display_timestamp(raw: &str) -> String {
    use time::format_description::well_known::Rfc3339;
    let parsed = match time::OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(ts) => ts.to_offset(time::UtcOffset::UTC),
        Err(_) => return raw.to_string(),
    };
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    parsed.format(format).unwrap_or_else(|_| raw.to_string())
}

#[test]
fn test_display_timestamp() {
    assert_eq!(
        display_timestamp("2024-03-05T14:07:31.640Z"),
        "2024-03-05 14:07 UTC"
    );
    assert_eq!(
        display_timestamp("2024-03-05T16:07:31+02:00"),
        "2024-03-05 14:07 UTC"
    );
    assert_eq!(display_timestamp("yesterday"), "yesterday");
    assert_eq!(display_timestamp(""), "");
}
