//! Environment-derived settings: API root and where the session lives on disk

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Checked in order; the second is the name the web front-end build uses
pub const API_BASE_URL_VARS: [&str; 2] = ["RESUMATCH_API_BASE_URL", "VITE_API_BASE_URL"];
pub const SESSION_FILE_VAR: &str = "RESUMATCH_SESSION_FILE";

/// Picks the API root: explicit value first, then the environment, then the default
pub fn api_base_url(explicit: Option<String>) -> String {
    let from_env = API_BASE_URL_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok());
    resolve_api_base_url(explicit, from_env)
}

pub fn resolve_api_base_url(explicit: Option<String>, from_env: Option<String>) -> String {
    explicit
        .into_iter()
        .chain(from_env)
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Default location of the persisted session, eg `~/.config/resumatch/session.json` on Linux
pub fn default_session_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(SESSION_FILE_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    ProjectDirs::from("", "", "resumatch").map(|dirs| dirs.config_dir().join("session.json"))
}

#[test]
fn test_resolve_api_base_url() {
    assert_eq!(resolve_api_base_url(None, None), DEFAULT_API_BASE_URL);
    assert_eq!(
        resolve_api_base_url(None, Some("https://api.example.com/api/".to_string())),
        "https://api.example.com/api"
    );
    assert_eq!(
        resolve_api_base_url(
            Some("http://127.0.0.1:9000".to_string()),
            Some("https://api.example.com/api".to_string())
        ),
        "http://127.0.0.1:9000"
    );
    assert_eq!(
        resolve_api_base_url(Some("  ".to_string()), Some("https://b.example".to_string())),
        "https://b.example"
    );
}
