//! Client-held session: auth token plus a cached copy of the user profile.
//!
//! All reads and writes of session state go through [`SessionStore`]. The token and the user
//! always live in the same [`StorageBackend`], so there is exactly one storage scope per store:
//! [`MemoryStorage`] lasts as long as the process, [`FileStorage`] persists across runs.

use crate::error::{ClientError, Result};
use crate::models::User;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Minimal string key/value storage, in the manner of browser storage
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Sets several keys as one write: on error none of them are changed.
    ///
    /// The default is only correct for backends whose `set` cannot fail.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object in a single file.
///
/// The file is read once at open; every write rewrites the whole file. A missing file is an empty
/// store. An unreadable or corrupt file is also treated as empty (and overwritten on next write).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("ignoring corrupt session file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened session file {}", path.display());
        Ok(FileStorage {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` in memory and writes the file once. If the write fails, the in-memory
    /// entries are restored, so they always match what is on disk.
    fn commit(&mut self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let before = self.entries.clone();
        change(&mut self.entries);
        if self.entries == before {
            return Ok(());
        }
        if let Err(err) = self.flush() {
            warn!("failed to write session file {}: {}", self.path.display(), err);
            self.entries = before;
            return Err(err);
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if self.entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        // write-then-rename, so a crash never leaves a half-written token behind
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.commit(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&mut self, new_entries: &[(&str, &str)]) -> Result<()> {
        self.commit(|entries| {
            for (key, value) in new_entries {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        SessionStore { backend }
    }

    /// Stores both token and user, replacing whatever was there
    pub fn set_session(&mut self, token: &str, user: &User) -> Result<()> {
        let user_json =
            serde_json::to_string(user).map_err(|e| ClientError::Session(e.to_string()))?;
        self.backend
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())])
    }

    pub fn get_token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Cached profile; anything that does not parse is treated as no profile at all
    pub fn get_user(&self) -> Option<User> {
        let raw = self.backend.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("stored user does not parse, ignoring: {}", e);
                None
            }
        }
    }

    /// Rewrites the cached profile only; the token is untouched
    pub fn update_user(&mut self, user: &User) -> Result<()> {
        let user_json =
            serde_json::to_string(user).map_err(|e| ClientError::Session(e.to_string()))?;
        self.backend.set(USER_KEY, &user_json)
    }

    pub fn clear_session(&mut self) -> Result<()> {
        self.backend.remove(TOKEN_KEY)?;
        self.backend.remove(USER_KEY)
    }

    /// Only means a token is present; it is never checked against the server
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Claims decoded from the payload segment of a JWT. Purely informational: the signature is not
/// (and cannot be) verified on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: Option<String>,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, unix_now: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp <= unix_now)
    }
}

/// Tries to decode the claims from a JWT (as base64-encoded token)
pub fn parse_jwt_claims(jwt: &str) -> Result<TokenClaims> {
    let malformed = || ClientError::Session("couldn't parse JWT".to_string());
    let mut parts = jwt.split('.');
    let payload_b64 = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
        _ => return Err(malformed()),
    };
    let payload = base64::decode_config(payload_b64, base64::URL_SAFE_NO_PAD)
        .map_err(|_| malformed())?;
    let obj: Value = serde_json::from_slice(&payload).map_err(|_| malformed())?;
    // the backend puts the user id in "id"; standard issuers use "sub"
    let subject = obj["sub"]
        .as_str()
        .or_else(|| obj["id"].as_str())
        .map(|s| s.to_string());
    Ok(TokenClaims {
        subject,
        issued_at: obj["iat"].as_i64(),
        expires_at: obj["exp"].as_i64(),
    })
}
