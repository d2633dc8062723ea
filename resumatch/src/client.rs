use crate::config::DEFAULT_TIMEOUT;
use crate::error::{ClientError, Result};
use crate::models::{AuthSession, Envelope, LoginRequest, SignupRequest, User};
use crate::session::{SessionStore, StorageBackend};
use log::{debug, info};
use reqwest::{header, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// HTTP client for the resumatch API.
///
/// Owns the [`SessionStore`]: the token is read from it at send time for every request, so a
/// logout takes effect on the very next call.
#[derive(Debug)]
pub struct ApiClient<B: StorageBackend> {
    http_client: reqwest::Client,
    base_url: String,
    session: SessionStore<B>,
}

impl<B: StorageBackend> ApiClient<B> {
    pub fn new(base_url: &str, session: SessionStore<B>) -> Result<Self> {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        session: SessionStore<B>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(ApiClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore<B> {
        &self.session
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.get_token() {
            let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| {
                    ClientError::Session("stored token is not a valid header value".to_string())
                })?;
            auth_value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth_value);
        };
        Ok(headers)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("API {} endpoint={}", method, path);
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends with the session credential attached (if any); returns the raw success body
    pub(crate) async fn send(&self, req: RequestBuilder, fallback: &str) -> Result<Vec<u8>> {
        dispatch(req.headers(self.auth_headers()?), fallback).await
    }

    /// Sends, then unwraps the `{status, data}` envelope into `T`
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let body = self.send(req, fallback).await?;
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        envelope.into_data(fallback)
    }

    /// For endpoints that only confirm (deletes): returns the backend's message, if any
    pub(crate) async fn send_confirmation(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<Option<String>> {
        let body = self.send(req, fallback).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        if envelope.status.is_some() && !envelope.is_success() {
            return Err(ClientError::Api {
                status: None,
                message: envelope.message.unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(envelope.message)
    }

    async fn send_auth<T: serde::Serialize>(
        &mut self,
        path: &str,
        body: &T,
        fallback: &str,
    ) -> Result<AuthSession> {
        // auth endpoints never carry the (possibly stale) stored credential
        let req = self.request(Method::POST, path).json(body);
        let body = dispatch(req, fallback).await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        let auth = AuthSession::from_value(value)?;
        if auth.token.is_empty() {
            return Err(ClientError::MalformedResponse(
                "empty token in auth response".to_string(),
            ));
        }
        self.session.set_session(&auth.token, &auth.user)?;
        info!("authenticated as {}", auth.user.email);
        Ok(auth)
    }

    /// Registers a new account, and stores the returned session
    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        if name.trim().is_empty() {
            return Err(ClientError::validation("Please enter your name"));
        }
        validate_credentials(email, password)?;
        let body = SignupRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.send_auth("/auth/signup", &body, "Signup failed").await
    }

    /// Creates a new session, and updates the session store with the result
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthSession> {
        validate_credentials(email, password)?;
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.send_auth("/auth/login", &body, "Login failed").await
    }

    /// Forgets the local session. There is no server-side session to end.
    pub fn logout(&mut self) -> Result<()> {
        self.session.clear_session()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.get_user()
    }

    /// Changes the display name on the cached profile only
    pub fn rename_cached_user(&mut self, name: &str) -> Result<User> {
        if name.trim().is_empty() {
            return Err(ClientError::validation("Please enter your name"));
        }
        let mut user = self
            .session
            .get_user()
            .ok_or(ClientError::NotAuthenticated)?;
        user.name = name.trim().to_string();
        self.session.update_user(&user)?;
        Ok(user)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::validation("Please fill in all fields"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ClientError::validation("Please enter a valid email address")),
    }
}

async fn dispatch(req: RequestBuilder, fallback: &str) -> Result<Vec<u8>> {
    let res = req.send().await.map_err(|e| {
        debug!("no response: {}", e);
        ClientError::Transport(e)
    })?;
    let status = res.status();
    let body = res.bytes().await?.to_vec();
    if status.is_success() {
        return Ok(body);
    }
    let message = error_message(&body, fallback);
    debug!("API error status={} message={:?}", status, message);
    Err(ClientError::Api {
        status: Some(status.as_u16()),
        message,
    })
}

/// Pulls `message` out of an error body, or falls back if there isn't a usable one
pub(crate) fn error_message(body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|val| val["message"].as_str().map(|s| s.to_string()))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[test]
fn test_error_message() {
    assert_eq!(
        error_message(br#"{"status":"error","message":"Resume not found"}"#, "x"),
        "Resume not found"
    );
    assert_eq!(error_message(br#"{"status":"error"}"#, "Fallback"), "Fallback");
    assert_eq!(error_message(br#"{"message":""}"#, "Fallback"), "Fallback");
    assert_eq!(error_message(br#"{"message":42}"#, "Fallback"), "Fallback");
    assert_eq!(error_message(b"<html>502</html>", "Fallback"), "Fallback");
    assert_eq!(error_message(b"", "Fallback"), "Fallback");
}

#[test]
fn test_validate_credentials() {
    assert!(validate_credentials("ada@example.com", "pw").is_ok());
    assert!(validate_credentials(" ada@example.com ", "pw").is_ok());
    assert_eq!(
        validate_credentials("", "pw").unwrap_err().to_string(),
        "Please fill in all fields"
    );
    assert!(validate_credentials("ada@example.com", "").is_err());
    assert_eq!(
        validate_credentials("ada.example.com", "pw")
            .unwrap_err()
            .to_string(),
        "Please enter a valid email address"
    );
    assert!(validate_credentials("@example.com", "pw").is_err());
}
