/// The single error contract surfaced by every resumatch operation.
///
/// The `Display` text of each variant is what a front-end shows to the user, so backend messages
/// are carried through verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected on the client, before any network call.
    #[error("{0}")]
    Validation(String),

    /// No response was received (connect failure, DNS, timeout, broken body stream).
    #[error("Request failed")]
    Transport(#[from] reqwest::Error),

    /// The backend answered, but reported a failure.
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// The backend answered with success, but the body does not match the expected schema.
    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Not logged in")]
    NotAuthenticated,
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// HTTP status code, if the backend sent one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => *status,
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Session(err.to_string())
    }
}

#[test]
fn test_error_display() {
    let err = ClientError::Api {
        status: Some(404),
        message: "Resume not found".to_string(),
    };
    assert_eq!(err.to_string(), "Resume not found");
    assert!(err.is_not_found());

    let err = ClientError::validation("Please enter a job description");
    assert_eq!(err.to_string(), "Please enter a job description");
    assert_eq!(err.status(), None);

    assert_eq!(ClientError::NotAuthenticated.to_string(), "Not logged in");
}
