use thiserror::Error;

/// Failures raised by the credential primitives.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,
}

impl AuthError {
    /// True for failures caused by the presented token rather than the server.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidToken(_) | Self::Expired)
    }
}
