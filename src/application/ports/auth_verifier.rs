use async_trait::async_trait;

use crate::domain::OwnerId;

/// External authentication boundary: maps a bearer token to a caller
/// identity. Session management itself lives outside this system.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<OwnerId, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,
}
