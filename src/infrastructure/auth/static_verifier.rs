use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::ports::{AuthError, AuthVerifier};
use crate::domain::OwnerId;

/// Development verifier backed by a static token table parsed from
/// configuration (`token=owner-uuid` pairs). Production deployments plug
/// in a real identity provider behind the same port.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, OwnerId>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, OwnerId>) -> Self {
        Self { tokens }
    }

    /// Parse `token=uuid,token=uuid` configuration syntax. Malformed
    /// entries are rejected rather than silently skipped.
    pub fn from_spec(spec: &str) -> Result<Self, String> {
        let mut tokens = HashMap::new();
        for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
            let (token, owner) = entry
                .split_once('=')
                .ok_or_else(|| format!("invalid auth token entry: {}", entry))?;
            let owner = owner
                .trim()
                .parse::<uuid::Uuid>()
                .map_err(|e| format!("invalid owner uuid in '{}': {}", entry, e))?;
            tokens.insert(token.trim().to_string(), OwnerId::from_uuid(owner));
        }
        Ok(Self { tokens })
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<OwnerId, AuthError> {
        self.tokens
            .get(bearer_token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}
