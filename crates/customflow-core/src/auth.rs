//! Authentication seam.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Raw credentials taken from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
}

impl Credentials {
    /// Token following a `Bearer ` prefix.
    pub fn bearer_token(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub role: String,
}

#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Identifies the caller or fails with `CustomFlowError::Unauthorized`.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal>;
}

/// Accepts every request as the seeded administrator.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    principal: Principal,
}

impl StaticAuthenticator {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

impl Default for StaticAuthenticator {
    fn default() -> Self {
        Self::new(Principal {
            user_id: 1,
            role: "admin".to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Principal> {
        Ok(self.principal.clone())
    }
}
