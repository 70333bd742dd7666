//! Signed-in identity and bearer-token authentication.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Identity with only a user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Resolves bearer tokens to identities.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The identity for `token`, or `None` if the token is not recognized.
    async fn authenticate(&self, token: &str) -> Option<Identity>;
}

/// Malformed `token=user_id:email:display name` entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid token entry {entry:?}: {reason}")]
pub struct TokenSpecError {
    pub entry: String,
    pub reason: &'static str,
}

/// Fixed token table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token.
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Parse `;`-separated `token=user_id:email:display name` entries.
    ///
    /// Email and display name may be left empty. The display name is
    /// everything after the second `:`.
    pub fn parse(spec: &str) -> Result<Self, TokenSpecError> {
        let mut auth = Self::new();

        for entry in spec.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let err = |reason| TokenSpecError {
                entry: entry.to_string(),
                reason,
            };

            let (token, rest) = entry.split_once('=').ok_or_else(|| err("missing '='"))?;
            let token = token.trim();
            if token.is_empty() {
                return Err(err("empty token"));
            }

            let mut parts = rest.splitn(3, ':');
            let user_id = parts.next().unwrap_or_default().trim();
            if user_id.is_empty() {
                return Err(err("empty user id"));
            }
            let optional = |value: Option<&str>| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            let identity = Identity {
                user_id: user_id.to_string(),
                email: optional(parts.next()),
                display_name: optional(parts.next()),
            };
            auth.tokens.insert(token.to_string(), identity);
        }

        Ok(auth)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_token_table() {
        let auth = StaticTokenAuth::parse(
            "abc=user-1:dana@example.com:Dana Smith; def=user-2::;ghi=user-3:: Coach: Lee",
        )
        .unwrap();
        assert_eq!(auth.len(), 3);

        let dana = auth.authenticate("abc").await.unwrap();
        assert_eq!(dana.user_id, "user-1");
        assert_eq!(dana.email.as_deref(), Some("dana@example.com"));
        assert_eq!(dana.display_name.as_deref(), Some("Dana Smith"));

        let bare = auth.authenticate("def").await.unwrap();
        assert_eq!(bare, Identity::new("user-2"));

        let colon = auth.authenticate("ghi").await.unwrap();
        assert_eq!(colon.display_name.as_deref(), Some("Coach: Lee"));

        assert!(auth.authenticate("nope").await.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_entries() {
        assert_eq!(StaticTokenAuth::parse("").unwrap().len(), 0);
        assert!(StaticTokenAuth::parse("no-equals").is_err());
        assert!(StaticTokenAuth::parse("=user-1").is_err());
        assert_eq!(
            StaticTokenAuth::parse("abc=:x@y.z").unwrap_err().reason,
            "empty user id"
        );
    }
}
