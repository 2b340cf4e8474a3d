//! Browsing-session identity.

use serde::{Deserialize, Serialize};

/// Identifies one browsing session.
///
/// The review vote ledger is scoped to a session, so the same shopper can't
/// vote twice on a review from one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from an existing string (e.g. a cookie value).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID: `sess_` followed by 18 random
    /// bytes in URL-safe base64.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_format() {
        let id = SessionId::generate();
        assert!(id.as_str().starts_with("sess_"));
        // 18 bytes -> 24 base64 chars
        assert_eq!(id.as_str().len(), 29);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = SessionId::new("sess_abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""sess_abc""#);
        let back: SessionId = serde_json::from_str(r#""sess_abc""#).unwrap();
        assert_eq!(back, id);
    }
}
