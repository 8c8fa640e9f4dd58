//! Credential wrapper for catalog API tokens.
//!
//! Tokens are held in zeroizing memory, compared in constant time, and never
//! printed through `Debug` or `Display`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A secret string (API token or key) that is zeroized when dropped.
///
/// # Example
///
/// ```
/// use mc_client::SecureString;
///
/// let token = SecureString::new("eyJhbGciOi-example".to_string());
/// assert_eq!(token.expose_secret(), "eyJhbGciOi-example");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// ```
#[derive(Clone, Default)]
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(Zeroizing::new(s))
    }

    /// Reads a secret from an environment variable, if set and non-empty.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
    }

    /// Exposes the secret for use in a request.
    ///
    /// Copies of the returned value are not zeroized.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short form safe for logs: the last four characters only.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecureString {}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecureString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redacted() {
        let token = SecureString::from("catalog-token-123456");
        assert!(!format!("{:?}", token).contains("catalog-token"));
        assert_eq!(token.to_string(), "[REDACTED]");
    }

    #[test]
    fn test_masked() {
        assert_eq!(SecureString::from("catalog-token-123456").masked(), "****3456");
        assert_eq!(SecureString::from("short").masked(), "****");
    }

    #[test]
    fn test_equality() {
        assert_eq!(SecureString::from("a-token"), SecureString::from("a-token"));
        assert_ne!(SecureString::from("a-token"), SecureString::from("b-token"));
    }

    #[test]
    fn test_round_trips_through_config() {
        let token = SecureString::from("stored-token");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"stored-token\"");
        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_from_env_ignores_blank() {
        std::env::set_var("MC_TEST_SECURE_STRING_BLANK", "  ");
        assert!(SecureString::from_env("MC_TEST_SECURE_STRING_BLANK").is_none());
        std::env::set_var("MC_TEST_SECURE_STRING_SET", "value");
        assert_eq!(
            SecureString::from_env("MC_TEST_SECURE_STRING_SET").map(|s| s.len()),
            Some(5)
        );
    }
}
