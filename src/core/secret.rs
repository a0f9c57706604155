//! Secret handling for provider credentials

use std::fmt;
use zeroize::Zeroize;

/// Provider API key, cleared from memory when dropped.
///
/// The value is only reachable through [`ApiKey::expose_secret`], and the
/// `Debug` output never contains it, so keys can travel through structured
/// log fields safely.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    value: String,
}

impl ApiKey {
    /// Wrap a raw key. Blank input yields `None`.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            value: trimmed.to_string(),
        })
    }

    /// Get the raw key (limited access)
    pub fn expose_secret(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl Zeroize for ApiKey {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   \n").is_none());
    }

    #[test]
    fn test_key_is_trimmed_and_exposed() {
        let key = ApiKey::new("  sk-or-v1-abc  ").unwrap();
        assert_eq!(key.expose_secret(), "sk-or-v1-abc");
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let key = ApiKey::new("sk-or-v1-secret").unwrap();
        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("secret"));
        assert_eq!(debug_str, "ApiKey(****)");
    }

    #[test]
    fn test_zeroize_clears_value() {
        let mut key = ApiKey::new("sk-or-v1-abc").unwrap();
        key.zeroize();
        assert!(key.expose_secret().is_empty());
    }
}
