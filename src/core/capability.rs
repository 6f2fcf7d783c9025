//! Publishing capability
//!
//! Whether a run may write to the registry is decided once, at the entry
//! point, and passed down explicitly.

/// Presence or absence of a publishing token
#[derive(Clone, Default, PartialEq, Eq)]
pub enum PublishCapability {
    /// No credentials: build as needed, never upload or link
    #[default]
    Disabled,
    /// Credentials present
    Enabled { token: String },
}

impl PublishCapability {
    /// Derive the capability from an optional token; empty counts as absent
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Enabled { token },
            _ => Self::Disabled,
        }
    }

    /// Whether publish side effects are allowed
    pub fn can_publish(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// The token, if present
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Enabled { token } => Some(token),
            Self::Disabled => None,
        }
    }
}

impl std::fmt::Debug for PublishCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Enabled { .. } => write!(f, "Enabled {{ token: *** }}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert!(!PublishCapability::from_token(None).can_publish());
        assert!(!PublishCapability::from_token(Some("  ".to_string())).can_publish());

        let cap = PublishCapability::from_token(Some("abc".to_string()));
        assert!(cap.can_publish());
        assert_eq!(cap.token(), Some("abc"));
    }

    #[test]
    fn test_debug_hides_token() {
        let cap = PublishCapability::from_token(Some("abc".to_string()));
        let shown = format!("{cap:?}");
        assert!(!shown.contains("abc"));
        assert!(shown.contains("***"));
    }
}
