//! Explicit identity passed to components that act on behalf of a user.

use crate::error::{Result, SkinRoutineError};
use crate::store::is_valid_segment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(SkinRoutineError::Validation {
                message: "no user id provided".into(),
            });
        }
        // The id becomes part of stored document ids.
        if !is_valid_segment(&user_id) {
            return Err(SkinRoutineError::Validation {
                message: format!(
                    "user id '{}' may only contain letters, digits, '_', '-' and '.', \
                     and must not start with '.'",
                    user_id
                ),
            });
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_context_trims() {
        let ctx = UserContext::new("  uid-42 ").unwrap();
        assert_eq!(ctx.user_id(), "uid-42");
    }

    #[test]
    fn test_user_context_rejects_blank_and_paths() {
        assert!(UserContext::new("   ").is_err());
        assert!(UserContext::new("../etc").is_err());
        assert!(UserContext::new("a/b").is_err());
        assert!(UserContext::new("a\\b").is_err());
    }

    #[test]
    fn test_user_context_matches_store_ids() {
        for bad in ["alice@example.com", "alice smith", "tenant:alice", ".hidden"] {
            let err = UserContext::new(bad).unwrap_err();
            assert!(matches!(err, SkinRoutineError::Validation { .. }), "{}", bad);
        }
        assert!(UserContext::new("alice.smith-01_x").is_ok());
    }
}
