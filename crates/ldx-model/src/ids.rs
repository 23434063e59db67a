//! Identifier newtypes shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A portable layer identity.
///
/// Identities name exported layer definitions on disk and stand in for live
/// registry ids inside serialized documents, so they are restricted to
/// filesystem-safe characters: ASCII alphanumerics, `_`, `-` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Creates a validated layer identity.
    ///
    /// Surrounding whitespace is trimmed. An empty or unsafe value is
    /// rejected rather than silently normalized.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyLayerId);
        }
        if let Some(ch) = trimmed.chars().find(|ch| !is_identity_char(*ch)) {
            return Err(ModelError::InvalidLayerId {
                value: trimmed.to_string(),
                ch,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for LayerId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

fn is_identity_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_table_names() {
        for name in ["parcels", "od_zones", "tiles-2024", "qgep.vw_reach"] {
            let id = LayerId::new(name).unwrap();
            assert_eq!(id.as_str(), name);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let id = LayerId::new("  parcels ").unwrap();
        assert_eq!(id.as_str(), "parcels");
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(LayerId::new(""), Err(ModelError::EmptyLayerId));
        assert_eq!(LayerId::new("   "), Err(ModelError::EmptyLayerId));
    }

    #[test]
    fn rejects_path_separators() {
        let err = LayerId::new("a/b").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidLayerId {
                value: "a/b".to_string(),
                ch: '/',
            }
        );
    }

    #[test]
    fn display_matches_as_str() {
        let id = LayerId::new("owners").unwrap();
        assert_eq!(id.to_string(), "owners");
    }
}
