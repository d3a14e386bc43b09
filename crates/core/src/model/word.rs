use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::CatalogError;

/// The secret word a player has to guess.
///
/// Comparison against guesses is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetWord(String);

impl TargetWord {
    /// # Errors
    ///
    /// Returns `CatalogError::BlankTarget` if the word is empty or only whitespace.
    pub fn new(word: impl Into<String>) -> Result<Self, CatalogError> {
        let word = word.into();
        if word.trim().is_empty() {
            return Err(CatalogError::BlankTarget);
        }
        Ok(Self(word))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact match against a player's estimate.
    #[must_use]
    pub fn matches(&self, estimation: &str) -> bool {
        self.0 == estimation
    }
}

impl fmt::Display for TargetWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque hint image payload (base64 text in the shipped dataset).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintImage(String);

impl HintImage {
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Payloads can be hundreds of kilobytes; keep debug output short.
impl fmt::Debug for HintImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HintImage({} bytes)", self.0.len())
    }
}
