use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies the player a quiz session belongs to.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a new `PlayerId`.
    ///
    /// # Errors
    ///
    /// Returns `ParsePlayerIdError` if the id is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ParsePlayerIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParsePlayerIdError);
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing a player id from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePlayerIdError;

impl fmt::Display for ParsePlayerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("player id must not be blank")
    }
}

impl std::error::Error for ParsePlayerIdError {}

impl FromStr for PlayerId {
    type Err = ParsePlayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = ParsePlayerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_rejects_blank() {
        assert_eq!("   ".parse::<PlayerId>(), Err(ParsePlayerIdError));
        assert!(PlayerId::new("").is_err());
    }

    #[test]
    fn player_id_display_is_raw_value() {
        let id: PlayerId = "user-7".parse().unwrap();
        assert_eq!(id.to_string(), "user-7");
        assert_eq!(format!("{id:?}"), "PlayerId(user-7)");
    }

    #[test]
    fn player_id_deserialize_validates() {
        let ok: PlayerId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok.as_str(), "abc");
        assert!(serde_json::from_str::<PlayerId>("\"\"").is_err());
    }
}
