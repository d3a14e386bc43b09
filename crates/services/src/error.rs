//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuizError;
use quiz_core::model::CatalogError;
use storage::repository::StorageError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    /// Bad caller input; retrying the same request will fail again.
    #[error("{0}")]
    Validation(String),
    /// No session for this player; start one with Init.
    #[error("no quiz session for player {player}")]
    UnknownPlayer { player: String },
    #[error("all hints have already been revealed")]
    NoMoreHints,
    #[error("quiz session has already ended")]
    SessionEnded,
    /// Gave up after repeated revision conflicts with other requests for the same player.
    #[error("session for player {player} kept changing; gave up after {attempts} attempts")]
    Contended { player: String, attempts: u32 },
    /// A fault inside the service, such as a picker returning an index past the catalog.
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<QuizError> for QuizServiceError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::EmptyEstimate => Self::Validation(err.to_string()),
            QuizError::NoMoreHints => Self::NoMoreHints,
            QuizError::SessionEnded => Self::SessionEnded,
            QuizError::Catalog(inner) => Self::Catalog(inner),
            QuizError::PickOutOfRange { .. } => Self::Internal(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_estimate_maps_to_validation() {
        let err = QuizServiceError::from(QuizError::EmptyEstimate);
        assert!(matches!(err, QuizServiceError::Validation(ref m) if m == "an estimate is required"));
    }

    #[test]
    fn engine_state_errors_keep_their_kind() {
        assert!(matches!(
            QuizServiceError::from(QuizError::NoMoreHints),
            QuizServiceError::NoMoreHints
        ));
        assert!(matches!(
            QuizServiceError::from(QuizError::SessionEnded),
            QuizServiceError::SessionEnded
        ));
        assert!(matches!(
            QuizServiceError::from(QuizError::Catalog(CatalogError::Empty)),
            QuizServiceError::Catalog(CatalogError::Empty)
        ));
    }

    #[test]
    fn bad_pick_is_internal_not_caller_input() {
        let err = QuizServiceError::from(QuizError::PickOutOfRange { index: 5, len: 2 });
        assert!(matches!(err, QuizServiceError::Internal(ref m) if m.contains('5')));
    }
}
