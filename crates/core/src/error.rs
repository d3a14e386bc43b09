use thiserror::Error;

use crate::model::CatalogError;

/// Errors raised by the progression engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("an estimate is required")]
    EmptyEstimate,

    #[error("all hints have already been revealed")]
    NoMoreHints,

    #[error("session has already ended")]
    SessionEnded,

    #[error("picked index {index} outside catalog of {len} targets")]
    PickOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
