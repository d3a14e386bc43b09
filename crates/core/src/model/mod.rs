mod catalog;
mod ids;
mod result;
mod session;
mod word;

/// Number of targets assigned to every session.
pub const TARGETS_PER_SESSION: usize = 3;
/// Number of hint images stored for every target word.
pub const HINTS_PER_TARGET: usize = 3;
/// Guesses allowed against a single hint before it is exhausted.
pub const MAX_TRIALS: u32 = 3;

pub use catalog::{CatalogError, HintCatalog};
pub use ids::{ParsePlayerIdError, PlayerId};
pub use result::{InitialSettings, QuizResult};
pub use session::{SessionState, SessionStateError, points_for};
pub use word::{HintImage, TargetWord};
