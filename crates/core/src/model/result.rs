use serde::{Deserialize, Serialize};

use super::session::SessionState;
use super::word::{HintImage, TargetWord};

/// Payload returned after a Guess, RequestHint, or GiveUp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub current_target_index: u32,
    pub current_hint_index: u32,
    pub score: u32,
    /// Whether the submitted estimate was correct.
    pub result: bool,
    pub trial: u32,
    /// The answer, only once its round is over.
    pub target: Option<TargetWord>,
    pub end: bool,
}

impl QuizResult {
    /// Snapshot the counters of `state` after a transition.
    #[must_use]
    pub fn from_state(state: &SessionState, result: bool, target: Option<TargetWord>) -> Self {
        Self {
            current_target_index: state.current_target_index(),
            current_hint_index: state.current_hint_index(),
            score: state.score(),
            result,
            trial: state.trial(),
            target,
            end: state.is_ended(),
        }
    }
}

/// Payload returned when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSettings {
    /// Hint images for each target, in target order.
    pub hint_images: Vec<Vec<HintImage>>,
    pub current_target_index: u32,
    pub current_hint_index: u32,
    pub score: u32,
}
