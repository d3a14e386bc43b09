use thiserror::Error;

use super::word::TargetWord;
use super::{HINTS_PER_TARGET, MAX_TRIALS, TARGETS_PER_SESSION};

const LAST_TARGET: u32 = (TARGETS_PER_SESSION - 1) as u32;
const LAST_HINT: u32 = (HINTS_PER_TARGET - 1) as u32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("expected 3 targets, found {len}")]
    TargetCount { len: usize },

    #[error("target index out of range: {index}")]
    TargetIndex { index: u32 },

    #[error("hint index out of range: {index}")]
    HintIndex { index: u32 },

    #[error("trial out of range: {trial}")]
    Trial { trial: u32 },
}

/// Points for solving a target on `trial` with `hint_index` extra hints shown.
///
/// `(4 - trial) * (3 - hint_index)`: 9 on the first try with only the first
/// hint visible, down to 1 on the last try with every hint revealed.
#[must_use]
pub fn points_for(trial: u32, hint_index: u32) -> u32 {
    let hints = u32::try_from(HINTS_PER_TARGET).unwrap_or(u32::MAX);
    (MAX_TRIALS + 1).saturating_sub(trial) * hints.saturating_sub(hint_index)
}

/// Per-player progression through one quiz.
///
/// Values are only ever produced by `start`, `from_persisted`, or the
/// progression engine, so the index ranges always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    targets: [TargetWord; TARGETS_PER_SESSION],
    current_target_index: u32,
    current_hint_index: u32,
    trial: u32,
    score: u32,
    ended: bool,
}

impl SessionState {
    /// A fresh session: first target, first hint, no guesses, no points.
    #[must_use]
    pub fn start(targets: [TargetWord; TARGETS_PER_SESSION]) -> Self {
        Self {
            targets,
            current_target_index: 0,
            current_hint_index: 0,
            trial: 0,
            score: 0,
            ended: false,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// A live session never rests at `trial == MAX_TRIALS`: exhausting a hint
    /// either moves on or ends the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if any counter is outside its range.
    pub fn from_persisted(
        targets: Vec<TargetWord>,
        current_target_index: u32,
        current_hint_index: u32,
        trial: u32,
        score: u32,
        ended: bool,
    ) -> Result<Self, SessionStateError> {
        let targets: [TargetWord; TARGETS_PER_SESSION] = targets
            .try_into()
            .map_err(|t: Vec<TargetWord>| SessionStateError::TargetCount { len: t.len() })?;
        if current_target_index > LAST_TARGET {
            return Err(SessionStateError::TargetIndex {
                index: current_target_index,
            });
        }
        if current_hint_index > LAST_HINT {
            return Err(SessionStateError::HintIndex {
                index: current_hint_index,
            });
        }
        if trial > MAX_TRIALS || (trial == MAX_TRIALS && !ended) {
            return Err(SessionStateError::Trial { trial });
        }

        Ok(Self {
            targets,
            current_target_index,
            current_hint_index,
            trial,
            score,
            ended,
        })
    }

    #[must_use]
    pub fn targets(&self) -> &[TargetWord; TARGETS_PER_SESSION] {
        &self.targets
    }

    #[must_use]
    pub fn current_target_index(&self) -> u32 {
        self.current_target_index
    }

    #[must_use]
    pub fn current_hint_index(&self) -> u32 {
        self.current_hint_index
    }

    #[must_use]
    pub fn trial(&self) -> u32 {
        self.trial
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// True once the last target has been solved, failed, or given up.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[must_use]
    pub fn current_target(&self) -> &TargetWord {
        // current_target_index <= LAST_TARGET by construction
        &self.targets[self.current_target_index as usize]
    }

    #[must_use]
    pub fn is_last_target(&self) -> bool {
        self.current_target_index == LAST_TARGET
    }

    #[must_use]
    pub fn is_last_hint(&self) -> bool {
        self.current_hint_index == LAST_HINT
    }

    #[must_use]
    pub fn trials_exhausted(&self) -> bool {
        self.trial >= MAX_TRIALS
    }

    pub(crate) fn record_trial(&mut self) {
        self.trial = (self.trial + 1).min(MAX_TRIALS);
    }

    pub(crate) fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub(crate) fn advance_hint(&mut self) {
        self.current_hint_index = (self.current_hint_index + 1).min(LAST_HINT);
        self.trial = 0;
    }

    pub(crate) fn advance_target(&mut self) {
        self.current_target_index = (self.current_target_index + 1).min(LAST_TARGET);
        self.current_hint_index = 0;
        self.trial = 0;
    }

    pub(crate) fn finish(&mut self) {
        self.ended = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<TargetWord> {
        ["cat", "dog", "owl"]
            .into_iter()
            .map(|w| TargetWord::new(w).unwrap())
            .collect()
    }

    #[test]
    fn points_table() {
        assert_eq!(points_for(1, 0), 9);
        assert_eq!(points_for(3, 0), 3);
        assert_eq!(points_for(1, 2), 3);
        assert_eq!(points_for(3, 2), 1);
    }

    #[test]
    fn from_persisted_accepts_valid_record() {
        let state = SessionState::from_persisted(words(), 2, 1, 2, 14, false).unwrap();
        assert_eq!(state.current_target().as_str(), "owl");
        assert!(state.is_last_target());
        assert!(!state.is_last_hint());
    }

    #[test]
    fn from_persisted_rejects_out_of_range() {
        assert_eq!(
            SessionState::from_persisted(words(), 3, 0, 0, 0, false),
            Err(SessionStateError::TargetIndex { index: 3 })
        );
        assert_eq!(
            SessionState::from_persisted(words(), 0, 3, 0, 0, false),
            Err(SessionStateError::HintIndex { index: 3 })
        );
        assert_eq!(
            SessionState::from_persisted(words(), 0, 0, 4, 0, true),
            Err(SessionStateError::Trial { trial: 4 })
        );
        assert_eq!(
            SessionState::from_persisted(words()[..2].to_vec(), 0, 0, 0, 0, false),
            Err(SessionStateError::TargetCount { len: 2 })
        );
    }

    #[test]
    fn exhausted_trial_only_valid_when_ended() {
        assert!(SessionState::from_persisted(words(), 2, 2, 3, 0, false).is_err());
        assert!(SessionState::from_persisted(words(), 2, 2, 3, 0, true).is_ok());
    }

    #[test]
    fn advancing_target_resets_hint_and_trial() {
        let mut state = SessionState::from_persisted(words(), 0, 2, 2, 0, false).unwrap();
        state.advance_target();
        assert_eq!(state.current_target_index(), 1);
        assert_eq!(state.current_hint_index(), 0);
        assert_eq!(state.trial(), 0);
    }
}
