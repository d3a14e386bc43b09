//! Quiz progression engine.
//!
//! Pure functions from a `SessionState` and an action to the next state and
//! the payload returned to the player. Nothing here touches storage; callers
//! load the state, apply one action, and persist the returned state.

use crate::error::QuizError;
use crate::model::{
    CatalogError, HintCatalog, InitialSettings, QuizResult, SessionState, TargetWord, points_for,
};
use crate::picker::TargetPicker;

/// A mutating request against an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    Guess(&'a str),
    RequestHint,
    GiveUp,
}

/// Next state plus the result to hand back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub result: QuizResult,
}

/// What a guess does to the session, once it has been counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Correct, more targets remain: score and move to the next target.
    Solve,
    /// Correct on the last target: score and end.
    SolveFinal,
    /// Wrong with attempts left on this hint.
    Retry,
    /// Wrong, attempts exhausted, another hint is available.
    NextHint,
    /// Wrong, every hint exhausted, more targets remain.
    Skip,
    /// Wrong, every hint exhausted on the last target.
    Finish,
}

/// Decision table for a guess.
#[must_use]
pub fn decide(correct: bool, trials_exhausted: bool, last_hint: bool, last_target: bool) -> Step {
    match (correct, trials_exhausted, last_hint, last_target) {
        (true, _, _, false) => Step::Solve,
        (true, _, _, true) => Step::SolveFinal,
        (false, false, _, _) => Step::Retry,
        (false, true, false, _) => Step::NextHint,
        (false, true, true, false) => Step::Skip,
        (false, true, true, true) => Step::Finish,
    }
}

/// Start a session: pick the targets and collect their hint images.
///
/// # Errors
///
/// Returns `QuizError::Catalog` if the catalog is empty, or
/// `QuizError::PickOutOfRange` if the picker returns an index past the end.
pub fn init(
    catalog: &HintCatalog,
    picker: &mut dyn TargetPicker,
) -> Result<(SessionState, InitialSettings), QuizError> {
    let words: Vec<&TargetWord> = catalog.targets().collect();
    if words.is_empty() {
        return Err(CatalogError::Empty.into());
    }

    let mut pick = || -> Result<TargetWord, QuizError> {
        let len = words.len();
        let index = picker.pick_index(len);
        words
            .get(index)
            .map(|w| (*w).clone())
            .ok_or(QuizError::PickOutOfRange { index, len })
    };
    let targets = [pick()?, pick()?, pick()?];

    let mut hint_images = Vec::with_capacity(targets.len());
    for target in &targets {
        hint_images.push(catalog.hints(target)?.to_vec());
    }

    let state = SessionState::start(targets);
    let settings = InitialSettings {
        hint_images,
        current_target_index: state.current_target_index(),
        current_hint_index: state.current_hint_index(),
        score: state.score(),
    };
    Ok((state, settings))
}

/// Apply one action to `state`.
///
/// # Errors
///
/// - `QuizError::EmptyEstimate` for a guess with an empty string.
/// - `QuizError::SessionEnded` if the session is already over.
/// - `QuizError::NoMoreHints` for a hint request on the last hint.
pub fn apply(state: &SessionState, action: Action<'_>) -> Result<Transition, QuizError> {
    if let Action::Guess("") = action {
        return Err(QuizError::EmptyEstimate);
    }
    if state.is_ended() {
        return Err(QuizError::SessionEnded);
    }

    match action {
        Action::Guess(estimation) => Ok(guess(state, estimation)),
        Action::RequestHint => request_hint(state),
        Action::GiveUp => Ok(give_up(state)),
    }
}

fn guess(state: &SessionState, estimation: &str) -> Transition {
    let mut next = state.clone();
    next.record_trial();

    let target = next.current_target().clone();
    let correct = target.matches(estimation);
    let step = decide(
        correct,
        next.trials_exhausted(),
        next.is_last_hint(),
        next.is_last_target(),
    );

    let revealed = match step {
        Step::Solve => {
            next.award(points_for(next.trial(), next.current_hint_index()));
            next.advance_target();
            Some(target)
        }
        Step::SolveFinal => {
            next.award(points_for(next.trial(), next.current_hint_index()));
            next.finish();
            Some(target)
        }
        Step::Retry => None,
        Step::NextHint => {
            next.advance_hint();
            None
        }
        Step::Skip => {
            next.advance_target();
            Some(target)
        }
        Step::Finish => {
            next.finish();
            Some(target)
        }
    };

    let result = QuizResult::from_state(&next, correct, revealed);
    Transition {
        state: next,
        result,
    }
}

fn request_hint(state: &SessionState) -> Result<Transition, QuizError> {
    if state.is_last_hint() {
        return Err(QuizError::NoMoreHints);
    }
    let mut next = state.clone();
    next.advance_hint();
    let result = QuizResult::from_state(&next, false, None);
    Ok(Transition {
        state: next,
        result,
    })
}

fn give_up(state: &SessionState) -> Transition {
    let mut next = state.clone();
    let target = next.current_target().clone();
    if next.is_last_target() {
        next.finish();
    } else {
        next.advance_target();
    }
    let result = QuizResult::from_state(&next, false, Some(target));
    Transition {
        state: next,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HINTS_PER_TARGET, MAX_TRIALS, TARGETS_PER_SESSION};
    use crate::picker::SequencePicker;

    fn catalog() -> HintCatalog {
        HintCatalog::from_groups([
            ("apple", vec!["a0", "a1", "a2"]),
            ("bird", vec!["b0", "b1", "b2"]),
            ("cloud", vec!["c0", "c1", "c2"]),
        ])
        .unwrap()
    }

    fn started() -> SessionState {
        let mut picker = SequencePicker::new([0, 1, 2]);
        init(&catalog(), &mut picker).unwrap().0
    }

    fn at(target: u32, hint: u32, trial: u32, score: u32) -> SessionState {
        SessionState::from_persisted(
            started().targets().to_vec(),
            target,
            hint,
            trial,
            score,
            false,
        )
        .unwrap()
    }

    fn step(state: &SessionState, action: Action<'_>) -> Transition {
        apply(state, action).unwrap()
    }

    fn assert_ranges(state: &SessionState) {
        assert!(state.current_target_index() < TARGETS_PER_SESSION as u32);
        assert!(state.current_hint_index() < HINTS_PER_TARGET as u32);
        assert!(state.trial() <= MAX_TRIALS);
    }

    #[test]
    fn decision_table_is_exhaustive() {
        for bits in 0_u8..16 {
            let correct = bits & 1 != 0;
            let exhausted = bits & 2 != 0;
            let last_hint = bits & 4 != 0;
            let last_target = bits & 8 != 0;
            let step = decide(correct, exhausted, last_hint, last_target);
            match step {
                Step::Solve | Step::SolveFinal => assert!(correct),
                Step::Retry => assert!(!correct && !exhausted),
                Step::NextHint => assert!(!correct && exhausted && !last_hint),
                Step::Skip => assert!(!correct && exhausted && last_hint && !last_target),
                Step::Finish => assert!(!correct && exhausted && last_hint && last_target),
            }
        }
    }

    #[test]
    fn init_picks_with_replacement_and_groups_hints() {
        let mut picker = SequencePicker::new([2, 2, 0]);
        let (state, settings) = init(&catalog(), &mut picker).unwrap();
        let words: Vec<&str> = state.targets().iter().map(TargetWord::as_str).collect();
        assert_eq!(words, ["cloud", "cloud", "apple"]);
        assert_eq!(settings.hint_images.len(), 3);
        assert_eq!(settings.hint_images[2][1].as_str(), "a1");
        assert_eq!(settings.score, 0);
        assert_eq!(settings.current_target_index, 0);
        assert_eq!(settings.current_hint_index, 0);
    }

    #[test]
    fn init_on_empty_catalog_fails() {
        let mut picker = SequencePicker::new([0]);
        let err = init(&HintCatalog::new(), &mut picker).unwrap_err();
        assert_eq!(err, QuizError::Catalog(CatalogError::Empty));
    }

    #[test]
    fn init_rejects_out_of_range_pick() {
        struct Wild;
        impl TargetPicker for Wild {
            fn pick_index(&mut self, len: usize) -> usize {
                len
            }
        }
        let err = init(&catalog(), &mut Wild).unwrap_err();
        assert_eq!(err, QuizError::PickOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn correct_first_guess_scores_nine_and_advances() {
        let t = step(&started(), Action::Guess("apple"));
        assert!(t.result.result);
        assert_eq!(t.result.score, 9);
        assert_eq!(t.result.target.as_ref().map(TargetWord::as_str), Some("apple"));
        assert!(!t.result.end);
        assert_eq!(t.state.current_target_index(), 1);
        assert_eq!(t.state.current_hint_index(), 0);
        assert_eq!(t.state.trial(), 0);
    }

    #[test]
    fn guess_match_is_case_sensitive() {
        let t = step(&started(), Action::Guess("Apple"));
        assert!(!t.result.result);
        assert_eq!(t.state.trial(), 1);
        assert_eq!(t.result.target, None);
    }

    #[test]
    fn three_misses_reveal_next_hint() {
        let mut state = started();
        for expected_trial in 1..MAX_TRIALS {
            let t = step(&state, Action::Guess("nope"));
            assert_eq!(t.state.trial(), expected_trial);
            assert_eq!(t.result.target, None);
            state = t.state;
        }
        let t = step(&state, Action::Guess("nope"));
        assert_eq!(t.state.current_hint_index(), 1);
        assert_eq!(t.state.trial(), 0);
        assert_eq!(t.state.current_target_index(), 0);
        assert_eq!(t.result.target, None);
        assert!(!t.result.end);
    }

    #[test]
    fn exhausting_last_hint_skips_to_next_target() {
        let state = at(0, 2, 2, 0);
        let t = step(&state, Action::Guess("nope"));
        assert_eq!(t.state.current_target_index(), 1);
        assert_eq!(t.state.current_hint_index(), 0);
        assert_eq!(t.state.trial(), 0);
        assert_eq!(t.result.target.as_ref().map(TargetWord::as_str), Some("apple"));
        assert!(!t.result.end);
        assert!(!t.result.result);
    }

    #[test]
    fn exhausting_everything_on_last_target_ends() {
        let state = at(2, 2, 2, 5);
        let t = step(&state, Action::Guess("nope"));
        assert!(t.result.end);
        assert!(t.state.is_ended());
        assert_eq!(t.result.target.as_ref().map(TargetWord::as_str), Some("cloud"));
        assert_eq!(t.state.current_target_index(), 2);
        assert_eq!(t.state.current_hint_index(), 2);
        assert_eq!(t.state.trial(), 3);
        assert_eq!(t.state.score(), 5);
    }

    #[test]
    fn correct_on_last_target_ends_and_keeps_indices() {
        let state = at(2, 1, 1, 10);
        let t = step(&state, Action::Guess("cloud"));
        assert!(t.result.end);
        assert!(t.result.result);
        // (4 - 2) * (3 - 1)
        assert_eq!(t.result.score, 14);
        assert_eq!(t.result.trial, 2);
        assert_eq!(t.state.current_target_index(), 2);
        assert_eq!(t.state.current_hint_index(), 1);
    }

    #[test]
    fn empty_estimate_is_rejected() {
        assert_eq!(
            apply(&started(), Action::Guess("")),
            Err(QuizError::EmptyEstimate)
        );
    }

    #[test]
    fn request_hint_resets_trial_without_scoring() {
        let state = at(1, 0, 2, 9);
        let t = step(&state, Action::RequestHint);
        assert_eq!(t.state.current_hint_index(), 1);
        assert_eq!(t.state.trial(), 0);
        assert_eq!(t.state.score(), 9);
        assert_eq!(t.state.current_target_index(), 1);
        assert!(!t.result.result);
        assert_eq!(t.result.target, None);
        assert!(!t.result.end);
    }

    #[test]
    fn request_hint_on_last_hint_fails() {
        let state = at(0, 2, 1, 0);
        assert_eq!(apply(&state, Action::RequestHint), Err(QuizError::NoMoreHints));
    }

    #[test]
    fn give_up_mid_session_reveals_and_advances() {
        let state = at(1, 1, 2, 9);
        let t = step(&state, Action::GiveUp);
        assert_eq!(t.result.target.as_ref().map(TargetWord::as_str), Some("bird"));
        assert_eq!(t.state.current_target_index(), 2);
        assert_eq!(t.state.current_hint_index(), 0);
        assert_eq!(t.state.trial(), 0);
        assert_eq!(t.state.score(), 9);
        assert!(!t.result.end);
    }

    #[test]
    fn give_up_on_last_target_ends_with_counters_unchanged() {
        let state = at(2, 1, 2, 4);
        let t = step(&state, Action::GiveUp);
        assert!(t.result.end);
        assert_eq!(t.result.trial, 2);
        assert_eq!(t.result.current_hint_index, 1);
        assert_eq!(t.result.score, 4);
        assert_eq!(t.result.target.as_ref().map(TargetWord::as_str), Some("cloud"));
    }

    #[test]
    fn ended_session_rejects_every_action() {
        let ended = step(&at(2, 0, 0, 0), Action::GiveUp).state;
        assert_eq!(apply(&ended, Action::Guess("cloud")), Err(QuizError::SessionEnded));
        assert_eq!(apply(&ended, Action::RequestHint), Err(QuizError::SessionEnded));
        assert_eq!(apply(&ended, Action::GiveUp), Err(QuizError::SessionEnded));
    }

    #[test]
    fn replaying_a_guess_is_deterministic() {
        let state = at(1, 1, 1, 9);
        let first = step(&state, Action::Guess("bird"));
        let second = step(&state, Action::Guess("bird"));
        assert_eq!(first, second);
    }

    #[test]
    fn invariants_hold_over_scripted_play() {
        let script = [
            Action::Guess("x"),
            Action::RequestHint,
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("bird"),
            Action::RequestHint,
            Action::RequestHint,
            Action::Guess("x"),
            Action::Guess("x"),
            Action::Guess("x"),
        ];

        let mut state = started();
        for action in script {
            let before = state.clone();
            let t = step(&state, action);
            assert_ranges(&t.state);
            assert!(t.state.score() >= before.score());
            if t.state.score() > before.score() {
                assert!(matches!(action, Action::Guess(_)) && t.result.result);
            }
            let moved = t.state.current_hint_index() != before.current_hint_index()
                || t.state.current_target_index() != before.current_target_index();
            if moved {
                assert_eq!(t.state.trial(), 0);
            }
            state = t.state;
        }
        assert!(state.is_ended());
        assert_eq!(state.score(), 9);
    }
}
