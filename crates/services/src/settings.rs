/// Tuning knobs for `QuizService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    /// How many get/compute/put cycles to try before reporting contention.
    max_attempts: u32,
}

impl QuizSettings {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Build settings; `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}
