use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quiz_core::picker::TargetPicker;

/// Uniform target picker backed by `rand`.
#[derive(Debug, Default)]
pub struct RandomPicker {
    seeded: Option<StdRng>,
}

impl RandomPicker {
    /// Picker drawing from the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible picker for demos and tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TargetPicker for RandomPicker {
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        match self.seeded.as_mut() {
            Some(rng) => rng.random_range(0..len),
            None => rand::rng().random_range(0..len),
        }
    }
}
