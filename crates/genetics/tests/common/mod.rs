//! Shared helpers for the integration tests.

use plasmogen_genetics::RandomSource;

/// Random source that returns fixed draws, for tests that pin exact outcomes.
///
/// Uniform draws return the configured value clamped below `n`. Gamma draws
/// are large enough that every secondary crossover falls off its chromosome.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedSource {
    small: u16,
    large: u32,
}

impl ScriptedSource {
    pub fn new(small: u16, large: u32) -> Self {
        Self { small, large }
    }
}

impl RandomSource for ScriptedSource {
    fn uniform16(&mut self, n: u16) -> u16 {
        self.small.min(n.saturating_sub(1))
    }

    fn uniform32(&mut self, n: u32) -> u32 {
        self.large.min(n.saturating_sub(1))
    }

    fn unit(&mut self) -> f64 {
        0.0
    }

    fn gamma(&mut self, _shape: f64, _scale: f64) -> f64 {
        1_000.0
    }

    fn negative_binomial(&mut self, _successes: f64, _p: f64) -> u64 {
        0
    }

    fn probability_draw(&mut self, _p: f64) -> bool {
        false
    }

    fn binomial(&mut self, _n: u64, _p: f64) -> u64 {
        0
    }

    fn gaussian(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }

    fn exponential(&mut self, rate: f64) -> f64 {
        1.0 / rate
    }
}
