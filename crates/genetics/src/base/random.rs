//! Random draws consumed by the genetics model.
//!
//! Every stochastic operation in the crate takes a `RandomSource`. The trait
//! is implemented for any `rand::Rng`, so seeded generators such as
//! `Xoshiro256PlusPlus` can be passed directly.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Exp, Gamma, Normal, Poisson};

/// Capability interface for the random draws used by the genetics model.
pub trait RandomSource {
    /// Uniform integer in `[0, n)` for 16-bit ranges. Returns 0 when `n == 0`.
    fn uniform16(&mut self, n: u16) -> u16;

    /// Uniform integer in `[0, n)` for 32-bit ranges. Returns 0 when `n == 0`.
    fn uniform32(&mut self, n: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Gamma-distributed draw with the given shape and scale.
    fn gamma(&mut self, shape: f64, scale: f64) -> f64;

    /// Negative-binomial draw: the number of failures before `successes`
    /// successes, each success having probability `p`.
    fn negative_binomial(&mut self, successes: f64, p: f64) -> u64;

    /// Bernoulli draw that is true with probability `p`.
    fn probability_draw(&mut self, p: f64) -> bool;

    /// Binomial draw over `n` trials with success probability `p`.
    fn binomial(&mut self, n: u64, p: f64) -> u64;

    /// Normally distributed draw.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Exponentially distributed draw with the given rate.
    fn exponential(&mut self, rate: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform16(&mut self, n: u16) -> u16 {
        if n == 0 {
            return 0;
        }
        self.random_range(0..n)
    }

    #[inline]
    fn uniform32(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.random_range(0..n)
    }

    #[inline]
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn gamma(&mut self, shape: f64, scale: f64) -> f64 {
        match Gamma::new(shape, scale) {
            Ok(dist) => dist.sample(self),
            Err(_) => 0.0,
        }
    }

    fn negative_binomial(&mut self, successes: f64, p: f64) -> u64 {
        if p <= 0.0 || p >= 1.0 {
            return 0;
        }
        // Gamma-Poisson mixture
        let lambda = self.gamma(successes, (1.0 - p) / p);
        if lambda <= 0.0 {
            return 0;
        }
        match Poisson::new(lambda) {
            Ok(dist) => {
                let draw: f64 = dist.sample(self);
                draw as u64
            }
            Err(_) => 0,
        }
    }

    #[inline]
    fn probability_draw(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.random::<f64>() < p
        }
    }

    fn binomial(&mut self, n: u64, p: f64) -> u64 {
        if n == 0 || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        match Binomial::new(n, p) {
            Ok(dist) => dist.sample(self),
            Err(_) => 0,
        }
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(self),
            Err(_) => mean,
        }
    }

    fn exponential(&mut self, rate: f64) -> f64 {
        match Exp::new(rate) {
            Ok(dist) => dist.sample(self),
            Err(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_uniform_ranges() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(rng.uniform16(24) < 24);
            assert!(rng.uniform32(1_000_000) < 1_000_000);
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
        assert_eq!(rng.uniform16(0), 0);
        assert_eq!(rng.uniform32(0), 0);
    }

    #[test]
    fn test_gamma_mean() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.gamma(2.0, 0.38)).sum::<f64>() / n as f64;
        assert!((mean - 0.76).abs() < 0.03, "mean = {mean}");
    }

    #[test]
    fn test_negative_binomial_mean() {
        // mean = r (1 - p) / p
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let n = 20_000;
        let mean: f64 =
            (0..n).map(|_| rng.negative_binomial(12.0, 0.5) as f64).sum::<f64>() / n as f64;
        assert!((mean - 12.0).abs() < 0.5, "mean = {mean}");
        assert_eq!(rng.negative_binomial(12.0, 0.0), 0);
    }

    #[test]
    fn test_probability_draw_edges() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        assert!(!rng.probability_draw(0.0));
        assert!(rng.probability_draw(1.0));
    }

    #[test]
    fn test_binomial_edges() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        assert_eq!(rng.binomial(0, 0.5), 0);
        assert_eq!(rng.binomial(100, 0.0), 0);
        assert_eq!(rng.binomial(100, 1.0), 100);
        assert!(rng.binomial(100, 0.3) <= 100);
    }
}
