//! Injectable randomness.
//!
//! The pipeline draws every stochastic decision (corruption, flipped bit
//! positions, loss) through [`RandomSource`], so a seeded
//! `rand::rngs::StdRng` pins a run exactly.

use rand::Rng;
use rand::RngExt;

/// Source of the uniform draws consumed by the pipeline.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn index(&mut self, n: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn index(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn seeded_sources_agree() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(a.uniform(), b.uniform());
            assert_eq!(a.index(13), b.index(13));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.index(5) < 5);
        }
    }
}
