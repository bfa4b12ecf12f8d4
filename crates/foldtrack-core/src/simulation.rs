//! Simulated hinge for hardware without a hinge sensor.
//!
//! Draws a pseudo-random angle on a fixed period and feeds it through the
//! same state machine as real sensor readings. This is a dev/test affordance
//! to keep the whole pipeline exercised, not production behavior. Seeded PCG
//! keeps runs reproducible.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::detector::{HingeSample, MAX_ANGLE_DEG};

/// How often the fallback draws a sample.
pub const SIMULATION_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SimulatedHinge {
    rng: Pcg32,
}

impl SimulatedHinge {
    /// Deterministic simulation from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Non-deterministic simulation (seeded from the OS).
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::from_entropy(),
        }
    }

    /// Draw the next simulated reading, uniform over the hinge range.
    pub fn next_sample(&mut self) -> HingeSample {
        HingeSample::new(self.rng.gen_range(0..=MAX_ANGLE_DEG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let mut sim = SimulatedHinge::new(42);
        for _ in 0..1000 {
            let sample = sim.next_sample();
            assert!(sample.validate().is_ok());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimulatedHinge::new(7);
        let mut b = SimulatedHinge::new(7);
        for _ in 0..50 {
            assert_eq!(a.next_sample().angle, b.next_sample().angle);
        }
    }
}
