//! Deterministic random number generation for synthetic scenarios.
//!
//! RULE: Scenario generation never calls a platform RNG.
//! Each cardholder gets its own stream, seeded from
//! (master_seed XOR stream_index × golden-ratio constant), so adding a
//! cardholder never changes another cardholder's generated activity.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct ScenarioRng {
    inner: Pcg64Mcg,
}

impl ScenarioRng {
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). Returns 0 when n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi].
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_u64_below((hi - lo + 1) as u64) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Normal sample via Box-Muller.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * std_dev
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }
}
