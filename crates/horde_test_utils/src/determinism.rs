//! Determinism testing utilities.
//!
//! The simulation must be a pure function of seed, configuration and the
//! input sequence. Sources of divergence to watch for:
//!
//! - **Unseeded randomness**: every roll must come from the world RNG.
//! - **HashMap iteration order**: stores are plain vectors, tables are
//!   `BTreeMap`s.
//! - **Wall-clock time**: the simulation clock only advances by `dt`.

use std::thread;

use horde_core::simulation::Simulation;

use crate::fixtures::{scripted_input, DT};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation `runs` times with [`scripted_input`] and compare hashes.
pub fn verify_determinism<F>(runs: usize, ticks: u64, setup: F) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut sim = setup();
            for frame in 0..ticks {
                sim.tick(DT, &scripted_input(frame));
            }
            sim.state_hash()
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks,
    }
}

/// Like [`verify_determinism`], but each run gets its own thread.
pub fn verify_determinism_parallel<F>(runs: usize, ticks: u64, setup: F) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup();
                    for frame in 0..ticks {
                        sim.tick(DT, &scripted_input(frame));
                    }
                    sim.state_hash()
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.len() == runs && hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks,
    }
}

/// Compare two runs tick by tick. Returns the first tick whose hashes
/// differ, or `None`.
pub fn find_first_divergence<F>(setup: F, ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut a = setup();
    let mut b = setup();
    if a.state_hash() != b.state_hash() {
        return Some(0);
    }
    for frame in 0..ticks {
        let input = scripted_input(frame);
        a.tick(DT, &input);
        b.tick(DT, &input);
        if a.state_hash() != b.state_hash() {
            tracing::warn!(tick = frame + 1, "simulations diverged");
            return Some(frame + 1);
        }
    }
    None
}
