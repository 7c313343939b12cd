//! Sources of the `[0, 1]` samples that drive utilization noise.
//!
//! The simulation never reaches for ambient randomness. Callers inject a
//! [`SampleSource`]: a fixed [`SeedSequence`] for reproducible runs, a seeded
//! or OS-seeded [`RngSampleSource`] for interactive use, or a
//! [`ConstantSample`] for noise-free runs.

use {
    log::warn,
    rand::{rngs::StdRng, Rng, SeedableRng},
};

/// Produces one sample in `[0, 1]` per simulated block.
pub trait SampleSource {
    fn next_sample(&mut self) -> f64;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn next_sample(&mut self) -> f64 {
        (**self).next_sample()
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_sample(&mut self) -> f64 {
        (**self).next_sample()
    }
}

/// Neutral sample: `generate_utilization` adds no noise at 0.5.
pub const MIDPOINT: f64 = 0.5;

/// Replays a fixed sequence of samples in order.
#[derive(Debug, Clone)]
pub struct SeedSequence<'a> {
    seeds: &'a [f64],
    position: usize,
}

impl<'a> SeedSequence<'a> {
    pub fn new(seeds: &'a [f64]) -> Self {
        Self { seeds, position: 0 }
    }

    /// Samples not yet consumed.
    pub fn remaining(&self) -> usize {
        self.seeds.len().saturating_sub(self.position)
    }
}

impl SampleSource for SeedSequence<'_> {
    /// Returns the next seed. Once exhausted it yields [`MIDPOINT`].
    fn next_sample(&mut self) -> f64 {
        match self.seeds.get(self.position) {
            Some(&seed) => {
                self.position = self.position.saturating_add(1);
                seed
            }
            None => {
                warn!("seed sequence of {} exhausted; using midpoint", self.seeds.len());
                MIDPOINT
            }
        }
    }
}

/// Uniform samples from a [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSampleSource<R> {
    rng: R,
}

impl<R: Rng> RngSampleSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampleSource<StdRng> {
    /// Reproducible pseudo-random samples.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Samples from a generator seeded by the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> SampleSource for RngSampleSource<R> {
    fn next_sample(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always returns the same sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSample(pub f64);

impl Default for ConstantSample {
    fn default() -> Self {
        Self(MIDPOINT)
    }
}

impl SampleSource for ConstantSample {
    fn next_sample(&mut self) -> f64 {
        self.0
    }
}

/// Draw `count` samples up front, e.g. to record a random run for replay
/// through [`crate::simulation::SimulationOptions::random_seeds`].
pub fn draw_samples<S: SampleSource + ?Sized>(source: &mut S, count: usize) -> Vec<f64> {
    (0..count).map(|_| source.next_sample()).collect()
}
