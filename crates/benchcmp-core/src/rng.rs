//! Seeded generators for benchmark cases and the seed-derivation rule behind them.
//!
//! A run has one master seed. Every independent stream inside a run is keyed
//! either by a numeric substream id or by a label (usually the case name), and
//! its seed is SipHash-1-3 of `(master, key)` under fixed zero keys. The rule
//! does not depend on platform or pointer width.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Generator handed to case code, remembering the seed that produced it.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    stream: StdRng,
}

impl RngHandle {
    /// Handle seeded directly with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            stream: StdRng::seed_from_u64(seed),
        }
    }

    /// Handle for numeric `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Handle keyed by `label` under `master_seed`, e.g. one stream per case name.
    pub fn labelled(master_seed: u64, label: &str) -> Self {
        Self::from_seed(derive_labelled_seed(master_seed, label))
    }

    /// Child handle for `substream`, derived from this handle's seed rather
    /// than its current position, so forking never perturbs the parent.
    pub fn fork(&self, substream: u64) -> Self {
        Self::substream(self.seed, substream)
    }

    /// Seed this handle started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit_f64(&mut self) -> f64 {
        self.stream.gen()
    }

    /// Underlying generator.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.stream
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.stream.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.stream.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.stream.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.stream.try_fill_bytes(dest)
    }
}

fn keyed_hasher(master_seed: u64) -> SipHasher13 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher
}

/// Seed of numeric `substream` under `master_seed`.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = keyed_hasher(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Seed of the stream keyed by `label` under `master_seed`.
///
/// The label length is hashed before its bytes so that no label is a prefix
/// collision of another.
pub fn derive_labelled_seed(master_seed: u64, label: &str) -> u64 {
    let mut hasher = keyed_hasher(master_seed);
    hasher.write_u64(label.len() as u64);
    hasher.write(label.as_bytes());
    hasher.finish()
}
