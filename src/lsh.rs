// LSH banding: bucket signatures so only plausible pairs are compared.

use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};

use crate::minhash;

const BAND_HASH_SALT: u64 = 0x517c_c1b7_2722_0a95;

/// Bucketed index over signature bands. Two documents become candidates iff
/// they share at least one bucket in any band: collision probability per
/// band is roughly `similarity^rows_per_band`, and the probability of at
/// least one shared bucket is `1 - (1 - s^r)^b` — the S-curve that separates
/// pairs above and below the effective threshold tuned by (num_bands,
/// rows_per_band).
pub struct LshIndex {
    num_bands: usize,
    rows_per_band: usize,
    band_hasher: RandomState,
    buckets: HashMap<(usize, u64), Vec<u32>>,
}

impl LshIndex {
    /// `rows_per_band * num_bands` may fall short of the signature length;
    /// the trailing positions are simply not banded (reference remainder
    /// policy), though they still count during verification.
    pub fn new(num_bands: usize, rows_per_band: usize, seed: u64) -> Self {
        Self {
            num_bands,
            rows_per_band,
            band_hasher: RandomState::with_seed((seed ^ BAND_HASH_SALT) as usize),
            buckets: HashMap::new(),
        }
    }

    /// Insert a document's signature into every band bucket. Sentinel
    /// signatures are skipped entirely so degenerate documents are always
    /// reported unique.
    pub fn insert(&mut self, doc_idx: u32, signature: &[u32]) {
        if minhash::is_sentinel(signature) {
            return;
        }
        for band_idx in 0..self.num_bands {
            let start = band_idx * self.rows_per_band;
            let band = &signature[start..start + self.rows_per_band];
            let key = (band_idx, self.band_hasher.hash_one(band));
            self.buckets.entry(key).or_default().push(doc_idx);
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// All pairs sharing at least one bucket, de-duplicated across bands and
    /// returned in sorted order so downstream verification and grouping are
    /// reproducible.
    pub fn candidate_pairs(&self) -> Vec<(u32, u32)> {
        let mut pairs = BTreeSet::new();
        for members in self.buckets.values() {
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i], members[j]);
                    if a != b {
                        pairs.insert((a.min(b), a.max(b)));
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }
}
