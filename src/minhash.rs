// MinHash signature generation over shingle sets.

use ahash::RandomState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;

/// Sentinel value filling the signature of a document whose shingle set is
/// empty. Sentinel signatures are never inserted into the LSH index, so
/// degenerate documents can never collide with anything.
pub const SENTINEL: u32 = u32::MAX;

// Mixed into the run seed for the baseline shingle hash so it is decoupled
// from the coefficient PRNG stream.
const BASE_HASH_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// The ordered family of `num_perm` universal hash functions
/// `h_i(x) = (a_i * x + b_i) mod 2^32`, generated once per run from a fixed
/// seed and passed to every component. Identical seed, identical family,
/// identical signatures for identical shingle sets.
#[derive(Debug, Clone)]
pub struct HashFamily {
    coeffs: Vec<(u64, u64)>,
    base_hasher: RandomState,
}

impl HashFamily {
    pub fn new(num_perm: usize, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let coeffs = (0..num_perm)
            .map(|_| {
                (
                    rng.gen_range(1..=u32::MAX as u64),
                    rng.gen_range(1..=u32::MAX as u64),
                )
            })
            .collect();
        let base_seed = seed ^ BASE_HASH_SALT;
        Self {
            coeffs,
            base_hasher: RandomState::with_seed(base_seed as usize),
        }
    }

    pub fn num_perm(&self) -> usize {
        self.coeffs.len()
    }

    /// Baseline hash of a shingle reduced to 32 bits, shared by every
    /// permutation in the family.
    fn base_hash(&self, shingle: &str) -> u64 {
        self.base_hasher.hash_one(shingle) & 0xFFFF_FFFF
    }

    /// Map a shingle set to its length-`num_perm` signature:
    /// `signature[i] = min over shingles of h_i(H(shingle))`.
    /// Agreement at position i happens with probability Jaccard(A, B),
    /// so averaging over positions gives an unbiased similarity estimate.
    pub fn signature(&self, shingles: &HashSet<String>) -> Vec<u32> {
        if shingles.is_empty() {
            return vec![SENTINEL; self.coeffs.len()];
        }

        let mut signature = vec![u32::MAX; self.coeffs.len()];
        for shingle in shingles {
            let base = self.base_hash(shingle);
            for (i, &(a, b)) in self.coeffs.iter().enumerate() {
                // a, b, base all fit in 32 bits so a * base cannot overflow u64
                let hash_val = ((a * base).wrapping_add(b) & 0xFFFF_FFFF) as u32;
                if hash_val < signature[i] {
                    signature[i] = hash_val;
                }
            }
        }
        signature
    }
}

pub fn is_sentinel(signature: &[u32]) -> bool {
    signature.iter().all(|&v| v == SENTINEL)
}

/// Estimated Jaccard similarity: the fraction of signature positions that
/// agree.
pub fn estimate_similarity(sig_a: &[u32], sig_b: &[u32]) -> f32 {
    let matches = sig_a
        .iter()
        .zip(sig_b.iter())
        .filter(|(a, b)| a == b)
        .count();
    matches as f32 / sig_a.len() as f32
}
