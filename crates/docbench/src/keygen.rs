// Docbench - Record and Document Store Latency Harness
//
// Copyright (c) 2025 Docbench contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Collision-free random string generation.
//!
//! [`StringGenerator`] draws strings from a fixed alphabet and remembers
//! every string it has handed out, so the same instance never returns a
//! value twice. Benchmark keys and values are built from it so that
//! concurrent scenarios never collide on a name.
//!
//! Uniqueness is enforced by resampling on collision. Two guards bound that
//! loop: a capacity check refuses requests the key space provably cannot
//! satisfy, and [`MAX_ATTEMPTS`] caps the resamples spent on a single
//! string. Both surface as [`BenchError::ExhaustedAlphabet`].

use crate::error::{BenchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// Alphanumeric alphabet plus `-` and `_` (64 symbols).
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Resamples allowed for one string before giving up.
pub const MAX_ATTEMPTS: usize = 10_000;

/// Random string source that never repeats itself.
#[derive(Debug)]
pub struct StringGenerator<R = StdRng> {
    alphabet: Vec<char>,
    used: HashSet<String>,
    used_per_length: HashMap<usize, usize>,
    rng: R,
}

impl StringGenerator<StdRng> {
    /// Creates a generator over `alphabet` with a pinned seed.
    pub fn from_seed(alphabet: &str, seed: u64) -> Result<Self> {
        Self::new(alphabet, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StringGenerator<R> {
    /// Creates a generator over `alphabet` drawing from `rng`.
    ///
    /// Repeated symbols are collapsed. An empty alphabet is rejected.
    pub fn new(alphabet: &str, rng: R) -> Result<Self> {
        let mut seen = HashSet::new();
        let alphabet: Vec<char> = alphabet.chars().filter(|c| seen.insert(*c)).collect();
        if alphabet.is_empty() {
            return Err(BenchError::invalid_config(
                "alphabet",
                "must contain at least one symbol",
            ));
        }

        Ok(Self {
            alphabet,
            used: HashSet::new(),
            used_per_length: HashMap::new(),
            rng,
        })
    }

    /// Number of distinct symbols.
    pub fn alphabet_len(&self) -> usize {
        self.alphabet.len()
    }

    /// Number of strings handed out so far.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Returns true if `s` has already been handed out.
    pub fn is_used(&self, s: &str) -> bool {
        self.used.contains(s)
    }

    /// Returns a fresh random string of `length` symbols.
    ///
    /// A zero length yields `""` without drawing randomness or recording
    /// anything, so it can be requested any number of times.
    pub fn random_string(&mut self, length: usize) -> Result<String> {
        if length == 0 {
            return Ok(String::new());
        }
        self.ensure_capacity(length, 1)?;

        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.sample(length);
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                *self.used_per_length.entry(length).or_insert(0) += 1;
                return Ok(candidate);
            }
        }

        Err(self.exhausted(length, 1))
    }

    /// Returns `count` fresh strings of `length` symbols each.
    pub fn generate_n(&mut self, count: usize, length: usize) -> Result<Vec<String>> {
        if length > 0 {
            self.ensure_capacity(length, count)?;
        }
        (0..count).map(|_| self.random_string(length)).collect()
    }

    fn sample(&mut self, length: usize) -> String {
        let n = self.alphabet.len();
        (0..length)
            .map(|_| self.alphabet[self.rng.gen_range(0..n)])
            .collect()
    }

    /// Fails if fewer than `requested` unused strings of `length` remain.
    fn ensure_capacity(&self, length: usize, requested: usize) -> Result<()> {
        let capacity = u32::try_from(length)
            .ok()
            .and_then(|exp| self.alphabet.len().checked_pow(exp));

        // Overflow means the space is larger than anything addressable.
        let Some(capacity) = capacity else {
            return Ok(());
        };

        let used = self.used_per_length.get(&length).copied().unwrap_or(0);
        if used.saturating_add(requested) > capacity {
            return Err(self.exhausted(length, requested));
        }
        Ok(())
    }

    fn exhausted(&self, length: usize, requested: usize) -> BenchError {
        BenchError::ExhaustedAlphabet {
            alphabet_len: self.alphabet.len(),
            length,
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet_has_64_symbols() {
        let gen = StringGenerator::from_seed(DEFAULT_ALPHABET, 1).unwrap();
        assert_eq!(gen.alphabet_len(), 64);
    }

    #[test]
    fn test_strings_use_alphabet_and_length() {
        let mut gen = StringGenerator::from_seed("abc", 7).unwrap();
        let strings = gen.generate_n(20, 4).unwrap();
        assert_eq!(strings.len(), 20);
        for s in &strings {
            assert_eq!(s.chars().count(), 4);
            assert!(s.chars().all(|c| "abc".contains(c)));
        }
    }

    #[test]
    fn test_zero_length_is_empty_and_untracked() {
        let mut gen = StringGenerator::from_seed(DEFAULT_ALPHABET, 3).unwrap();
        assert_eq!(gen.random_string(0).unwrap(), "");
        assert_eq!(gen.random_string(0).unwrap(), "");
        assert_eq!(gen.used_count(), 0);
        assert_eq!(gen.generate_n(3, 0).unwrap(), vec!["", "", ""]);
        assert_eq!(gen.used_count(), 0);
    }

    #[test]
    fn test_zero_length_draws_no_randomness() {
        let mut a = StringGenerator::from_seed(DEFAULT_ALPHABET, 11).unwrap();
        let mut b = StringGenerator::from_seed(DEFAULT_ALPHABET, 11).unwrap();
        a.random_string(0).unwrap();
        assert_eq!(a.random_string(8).unwrap(), b.random_string(8).unwrap());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = StringGenerator::from_seed(DEFAULT_ALPHABET, 42).unwrap();
        let mut b = StringGenerator::from_seed(DEFAULT_ALPHABET, 42).unwrap();
        assert_eq!(a.generate_n(5, 10).unwrap(), b.generate_n(5, 10).unwrap());
    }

    #[test]
    fn test_exhausts_full_space_then_fails() {
        let mut gen = StringGenerator::from_seed("xy", 5).unwrap();
        let mut all = gen.generate_n(4, 2).unwrap();
        all.sort();
        assert_eq!(all, vec!["xx", "xy", "yx", "yy"]);

        match gen.random_string(2) {
            Err(BenchError::ExhaustedAlphabet {
                alphabet_len,
                length,
                requested,
            }) => {
                assert_eq!(alphabet_len, 2);
                assert_eq!(length, 2);
                assert_eq!(requested, 1);
            }
            other => panic!("Expected ExhaustedAlphabet, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_batch_rejected_up_front() {
        let mut gen = StringGenerator::from_seed(DEFAULT_ALPHABET, 9).unwrap();
        assert!(gen.generate_n(100, 1).is_err());
        assert_eq!(gen.used_count(), 0);
    }

    #[test]
    fn test_lengths_tracked_independently() {
        let mut gen = StringGenerator::from_seed("ab", 2).unwrap();
        gen.generate_n(2, 1).unwrap();
        assert!(gen.random_string(1).is_err());
        assert_eq!(gen.random_string(3).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        assert!(matches!(
            StringGenerator::from_seed("", 0),
            Err(BenchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_duplicate_symbols_collapsed() {
        let gen = StringGenerator::from_seed("aab", 0).unwrap();
        assert_eq!(gen.alphabet_len(), 2);
    }
}
