//! Self-test harness measuring how often a mutated key still resolves to
//! itself.
//!
//! Useful for tuning substring sizes against a real dictionary. Every run
//! draws from its own seeded RNG, so results are reproducible.

use crate::index::ClosestMatch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Letters used for substitutions and insertions
pub const MUTATION_LETTERS: [char; 30] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ö', 'ä', 'ü', 'ß',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyOptions {
    /// Attempts, including skipped ones
    pub trials: usize,
    pub seed: u64,
}

impl Default for AccuracyOptions {
    fn default() -> Self {
        Self {
            trials: 200,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccuracyReport {
    /// Trials actually run
    pub trials: usize,
    /// Trials where the original key came back first
    pub correct: usize,
    /// Trials whose key could not be mutated the chosen way
    pub skipped: usize,
}

impl AccuracyReport {
    /// Share of counted trials recovered, 0-100
    pub fn percent(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.trials as f64
        }
    }
}

/// Substitute, delete, or insert one random letter per trial
pub fn accuracy_mutating_letters<D: Send + Sync>(
    index: &ClosestMatch<D>,
    options: &AccuracyOptions,
) -> AccuracyReport {
    run_trials(index, options, |key, rng| {
        let mut chars: Vec<char> = key.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let pos = rng.gen_range(0..chars.len());
        match rng.gen_range(0..3) {
            0 => chars[pos] = random_letter(rng),
            1 => {
                chars.remove(pos);
            }
            _ => chars.insert(pos, random_letter(rng)),
        }
        Some(chars.into_iter().collect())
    })
}

/// Drop a word, then optionally reorder the rest or misspell two letters
pub fn accuracy_mutating_words<D: Send + Sync>(
    index: &ClosestMatch<D>,
    options: &AccuracyOptions,
) -> AccuracyReport {
    run_trials(index, options, |key, rng| {
        let mut words: Vec<&str> = key.split(' ').collect();
        match rng.gen_range(0..3) {
            0 => {
                if words.len() < 3 {
                    return None;
                }
                words.remove(rng.gen_range(0..words.len()));
                Some(words.join(" "))
            }
            1 => {
                if words.len() < 2 {
                    return None;
                }
                words.remove(rng.gen_range(0..words.len()));
                words.reverse();
                Some(words.join(" "))
            }
            _ => {
                if words.len() > 1 {
                    words.remove(rng.gen_range(0..words.len()));
                    words.shuffle(rng);
                }
                let mut chars: Vec<char> = words.join(" ").chars().collect();
                if chars.is_empty() {
                    return None;
                }
                for _ in 0..2 {
                    let pos = rng.gen_range(0..chars.len());
                    chars[pos] = random_letter(rng);
                }
                Some(chars.into_iter().collect())
            }
        }
    })
}

fn run_trials<D, F>(index: &ClosestMatch<D>, options: &AccuracyOptions, mutate: F) -> AccuracyReport
where
    D: Send + Sync,
    F: Fn(&str, &mut StdRng) -> Option<String>,
{
    let mut report = AccuracyReport::default();
    if index.is_empty() {
        return report;
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    for _ in 0..options.trials {
        let original = &index.entries[rng.gen_range(0..index.len())].key;
        let Some(mutated) = mutate(original, &mut rng) else {
            report.skipped += 1;
            continue;
        };

        report.trials += 1;
        if index.closest(&mutated).as_deref() == Some(original.as_str()) {
            report.correct += 1;
        } else {
            debug!(original = %original, mutated = %mutated, "mutation not recovered");
        }
    }
    report
}

fn random_letter(rng: &mut StdRng) -> char {
    MUTATION_LETTERS[rng.gen_range(0..MUTATION_LETTERS.len())]
}
