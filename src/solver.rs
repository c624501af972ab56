//! Distance-elimination solver.
//!
//! Each round picks a random remaining candidate as the probe and learns how
//! similar the probe is to the secret. The secret must sit at exactly that
//! distance from the probe, so every candidate at any other distance is
//! eliminated. Word distances are nearly unique in practice, so a handful of
//! rounds usually leaves a single word.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SemantleError};

/// Rounds that leave at most this many candidates list them in `matches`.
pub const REPORTED_MATCHES: usize = 10;

/// What happened in one elimination round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub probe: String,
    pub similarity: f32,
    pub target_distance: f32,
    pub before: usize,
    pub after: usize,
    /// Surviving words and their distance to the probe, filled only when
    /// `after <= REPORTED_MATCHES`.
    pub matches: Vec<(String, f32)>,
}

impl RoundReport {
    pub fn eliminated(&self) -> usize {
        self.before - self.after
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Exactly one candidate is left.
    Found(String),
    /// The remaining candidates could not be told apart by distance.
    Ambiguous(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub rounds: Vec<RoundReport>,
}

impl SolveReport {
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            SolveOutcome::Found(word) => Some(word),
            SolveOutcome::Ambiguous(_) => None,
        }
    }
}

/// Aggregate result of solving many secrets.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkSummary {
    /// `(rounds, number of secrets solved in that many rounds)`, ascending.
    pub distribution: Vec<(usize, usize)>,
    pub ambiguous: usize,
    pub failed: usize,
    pub wrong: usize,
}

impl BenchmarkSummary {
    pub fn solved(&self) -> usize {
        self.distribution.iter().map(|(_, count)| count).sum()
    }

    pub fn average_rounds(&self) -> f64 {
        let solved = self.solved();
        if solved == 0 {
            return 0.0;
        }
        let total: usize = self.distribution.iter().map(|(r, c)| r * c).sum();
        total as f64 / solved as f64
    }
}

/// The elimination solver
pub struct SemantleSolver<'a, P: EmbeddingProvider> {
    provider: &'a P,
    all_words: Vec<String>,
    candidates: Vec<String>,
    tolerance: f32,
    max_rounds: usize,
    max_stalled_rounds: usize,
    seed: u64,
    rng: StdRng,
}

impl<'a, P: EmbeddingProvider> Clone for SemantleSolver<'a, P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider,
            all_words: self.all_words.clone(),
            candidates: self.candidates.clone(),
            tolerance: self.tolerance,
            max_rounds: self.max_rounds,
            max_stalled_rounds: self.max_stalled_rounds,
            seed: self.seed,
            rng: self.rng.clone(),
        }
    }
}

impl<'a, P: EmbeddingProvider> SemantleSolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self::with_config(provider, &SolverConfig::default())
    }

    pub fn with_config(provider: &'a P, config: &SolverConfig) -> Self {
        let words = provider.vocabulary().to_vec();
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            provider,
            candidates: words.clone(),
            all_words: words,
            tolerance: config.tolerance(),
            max_rounds: config.max_rounds,
            max_stalled_rounds: config.max_stalled_rounds,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reseed probe selection.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_tolerance(&mut self, tolerance: f32) {
        self.tolerance = tolerance;
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn remaining_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn all_words(&self) -> &[String] {
        &self.all_words
    }

    pub fn reset(&mut self) {
        self.candidates = self.all_words.clone();
    }

    /// Draw a uniformly random probe from the remaining candidates.
    pub fn next_probe(&mut self) -> Option<String> {
        self.candidates.choose(&mut self.rng).cloned()
    }

    /// Keep only the candidates whose distance to `probe` matches the
    /// distance implied by `similarity`.
    ///
    /// If nothing would survive, the candidate set is left untouched and
    /// `NoCandidates` is returned.
    pub fn apply_feedback(&mut self, probe: &str, similarity: f32) -> Result<RoundReport> {
        let target_distance = 1.0 - similarity;
        let distances = self.provider.distances(probe, &self.candidates)?;

        let survivors: Vec<(String, f32)> = self
            .candidates
            .iter()
            .zip(distances)
            .filter(|(_, d)| (d - target_distance).abs() < self.tolerance)
            .map(|(word, d)| (word.clone(), d))
            .collect();

        if survivors.is_empty() {
            return Err(SemantleError::NoCandidates {
                probe: probe.to_string(),
                target_distance,
            });
        }

        tracing::debug!(
            probe,
            target_distance,
            before = self.candidates.len(),
            after = survivors.len(),
            "elimination round"
        );

        let after = survivors.len();
        let matches = if after <= REPORTED_MATCHES {
            survivors.clone()
        } else {
            Vec::new()
        };
        for (word, distance) in &matches {
            tracing::debug!(word = %word, distance, "found a match");
        }
        let report = RoundReport {
            probe: probe.to_string(),
            similarity,
            target_distance,
            before: self.candidates.len(),
            after,
            matches,
        };
        self.candidates = survivors.into_iter().map(|(word, _)| word).collect();
        Ok(report)
    }

    /// Solve by asking `similarity_of` how close each probe is to the secret.
    pub fn solve_with_feedback<F>(&mut self, mut similarity_of: F) -> Result<SolveReport>
    where
        F: FnMut(&str) -> Result<f32>,
    {
        let mut rounds: Vec<RoundReport> = Vec::new();
        let mut stalled = 0;

        while self.candidates.len() > 1 {
            if rounds.len() >= self.max_rounds {
                return Err(SemantleError::RoundLimit {
                    rounds: rounds.len(),
                    remaining: self.candidates.len(),
                });
            }

            let probe = match self.next_probe() {
                Some(p) => p,
                None => break,
            };
            let similarity = similarity_of(&probe)?;
            let report = self.apply_feedback(&probe, similarity)?;

            stalled = if report.eliminated() == 0 { stalled + 1 } else { 0 };
            rounds.push(report);

            if stalled >= self.max_stalled_rounds {
                tracing::warn!(
                    remaining = self.candidates.len(),
                    "candidates are indistinguishable by distance"
                );
                return Ok(SolveReport {
                    outcome: SolveOutcome::Ambiguous(self.candidates.clone()),
                    rounds,
                });
            }
        }

        let word = self
            .candidates
            .first()
            .cloned()
            .ok_or(SemantleError::EmptyVocabulary)?;
        Ok(SolveReport {
            outcome: SolveOutcome::Found(word),
            rounds,
        })
    }

    /// Solve a puzzle knowing the secret word (simulation and benchmarking)
    pub fn solve_for_target(&mut self, secret: &str) -> Result<SolveReport> {
        if !self.provider.contains(secret) {
            return Err(SemantleError::UnknownWord(secret.to_string()));
        }
        let provider = self.provider;
        self.solve_with_feedback(|probe| provider.similarity(probe, secret))
    }
}

impl<'a, P: EmbeddingProvider + Sync> SemantleSolver<'a, P> {
    /// Solve every secret on a fresh copy of this solver. Secret `i` uses
    /// seed `self.seed() + i`, so runs are reproducible.
    pub fn benchmark(&self, secrets: &[String]) -> BenchmarkSummary {
        let results: Vec<(String, Result<SolveReport>)> = secrets
            .par_iter()
            .enumerate()
            .map(|(i, secret)| {
                let mut solver = self.clone();
                solver.reset();
                solver.set_seed(self.seed.wrapping_add(i as u64));
                (secret.clone(), solver.solve_for_target(secret))
            })
            .collect();

        let mut summary = BenchmarkSummary::default();
        let mut counts: Vec<usize> = Vec::new();

        for (secret, result) in results {
            match result {
                Ok(report) => match report.answer() {
                    Some(answer) if answer == secret => {
                        let rounds = report.round_count();
                        if counts.len() <= rounds {
                            counts.resize(rounds + 1, 0);
                        }
                        counts[rounds] += 1;
                    }
                    Some(_) => summary.wrong += 1,
                    None => summary.ambiguous += 1,
                },
                Err(err) => {
                    tracing::warn!(secret = %secret, error = %err, "benchmark solve failed");
                    summary.failed += 1;
                }
            }
        }

        summary.distribution = counts
            .into_iter()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect();
        summary
    }
}
