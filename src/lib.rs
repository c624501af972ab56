//! # Semantle
//!
//! A word-guessing game scored by semantic similarity, plus a solver that
//! finds the secret word from similarity feedback alone.
//!
//! Word vectors are either trained from a CSV corpus of dialogue lines
//! (word2vec, continuous bag of words) or loaded from a word2vec text file.
//! The solver eliminates every candidate whose distance to a random probe
//! differs from the probe's distance to the secret.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod game;
pub mod solver;
pub mod train;

pub use config::SemantleConfig;
pub use corpus::Corpus;
pub use embedding::{EmbeddingProvider, KeyedVectors};
pub use error::{Result, SemantleError};
pub use game::{GameSession, GuessRecord, PlayOutcome};
pub use solver::{BenchmarkSummary, RoundReport, SemantleSolver, SolveOutcome, SolveReport};
pub use train::Trainer;

/// Train vectors from the configured corpus.
pub fn train_from_config(config: &SemantleConfig) -> Result<KeyedVectors> {
    let corpus = Corpus::from_path(&config.corpus.path, &config.corpus.text_column)?;
    Trainer::new(config.training.clone()).train(&corpus)
}
