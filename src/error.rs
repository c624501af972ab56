//! Error type shared by every part of the game.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SemantleError>;

#[derive(Error, Debug)]
pub enum SemantleError {
    /// The word is not part of the embedding vocabulary.
    #[error("unknown word: {0}")]
    UnknownWord(String),

    /// Nothing survived vocabulary construction (corpus empty or min_count too high).
    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error("vector for '{word}' has dimension {got}, expected {expected}")]
    DimensionMismatch {
        word: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate word in vocabulary: {0}")]
    DuplicateWord(String),

    /// Malformed word2vec text file.
    #[error("vector file line {line}: {message}")]
    VectorFormat { line: usize, message: String },

    #[error("corpus has no column named '{0}'")]
    MissingColumn(String),

    /// A solver round eliminated every candidate, so the feedback does not
    /// match any word the model knows.
    #[error("no candidate is at distance {target_distance} from '{probe}'")]
    NoCandidates { probe: String, target_distance: f32 },

    #[error("solver gave up after {rounds} rounds with {remaining} candidates left")]
    RoundLimit { rounds: usize, remaining: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
