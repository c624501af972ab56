//! A single game: one secret word and the guesses made against it.

use std::io::{BufRead, Write};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SemantleError};

/// One accepted guess.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessRecord {
    pub word: String,
    pub similarity: f32,
}

impl GuessRecord {
    /// Similarity as the percentage shown to players.
    pub fn percent(&self) -> f32 {
        self.similarity * 100.0
    }
}

/// How a `play` loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Won { guesses: usize },
    /// Input ran out before the secret was found.
    Abandoned { guesses: usize },
}

pub struct GameSession<'a, P: EmbeddingProvider> {
    provider: &'a P,
    secret: String,
    guesses: Vec<GuessRecord>,
    won: bool,
}

/// Trim and lower-case a raw guess.
pub fn normalize_guess(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl<'a, P: EmbeddingProvider> GameSession<'a, P> {
    /// Start a game. The secret must be a word the provider knows.
    pub fn new(provider: &'a P, secret: &str) -> Result<Self> {
        let secret = normalize_guess(secret);
        if !provider.contains(&secret) {
            return Err(SemantleError::UnknownWord(secret));
        }
        Ok(Self {
            provider,
            secret,
            guesses: Vec::new(),
            won: false,
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    /// Score a guess and record it. Unknown words are rejected and leave the
    /// session unchanged.
    pub fn guess(&mut self, raw: &str) -> Result<GuessRecord> {
        let word = normalize_guess(raw);
        let similarity = self.provider.similarity(&word, &self.secret)?;
        let record = GuessRecord { word, similarity };

        self.guesses.push(record.clone());
        self.won |= record.word == self.secret;
        Ok(record)
    }

    /// The `n` closest guesses so far, best first. Ties keep guess order.
    pub fn best_guesses(&self, n: usize) -> Vec<&GuessRecord> {
        let mut ranked: Vec<&GuessRecord> = self.guesses.iter().collect();
        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }

    /// Prompt for guesses on `input` until the secret is found or input ends.
    /// Unknown words and blank lines are skipped without comment.
    pub fn play<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<PlayOutcome> {
        while !self.won {
            write!(output, "Guess: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(PlayOutcome::Abandoned {
                    guesses: self.guess_count(),
                });
            }
            if line.trim().is_empty() {
                continue;
            }

            match self.guess(&line) {
                Ok(record) => {
                    writeln!(
                        output,
                        "Guess: {}, Similarity: {:.2}",
                        record.word,
                        record.percent()
                    )?;
                }
                Err(SemantleError::UnknownWord(word)) => {
                    tracing::debug!(word = %word, "guess not in vocabulary");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(PlayOutcome::Won {
            guesses: self.guess_count(),
        })
    }
}
