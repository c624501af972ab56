//! Training sentences read from a CSV file of dialogue lines.

use std::io::Read;
use std::path::Path;

use crate::error::{Result, SemantleError};

/// Tokenised sentences, one per non-empty cell of the text column.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    sentences: Vec<Vec<String>>,
    skipped_rows: usize,
}

impl Corpus {
    pub fn from_path<P: AsRef<Path>>(path: P, text_column: &str) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "reading corpus");
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::from_csv(reader, text_column)
    }

    pub fn from_reader<R: Read>(reader: R, text_column: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        Self::from_csv(reader, text_column)
    }

    /// Build directly from already tokenised sentences.
    pub fn from_sentences(sentences: Vec<Vec<String>>) -> Self {
        Self {
            sentences,
            skipped_rows: 0,
        }
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, text_column: &str) -> Result<Self> {
        let column = reader
            .headers()?
            .iter()
            .position(|h| h == text_column)
            .ok_or_else(|| SemantleError::MissingColumn(text_column.to_string()))?;

        let mut sentences = Vec::new();
        let mut skipped_rows = 0;

        for (row, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(row = row + 1, error = %err, "skipping malformed corpus row");
                    skipped_rows += 1;
                    continue;
                }
            };
            let Some(text) = record.get(column) else {
                continue;
            };
            let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
            if !tokens.is_empty() {
                sentences.push(tokens);
            }
        }

        let corpus = Self {
            sentences,
            skipped_rows,
        };
        tracing::info!(
            sentences = corpus.len(),
            tokens = corpus.token_count(),
            skipped = skipped_rows,
            "corpus loaded"
        );
        Ok(corpus)
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }

    /// Rows dropped because the CSV reader could not parse them.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}
