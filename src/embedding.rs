//! Word vectors and the similarity queries the game is built on.
//!
//! Every vector is normalised to unit length when it is stored, so cosine
//! similarity is a plain dot product. Similarity and distance share that one
//! dot product: for any pair of words, `distance == 1.0 - similarity`
//! bit for bit, which the solver relies on.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rayon::prelude::*;

use crate::error::{Result, SemantleError};

/// Below this many candidates a distance scan runs on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

const MAX_PREALLOCATED_WORDS: usize = 1 << 20;

/// Anything that can score words against each other.
pub trait EmbeddingProvider {
    /// Known words, in index order.
    fn vocabulary(&self) -> &[String];

    fn contains(&self, word: &str) -> bool;

    /// Cosine similarity in [-1, 1].
    fn similarity(&self, a: &str, b: &str) -> Result<f32>;

    /// Cosine distance (1 - similarity) from `word` to each of `others`, in order.
    fn distances(&self, word: &str, others: &[String]) -> Result<Vec<f32>>;
}

/// A fixed vocabulary with one unit vector per word.
#[derive(Debug, Clone)]
pub struct KeyedVectors {
    index_to_key: Vec<String>,
    key_to_index: HashMap<String, usize>,
    dim: usize,
    /// Row-major, `index_to_key.len() * dim` values.
    vectors: Vec<f32>,
}

impl KeyedVectors {
    /// Build from `(word, vector)` pairs. Order is preserved as the vocabulary order.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut index_to_key = Vec::new();
        let mut key_to_index = HashMap::new();
        let mut vectors = Vec::new();
        let mut dim = None;

        for (word, vector) in entries {
            let expected = *dim.get_or_insert(vector.len());
            if vector.len() != expected || expected == 0 {
                return Err(SemantleError::DimensionMismatch {
                    word,
                    expected,
                    got: vector.len(),
                });
            }
            if key_to_index.contains_key(&word) {
                return Err(SemantleError::DuplicateWord(word));
            }
            key_to_index.insert(word.clone(), index_to_key.len());
            index_to_key.push(word);
            vectors.extend(normalize(&vector));
        }

        let dim = dim.ok_or(SemantleError::EmptyVocabulary)?;
        Ok(Self {
            index_to_key,
            key_to_index,
            dim,
            vectors,
        })
    }

    /// Load vectors in word2vec text format: a `<count> <dim>` header line,
    /// then `word v1 v2 ... vdim` per line.
    pub fn load_word2vec_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_word2vec_text(BufReader::new(file))
    }

    pub fn read_word2vec_text<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header = lines.next().ok_or(SemantleError::VectorFormat {
            line: 1,
            message: "missing header".to_string(),
        })??;
        let (count, dim) = parse_header(&header)?;

        // the header is untrusted, so it only hints the allocation
        let mut entries = Vec::with_capacity(count.min(MAX_PREALLOCATED_WORDS));
        for (i, line) in lines.enumerate() {
            let line_no = i + 2;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let word = parts
                .next()
                .ok_or(SemantleError::VectorFormat {
                    line: line_no,
                    message: "missing word".to_string(),
                })?
                .to_string();
            let vector = parts
                .map(|v| parse_component(v, line_no))
                .collect::<Result<Vec<_>>>()?;
            if vector.len() != dim {
                return Err(SemantleError::VectorFormat {
                    line: line_no,
                    message: format!("expected {} values, found {}", dim, vector.len()),
                });
            }
            entries.push((word, vector));
        }

        if entries.len() != count {
            tracing::warn!(
                declared = count,
                found = entries.len(),
                "vector file header count does not match its body"
            );
        }

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.index_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_key.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.key_to_index.get(word).copied()
    }

    /// Unit vector for `word`.
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.index_of(word).map(|i| self.row(i))
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.vectors[index * self.dim..(index + 1) * self.dim]
    }

    fn lookup(&self, word: &str) -> Result<&[f32]> {
        self.vector(word)
            .ok_or_else(|| SemantleError::UnknownWord(word.to_string()))
    }

    /// The `n` words closest to `word`, excluding itself, most similar first.
    pub fn most_similar(&self, word: &str, n: usize) -> Result<Vec<(String, f32)>> {
        let target = self.lookup(word)?;
        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .into_par_iter()
            .filter(|&i| self.index_to_key[i] != word)
            .map(|i| (i, dot(target, self.row(i))))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(i, sim)| (self.index_to_key[i].clone(), sim))
            .collect())
    }
}

impl EmbeddingProvider for KeyedVectors {
    fn vocabulary(&self) -> &[String] {
        &self.index_to_key
    }

    fn contains(&self, word: &str) -> bool {
        self.key_to_index.contains_key(word)
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        Ok(dot(self.lookup(a)?, self.lookup(b)?))
    }

    fn distances(&self, word: &str, others: &[String]) -> Result<Vec<f32>> {
        let target = self.lookup(word)?;
        let distance = |other: &String| -> Result<f32> { Ok(1.0 - dot(target, self.lookup(other)?)) };

        if others.len() < PARALLEL_THRESHOLD {
            others.iter().map(distance).collect()
        } else {
            others.par_iter().map(distance).collect()
        }
    }
}

fn parse_header(header: &str) -> Result<(usize, usize)> {
    let bad = |message: &str| SemantleError::VectorFormat {
        line: 1,
        message: message.to_string(),
    };
    let mut parts = header.split_whitespace();
    let count = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| bad("header must be '<count> <dim>'"))?;
    let dim: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| bad("header must be '<count> <dim>'"))?;
    if dim == 0 {
        return Err(bad("dimension must be positive"));
    }
    Ok((count, dim))
}

fn parse_component(text: &str, line: usize) -> Result<f32> {
    let value = text.parse::<f32>().map_err(|e| SemantleError::VectorFormat {
        line,
        message: e.to_string(),
    })?;
    if !value.is_finite() {
        return Err(SemantleError::VectorFormat {
            line,
            message: format!("non-finite value '{}'", text),
        });
    }
    Ok(value)
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale to unit length. Zero vectors stay zero and score 0 against everything.
pub(crate) fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
