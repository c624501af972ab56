//! Word2vec training: continuous bag of words with negative sampling.
//!
//! Each training example averages the vectors of the words around a centre
//! word and nudges that average towards the centre word's output vector and
//! away from a few randomly drawn noise words. Noise words are drawn from the
//! unigram distribution raised to the 3/4 power, and very frequent words are
//! randomly skipped, as in the reference word2vec.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TrainingConfig;
use crate::corpus::Corpus;
use crate::embedding::KeyedVectors;
use crate::error::{Result, SemantleError};

const NOISE_POWER: f64 = 0.75;
/// Sigmoid inputs are clamped to this range.
const MAX_EXP: f32 = 6.0;

/// A word kept in the training vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub word: String,
    pub count: usize,
}

/// Count words and keep those seen at least `min_count` times, most frequent
/// first. Equal counts keep first-seen order.
pub fn build_vocab(corpus: &Corpus, min_count: usize) -> Vec<VocabEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for token in corpus.sentences().iter().flatten() {
        let count = counts.entry(token.as_str()).or_insert_with(|| {
            first_seen.push(token.as_str());
            0
        });
        *count += 1;
    }

    let mut vocab: Vec<VocabEntry> = first_seen
        .into_iter()
        .filter_map(|word| {
            let count = counts[word];
            (count >= min_count).then(|| VocabEntry {
                word: word.to_string(),
                count,
            })
        })
        .collect();

    // stable sort keeps first-seen order among ties
    vocab.sort_by(|a, b| b.count.cmp(&a.count));
    vocab
}

/// Trains word vectors from a corpus.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, corpus: &Corpus) -> Result<KeyedVectors> {
        let cfg = &self.config;
        let vocab = build_vocab(corpus, cfg.min_count);
        if vocab.is_empty() {
            return Err(SemantleError::EmptyVocabulary);
        }

        let index: HashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.word.as_str(), i))
            .collect();
        let total_words: usize = vocab.iter().map(|e| e.count).sum();
        let keep_probability = keep_probabilities(&vocab, cfg.sample, total_words);
        let noise = WeightedIndex::new(
            vocab.iter().map(|e| (e.count as f64).powf(NOISE_POWER)),
        )
        .map_err(|_| SemantleError::EmptyVocabulary)?;

        let dim = cfg.vector_size;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut syn0: Vec<f32> = (0..vocab.len() * dim)
            .map(|_| (rng.gen::<f32>() - 0.5) / dim as f32)
            .collect();
        let mut syn1neg = vec![0f32; vocab.len() * dim];

        tracing::info!(
            vocab = vocab.len(),
            dim,
            epochs = cfg.epochs,
            "training word vectors"
        );

        let total_steps = (cfg.epochs * total_words).max(1);
        let mut processed = 0usize;
        let mut neu1 = vec![0f32; dim];
        let mut neu1e = vec![0f32; dim];

        for epoch in 0..cfg.epochs {
            let mut examples = 0usize;
            for sentence in corpus.sentences() {
                let in_vocab = vocab_indices(sentence, &index);
                // progress counts the same in-vocabulary tokens as total_words
                processed += in_vocab.len();
                let alpha = learning_rate(cfg, processed, total_steps);
                let kept: Vec<usize> = in_vocab
                    .into_iter()
                    .filter(|&i| keep_probability[i] >= 1.0 || rng.gen::<f64>() < keep_probability[i])
                    .collect();

                for (pos, &centre) in kept.iter().enumerate() {
                    // word2vec shrinks the window by a random amount per position
                    let reduced = rng.gen_range(0..cfg.window.max(1));
                    let span = cfg.window.saturating_sub(reduced);
                    let start = pos.saturating_sub(span);
                    let end = (pos + span + 1).min(kept.len());
                    let context: Vec<usize> = (start..end)
                        .filter(|&j| j != pos)
                        .map(|j| kept[j])
                        .collect();
                    if context.is_empty() {
                        continue;
                    }

                    neu1.iter_mut().for_each(|x| *x = 0.0);
                    for &c in &context {
                        add_assign(&mut neu1, row(&syn0, c, dim), 1.0);
                    }
                    let scale = 1.0 / context.len() as f32;
                    neu1.iter_mut().for_each(|x| *x *= scale);
                    neu1e.iter_mut().for_each(|x| *x = 0.0);

                    for d in 0..=cfg.negative {
                        let (target, label) = if d == 0 {
                            (centre, 1.0)
                        } else {
                            let sampled = noise.sample(&mut rng);
                            if sampled == centre {
                                continue;
                            }
                            (sampled, 0.0)
                        };
                        let out = row_mut(&mut syn1neg, target, dim);
                        let f = sigmoid(crate::embedding::dot(&neu1, out));
                        let g = (label - f) * alpha;
                        add_assign(&mut neu1e, out, g);
                        add_assign(out, &neu1, g);
                    }

                    // cbow_mean: spread the error evenly over the context words
                    for &c in &context {
                        add_assign(row_mut(&mut syn0, c, dim), &neu1e, scale);
                    }
                    examples += 1;
                }
            }
            tracing::info!(epoch = epoch + 1, examples, "epoch finished");
        }

        KeyedVectors::new(
            vocab
                .into_iter()
                .enumerate()
                .map(|(i, entry)| (entry.word, row(&syn0, i, dim).to_vec())),
        )
    }
}

/// Vocabulary indices of a sentence's tokens, out-of-vocabulary words dropped.
fn vocab_indices(sentence: &[String], index: &HashMap<&str, usize>) -> Vec<usize> {
    sentence
        .iter()
        .filter_map(|w| index.get(w.as_str()).copied())
        .collect()
}

/// Linear decay from `alpha` to `min_alpha` over `total_steps` tokens.
fn learning_rate(cfg: &TrainingConfig, processed: usize, total_steps: usize) -> f32 {
    let progress = (processed as f32 / total_steps.max(1) as f32).min(1.0);
    cfg.alpha - (cfg.alpha - cfg.min_alpha) * progress
}

/// Probability of keeping each vocabulary word during downsampling.
fn keep_probabilities(vocab: &[VocabEntry], sample: f64, total_words: usize) -> Vec<f64> {
    if sample <= 0.0 {
        return vec![1.0; vocab.len()];
    }
    let threshold = sample * total_words as f64;
    vocab
        .iter()
        .map(|e| {
            let c = e.count as f64;
            ((c / threshold).sqrt() + 1.0) * threshold / c
        })
        .collect()
}

fn sigmoid(x: f32) -> f32 {
    let x = x.clamp(-MAX_EXP, MAX_EXP);
    1.0 / (1.0 + (-x).exp())
}

fn row(m: &[f32], i: usize, dim: usize) -> &[f32] {
    &m[i * dim..(i + 1) * dim]
}

fn row_mut(m: &mut [f32], i: usize, dim: usize) -> &mut [f32] {
    &mut m[i * dim..(i + 1) * dim]
}

/// `dst += src * scale`
fn add_assign(dst: &mut [f32], src: &[f32], scale: f32) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rare_words_are_always_kept() {
        let vocab = vec![
            VocabEntry { word: "the".into(), count: 1000 },
            VocabEntry { word: "donut".into(), count: 1 },
        ];
        let keep = keep_probabilities(&vocab, 1e-3, 1001);
        assert!(keep[0] < 1.0);
        assert!(keep[1] >= 1.0);
    }

    #[test]
    fn sampling_disabled_keeps_everything() {
        let vocab = vec![VocabEntry { word: "the".into(), count: 1000 }];
        assert_eq!(keep_probabilities(&vocab, 0.0, 1000), vec![1.0]);
    }

    #[test]
    fn learning_rate_decays_to_min_alpha() {
        let cfg = TrainingConfig::default();
        assert_eq!(learning_rate(&cfg, 0, 100), cfg.alpha);
        assert!((learning_rate(&cfg, 50, 100) - (cfg.alpha + cfg.min_alpha) / 2.0).abs() < 1e-7);
        assert!((learning_rate(&cfg, 100, 100) - cfg.min_alpha).abs() < 1e-7);
    }

    #[test]
    fn progress_ignores_rare_words() {
        let corpus = Corpus::from_sentences(vec!["a a a a a x y z"
            .split_whitespace()
            .map(str::to_string)
            .collect()]);
        let vocab = build_vocab(&corpus, 5);
        let index: HashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, e)| (e.word.as_str(), i))
            .collect();
        let total_words: usize = vocab.iter().map(|e| e.count).sum();

        let processed: usize = corpus
            .sentences()
            .iter()
            .map(|s| vocab_indices(s, &index).len())
            .sum();

        assert_eq!(total_words, 5);
        assert_eq!(processed, total_words);
        // half way through the only epoch, alpha is still above min_alpha
        let cfg = TrainingConfig::default();
        assert!(learning_rate(&cfg, processed / 2, total_words) > cfg.min_alpha);
    }

    #[test]
    fn sigmoid_is_clamped() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert_eq!(sigmoid(100.0), sigmoid(MAX_EXP));
        assert!(sigmoid(-100.0) > 0.0);
    }
}
