use semantle::config::TrainingConfig;
use semantle::train::build_vocab;
use semantle::{Corpus, EmbeddingProvider, SemantleError, SemantleSolver, Trainer};

fn corpus(lines: &[&str]) -> Corpus {
    Corpus::from_sentences(
        lines
            .iter()
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect(),
    )
}

fn springfield() -> Corpus {
    let mut lines = Vec::new();
    for _ in 0..20 {
        lines.push("homer eats donuts at the plant");
        lines.push("bart skips school with milhouse");
        lines.push("lisa plays sax at school");
        lines.push("marge cooks dinner for homer");
    }
    corpus(&lines)
}

fn small_config() -> TrainingConfig {
    TrainingConfig {
        vector_size: 16,
        min_count: 2,
        epochs: 3,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_vocab_frequency_order() {
    let corpus = corpus(&["b a c a", "c a d", "e"]);
    let vocab = build_vocab(&corpus, 1);

    let words: Vec<&str> = vocab.iter().map(|e| e.word.as_str()).collect();
    // a:3, c:2, then ties in first-seen order
    assert_eq!(words, vec!["a", "c", "b", "d", "e"]);
    assert_eq!(vocab[0].count, 3);
}

#[test]
fn test_vocab_min_count() {
    let corpus = corpus(&["b a c a", "c a d", "e"]);
    let vocab = build_vocab(&corpus, 2);

    let words: Vec<&str> = vocab.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["a", "c"]);
}

#[test]
fn test_train_builds_vectors() {
    let vectors = Trainer::new(small_config()).train(&springfield()).unwrap();

    assert_eq!(vectors.dim(), 16);
    assert!(vectors.contains("homer"));
    assert!(vectors.contains("school"));
    // "homer" and "school" are the most frequent words
    let top: Vec<&str> = vectors.vocabulary()[..3].iter().map(String::as_str).collect();
    assert!(top.contains(&"homer"));
    assert!(top.contains(&"school"));
    let sim = vectors.similarity("homer", "donuts").unwrap();
    assert!((-1.0..=1.0001).contains(&sim));
}

#[test]
fn test_same_seed_same_vectors() {
    let first = Trainer::new(small_config()).train(&springfield()).unwrap();
    let second = Trainer::new(small_config()).train(&springfield()).unwrap();

    for word in first.vocabulary() {
        assert_eq!(first.vector(word), second.vector(word));
    }
}

#[test]
fn test_different_seed_different_vectors() {
    let first = Trainer::new(small_config()).train(&springfield()).unwrap();
    let second = Trainer::new(TrainingConfig {
        seed: 2,
        ..small_config()
    })
    .train(&springfield())
    .unwrap();

    assert_ne!(first.vector("homer"), second.vector("homer"));
}

#[test]
fn test_empty_vocabulary() {
    let result = Trainer::new(TrainingConfig::default()).train(&corpus(&["too rare"]));
    assert!(matches!(result, Err(SemantleError::EmptyVocabulary)));
}

#[test]
fn test_solver_on_trained_vectors() {
    let vectors = Trainer::new(small_config()).train(&springfield()).unwrap();
    let mut solver = SemantleSolver::new(&vectors);
    solver.set_seed(17);

    let report = solver.solve_for_target("school").unwrap();
    assert_eq!(report.answer(), Some("school"));
}
