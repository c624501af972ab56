use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use semantle::config::SolverConfig;
use semantle::solver::REPORTED_MATCHES;
use semantle::{EmbeddingProvider, KeyedVectors, SemantleError, SemantleSolver, SolveOutcome};

fn random_vectors(n: usize, dim: usize, seed: u64) -> KeyedVectors {
    let mut rng = StdRng::seed_from_u64(seed);
    let entries: Vec<(String, Vec<f32>)> = (0..n)
        .map(|i| {
            let v = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
            (format!("word{i}"), v)
        })
        .collect();
    KeyedVectors::new(entries).unwrap()
}

fn seeded(seed: u64) -> SolverConfig {
    SolverConfig {
        seed: Some(seed),
        ..SolverConfig::default()
    }
}

#[test]
fn test_solver_creation() {
    let vectors = random_vectors(40, 16, 1);
    let solver = SemantleSolver::new(&vectors);
    assert_eq!(solver.remaining_count(), 40);
    assert_eq!(solver.all_words(), vectors.vocabulary());
    assert!((solver.tolerance() - 1e-6).abs() < 1e-12);
}

#[test]
fn test_solve_for_target() {
    let vectors = random_vectors(200, 32, 2);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(7));

    let report = solver.solve_for_target("word42").unwrap();

    assert_eq!(report.outcome, SolveOutcome::Found("word42".to_string()));
    assert_eq!(report.answer(), Some("word42"));
    assert!(report.round_count() >= 1);
    assert_eq!(solver.remaining_count(), 1);
}

#[test]
fn test_solve_every_target() {
    let vectors = random_vectors(60, 16, 3);

    for (i, secret) in vectors.vocabulary().iter().enumerate() {
        let mut solver = SemantleSolver::with_config(&vectors, &seeded(i as u64));
        let report = solver.solve_for_target(secret).unwrap();
        assert_eq!(report.answer(), Some(secret.as_str()), "wrong answer for {secret}");
    }
}

#[test]
fn test_candidate_set_never_grows() {
    let vectors = random_vectors(300, 24, 4);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(11));
    let secret = "word123";

    let mut previous = solver.remaining_count();
    while solver.remaining_count() > 1 {
        let probe = solver.next_probe().unwrap();
        let similarity = vectors.similarity(&probe, secret).unwrap();
        let round = solver.apply_feedback(&probe, similarity).unwrap();

        assert_eq!(round.before, previous);
        assert!(round.after <= round.before);
        assert!(solver.candidates().contains(&secret.to_string()));
        previous = round.after;
    }
    assert_eq!(solver.candidates(), &[secret.to_string()]);
}

#[test]
fn test_round_lists_matches_when_few_remain() {
    let vectors = random_vectors(200, 24, 16);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(8));
    let secret = "word64";

    solver.set_tolerance(10.0);
    let probe = "word3";
    let similarity = vectors.similarity(probe, secret).unwrap();
    let wide = solver.apply_feedback(probe, similarity).unwrap();
    assert_eq!(wide.after, 200);
    assert!(wide.after > REPORTED_MATCHES);
    assert!(wide.matches.is_empty());

    solver.set_tolerance(1e-6);
    let narrow = solver.apply_feedback(probe, similarity).unwrap();
    assert!(narrow.after <= REPORTED_MATCHES);
    assert_eq!(narrow.matches.len(), narrow.after);
    let (word, distance) = narrow
        .matches
        .iter()
        .find(|(w, _)| w == secret)
        .expect("secret survives");
    assert_eq!(word, secret);
    assert_eq!(*distance, narrow.target_distance);
}

#[test]
fn test_single_word_vocabulary() {
    let vectors = KeyedVectors::new(vec![("donut".to_string(), vec![1.0, 2.0])]).unwrap();
    let mut solver = SemantleSolver::new(&vectors);

    let report = solver.solve_for_target("donut").unwrap();
    assert_eq!(report.answer(), Some("donut"));
    assert_eq!(report.round_count(), 0);
}

#[test]
fn test_unknown_secret() {
    let vectors = random_vectors(10, 8, 5);
    let mut solver = SemantleSolver::new(&vectors);

    let result = solver.solve_for_target("duff");
    assert!(matches!(result, Err(SemantleError::UnknownWord(w)) if w == "duff"));
}

#[test]
fn test_identical_vectors_are_ambiguous() {
    let mut rng = StdRng::seed_from_u64(6);
    let twin: Vec<f32> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut entries = vec![
        ("twin_a".to_string(), twin.clone()),
        ("twin_b".to_string(), twin),
    ];
    for i in 0..30 {
        entries.push((format!("word{i}"), (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect()));
    }
    let vectors = KeyedVectors::new(entries).unwrap();
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(3));

    let report = solver.solve_for_target("twin_a").unwrap();

    match report.outcome {
        SolveOutcome::Ambiguous(mut words) => {
            words.sort();
            assert_eq!(words, vec!["twin_a".to_string(), "twin_b".to_string()]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    let stalled = report.rounds.iter().rev().take_while(|r| r.eliminated() == 0).count();
    assert_eq!(stalled, SolverConfig::default().max_stalled_rounds);
}

#[test]
fn test_inconsistent_feedback_keeps_candidates() {
    let vectors = random_vectors(50, 16, 7);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(1));

    let result = solver.apply_feedback("word3", 5.0);

    assert!(matches!(result, Err(SemantleError::NoCandidates { .. })));
    assert_eq!(solver.remaining_count(), 50);
}

#[test]
fn test_round_limit() {
    let vectors = random_vectors(20, 8, 8);
    let config = SolverConfig {
        max_rounds: 1,
        seed: Some(2),
        ..SolverConfig::default()
    };
    let mut solver = SemantleSolver::with_config(&vectors, &config);
    // loose enough that nothing is ever eliminated
    solver.set_tolerance(10.0);

    let result = solver.solve_for_target("word5");
    assert!(matches!(
        result,
        Err(SemantleError::RoundLimit { rounds: 1, remaining: 20 })
    ));
}

#[test]
fn test_solve_with_feedback() {
    let vectors = random_vectors(120, 16, 9);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(5));

    let mut asked = Vec::new();
    let report = solver
        .solve_with_feedback(|probe| {
            asked.push(probe.to_string());
            vectors.similarity(probe, "word77")
        })
        .unwrap();

    assert_eq!(report.answer(), Some("word77"));
    assert_eq!(asked.len(), report.round_count());
}

#[test]
fn test_feedback_errors_propagate() {
    let vectors = random_vectors(30, 8, 10);
    let mut solver = SemantleSolver::new(&vectors);

    let result = solver.solve_with_feedback(|_| Err(SemantleError::UnknownWord("nope".into())));
    assert!(matches!(result, Err(SemantleError::UnknownWord(_))));
}

#[test]
fn test_reset() {
    let vectors = random_vectors(80, 16, 11);
    let mut solver = SemantleSolver::with_config(&vectors, &seeded(4));

    solver.solve_for_target("word9").unwrap();
    assert_eq!(solver.remaining_count(), 1);

    solver.reset();
    assert_eq!(solver.remaining_count(), 80);
}

#[test]
fn test_same_seed_same_rounds() {
    let vectors = random_vectors(150, 16, 12);

    let mut first = SemantleSolver::with_config(&vectors, &seeded(99));
    let mut second = SemantleSolver::with_config(&vectors, &seeded(99));
    let a = first.solve_for_target("word10").unwrap();
    let b = second.solve_for_target("word10").unwrap();

    assert_eq!(a.rounds, b.rounds);
}

#[test]
fn test_benchmark() {
    let vectors = random_vectors(100, 16, 13);
    let solver = SemantleSolver::with_config(&vectors, &seeded(21));
    let secrets: Vec<String> = vectors.vocabulary()[..25].to_vec();

    let summary = solver.benchmark(&secrets);

    assert_eq!(summary.solved(), 25);
    assert_eq!(summary.ambiguous + summary.failed + summary.wrong, 0);
    assert!(summary.average_rounds() >= 1.0);
    for pair in summary.distribution.windows(2) {
        assert!(pair[0].0 < pair[1].0);
    }
}

#[test]
fn test_benchmark_counts_failures() {
    let vectors = random_vectors(20, 8, 14);
    let solver = SemantleSolver::new(&vectors);

    let summary = solver.benchmark(&["missing".to_string(), "word1".to_string()]);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.solved(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn solver_always_finds_the_secret(index in 0usize..80, seed in any::<u64>()) {
        let vectors = random_vectors(80, 16, 15);
        let secret = vectors.vocabulary()[index].clone();
        let mut solver = SemantleSolver::with_config(&vectors, &seeded(seed));

        let report = solver.solve_for_target(&secret).unwrap();

        prop_assert_eq!(report.answer(), Some(secret.as_str()));
        let mut previous = 80;
        for round in &report.rounds {
            prop_assert_eq!(round.before, previous);
            prop_assert!(round.after <= round.before);
            previous = round.after;
        }
    }
}
