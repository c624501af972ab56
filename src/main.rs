//! Semantle CLI
//!
//! Play the game, watch the solver find the secret, let the solver assist
//! with an external game, or benchmark it.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use semantle::config::SolverConfig;
use semantle::{
    train_from_config, EmbeddingProvider, GameSession, KeyedVectors, PlayOutcome, SemantleConfig,
    SemantleError, SemantleSolver, SolveOutcome,
};
use tracing_subscriber::EnvFilter;

const BANNER_TEXT: &str = include_str!("text/banner.txt");

/// Tolerance used by `assist`, where similarities are typed in with two
/// decimals of a percentage.
const ASSIST_TOLERANCE_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Guess the word of the day
    Play,
    /// Let the solver find the word of the day
    Solve,
    /// Solver suggests guesses, you type in the scores another game gives
    Assist,
    /// Solve many random secrets and report round counts
    Bench,
}

#[derive(Debug, Parser)]
#[command(name = "semantle", version, about = "Semantic word-guessing game and solver")]
struct Cli {
    /// Game mode; asked interactively when omitted
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV corpus to train on
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Pretrained vectors in word2vec text format (skips training)
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Word of the day
    #[arg(long, conflicts_with = "random_secret")]
    secret: Option<String>,

    /// Pick the word of the day at random from the vocabulary
    #[arg(long)]
    random_secret: bool,

    /// Solver matching tolerance is 10^-N (default 6; `assist` defaults to 4
    /// unless this flag or a non-default `solver.tolerance_decimals` is set)
    #[arg(long)]
    tolerance_decimals: Option<u32>,

    /// Seed for probe and secret selection
    #[arg(long)]
    seed: Option<u64>,

    /// Number of secrets solved by `bench`
    #[arg(long)]
    bench_size: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let mode = match cli.mode {
        Some(mode) => mode,
        None => prompt_mode()?,
    };
    println!("\nPlaying in {} mode", mode_name(mode));

    println!("\nLoading...");
    let start = Instant::now();
    let vectors = load_vectors(&cli, &config)?;
    println!(
        "Loaded {} words in {:.2?}",
        vectors.vocabulary().len(),
        start.elapsed()
    );

    let secret = pick_secret(&cli, &config, &vectors)?;

    println!("-------------------------");
    println!("Starting game");

    match mode {
        Mode::Play => run_play(&vectors, &secret),
        Mode::Solve => run_solve(&vectors, &config, &secret),
        Mode::Assist => run_assist(&vectors, &config, cli.tolerance_decimals),
        Mode::Bench => run_bench(&vectors, &config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<SemantleConfig> {
    let mut config = match &cli.config {
        Some(path) => SemantleConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SemantleConfig::default(),
    };

    if let Some(corpus) = &cli.corpus {
        config.corpus.path = corpus.clone();
    }
    if let Some(secret) = &cli.secret {
        config.secret = secret.clone();
    }
    if let Some(decimals) = cli.tolerance_decimals {
        config.solver.tolerance_decimals = decimals;
    }
    if let Some(seed) = cli.seed {
        config.solver.seed = Some(seed);
    }
    if let Some(size) = cli.bench_size {
        config.bench.secrets = size;
    }

    config.validate()?;
    Ok(config)
}

fn prompt_mode() -> anyhow::Result<Mode> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("Enter mode (play/solve): ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("no mode given");
        }
        match Mode::from_str(line.trim(), true) {
            Ok(mode) => return Ok(mode),
            Err(_) => println!("Invalid mode. Please enter 'play' or 'solve'."),
        }
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Play => "play",
        Mode::Solve => "solve",
        Mode::Assist => "assist",
        Mode::Bench => "bench",
    }
}

fn load_vectors(cli: &Cli, config: &SemantleConfig) -> anyhow::Result<KeyedVectors> {
    if let Some(path) = &cli.vectors {
        return KeyedVectors::load_word2vec_text(path)
            .with_context(|| format!("loading vectors {}", path.display()));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Training on {}", config.corpus.path.display()));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let trained = train_from_config(config);
    spinner.finish_and_clear();

    trained.with_context(|| format!("training from {}", config.corpus.path.display()))
}

fn pick_secret(cli: &Cli, config: &SemantleConfig, vectors: &KeyedVectors) -> anyhow::Result<String> {
    if !cli.random_secret {
        return Ok(config.secret.to_lowercase());
    }
    let mut rng = match config.solver.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    vectors
        .vocabulary()
        .choose(&mut rng)
        .cloned()
        .context("vocabulary is empty")
}

fn run_play(vectors: &KeyedVectors, secret: &str) -> anyhow::Result<()> {
    let mut session = GameSession::new(vectors, secret)
        .with_context(|| format!("word of the day '{secret}' is not in the vocabulary"))?;

    for line in BANNER_TEXT.lines() {
        println!("{}", line);
    }
    println!();

    let stdin = io::stdin();
    match session.play(stdin.lock(), io::stdout())? {
        PlayOutcome::Won { guesses } => {
            println!();
            println!("You found '{}' in {} guess(es)!", session.secret(), guesses);
        }
        PlayOutcome::Abandoned { guesses } => {
            println!("Gave up after {} guess(es).", guesses);
            let best = session.best_guesses(5);
            if !best.is_empty() {
                println!("Closest guesses:");
                for record in best {
                    println!("  {:>12} {:>7.2}", record.word, record.percent());
                }
            }
        }
    }
    Ok(())
}

fn run_solve(vectors: &KeyedVectors, config: &SemantleConfig, secret: &str) -> anyhow::Result<()> {
    let mut solver = SemantleSolver::with_config(vectors, &config.solver);
    let report = solver.solve_for_target(secret)?;

    for round in &report.rounds {
        println!();
        println!("Guess: {}", round.probe);
        println!(
            "Searching through {} potential words, looking for words with distance {} +- {}",
            round.before,
            round.target_distance,
            solver.tolerance()
        );
        for (word, distance) in &round.matches {
            println!("Found a match: {} with distance {}", word, distance);
        }
        println!("Kept {} word(s)", round.after);
    }

    println!();
    match report.outcome {
        SolveOutcome::Found(word) => {
            println!("Answer is {} found after {} attempt(s)", word, report.rounds.len());
        }
        SolveOutcome::Ambiguous(words) => {
            println!(
                "Could not separate {} words after {} attempt(s): {}",
                words.len(),
                report.rounds.len(),
                words.join(", ")
            );
        }
    }
    Ok(())
}

/// Typed-in scores need a looser tolerance than the solver default, but an
/// explicit flag or a customised config value wins.
fn assist_tolerance_decimals(flag: Option<u32>, configured: u32) -> u32 {
    match flag {
        Some(decimals) => decimals,
        None if configured != SolverConfig::default().tolerance_decimals => configured,
        None => ASSIST_TOLERANCE_DECIMALS,
    }
}

fn run_assist(
    vectors: &KeyedVectors,
    config: &SemantleConfig,
    tolerance_override: Option<u32>,
) -> anyhow::Result<()> {
    let mut solver_config = config.solver.clone();
    solver_config.tolerance_decimals =
        assist_tolerance_decimals(tolerance_override, config.solver.tolerance_decimals);
    let mut solver = SemantleSolver::with_config(vectors, &solver_config);

    println!("For each suggested word, type the similarity your game shows (e.g. 23.45).");
    println!("Type 'skip' for a different suggestion or 'quit' to stop.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut rounds = 0;

    while solver.remaining_count() > 1 {
        let Some(probe) = solver.next_probe() else {
            break;
        };
        println!();
        println!("Try: {}  ({} candidates left)", probe, solver.remaining_count());

        loop {
            print!("Similarity: ");
            stdout.flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            let input = line.trim();
            match input {
                "quit" | "q" => return Ok(()),
                "skip" | "s" => break,
                _ => {}
            }
            let Ok(percent) = input.parse::<f32>() else {
                println!("Please enter a number, 'skip' or 'quit'.");
                continue;
            };

            match solver.apply_feedback(&probe, percent / 100.0) {
                Ok(round) => {
                    rounds += 1;
                    println!("Eliminated {} words ({} → {})", round.eliminated(), round.before, round.after);
                    if round.after <= 10 {
                        println!("Remaining: {}", solver.candidates().join(", "));
                    }
                }
                Err(SemantleError::NoCandidates { .. }) => {
                    println!("No word matches that score. Check it, or 'skip'.");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
            break;
        }
    }

    if let Some(answer) = solver.candidates().first() {
        println!();
        println!("Answer is {} found after {} attempt(s)", answer, rounds);
    }
    Ok(())
}

fn run_bench(vectors: &KeyedVectors, config: &SemantleConfig) -> anyhow::Result<()> {
    let solver = SemantleSolver::with_config(vectors, &config.solver);
    let mut rng = StdRng::seed_from_u64(solver.seed());
    let secrets: Vec<String> = vectors
        .vocabulary()
        .choose_multiple(&mut rng, config.bench.secrets)
        .cloned()
        .collect();
    if secrets.is_empty() {
        bail!("nothing to benchmark");
    }

    println!("Solving {} secrets (seed {})...", secrets.len(), solver.seed());
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(80));
    let start = Instant::now();
    let summary = solver.benchmark(&secrets);
    let elapsed = start.elapsed();
    spinner.finish_and_clear();

    let total = secrets.len();
    println!("Results:");
    println!("{}", "=".repeat(40));
    println!();
    println!("Round distribution:");
    for (rounds, count) in &summary.distribution {
        let pct = *count as f64 / total as f64 * 100.0;
        let bar = "█".repeat((*count * 40 / total).max(1));
        println!("  {:>3} rounds: {:>5} ({:>5.1}%) {}", rounds, count, pct, bar);
    }
    println!();
    println!("Average rounds: {:.3}", summary.average_rounds());
    println!("Solved: {} / {}", summary.solved(), total);
    if summary.ambiguous > 0 {
        println!("Ambiguous: {}", summary.ambiguous);
    }
    if summary.failed + summary.wrong > 0 {
        println!("Failed: {}", summary.failed + summary.wrong);
    }
    println!("Time elapsed: {:.2?}", elapsed);
    Ok(())
}
