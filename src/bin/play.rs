use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use wordhop_rs::game::{Mover, OracleMover, RandomMover, RoundLimits, play_round};
use wordhop_rs::logging::init_logging;
use wordhop_rs::{SimilarityTable, WordGraph};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MoverKind {
    Oracle,
    Random,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play rounds of the word game offline", long_about = None)]
struct Args {
    #[arg(long, default_value = "annotated_word_similarities.json")]
    dataset: PathBuf,

    #[arg(long, value_enum, default_value_t = MoverKind::Oracle)]
    mover: MoverKind,

    #[arg(long, default_value_t = 5)]
    rounds: usize,

    /// Give up on a round after this many moves
    #[arg(long = "max-steps", default_value_t = 50)]
    max_steps: usize,

    /// Random seed; 0 seeds from the clock
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Set verbosity level
    #[arg(short, long, default_value_t = 1)]
    verbose: i32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let table = SimilarityTable::from_file(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))?;
    let seed = if args.seed == 0 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs()
    } else {
        args.seed
    };
    info!("Using random seed {seed}");

    let graph = WordGraph::from_seed(Arc::new(table), seed);
    let mut mover: Box<dyn Mover> = match args.mover {
        MoverKind::Oracle => Box::new(OracleMover),
        MoverKind::Random => Box::new(RandomMover::new(StdRng::seed_from_u64(seed ^ 0x5eed))),
    };
    let limits = RoundLimits {
        max_steps: args.max_steps,
        ..RoundLimits::default()
    };

    let mut total_score = 0;
    let mut total_time = Duration::ZERO;
    for round in 1..=args.rounds {
        // start and target may coincide; that is how the game draws them
        let words = graph.random_words(2);
        let (start, target) = (&words[0], &words[1]);
        let outcome = play_round(&graph, mover.as_mut(), start, target, &limits)?;

        println!(
            "Round {round}/{}: {start} → {target} (distance {})",
            args.rounds, outcome.start_distance
        );
        println!("  Path: {}", outcome.path.join(" → "));
        println!(
            "  {} in {} steps, {} invalid move(s), score {}",
            if outcome.reached { "Reached" } else { "Gave up" },
            outcome.steps(),
            outcome.invalid_moves,
            outcome.score()
        );
        total_score += outcome.score();
        total_time += outcome.elapsed;
    }

    println!(
        "\n{} mover: total score {total_score} over {} rounds ({:.1?})",
        mover.name(),
        args.rounds,
        total_time
    );
    Ok(())
}
