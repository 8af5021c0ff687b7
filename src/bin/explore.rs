use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use wordhop_rs::logging::init_logging;
use wordhop_rs::{SimilarityTable, WordGraph, WordHopError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the choice sets offered on the way to a target", long_about = None)]
struct Args {
    #[arg(long, default_value = "annotated_word_similarities.json")]
    dataset: PathBuf,

    /// Random seed for the choice order; 0 seeds from the clock
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Set verbosity level
    #[arg(short, long, default_value_t = 0)]
    verbose: i32,
}

fn get_input() -> io::Result<String> {
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let table = SimilarityTable::from_file(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))?;
    println!("Loaded {} words from {}", table.len(), args.dataset.display());
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

    println!("Word Graph Explorer - Type 'EXIT' to quit\n");
    loop {
        println!("\nShow the choices offered at a word on the way to a target.");
        print!("Enter current and target word: ");
        io::stdout().flush()?;
        let s = get_input()?;
        if s == "EXIT" {
            println!("Goodbye!");
            break;
        }
        let words: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
        let [current, target] = words.as_slice() else {
            println!("Expected exactly 2 words, but got {}. Try again.", words.len());
            continue;
        };

        if !graph.table().contains(target) {
            println!("'{target}' is out of vocabulary");
            continue;
        }

        let set = match graph.choices_for(current, target) {
            Ok(set) => set,
            Err(WordHopError::NotFound(w)) => {
                println!("'{w}' is out of vocabulary");
                continue;
            }
            Err(e) => return Err(e).context("building choice set"),
        };

        println!(
            "\n'{current}' is {} hop(s) from '{target}'",
            set.current_word_distance_to_target
        );
        println!("{:>10} {:>10} {:>8} Word", "Type", "Similarity", "Hops");
        println!("{}", "-".repeat(40));
        for c in &set.choices {
            let kind = format!("{:?}", c.kind).to_lowercase();
            println!(
                "{:>10} {:10.6} {:>8} {}",
                kind, c.similarity, c.distance_to_target, c.word
            );
        }
    }

    Ok(())
}
