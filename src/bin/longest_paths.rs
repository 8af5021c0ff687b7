use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wordhop_rs::logging::init_logging;
use wordhop_rs::{FAN, NeighborGraph, SimilarityTable};

#[derive(Parser, Debug)]
#[command(author, version, about = "List the longest shortest paths in the word graph", long_about = None)]
struct Args {
    #[arg(long, default_value = "annotated_word_similarities.json")]
    dataset: PathBuf,

    /// Entries linked from each end of a row; match the value the dataset
    /// was built with
    #[arg(long, default_value_t = FAN)]
    fan: usize,

    /// Number of paths to print
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Set verbosity level
    #[arg(short, long, default_value_t = 1)]
    verbose: i32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let table = SimilarityTable::from_file(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))?;
    let graph = NeighborGraph::from_table(&table, args.fan);

    println!("\nLongest Shortest Paths in the Word Graph:");
    println!("{}", "=".repeat(41));

    for path in graph.longest_paths(args.limit) {
        println!(
            "{} → {}: {} hops",
            table.get_word(path.source),
            table.get_word(path.target),
            path.hops
        );
        let words: Vec<&str> = path.nodes.iter().map(|&i| table.get_word(i)).collect();
        println!("Path: {}\n", words.join(" → "));
    }

    Ok(())
}
