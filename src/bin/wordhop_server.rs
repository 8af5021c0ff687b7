use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use wordhop_rs::logging::init_logging;
use wordhop_rs::server::{self, ServerConfig};
use wordhop_rs::{SimilarityTable, WordGraph};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve word choices and hop distances over HTTP", long_about = None)]
struct Args {
    /// Annotated similarity dataset (JSON)
    #[arg(long, default_value = "annotated_word_similarities.json")]
    dataset: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Random seed; 0 seeds from the clock
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Largest `count` accepted by /api/words/random
    #[arg(long = "max-random-words", default_value_t = 100)]
    max_random_words: usize,

    /// Set verbosity level
    #[arg(short, long, default_value_t = 1)]
    verbose: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // no table, no service
    let table = SimilarityTable::from_file(&args.dataset)
        .with_context(|| format!("cannot start without dataset {}", args.dataset.display()))?;

    let seed = if args.seed == 0 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs()
    } else {
        args.seed
    };
    info!("Using random seed {seed}");

    let graph = Arc::new(WordGraph::from_seed(Arc::new(table), seed));
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        max_random_words: args.max_random_words,
    };

    server::serve(graph, config).await?;
    Ok(())
}
