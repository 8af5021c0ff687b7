//! Build the annotated similarity dataset from GloVe-format word vectors.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use wordhop_rs::logging::init_logging;
use wordhop_rs::word_vectors::read_vocabulary;
use wordhop_rs::{FAN, WordVectors, dataset};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank words by similarity and annotate hop distances", long_about = None)]
struct Args {
    /// Word vectors, one word per line followed by its components
    #[arg(long = "vectors-file", required = true)]
    vectors_file: PathBuf,

    /// Restrict to these words (one per line, last token kept)
    #[arg(long = "vocab-file")]
    vocab_file: Option<PathBuf>,

    #[arg(long, default_value = "annotated_word_similarities.json")]
    output: PathBuf,

    /// Entries linked from each end of a row
    #[arg(long, default_value_t = FAN)]
    fan: usize,

    /// Set verbosity level
    #[arg(short, long, default_value_t = 1)]
    verbose: i32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let started = Instant::now();

    let mut vectors = WordVectors::from_file(&args.vectors_file)
        .with_context(|| format!("reading {}", args.vectors_file.display()))?;
    info!(
        "Loaded {} vectors of dimension {}",
        vectors.len(),
        vectors.dims()
    );

    if let Some(path) = &args.vocab_file {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let vocab = read_vocabulary(BufReader::new(file))?;
        info!("Loaded {} words from {}", vocab.len(), path.display());
        vectors = vectors.select(&vocab)?;
        info!("{} vocabulary words have vectors", vectors.len());
    }

    info!("Ranking similarities, linking neighbors and measuring hop distances...");
    let built = dataset::build(&vectors, args.fan)?;
    print!("{}", built.report());

    info!("Saving annotated data to {}", args.output.display());
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    built.write_json(&mut writer)?;
    writer.flush()?;

    info!("Done in {:.1?}", started.elapsed());
    Ok(())
}
