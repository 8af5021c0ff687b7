//! Builds the annotated similarity dataset from word vectors.
//!
//! Every word gets a row listing every other word by descending cosine
//! similarity, each entry carrying its hop distance in the [`NeighborGraph`].

use crate::error::{Result, WordHopError};
use crate::neighbor_graph::{GraphReport, NeighborGraph};
use crate::similarity_table::{SimilarityEntry, SimilarityTable};
use crate::word_vectors::WordVectors;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// Dataset rows keyed by word; a `BTreeMap` so output files are stable.
pub type AnnotatedRows = BTreeMap<String, Vec<SimilarityEntry>>;

pub struct BuiltDataset {
    pub rows: AnnotatedRows,
    pub graph: NeighborGraph,
    pub distances: Vec<Vec<i32>>,
}

impl BuiltDataset {
    pub fn report(&self) -> GraphReport {
        GraphReport::new(&self.graph, &self.distances)
    }

    /// Write the rows in the on-disk dataset format.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.rows)?;
        Ok(())
    }

    pub fn into_table(self) -> Result<SimilarityTable> {
        SimilarityTable::from_rows(self.rows.into_iter().collect::<HashMap<_, _>>())
    }
}

/// Words needed for every row to hold at least two entries, the least a
/// choice set can be drawn from.
pub const MIN_WORDS: usize = 3;

/// Rank, link, measure and annotate. `fan` is the number of entries taken
/// from each end of a row when building the graph.
pub fn build(vectors: &WordVectors, fan: usize) -> Result<BuiltDataset> {
    if vectors.len() < MIN_WORDS {
        return Err(WordHopError::Vectors(format!(
            "need at least {MIN_WORDS} words with vectors, have {}",
            vectors.len()
        )));
    }
    let similarity = vectors.similarity_rows();
    let ranked: Vec<Vec<usize>> = similarity
        .iter()
        .map(|row| row.iter().map(|&(j, _)| j).collect())
        .collect();
    let graph = NeighborGraph::from_ranked(&ranked, fan);
    let distances = graph.hop_distances();
    let rows = annotate(vectors.words(), &similarity, &distances);

    Ok(BuiltDataset {
        rows,
        graph,
        distances,
    })
}

/// Attach `distances[i][j]` to each `(j, similarity)` of row `i`, keeping
/// the row order.
pub fn annotate(
    words: &[String],
    similarity: &[Vec<(usize, f64)>],
    distances: &[Vec<i32>],
) -> AnnotatedRows {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let row = similarity[i]
                .iter()
                .map(|&(j, score)| SimilarityEntry::new(words[j].clone(), score, distances[i][j]))
                .collect();
            (word.clone(), row)
        })
        .collect()
}
