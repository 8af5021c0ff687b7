use crate::error::{Result, WordHopError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hop distance reported when a pair is not recorded in the anchor's row.
/// This means "unknown", not "infinitely far".
pub const UNKNOWN_DISTANCE: i32 = -1;

/// One neighbor of an anchor word, as stored in the dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub word: String,
    pub similarity: f64,
    pub hop_distance: i32,
}

impl SimilarityEntry {
    pub fn new(word: impl Into<String>, similarity: f64, hop_distance: i32) -> Self {
        SimilarityEntry {
            word: word.into(),
            similarity,
            hop_distance,
        }
    }
}

/// Read-only map from a lowercase word to its neighbors ranked by
/// descending similarity. Row order comes from the dataset and is never
/// re-sorted: the prefix is "most similar", the suffix "least similar".
#[derive(Debug)]
pub struct SimilarityTable {
    words: Vec<String>, // sorted keys - index to word map
    rows: HashMap<String, Vec<SimilarityEntry>>,
}

impl SimilarityTable {
    /// Load the annotated dataset from disk. Any failure here is fatal for
    /// a server: there is no partial table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimilarityTable> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| WordHopError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table = SimilarityTable::from_json(&data)?;
        info!(
            "Loaded {} words with similarity data from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<SimilarityTable> {
        let raw: HashMap<String, Vec<SimilarityEntry>> =
            serde_json::from_reader(BufReader::new(reader))?;
        SimilarityTable::from_rows(raw)
    }

    pub fn from_json(data: &str) -> Result<SimilarityTable> {
        let raw: HashMap<String, Vec<SimilarityEntry>> = serde_json::from_str(data)?;
        SimilarityTable::from_rows(raw)
    }

    /// Validate and normalise parsed rows. Keys and neighbor words are
    /// lowercased; entry order is kept as given.
    pub fn from_rows(raw: HashMap<String, Vec<SimilarityEntry>>) -> Result<SimilarityTable> {
        if raw.is_empty() {
            return Err(WordHopError::EmptyDataset);
        }

        let mut rows: HashMap<String, Vec<SimilarityEntry>> = HashMap::with_capacity(raw.len());
        let mut unsorted = 0usize;

        for (key, mut row) in raw {
            let word = key.to_lowercase();
            if row.len() < 2 {
                return Err(WordHopError::ShortRow {
                    word,
                    len: row.len(),
                });
            }
            if row.windows(2).any(|w| w[0].similarity < w[1].similarity) {
                unsorted += 1;
            }
            for entry in row.iter_mut() {
                entry.word = entry.word.to_lowercase();
            }

            match rows.entry(word) {
                Entry::Occupied(e) => return Err(WordHopError::DuplicateWord(e.key().clone())),
                Entry::Vacant(e) => {
                    e.insert(row);
                }
            }
        }

        if unsorted > 0 {
            warn!("{unsorted} row(s) are not sorted by descending similarity; order kept as given");
        }

        let mut words: Vec<String> = rows.keys().cloned().collect();
        words.sort_unstable();

        Ok(SimilarityTable { words, rows })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All anchor words in sorted order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn get_word(&self, idx: usize) -> &str {
        &self.words[idx]
    }

    pub fn get_index(&self, word: &str) -> Option<usize> {
        self.words
            .binary_search_by(|w| w.as_str().cmp(word))
            .ok()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.rows.contains_key(word)
    }

    pub fn row(&self, word: &str) -> Option<&[SimilarityEntry]> {
        self.rows.get(word).map(Vec::as_slice)
    }

    /// Hop distance recorded in `from`'s row for `to`, or [`UNKNOWN_DISTANCE`].
    /// Each direction is read from its own anchor; no symmetry is assumed.
    pub fn distance(&self, from: &str, to: &str) -> i32 {
        self.row(from)
            .and_then(|row| row.iter().find(|e| e.word == to))
            .map_or(UNKNOWN_DISTANCE, |e| e.hop_distance)
    }
}
