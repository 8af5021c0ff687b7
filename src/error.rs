use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading or querying the word graph.
#[derive(Error, Debug)]
pub enum WordHopError {
    /// The dataset file could not be opened or read.
    #[error("failed to read dataset {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The dataset is not a JSON object of neighbor arrays.
    #[error("dataset is not an object of neighbor arrays: {0}")]
    DatasetFormat(#[from] serde_json::Error),

    #[error("dataset contains no words")]
    EmptyDataset,

    /// A row too short to yield a choice set.
    #[error("row for '{word}' has {len} neighbor(s), at least 2 are required")]
    ShortRow { word: String, len: usize },

    /// Two keys collapse onto the same lowercase word.
    #[error("word '{0}' appears more than once after lowercasing")]
    DuplicateWord(String),

    #[error("Word '{0}' not found in database")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// Malformed word vector file.
    #[error("word vectors: {0}")]
    Vectors(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl WordHopError {
    /// True for errors that must stop the process before it serves traffic.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            WordHopError::DatasetIo { .. }
                | WordHopError::DatasetFormat(_)
                | WordHopError::EmptyDataset
                | WordHopError::ShortRow { .. }
                | WordHopError::DuplicateWord(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WordHopError>;
