pub mod dataset;
pub mod error;
pub mod game;
pub mod logging;
pub mod neighbor_graph;
pub mod server;
pub mod similarity_table;
pub mod word_graph;
pub mod word_vectors;

pub use error::{Result, WordHopError};
pub use neighbor_graph::{FAN, NeighborGraph};
pub use similarity_table::{SimilarityEntry, SimilarityTable, UNKNOWN_DISTANCE};
pub use word_graph::{Choice, ChoiceKind, ChoiceSet, WordGraph};
pub use word_vectors::WordVectors;
