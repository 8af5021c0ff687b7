use crate::error::{Result, WordHopError};
use crate::similarity_table::{SimilarityEntry, SimilarityTable};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Which end of the current word's row a choice was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
    Similar,
    Dissimilar,
}

/// A candidate next word offered to the mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub word: String,
    pub similarity: f64,
    #[serde(rename = "type")]
    pub kind: ChoiceKind,
    pub distance_to_target: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSet {
    pub choices: [Choice; 4],
    pub current_word_distance_to_target: i32,
}

/// Query service over a shared, immutable [`SimilarityTable`].
///
/// The table is read without locking. The random source is the only mutable
/// state and sits behind a mutex held just long enough for one draw or
/// shuffle, so a single service can be shared across threads.
pub struct WordGraph<R = StdRng> {
    table: Arc<SimilarityTable>,
    rng: Mutex<R>,
}

impl WordGraph<StdRng> {
    pub fn from_seed(table: Arc<SimilarityTable>, seed: u64) -> Self {
        WordGraph::with_rng(table, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> WordGraph<R> {
    pub fn with_rng(table: Arc<SimilarityTable>, rng: R) -> Self {
        WordGraph {
            table,
            rng: Mutex::new(rng),
        }
    }

    pub fn table(&self) -> &SimilarityTable {
        &self.table
    }

    fn rng(&self) -> MutexGuard<'_, R> {
        // a panic elsewhere cannot leave the generator in an invalid state
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Uniform draw over the table's words. Consecutive draws may repeat.
    pub fn pick_random_word(&self) -> &str {
        let words = self.table.words();
        // the loader never builds an empty table
        let idx = self.rng().random_range(0..words.len());
        &words[idx]
    }

    /// `count` independent draws; duplicates are possible, including a
    /// round's start and target word.
    pub fn random_words(&self, count: usize) -> Vec<String> {
        let words = self.table.words();
        let mut rng = self.rng();
        (0..count)
            .filter_map(|_| words.choose(&mut *rng).cloned())
            .collect()
    }

    pub fn distance(&self, from: &str, to: &str) -> i32 {
        self.table.distance(from, to)
    }

    /// The two most and two least similar neighbors of `current`, each
    /// annotated with its own distance to `target`, in uniformly random order.
    ///
    /// Rows of 2 or 3 entries yield overlapping halves; the duplicates are kept.
    pub fn choices_for(&self, current: &str, target: &str) -> Result<ChoiceSet> {
        let row = self
            .table
            .row(current)
            .ok_or_else(|| WordHopError::NotFound(current.to_string()))?;

        let n = row.len();
        let mut choices = [
            self.annotate(&row[0], ChoiceKind::Similar, target),
            self.annotate(&row[1], ChoiceKind::Similar, target),
            self.annotate(&row[n - 2], ChoiceKind::Dissimilar, target),
            self.annotate(&row[n - 1], ChoiceKind::Dissimilar, target),
        ];
        choices.shuffle(&mut *self.rng());

        Ok(ChoiceSet {
            choices,
            current_word_distance_to_target: self.distance(current, target),
        })
    }

    fn annotate(&self, entry: &SimilarityEntry, kind: ChoiceKind, target: &str) -> Choice {
        Choice {
            word: entry.word.clone(),
            similarity: entry.similarity,
            kind,
            // read from the neighbor's own row, not the current word's
            distance_to_target: self.distance(&entry.word, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity_table::UNKNOWN_DISTANCE;
    use std::collections::HashMap;

    fn row(entries: &[(&str, f64, i32)]) -> Vec<SimilarityEntry> {
        entries
            .iter()
            .map(|&(w, s, d)| SimilarityEntry::new(w, s, d))
            .collect()
    }

    fn five_word_table() -> Arc<SimilarityTable> {
        let mut raw = HashMap::new();
        raw.insert(
            "apple".to_string(),
            row(&[
                ("pear", 0.9, 1),
                ("plum", 0.8, 2),
                ("fig", 0.3, 2),
                ("kiwi", 0.1, 1),
            ]),
        );
        raw.insert(
            "pear".to_string(),
            row(&[
                ("apple", 0.9, 1),
                ("plum", 0.7, 3),
                ("kiwi", 0.2, 4),
                ("fig", 0.1, 5),
            ]),
        );
        raw.insert(
            "plum".to_string(),
            row(&[("pear", 0.7, 1), ("apple", 0.6, 1), ("fig", 0.2, 2)]),
        );
        raw.insert("fig".to_string(), row(&[("kiwi", 0.5, 1), ("plum", 0.4, 1)]));
        raw.insert("kiwi".to_string(), row(&[("fig", 0.5, 1), ("apple", 0.1, 1)]));
        Arc::new(SimilarityTable::from_rows(raw).unwrap())
    }

    #[test]
    fn choice_set_has_two_of_each_kind() {
        let graph = WordGraph::from_seed(five_word_table(), 7);
        let set = graph.choices_for("apple", "pear").unwrap();

        let similar = set
            .choices
            .iter()
            .filter(|c| c.kind == ChoiceKind::Similar)
            .count();
        assert_eq!(similar, 2);

        let mut words: Vec<&str> = set.choices.iter().map(|c| c.word.as_str()).collect();
        words.sort_unstable();
        assert_eq!(words, vec!["fig", "kiwi", "pear", "plum"]);
        assert_eq!(set.current_word_distance_to_target, 1);
    }

    #[test]
    fn choice_distances_come_from_each_choices_own_row() {
        let graph = WordGraph::from_seed(five_word_table(), 1);
        let set = graph.choices_for("apple", "fig").unwrap();
        let by_word: HashMap<&str, &Choice> =
            set.choices.iter().map(|c| (c.word.as_str(), c)).collect();

        assert_eq!(by_word["pear"].distance_to_target, 5);
        assert_eq!(by_word["plum"].distance_to_target, 2);
        assert_eq!(by_word["kiwi"].distance_to_target, 1);
        // fig's row does not list fig itself
        assert_eq!(by_word["fig"].distance_to_target, UNKNOWN_DISTANCE);
        assert_eq!(by_word["pear"].kind, ChoiceKind::Similar);
        assert_eq!(by_word["kiwi"].kind, ChoiceKind::Dissimilar);
        assert_eq!(set.current_word_distance_to_target, 2);
    }

    #[test]
    fn short_rows_keep_duplicates() {
        let graph = WordGraph::from_seed(five_word_table(), 3);

        let set = graph.choices_for("plum", "kiwi").unwrap();
        let mut words: Vec<&str> = set.choices.iter().map(|c| c.word.as_str()).collect();
        words.sort_unstable();
        assert_eq!(words, vec!["apple", "apple", "fig", "pear"]);

        let set = graph.choices_for("fig", "apple").unwrap();
        let similar: Vec<&str> = set
            .choices
            .iter()
            .filter(|c| c.kind == ChoiceKind::Similar)
            .map(|c| c.word.as_str())
            .collect();
        assert_eq!(similar.len(), 2);
        assert_eq!(set.choices.len(), 4);
    }

    #[test]
    fn unknown_current_word_is_not_found() {
        let graph = WordGraph::from_seed(five_word_table(), 3);
        let err = graph.choices_for("nonexistent-word", "apple").unwrap_err();
        assert!(matches!(err, WordHopError::NotFound(ref w) if w == "nonexistent-word"));
    }

    #[test]
    fn unknown_target_still_yields_a_choice_set() {
        let graph = WordGraph::from_seed(five_word_table(), 3);
        let set = graph.choices_for("apple", "banana").unwrap();
        assert!(
            set.choices
                .iter()
                .all(|c| c.distance_to_target == UNKNOWN_DISTANCE)
        );
        assert_eq!(set.current_word_distance_to_target, UNKNOWN_DISTANCE);
    }

    #[test]
    fn shuffle_is_uniform_over_positions() {
        const N: usize = 10_000;
        let graph = WordGraph::from_seed(five_word_table(), 42);
        let words = ["pear", "plum", "fig", "kiwi"];
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..N {
            let set = graph.choices_for("apple", "pear").unwrap();
            for (pos, choice) in set.choices.iter().enumerate() {
                let w = words.iter().position(|w| *w == choice.word).unwrap();
                counts[pos][w] += 1;
            }
        }

        // expected 2500 per cell, sd ~43
        for row in counts {
            for c in row {
                assert!((2250..=2750).contains(&c), "{counts:?}");
            }
        }
    }

    #[test]
    fn random_word_is_uniform() {
        const N: usize = 10_000;
        let table = five_word_table();
        let k = table.len();
        let graph = WordGraph::from_seed(table, 11);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..N {
            *counts.entry(graph.pick_random_word().to_string()).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), k);

        let expected = N as f64 / k as f64;
        let chi2: f64 = counts
            .values()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        // 4 degrees of freedom, p = 0.001
        assert!(chi2 < 18.47, "chi2 = {chi2}");
    }

    #[test]
    fn random_words_draws_count_words_from_the_table() {
        let graph = WordGraph::from_seed(five_word_table(), 5);
        let drawn = graph.random_words(25);
        assert_eq!(drawn.len(), 25);
        assert!(drawn.iter().all(|w| graph.table().contains(w)));
        assert!(graph.random_words(0).is_empty());
    }

    #[test]
    fn same_seed_same_draws() {
        let table = five_word_table();
        let a = WordGraph::from_seed(table.clone(), 99);
        let b = WordGraph::from_seed(table, 99);
        assert_eq!(a.random_words(10), b.random_words(10));
        assert_eq!(
            a.choices_for("apple", "fig").unwrap(),
            b.choices_for("apple", "fig").unwrap()
        );
    }

    #[test]
    fn cat_dog_scenario() {
        let json = r#"{
            "cat": [
                {"word": "dog", "similarity": 0.9, "hop_distance": 1},
                {"word": "car", "similarity": 0.5, "hop_distance": 2}
            ],
            "dog": [
                {"word": "cat", "similarity": 0.9, "hop_distance": 1},
                {"word": "car", "similarity": 0.3, "hop_distance": 4}
            ],
            "car": [
                {"word": "cat", "similarity": 0.5, "hop_distance": 2},
                {"word": "dog", "similarity": 0.3, "hop_distance": 6}
            ]
        }"#;
        let table = Arc::new(SimilarityTable::from_json(json).unwrap());
        let graph = WordGraph::from_seed(table, 0);
        let set = graph.choices_for("cat", "dog").unwrap();

        let dogs: Vec<&Choice> = set.choices.iter().filter(|c| c.word == "dog").collect();
        let cars: Vec<&Choice> = set.choices.iter().filter(|c| c.word == "car").collect();
        assert_eq!(dogs.len(), 2);
        assert_eq!(cars.len(), 2);
        // dog's own row has no entry for dog
        assert!(dogs.iter().all(|c| c.distance_to_target == UNKNOWN_DISTANCE));
        // car's row, not cat's
        assert!(cars.iter().all(|c| c.distance_to_target == 6));
        assert_eq!(set.current_word_distance_to_target, 1);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let choice = Choice {
            word: "dog".into(),
            similarity: 0.5,
            kind: ChoiceKind::Dissimilar,
            distance_to_target: 3,
        };
        let v = serde_json::to_value(&choice).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "word": "dog",
                "similarity": 0.5,
                "type": "dissimilar",
                "distanceToTarget": 3
            })
        );
    }
}
