use crate::error::{Result, WordHopError};
use log::warn;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

// A struct to hold word vectors in a contiguous array for performance.
pub struct WordVectors {
    words: Vec<String>,               // vocabulary - index to word map
    word_map: HashMap<String, usize>, // word to index map
    vectors: Vec<f64>,                // A single, flattened Vec of all vector data
    dims: usize,                      // The dimension of each vector
}

impl WordVectors {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn get_word(&self, idx: usize) -> &str {
        &self.words[idx]
    }

    pub fn get_index(&self, word: &str) -> Option<&usize> {
        self.word_map.get(word)
    }

    fn get_vector(&self, idx: usize) -> &[f64] {
        &self.vectors[idx * self.dims..(idx + 1) * self.dims]
    }

    // Read word vectors from a text file - normalises vectors it reads to unit length
    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<WordVectors> {
        let file = fs::File::open(filename)?;
        WordVectors::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<WordVectors> {
        const EPS: f64 = 1e-8;
        let reader = BufReader::new(reader);

        let mut words: Vec<String> = Vec::new();
        let mut word_map: HashMap<String, usize> = HashMap::new();
        let mut vectors_data: Vec<f64> = Vec::new(); // Accumulate all vector values here
        let mut dims: usize = 0; // Dimension will be determined from the first vector

        for line_result in reader.lines() {
            let line = line_result?;
            let mut parts = line.split_whitespace();

            let Some(key) = parts.next() else {
                continue;
            };
            let current_word = key.to_lowercase();
            let mut values: Vec<f64> = parts
                .map(|s| s.parse::<f64>())
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| WordHopError::Vectors(format!("'{current_word}': {e}")))?;

            if words.is_empty() {
                // Determine dimensions from the first vector
                dims = values.len();
                if dims == 0 {
                    return Err(WordHopError::Vectors("first vector has zero dimensions".into()));
                }
            } else if values.len() != dims {
                return Err(WordHopError::Vectors(format!(
                    "vector for '{}' has dimension {} which differs from initial dimension {}",
                    current_word,
                    values.len(),
                    dims
                )));
            }

            if word_map.contains_key(&current_word) {
                warn!("duplicate vector for '{current_word}', keeping the first");
                continue;
            }

            let norm: f64 = values.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > EPS {
                values.iter_mut().for_each(|e| *e /= norm);
            }

            word_map.insert(current_word.clone(), words.len());
            words.push(current_word);
            vectors_data.extend_from_slice(&values);
        }

        if words.is_empty() {
            return Err(WordHopError::Vectors("no word vectors found".into()));
        }

        Ok(WordVectors {
            words,
            word_map,
            vectors: vectors_data,
            dims,
        })
    }

    /// Restrict to `vocab`, in vocabulary order. Words without a vector and
    /// repeated vocabulary entries are dropped.
    pub fn select(&self, vocab: &[String]) -> Result<WordVectors> {
        let mut words = Vec::new();
        let mut word_map = HashMap::new();
        let mut vectors = Vec::new();

        for word in vocab {
            if word_map.contains_key(word) {
                continue;
            }
            let Some(&idx) = self.get_index(word) else {
                warn!("'{word}' is out of vocabulary, skipping");
                continue;
            };
            word_map.insert(word.clone(), words.len());
            words.push(word.clone());
            vectors.extend_from_slice(self.get_vector(idx));
        }

        if words.is_empty() {
            return Err(WordHopError::Vectors("no vocabulary word has a vector".into()));
        }

        Ok(WordVectors {
            words,
            word_map,
            vectors,
            dims: self.dims,
        })
    }

    /// Cosine similarity of `idx` to every other word, best first.
    pub fn ranked_neighbors(&self, idx: usize) -> Vec<(usize, f64)> {
        let target = self.get_vector(idx);
        let mut scores: Vec<(usize, f64)> = self
            .vectors
            .chunks_exact(self.dims)
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(i, v_slice)| {
                // vectors are normalised, so the dot product is the cosine
                let score = v_slice.iter().zip(target).map(|(v, t)| v * t).sum::<f64>();
                (i, score)
            })
            .collect();

        // Sort by score in descending order
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scores
    }

    /// [`Self::ranked_neighbors`] for every word, computed in parallel.
    pub fn similarity_rows(&self) -> Vec<Vec<(usize, f64)>> {
        (0..self.len())
            .into_par_iter()
            .map(|idx| self.ranked_neighbors(idx))
            .collect()
    }
}

/// Read a vocabulary list: one word per line, possibly preceded by a rank
/// ("17 house"). The last token of each non-empty line is kept, lowercased.
pub fn read_vocabulary<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(word) = line.split_whitespace().last() {
            words.push(word.to_lowercase());
        }
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTORS: &str = "\
cat 1.0 0.0 0.0
Dog 0.9 0.1 0.0
car 0.0 0.0 2.0
tree 0.0 1.0 0.0
";

    #[test]
    fn normalises_and_lowercases() {
        let wv = WordVectors::from_reader(VECTORS.as_bytes()).unwrap();
        assert_eq!(wv.len(), 4);
        assert_eq!(wv.dims(), 3);
        assert_eq!(wv.get_index("dog"), Some(&1));
        let car = wv.get_vector(*wv.get_index("car").unwrap());
        assert!((car[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_ragged_and_unparsable_rows() {
        let ragged = "a 1 2\nb 1\n";
        assert!(matches!(
            WordVectors::from_reader(ragged.as_bytes()),
            Err(WordHopError::Vectors(_))
        ));
        let junk = "a 1 x\n";
        assert!(WordVectors::from_reader(junk.as_bytes()).is_err());
        assert!(WordVectors::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn ranks_neighbors_by_cosine() {
        let wv = WordVectors::from_reader(VECTORS.as_bytes()).unwrap();
        let cat = *wv.get_index("cat").unwrap();
        let ranked = wv.ranked_neighbors(cat);
        assert_eq!(ranked.len(), 3);
        assert_eq!(wv.get_word(ranked[0].0), "dog");
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(ranked.iter().all(|(i, _)| *i != cat));

        let rows = wv.similarity_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[cat], ranked);
    }

    #[test]
    fn select_keeps_vocabulary_order() {
        let wv = WordVectors::from_reader(VECTORS.as_bytes()).unwrap();
        let vocab: Vec<String> = ["tree", "zebra", "cat", "tree"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let sub = wv.select(&vocab).unwrap();
        assert_eq!(sub.words(), &["tree", "cat"]);
        assert_eq!(sub.get_index("cat"), Some(&1));

        let none = vec!["zebra".to_string()];
        assert!(wv.select(&none).is_err());
    }

    #[test]
    fn vocabulary_takes_last_token() {
        let text = "1 house\n\n  2   Water \nfire\n";
        let vocab = read_vocabulary(text.as_bytes()).unwrap();
        assert_eq!(vocab, vec!["house", "water", "fire"]);
    }
}
