//! Trained word vectors and nearest-neighbor queries.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::Index;
use std::path::Path;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Metric;
use crate::error::{Error, Result};

pub const WORDS_FILE: &str = "words.txt";
pub const VECTORS_FILE: &str = "vectors.bin";

/// An immutable table of word embeddings.
///
/// Row 0 belongs to no word (its vocabulary entry is an empty placeholder);
/// rows 1.. are words in descending frequency order, so a word's index is
/// also its frequency rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Table")]
pub struct Vectors {
    /// Embedding vector length (number of dimensions).
    size: usize,

    /// The reverse vocabulary. `vocab[0]` is a placeholder.
    vocab: Vec<String>,

    /// `embeddings[k * size..(k+1) * size]` is the vector embedding for word `k`.
    embeddings: Vec<f32>,

    /// Word to row. Rebuilt from `vocab`, never stored.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// The stored fields of `Vectors`, in serialization order.
#[derive(Deserialize)]
struct Table {
    size: usize,
    vocab: Vec<String>,
    embeddings: Vec<f32>,
}

impl From<Table> for Vectors {
    fn from(table: Table) -> Self {
        let index = build_index(&table.vocab);
        Vectors {
            size: table.size,
            vocab: table.vocab,
            embeddings: table.embeddings,
            index,
        }
    }
}

/// Map each word to its row, skipping the placeholder. If a word appears
/// twice, the first (more frequent) row wins.
fn build_index(vocab: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(vocab.len());
    for (i, word) in vocab.iter().enumerate().skip(1) {
        index.entry(word.clone()).or_insert(i);
    }
    index
}

/// One result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub word: &'a str,
    pub index: usize,
    pub distance: f32,
}

pub fn norm(v: &[f32]) -> f32 {
    v.iter().copied().map(|e| e * e).sum::<f32>().sqrt()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&a, &b)| a * b).sum()
}

pub fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::Euclidean => {
            assert_eq!(a.len(), b.len());
            a.iter()
                .zip(b.iter())
                .map(|(&a, &b)| (a - b) * (a - b))
                .sum::<f32>()
                .sqrt()
        }
        Metric::Cosine => {
            let denom = norm(a) * norm(b);
            if denom == 0.0 {
                // A zero vector points nowhere; call it orthogonal to everything.
                1.0
            } else {
                1.0 - dot(a, b) / denom
            }
        }
    }
}

impl Index<usize> for Vectors {
    type Output = [f32];

    fn index(&self, i: usize) -> &[f32] {
        &self.embeddings[i * self.size..][..self.size]
    }
}

impl Vectors {
    /// *Panics* if `embeddings` doesn't hold exactly one row of `size` floats
    /// per entry of `vocab`.
    pub fn new(vocab: Vec<String>, size: usize, embeddings: Vec<f32>) -> Self {
        assert_eq!(
            embeddings.len(),
            vocab.len() * size,
            "embedding table should have one row per vocabulary entry"
        );
        Vectors::from(Table {
            size,
            vocab,
            embeddings,
        })
    }

    /// Number of rows, including the placeholder row 0.
    pub fn num_rows(&self) -> usize {
        self.vocab.len()
    }

    pub fn num_words(&self) -> usize {
        self.vocab.len().saturating_sub(1)
    }

    /// Returns the vector size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the index for a word as string. Exact match only, case-sensitive.
    pub fn lookup_word(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Get the word for a word-index. Panics if `word` is out of range.
    pub fn word(&self, word: usize) -> &str {
        &self.vocab[word]
    }

    /// The reverse vocabulary, placeholder first.
    pub fn words(&self) -> &[String] {
        &self.vocab
    }

    /// The embedding of `word`.
    pub fn vector(&self, word: &str) -> Result<&[f32]> {
        let i = self
            .lookup_word(word)
            .ok_or_else(|| Error::Lookup(word.to_string()))?;
        Ok(&self[i])
    }

    /// Up to `n` words closest to `word`, nearest first.
    ///
    /// The query word itself is never returned, and neither is any word whose
    /// index is `ignore_n_most_common` or less: the most frequent words
    /// ("the", "and", ...) are close to everything and say little. Ties are
    /// broken by index.
    pub fn neighbors(
        &self,
        word: &str,
        n: usize,
        ignore_n_most_common: usize,
        metric: Metric,
    ) -> Result<Vec<Neighbor<'_>>> {
        let query = self
            .lookup_word(word)
            .ok_or_else(|| Error::Lookup(word.to_string()))?;
        let target = &self[query];

        let mut best: Vec<(OrderedFloat<f32>, usize)> = (1..self.num_rows())
            .into_par_iter()
            .filter(|&c| c != query && c > ignore_n_most_common)
            .map(|c| (OrderedFloat(distance(metric, target, &self[c])), c))
            .collect();
        best.sort_unstable();
        best.truncate(n);

        Ok(best
            .into_iter()
            .map(|(dist, index)| Neighbor {
                word: self.word(index),
                index,
                distance: dist.into_inner(),
            })
            .collect())
    }

    /// The single closest word to `word` that survives the same filtering as
    /// `neighbors`.
    pub fn nearest(
        &self,
        word: &str,
        ignore_n_most_common: usize,
        metric: Metric,
    ) -> Result<Neighbor<'_>> {
        self.neighbors(word, 1, ignore_n_most_common, metric)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                word: word.to_string(),
                ignore_n_most_common,
            })
    }

    /// Write `words.txt` (one word per line, in index order, starting with
    /// the empty placeholder) and `vectors.bin` (the flat table of native
    /// endian `f32`s) into `dir`, creating it if needed.
    pub fn save_flat(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(Error::io(dir))?;

        let words_path = dir.join(WORDS_FILE);
        let mut fo = BufWriter::new(File::create(&words_path).map_err(Error::io(&words_path))?);
        for word in &self.vocab {
            writeln!(fo, "{word}").map_err(Error::io(&words_path))?;
        }
        fo.flush().map_err(Error::io(&words_path))?;

        let vectors_path = dir.join(VECTORS_FILE);
        fs::write(&vectors_path, bytemuck::cast_slice::<f32, u8>(&self.embeddings))
            .map_err(Error::io(&vectors_path))?;
        Ok(())
    }

    /// Read a table written by `save_flat`. The vector size is inferred from
    /// the number of floats and the number of words.
    pub fn load_flat(dir: &Path) -> Result<Self> {
        let words_path = dir.join(WORDS_FILE);
        let text = fs::read_to_string(&words_path).map_err(Error::io(&words_path))?;
        let vocab: Vec<String> = text.lines().map(str::to_string).collect();
        let bad = |reason: String| Error::Format {
            path: words_path.clone(),
            reason,
        };
        match vocab.first() {
            None => return Err(bad("no words".to_string())),
            Some(first) if !first.is_empty() => {
                return Err(bad(format!("first line should be empty, found {first:?}")))
            }
            Some(_) => {}
        }

        let vectors_path = dir.join(VECTORS_FILE);
        let mut f = BufReader::new(File::open(&vectors_path).map_err(Error::io(&vectors_path))?);
        let num_bytes = f
            .get_ref()
            .metadata()
            .map_err(Error::io(&vectors_path))?
            .len() as usize;
        let bad = |reason: String| Error::Format {
            path: vectors_path.clone(),
            reason,
        };
        let float_size = std::mem::size_of::<f32>();
        if num_bytes == 0 || num_bytes % float_size != 0 {
            return Err(bad(format!("length {num_bytes} is not a positive multiple of {float_size}")));
        }
        let num_floats = num_bytes / float_size;
        if num_floats % vocab.len() != 0 {
            return Err(bad(format!(
                "{num_floats} floats can't be split evenly among {} rows",
                vocab.len()
            )));
        }
        let size = num_floats / vocab.len();

        let mut embeddings = vec![0.0f32; num_floats];
        f.read_exact(bytemuck::cast_slice_mut::<f32, u8>(&mut embeddings))
            .map_err(Error::io(&vectors_path))?;
        Ok(Vectors::new(vocab, size, embeddings))
    }

    /// Write the whole table as a single bincode file.
    pub fn save_bincode(&self, path: &Path) -> Result<()> {
        let mut fo = BufWriter::new(File::create(path).map_err(Error::io(path))?);
        bincode::serialize_into(&mut fo, self)?;
        fo.flush().map_err(Error::io(path))?;
        Ok(())
    }

    pub fn load_bincode(path: &Path) -> Result<Self> {
        let f = BufReader::new(File::open(path).map_err(Error::io(path))?);
        let vectors: Vectors = bincode::deserialize_from(f)?;
        if vectors.vocab.is_empty() || vectors.embeddings.len() != vectors.vocab.len() * vectors.size {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!(
                    "{} floats don't match {} rows of size {}",
                    vectors.embeddings.len(),
                    vectors.vocab.len(),
                    vectors.size
                ),
            });
        }
        Ok(vectors)
    }

    /// Load from a directory written by `save_flat` or a file written by
    /// `save_bincode`.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::load_flat(path)
        } else {
            Self::load_bincode(path)
        }
    }
}
