//! Splitting documents into words and mapping words to indices.

use std::collections::HashMap;

use tracing::info;

use crate::config::{Config, DEFAULT_FILTERS};
use crate::corpus::DocumentSource;
use crate::error::{Error, Result};

/// A document as a list of vocabulary indices.
pub type Sequence = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabWord {
    pub word: String,
    /// Number of occurrences in the corpus.
    pub count: u64,
}

/// The words of a corpus, most frequent first.
///
/// Word indices start at 1; index 0 is reserved and never names a word. Rows
/// of an embedding table are indexed the same way, so a table for this
/// vocabulary has `num_rows()` rows.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// `words[i - 1]` is the word with index `i`.
    words: Vec<VocabWord>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from words in first-seen order with their counts.
    /// Sorting is stable, so ties keep their first-seen order.
    fn from_counts(mut words: Vec<VocabWord>, max_size: usize) -> Self {
        words.sort_by(|a, b| b.count.cmp(&a.count));
        words.truncate(max_size);
        let index = words
            .iter()
            .enumerate()
            .map(|(i, vw)| (vw.word.clone(), i + 1))
            .collect();
        Vocabulary { words, index }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of rows in an embedding table for this vocabulary, counting the
    /// reserved row 0.
    pub fn num_rows(&self) -> usize {
        self.words.len() + 1
    }

    /// Get the index for a word. Exact match only, case-sensitive.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Like `index_of`, but a missing word is an error.
    pub fn lookup(&self, word: &str) -> Result<usize> {
        self.index_of(word)
            .ok_or_else(|| Error::Lookup(word.to_string()))
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.entry(index).map(|vw| vw.word.as_str())
    }

    /// Occurrence count of the word with this index, 0 for index 0 or out of
    /// range.
    pub fn count(&self, index: usize) -> u64 {
        self.entry(index).map_or(0, |vw| vw.count)
    }

    /// Total occurrences of all words in the vocabulary.
    pub fn total_count(&self) -> u64 {
        self.words.iter().map(|vw| vw.count).sum()
    }

    fn entry(&self, index: usize) -> Option<&VocabWord> {
        index.checked_sub(1).and_then(|i| self.words.get(i))
    }

    /// `(index, word)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &VocabWord)> + '_ {
        self.words.iter().enumerate().map(|(i, vw)| (i + 1, vw))
    }

    /// The reverse vocabulary: `reverse()[i]` is the word with index `i`.
    /// Position 0 holds an empty placeholder.
    pub fn reverse(&self) -> Vec<String> {
        std::iter::once(String::new())
            .chain(self.words.iter().map(|vw| vw.word.clone()))
            .collect()
    }
}

/// Splits text into words and builds vocabularies.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    max_vocab_size: usize,
    filters: String,
    lowercase: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            max_vocab_size: 50_000,
            filters: DEFAULT_FILTERS.to_string(),
            lowercase: true,
        }
    }
}

impl Tokenizer {
    pub fn new(max_vocab_size: usize, filters: impl Into<String>, lowercase: bool) -> Self {
        Tokenizer {
            max_vocab_size,
            filters: filters.into(),
            lowercase,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Tokenizer::new(config.max_vocab_size, config.filters.clone(), config.lowercase)
    }

    /// Split a document into words: lowercase it (if configured), turn every
    /// filter character into a space, and split on whitespace.
    pub fn words(&self, document: &str) -> Vec<String> {
        let cleaned: String = document
            .chars()
            .map(|c| if self.filters.contains(c) { ' ' } else { c })
            .collect();
        let cleaned = if self.lowercase {
            cleaned.to_lowercase()
        } else {
            cleaned
        };
        cleaned.split_whitespace().map(str::to_string).collect()
    }

    /// Count words across all documents and build a vocabulary of the
    /// `max_vocab_size` most frequent.
    pub fn fit<I>(&self, documents: I) -> Vocabulary
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut counter = WordCounter::default();
        for document in documents {
            counter.add(self.words(document.as_ref()));
        }
        self.finish(counter)
    }

    /// Like `fit`, reading from a document source that may fail.
    pub fn fit_corpus<D: DocumentSource + ?Sized>(&self, corpus: &D) -> Result<Vocabulary> {
        let mut counter = WordCounter::default();
        for document in corpus.documents() {
            counter.add(self.words(&document?));
        }
        Ok(self.finish(counter))
    }

    fn finish(&self, counter: WordCounter) -> Vocabulary {
        let distinct = counter.words.len();
        let vocab = Vocabulary::from_counts(counter.words, self.max_vocab_size);
        info!(
            distinct_words = distinct,
            vocab_size = vocab.len(),
            total_words = vocab.total_count(),
            "built vocabulary"
        );
        vocab
    }

    /// Map each word of `document` to its index, dropping unknown words.
    pub fn encode(&self, vocab: &Vocabulary, document: &str) -> Sequence {
        self.words(document)
            .iter()
            .filter_map(|word| vocab.index_of(word))
            .collect()
    }
}

/// Word counts in first-seen order.
#[derive(Default)]
struct WordCounter {
    words: Vec<VocabWord>,
    position: HashMap<String, usize>,
}

impl WordCounter {
    fn add(&mut self, words: Vec<String>) {
        for word in words {
            if let Some(&i) = self.position.get(&word) {
                self.words[i].count += 1;
            } else {
                self.position.insert(word.clone(), self.words.len());
                self.words.push(VocabWord { word, count: 1 });
            }
        }
    }
}
