//! Skip-gram word embeddings trained with negative sampling.
//!
//! The pipeline: a [`Tokenizer`] builds a [`Vocabulary`] from a corpus and
//! encodes documents as index sequences; a [`PairSampler`] turns sequences
//! into labeled training pairs; a [`SkipGramModel`] learns from them; and the
//! trained pivot table becomes a [`Vectors`] table that answers
//! nearest-neighbor queries.

mod config;
mod corpus;
mod error;
mod logging;
mod model;
mod sampler;
mod tokenizer;
mod trainer;
mod vectors;

pub use config::{Config, Metric, OptimizerKind, DEFAULT_FILTERS};
pub use corpus::{Corpus, DocumentSource};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{BatchStats, SkipGramModel};
pub use sampler::{PairSampler, TrainingPair, UnigramTable, UNIGRAM_TABLE_SIZE};
pub use tokenizer::{Sequence, Tokenizer, VocabWord, Vocabulary};
pub use trainer::{train, EpochStats, Trainer};
pub use vectors::{distance, dot, norm, Neighbor, Vectors, VECTORS_FILE, WORDS_FILE};
