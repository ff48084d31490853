//! Training and query hyperparameters.

use std::fmt::{self, Display};

use clap::ValueEnum;

use crate::error::{Error, Result};

/// Characters removed from text before it is split into words.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OptimizerKind {
    /// Plain stochastic gradient descent.
    Sgd,
    /// Per-parameter adaptive learning rate.
    #[default]
    Adagrad,
}

impl OptimizerKind {
    pub fn default_learning_rate(self) -> f32 {
        match self {
            OptimizerKind::Sgd => 0.025,
            OptimizerKind::Adagrad => 0.05,
        }
    }
}

/// How distance between two embeddings is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Metric {
    #[default]
    Euclidean,
    /// `1 - cos θ`. Ranges over `0..=2`.
    Cosine,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Keep at most this many distinct words, the most frequent ones.
    pub max_vocab_size: usize,
    /// Embedding vector length.
    pub embedding_dim: usize,
    /// Max distance between a pivot and a context word.
    pub window_size: usize,
    /// Number of negative pairs generated for each positive pair.
    pub negative_samples: usize,
    /// Training passes over the whole corpus.
    pub n_epochs: usize,
    /// Neighbor queries skip the words ranked this frequent or more.
    pub ignore_n_most_common: usize,
    /// Training pairs per gradient step.
    pub batch_size: usize,
    pub optimizer: OptimizerKind,
    /// Overrides `optimizer.default_learning_rate()`.
    pub learning_rate: Option<f32>,
    /// Threshold for randomly discarding frequent words, useful range is
    /// (0, 1e-3). Zero disables subsampling.
    pub sample: f32,
    pub seed: u64,
    /// Characters treated as whitespace when splitting documents.
    pub filters: String,
    pub lowercase: bool,
    pub metric: Metric,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_vocab_size: 50_000,
            embedding_dim: 25,
            window_size: 5,
            negative_samples: 4,
            n_epochs: 5,
            ignore_n_most_common: 50,
            batch_size: 256,
            optimizer: OptimizerKind::default(),
            learning_rate: None,
            sample: 0.0,
            seed: 1,
            filters: DEFAULT_FILTERS.to_string(),
            lowercase: true,
            metric: Metric::default(),
        }
    }
}

impl Config {
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
            .unwrap_or_else(|| self.optimizer.default_learning_rate())
    }

    /// Check every hyperparameter, naming the first bad one.
    pub fn validate(&self) -> Result<()> {
        if self.max_vocab_size == 0 {
            return Err(Error::config("max_vocab_size", self.max_vocab_size, "must be positive"));
        }
        if self.embedding_dim == 0 {
            return Err(Error::config("embedding_dim", self.embedding_dim, "must be positive"));
        }
        if self.window_size == 0 {
            return Err(Error::config("window_size", self.window_size, "must be positive"));
        }
        if self.n_epochs == 0 {
            return Err(Error::config("n_epochs", self.n_epochs, "must be positive"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size", self.batch_size, "must be positive"));
        }
        let rate = self.learning_rate();
        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::config("learning_rate", rate, "must be a positive number"));
        }
        if !(0.0..1.0).contains(&self.sample) {
            return Err(Error::config("sample", self.sample, "must be in 0 <= sample < 1"));
        }
        Ok(())
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_vocab_size={} embedding_dim={} window_size={} negative_samples={} \
             n_epochs={} batch_size={} optimizer={:?} learning_rate={} sample={} seed={}",
            self.max_vocab_size,
            self.embedding_dim,
            self.window_size,
            self.negative_samples,
            self.n_epochs,
            self.batch_size,
            self.optimizer,
            self.learning_rate(),
            self.sample,
            self.seed,
        )
    }
}
