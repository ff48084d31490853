use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building a vocabulary, training, or
/// querying word vectors.
#[derive(Debug, Error)]
pub enum Error {
    /// A hyperparameter is out of range. Reported before any training starts.
    #[error("invalid configuration: {field} = {value}: {reason}")]
    Configuration {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The word is not in the vocabulary.
    #[error("word not in vocabulary: {0:?}")]
    Lookup(String),

    /// Every candidate neighbor was filtered out.
    #[error(
        "no neighbor of {word:?} left after ignoring the {ignore_n_most_common} most common words"
    )]
    NotFound {
        word: String,
        ignore_n_most_common: usize,
    },

    #[error("error reading or writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A saved vector table is malformed.
    #[error("invalid vectors file {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    #[error("serialization error")]
    Serialization(#[from] bincode::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }

    pub(crate) fn config(field: &'static str, value: impl ToString, reason: &'static str) -> Error {
        Error::Configuration {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
