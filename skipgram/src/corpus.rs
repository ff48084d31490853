//! Sources of training documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// A finite collection of documents that can be read any number of times.
///
/// Training makes one pass per epoch, so sources hand out a fresh iterator
/// each time instead of holding every document in memory.
pub trait DocumentSource {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<String>> + '_>;

    /// Number of documents one pass yields.
    fn num_documents(&self) -> usize;
}

/// A directory of plain UTF-8 text files, one document per file.
///
/// Files are read lazily, in sorted path order.
#[derive(Debug, Clone)]
pub struct Corpus {
    files: Vec<PathBuf>,
}

impl Corpus {
    /// List the regular files directly inside `dir`. Subdirectories are
    /// ignored.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = vec![];
        for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
            let entry = entry.map_err(Error::io(dir))?;
            let file_type = entry.file_type().map_err(Error::io(entry.path()))?;
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        debug!(dir = %dir.display(), files = files.len(), "opened corpus");
        Ok(Corpus { files })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Corpus { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl DocumentSource for Corpus {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<String>> + '_> {
        Box::new(
            self.files
                .iter()
                .map(|path| fs::read_to_string(path).map_err(Error::io(path))),
        )
    }

    fn num_documents(&self) -> usize {
        self.files.len()
    }
}

impl<S: AsRef<str>> DocumentSource for [S] {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<String>> + '_> {
        Box::new(self.iter().map(|doc| Ok(doc.as_ref().to_string())))
    }

    fn num_documents(&self) -> usize {
        self.len()
    }
}

impl<S: AsRef<str>> DocumentSource for Vec<S> {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<String>> + '_> {
        self.as_slice().documents()
    }

    fn num_documents(&self) -> usize {
        self.len()
    }
}
