use serde::{Deserialize, Serialize};
use solbind_core::{error::SolcIoError, utils};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// An ordered list of files and their source, keyed by the path relative to the directory they
/// were read from
pub type Sources = BTreeMap<PathBuf, Source>;

/// Content of a solidity file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
}

impl Source {
    /// Creates a new instance of [Source] with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Reads the file's content
    pub fn read(file: impl AsRef<Path>) -> Result<Self, SolcIoError> {
        let file = file.as_ref();
        trace!(file = %file.display(), "reading source file");
        fs::read_to_string(file).map(Self::new).map_err(|err| SolcIoError::new(err, file))
    }

    /// Recursively finds all solidity files under the given dir path and reads them all.
    ///
    /// The returned paths are relative to `dir`.
    pub fn read_all_from(dir: impl AsRef<Path>) -> Result<Sources, SolcIoError> {
        let dir = dir.as_ref();
        let mut sources = Sources::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(dir).to_path_buf();
                SolcIoError::new(io::Error::from(err), path)
            })?;
            if !entry.file_type().is_file() || !utils::is_solidity_file(entry.path()) {
                continue;
            }
            let source = Self::read(entry.path())?;
            let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path()).to_path_buf();
            sources.insert(rel, source);
        }
        debug!(dir = %dir.display(), count = sources.len(), "collected sources");
        Ok(sources)
    }

    /// Returns the content of the file.
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl AsRef<str> for Source {
    fn as_ref(&self) -> &str {
        &self.content
    }
}
