use crate::error::{Result, SolcError};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Directory of the contract sources, relative to the project root
pub const CONTRACTS_DIR: &str = "contracts";
/// Directory of the `.abi`/`.bin`/`.link` artifacts, relative to the project root
pub const BUILD_DIR: &str = "build";
/// Directory of the generated bindings, relative to the project root
pub const BINDINGS_DIR: &str = "bindings";

/// Where to find all files or where to write them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPathsConfig {
    /// Project root
    pub root: PathBuf,
    /// Where to find sources
    pub sources: PathBuf,
    /// Where to store build artifacts
    pub artifacts: PathBuf,
    /// Where to store generated bindings
    pub bindings: PathBuf,
}

impl ProjectPathsConfig {
    pub fn builder() -> ProjectPathsConfigBuilder {
        ProjectPathsConfigBuilder::default()
    }

    /// The default layout of a project rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::builder().build_with_root(root)
    }

    /// Creates a new config with the current directory as the root
    pub fn current() -> Result<Self> {
        let root =
            std::env::current_dir().map_err(|err| SolcError::io(err, "current directory"))?;
        Ok(Self::new(root))
    }
}

impl fmt::Display for ProjectPathsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root: {}", self.root.display())?;
        writeln!(f, "contracts: {}", self.sources.display())?;
        writeln!(f, "artifacts: {}", self.artifacts.display())?;
        writeln!(f, "bindings: {}", self.bindings.display())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProjectPathsConfigBuilder {
    root: Option<PathBuf>,
    sources: Option<PathBuf>,
    artifacts: Option<PathBuf>,
    bindings: Option<PathBuf>,
}

impl ProjectPathsConfigBuilder {
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn sources(mut self, sources: impl Into<PathBuf>) -> Self {
        self.sources = Some(sources.into());
        self
    }

    #[must_use]
    pub fn artifacts(mut self, artifacts: impl Into<PathBuf>) -> Self {
        self.artifacts = Some(artifacts.into());
        self
    }

    #[must_use]
    pub fn bindings(mut self, bindings: impl Into<PathBuf>) -> Self {
        self.bindings = Some(bindings.into());
        self
    }

    /// Relative directories are joined onto `root`, unset ones use the default layout.
    pub fn build_with_root(self, root: impl Into<PathBuf>) -> ProjectPathsConfig {
        let root = root.into();
        let dir = |dir: Option<PathBuf>, default: &str| match dir {
            Some(dir) => join(&root, dir),
            None => root.join(default),
        };
        ProjectPathsConfig {
            sources: dir(self.sources, CONTRACTS_DIR),
            artifacts: dir(self.artifacts, BUILD_DIR),
            bindings: dir(self.bindings, BINDINGS_DIR),
            root,
        }
    }

    /// Uses the configured root or the current directory
    pub fn build(mut self) -> Result<ProjectPathsConfig> {
        let root = match self.root.take() {
            Some(root) => root,
            None => {
                std::env::current_dir().map_err(|err| SolcError::io(err, "current directory"))?
            }
        };
        Ok(self.build_with_root(root))
    }
}

fn join(root: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        dir
    } else {
        root.join(dir)
    }
}
