//! Generation of typed contract bindings from persisted artifacts with `abigen`.

use crate::{
    artifact_output::{ABI_EXTENSION, BIN_EXTENSION},
    error::{Result, SolcError, SolcIoError},
    process::{self, Interrupt},
    utils,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

pub const ABIGEN: &str = "abigen";

/// Package name of the generated bindings
pub const DEFAULT_PACKAGE: &str = "bindings";

/// Extension of the generated binding files
pub const DEFAULT_EXTENSION: &str = "go";

/// Abstraction over the `abigen` command line utility
///
/// By default the abigen path is configured as follows, with descending priority:
///   1. `ABIGEN_PATH` environment variable
///   2. `abigen` otherwise, resolved on the search path
#[derive(Clone, Debug)]
pub struct Abigen {
    /// Path to the `abigen` executable
    pub abigen: PathBuf,
    /// The package the bindings are generated into
    pub package: String,
    /// Extension of the generated files
    pub extension: String,
    /// Kills the running generator when raised
    pub interrupt: Option<Interrupt>,
}

impl Default for Abigen {
    fn default() -> Self {
        if let Ok(abigen) = std::env::var("ABIGEN_PATH") {
            return Self::new(abigen);
        }

        Self::new(ABIGEN)
    }
}

impl Abigen {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            abigen: path.into(),
            package: DEFAULT_PACKAGE.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            interrupt: None,
        }
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Resolves the executable on the search path.
    pub fn resolve(&self) -> Result<PathBuf> {
        utils::resolve_executable(&self.abigen)
    }

    /// The file the binding for `name` is written to, `<bindings_dir>/<name>.<extension>`
    pub fn output_file(&self, bindings_dir: impl AsRef<Path>, name: &str) -> PathBuf {
        bindings_dir.as_ref().join(format!("{name}.{}", self.extension))
    }

    /// Generates a binding for every `.abi`/`.bin` pair in `artifacts_dir`.
    ///
    /// Artifacts are processed in file name order and generation stops at the first failure.
    /// Returns the written binding files.
    #[instrument(level = "debug", skip_all)]
    pub fn generate_all(
        &self,
        artifacts_dir: impl AsRef<Path>,
        bindings_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let abigen = self.resolve()?;
        let bindings_dir = bindings_dir.as_ref();

        let abi_files = abi_files(artifacts_dir)?;
        utils::create_dir_all(bindings_dir)?;

        let bindings = abi_files
            .iter()
            .map(|abi| self.generate(&abigen, abi, bindings_dir))
            .collect::<Result<Vec<_>>>()?;
        debug!(dir = %bindings_dir.display(), count = bindings.len(), "generated bindings");
        Ok(bindings)
    }

    /// Runs `abigen` for a single `.abi` file, its `.bin` sibling is expected next to it.
    ///
    /// The generator's output streams are passed through.
    fn generate(&self, abigen: &Path, abi: &Path, bindings_dir: &Path) -> Result<PathBuf> {
        let name = utils::file_stem(abi)
            .ok_or_else(|| SolcError::msg(format!("invalid artifact file \"{}\"", abi.display())))?;
        let bin = abi.with_extension(BIN_EXTENSION);
        let out = self.output_file(bindings_dir, &name);

        let mut cmd = Command::new(abigen);
        cmd.arg("--abi")
            .arg(abi)
            .arg("--bin")
            .arg(&bin)
            .arg("--pkg")
            .arg(&self.package)
            .arg("--type")
            .arg(&name)
            .arg("--out")
            .arg(&out);
        cmd.stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        debug!(?cmd, contract = %name, "generating binding");

        let mut child = cmd.spawn().map_err(|err| SolcError::io(err, abigen))?;
        let status = process::wait(&mut child, self.interrupt.as_ref(), abigen)?;
        if !status.success() {
            return Err(SolcError::BindingFailed {
                contract: name,
                program: abigen.display().to_string(),
                status,
            });
        }
        Ok(out)
    }
}

/// Returns all `.abi` files directly inside `dir`, sorted.
///
/// A missing directory has no artifacts.
pub fn abi_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, SolcIoError> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            trace!(dir = %dir.display(), "no artifacts directory");
            return Ok(Vec::new());
        }
        Err(err) => return Err(SolcIoError::new(err, dir)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| SolcIoError::new(err, dir))?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == ABI_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
