use std::{
    io,
    path::{Path, PathBuf},
    process::ExitStatus,
};
use thiserror::Error;

pub type Result<T, E = SolcError> = std::result::Result<T, E>;

/// Various error types
#[derive(Debug, Error)]
pub enum SolcError {
    /// Errors related to the filesystem or to the pipes of a subprocess
    #[error(transparent)]
    Io(#[from] SolcIoError),
    /// The source directory did not contain a single contract
    #[error("no contracts found in \"{}\", create one before compiling", .0.display())]
    NoContracts(PathBuf),
    /// A required executable could not be resolved on the search path
    #[error("can't locate {0}, is it installed and in your path")]
    ToolNotFound(String),
    /// The compiler exited unsuccessfully and its output was unusable
    #[error("solc exited with {0}\n{1}")]
    SolcOutput(ExitStatus, String),
    /// The compiler response did not match the standard-json output schema
    #[error("malformed compiler output: {0}")]
    MalformedOutput(#[source] serde_json::Error),
    /// The compiler reported at least one diagnostic that is not a warning
    #[error(
        "{0} fatal diagnostic(s) detected, aborting. Please check solc output for more details"
    )]
    FatalDiagnostics(usize),
    /// The binding generator exited unsuccessfully for a contract
    #[error("failed to generate bindings for `{contract}`: {program} exited with {status}")]
    BindingFailed { contract: String, program: String, status: ExitStatus },
    /// A running subprocess was killed because the caller raised an interrupt
    #[error("\"{}\" was interrupted", .0.display())]
    Interrupted(PathBuf),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Semver(#[from] semver::Error),
    #[error("{0}")]
    Message(String),
}

impl SolcError {
    pub fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        SolcIoError::new(err, path).into()
    }

    /// Create an error from the exit status and streams of a failed compiler run.
    ///
    /// Prefers the stderr content, falling back to stdout if stderr is empty.
    pub fn solc_output(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        let mut msg = String::from_utf8_lossy(stderr);
        let mut trimmed = msg.trim();
        if trimmed.is_empty() {
            msg = String::from_utf8_lossy(stdout);
            trimmed = msg.trim();
            if trimmed.is_empty() {
                trimmed = "<empty output>";
            }
        }
        Self::SolcOutput(status, trimmed.into())
    }

    pub fn tool_not_found(program: impl AsRef<Path>) -> Self {
        Self::ToolNotFound(program.as_ref().display().to_string())
    }

    pub fn msg(msg: impl std::fmt::Display) -> Self {
        Self::Message(msg.to_string())
    }
}

/// An I/O error annotated with the path it occurred on.
#[derive(Debug, Error)]
#[error("\"{}\": {io}", self.path.display())]
pub struct SolcIoError {
    io: io::Error,
    path: PathBuf,
}

impl SolcIoError {
    pub fn new(io: io::Error, path: impl Into<PathBuf>) -> Self {
        Self { io, path: path.into() }
    }

    /// The path at which the error occurred
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying `io::Error`
    pub fn source(&self) -> &io::Error {
        &self.io
    }
}

impl From<SolcIoError> for io::Error {
    fn from(err: SolcIoError) -> Self {
        err.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = SolcError::io(io::Error::new(io::ErrorKind::NotFound, "gone"), "build/A.abi");
        assert_eq!(err.to_string(), "\"build/A.abi\": gone");
    }

    #[test]
    fn tool_not_found_has_hint() {
        let err = SolcError::tool_not_found("solc");
        assert_eq!(err.to_string(), "can't locate solc, is it installed and in your path");
    }

    #[cfg(unix)]
    #[test]
    fn solc_output_prefers_stderr() {
        use std::os::unix::process::ExitStatusExt;

        let status = ExitStatus::from_raw(256);
        let err = SolcError::solc_output(status, b"out", b"  Fatal: boom\n");
        assert!(err.to_string().ends_with("Fatal: boom"));

        let err = SolcError::solc_output(status, b"out", b"");
        assert!(err.to_string().ends_with("out"));

        let err = SolcError::solc_output(status, b"", b"");
        assert!(err.to_string().ends_with("<empty output>"));
    }
}
