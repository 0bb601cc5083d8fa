use crate::{
    artifacts::CompilerOutput,
    error::{Result, SolcError},
    process::{self, Interrupt},
    utils,
};
use semver::Version;
use serde::Serialize;
use std::{
    fmt,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output, Stdio},
    str::FromStr,
    thread,
};

pub const SOLC: &str = "solc";

/// Abstraction over `solc` command line utility
///
/// By default the solc path is configured as follows, with descending priority:
///   1. `SOLC_PATH` environment variable
///   2. `solc` otherwise, resolved on the search path
#[derive(Clone, Debug)]
pub struct Solc {
    /// Path to the `solc` executable
    pub solc: PathBuf,
    /// Additional arguments passed to the `solc` executable
    pub args: Vec<String>,
    /// Kills the running compiler when raised
    pub interrupt: Option<Interrupt>,
}

impl Default for Solc {
    fn default() -> Self {
        if let Ok(solc) = std::env::var("SOLC_PATH") {
            return Self::new(solc);
        }

        Self::new(SOLC)
    }
}

impl fmt::Display for Solc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.solc.display())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args.join(" "))?;
        }
        Ok(())
    }
}

impl Solc {
    /// A new instance which points to `solc`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { solc: path.into(), args: Vec::new(), interrupt: None }
    }

    /// Kills the compiler process if `interrupt` is raised while it runs
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Adds an argument to pass to the `solc` command.
    #[must_use]
    pub fn arg<T: Into<String>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to pass to the `solc`.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Resolves the executable on the search path.
    ///
    /// Fails with [`SolcError::ToolNotFound`] if there is no such executable.
    pub fn resolve(&self) -> Result<PathBuf> {
        utils::resolve_executable(&self.solc)
    }

    /// Compiles with `--standard-json` and decodes the output as [`CompilerOutput`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use solbind::{artifacts::{CompilerInput, Source}, Solc};
    ///
    /// let solc = Solc::default();
    /// let sources = Source::read_all_from("./contracts")?;
    /// let output = solc.compile(&CompilerInput::with_sources(&sources))?;
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn compile<T: Serialize>(&self, input: &T) -> Result<CompilerOutput> {
        self.compile_output(input)?.decode()
    }

    /// Compiles with `--standard-json` and returns the raw output of the process.
    pub fn compile_output<T: Serialize>(&self, input: &T) -> Result<RawOutput> {
        let solc = self.resolve()?;
        self.compile_output_with(&solc, input)
    }

    /// Same as [`Self::compile_output()`], with the executable already [resolved](Self::resolve).
    ///
    /// The request is written on a separate thread while stdout and stderr are drained, so a
    /// compiler that starts answering before it consumed all of its input can't deadlock on a full
    /// pipe. All threads are joined before this returns.
    #[instrument(name = "compile", level = "debug", skip_all)]
    pub fn compile_output_with<T: Serialize>(&self, solc: &Path, input: &T) -> Result<RawOutput> {
        let input = serde_json::to_vec(input)?;

        let mut cmd = Command::new(solc);
        cmd.args(&self.args).arg("--standard-json");
        cmd.stdin(Stdio::piped()).stderr(Stdio::piped()).stdout(Stdio::piped());

        trace!(input = %String::from_utf8_lossy(&input));
        debug!(?cmd, "compiling");

        let mut child = cmd.spawn().map_err(|err| SolcError::io(err, solc))?;
        debug!("spawned");

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SolcError::msg("solc was spawned without piped standard streams"));
        };

        let (status, written, stdout, stderr) = thread::scope(|s| {
            let writer = s.spawn(move || {
                let mut stdin = stdin;
                stdin.write_all(&input)
                // dropping stdin closes the pipe, which tells solc the input is complete
            });
            let stdout = s.spawn(move || read_to_end(stdout));
            let stderr = s.spawn(move || read_to_end(stderr));

            let status = process::wait(&mut child, self.interrupt.as_ref(), solc);
            (status, join(writer), join(stdout), join(stderr))
        });

        let status = status?;
        let stdout = stdout.map_err(|err| SolcError::io(err, solc))?;
        let stderr = stderr.map_err(|err| SolcError::io(err, solc))?;
        match written {
            Ok(()) => debug!("wrote JSON input to stdin"),
            // solc quit without reading everything, its output tells why
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe && !status.success() => {
                debug!(%err, "solc closed its input early");
            }
            Err(err) => return Err(SolcError::io(err, solc)),
        }
        debug!(%status, stderr = ?String::from_utf8_lossy(&stderr), "finished");

        Ok(RawOutput { status, stdout, stderr })
    }

    /// Invokes `solc --version` and parses the output as a SemVer [`Version`], without the build
    /// metadata.
    #[instrument(level = "debug", skip_all)]
    pub fn version(&self) -> Result<Version> {
        let solc = self.resolve()?;
        let mut cmd = Command::new(&solc);
        cmd.arg("--version").stdin(Stdio::null()).stderr(Stdio::piped()).stdout(Stdio::piped());
        debug!(?cmd, "getting Solc version");
        let output = cmd.output().map_err(|err| SolcError::io(err, &solc))?;
        trace!(?output);
        let version = version_from_output(output)?;
        debug!(%version);
        Ok(version)
    }
}

/// Everything a finished `solc --standard-json` run produced
#[derive(Clone, Debug)]
pub struct RawOutput {
    pub status: ExitStatus,
    /// The standard-json response
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    /// Decodes the standard-json response.
    ///
    /// A nonzero exit status alone is not an error: solc reports most failures as diagnostics in
    /// a well formed response. Only when the response can't be decoded either, the exit status and
    /// stderr are reported instead of the decoding error.
    pub fn decode(&self) -> Result<CompilerOutput> {
        match CompilerOutput::parse(&self.stdout) {
            Ok(output) => {
                if !self.status.success() {
                    warn!(status = %self.status, "solc exited unsuccessfully, using its output");
                }
                Ok(output)
            }
            Err(_) if !self.status.success() => {
                Err(SolcError::solc_output(self.status, &self.stdout, &self.stderr))
            }
            Err(err) => Err(SolcError::MalformedOutput(err)),
        }
    }
}

fn read_to_end(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

fn version_from_output(output: Output) -> Result<Version> {
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .last()
            .ok_or_else(|| SolcError::msg("Version not found in Solc output"))?;
        let version = version.trim().trim_start_matches("Version:").trim();
        // `0.8.19+commit.7dd6d404.Linux.g++` is not valid semver build metadata
        let version = version.split('+').next().unwrap_or(version);
        Ok(Version::from_str(version.trim_start_matches('v'))?)
    } else {
        Err(SolcError::solc_output(output.status, &output.stdout, &output.stderr))
    }
}

impl AsRef<Path> for Solc {
    fn as_ref(&self) -> &Path {
        &self.solc
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    fn raw(code: i32, stdout: &str, stderr: &str) -> RawOutput {
        RawOutput {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn decodes_successful_output() {
        let output = raw(0, r#"{"errors": []}"#, "").decode().unwrap();
        assert!(output.errors.is_empty());
    }

    #[test]
    fn decodes_output_of_failed_run() {
        let out = r#"{"errors": [{"severity": "error", "formattedMessage": "ParserError"}]}"#;
        let output = raw(1, out, "").decode().unwrap();
        assert!(output.has_error());
    }

    #[test]
    fn undecodable_output_of_failed_run_reports_stderr() {
        let err = raw(1, "", "Invalid option --standard-jsn").decode().unwrap_err();
        assert!(matches!(err, SolcError::SolcOutput(..)));
        assert!(err.to_string().contains("Invalid option"));
    }

    #[test]
    fn undecodable_output_of_successful_run_is_malformed() {
        let err = raw(0, "[1, 2]", "").decode().unwrap_err();
        assert!(matches!(err, SolcError::MalformedOutput(_)));
    }

    #[test]
    fn parses_version_output() {
        let output = Output {
            status: ExitStatus::from_raw(0),
            stdout: b"solc, the solidity compiler commandline interface\nVersion: 0.8.19+commit.7dd6d404.Linux.g++\n".to_vec(),
            stderr: Vec::new(),
        };
        assert_eq!(version_from_output(output).unwrap(), Version::new(0, 8, 19));
    }

    #[test]
    fn missing_solc_is_not_found() {
        let solc = Solc::new("/definitely/not/here/solc");
        assert!(matches!(solc.resolve().unwrap_err(), SolcError::ToolNotFound(_)));
        assert!(matches!(solc.compile(&()).unwrap_err(), SolcError::ToolNotFound(_)));
    }

    #[test]
    fn display_includes_args() {
        let solc = Solc::new("solc").args(["--optimize", "--via-ir"]);
        assert_eq!(solc.to_string(), "solc --optimize --via-ir");
    }
}
