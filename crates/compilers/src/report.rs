//! Reporting of compiler diagnostics.

use crate::{
    artifacts::Error,
    error::{Result, SolcError},
};
use std::io::{self, Write};

/// What the diagnostics of a compiler run amount to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triage {
    pub warnings: usize,
    /// Diagnostics of any severity other than `warning`
    pub fatal: usize,
}

impl Triage {
    /// Counts the diagnostics by severity
    pub fn new<'a>(errors: impl IntoIterator<Item = &'a Error>) -> Self {
        errors.into_iter().fold(Self::default(), |mut triage, err| {
            if err.severity.is_fatal() {
                triage.fatal += 1;
            } else {
                triage.warnings += 1;
            }
            triage
        })
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal > 0
    }
}

/// Writes every diagnostic to `out`, then fails if any of them was not a warning.
///
/// Nothing is skipped: all messages are written before [`SolcError::FatalDiagnostics`] is returned,
/// so a single run shows the complete set.
pub fn report_diagnostics<W: Write>(errors: &[Error], mut out: W) -> Result<Triage> {
    let map_err = |err: io::Error| SolcError::io(err, "<diagnostics output>");
    for err in errors {
        let msg = err.formatted_message.as_str();
        if msg.ends_with('\n') {
            write!(out, "{msg}").map_err(map_err)?;
        } else {
            writeln!(out, "{msg}").map_err(map_err)?;
        }
    }
    out.flush().map_err(map_err)?;

    let triage = Triage::new(errors);
    debug!(warnings = triage.warnings, fatal = triage.fatal, "reported diagnostics");
    if triage.is_fatal() {
        return Err(SolcError::FatalDiagnostics(triage.fatal));
    }
    Ok(triage)
}
