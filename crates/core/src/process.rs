//! Helpers for supervising external processes.

use crate::error::{Result, SolcError};
use std::{
    path::Path,
    process::{Child, ExitStatus},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

/// How often a running child is checked for completion while an [`Interrupt`] is attached
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A cloneable flag that asks running subprocesses to be terminated.
///
/// Every clone shares the same flag, so a handle can be kept by e.g. a signal handler while
/// another one is handed to the project.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag; the active subprocess, if any, is killed at the next poll.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Waits for the `child` to exit.
///
/// Without an interrupt this simply blocks. With one, the child is polled and killed as soon as
/// the interrupt is raised, in which case [`SolcError::Interrupted`] is returned once the child has
/// been reaped.
pub fn wait(child: &mut Child, interrupt: Option<&Interrupt>, program: &Path) -> Result<ExitStatus> {
    let map_err = |err| SolcError::io(err, program);

    let Some(interrupt) = interrupt else {
        return child.wait().map_err(map_err);
    };

    loop {
        if let Some(status) = child.try_wait().map_err(map_err)? {
            return Ok(status);
        }
        if interrupt.is_raised() {
            debug!(program = %program.display(), pid = child.id(), "interrupted, killing child");
            // the child may have exited in the meantime, which is fine
            let _ = child.kill();
            child.wait().map_err(map_err)?;
            return Err(SolcError::Interrupted(program.to_path_buf()));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn waits_without_interrupt() {
        let mut child = Command::new("true").spawn().unwrap();
        let status = wait(&mut child, None, Path::new("true")).unwrap();
        assert!(status.success());
    }

    #[test]
    fn reports_exit_status() {
        let mut child = Command::new("false").spawn().unwrap();
        let interrupt = Interrupt::new();
        let status = wait(&mut child, Some(&interrupt), Path::new("false")).unwrap();
        assert!(!status.success());
    }

    #[test]
    fn kills_child_when_raised() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        handle.raise();

        let err = wait(&mut child, Some(&interrupt), Path::new("sleep")).unwrap_err();
        assert!(matches!(err, SolcError::Interrupted(_)));
        assert!(child.try_wait().unwrap().is_some());
    }
}
