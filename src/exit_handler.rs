//! Exit code logic for the fahrplan-dl process.
//!
//! Single responsibility: map succeeded/failed talk counts to the process exit outcome.

use std::process::ExitCode;

/// Process outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every talk was downloaded or already present.
    Success,
    /// Some talks failed, others succeeded.
    Partial,
    /// Every talk failed, or the run could not start.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        Self::from(exit.code())
    }
}

/// Determines the process exit outcome from succeeded and failed talk counts.
pub(crate) fn determine_exit_outcome(succeeded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if succeeded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
