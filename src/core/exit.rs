//! Process termination: the restart request record and the exit hook.

use std::sync::Arc;

/// Exit status a process manager treats as "relaunch me".
pub const RESTART_EXIT_CODE: i32 = 10;

/// Recorded when the control plane asks the agent to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Status the process should exit with.
    pub exit_code: i32,
}

/// Terminates the process with the given status.
///
/// Injected so embedders and tests can observe `Agent::exit` without the
/// process going away.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

pub(crate) fn process_exit_hook() -> ExitHook {
    Arc::new(|code| std::process::exit(code))
}
