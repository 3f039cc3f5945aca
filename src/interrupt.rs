//! Cooperative cancellation
//!
//! Signals never interrupt a run mid-write. SIGINT, SIGTERM and SIGHUP only
//! raise a flag; the driver checks it between starts, so a persist already in
//! flight always completes before the session winds down. A second signal
//! while the flag is already raised terminates the process immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status for an interrupted finite session (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Exit status used for a forced exit on the second signal
pub const FORCED_EXIT_CODE: i32 = INTERRUPTED_EXIT_CODE as i32;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Route SIGINT (Ctrl+C), SIGTERM and SIGHUP to `token`.
/// Call this once at program start.
pub fn init_signal_handlers(token: &CancelToken) -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::flag;

    for sig in [SIGINT, SIGTERM, SIGHUP] {
        // Registered first so it sees the flag before this signal sets it
        flag::register_conditional_shutdown(sig, FORCED_EXIT_CODE, Arc::clone(&token.flag))?;
        flag::register(sig, Arc::clone(&token.flag))?;
    }

    tracing::debug!("Signal handlers installed");
    Ok(())
}
