//! Logging for code that can run from the process-exit hook.
//!
//! logwise keeps per-thread state. The C runtime runs `atexit` handlers after the main
//! thread's thread-locals are destroyed, so anything reachable from a teardown logs through
//! [`log_sync!`], which stays quiet once the exit hook has started.

/// Forwards to `logwise::<level>!` unless the process is exiting.
///
/// logwise's proc macros re-parse their input from a string, which gives every identifier
/// this macro's hygiene; each value is therefore bound to a macro-local name first.
macro_rules! log_sync {
    ($level:ident, $fmt:tt $(,)?) => {
        if !$crate::exit::exiting() {
            logwise::$level!($fmt);
        }
    };
    ($level:ident, $fmt:tt, $key:ident = $val:expr $(,)?) => {
        if !$crate::exit::exiting() {
            let __log_sync_value = $val;
            logwise::$level!($fmt, $key = __log_sync_value);
        }
    };
}

pub(crate) use log_sync;
