/*!
Process-exit teardown registry.

Lifetime policies that destroy their singleton hand a teardown callback to [`register`].
The registry keeps callbacks in registration order and [`run_teardowns`] runs them
newest-first, the same order the C runtime uses for `atexit`.

# Platform behavior

- With the `atexit` feature (default, not on wasm32), the first registration installs a
  single hook with the C runtime that drains the registry when the process exits normally.
- Without it, nothing runs automatically. Hosts that want teardown call [`run_teardowns`]
  themselves during shutdown. [`NoDestroy`](crate::lifetime::NoDestroy) singletons never
  register anything and need neither.

# Re-registration

A callback that is already pending is not added twice. Once it has run, registering it
again (as a [`Phoenix`](crate::lifetime::Phoenix) singleton does when it is recreated)
adds it anew, so every epoch gets exactly one teardown.

```
use policy_singleton::exit;

fn teardown() {}

let before = exit::pending();
exit::register(teardown);
exit::register(teardown);
assert_eq!(exit::pending(), before + 1);
```
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

/// Callbacks that have been registered and not yet run.
static PENDING: LazyLock<Mutex<Vec<fn()>>> = LazyLock::new(|| Mutex::new(Vec::new()));

/// Set once the C runtime has started running the exit hook.
static EXITING: AtomicBool = AtomicBool::new(false);

#[cfg(all(feature = "atexit", not(target_arch = "wasm32")))]
static HOOK: std::sync::Once = std::sync::Once::new();

/// Registers `teardown` to run at process exit.
pub fn register(teardown: fn()) {
    #[cfg(all(feature = "atexit", not(target_arch = "wasm32")))]
    HOOK.call_once(install_hook);

    let mut pending = PENDING.lock().unwrap_or_else(PoisonError::into_inner);
    if !pending.iter().any(|f| std::ptr::fn_addr_eq(*f, teardown)) {
        pending.push(teardown);
    }
}

/// Runs every pending callback, newest first, and returns how many ran.
///
/// Callbacks registered while draining run too. The registry lock is not held while a
/// callback runs, so callbacks may access other singletons.
pub fn run_teardowns() -> usize {
    let mut ran = 0;
    loop {
        let next = PENDING.lock().unwrap_or_else(PoisonError::into_inner).pop();
        match next {
            Some(teardown) => {
                teardown();
                ran += 1;
            }
            None => return ran,
        }
    }
}

/// Number of callbacks registered and not yet run.
pub fn pending() -> usize {
    PENDING.lock().unwrap_or_else(PoisonError::into_inner).len()
}

/// Whether the exit hook is running. Thread-locals of the main thread are gone by then.
pub(crate) fn exiting() -> bool {
    EXITING.load(Ordering::Acquire)
}

#[cfg(all(feature = "atexit", not(target_arch = "wasm32")))]
fn install_hook() {
    // SAFETY: run_at_exit is a plain extern "C" fn taking no arguments
    let result = unsafe { libc::atexit(run_at_exit) };
    if result != 0 {
        logwise::warn_sync!(
            "Could not install exit hook ({result}); singletons will not be torn down",
            result = logwise::privacy::LogIt(&result)
        );
    }
}

#[cfg(all(feature = "atexit", not(target_arch = "wasm32")))]
extern "C" fn run_at_exit() {
    EXITING.store(true, Ordering::Release);
    // unwinding out of an extern "C" fn aborts; a panicking teardown is skipped and the
    // drain resumes with the next one
    while std::panic::catch_unwind(run_teardowns).is_err() {}
}
