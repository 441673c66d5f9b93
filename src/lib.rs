/*!
Lazily-initialized singletons composed from orthogonal policies.

policy_singleton manages exactly one instance of a type per configuration. A configuration
picks three independent policies at compile time:

- a **creation policy** that allocates and releases the instance ([`creation`]),
- a **lifetime policy** that decides when it is destroyed and what happens if it is used
  afterwards ([`lifetime`]),
- a **threading model** that serializes construction and teardown ([`threading`]).

The [`Holder`] composes them into a double-checked accessor: the first call constructs the
instance under the threading model's lock, every later call returns it without locking.

# Quick Start

```
use policy_singleton::{singleton, Singleton};

#[derive(Default)]
struct Logger {
    lines: std::sync::Mutex<Vec<String>>,
}

impl Logger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

singleton! {
    /// Default policies: boxed, torn down at exit, guarded by a mutex.
    struct AppLogger: Logger;
}

AppLogger::instance().log("Application started");
AppLogger::instance().log("Application running");
assert_eq!(AppLogger::instance().lines.lock().unwrap().len(), 2);
```

## Choosing policies

```
use policy_singleton::{singleton, Singleton};
use policy_singleton::creation::CreateUsingArc;
use policy_singleton::lifetime::Phoenix;
use policy_singleton::threading::ClassLevelLockable;
use std::collections::HashMap;
use std::sync::RwLock;

singleton! {
    /// Recreated if something touches it after it was torn down.
    pub struct Settings: RwLock<HashMap<String, String>> =
        (CreateUsingArc<RwLock<HashMap<String, String>>>, Phoenix, ClassLevelLockable);
}

Settings::instance().write().unwrap().insert("port".into(), "8080".into());
assert_eq!(Settings::instance().read().unwrap()["port"], "8080");
```

# Policies

| Concern | Policies | Default |
|---------|----------|---------|
| Creation | [`CreateUsingBox`](creation::CreateUsingBox), [`CreateUsingAlloc`](creation::CreateUsingAlloc), [`CreateUsingArc`](creation::CreateUsingArc) | `CreateUsingBox` |
| Lifetime | [`DefaultLifetime`](lifetime::DefaultLifetime), [`NoDestroy`](lifetime::NoDestroy), [`Phoenix`](lifetime::Phoenix) | `DefaultLifetime` |
| Threading | [`ClassLevelLockable`](threading::ClassLevelLockable), [`AtomicLockable`](threading::AtomicLockable), [`SingleThreaded`](threading::SingleThreaded), [`PerThread`](threading::PerThread) | `ClassLevelLockable` |

# Teardown

Singletons whose lifetime policy destroys them register a teardown with the [`exit`]
registry the first time they are constructed. With the default `atexit` feature the registry
runs when the process exits normally. References obtained from [`Singleton::instance`] are
`'static`; a program that keeps using them from detached threads while the process exits
should pick [`NoDestroy`](lifetime::NoDestroy).

# Errors

[`Singleton::try_instance`] reports [`SingletonError`] for dead references and allocation
failures. [`Singleton::instance`] panics on the same conditions, since neither is something
a caller can retry its way out of.

# Feature Flags

- `atexit` (default) - runs registered teardowns from the C runtime's `atexit` (not on wasm32)
*/
pub mod creation;
mod error;
pub mod exit;
mod holder;
pub mod lifetime;
mod logging;
mod macros;
mod spinlock;
pub mod threading;

pub use error::SingletonError;
pub use holder::{Holder, Singleton};
