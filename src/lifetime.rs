/*!
Lifetime policies: when a singleton is destroyed, and what happens if it is used afterwards.

| Policy | Teardown at exit | Access after teardown |
|--------|------------------|-----------------------|
| [`DefaultLifetime`] | yes | [`SingletonError::DeadReference`] |
| [`NoDestroy`] | never | recreates (unreachable unless destroyed by hand) |
| [`Phoenix`] | yes | recreates a new instance |

Teardown callbacks are handed to the [`exit`](crate::exit) registry.
*/

use crate::error::SingletonError;
use crate::exit;
use crate::logging::log_sync;

/// Decides when a singleton is torn down and how dead references are handled.
pub trait LifetimePolicy: 'static {
    /// Arranges for `teardown` to run when the process exits, or does nothing if this
    /// policy never destroys.
    fn schedule_destruction(teardown: fn());

    /// Called under the holder's lock when the singleton is accessed after it was destroyed.
    ///
    /// Returning `Ok` lets the holder construct a new instance.
    fn on_dead_reference(type_name: &'static str) -> Result<(), SingletonError>;
}

/// Destroyed at process exit. Accessing the singleton afterwards is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLifetime;

impl LifetimePolicy for DefaultLifetime {
    fn schedule_destruction(teardown: fn()) {
        exit::register(teardown);
    }

    fn on_dead_reference(type_name: &'static str) -> Result<(), SingletonError> {
        log_sync!(
            error_sync,
            "Dead reference to singleton {type_name}",
            type_name = logwise::privacy::LogIt(&type_name)
        );
        Err(SingletonError::DeadReference { type_name })
    }
}

/// Never destroyed; the instance lives until the process ends.
///
/// Does not touch the exit registry, so it is usable where no exit hook exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDestroy;

impl LifetimePolicy for NoDestroy {
    fn schedule_destruction(_teardown: fn()) {}

    fn on_dead_reference(_type_name: &'static str) -> Result<(), SingletonError> {
        Ok(())
    }
}

/// Destroyed at process exit, but recreated transparently if used again afterwards.
///
/// Each recreation begins a new epoch with a new instance; references from an earlier
/// epoch do not refer to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phoenix;

impl LifetimePolicy for Phoenix {
    fn schedule_destruction(teardown: fn()) {
        exit::register(teardown);
    }

    fn on_dead_reference(type_name: &'static str) -> Result<(), SingletonError> {
        log_sync!(
            warn_sync,
            "Recreating singleton {type_name} after destruction",
            type_name = logwise::privacy::LogIt(&type_name)
        );
        Ok(())
    }
}

/// Lifetime policy used when a configuration does not name one.
pub type DefaultLifetimePolicy = DefaultLifetime;
