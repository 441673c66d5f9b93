//! Errors produced by singleton accessors.
//!
//! Both variants are fatal for the call that produced them. [`Singleton::instance`](crate::Singleton::instance)
//! turns them into a panic; [`Singleton::try_instance`](crate::Singleton::try_instance) hands
//! them back so the caller can report them before giving up.

/// Errors that can occur when accessing a singleton.
///
/// # Examples
///
/// ```
/// use policy_singleton::SingletonError;
///
/// let e = SingletonError::DeadReference { type_name: "app::Logger" };
/// assert_eq!(e.to_string(), "Dead reference to singleton app::Logger detected");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SingletonError {
    /// The creation policy could not produce an instance.
    ///
    /// Not retried automatically. A later call will attempt construction again.
    #[error("Failed to allocate singleton {type_name}")]
    AllocationFailed {
        /// Name of the managed type
        type_name: &'static str,
    },
    /// The singleton was accessed after it had been destroyed, and its lifetime
    /// policy does not permit recreation.
    ///
    /// This indicates a shutdown-ordering bug in the calling code.
    #[error("Dead reference to singleton {type_name} detected")]
    DeadReference {
        /// Name of the managed type
        type_name: &'static str,
    },
}
