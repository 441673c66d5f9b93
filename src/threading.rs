/*!
Threading models: how construction and teardown of a singleton are serialized.

Every model exposes a scoped lock through [`ThreadingModel::lock`]. The returned guard
releases on every exit path, including early returns and unwinding. The lock is only taken
on the slow path (first construction, recreation and teardown); once an instance is
published, the accessor reads it without locking.

# Choosing a model

- [`ClassLevelLockable`] is the default, and the right choice whenever more than one thread
  may call the accessor.
- [`AtomicLockable`] gives the same exclusion by spinning instead of blocking. Waiters burn
  CPU, so it only pays off for very short constructors.
- [`SingleThreaded`] does not lock at all. With it, concurrent first calls may construct
  more than one instance (all state stays memory-safe, but uniqueness is lost), so use it
  only when the accessor is never called from two threads.
- [`PerThread`] gives every thread its own instance instead of sharing one.
*/

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::spinlock::Spinlock;

pub use crate::spinlock::SpinGuard;

/// Provides the scoped lock guarding a singleton's critical sections.
pub trait ThreadingModel: Sync + Sized + 'static {
    /// Initial state, used to build holders in `static` items.
    const INIT: Self;

    /// When `true`, each thread gets its own instance and the shared slot is never used.
    const PER_THREAD: bool = false;

    /// Held for the duration of a critical section.
    type Guard<'a>
    where
        Self: 'a;

    /// Enters the critical section.
    fn lock(&self) -> Self::Guard<'_>;
}

/// No synchronization at all.
#[derive(Debug, Default)]
pub struct SingleThreaded;

impl ThreadingModel for SingleThreaded {
    const INIT: Self = SingleThreaded;

    type Guard<'a>
        = ()
    where
        Self: 'a;

    fn lock(&self) -> Self::Guard<'_> {}
}

/// One blocking mutex per configuration.
#[derive(Debug, Default)]
pub struct ClassLevelLockable {
    mutex: Mutex<()>,
}

impl ThreadingModel for ClassLevelLockable {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = ClassLevelLockable {
        mutex: Mutex::new(()),
    };

    type Guard<'a>
        = MutexGuard<'a, ()>
    where
        Self: 'a;

    fn lock(&self) -> Self::Guard<'_> {
        // the slot is only published after construction succeeds, so a panic inside the
        // critical section leaves nothing half-built behind
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One spinlock per configuration.
///
/// ```
/// use policy_singleton::{singleton, Singleton};
/// use policy_singleton::creation::CreateUsingBox;
/// use policy_singleton::lifetime::NoDestroy;
/// use policy_singleton::threading::AtomicLockable;
///
/// singleton! {
///     struct Hits: std::sync::atomic::AtomicUsize = (CreateUsingBox, NoDestroy, AtomicLockable);
/// }
/// let handles: Vec<_> = (0..4)
///     .map(|_| std::thread::spawn(|| Hits::instance() as *const _ as usize))
///     .collect();
/// let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
/// assert!(addresses.windows(2).all(|w| w[0] == w[1]));
/// ```
#[derive(Debug, Default)]
pub struct AtomicLockable {
    lock: Spinlock,
}

impl ThreadingModel for AtomicLockable {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = AtomicLockable {
        lock: Spinlock::new(),
    };

    type Guard<'a>
        = SpinGuard<'a>
    where
        Self: 'a;

    fn lock(&self) -> Self::Guard<'_> {
        self.lock.lock()
    }
}

/// A distinct instance per calling thread.
///
/// The accessor bypasses the shared slot and lock entirely. Per-thread instances are never
/// destroyed, whatever the lifetime policy says. The lock exists only so the model has the
/// same shape as the others.
///
/// ```
/// use policy_singleton::{singleton, Singleton};
/// use policy_singleton::creation::CreateUsingBox;
/// use policy_singleton::lifetime::NoDestroy;
/// use policy_singleton::threading::PerThread;
///
/// singleton! {
///     struct Scratch: std::sync::Mutex<Vec<u32>> = (CreateUsingBox, NoDestroy, PerThread);
/// }
/// Scratch::instance().lock().unwrap().push(1);
/// let other = std::thread::spawn(|| Scratch::instance().lock().unwrap().len())
///     .join()
///     .unwrap();
/// assert_eq!(other, 0);
/// assert_eq!(Scratch::instance().lock().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PerThread;

impl ThreadingModel for PerThread {
    const INIT: Self = PerThread;
    const PER_THREAD: bool = true;

    type Guard<'a>
        = ()
    where
        Self: 'a;

    fn lock(&self) -> Self::Guard<'_> {}
}

/// Threading model used when a configuration does not name one.
pub type DefaultThreadingModel = ClassLevelLockable;
