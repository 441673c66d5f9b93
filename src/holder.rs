/*!
The instance holder and the [`Singleton`] accessor trait.

A [`Holder`] owns the slot and destroyed flag for one configuration. It is built in a
`static` by the [`singleton!`](crate::singleton!) macro, which also implements
[`Singleton`] for a marker type so the configuration can be named and accessed.

# Access algorithm

1. Fast path: load the slot with acquire ordering. If it holds an instance, return it
   without locking.
2. Take the threading model's scoped lock and load the slot again; another thread may have
   finished construction in the meantime.
3. If the previous epoch was torn down, ask the lifetime policy whether a new one may begin.
4. Construct through the creation policy, publish the pointer with release ordering and
   schedule the teardown.

Errors in steps 3 and 4 return early; the guard releases the lock on the way out.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use crate::creation::{CreateUsingArc, CreationPolicy};
use crate::error::SingletonError;
use crate::lifetime::LifetimePolicy;
use crate::logging::log_sync;
use crate::threading::ThreadingModel;

thread_local! {
    /// Per-thread instances, keyed by the address of the holder that owns them.
    static PER_THREAD: RefCell<HashMap<usize, NonNull<()>>> = RefCell::new(HashMap::new());
}

/// Storage for one singleton configuration.
///
/// Holders are normally declared through [`singleton!`](crate::singleton!) and reached via
/// [`Singleton::holder`]; using one directly requires a `static` and a teardown function.
///
/// ```
/// use policy_singleton::Holder;
/// use policy_singleton::creation::CreateUsingBox;
/// use policy_singleton::lifetime::NoDestroy;
/// use policy_singleton::threading::ClassLevelLockable;
///
/// static NAMES: Holder<Vec<String>, CreateUsingBox, NoDestroy, ClassLevelLockable> = Holder::new();
///
/// assert!(NAMES.get().is_none());
/// let names = NAMES.try_instance(|| {}).unwrap();
/// assert!(std::ptr::eq(names, NAMES.get().unwrap()));
/// ```
pub struct Holder<T, C, L, M> {
    slot: AtomicPtr<T>,
    // only touched while the threading model's lock is held
    destroyed: AtomicBool,
    creation: C,
    threading: M,
    _lifetime: PhantomData<fn() -> L>,
}

impl<T, C, L, M> Holder<T, C, L, M>
where
    C: CreationPolicy<T>,
    L: LifetimePolicy,
    M: ThreadingModel,
{
    /// Creates an empty holder. No instance exists until the first access.
    pub const fn new() -> Self {
        Holder {
            slot: AtomicPtr::new(std::ptr::null_mut()),
            destroyed: AtomicBool::new(false),
            creation: C::INIT,
            threading: M::INIT,
            _lifetime: PhantomData,
        }
    }

    /// Whether the last epoch ended and no new one has begun.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl<T, C, L, M> Holder<T, C, L, M>
where
    T: Default + Send + Sync + 'static,
    C: CreationPolicy<T>,
    L: LifetimePolicy,
    M: ThreadingModel,
{
    /// Returns the instance, constructing it on first use.
    ///
    /// `teardown` is handed to the lifetime policy whenever a new epoch begins. It should
    /// call [`destroy`](Self::destroy) on this holder.
    ///
    /// # Errors
    ///
    /// - [`SingletonError::DeadReference`] if the instance was destroyed and the lifetime
    ///   policy forbids recreation.
    /// - [`SingletonError::AllocationFailed`] if the creation policy produced nothing.
    pub fn try_instance(&'static self, teardown: fn()) -> Result<&'static T, SingletonError> {
        if M::PER_THREAD {
            return Ok(self.thread_instance());
        }
        if let Some(instance) = self.get() {
            return Ok(instance);
        }

        let _guard = self.threading.lock();
        if let Some(instance) = self.get() {
            return Ok(instance);
        }
        let type_name = std::any::type_name::<T>();
        if self.destroyed.load(Ordering::Relaxed) {
            L::on_dead_reference(type_name)?;
            self.destroyed.store(false, Ordering::Release);
        }
        let Some(created) = self.creation.create() else {
            log_sync!(
                error_sync,
                "Failed to allocate singleton {type_name}",
                type_name = logwise::privacy::LogIt(&type_name)
            );
            return Err(SingletonError::AllocationFailed { type_name });
        };
        self.slot.store(created.as_ptr(), Ordering::Release);
        L::schedule_destruction(teardown);
        log_sync!(
            info_sync,
            "Created singleton {type_name}",
            type_name = logwise::privacy::LogIt(&type_name)
        );
        // SAFETY: freshly created and published; only `destroy` invalidates it
        Ok(unsafe { &*created.as_ptr() })
    }

    /// Returns the current instance without constructing one.
    ///
    /// For per-thread configurations this is the calling thread's instance.
    pub fn get(&'static self) -> Option<&'static T> {
        if M::PER_THREAD {
            let key = self as *const Self as usize;
            let found = PER_THREAD.with(|map| map.borrow().get(&key).copied())?;
            // SAFETY: entries for this key are leaked boxes of T
            return Some(unsafe { found.cast::<T>().as_ref() });
        }
        let ptr = self.slot.load(Ordering::Acquire);
        // SAFETY: a non-null slot points at a live instance until `destroy`
        unsafe { ptr.as_ref() }
    }

    /// Ends the current epoch: destroys the instance and marks the holder destroyed.
    ///
    /// Does nothing if there is no instance, so running a teardown twice is harmless.
    /// Per-thread instances are never destroyed.
    ///
    /// # Safety
    ///
    /// No reference previously returned for this holder may be used after this call.
    pub unsafe fn destroy(&self) {
        let _guard = self.threading.lock();
        let Some(instance) = NonNull::new(self.slot.swap(std::ptr::null_mut(), Ordering::AcqRel))
        else {
            return;
        };
        // SAFETY: the pointer came from create and the slot no longer hands it out
        unsafe { self.creation.destroy(instance) };
        self.destroyed.store(true, Ordering::Release);
        let type_name = std::any::type_name::<T>();
        log_sync!(
            info_sync,
            "Destroyed singleton {type_name}",
            type_name = logwise::privacy::LogIt(&type_name)
        );
    }

    fn thread_instance(&'static self) -> &'static T {
        if let Some(instance) = self.get() {
            return instance;
        }
        let key = self as *const Self as usize;
        let created = NonNull::from(Box::leak(Box::new(T::default()))).cast::<()>();
        let stored = PER_THREAD.with(|map| *map.borrow_mut().entry(key).or_insert(created));
        // SAFETY: leaked above, or by an earlier call on this thread
        unsafe { stored.cast::<T>().as_ref() }
    }
}

impl<T, L, M> Holder<T, CreateUsingArc<T>, L, M> {
    /// Returns a strong handle to the current instance, if one exists.
    ///
    /// The handle keeps the object alive even after the singleton is destroyed.
    pub fn shared(&self) -> Option<Arc<T>> {
        self.creation.shared()
    }
}

impl<T, C, L, M> Debug for Holder<T, C, L, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Holder")
            .field("type", &std::any::type_name::<T>())
            .field("live", &!self.slot.load(Ordering::Relaxed).is_null())
            .field("destroyed", &self.destroyed.load(Ordering::Relaxed))
            .finish()
    }
}

/// A configured singleton: one managed type plus its creation, lifetime and threading policies.
///
/// Implemented by the [`singleton!`](crate::singleton!) macro. Every implementor owns its
/// own [`Holder`], so two configurations over the same type are independent.
///
/// ```
/// use policy_singleton::{singleton, Singleton};
///
/// #[derive(Default)]
/// struct Config {
///     port: u16,
/// }
///
/// singleton! {
///     struct AppConfig: Config;
/// }
///
/// assert!(AppConfig::peek().is_none());
/// assert_eq!(AppConfig::instance().port, 0);
/// assert!(std::ptr::eq(AppConfig::instance(), AppConfig::peek().unwrap()));
/// ```
pub trait Singleton: Sized + 'static {
    /// The managed type.
    type Instance: Default + Send + Sync + 'static;
    /// How the instance is allocated and released.
    type Creation: CreationPolicy<Self::Instance>;
    /// When the instance is destroyed and what happens afterwards.
    type Lifetime: LifetimePolicy;
    /// How construction and teardown are serialized.
    type Threading: ThreadingModel;

    /// The holder for this configuration.
    fn holder() -> &'static Holder<Self::Instance, Self::Creation, Self::Lifetime, Self::Threading>;

    /// Returns the instance, constructing it on first use.
    ///
    /// # Panics
    ///
    /// Panics on any [`SingletonError`]; both kinds indicate a bug that retrying won't fix.
    fn instance() -> &'static Self::Instance {
        match Self::try_instance() {
            Ok(instance) => instance,
            Err(e) => panic!("{e}"),
        }
    }

    /// Returns the instance, constructing it on first use, or the reason it is unavailable.
    fn try_instance() -> Result<&'static Self::Instance, SingletonError> {
        Self::holder().try_instance(teardown::<Self>)
    }

    /// Returns the instance if one currently exists, without constructing it.
    fn peek() -> Option<&'static Self::Instance> {
        Self::holder().get()
    }

    /// Whether the instance was destroyed and not yet recreated.
    fn is_destroyed() -> bool {
        Self::holder().is_destroyed()
    }

    /// Runs the teardown now, exactly as the exit registry would.
    ///
    /// # Safety
    ///
    /// No reference previously returned by [`instance`](Self::instance) or
    /// [`try_instance`](Self::try_instance) may be used after this call.
    unsafe fn destroy() {
        unsafe { Self::holder().destroy() }
    }
}

/// Teardown callback registered for `S`.
fn teardown<S: Singleton>() {
    // SAFETY: scheduled for process exit, after which the program no longer uses the instance
    unsafe { S::destroy() }
}
