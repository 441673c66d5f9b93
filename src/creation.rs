/*!
Creation policies: how a singleton's instance is allocated and released.

A creation policy is stored inside each [`Holder`](crate::Holder), so any state it keeps
(such as the reference-counted keeper of [`CreateUsingArc`]) belongs to exactly one
configuration. The holder calls [`CreationPolicy::create`] at most once per epoch and
passes the same pointer back to [`CreationPolicy::destroy`] when the epoch ends.

# Available policies

- [`CreateUsingBox`]: ordinary heap allocation. The default.
- [`CreateUsingAlloc`]: raw [`std::alloc`] allocation with in-place construction.
  Allocation failure is reported rather than aborting the process.
- [`CreateUsingArc`]: a reference-counted keeper. Destroying the singleton releases the
  keeper, but handles obtained from [`CreateUsingArc::shared`] keep the object alive.
*/

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, PoisonError};

/// Allocates and releases instances of `T`.
///
/// # Safety contract
///
/// `create` must return either `None` or a pointer to a fully constructed `T` that stays
/// valid until it is handed to `destroy`. The holder never passes a pointer to `destroy`
/// twice.
pub trait CreationPolicy<T>: Sync + Sized + 'static {
    /// Initial state, used to build holders in `static` items.
    const INIT: Self;

    /// Constructs a new default instance, or `None` if it could not be allocated.
    fn create(&self) -> Option<NonNull<T>>;

    /// Releases an instance previously returned by [`create`](Self::create).
    ///
    /// # Safety
    ///
    /// `instance` must come from `create` on this same policy value, must not have been
    /// destroyed already, and no reference to it may be used afterwards.
    unsafe fn destroy(&self, instance: NonNull<T>);
}

/// Heap allocation through [`Box`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateUsingBox;

impl<T: Default + Send + Sync + 'static> CreationPolicy<T> for CreateUsingBox {
    const INIT: Self = CreateUsingBox;

    fn create(&self) -> Option<NonNull<T>> {
        Some(NonNull::from(Box::leak(Box::new(T::default()))))
    }

    unsafe fn destroy(&self, instance: NonNull<T>) {
        // SAFETY: the pointer came from Box::leak in create
        drop(unsafe { Box::from_raw(instance.as_ptr()) });
    }
}

/// Raw allocation through the global allocator, with manual construction and destruction.
///
/// Unlike [`CreateUsingBox`], an allocator failure does not abort: `create` returns `None`
/// and the accessor reports [`SingletonError::AllocationFailed`](crate::SingletonError::AllocationFailed).
///
/// ```
/// use policy_singleton::{singleton, Singleton};
/// use policy_singleton::creation::CreateUsingAlloc;
/// use policy_singleton::lifetime::DefaultLifetime;
/// use policy_singleton::threading::ClassLevelLockable;
///
/// singleton! {
///     struct Buffer: Vec<u8> = (CreateUsingAlloc, DefaultLifetime, ClassLevelLockable);
/// }
/// assert!(Buffer::instance().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateUsingAlloc;

impl<T: Default + Send + Sync + 'static> CreationPolicy<T> for CreateUsingAlloc {
    const INIT: Self = CreateUsingAlloc;

    fn create(&self) -> Option<NonNull<T>> {
        let layout = Layout::new::<T>();
        // construct first so a panicking default() leaves nothing allocated
        let value = T::default();
        let ptr = if layout.size() == 0 {
            NonNull::<T>::dangling()
        } else {
            // SAFETY: layout has non-zero size
            NonNull::new(unsafe { std::alloc::alloc(layout) }.cast::<T>())?
        };
        // SAFETY: ptr is valid for writes of T and properly aligned
        unsafe { ptr.as_ptr().write(value) };
        Some(ptr)
    }

    unsafe fn destroy(&self, instance: NonNull<T>) {
        let layout = Layout::new::<T>();
        // SAFETY: instance was written in create and is still live
        unsafe { std::ptr::drop_in_place(instance.as_ptr()) };
        if layout.size() != 0 {
            // SAFETY: allocated in create with this exact layout
            unsafe { std::alloc::dealloc(instance.as_ptr().cast(), layout) };
        }
    }
}

/// Reference-counted creation.
///
/// The policy keeps one strong [`Arc`] for the current epoch. [`destroy`](CreationPolicy::destroy)
/// drops that keeper rather than freeing memory directly, so a handle taken with
/// [`shared`](Self::shared) keeps the object alive past the end of the epoch.
///
/// ```
/// use policy_singleton::{singleton, Singleton};
/// use policy_singleton::creation::CreateUsingArc;
/// use policy_singleton::lifetime::Phoenix;
/// use policy_singleton::threading::ClassLevelLockable;
///
/// singleton! {
///     struct Settings: String = (CreateUsingArc<String>, Phoenix, ClassLevelLockable);
/// }
/// let instance = Settings::instance();
/// let handle = Settings::holder().shared().unwrap();
/// assert!(std::ptr::eq(instance, &*handle));
/// ```
#[derive(Debug)]
pub struct CreateUsingArc<T> {
    keeper: Mutex<Option<Arc<T>>>,
}

impl<T> CreateUsingArc<T> {
    /// Returns a new strong handle to the current instance, if one exists.
    pub fn shared(&self) -> Option<Arc<T>> {
        self.keeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Default + Send + Sync + 'static> CreationPolicy<T> for CreateUsingArc<T> {
    const INIT: Self = CreateUsingArc {
        keeper: Mutex::new(None),
    };

    fn create(&self) -> Option<NonNull<T>> {
        let arc = Arc::new(T::default());
        let ptr = NonNull::from(&*arc);
        *self.keeper.lock().unwrap_or_else(PoisonError::into_inner) = Some(arc);
        Some(ptr)
    }

    unsafe fn destroy(&self, _instance: NonNull<T>) {
        let released = self
            .keeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        //drop outside the keeper lock, T's Drop may be arbitrary
        drop(released);
    }
}

/// Creation policy used when a configuration does not name one.
pub type DefaultCreationPolicy = CreateUsingBox;
