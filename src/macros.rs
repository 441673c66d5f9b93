/// Declares one or more singleton configurations.
///
/// Each declaration creates a unit struct implementing [`Singleton`](crate::Singleton)
/// backed by its own `static` [`Holder`](crate::Holder). The policies are optional; when
/// omitted, the defaults are [`CreateUsingBox`](crate::creation::CreateUsingBox),
/// [`DefaultLifetime`](crate::lifetime::DefaultLifetime) and
/// [`ClassLevelLockable`](crate::threading::ClassLevelLockable).
///
/// The managed type must implement `Default + Send + Sync`; anything else is rejected at
/// compile time.
///
/// ```
/// use policy_singleton::{singleton, Singleton};
/// use policy_singleton::creation::CreateUsingBox;
/// use policy_singleton::lifetime::NoDestroy;
/// use policy_singleton::threading::SingleThreaded;
///
/// singleton! {
///     /// Shared with every thread, torn down at exit.
///     pub struct Names: Vec<String>;
///     /// Same type, but a separate instance that lives forever.
///     pub struct PersistentNames: Vec<String> = (CreateUsingBox, NoDestroy, SingleThreaded);
/// }
///
/// assert!(!std::ptr::eq(Names::instance(), PersistentNames::instance()));
/// ```
#[macro_export]
macro_rules! singleton {
    () => {};
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $ty:ty = ($creation:ty, $lifetime:ty, $threading:ty $(,)?);
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::Singleton for $name {
            type Instance = $ty;
            type Creation = $creation;
            type Lifetime = $lifetime;
            type Threading = $threading;

            fn holder() -> &'static $crate::Holder<$ty, $creation, $lifetime, $threading> {
                static HOLDER: $crate::Holder<$ty, $creation, $lifetime, $threading> =
                    $crate::Holder::new();
                &HOLDER
            }
        }

        $crate::singleton!($($rest)*);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $ty:ty;
        $($rest:tt)*
    ) => {
        $crate::singleton! {
            $(#[$meta])*
            $vis struct $name: $ty = (
                $crate::creation::DefaultCreationPolicy,
                $crate::lifetime::DefaultLifetimePolicy,
                $crate::threading::DefaultThreadingModel
            );
            $($rest)*
        }
    };
}
