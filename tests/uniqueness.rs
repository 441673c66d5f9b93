// ==============================================
// UNIQUENESS AND SINGLE CONSTRUCTION (integration)
// ==============================================
mod common;

use common::{Tracked, address, created, live, race};
use policy_singleton::creation::{CreateUsingAlloc, CreateUsingArc, CreateUsingBox};
use policy_singleton::lifetime::{DefaultLifetime, NoDestroy, Phoenix};
use policy_singleton::threading::{AtomicLockable, ClassLevelLockable, SingleThreaded};
use policy_singleton::{Singleton, singleton};

singleton! {
    struct Counter: Tracked<0> = (CreateUsingBox, DefaultLifetime, ClassLevelLockable);
    struct Lonely: Tracked<1> = (CreateUsingBox, DefaultLifetime, ClassLevelLockable);
    struct Spinning: Tracked<2> = (CreateUsingBox, DefaultLifetime, AtomicLockable);
    struct SpinningAlone: Tracked<8> = (CreateUsingBox, DefaultLifetime, AtomicLockable);
    struct Raw: Tracked<3> = (CreateUsingAlloc, DefaultLifetime, ClassLevelLockable);
    struct Shared: Tracked<4> = (CreateUsingArc<Tracked<4>>, Phoenix, ClassLevelLockable);
    struct Unlocked: Tracked<5> = (CreateUsingBox, DefaultLifetime, SingleThreaded);
    struct Locked: Tracked<6>;
    struct Forever: Tracked<6> = (CreateUsingBox, NoDestroy, AtomicLockable);
    struct Lazy: Tracked<7>;
}

fn assert_one_instance(addresses: &[usize]) {
    assert!(
        addresses.windows(2).all(|w| w[0] == w[1]),
        "threads observed different instances: {:?}",
        addresses
    );
}

#[test]
fn ten_threads_share_one_instance() {
    assert_eq!(live::<0>(), 0);
    let addresses = race(10, || address(Counter::instance()));
    assert_eq!(addresses.len(), 10);
    assert_one_instance(&addresses);
    assert_eq!(live::<0>(), 1);
    assert_eq!(created::<0>(), 1);
    assert_eq!(address(Counter::instance()), addresses[0]);
}

#[test]
fn one_thread_constructs_once() {
    let addresses = race(1, || address(Lonely::instance()));
    assert_eq!(live::<1>(), 1);
    assert_eq!(address(Lonely::instance()), addresses[0]);
    assert_eq!(created::<1>(), 1);
}

#[test]
fn spinlock_constructs_once() {
    let addresses = race(10, || address(Spinning::instance()));
    assert_one_instance(&addresses);
    assert_eq!(live::<2>(), 1);
    assert_eq!(created::<2>(), 1);
}

#[test]
fn spinlock_constructs_once_on_one_thread() {
    let addresses = race(1, || address(SpinningAlone::instance()));
    assert_eq!(live::<8>(), 1);
    assert_eq!(created::<8>(), 1);
    assert_eq!(address(SpinningAlone::instance()), addresses[0]);
}

#[test]
fn raw_allocation_constructs_once() {
    let addresses = race(10, || address(Raw::instance()));
    assert_one_instance(&addresses);
    assert_eq!(live::<3>(), 1);
    assert_eq!(created::<3>(), 1);
}

#[test]
fn shared_ownership_constructs_once() {
    let addresses = race(10, || address(Shared::instance()));
    assert_one_instance(&addresses);
    assert_eq!(live::<4>(), 1);
    assert_eq!(created::<4>(), 1);
}

#[test]
fn single_threaded_calls_return_the_same_instance() {
    let first = Unlocked::instance();
    let second = Unlocked::instance();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.id, second.id);
    assert_eq!(live::<5>(), 1);
}

#[test]
fn configurations_over_one_type_are_independent() {
    let locked = Locked::instance();
    let forever = Forever::instance();
    assert!(!std::ptr::eq(locked, forever));
    assert_ne!(locked.id, forever.id);
    assert_eq!(live::<6>(), 2);
    assert!(std::ptr::eq(Locked::instance(), locked));
    assert!(std::ptr::eq(Forever::instance(), forever));
}

#[test]
fn nothing_is_constructed_before_first_access() {
    assert!(Lazy::peek().is_none());
    assert!(!Lazy::is_destroyed());
    assert_eq!(created::<7>(), 0);

    let instance = Lazy::instance();
    assert_eq!(created::<7>(), 1);
    assert_eq!(instance.id, 1);
    assert!(std::ptr::eq(Lazy::peek().unwrap(), instance));
}
