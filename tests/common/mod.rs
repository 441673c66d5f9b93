#![allow(dead_code)]

use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const SLOTS: usize = 64;

static LIVE: [AtomicIsize; SLOTS] = [const { AtomicIsize::new(0) }; SLOTS];
static CREATED: [AtomicUsize; SLOTS] = [const { AtomicUsize::new(0) }; SLOTS];

/// Counts its own constructions and destructions. Each test uses a distinct `N`.
#[derive(Debug)]
pub struct Tracked<const N: usize> {
    pub id: usize,
}

impl<const N: usize> Default for Tracked<N> {
    fn default() -> Self {
        // widen the window in which racing threads can observe an empty slot
        thread::sleep(Duration::from_millis(5));
        LIVE[N].fetch_add(1, Ordering::SeqCst);
        Tracked {
            id: CREATED[N].fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

impl<const N: usize> Drop for Tracked<N> {
    fn drop(&mut self) {
        LIVE[N].fetch_sub(1, Ordering::SeqCst);
    }
}

/// Instances of `Tracked<N>` currently alive.
pub fn live<const N: usize>() -> isize {
    LIVE[N].load(Ordering::SeqCst)
}

/// Instances of `Tracked<N>` ever constructed.
pub fn created<const N: usize>() -> usize {
    CREATED[N].load(Ordering::SeqCst)
}

pub fn address<T>(instance: &T) -> usize {
    instance as *const T as usize
}

/// Releases `threads` threads at once, each running `f`, and collects the results.
pub fn race<F>(threads: usize, f: F) -> Vec<usize>
where
    F: Fn() -> usize + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(threads));
    let f = Arc::new(f);
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = barrier.clone();
            let f = f.clone();
            thread::spawn(move || {
                barrier.wait();
                f()
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}
