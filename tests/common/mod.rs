#![allow(dead_code)]

use std::cell::Cell;

// Per-thread, so tests running in parallel don't see each other's values.
thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static CLONES_LEFT: Cell<usize> = const { Cell::new(usize::MAX) };
    static DEFAULTS_LEFT: Cell<usize> = const { Cell::new(usize::MAX) };
}

/// Number of [`Tracked`] values alive on this thread.
pub fn live() -> isize {
    LIVE.with(Cell::get)
}

/// Let `n` more clones succeed, then panic on the next one.
pub fn fail_clone_after(n: usize) {
    CLONES_LEFT.with(|left| left.set(n));
}

/// Let `n` more default constructions succeed, then panic on the next one.
pub fn fail_default_after(n: usize) {
    DEFAULTS_LEFT.with(|left| left.set(n));
}

pub fn stop_failing() {
    CLONES_LEFT.with(|left| left.set(usize::MAX));
    DEFAULTS_LEFT.with(|left| left.set(usize::MAX));
}

fn spend(budget: &'static std::thread::LocalKey<Cell<usize>>, what: &str) {
    budget.with(|left| match left.get() {
        0 => panic!("{what} failed"),
        n => left.set(n - 1),
    })
}

/// An `i32` that counts its live instances and can be told to fail.
#[derive(Debug, PartialEq, Eq)]
pub struct Tracked(i32);

impl Tracked {
    pub fn new(value: i32) -> Self {
        LIVE.with(|live| live.set(live.get() + 1));
        Tracked(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        spend(&CLONES_LEFT, "clone");
        Tracked::new(self.0)
    }
}

impl Default for Tracked {
    fn default() -> Self {
        spend(&DEFAULTS_LEFT, "default");
        Tracked::new(0)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

pub fn values(items: &[Tracked]) -> Vec<i32> {
    items.iter().map(Tracked::get).collect()
}

/// Panics when dropped, if armed.
#[derive(Debug)]
pub struct Bomb {
    pub payload: Tracked,
    pub armed: bool,
}

impl Bomb {
    pub fn new(value: i32, armed: bool) -> Self {
        Bomb {
            payload: Tracked::new(value),
            armed,
        }
    }
}

impl Drop for Bomb {
    fn drop(&mut self) {
        if self.armed {
            panic!("boom {}", self.payload.get())
        }
    }
}
