pub mod count;
pub mod flag;
pub mod storage;

pub use count::{CountBarrier, CountWaiter};
pub use flag::{FlagBarrier, FlagWaiter};

/// A reusable core-local rendezvous point.
///
/// `wait` returns once every thread of the caller's core group has called it
/// for the current round; all writes a participant issued before its call are
/// visible to every participant after its own return. Liveness is a caller
/// precondition: each declared participant must call `wait` exactly once per
/// round, or the remaining callers spin forever.
pub trait CoreWait {
    fn wait(&mut self);
}

/// Busy-wait until `done` holds, yielding the pipeline between polls.
#[inline]
pub(crate) fn spin_until(done: impl Fn() -> bool) {
    while !done() {
        std::hint::spin_loop();
    }
}
