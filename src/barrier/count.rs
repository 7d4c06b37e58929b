use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::storage::CoreCounters;
use super::{spin_until, CoreWait};
use crate::topology::Topology;
use crate::{CoreId, ThreadId};

/// Count barrier over the threads of one core.
///
/// Each core owns one `CoreCounters` line; every round each thread adds its
/// increment to `arrive` and then to `depart`, spinning until the counter
/// reaches the round's target. The increment's sign flips every round, so
/// the counters oscillate between 0 and the group size and the barrier is
/// reusable with no reset phase. Unlike the flag barrier this costs a real
/// fetch-add per phase, but the accumulator has no lane-capacity ceiling.
#[derive(Clone)]
pub struct CountBarrier {
    topology: Topology,
    cores: Arc<Vec<CoreCounters>>,
}

impl CountBarrier {
    /// Allocates the per-core counter lines. Called once; clones of the
    /// returned value share the same storage.
    pub fn new(topology: Topology) -> Self {
        let cores = (0..topology.total_cores())
            .map(|_| CoreCounters::new())
            .collect();

        Self {
            topology,
            cores: Arc::new(cores),
        }
    }

    /// Hands out the per-thread barrier state for `global_id`; same
    /// exactly-once contract as [`super::FlagBarrier::waiter`].
    pub fn waiter(&self, global_id: ThreadId) -> CountWaiter {
        let assignment = self.topology.assign(global_id);

        CountWaiter {
            increment: 1,
            threads_per_core: self.topology.threads_per_core() as i64,
            core_id: assignment.core_id,
            cores: Arc::clone(&self.cores),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }
}

/// One thread's private count-barrier state.
pub struct CountWaiter {
    increment: i64,
    threads_per_core: i64,
    core_id: CoreId,
    cores: Arc<Vec<CoreCounters>>,
}

impl CountWaiter {
    /// One barrier round: add the increment to `arrive` and spin until the
    /// counter hits the round target (group size on +1 rounds, zero on -1
    /// rounds), do the same on `depart`, then negate the increment.
    ///
    /// The `depart` phase pins the counters until every peer has observed
    /// the `arrive` rendezvous, so the next round's additions can never
    /// reach a stale target early.
    pub fn wait(&mut self) {
        let increment = self.increment;
        let target = if increment == 1 {
            self.threads_per_core
        } else {
            0
        };
        let core = &self.cores[self.core_id];

        core.arrive.fetch_add(increment, Ordering::AcqRel);
        spin_until(|| core.arrive.load(Ordering::Acquire) == target);

        core.depart.fetch_add(increment, Ordering::AcqRel);
        spin_until(|| core.depart.load(Ordering::Acquire) == target);

        self.increment = -increment;
    }

    /// Current increment; negated on every completed round, so it is back
    /// to its initial sign after every second round.
    pub fn increment(&self) -> i64 {
        self.increment
    }
}

impl CoreWait for CountWaiter {
    #[inline]
    fn wait(&mut self) {
        CountWaiter::wait(self);
    }
}
