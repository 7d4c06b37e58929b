use std::sync::Arc;

use super::storage::{CoreFlags, LaneWord};
use super::{spin_until, CoreWait};
use crate::topology::Topology;
use crate::{CoreId, ThreadId};

/// Sense-reversing byte barrier over the threads of one core.
///
/// Each core owns one `CoreFlags` line with an `arrive` and a `depart` word;
/// each thread of the core owns one byte lane in both words. Arrival and
/// departure are plain one-byte stores, and completion is a whole-word load
/// compared against the packed group value, so a round costs no atomic
/// read-modify-write at all. Capacity is the eight byte lanes of a word,
/// enforced by [`Topology::resolve`].
#[derive(Clone)]
pub struct FlagBarrier {
    topology: Topology,
    cores: Arc<Vec<CoreFlags>>,
}

impl FlagBarrier {
    /// Allocates the per-core flag lines. Called once; clones of the
    /// returned value share the same storage.
    pub fn new(topology: Topology) -> Self {
        let cores = (0..topology.total_cores()).map(|_| CoreFlags::new()).collect();

        Self {
            topology,
            cores: Arc::new(cores),
        }
    }

    /// Hands out the per-thread barrier state for `global_id`.
    ///
    /// Must be called exactly once per thread of the team, before that
    /// thread's first round; the waiter is then moved onto the thread.
    pub fn waiter(&self, global_id: ThreadId) -> FlagWaiter {
        let assignment = self.topology.assign(global_id);

        FlagWaiter {
            sense: 1,
            lane: assignment.local_id,
            group: LaneWord::packed(self.topology.threads_per_core(), 1),
            core_id: assignment.core_id,
            cores: Arc::clone(&self.cores),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }
}

/// One thread's private flag-barrier state: its sense bit, its lane, and the
/// packed word value the group's lanes produce when everyone holds sense 1.
pub struct FlagWaiter {
    sense: u8,
    lane: usize,
    group: u64,
    core_id: CoreId,
    cores: Arc<Vec<CoreFlags>>,
}

impl FlagWaiter {
    /// One barrier round: publish arrival, spin until the whole group
    /// arrived, publish departure, spin until the whole group departed,
    /// then flip the sense for the next round.
    ///
    /// The departure phase keeps a fast thread from re-entering and
    /// overwriting a word a slow peer is still reading; a word is only
    /// reused once every reader has seen the value it was spinning on.
    pub fn wait(&mut self) {
        let sense = self.sense;
        let target = if sense == 1 { self.group } else { 0 };
        let core = &self.cores[self.core_id];

        core.arrive.set_lane(self.lane, sense);
        spin_until(|| core.arrive.load() == target);

        core.depart.set_lane(self.lane, sense);
        spin_until(|| core.depart.load() == target);

        self.sense = 1 - sense;
    }

    /// Current sense bit; flips on every completed round, so it is back to
    /// its initial value after every second round.
    pub fn sense(&self) -> u8 {
        self.sense
    }
}

impl CoreWait for FlagWaiter {
    #[inline]
    fn wait(&mut self) {
        FlagWaiter::wait(self);
    }
}
