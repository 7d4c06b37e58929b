use crate::barrier::storage::LANES;
use crate::{CoreId, ThreadId};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    #[error("a team needs at least one thread on at least one core")]
    EmptyTeam,
    #[error("{total_threads} threads cannot be split evenly over {total_cores} cores")]
    UnevenSplit {
        total_threads: usize,
        total_cores: usize,
    },
    #[error("{threads_per_core} threads per core exceed the 8 byte lanes of a barrier word")]
    TooManyThreadsPerCore { threads_per_core: usize },
}

/// How a team of hardware threads maps onto physical cores.
///
/// Validated once up front; every participant works from the same copy, so
/// no barrier state is ever touched under a topology that was not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    total_threads: usize,
    total_cores: usize,
    threads_per_core: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAssignment {
    pub global_id: ThreadId,
    pub core_id: CoreId,
    pub local_id: usize,
}

impl Topology {
    pub fn resolve(total_threads: usize, total_cores: usize) -> Result<Self, TopologyError> {
        if total_threads == 0 || total_cores == 0 {
            return Err(TopologyError::EmptyTeam);
        }

        if total_threads % total_cores != 0 {
            return Err(TopologyError::UnevenSplit {
                total_threads,
                total_cores,
            });
        }

        let threads_per_core = total_threads / total_cores;
        if threads_per_core > LANES {
            return Err(TopologyError::TooManyThreadsPerCore { threads_per_core });
        }

        Ok(Self {
            total_threads,
            total_cores,
            threads_per_core,
        })
    }

    pub fn total_threads(&self) -> usize {
        self.total_threads
    }

    pub fn total_cores(&self) -> usize {
        self.total_cores
    }

    pub fn threads_per_core(&self) -> usize {
        self.threads_per_core
    }

    /// Core and core-local ids of one thread of the team.
    pub fn assign(&self, global_id: ThreadId) -> ThreadAssignment {
        assert!(global_id < self.total_threads);

        ThreadAssignment {
            global_id,
            core_id: global_id / self.threads_per_core,
            local_id: global_id % self.threads_per_core,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_empty_team() {
        assert_eq!(Topology::resolve(0, 1), Err(TopologyError::EmptyTeam));
        assert_eq!(Topology::resolve(4, 0), Err(TopologyError::EmptyTeam));
    }

    #[test]
    fn rejects_uneven_split() {
        assert_eq!(
            Topology::resolve(10, 3),
            Err(TopologyError::UnevenSplit {
                total_threads: 10,
                total_cores: 3
            })
        );
    }

    #[test]
    fn rejects_groups_beyond_lane_capacity() {
        assert_eq!(
            Topology::resolve(18, 1),
            Err(TopologyError::TooManyThreadsPerCore {
                threads_per_core: 18
            })
        );
        assert_eq!(
            Topology::resolve(32, 2),
            Err(TopologyError::TooManyThreadsPerCore {
                threads_per_core: 16
            })
        );
    }

    #[test]
    fn resolves_even_split() {
        let topology = Topology::resolve(16, 4).unwrap();

        assert_eq!(topology.total_threads(), 16);
        assert_eq!(topology.total_cores(), 4);
        assert_eq!(topology.threads_per_core(), 4);
    }

    #[test]
    fn accepts_full_lane_occupancy() {
        let topology = Topology::resolve(8, 1).unwrap();
        assert_eq!(topology.threads_per_core(), 8);
    }

    #[test]
    fn assigns_row_major_over_cores() {
        let topology = Topology::resolve(8, 2).unwrap();

        for global_id in 0..8 {
            let assignment = topology.assign(global_id);

            assert_eq!(assignment.global_id, global_id);
            assert_eq!(assignment.core_id, global_id / 4);
            assert_eq!(assignment.local_id, global_id % 4);
        }
    }

    #[test]
    #[should_panic]
    fn assign_checks_thread_range() {
        let topology = Topology::resolve(4, 2).unwrap();
        topology.assign(4);
    }
}
