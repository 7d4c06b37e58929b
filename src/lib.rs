pub mod barrier;
pub mod parameters;
pub mod topology;

pub type ThreadId = usize;
pub type CoreId = usize;

pub mod prelude {
    use super::*;

    pub use super::{CoreId, ThreadId};
    pub use barrier::count::CountBarrier;
    pub use barrier::flag::FlagBarrier;
    pub use barrier::CoreWait;
    pub use topology::Topology;
}
