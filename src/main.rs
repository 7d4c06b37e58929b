use crossbeam::atomic::AtomicCell;
use itertools::Itertools;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use rust_corebar::barrier::{CoreWait, CountBarrier, CountWaiter, FlagBarrier, FlagWaiter};
use rust_corebar::parameters::{get_and_check_options, BarrierKind};
use rust_corebar::topology::Topology;
use rust_corebar::ThreadId;

trait Master: Sync + Send {
    const LABEL: &'static str;
    fn new(topology: Topology) -> Self;

    type Local: CoreWait + Send + 'static;
    fn waiter(&self, rank: ThreadId) -> Self::Local;
}

fn run_team<W>(topology: Topology, rounds: u64)
where
    W: Master,
{
    let master = W::new(topology);
    let rendezvous = Arc::new(Barrier::new(topology.total_threads()));
    let runtime_ns = Arc::new(AtomicCell::new(0_u128));

    let handles = (0..topology.total_threads())
        .map(|rank| {
            let rendezvous = rendezvous.clone();
            let mut waiter = master.waiter(rank);
            let runtime_ns = runtime_ns.clone();

            thread::spawn(move || {
                rendezvous.wait();

                let start = Instant::now();
                for _ in 0..rounds {
                    waiter.wait();
                }
                let duration = start.elapsed();

                runtime_ns.fetch_add(duration.as_nanos());
            })
        })
        .collect_vec();

    for h in handles {
        h.join().unwrap();
    }

    println!(
        "{:<12},{:>3},{:>3},{:>6}",
        W::LABEL,
        topology.total_threads(),
        topology.total_cores(),
        runtime_ns.load() / topology.total_threads() as u128 / rounds as u128
    );
}

struct StdBarrier {
    barrier: Arc<Barrier>,
}

impl Master for StdBarrier {
    const LABEL: &'static str = "StdBarrier";
    type Local = StdWaiter;

    fn new(topology: Topology) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(topology.total_threads())),
        }
    }

    fn waiter(&self, _rank: ThreadId) -> StdWaiter {
        StdWaiter(self.barrier.clone())
    }
}

struct StdWaiter(Arc<Barrier>);

impl CoreWait for StdWaiter {
    fn wait(&mut self) {
        self.0.wait();
    }
}

struct HurdlesBarrier {
    barrier: hurdles::Barrier,
}

impl Master for HurdlesBarrier {
    const LABEL: &'static str = "Hurdles";
    type Local = HurdlesWaiter;

    fn new(topology: Topology) -> Self {
        Self {
            barrier: hurdles::Barrier::new(topology.total_threads()),
        }
    }

    fn waiter(&self, _rank: ThreadId) -> HurdlesWaiter {
        HurdlesWaiter(self.barrier.clone())
    }
}

struct HurdlesWaiter(hurdles::Barrier);

impl CoreWait for HurdlesWaiter {
    fn wait(&mut self) {
        self.0.wait();
    }
}

struct CoreFlagBarrier {
    barrier: FlagBarrier,
}

impl Master for CoreFlagBarrier {
    const LABEL: &'static str = "FlagBarrier";
    type Local = FlagWaiter;

    fn new(topology: Topology) -> Self {
        Self {
            barrier: FlagBarrier::new(topology),
        }
    }

    fn waiter(&self, rank: ThreadId) -> FlagWaiter {
        self.barrier.waiter(rank)
    }
}

struct CoreCountBarrier {
    barrier: CountBarrier,
}

impl Master for CoreCountBarrier {
    const LABEL: &'static str = "CountBarrier";
    type Local = CountWaiter;

    fn new(topology: Topology) -> Self {
        Self {
            barrier: CountBarrier::new(topology),
        }
    }

    fn waiter(&self, rank: ThreadId) -> CountWaiter {
        self.barrier.waiter(rank)
    }
}

fn main() {
    let opt = get_and_check_options();

    let topology = match Topology::resolve(opt.threads.unwrap(), opt.cores.unwrap()) {
        Ok(topology) => topology,
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    };

    for _ in 0..opt.repeats {
        if matches!(opt.kind, BarrierKind::Std | BarrierKind::All) {
            run_team::<StdBarrier>(topology, opt.rounds);
        }
        if matches!(opt.kind, BarrierKind::Hurdles | BarrierKind::All) {
            run_team::<HurdlesBarrier>(topology, opt.rounds);
        }
        if matches!(opt.kind, BarrierKind::Flag | BarrierKind::All) {
            run_team::<CoreFlagBarrier>(topology, opt.rounds);
        }
        if matches!(opt.kind, BarrierKind::Count | BarrierKind::All) {
            run_team::<CoreCountBarrier>(topology, opt.rounds);
        }
    }
}
