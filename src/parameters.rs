use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "core_local_barriers",
    about = "Benchmarks core-local spin barriers against team-wide baselines"
)]
pub struct Parameters {
    /// Barrier implementation to time (flag, count, std, hurdles, all).
    #[structopt(short = "k", long, default_value = "all")]
    pub kind: BarrierKind,

    /// Number of physical cores the team is split over.
    #[structopt(short = "c", long)]
    pub cores: Option<usize>,

    /// Total number of hardware threads.
    #[structopt(short = "t", long)]
    pub threads: Option<usize>,

    /// Barrier rounds per timed run.
    #[structopt(short = "r", long, default_value = "1000000")]
    pub rounds: u64,

    /// Timed runs per barrier kind.
    #[structopt(short = "p", long, default_value = "10")]
    pub repeats: usize,
}

#[derive(Eq, Clone, Copy, PartialEq, Debug)]
pub enum BarrierKind {
    Flag,
    Count,
    Std,
    Hurdles,
    All,
}

impl FromStr for BarrierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flag" => Ok(BarrierKind::Flag),
            "count" => Ok(BarrierKind::Count),
            "std" => Ok(BarrierKind::Std),
            "hurdles" => Ok(BarrierKind::Hurdles),
            "all" => Ok(BarrierKind::All),
            _ => Err(format!("Unknown barrier kind: {}", s)),
        }
    }
}

pub fn get_and_check_options() -> Parameters {
    let mut opt = Parameters::from_args();

    if opt.threads.is_none() {
        opt.threads = Some(num_cpus::get());
    }
    if opt.cores.is_none() {
        opt.cores = Some(num_cpus::get_physical().min(opt.threads.unwrap()));
    }

    assert!(opt.rounds > 0);
    assert!(opt.repeats > 0);

    opt
}
