//! Run the default cavity without a renderer and log the photon and level
//! populations at a fixed interval.
//!
//! Usage: `RUST_LOG=info lasesim-headless [--seed N] [--report-every K] [--total-time T]`

use clap::Parser;
use lasesim::core::{EnergyLevel, LaserConfig, Simulation, Snapshot, SnapshotSink};

#[derive(Parser, Debug)]
#[command(name = "lasesim-headless")]
#[command(about = "Run the lasing cavity headless and log populations", long_about = None)]
struct Args {
    /// RNG seed; omit for an OS-seeded run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log populations every K ticks
    #[arg(
        short = 'k',
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    report_every: u64,

    /// Total simulated time
    #[arg(short, long, default_value_t = 100.0)]
    total_time: f64,
}

struct PopulationLog {
    every: u64,
    peak_photons: usize,
}

impl SnapshotSink for PopulationLog {
    fn on_tick(&mut self, snapshot: &Snapshot) {
        self.peak_photons = self.peak_photons.max(snapshot.photons.len());
        if snapshot.tick % self.every != 0 {
            return;
        }
        let count = |level: EnergyLevel| {
            snapshot
                .atoms
                .iter()
                .filter(|a| a.level == level)
                .count()
        };
        log::info!(
            "t={:8.3} photons={:5} E0={:4} E1={:4} E2={:4}",
            snapshot.time,
            snapshot.photons.len(),
            count(EnergyLevel::E0),
            count(EnergyLevel::E1),
            count(EnergyLevel::E2),
        );
    }
}

fn main() -> lasesim::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut sim = Simulation::new(LaserConfig {
        seed: args.seed,
        total_time: args.total_time,
        ..LaserConfig::default()
    })?;
    let sink = PopulationLog {
        every: args.report_every,
        peak_photons: sim.num_photons(),
    };
    let sink = sim.run(sink)?;
    log::info!("peak photon count: {}", sink.peak_photons);
    Ok(())
}
