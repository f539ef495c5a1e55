use straight_ecmc::core::domain::{Params, Schedule, Shape, SystemConfig};
use straight_ecmc::engine::external::directory::DirectoryStore;
use straight_ecmc::solvers::ecmc::{prepare_cells, StraightEcmc};
use std::time::Instant;
use anyhow::Result;

fn main() -> Result<()> {
    let params = Params {
        disks_x: 32,
        disks_y: 32,
        eta: 0.70,
        shape: Shape::Crystal,
        n_samples: 50,
        check_overlap: false,
        ..Default::default()
    };
    let config = SystemConfig::new(params)?;
    let chain = config.schedule.chain_length;
    let config = config.with_schedule(Schedule::new(chain * 2000.0, chain, 50));

    let output = std::env::temp_dir().join("straight-ecmc-benchmark");
    let cells = prepare_cells(&config, None)?;
    let store = DirectoryStore::create(&output)?;
    let mut sim = StraightEcmc::new(&config, cells, store);

    let start = Instant::now();
    let summary = sim.run()?;
    let duration = start.elapsed();

    println!(
        "{} chains, {} collisions in {:?} ({:.3e} events/hour)",
        summary.chains, summary.collisions, duration, summary.eph
    );
    Ok(())
}
