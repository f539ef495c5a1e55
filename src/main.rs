use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use straight_ecmc::core::domain::SystemConfig;
use straight_ecmc::engine::external::directory::{self, DirectoryStore};
use straight_ecmc::engine::store::Store;
use straight_ecmc::interface::cli::Cli;
use straight_ecmc::interface::logging;
use straight_ecmc::solvers::ecmc::{prepare_cells, StraightEcmc};

// --- Main ---

fn main() -> Result<()> {
    // 1. Parsing: bad arguments end the process quietly, before any output exists.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(());
        }
    };
    logging::setup_logging(cli.verbose, cli.quiet);

    // 2. Configuration
    let config = match SystemConfig::new(cli.params()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };
    let g = &config.geometry;
    info!("Number of disks = {}", g.number_disks);
    info!("Radius = {:.11}", g.sigma);
    info!("Box size = [{:.11}, {:.11}]", g.box_size[0], g.box_size[1]);
    info!("Number of cells = {}, {}", g.cells[0], g.cells[1]);

    // 3. Initial State
    let loaded = directory::read_configuration(&config.params.input, g.number_disks, &g.box_size)
        .context("Failed to read the initial configuration")?;
    let cells = prepare_cells(&config, loaded).context("Failed to build the cell system")?;

    // 4. Output Store
    let store = DirectoryStore::create(&config.params.output).with_context(|| {
        format!(
            "Failed to create the run store at {}",
            config.params.output.display()
        )
    })?;
    info!("Run store: {} at {}", store.name(), store.root().display());

    // 5. Run
    let mut sim = StraightEcmc::new(&config, cells, store);
    let summary = sim.run().context("Simulation failed")?;
    info!(
        "Finished: {} chains, {} samples, {} collisions",
        summary.chains, summary.intervals, summary.collisions
    );
    if let Some(last) = summary.last_interval {
        info!(
            "Final sample {}: pressure {:.6} (x {:.6}, y {:.6})",
            last.interval, last.pressure.pressure, last.pressure.pressure_x, last.pressure.pressure_y
        );
    }

    Ok(())
}
