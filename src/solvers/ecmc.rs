use std::time::Instant;

use log::{debug, error, info};
use nalgebra::Point2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::cells::CellList;
use crate::core::domain::{Axis, Geometry, Schedule, SystemConfig};
use crate::core::{packing, spatial};
use crate::engine::pressure::PressureAccumulator;
use crate::engine::scanner::CollisionScanner;
use crate::engine::store::{self, ConfigLabel, ParameterRecord, RunStats, Store};
use crate::error::{EcmcError, Result};
use crate::solvers::{IntervalReport, RunSummary};

/// Builds the starting cell list from a loaded configuration, or from the
/// generated lattice when `loaded` is `None`.
///
/// An overlapping start is reported but tolerated; packings close to the
/// threshold trip the check through rounding alone. A genuinely overlapping
/// start can trap a chain in zero-length hand-offs, which the run reports as
/// [`EcmcError::Stalled`].
pub fn prepare_cells(config: &SystemConfig, loaded: Option<Vec<Point2<f64>>>) -> Result<CellList> {
    let geometry = &config.geometry;
    let positions = match loaded {
        Some(p) => {
            info!("Detected initial configuration");
            p
        }
        None => {
            info!("Start a fresh run with generated initial configuration");
            packing::generate(
                geometry,
                config.params.shape,
                config.params.disks_x,
                config.params.disks_y,
                config.params.slant,
            )
        }
    };

    if config.params.check_overlap {
        if let Some((i, j)) = spatial::find_overlap(&positions, &geometry.box_size, geometry.sigma) {
            error!(
                "Overlap in initial configuration! (disks {} and {}); the run may stall",
                j, i
            );
        }
    }

    let mut cells = CellList::from_geometry(geometry);
    cells.populate(&positions)?;
    Ok(cells)
}

/// Consecutive zero-length hand-offs allowed per disk before a chain counts as stalled.
const IDLE_HANDOFFS_PER_DISK: usize = 100;

/// Straight event-chain Monte Carlo with a single active disk.
///
/// The run is a sequence of chains. Each chain resamples the active disk
/// uniformly, moves it forward along one axis (x and y strictly alternate) for a
/// fixed length, and hands the motion over to every disk it hits. Every
/// `chains_per_interval` chains close an interval: the pressure is estimated from
/// the interval's contact sums and a snapshot is stored.
pub struct StraightEcmc<S: Store> {
    geometry: Geometry,
    schedule: Schedule,
    parameters: ParameterRecord,
    cells: CellList,
    scanner: CollisionScanner,
    store: S,
    rng: ChaCha8Rng,
    accumulator: PressureAccumulator,
    relative_volume: f64,

    // Run State
    next_axis: Axis,
    remaining: f64,
    chains_in_interval: u64,
    chains: u64,
    intervals: u64,
    collisions: u64,
    start: Option<(Instant, String)>,
}

impl<S: Store> StraightEcmc<S> {
    pub fn new(config: &SystemConfig, cells: CellList, store: S) -> Self {
        Self {
            geometry: config.geometry,
            schedule: config.schedule,
            parameters: ParameterRecord::new(config),
            cells,
            scanner: CollisionScanner::from_geometry(&config.geometry),
            store,
            rng: ChaCha8Rng::seed_from_u64(config.params.seed),
            accumulator: PressureAccumulator::default(),
            relative_volume: config.geometry.relative_volume(),
            next_axis: Axis::X,
            remaining: config.schedule.total_length,
            chains_in_interval: 0,
            chains: 0,
            intervals: 0,
            collisions: 0,
            start: None,
        }
    }

    // --- Accessors ---

    pub fn cells(&self) -> &CellList {
        &self.cells
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn chains(&self) -> u64 {
        self.chains
    }

    pub fn intervals(&self) -> u64 {
        self.intervals
    }

    /// Run-length budget not yet assigned to a chain.
    pub fn remaining_length(&self) -> f64 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Runs every chain of the budget and closes the store.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.start()?;
        let mut last_interval = None;
        while !self.is_finished() {
            if let Some(report) = self.run_chain()? {
                last_interval = Some(report);
            }
        }
        self.finish(last_interval)
    }

    /// Opens the store and writes the initial snapshot. Idempotent.
    pub fn start(&mut self) -> Result<()> {
        if self.start.is_some() {
            return Ok(());
        }
        info!("V/V_0: {:.11}", self.relative_volume);
        info!("total chain length {:.11}", self.schedule.total_length);
        info!("chain length {:.11}", self.schedule.chain_length);
        info!(
            "{} chains per interval, {} samples",
            self.schedule.chains_per_interval, self.schedule.n_samples
        );

        let start_time = store::timestamp();
        self.store.begin(&self.parameters, &start_time)?;
        self.store.write_configuration(
            ConfigLabel::Initial,
            &self.cells.absolute_positions(),
            self.collisions,
        )?;
        self.start = Some((Instant::now(), start_time));
        Ok(())
    }

    /// Runs one chain and, when it completes an interval, emits that interval.
    pub fn run_chain(&mut self) -> Result<Option<IntervalReport>> {
        self.start()?;

        let axis = self.next_axis;
        self.next_axis = axis.transverse();
        let distance = self.schedule.chain_length.min(self.remaining);

        self.cells.choose_active(&mut self.rng);
        self.accumulator.add_length(axis, distance);
        self.sweep(axis, distance)?;

        self.chains += 1;
        self.chains_in_interval += 1;
        let report = if self.chains_in_interval >= self.schedule.chains_per_interval {
            Some(self.end_interval()?)
        } else {
            None
        };
        self.remaining -= self.schedule.chain_length;
        Ok(report)
    }

    /// Moves the active disk by `distance` along `axis`, resolving collisions.
    fn sweep(&mut self, axis: Axis, mut distance_to_go: f64) -> Result<()> {
        let a = axis.index();
        let max_step = self.geometry.max_step();
        let idle_limit = IDLE_HANDOFFS_PER_DISK * self.geometry.number_disks;
        let mut idle = 0;

        loop {
            let active = self.cells.active();
            let scan = self.scanner.scan(&self.cells, axis, active, distance_to_go);
            let first_event = scan.distance.max(0.0);
            let step = first_event.min(distance_to_go).min(max_step);
            let coordinate = self.cells.position(active)[a] + step;
            let vacancy = self.cells.advance(axis, coordinate)?;

            if max_step < first_event.min(distance_to_go) {
                // Limited by the search range: same disk keeps going.
                distance_to_go -= max_step;
                continue;
            }

            match scan.contact {
                Some(contact) if first_event < distance_to_go => {
                    // The struck disk lies ahead, so a migrating disk never hits its
                    // own source cell and the contact reference stays valid.
                    debug_assert!(vacancy.map_or(true, |v| v.cell != contact.disk.cell));
                    if first_event > 0.0 {
                        idle = 0;
                    } else {
                        idle += 1;
                        if idle > idle_limit {
                            return Err(EcmcError::Stalled { handoffs: idle });
                        }
                    }
                    self.accumulator.add_contact(axis, contact.delta);
                    distance_to_go -= first_event;
                    self.cells.set_active(contact.disk);
                    self.collisions += 1;
                }
                _ => return Ok(()),
            }
        }
    }

    fn end_interval(&mut self) -> Result<IntervalReport> {
        let pressure = self.accumulator.estimate(self.relative_volume);
        let interval = self.intervals;

        self.store.append_pressure(&pressure)?;
        self.store.write_configuration(
            ConfigLabel::Interval(interval),
            &self.cells.absolute_positions(),
            self.collisions,
        )?;

        self.accumulator.reset();
        self.chains_in_interval = 0;
        self.intervals += 1;

        let report = IntervalReport {
            interval,
            chains: self.chains,
            collisions: self.collisions,
            pressure,
        };
        debug!(
            "interval {}: pressure {:.6} (x {:.6}, y {:.6}), {} collisions",
            interval, pressure.pressure, pressure.pressure_x, pressure.pressure_y, self.collisions
        );
        if (interval + 1) % progress_stride(self.schedule.n_samples) == 0 {
            info!(
                "sample {}/{}: pressure {:.6}",
                interval + 1,
                self.schedule.n_samples,
                pressure.pressure
            );
        }
        Ok(report)
    }

    /// Writes the closing statistics.
    fn finish(&mut self, last_interval: Option<IntervalReport>) -> Result<RunSummary> {
        let (started, start_time) = match self.start.take() {
            Some(s) => s,
            None => (Instant::now(), store::timestamp()),
        };
        let elapsed = started.elapsed();
        let seconds = elapsed.as_secs_f64();
        let eph = if seconds > 0.0 {
            self.collisions as f64 / seconds * 3600.0
        } else {
            0.0
        };

        self.store.finish(&RunStats {
            start_time,
            end_time: store::timestamp(),
            collisions: self.collisions,
            eph,
        })?;

        info!("{} collisions, {:.5} seconds", self.collisions, seconds);
        info!("Estimated number of events per hour: {:.5e}", eph);

        Ok(RunSummary {
            chains: self.chains,
            intervals: self.intervals,
            collisions: self.collisions,
            elapsed,
            eph,
            last_interval,
        })
    }
}

/// Log roughly ten progress lines per run.
fn progress_stride(n_samples: usize) -> u64 {
    (n_samples as u64 / 10).max(1)
}
