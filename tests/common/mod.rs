#![allow(dead_code)]

use nalgebra::Point2;
use straight_ecmc::core::domain::{Params, Schedule, Shape, SystemConfig};
use straight_ecmc::engine::pressure::PressureSample;
use straight_ecmc::engine::store::{ConfigLabel, ParameterRecord, RunStats, Store};
use straight_ecmc::error::Result;

/// Keeps everything a run writes in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub parameters: Option<ParameterRecord>,
    pub start_time: Option<String>,
    pub configurations: Vec<(ConfigLabel, Vec<Point2<f64>>)>,
    pub count: Option<i64>,
    pub collisions: u64,
    pub pressure: Vec<PressureSample>,
    pub stats: Option<RunStats>,
}

impl Store for MemoryStore {
    fn begin(&mut self, parameters: &ParameterRecord, start_time: &str) -> Result<()> {
        self.parameters = Some(parameters.clone());
        self.start_time = Some(start_time.to_string());
        Ok(())
    }

    fn write_configuration(
        &mut self,
        label: ConfigLabel,
        positions: &[Point2<f64>],
        collisions: u64,
    ) -> Result<()> {
        self.configurations.push((label, positions.to_vec()));
        self.count = Some(label.count());
        self.collisions = collisions;
        Ok(())
    }

    fn append_pressure(&mut self, sample: &PressureSample) -> Result<()> {
        self.pressure.push(*sample);
        Ok(())
    }

    fn finish(&mut self, stats: &RunStats) -> Result<()> {
        self.stats = Some(stats.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "Memory Store"
    }
}

/// 8 × 8 crystal at moderate density with a run of `chains + 0.5` chains of the
/// standard length, split into `samples` intervals.
pub fn small_crystal(chains: f64, samples: usize) -> SystemConfig {
    let params = Params {
        disks_x: 8,
        disks_y: 8,
        eta: 0.6,
        shape: Shape::Crystal,
        n_samples: samples,
        ..Default::default()
    };
    let config = SystemConfig::new(params).expect("valid parameters");
    let chain = config.schedule.chain_length;
    config.with_schedule(Schedule::new(chain * (chains + 0.5), chain, samples))
}

/// The 4-disk square system with chains of length `chain`.
pub fn four_disks(chains: usize, chain: f64) -> SystemConfig {
    let params = Params {
        disks_x: 2,
        disks_y: 2,
        eta: 0.5,
        slant: 0,
        shape: Shape::Square,
        n_samples: 1,
        ..Default::default()
    };
    SystemConfig::new(params)
        .expect("valid parameters")
        .with_schedule(Schedule::new(chain * chains as f64, chain, 1))
}
