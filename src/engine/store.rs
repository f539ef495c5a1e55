use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::core::domain::SystemConfig;
use crate::engine::pressure::PressureSample;
use crate::error::Result;

/// Timestamp format of the run statistics.
pub const TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Local wall-clock time, formatted for the store.
pub fn timestamp() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// System description written once when a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(rename = "Nx")]
    pub nx: usize,
    #[serde(rename = "Ny")]
    pub ny: usize,
    #[serde(rename = "N")]
    pub n: usize,
    pub eta: f64,
    #[serde(rename = "L")]
    pub box_size: [f64; 2],
    pub sigma: f64,
    pub slant: i64,
    pub shape: i32,
}

impl ParameterRecord {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            nx: config.params.disks_x,
            ny: config.params.disks_y,
            n: config.geometry.number_disks,
            eta: config.params.eta,
            box_size: config.geometry.box_size,
            sigma: config.geometry.sigma,
            slant: config.params.slant,
            shape: config.params.shape.code(),
        }
    }
}

/// Which snapshot a configuration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLabel {
    Initial,
    Interval(u64),
}

impl ConfigLabel {
    /// Dataset name: `config-init` or `config-<k>`.
    pub fn name(&self) -> String {
        match self {
            ConfigLabel::Initial => "config-init".to_string(),
            ConfigLabel::Interval(k) => format!("config-{k}"),
        }
    }

    /// Value stored under `count`; the initial snapshot counts as -1.
    pub fn count(&self) -> i64 {
        match self {
            ConfigLabel::Initial => -1,
            ConfigLabel::Interval(k) => *k as i64,
        }
    }
}

/// Statistics closing a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub start_time: String,
    pub end_time: String,
    pub collisions: u64,
    /// Estimated collisions per hour of wall-clock time.
    #[serde(rename = "EPH")]
    pub eph: f64,
}

/// Output sink of a run: configurations, pressure series and metadata.
///
/// Writes happen at interval boundaries only; an interrupted run leaves the
/// store as of its last write.
pub trait Store {
    /// Opens the run: parameters and start time.
    fn begin(&mut self, parameters: &ParameterRecord, start_time: &str) -> Result<()>;

    /// Writes absolute positions and overwrites `count` and the collision total.
    fn write_configuration(
        &mut self,
        label: ConfigLabel,
        positions: &[Point2<f64>],
        collisions: u64,
    ) -> Result<()>;

    /// Appends one entry to each pressure series.
    fn append_pressure(&mut self, sample: &PressureSample) -> Result<()>;

    /// Closes the run with its final statistics.
    fn finish(&mut self, stats: &RunStats) -> Result<()>;

    /// Returns the name of the backend (e.g., "directory").
    fn name(&self) -> &str;
}
