use std::f64::consts::PI;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{EcmcError, Result};

// --- Constants ---

/// Base run length in units of the mean free path; scaled by `Params::extra_factor`.
/// 200000000 is roughly 20 s on a laptop.
pub const RUN_FACTOR: f64 = 200_000_000.0;

/// Default number of sampled configurations over the whole run.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Default maximum number of disks in one cell.
pub const DEFAULT_CELL_CAPACITY: usize = 5;

/// Safety margin above contact distance for the packed square/rectangle lattices.
pub const LATTICE_MARGIN: f64 = 1.00001;

const MEAN_FREE_PATH_SCALE: f64 = 0.07680;
const CHAIN_LENGTH_SCALE: f64 = 3.125;
const CELLS_PER_DISK_ROW: f64 = 7.0 / 8.0;

// --- Geometry Types ---

/// Box shape; decides the aspect ratio, the cell grid and the generated lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Aspect ratio that fits a perfect triangular crystal of Nx × Ny disks.
    Crystal,
    Square,
    /// Aspect ratio 1 : √3/2.
    Rectangle,
}

impl Shape {
    /// Integer code written to the run store.
    pub fn code(self) -> i32 {
        match self {
            Shape::Crystal => 0,
            Shape::Square => 1,
            Shape::Rectangle => 2,
        }
    }
}

/// Travel axis of a chain. Chains only ever move forward along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    #[inline(always)]
    pub fn transverse(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

// --- Configuration Types ---

/// User-supplied run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Disks per lattice row.
    pub disks_x: usize,
    /// Number of lattice rows (even, for periodic compatibility).
    pub disks_y: usize,
    /// Packing fraction.
    pub eta: f64,
    /// Lattice shear of the generated crystal; must be even.
    pub slant: i64,
    /// Multiplier of the base run length.
    pub extra_factor: u64,
    pub shape: Shape,
    pub seed: u64,
    pub n_samples: usize,
    pub cell_capacity: usize,
    /// O(N²) startup overlap check; worth disabling for large systems.
    pub check_overlap: bool,
    pub output: PathBuf,
    pub input: PathBuf,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            disks_x: 8,
            disks_y: 8,
            eta: 0.70,
            slant: 0,
            extra_factor: 1,
            shape: Shape::Crystal,
            seed: 0,
            n_samples: DEFAULT_SAMPLES,
            cell_capacity: DEFAULT_CELL_CAPACITY,
            check_overlap: true,
            output: PathBuf::from("output"),
            input: PathBuf::from("dummy"),
        }
    }
}

impl Params {
    pub fn number_disks(&self) -> usize {
        self.disks_x * self.disks_y
    }

    fn validate(&self) -> Result<()> {
        if self.disks_x == 0 {
            return Err(EcmcError::InvalidParam("disks per row must be > 0".into()));
        }
        if self.disks_y == 0 || self.disks_y % 2 != 0 {
            return Err(EcmcError::InvalidParam(format!(
                "rows must be a positive even number, got {}",
                self.disks_y
            )));
        }
        if !self.eta.is_finite() || self.eta <= 0.0 || self.eta >= 1.0 {
            return Err(EcmcError::InvalidParam(format!(
                "density must lie in (0, 1), got {}",
                self.eta
            )));
        }
        if self.slant % 2 != 0 {
            return Err(EcmcError::InvalidParam(format!(
                "slant must be even, got {}",
                self.slant
            )));
        }
        if self.extra_factor == 0 {
            return Err(EcmcError::InvalidParam("run-length multiplier must be > 0".into()));
        }
        if self.n_samples == 0 {
            return Err(EcmcError::InvalidParam("number of samples must be > 0".into()));
        }
        if self.cell_capacity == 0 {
            return Err(EcmcError::InvalidParam("cell capacity must be > 0".into()));
        }
        Ok(())
    }
}

/// Box, disk and cell-grid geometry derived once from `Params`.
///
/// The box always has unit area and its origin at the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub number_disks: usize,
    pub box_size: [f64; 2],
    /// Disk radius.
    pub sigma: f64,
    pub cells: [usize; 2],
    pub cell_size: [f64; 2],
    pub cell_capacity: usize,
    /// Mean free path, the natural length unit of the run.
    pub lambda_0: f64,
}

impl Geometry {
    pub fn new(params: &Params) -> Result<Self> {
        let n = params.number_disks();
        let n_f = n as f64;
        let root_n = n_f.sqrt();

        let (box_size, raw_cells) = match params.shape {
            Shape::Square => {
                let c = (root_n * CELLS_PER_DISK_ROW) as usize;
                ([1.0, 1.0], [c, c])
            }
            Shape::Rectangle => {
                let ratio = (3.0_f64.sqrt() / 2.0).sqrt();
                let b = [1.0 / ratio, ratio];
                (
                    b,
                    [
                        (root_n * b[0] * CELLS_PER_DISK_ROW) as usize,
                        (root_n * b[1] * CELLS_PER_DISK_ROW) as usize,
                    ],
                )
            }
            Shape::Crystal => {
                let ratio = (3.0_f64.sqrt() / 2.0 * params.disks_y as f64
                    / params.disks_x as f64)
                    .sqrt();
                (
                    [1.0 / ratio, ratio],
                    [
                        (params.disks_x as f64 * CELLS_PER_DISK_ROW) as usize,
                        (params.disks_y as f64 * CELLS_PER_DISK_ROW) as usize,
                    ],
                )
            }
        };

        // At least two cells per axis, so a disk never scans itself through the boundary.
        let cells = [raw_cells[0].max(2), raw_cells[1].max(2)];
        let cell_size = [box_size[0] / cells[0] as f64, box_size[1] / cells[1] as f64];
        let sigma = (box_size[0] * box_size[1] * params.eta / PI / n_f).sqrt();

        let geometry = Self {
            number_disks: n,
            box_size,
            sigma,
            cells,
            cell_size,
            cell_capacity: params.cell_capacity,
            lambda_0: MEAN_FREE_PATH_SCALE / root_n,
        };

        if geometry.max_step() <= 0.0 {
            return Err(EcmcError::InvalidParam(format!(
                "cells of size {:.6} x {:.6} are too small for disks of radius {:.6}",
                cell_size[0], cell_size[1], sigma
            )));
        }
        Ok(geometry)
    }

    pub fn total_cells(&self) -> usize {
        self.cells[0] * self.cells[1]
    }

    /// Largest displacement resolved by one scan; beyond it the six searched cells
    /// no longer cover every possible contact.
    pub fn max_step(&self) -> f64 {
        let half_box = self.box_size[0].min(self.box_size[1]) / 2.0;
        let cell = self.cell_size[0].min(self.cell_size[1]);
        half_box.min(cell) - 2.0 * self.sigma
    }

    /// Box volume relative to the close-packed volume; converts the collision
    /// observable into a dimensionless pressure.
    pub fn relative_volume(&self) -> f64 {
        self.box_size[0] * self.box_size[1]
            / 2.0
            / 3.0_f64.sqrt()
            / self.number_disks as f64
            / (self.sigma * self.sigma)
    }
}

/// Run-length budget and its partition into chains and intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub total_length: f64,
    pub chain_length: f64,
    pub n_samples: usize,
    pub chains_per_interval: u64,
}

impl Schedule {
    pub fn new(total_length: f64, chain_length: f64, n_samples: usize) -> Self {
        let per_interval = (total_length / n_samples.max(1) as f64 / chain_length) as u64;
        Self {
            total_length,
            chain_length,
            n_samples,
            chains_per_interval: per_interval.max(1),
        }
    }

    fn standard(params: &Params, geometry: &Geometry) -> Self {
        let total = geometry.lambda_0 * RUN_FACTOR * params.extra_factor as f64;
        let chain = CHAIN_LENGTH_SCALE * (geometry.number_disks as f64).sqrt() * geometry.lambda_0;
        Self::new(total, chain, params.n_samples)
    }
}

/// Immutable run configuration, built once and passed by reference to every component.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub params: Params,
    pub geometry: Geometry,
    pub schedule: Schedule,
}

impl SystemConfig {
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let geometry = Geometry::new(&params)?;
        let schedule = Schedule::standard(&params, &geometry);
        Ok(Self {
            params,
            geometry,
            schedule,
        })
    }

    /// Same system with a different run-length budget.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_geometry_has_unit_box_and_minimum_two_cells() {
        let params = Params {
            disks_x: 2,
            disks_y: 2,
            eta: 0.5,
            shape: Shape::Square,
            ..Default::default()
        };
        let g = Geometry::new(&params).unwrap();
        assert_eq!(g.box_size, [1.0, 1.0]);
        assert_eq!(g.cells, [2, 2]);
        assert!((g.sigma - (0.5 / PI / 4.0).sqrt()).abs() < 1e-15);
        assert!(g.max_step() > 0.0);
    }

    #[test]
    fn crystal_box_has_unit_area() {
        let params = Params {
            disks_x: 16,
            disks_y: 18,
            ..Default::default()
        };
        let g = Geometry::new(&params).unwrap();
        assert!((g.box_size[0] * g.box_size[1] - 1.0).abs() < 1e-12);
        assert_eq!(g.cells, [14, 15]);
    }

    #[test]
    fn odd_rows_are_rejected() {
        let params = Params {
            disks_y: 3,
            ..Default::default()
        };
        assert!(matches!(
            SystemConfig::new(params),
            Err(EcmcError::InvalidParam(_))
        ));
    }

    #[test]
    fn schedule_never_has_empty_intervals() {
        let s = Schedule::new(1.0, 0.5, 1000);
        assert_eq!(s.chains_per_interval, 1);
        let s = Schedule::new(100.0, 1.0, 10);
        assert_eq!(s.chains_per_interval, 10);
    }
}
