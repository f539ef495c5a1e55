use std::path::PathBuf;

use clap::Parser;

use crate::core::domain::{Params, Shape, DEFAULT_CELL_CAPACITY, DEFAULT_SAMPLES};

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Straight event-chain Monte Carlo for hard disks with a boundary-crossing pressure estimator",
    long_about = None
)]
pub struct Cli {
    /// Number of disks in a lattice row
    pub disks_x: usize,

    /// Number of lattice rows (even)
    pub disks_y: usize,

    /// Packing fraction
    pub eta: f64,

    /// Lattice shear of the generated crystal (even)
    #[arg(allow_negative_numbers = true)]
    pub slant: i64,

    /// Multiplier of the standard run length
    pub extra_factor: u64,

    /// Box shape
    #[arg(value_enum)]
    pub shape: Shape,

    /// Output run store (directory)
    pub output: PathBuf,

    /// Initial configuration (run store directory or x,y CSV); ignored if absent
    pub input: PathBuf,

    /// Seed of the random number generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Skip the O(N²) overlap check of the initial configuration
    #[arg(long)]
    pub skip_overlap_check: bool,

    /// Increase verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn params(&self) -> Params {
        Params {
            disks_x: self.disks_x,
            disks_y: self.disks_y,
            eta: self.eta,
            slant: self.slant,
            extra_factor: self.extra_factor,
            shape: self.shape,
            seed: self.seed,
            n_samples: DEFAULT_SAMPLES,
            cell_capacity: DEFAULT_CELL_CAPACITY,
            check_overlap: !self.skip_overlap_check,
            output: self.output.clone(),
            input: self.input.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_positionals_map_to_params() {
        let cli = Cli::try_parse_from([
            "straight-ecmc", "16", "18", "0.71", "-2", "3", "crystal", "out", "in.csv",
        ])
        .unwrap();
        let p = cli.params();
        assert_eq!((p.disks_x, p.disks_y), (16, 18));
        assert_eq!(p.slant, -2);
        assert_eq!(p.extra_factor, 3);
        assert_eq!(p.shape, Shape::Crystal);
        assert_eq!(p.output, PathBuf::from("out"));
        assert!(p.check_overlap);
        assert_eq!(p.seed, 0);
    }

    #[test]
    fn missing_argument_is_rejected() {
        let r = Cli::try_parse_from(["straight-ecmc", "16", "18", "0.71", "0", "1", "square", "out"]);
        assert!(r.is_err());
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let r = Cli::try_parse_from([
            "straight-ecmc", "16", "18", "0.71", "0", "1", "hexagon", "out", "in",
        ]);
        assert!(r.is_err());
    }
}
