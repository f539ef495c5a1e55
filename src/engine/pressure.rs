use serde::{Deserialize, Serialize};

use crate::core::domain::Axis;

/// Dimensionless pressure of one interval, total and per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    pub pressure: f64,
    pub pressure_x: f64,
    pub pressure_y: f64,
}

/// Boundary-crossing estimator: βPV/N = (Σ Δ / Σ L + 1) / (V / V₀).
///
/// `contact` holds the summed along-axis contact separations and `length` the
/// summed chain lengths, each indexed by axis.
pub fn estimate(contact: [f64; 2], length: [f64; 2], relative_volume: f64) -> PressureSample {
    let axis = |k: usize| (contact[k] / length[k] + 1.0) / relative_volume;
    PressureSample {
        pressure: ((contact[0] + contact[1]) / (length[0] + length[1]) + 1.0) / relative_volume,
        pressure_x: axis(0),
        pressure_y: axis(1),
    }
}

/// Per-interval running sums, kept separately for each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureAccumulator {
    contact: [f64; 2],
    length: [f64; 2],
}

impl PressureAccumulator {
    pub fn add_length(&mut self, axis: Axis, length: f64) {
        self.length[axis.index()] += length;
    }

    pub fn add_contact(&mut self, axis: Axis, delta: f64) {
        self.contact[axis.index()] += delta;
    }

    pub fn contact(&self) -> [f64; 2] {
        self.contact
    }

    pub fn length(&self) -> [f64; 2] {
        self.length
    }

    pub fn estimate(&self, relative_volume: f64) -> PressureSample {
        estimate(self.contact, self.length, relative_volume)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_hand_computation() {
        let p = estimate([3.0, 1.0], [10.0, 10.0], 2.0);
        assert!((p.pressure_x - 0.65).abs() < 1e-12);
        assert!((p.pressure_y - 0.55).abs() < 1e-12);
        assert!((p.pressure - 0.6).abs() < 1e-12);
    }

    #[test]
    fn accumulator_sums_by_axis_and_resets() {
        let mut acc = PressureAccumulator::default();
        acc.add_length(Axis::X, 10.0);
        acc.add_length(Axis::Y, 10.0);
        acc.add_contact(Axis::X, 2.0);
        acc.add_contact(Axis::X, 1.0);
        acc.add_contact(Axis::Y, 1.0);
        assert_eq!(acc.contact(), [3.0, 1.0]);
        assert_eq!(acc.estimate(2.0), estimate([3.0, 1.0], [10.0, 10.0], 2.0));

        acc.reset();
        assert_eq!(acc, PressureAccumulator::default());
    }

    #[test]
    fn ideal_gas_limit_without_contacts() {
        let p = estimate([0.0, 0.0], [5.0, 5.0], 4.0);
        assert_eq!(p.pressure, 0.25);
        assert_eq!(p.pressure_x, p.pressure_y);
    }
}
