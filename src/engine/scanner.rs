use crate::core::cells::{neighbour_offset, CellList, DiskRef, SELF};
use crate::core::domain::{Axis, Geometry};

/// Neighbour directions that can hold a disk ahead of the active one: the
/// active disk's own column/row and the one in front of it.
const AHEAD_X: [usize; 6] = [5, 1, 7, SELF, 2, 8];
const AHEAD_Y: [usize; 6] = [7, 5, 3, SELF, 8, 6];

/// Minimum along-axis separation for a disk in the active disk's column to
/// count as "ahead". The own cell uses a looser bound so the active disk never
/// finds itself.
const AHEAD_EPS: f64 = 1e-16;
const AHEAD_EPS_SELF: f64 = 1e-14;

/// The first disk hit by the active disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub disk: DiskRef,
    /// Along-axis centre separation at contact; the pressure observable.
    pub delta: f64,
}

/// Result of a collision search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scan {
    /// Free travel before the contact, or the whole budget when nothing is hit.
    pub distance: f64,
    pub contact: Option<Contact>,
}

/// Exact event detection for a disk sliding along x or y among hard disks.
#[derive(Debug, Clone, Copy)]
pub struct CollisionScanner {
    contact_sq: f64,
    contact_distance: f64,
}

impl CollisionScanner {
    pub fn new(sigma: f64) -> Self {
        Self {
            contact_sq: 4.0 * sigma * sigma,
            contact_distance: 2.0 * sigma,
        }
    }

    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self::new(geometry.sigma)
    }

    /// Finds the nearest contact of `active` moving forward along `axis`
    /// within `budget`. Read-only.
    ///
    /// The returned distance may be negative when the input already overlaps;
    /// the caller clamps it.
    pub fn scan(&self, cells: &CellList, axis: Axis, active: DiskRef, budget: f64) -> Scan {
        let a = axis.index();
        let t = axis.transverse().index();
        let cell_size = cells.cell_size();
        let x_cur = cells.position(active);
        let row = cells.neighbours(active.cell);

        let directions = match axis {
            Axis::X => &AHEAD_X,
            Axis::Y => &AHEAD_Y,
        };

        let mut best = Scan {
            distance: budget,
            contact: None,
        };

        for &dir in directions {
            let (dx, dy) = neighbour_offset(dir);
            let offset = [dx as f64 * cell_size[0], dy as f64 * cell_size[1]];
            let same_column = offset[a] == 0.0;
            let ahead_eps = if dir == SELF { AHEAD_EPS_SELF } else { AHEAD_EPS };
            let cell = row[dir];

            for (slot, p) in cells.disks(cell).iter().enumerate() {
                let transverse = p[t] + offset[t] - x_cur[t];
                if transverse.abs() >= self.contact_distance {
                    continue;
                }
                let along = p[a] + offset[a] - x_cur[a];
                if same_column && along <= ahead_eps {
                    continue;
                }
                let delta = (self.contact_sq - transverse * transverse).sqrt();
                let distance = along - delta;
                if distance < best.distance {
                    best = Scan {
                        distance,
                        contact: Some(Contact {
                            disk: DiskRef { cell, slot },
                            delta,
                        }),
                    };
                }
            }
        }
        best
    }
}
