use nalgebra::Point2;
use rand::Rng;

use crate::core::domain::{Axis, Geometry};
use crate::core::spatial;
use crate::error::{EcmcError, Result};

/// Number of entries in a neighbour row: the cell itself and its 8 surrounding cells.
pub const NEIGHBOURHOOD: usize = 9;

/// Index of the cell itself in its neighbour row.
///
/// Rows are numbered from the bottom left:
/// ```text
/// 6 7 8
/// 3 4 5
/// 0 1 2
/// ```
pub const SELF: usize = 4;

/// Grid offset `(dx, dy)` of neighbour direction `dir`.
#[inline(always)]
pub fn neighbour_offset(dir: usize) -> (isize, isize) {
    ((dir % 3) as isize - 1, (dir / 3) as isize - 1)
}

/// The neighbour a disk enters when it leaves its cell moving forward along `axis`.
#[inline(always)]
pub fn forward_neighbour(axis: Axis) -> usize {
    match axis {
        Axis::X => 5,
        Axis::Y => 7,
    }
}

/// Builds the periodic neighbour table of an `nx` × `ny` grid.
/// Cells are numbered `i + j * nx`.
pub fn neighbour_table(nx: usize, ny: usize) -> Vec<[usize; NEIGHBOURHOOD]> {
    let mut table = vec![[0usize; NEIGHBOURHOOD]; nx * ny];
    for j in 0..ny {
        for i in 0..nx {
            let row = &mut table[i + j * nx];
            for (dir, entry) in row.iter_mut().enumerate() {
                let (dx, dy) = neighbour_offset(dir);
                let i2 = (i as isize + dx).rem_euclid(nx as isize) as usize;
                let j2 = (j as isize + dy).rem_euclid(ny as isize) as usize;
                *entry = i2 + j2 * nx;
            }
        }
    }
    table
}

/// Storage location of a disk. Disks have no identity beyond where they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiskRef {
    pub cell: usize,
    pub slot: usize,
}

/// Record of a slot freed by a migration: the former last occupant of `cell`,
/// previously at `moved_from`, now lives at `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vacancy {
    pub cell: usize,
    pub slot: usize,
    pub moved_from: usize,
}

/// Periodic cell list with fixed-capacity cells.
///
/// Disk positions are stored relative to the centre of their cell in one flat
/// arena of `total_cells * capacity` slots. Removal swaps the cell's last occupant
/// into the freed slot, so each cell's disks stay contiguous and every insert or
/// remove is O(1).
///
/// **Invariant**: every stored coordinate lies within ±half a cell size of its
/// cell centre, and the occupancies sum to the number of disks.
#[derive(Debug, Clone)]
pub struct CellList {
    dims: [usize; 2],
    cell_size: [f64; 2],
    box_size: [f64; 2],
    capacity: usize,
    neighbours: Vec<[usize; NEIGHBOURHOOD]>,
    slots: Vec<Point2<f64>>,
    occupancy: Vec<usize>,
    active: DiskRef,
}

impl CellList {
    /// Empty cell list with its neighbour table.
    pub fn build(dims: [usize; 2], cell_size: [f64; 2], capacity: usize) -> Self {
        let total = dims[0] * dims[1];
        Self {
            dims,
            cell_size,
            box_size: [dims[0] as f64 * cell_size[0], dims[1] as f64 * cell_size[1]],
            capacity,
            neighbours: neighbour_table(dims[0], dims[1]),
            slots: vec![Point2::origin(); total * capacity],
            occupancy: vec![0; total],
            active: DiskRef { cell: 0, slot: 0 },
        }
    }

    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self::build(geometry.cells, geometry.cell_size, geometry.cell_capacity)
    }

    /// Assigns absolute positions (centred box) to their cells, replacing any content.
    /// The first disk becomes active.
    pub fn populate(&mut self, positions: &[Point2<f64>]) -> Result<()> {
        self.occupancy.iter_mut().for_each(|o| *o = 0);

        for (n, p) in positions.iter().enumerate() {
            let mut index = [0usize; 2];
            let mut shifted = [0.0f64; 2];
            for k in 0..2 {
                let x = spatial::wrap_coordinate(p[k], self.box_size[k]) + self.box_size[k] / 2.0;
                let mut i = (x / self.cell_size[k]).floor() as usize;
                let mut x = x;
                if i >= self.dims[k] {
                    // Rounding put the disk on the far edge; it belongs to the first cell.
                    i = 0;
                    x -= self.box_size[k];
                }
                index[k] = i;
                shifted[k] = x - (i as f64 + 0.5) * self.cell_size[k];
            }

            let cell = index[0] + index[1] * self.dims[0];
            let slot = self.occupancy[cell];
            if slot >= self.capacity {
                return Err(EcmcError::CellOverflow {
                    cell,
                    capacity: self.capacity,
                });
            }
            self.slots[cell * self.capacity + slot] = Point2::new(shifted[0], shifted[1]);
            self.occupancy[cell] += 1;
            if n == 0 {
                self.active = DiskRef { cell, slot };
            }
        }
        Ok(())
    }

    // --- Accessors ---

    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    pub fn cell_size(&self) -> [f64; 2] {
        self.cell_size
    }

    pub fn box_size(&self) -> [f64; 2] {
        self.box_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_cells(&self) -> usize {
        self.occupancy.len()
    }

    pub fn occupancy(&self, cell: usize) -> usize {
        self.occupancy[cell]
    }

    /// Sum of all cell occupancies.
    pub fn total_disks(&self) -> usize {
        self.occupancy.iter().sum()
    }

    #[inline(always)]
    pub fn neighbours(&self, cell: usize) -> &[usize; NEIGHBOURHOOD] {
        &self.neighbours[cell]
    }

    /// Cell-relative positions of the disks in `cell`.
    #[inline(always)]
    pub fn disks(&self, cell: usize) -> &[Point2<f64>] {
        let start = cell * self.capacity;
        &self.slots[start..start + self.occupancy[cell]]
    }

    /// Cell-relative position of a disk.
    #[inline(always)]
    pub fn position(&self, disk: DiskRef) -> Point2<f64> {
        debug_assert!(disk.slot < self.occupancy[disk.cell]);
        self.slots[disk.cell * self.capacity + disk.slot]
    }

    /// Absolute centre of a cell; the box origin is its centre.
    pub fn cell_center(&self, cell: usize) -> Point2<f64> {
        let i = cell % self.dims[0];
        let j = cell / self.dims[0];
        Point2::new(
            (i as f64 + 0.5) * self.cell_size[0] - self.box_size[0] / 2.0,
            (j as f64 + 0.5) * self.cell_size[1] - self.box_size[1] / 2.0,
        )
    }

    pub fn absolute(&self, disk: DiskRef) -> Point2<f64> {
        self.cell_center(disk.cell) + self.position(disk).coords
    }

    /// All absolute positions, cell by cell in slot order.
    pub fn absolute_positions(&self) -> Vec<Point2<f64>> {
        let mut out = Vec::with_capacity(self.total_disks());
        for cell in 0..self.total_cells() {
            let center = self.cell_center(cell);
            out.extend(self.disks(cell).iter().map(|p| center + p.coords));
        }
        out
    }

    pub fn active(&self) -> DiskRef {
        self.active
    }

    pub fn set_active(&mut self, disk: DiskRef) {
        debug_assert!(disk.slot < self.occupancy[disk.cell]);
        self.active = disk;
    }

    /// Uniformly samples a disk by rejection over (cell, slot) pairs and makes it active.
    pub fn choose_active<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DiskRef {
        debug_assert!(self.total_disks() > 0, "cannot sample from an empty cell list");
        let n_cells = self.total_cells();
        loop {
            let cell = rng.gen_range(0..n_cells);
            let slot = rng.gen_range(0..self.capacity);
            if slot < self.occupancy[cell] {
                self.active = DiskRef { cell, slot };
                return self.active;
            }
        }
    }

    /// Commits a new cell-relative coordinate of the active disk along `axis`.
    ///
    /// A coordinate past the forward cell edge moves the disk into the forward
    /// neighbour, re-based by one cell width, and the emptied slot is refilled by
    /// the source cell's last disk. The caller bounds each move to at most one
    /// cell crossing. Returns the refilled slot when a migration happened.
    pub fn advance(&mut self, axis: Axis, coordinate: f64) -> Result<Option<Vacancy>> {
        let a = axis.index();
        let DiskRef { cell, slot } = self.active;
        let source = cell * self.capacity + slot;

        if coordinate <= self.cell_size[a] / 2.0 {
            self.slots[source][a] = coordinate;
            return Ok(None);
        }

        let target = self.neighbours[cell][forward_neighbour(axis)];
        debug_assert_ne!(target, cell);
        let target_slot = self.occupancy[target];
        if target_slot >= self.capacity {
            return Err(EcmcError::CellOverflow {
                cell: target,
                capacity: self.capacity,
            });
        }

        let mut moved = self.slots[source];
        moved[a] = coordinate - self.cell_size[a];
        self.slots[target * self.capacity + target_slot] = moved;
        self.occupancy[target] += 1;

        let last = self.occupancy[cell] - 1;
        self.slots[source] = self.slots[cell * self.capacity + last];
        self.occupancy[cell] -= 1;

        self.active = DiskRef {
            cell: target,
            slot: target_slot,
        };
        Ok(Some(Vacancy {
            cell,
            slot,
            moved_from: last,
        }))
    }
}
