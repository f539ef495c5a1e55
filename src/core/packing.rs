use nalgebra::{Point2, Vector2};

use crate::core::domain::{Geometry, Shape, LATTICE_MARGIN};
use crate::core::spatial;

/// Generates the starting configuration when no stored one is supplied.
///
/// * `Square`/`Rectangle`: a triangular lattice with spacing slightly above contact,
///   filled row by row from the box centre and wrapped; not necessarily commensurate
///   with the box.
/// * `Crystal`: a perfect Nx × Ny triangular crystal filling the box. A non-zero
///   `slant` raises each row gradually so that the end of one row connects to the
///   start of row `slant` further up across the periodic boundary.
///
/// Positions are absolute, in the centred box.
pub fn generate(
    geometry: &Geometry,
    shape: Shape,
    disks_x: usize,
    disks_y: usize,
    slant: i64,
) -> Vec<Point2<f64>> {
    let mut positions = match shape {
        Shape::Square | Shape::Rectangle => packed_rows(geometry),
        Shape::Crystal => crystal(geometry, disks_x, disks_y, slant),
    };
    for p in &mut positions {
        spatial::wrap_point(p, &geometry.box_size);
    }
    positions
}

fn packed_rows(geometry: &Geometry) -> Vec<Point2<f64>> {
    let n_total = geometry.number_disks;
    let n = (n_total as f64).sqrt() as usize;
    let [lx, ly] = geometry.box_size;
    let sigma = geometry.sigma;

    let along_row = Vector2::new(LATTICE_MARGIN * sigma * 2.0, 0.0);
    let next_row = Vector2::new(LATTICE_MARGIN * sigma, LATTICE_MARGIN * sigma * 3.0_f64.sqrt());

    let mut positions = vec![Point2::origin(); n_total];
    // n columns; n + 2 rows always cover n_total < (n + 1)².
    for i in 0..n {
        for j in 0..(n + 2) {
            let idx = j * n + i;
            if idx >= n_total {
                continue;
            }
            let r = along_row * i as f64 + next_row * j as f64;
            positions[idx] = Point2::new(r.x % lx, r.y % ly);
        }
    }
    positions
}

fn crystal(geometry: &Geometry, nx: usize, ny: usize, slant: i64) -> Vec<Point2<f64>> {
    let [lx, ly] = geometry.box_size;
    let rise = slant as f64 * ly / ny as f64 / nx as f64;
    let along_row = Vector2::new(lx / nx as f64, rise);
    let row_shift = Vector2::new(0.5 * lx / nx as f64, 0.5 * rise);
    let row_spacing = ly / ny as f64;

    let mut positions = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        let odd = (j % 2) as f64;
        for i in 0..nx {
            let r = along_row * i as f64 + row_shift * odd + Vector2::new(0.0, j as f64 * row_spacing);
            positions.push(Point2::new(r.x % lx, r.y % ly));
        }
    }
    positions
}
