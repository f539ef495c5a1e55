use nalgebra::Point2;
use straight_ecmc::core::cells::{CellList, DiskRef};
use straight_ecmc::core::domain::{Axis, Params, Shape, SystemConfig};
use straight_ecmc::engine::pressure::{self, PressureAccumulator};
use straight_ecmc::engine::scanner::CollisionScanner;

const BUDGET: f64 = 10.0;

/// 4 × 4 unit cells; the first position becomes the active disk.
fn cells_with(positions: &[Point2<f64>]) -> CellList {
    let mut cells = CellList::build([4, 4], [1.0, 1.0], 5);
    cells.populate(positions).unwrap();
    cells
}

#[test]
fn test_scan_finds_contact_in_forward_cell() {
    let cells = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(0.3, -0.3)]);
    let scanner = CollisionScanner::new(0.25);
    let active = cells.active();
    assert_eq!(active, DiskRef { cell: 5, slot: 0 });

    let scan = scanner.scan(&cells, Axis::X, active, BUDGET);
    let contact = scan.contact.expect("disk ahead must be hit");
    assert_eq!(contact.disk, DiskRef { cell: 6, slot: 0 });
    assert!((contact.delta - 0.21f64.sqrt()).abs() < 1e-12);
    assert!((scan.distance - (0.8 - 0.21f64.sqrt())).abs() < 1e-12);
}

#[test]
fn test_scan_keeps_budget_when_contact_is_beyond_it() {
    let cells = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(0.3, -0.3)]);
    let scanner = CollisionScanner::new(0.25);

    let scan = scanner.scan(&cells, Axis::X, cells.active(), 0.2);
    assert_eq!(scan.distance, 0.2);
    assert!(scan.contact.is_none());
}

#[test]
fn test_scan_picks_the_nearest_of_several_candidates() {
    let cells = cells_with(&[
        Point2::new(-0.5, -0.5),
        Point2::new(0.3, -0.9), // hits at 0.5
        Point2::new(0.3, -0.3), // hits at 0.8 - sqrt(0.21)
    ]);
    let scanner = CollisionScanner::new(0.25);

    let scan = scanner.scan(&cells, Axis::X, cells.active(), BUDGET);
    assert_eq!(scan.contact.unwrap().disk, DiskRef { cell: 6, slot: 1 });
    assert!((scan.distance - (0.8 - 0.21f64.sqrt())).abs() < 1e-12);
}

#[test]
fn test_scan_ignores_transversely_distant_disks() {
    let cells = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(0.3, -0.3)]);
    let scanner = CollisionScanner::new(0.25);

    // Along y the other disk is 0.8 away sideways.
    let scan = scanner.scan(&cells, Axis::Y, cells.active(), BUDGET);
    assert_eq!(scan.distance, BUDGET);
    assert!(scan.contact.is_none());
}

#[test]
fn test_scan_along_y() {
    let cells = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(-0.4, 0.3)]);
    let scanner = CollisionScanner::new(0.25);

    let scan = scanner.scan(&cells, Axis::Y, cells.active(), BUDGET);
    assert_eq!(scan.contact.unwrap().disk, DiskRef { cell: 9, slot: 0 });
    assert!((scan.distance - (0.8 - 0.24f64.sqrt())).abs() < 1e-12);
}

#[test]
fn test_scan_wraps_across_the_boundary() {
    let cells = cells_with(&[Point2::new(1.9, -0.5), Point2::new(-1.5, -0.4)]);
    let scanner = CollisionScanner::new(0.25);
    assert_eq!(cells.active().cell, 7);

    let scan = scanner.scan(&cells, Axis::X, cells.active(), BUDGET);
    assert_eq!(scan.contact.unwrap().disk, DiskRef { cell: 4, slot: 0 });
    assert!((scan.distance - (0.6 - 0.24f64.sqrt())).abs() < 1e-12);
}

#[test]
fn test_scan_own_cell_only_sees_disks_ahead() {
    let scanner = CollisionScanner::new(0.1);

    let alone = cells_with(&[Point2::new(-0.5, -0.5)]);
    let scan = scanner.scan(&alone, Axis::X, alone.active(), BUDGET);
    assert!(scan.contact.is_none(), "the active disk must not hit itself");

    let behind = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(-0.8, -0.45)]);
    let scan = scanner.scan(&behind, Axis::X, behind.active(), BUDGET);
    assert!(scan.contact.is_none());

    let ahead = cells_with(&[Point2::new(-0.5, -0.5), Point2::new(-0.2, -0.4)]);
    let scan = scanner.scan(&ahead, Axis::X, ahead.active(), BUDGET);
    assert_eq!(scan.contact.unwrap().disk, DiskRef { cell: 5, slot: 1 });
    assert!((scan.distance - (0.3 - 0.03f64.sqrt())).abs() < 1e-12);
}

#[test]
fn test_pressure_accumulates_per_axis() {
    let mut acc = PressureAccumulator::default();
    acc.add_length(Axis::X, 2.0);
    acc.add_contact(Axis::X, 0.3);
    acc.add_contact(Axis::X, 0.5);
    acc.add_length(Axis::Y, 4.0);
    acc.add_contact(Axis::Y, 0.4);

    let p = acc.estimate(2.0);
    assert!((p.pressure_x - 0.7).abs() < 1e-12);
    assert!((p.pressure_y - 0.55).abs() < 1e-12);
    assert!((p.pressure - 0.6).abs() < 1e-12);

    acc.reset();
    assert_eq!(acc.contact(), [0.0, 0.0]);
    assert_eq!(acc.length(), [0.0, 0.0]);
}

#[test]
fn test_ideal_gas_limit_is_inverse_volume() {
    let p = pressure::estimate([0.0, 0.0], [1.0, 3.0], 1.25);
    assert!((p.pressure - 0.8).abs() < 1e-12);
    assert!((p.pressure_x - 0.8).abs() < 1e-12);
    assert!((p.pressure_y - 0.8).abs() < 1e-12);
}

#[test]
fn test_relative_volume_depends_only_on_density() {
    for (shape, eta) in [(Shape::Crystal, 0.7), (Shape::Square, 0.5), (Shape::Rectangle, 0.72)] {
        let config = SystemConfig::new(Params {
            disks_x: 16,
            disks_y: 16,
            eta,
            shape,
            ..Default::default()
        })
        .unwrap();
        let expected = std::f64::consts::PI / (2.0 * 3f64.sqrt() * eta);
        assert!((config.geometry.relative_volume() - expected).abs() < 1e-12);
    }
}
