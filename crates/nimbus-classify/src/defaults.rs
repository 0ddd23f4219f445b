//! Built-in transfer table for radar reflectivity fields.
//! Kept in sync with `data/transfer/reflectivity.ron`.

use crate::transfer::{TableColor, TransferEntry, TransferFunction};

/// Reflectivity palette rows: threshold, then (r, g, b, a).
pub const REFLECTIVITY_ENTRIES: [TransferEntry; 15] = [
    row(0.0, 0, 0, 0, 0.0),
    row(5.0, 170, 36, 250, 1.0),
    row(10.0, 212, 142, 254, 1.0),
    row(15.0, 238, 2, 48, 1.0),
    row(20.0, 254, 100, 92, 1.0),
    row(25.0, 254, 172, 172, 1.0),
    row(30.0, 140, 140, 0, 0.9),
    row(35.0, 200, 200, 2, 0.8),
    row(40.0, 252, 244, 100, 0.7),
    row(45.0, 16, 146, 26, 0.6),
    row(50.0, 0, 234, 0, 0.5),
    row(55.0, 166, 252, 168, 0.4),
    row(60.0, 30, 38, 208, 0.3),
    row(65.0, 122, 114, 238, 0.2),
    row(70.0, 192, 192, 254, 1.0),
];

const fn row(threshold: f32, r: u8, g: u8, b: u8, a: f32) -> TransferEntry {
    TransferEntry {
        threshold,
        color: TableColor::new(r, g, b, a),
    }
}

/// The reflectivity classifier. The constant table is valid by construction.
pub fn reference_table() -> TransferFunction {
    match TransferFunction::new(&REFLECTIVITY_ENTRIES) {
        Ok(tf) => tf,
        Err(errors) => unreachable!("built-in transfer table is invalid: {errors:?}"),
    }
}
