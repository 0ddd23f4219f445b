//! Step-function classifier mapping scalar samples to color + opacity.

use nimbus_core::math::normalize_channel;
use nimbus_core::Rgba;
use serde::{Deserialize, Serialize};

use crate::validator::{validate_entries, ValidationError};

/// Table color as authored: 8-bit RGB plus a `[0, 1]` alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl TableColor {
    pub const TRANSPARENT: TableColor = TableColor::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Texel value: color channels divided by 255, alpha unchanged.
    pub fn normalized(&self) -> Rgba {
        Rgba::new(
            normalize_channel(self.r),
            normalize_channel(self.g),
            normalize_channel(self.b),
            self.a,
        )
    }
}

/// One row of a transfer table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub threshold: f32,
    pub color: TableColor,
}

/// Ordered `(threshold, color)` table classifying a scalar into one of its entries.
///
/// Buckets are right-open: entry `i` covers `[t(i-1), t(i))`. Negative values
/// map to entry 0 and values at or above every threshold map to the last entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    thresholds: Vec<f32>,
    colors: Vec<TableColor>,
    // Normalized once so classification never recomputes or allocates.
    texels: Vec<Rgba>,
}

impl TransferFunction {
    /// Build a classifier from validated entries.
    pub fn new(entries: &[TransferEntry]) -> Result<Self, Vec<ValidationError>> {
        validate_entries(entries)?;
        Ok(Self {
            thresholds: entries.iter().map(|e| e.threshold).collect(),
            colors: entries.iter().map(|e| e.color).collect(),
            texels: entries.iter().map(|e| e.color.normalized()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[TableColor] {
        &self.colors
    }

    /// Table rows, in order.
    pub fn entries(&self) -> impl Iterator<Item = TransferEntry> + '_ {
        self.thresholds
            .iter()
            .zip(&self.colors)
            .map(|(&threshold, &color)| TransferEntry { threshold, color })
    }

    /// Index of the entry a value falls into. `None` for absent (or NaN) values.
    pub fn bucket_index(&self, value: Option<f32>) -> Option<usize> {
        let value = value.filter(|v| !v.is_nan())?;
        if value < 0.0 {
            return Some(0);
        }
        // Count of thresholds <= value == index of the first threshold > value.
        let first_above = self.thresholds.partition_point(|&t| t <= value);
        Some(first_above.min(self.thresholds.len() - 1))
    }

    /// Classify a sample into its authored table color.
    pub fn classify_raw(&self, value: Option<f32>) -> TableColor {
        match self.bucket_index(value) {
            Some(i) => self.colors[i],
            None => TableColor::TRANSPARENT,
        }
    }

    /// Classify a sample into a normalized texel. Absent samples are fully transparent.
    pub fn classify(&self, value: Option<f32>) -> Rgba {
        match self.bucket_index(value) {
            Some(i) => self.texels[i],
            None => Rgba::TRANSPARENT,
        }
    }
}
