use thiserror::Error;

use crate::transfer::TransferEntry;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Transfer table has no entries")]
    EmptyTable,
    #[error("Entry {index}: threshold {value} is not finite")]
    NonFiniteThreshold { index: usize, value: f32 },
    #[error("Entry {index}: threshold {value} does not exceed previous threshold {previous}")]
    ThresholdsNotIncreasing {
        index: usize,
        value: f32,
        previous: f32,
    },
    #[error("Entry {index}: alpha {value} outside [0, 1]")]
    AlphaOutOfRange { index: usize, value: f32 },
}

/// Validate transfer table entries. Collects every problem instead of
/// stopping at the first one.
pub fn validate_entries(entries: &[TransferEntry]) -> Result<(), Vec<ValidationError>> {
    if entries.is_empty() {
        return Err(vec![ValidationError::EmptyTable]);
    }

    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        if !entry.threshold.is_finite() {
            errors.push(ValidationError::NonFiniteThreshold {
                index,
                value: entry.threshold,
            });
        }
        // NaN fails the range check as well as the finiteness check.
        if !(0.0..=1.0).contains(&entry.color.a) {
            errors.push(ValidationError::AlphaOutOfRange {
                index,
                value: entry.color.a,
            });
        }
    }

    // Strict ordering; the binary search in the classifier relies on it.
    for (index, pair) in entries.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.threshold.is_finite() && next.threshold.is_finite() && next.threshold <= prev.threshold
        {
            errors.push(ValidationError::ThresholdsNotIncreasing {
                index: index + 1,
                value: next.threshold,
                previous: prev.threshold,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
