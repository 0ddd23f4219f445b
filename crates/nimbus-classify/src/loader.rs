use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transfer::{TransferEntry, TransferFunction};
use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse transfer table RON: {0}")]
    ParseError(String),
    #[error("Transfer table '{name}' failed validation with {} errors", .errors.len())]
    Invalid {
        name: String,
        errors: Vec<ValidationError>,
    },
}

/// On-disk shape of a transfer table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferTableDef {
    pub name: String,
    pub entries: Vec<TransferEntry>,
}

/// Parse a transfer table definition without validating it.
pub fn parse_table_def(ron_str: &str) -> Result<TransferTableDef, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ParseError(e.to_string()))
}

/// Parse and validate a transfer table from a RON string.
pub fn load_transfer_from_str(ron_str: &str) -> Result<TransferFunction, LoadError> {
    let def = parse_table_def(ron_str)?;
    for e in &def.entries {
        log::trace!("{}: threshold {} -> {:?}", def.name, e.threshold, e.color);
    }
    let tf = TransferFunction::new(&def.entries).map_err(|errors| {
        for e in &errors {
            log::error!("Transfer table '{}': {e}", def.name);
        }
        LoadError::Invalid {
            name: def.name.clone(),
            errors,
        }
    })?;
    log::debug!("Loaded transfer table '{}' ({} entries)", def.name, tf.len());
    Ok(tf)
}

/// Serialize a classifier back to RON, e.g. to dump the built-in table.
pub fn to_ron_string(name: &str, tf: &TransferFunction) -> Result<String, LoadError> {
    let def = TransferTableDef {
        name: name.to_string(),
        entries: tf.entries().collect(),
    };
    ron::ser::to_string_pretty(&def, ron::ser::PrettyConfig::default())
        .map_err(|e| LoadError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::reference_table;

    #[test]
    fn test_load_small_table() {
        let ron = r#"(
            name: "two-step",
            entries: [
                (threshold: 0.0, color: (r: 0, g: 0, b: 0, a: 0.0)),
                (threshold: 10.0, color: (r: 255, g: 128, b: 0, a: 0.5)),
            ],
        )"#;
        let tf = load_transfer_from_str(ron).expect("should parse");
        assert_eq!(tf.len(), 2);
        assert_eq!(tf.thresholds(), &[0.0, 10.0]);
        assert_eq!(tf.colors()[1].g, 128);
    }

    #[test]
    fn test_malformed_ron_rejected() {
        let ron = r#"(name: "broken", entries: [ {"#;
        assert!(matches!(
            load_transfer_from_str(ron),
            Err(LoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_channel_overflow_rejected_by_parser() {
        let ron = r#"(name: "hot", entries: [(threshold: 0.0, color: (r: 300, g: 0, b: 0, a: 1.0))])"#;
        assert!(matches!(
            load_transfer_from_str(ron),
            Err(LoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_unsorted_table_reports_validation_errors() {
        let ron = r#"(
            name: "unsorted",
            entries: [
                (threshold: 5.0, color: (r: 0, g: 0, b: 0, a: 0.0)),
                (threshold: 1.0, color: (r: 0, g: 0, b: 0, a: 1.0)),
            ],
        )"#;
        match load_transfer_from_str(ron) {
            Err(LoadError::Invalid { name, errors }) => {
                assert_eq!(name, "unsorted");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_shipped_reflectivity_table_matches_builtin() {
        let ron = include_str!("../../../data/transfer/reflectivity.ron");
        let tf = load_transfer_from_str(ron).expect("shipped table should load");
        assert_eq!(tf, reference_table());
    }

    #[test]
    fn test_ron_dump_roundtrip() {
        let tf = reference_table();
        let text = to_ron_string("reflectivity", &tf).expect("serialize");
        let back = load_transfer_from_str(&text).expect("parse back");
        assert_eq!(back, tf);
    }
}
