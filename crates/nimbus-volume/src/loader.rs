use std::path::Path;

use glam::{UVec3, Vec3};
use nimbus_core::{ScalarGrid, SpatialExtent};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// JSON grid file: counts per axis, world bounds, and a flat value array
/// (x fastest) where `null` marks a cell without data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFile {
    pub cols: u32,
    pub rows: u32,
    pub heights: u32,
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
    pub zmin: f32,
    pub zmax: f32,
    pub values: Vec<Option<f32>>,
}

impl GridFile {
    /// Convert to a grid. The value count is not checked here; the volume
    /// builder reports a shape mismatch.
    pub fn into_grid(self) -> ScalarGrid {
        let dims = UVec3::new(self.cols, self.rows, self.heights);
        let extent = SpatialExtent::new(
            Vec3::new(self.xmin, self.ymin, self.zmin),
            Vec3::new(self.xmax, self.ymax, self.zmax),
        );
        ScalarGrid::new(dims, extent, self.values)
    }

    pub fn from_grid(grid: &ScalarGrid) -> Self {
        let dims = grid.dims();
        let extent = grid.extent();
        Self {
            cols: dims.x,
            rows: dims.y,
            heights: dims.z,
            xmin: extent.min.x,
            xmax: extent.max.x,
            ymin: extent.min.y,
            ymax: extent.max.y,
            zmin: extent.min.z,
            zmax: extent.max.z,
            values: grid.samples().to_vec(),
        }
    }
}

/// Parse a grid from JSON text.
pub fn load_grid_json(json: &str) -> Result<ScalarGrid, LoadError> {
    let file: GridFile = serde_json::from_str(json).map_err(|e| LoadError::Json(e.to_string()))?;
    log::info!(
        "Grid {}x{}x{} with {} values",
        file.cols,
        file.rows,
        file.heights,
        file.values.len()
    );
    Ok(file.into_grid())
}

/// Read and parse a grid file from disk.
pub fn load_grid_file(path: &Path) -> Result<ScalarGrid, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_grid_json(&contents)
}

/// Serialize a grid back to the JSON file shape.
pub fn to_json(grid: &ScalarGrid) -> Result<String, LoadError> {
    serde_json::to_string(&GridFile::from_grid(grid)).map_err(|e| LoadError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::error::BuildError;
    use nimbus_classify::defaults::reference_table;

    const SMALL_GRID: &str = r#"{
        "cols": 2, "rows": 2, "heights": 2,
        "xmin": -10.0, "xmax": 10.0,
        "ymin": -5, "ymax": 5,
        "zmin": 0, "zmax": 3.5,
        "values": [null, null, null, null, null, null, null, 31.5]
    }"#;

    #[test]
    fn test_load_grid_with_nulls() {
        let grid = load_grid_json(SMALL_GRID).expect("should parse");
        assert_eq!(grid.dims(), UVec3::new(2, 2, 2));
        assert_eq!(grid.extent().min, Vec3::new(-10.0, -5.0, 0.0));
        assert_eq!(grid.extent().max, Vec3::new(10.0, 5.0, 3.5));
        assert_eq!(grid.present_count(), 1);
        assert_eq!(grid.get(1, 1, 1), Some(31.5));
    }

    #[test]
    fn test_loaded_grid_builds() {
        let grid = load_grid_json(SMALL_GRID).expect("should parse");
        let volume = build(&grid, &reference_table()).expect("should build");
        assert_eq!(volume.texel(1, 1, 1), reference_table().classify(Some(31.5)));
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let json = SMALL_GRID.replace("\"cols\": 2", "\"cols\": -2");
        assert!(matches!(load_grid_json(&json), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"cols": 1, "rows": 1, "values": [1.0]}"#;
        assert!(matches!(load_grid_json(json), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_short_values_surface_at_build() {
        let json = SMALL_GRID.replace("null, null, null, null, null, null, null, 31.5", "1, 2, 3");
        let grid = load_grid_json(&json).expect("loader does not check shape");
        assert!(matches!(
            build(&grid, &reference_table()),
            Err(BuildError::ShapeMismatch {
                expected: 8,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_absent_cells() {
        let grid = load_grid_json(SMALL_GRID).expect("should parse");
        let text = to_json(&grid).expect("serialize");
        let back = load_grid_json(&text).expect("parse back");
        assert_eq!(back, grid);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_grid_file(Path::new("/nonexistent/grid.json"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
