use nimbus_core::GridDims;

/// Errors raised while packing a grid into a volume texture.
/// No texture is produced when either occurs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("volume has a zero dimension: {}x{}x{}", .dims.x, .dims.y, .dims.z)]
    EmptyVolume { dims: GridDims },

    #[error("sample count mismatch: dimensions declare {expected} cells, got {actual} samples")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Errors that can occur while reading a grid file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read grid file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed grid JSON: {0}")]
    Json(String),
}
