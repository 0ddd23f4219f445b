use crate::constants::COLOR_CHANNEL_MAX;
use crate::types::GridDims;

/// Total number of cells in a grid, in `usize` so overflow surfaces as a
/// mismatch instead of wrapping in `u32`.
pub fn cell_count(dims: GridDims) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}

/// Flatten a cell coordinate to its linear index (x fastest, then y, then z).
pub fn flatten_index(dims: GridDims, x: u32, y: u32, z: u32) -> usize {
    let nx = dims.x as usize;
    let ny = dims.y as usize;
    x as usize + y as usize * nx + z as usize * nx * ny
}

/// Map an 8-bit transfer-table channel into `[0, 1]`.
pub fn normalize_channel(channel: u8) -> f32 {
    channel as f32 / COLOR_CHANNEL_MAX
}
