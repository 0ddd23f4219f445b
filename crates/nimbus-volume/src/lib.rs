pub mod builder;
pub mod error;
pub mod loader;
pub mod texture;

pub use builder::build;
pub use error::{BuildError, LoadError};
pub use loader::{load_grid_file, load_grid_json, GridFile};
pub use texture::PackedVolume;
