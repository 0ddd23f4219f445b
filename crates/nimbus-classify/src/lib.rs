pub mod defaults;
pub mod loader;
pub mod transfer;
pub mod validator;

pub use loader::{load_transfer_from_str, LoadError};
pub use transfer::{TableColor, TransferEntry, TransferFunction};
pub use validator::ValidationError;
