pub mod report;
pub mod runner;
pub mod scenes;
pub mod snapshot;
