//! The bounded, concurrent storage layer and its background expirer.

mod core;
mod expirer;

pub use core::{StatsSnapshot, StorageCore};
pub use expirer::Expirer;
