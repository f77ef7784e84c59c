//! Board snapshot: units, terrain and objectives for one resolution

pub mod snapshot;

pub use snapshot::{BoardSnapshot, Objective};
