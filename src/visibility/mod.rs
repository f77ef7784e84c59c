//! Line of sight between models past polygonal terrain

pub mod los;

pub use los::{benefits_from_cover, edge_sample_count, line_blocked_by, unit_visible, visible, LosMethod, VisibilityResult};
