//! Terrain model: features, height classes and the climb-penalty calculus

pub mod feature;
pub mod penalty;

pub use feature::{HeightClass, TerrainFeature, TraversalRule};
pub use penalty::{
    classify_segment, crossing_penalty, forbidden_terrain, movement_cost, path_length,
    path_penalty, segment_crossings, terrain_on_path, CrossingKind, TerrainCrossing,
};
