//! Climb penalties for moves that cross terrain
//!
//! A non-flying mover climbs up and back down any tall piece it crosses.
//! A flyer pays only the extra length of an arc over the piece.

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::types::{Position, TerrainId};
use crate::geometry::polygon::{contains_point, inside_intervals};
use crate::terrain::feature::TerrainFeature;
use crate::units::keywords::UnitKeywords;

/// How a straight segment meets a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingKind {
    /// Enters and leaves: climb up and down
    Full,
    /// Starts or ends inside: one climb
    Partial,
    /// Starts and ends inside without leaving: no climb
    Within,
}

/// One terrain piece met by one path segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainCrossing {
    pub terrain: TerrainId,
    pub kind: CrossingKind,
    pub height: f64,
    /// Horizontal distance travelled inside the footprint
    pub span: f64,
    pub penalty: f64,
}

/// Penalty for a single crossing
pub fn crossing_penalty(height: f64, kind: CrossingKind, span: f64, flying: bool, config: &RulesConfig) -> f64 {
    if height <= config.penalty_free_height || kind == CrossingKind::Within {
        return 0.0;
    }
    if flying {
        return (height * height + span * span).sqrt() - span;
    }
    match kind {
        CrossingKind::Full => height * 2.0,
        CrossingKind::Partial => height,
        CrossingKind::Within => 0.0,
    }
}

/// Classify each stretch of `from -> to` that lies inside a feature.
///
/// Every stretch is a separate crossing, so a segment that leaves a concave
/// footprint and climbs back in pays for both climbs.
pub fn classify_segment(feature: &TerrainFeature, from: Position, to: Position) -> Vec<(CrossingKind, f64)> {
    if !feature.is_usable() {
        return Vec::new();
    }
    let footprint = feature.footprint();
    let length = from.distance(&to);
    let stretches = inside_intervals(&footprint, from, to);

    if stretches.is_empty() {
        // Standing on the footprint or only touching its edge
        return match (contains_point(&footprint, from), contains_point(&footprint, to)) {
            (true, true) if length < 1e-12 => vec![(CrossingKind::Within, 0.0)],
            (true, false) | (false, true) => vec![(CrossingKind::Partial, 0.0)],
            _ => Vec::new(),
        };
    }

    stretches
        .into_iter()
        .map(|(t0, t1)| {
            let kind = match (t0 < 1e-9, t1 > 1.0 - 1e-9) {
                (true, true) => CrossingKind::Within,
                (true, false) | (false, true) => CrossingKind::Partial,
                (false, false) => CrossingKind::Full,
            };
            (kind, (t1 - t0) * length)
        })
        .collect()
}

/// Every terrain crossing along one straight segment, in terrain order
pub fn segment_crossings(
    from: Position,
    to: Position,
    terrain: &[TerrainFeature],
    flying: bool,
    config: &RulesConfig,
) -> Vec<TerrainCrossing> {
    terrain
        .iter()
        .flat_map(|feature| {
            let height = feature.height_inches();
            classify_segment(feature, from, to)
                .into_iter()
                .map(move |(kind, span)| TerrainCrossing {
                    terrain: feature.id,
                    kind,
                    height,
                    span,
                    penalty: crossing_penalty(height, kind, span, flying, config),
                })
        })
        .collect()
}

/// Every crossing along a waypoint path
pub fn terrain_on_path(
    path: &[Position],
    terrain: &[TerrainFeature],
    flying: bool,
    config: &RulesConfig,
) -> Vec<TerrainCrossing> {
    path.windows(2)
        .flat_map(|leg| segment_crossings(leg[0], leg[1], terrain, flying, config))
        .collect()
}

/// Total climb penalty for a path; crossings add up
pub fn path_penalty(path: &[Position], terrain: &[TerrainFeature], flying: bool, config: &RulesConfig) -> f64 {
    terrain_on_path(path, terrain, flying, config)
        .iter()
        .map(|c| c.penalty)
        .sum()
}

/// Straight-line length of a waypoint path
pub fn path_length(path: &[Position]) -> f64 {
    path.windows(2).map(|leg| leg[0].distance(&leg[1])).sum()
}

/// Length plus climb penalty, the figure compared against a movement budget
pub fn movement_cost(path: &[Position], terrain: &[TerrainFeature], flying: bool, config: &RulesConfig) -> f64 {
    path_length(path) + path_penalty(path, terrain, flying, config)
}

/// Terrain the mover's keywords do not permit it to enter
pub fn forbidden_terrain(path: &[Position], terrain: &[TerrainFeature], mover: UnitKeywords) -> Vec<TerrainId> {
    let mut blocked: Vec<TerrainId> = terrain
        .iter()
        .filter(|feature| !feature.traversal.permits(mover))
        .filter(|feature| {
            path.windows(2)
                .any(|leg| !classify_segment(feature, leg[0], leg[1]).is_empty())
                || (path.len() == 1 && feature.contains(path[0]))
        })
        .map(|feature| feature.id)
        .collect();
    blocked.dedup();
    blocked
}
