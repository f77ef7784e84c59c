//! Model-to-model line of sight with escalating cost
//!
//! 1. One ray between base centres.
//! 2. Rays between points sampled on the facing halves of both bases.
//! 3. For large bases, rays from points around the whole circumference.
//!
//! The first clear ray wins. Terrain at the lowest height class never
//! blocks, and a piece that contains either model is ignored for that pair.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::types::{Position, TerrainId};
use crate::geometry::polygon::span_inside;
use crate::terrain::feature::TerrainFeature;
use crate::units::model::Model;
use crate::units::unit::Unit;

/// Which stage produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosMethod {
    CentreToCentre,
    EdgeSampling,
    Circumference,
    /// Every stage was tried and every ray was blocked
    Blocked,
    /// Input could not be measured
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    pub has_los: bool,
    pub method: LosMethod,
    /// Terrain blocking the centre ray, when no ray was clear
    pub blocking_terrain: Vec<TerrainId>,
    pub attempted_lines: usize,
    pub failure_reason: Option<String>,
}

impl VisibilityResult {
    fn clear(method: LosMethod, attempted_lines: usize) -> Self {
        Self {
            has_los: true,
            method,
            blocking_terrain: Vec::new(),
            attempted_lines,
            failure_reason: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            has_los: false,
            method: LosMethod::Invalid,
            blocking_terrain: Vec::new(),
            attempted_lines: 0,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Features among `terrain` whose interior the ray `from -> to` passes through
pub fn line_blocked_by(
    from: Position,
    to: Position,
    terrain: &[&TerrainFeature],
) -> Vec<TerrainId> {
    terrain
        .iter()
        .filter(|feature| span_inside(&feature.footprint(), from, to) > 1e-9)
        .map(|feature| feature.id)
        .collect()
}

fn line_is_clear(from: Position, to: Position, terrain: &[&TerrainFeature]) -> bool {
    !terrain
        .iter()
        .any(|feature| span_inside(&feature.footprint(), from, to) > 1e-9)
}

/// Edge samples for a base of `diameter_mm` at `distance` inches
pub fn edge_sample_count(diameter_mm: f64, distance: f64, config: &RulesConfig) -> usize {
    let raw = 4.0 + (diameter_mm / 16.0).ceil() - (distance / 12.0).floor();
    bounded(raw.max(0.0) as usize, config.min_edge_samples, config.max_edge_samples)
}

/// Points spread evenly over the half of the base facing `towards`
fn facing_edge_points(model: &Model, towards: Position, count: usize, config: &RulesConfig) -> Vec<Position> {
    let base = model.base_or(config.default_base_mm);
    let centre_angle = (towards - model.position).angle();
    let steps = count.max(2) - 1;
    (0..=steps)
        .map(|i| {
            let angle = centre_angle - PI / 2.0 + PI * i as f64 / steps as f64;
            model
                .position
                .offset_polar(angle, base.radius_towards(angle, model.facing))
        })
        .collect()
}

/// Like `clamp`, but a floor above the cap wins instead of panicking.
/// Configs built field by field never pass through `validate`.
fn bounded(count: usize, floor: usize, cap: usize) -> usize {
    count.max(floor).min(cap.max(floor)).max(1)
}

/// Points every `circumference_spacing` inches around the whole base
fn circumference_points(model: &Model, config: &RulesConfig) -> Vec<Position> {
    let base = model.base_or(config.default_base_mm);
    let circumference = TAU * base.max_radius();
    let count = bounded(
        (circumference / config.circumference_spacing).ceil() as usize,
        config.min_edge_samples,
        config.max_circumference_samples,
    );
    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            model
                .position
                .offset_polar(angle, base.radius_towards(angle, model.facing))
        })
        .collect()
}

fn is_large(model: &Model, config: &RulesConfig) -> bool {
    model.base_or(config.default_base_mm).diameter_mm() >= config.large_base_mm
}

/// First clear ray between any pair, plus the number of rays tried
fn first_clear_pair(
    from: &[Position],
    to: &[Position],
    terrain: &[&TerrainFeature],
) -> (bool, usize) {
    let mut attempted = 0;
    for &a in from {
        for &b in to {
            attempted += 1;
            if line_is_clear(a, b, terrain) {
                return (true, attempted);
            }
        }
    }
    (false, attempted)
}

/// Can `shooter` see `target` past the given terrain?
pub fn visible(
    shooter: &Model,
    target: &Model,
    terrain: &[TerrainFeature],
    config: &RulesConfig,
) -> VisibilityResult {
    if !shooter.alive || !target.alive {
        return VisibilityResult::invalid("dead models neither see nor are seen");
    }
    if !shooter.position.is_finite() || !target.position.is_finite() {
        return VisibilityResult::invalid("model position is not a finite coordinate");
    }

    // Features that could block this pair at all
    let candidates: Vec<&TerrainFeature> = terrain
        .iter()
        .filter(|f| f.blocks_los() && f.is_usable())
        .filter(|f| !f.contains(shooter.position) && !f.contains(target.position))
        .collect();

    if candidates.is_empty() {
        return VisibilityResult::clear(LosMethod::CentreToCentre, 1);
    }

    // (a) centre to centre
    let blocking = line_blocked_by(shooter.position, target.position, &candidates);
    if blocking.is_empty() {
        return VisibilityResult::clear(LosMethod::CentreToCentre, 1);
    }
    let mut attempted = 1;

    // (b) facing edge samples
    let distance = shooter.position.distance(&target.position);
    let shooter_count = edge_sample_count(
        shooter.base_or(config.default_base_mm).diameter_mm(),
        distance,
        config,
    );
    let target_count = edge_sample_count(
        target.base_or(config.default_base_mm).diameter_mm(),
        distance,
        config,
    );
    let shooter_edges = facing_edge_points(shooter, target.position, shooter_count, config);
    let target_edges = facing_edge_points(target, shooter.position, target_count, config);

    let (clear, tried) = first_clear_pair(&shooter_edges, &target_edges, &candidates);
    attempted += tried;
    if clear {
        return VisibilityResult::clear(LosMethod::EdgeSampling, attempted);
    }

    // (c) whole circumference of large bases
    let shooter_large = is_large(shooter, config);
    let target_large = is_large(target, config);
    if shooter_large || target_large {
        let from = if shooter_large { circumference_points(shooter, config) } else { shooter_edges };
        let to = if target_large { circumference_points(target, config) } else { target_edges };
        let (clear, tried) = first_clear_pair(&from, &to, &candidates);
        attempted += tried;
        if clear {
            return VisibilityResult::clear(LosMethod::Circumference, attempted);
        }
    }

    tracing::trace!(
        shooter = shooter.id.0,
        target = target.id.0,
        attempted,
        "line of sight blocked"
    );

    VisibilityResult {
        has_los: false,
        method: LosMethod::Blocked,
        blocking_terrain: blocking,
        attempted_lines: attempted,
        failure_reason: Some("every sampled line crosses blocking terrain".into()),
    }
}

/// Can `shooter` see any alive model of `target`?
pub fn unit_visible(
    shooter: &Model,
    target: &Unit,
    terrain: &[TerrainFeature],
    config: &RulesConfig,
) -> bool {
    target
        .alive_models()
        .any(|model| visible(shooter, model, terrain, config).has_los)
}

/// A model standing inside any terrain footprint gets the benefit of cover
pub fn benefits_from_cover(model: &Model, terrain: &[TerrainFeature]) -> bool {
    terrain.iter().any(|feature| feature.contains(model.position))
}
