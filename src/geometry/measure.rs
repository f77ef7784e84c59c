//! Base-to-base measurement
//!
//! Every query here is computed from current positions on each call.
//! Nothing is cached, so a moved model is always measured where it stands.

use crate::core::config::RulesConfig;
use crate::core::types::Position;
use crate::units::model::Model;
use crate::units::unit::Unit;

/// Radius of `model`'s base, standing at `at`, in the direction of `towards`
pub fn radius_towards(model: &Model, at: Position, towards: Position, config: &RulesConfig) -> f64 {
    let direction = (towards - at).angle();
    model
        .base_or(config.default_base_mm)
        .radius_towards(direction, model.facing)
}

/// Edge gap between `a` standing at `a_at` and `b` where it stands.
///
/// Negative when the bases overlap.
pub fn edge_distance_at(a: &Model, a_at: Position, b: &Model, config: &RulesConfig) -> f64 {
    let centres = a_at.distance(&b.position);
    centres - radius_towards(a, a_at, b.position, config) - radius_towards(b, b.position, a_at, config)
}

/// Edge gap between two models at their current positions
pub fn edge_distance(a: &Model, b: &Model, config: &RulesConfig) -> f64 {
    edge_distance_at(a, a.position, b, config)
}

pub fn within_engagement_range_at(a: &Model, a_at: Position, b: &Model, config: &RulesConfig) -> bool {
    edge_distance_at(a, a_at, b, config) <= config.engagement_range + 1e-9
}

pub fn within_engagement_range(a: &Model, b: &Model, config: &RulesConfig) -> bool {
    within_engagement_range_at(a, a.position, b, config)
}

pub fn in_base_contact_at(a: &Model, a_at: Position, b: &Model, config: &RulesConfig) -> bool {
    edge_distance_at(a, a_at, b, config).abs() <= config.base_contact_tolerance
}

pub fn in_base_contact(a: &Model, b: &Model, config: &RulesConfig) -> bool {
    in_base_contact_at(a, a.position, b, config)
}

/// Bases overlap by more than the contact tolerance
pub fn overlaps_at(a: &Model, a_at: Position, b: &Model, config: &RulesConfig) -> bool {
    edge_distance_at(a, a_at, b, config) < -config.base_contact_tolerance
}

/// Centre position on the straight line from `from` towards `target` where the bases touch
pub fn contact_point(mover: &Model, from: Position, target: &Model, config: &RulesConfig) -> Position {
    let offset = target.position - from;
    let direction = if offset.length() > 1e-9 {
        offset.normalize()
    } else {
        Position::new(1.0, 0.0)
    };
    let gap = radius_towards(mover, from, target.position, config)
        + radius_towards(target, target.position, from, config);
    target.position - direction * gap
}

/// Smallest edge gap between any two alive models of two units
pub fn unit_edge_distance(a: &Unit, b: &Unit, config: &RulesConfig) -> Option<f64> {
    a.alive_models()
        .flat_map(|ma| b.alive_models().map(move |mb| (ma, mb)))
        .map(|(ma, mb)| edge_distance(ma, mb, config))
        .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))))
}

/// Any alive model of `a` is within engagement range of any alive model of `b`
pub fn units_within_engagement(a: &Unit, b: &Unit, config: &RulesConfig) -> bool {
    a.alive_models()
        .any(|ma| b.alive_models().any(|mb| within_engagement_range(ma, mb, config)))
}
