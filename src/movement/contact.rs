//! Base-to-base contact enforcement and base overlap checks
//!
//! If a model can reach base contact with an eligible enemy model inside
//! its budget, it has to. Failing that, if it can reach engagement range it
//! has to end there. Otherwise the rule does not constrain it. Only spots the
//! model could legally end on count as reachable.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::types::Position;
use crate::geometry::measure::{
    edge_distance, in_base_contact, overlaps_at, radius_towards, within_engagement_range,
    within_engagement_range_at,
};
use crate::movement::path::MovePlan;
use crate::resolution::result::Reason;
use crate::terrain::feature::TerrainFeature;
use crate::terrain::penalty::{forbidden_terrain, movement_cost};
use crate::units::keywords::UnitKeywords;
use crate::units::model::Model;

/// What a moving model must achieve against nearby enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRequirement {
    BaseContact,
    EngagementRange,
    Unconstrained,
}

/// Spots tried around each enemy base when the straight approach is blocked
const CONTACT_SAMPLES: usize = 72;

/// Where a moving model may not end up, other than its own unit's coherency
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementLimits<'a> {
    /// Enemy models it must stay out of engagement range of
    pub bystanders: &'a [&'a Model],
    /// Every other base on the board
    pub others: &'a [&'a Model],
}

impl PlacementLimits<'_> {
    fn permits(&self, mover: &Model, at: Position, config: &RulesConfig) -> bool {
        !self.others.iter().any(|other| overlaps_at(mover, at, other, config))
            && !self
                .bystanders
                .iter()
                .any(|enemy| within_engagement_range_at(mover, at, enemy, config))
    }
}

/// Centre position on the straight line towards `target` with an edge gap of `gap`
fn reach_point(mover: &Model, target: &Model, gap: f64, config: &RulesConfig) -> Position {
    let from = mover.position;
    let offset = target.position - from;
    let direction = if offset.length() > 1e-9 {
        offset.normalize()
    } else {
        Position::new(1.0, 0.0)
    };
    let centres = radius_towards(mover, from, target.position, config)
        + radius_towards(target, target.position, from, config)
        + gap;
    target.position - direction * centres
}

/// Centre positions all the way around `target` with an edge gap of `gap`
fn ring_points(mover: &Model, target: &Model, gap: f64, config: &RulesConfig) -> impl Iterator<Item = Position> {
    let mover_base = mover.base_or(config.default_base_mm);
    let target_base = target.base_or(config.default_base_mm);
    let (facing, target_facing, centre) = (mover.facing, target.facing, target.position);
    (0..CONTACT_SAMPLES).map(move |i| {
        let angle = TAU * i as f64 / CONTACT_SAMPLES as f64;
        let centres = target_base.radius_towards(angle, target_facing)
            + mover_base.radius_towards(angle + PI, facing)
            + gap;
        centre.offset_polar(angle, centres)
    })
}

/// Can `mover` get its edge within `gap` of `target` on a straight line inside
/// `budget`, ending somewhere `limits` allows?
#[allow(clippy::too_many_arguments)]
fn reachable(
    mover: &Model,
    target: &Model,
    gap: f64,
    budget: f64,
    limits: &PlacementLimits,
    terrain: &[TerrainFeature],
    keywords: UnitKeywords,
    config: &RulesConfig,
) -> bool {
    if edge_distance(mover, target, config) <= gap + config.base_contact_tolerance {
        return true;
    }
    let start = mover.position;
    let legal = |spot: Position| {
        let line = [start, spot];
        limits.permits(mover, spot, config)
            && forbidden_terrain(&line, terrain, keywords).is_empty()
            && movement_cost(&line, terrain, keywords.can_fly(), config) <= budget + config.base_contact_tolerance
    };
    std::iter::once(reach_point(mover, target, gap, config))
        .chain(ring_points(mover, target, gap, config))
        .any(legal)
}

/// Requirement for `mover`, measured from where it starts.
///
/// Contact or engagement only counts as reachable through a spot that
/// `limits` also allows.
pub fn contact_requirement(
    mover: &Model,
    budget: f64,
    enemies: &[&Model],
    limits: &PlacementLimits,
    terrain: &[TerrainFeature],
    keywords: UnitKeywords,
    config: &RulesConfig,
) -> ContactRequirement {
    let within = |gap: f64| {
        enemies
            .iter()
            .any(|enemy| reachable(mover, enemy, gap, budget, limits, terrain, keywords, config))
    };
    if within(0.0) {
        ContactRequirement::BaseContact
    } else if within(config.engagement_range) {
        ContactRequirement::EngagementRange
    } else {
        ContactRequirement::Unconstrained
    }
}

/// Check a model's final placement against its requirement
pub fn contact_violation(
    requirement: ContactRequirement,
    placed: &Model,
    enemies: &[&Model],
    config: &RulesConfig,
) -> Option<Reason> {
    match requirement {
        ContactRequirement::BaseContact => {
            let touching = enemies.iter().any(|enemy| in_base_contact(placed, enemy, config));
            (!touching).then(|| {
                let gap = enemies
                    .iter()
                    .map(|enemy| edge_distance(placed, enemy, config))
                    .fold(f64::INFINITY, f64::min);
                Reason::new(
                    "base_contact",
                    format!(
                        "model {} could reach base-to-base contact with an enemy model but ended {gap:.2}\" away",
                        placed.id
                    ),
                )
            })
        }
        ContactRequirement::EngagementRange => {
            let engaged = enemies
                .iter()
                .any(|enemy| within_engagement_range(placed, enemy, config));
            (!engaged).then(|| {
                Reason::new(
                    "engagement_range",
                    format!(
                        "model {} could reach engagement range of an enemy model but did not end within it",
                        placed.id
                    ),
                )
            })
        }
        ContactRequirement::Unconstrained => None,
    }
}

/// Moved models may not end overlapping any other base on the board
pub fn overlap_violations(plan: &MovePlan, others: &[&Model], config: &RulesConfig) -> Vec<Reason> {
    let mut reasons = Vec::new();
    for step in plan.moving() {
        let Some(placed) = plan.final_model(step.model) else { continue };
        let friendly = plan.final_models.iter().filter(|m| m.id != placed.id);
        let clash = friendly
            .chain(others.iter().copied())
            .find(|other| overlaps_at(placed, placed.position, other, config));
        if let Some(other) = clash {
            reasons.push(Reason::new(
                "overlap",
                format!("model {} would end overlapping the base of model {}", placed.id, other.id),
            ));
        }
    }
    reasons
}
