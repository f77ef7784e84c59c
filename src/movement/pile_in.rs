//! Pile-in and consolidation moves
//!
//! Both are short moves towards the enemy made during the fight phase.
//! Consolidation may head for the nearest objective instead when no enemy
//! is within reach.

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::types::{Position, UnitId};
use crate::geometry::measure::{edge_distance, in_base_contact};
use crate::movement::coherency::coherency_violation;
use crate::movement::contact::{
    contact_requirement, contact_violation, overlap_violations, ContactRequirement, PlacementLimits,
};
use crate::movement::path::{plan_moves, ModelPath, MovePlan};
use crate::resolution::result::{Reason, ResolutionResult};
use crate::units::keywords::melee_interaction_allowed;
use crate::units::model::Model;
use crate::units::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FightMove {
    PileIn,
    Consolidate,
}

impl FightMove {
    fn rule(self) -> &'static str {
        match self {
            FightMove::PileIn => "pile_in",
            FightMove::Consolidate => "consolidate",
        }
    }

    fn budget(self, config: &RulesConfig) -> f64 {
        match self {
            FightMove::PileIn => config.pile_in_distance,
            FightMove::Consolidate => config.consolidate_distance,
        }
    }
}

/// Where each moving model has to get closer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Enemy,
    Objective,
}

/// Alive models of enemy units this unit may fight
fn eligible_enemy_models<'a>(board: &'a BoardSnapshot, unit: &'a Unit) -> Vec<&'a Model> {
    board
        .enemies_of(unit)
        .filter(|enemy| melee_interaction_allowed(unit.keywords, enemy.keywords))
        .flat_map(|enemy| enemy.alive_models())
        .collect()
}

fn closest_enemy_gap(model: &Model, enemies: &[&Model], config: &RulesConfig) -> f64 {
    enemies
        .iter()
        .map(|enemy| edge_distance(model, enemy, config))
        .fold(f64::INFINITY, f64::min)
}

fn closest_objective(board: &BoardSnapshot, at: Position) -> Option<Position> {
    board
        .objectives
        .iter()
        .map(|o| o.position)
        .min_by(|a, b| at.distance(a).total_cmp(&at.distance(b)))
}

fn heading_reasons(
    board: &BoardSnapshot,
    unit: &Unit,
    plan: &MovePlan,
    enemies: &[&Model],
    heading: Heading,
    config: &RulesConfig,
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    for step in plan.moving() {
        let Some(before) = unit.model(step.model) else { continue };
        let Some(after) = plan.final_model(step.model) else { continue };

        match heading {
            Heading::Enemy => {
                if enemies.iter().any(|enemy| in_base_contact(after, enemy, config)) {
                    continue;
                }
                let start_gap = closest_enemy_gap(before, enemies, config);
                let end_gap = closest_enemy_gap(after, enemies, config);
                if end_gap >= start_gap - 1e-9 {
                    reasons.push(Reason::new(
                        "move_direction",
                        format!(
                            "model {} must end in base contact or closer to the nearest enemy model ({start_gap:.2}\" -> {end_gap:.2}\")",
                            step.model
                        ),
                    ));
                }
            }
            Heading::Objective => {
                let Some(objective) = closest_objective(board, step.start) else { continue };
                let start = step.start.distance(&objective);
                let end = step.end.distance(&objective);
                if end >= start - 1e-9 {
                    reasons.push(Reason::new(
                        "move_direction",
                        format!("model {} must end closer to the nearest objective marker", step.model),
                    ));
                }
            }
        }
    }

    reasons
}

fn validate_fight_move(
    board: &BoardSnapshot,
    unit_id: UnitId,
    paths: &[ModelPath],
    kind: FightMove,
    config: &RulesConfig,
) -> ResolutionResult {
    let Some(unit) = board.unit(unit_id) else {
        return ResolutionResult::rejected(vec![Reason::new("unit", format!("unit {unit_id} is not on the board"))]);
    };
    if unit.is_destroyed() {
        return ResolutionResult::rejected(vec![Reason::new("unit", format!("unit {unit_id} is destroyed"))]);
    }
    if unit.keywords.is_aircraft() {
        return ResolutionResult::rejected(vec![Reason::new(
            "aircraft",
            format!("unit {unit_id} is an aircraft and cannot {}", kind.rule().replace('_', " ")),
        )]);
    }

    let budget = kind.budget(config);
    let enemies = eligible_enemy_models(board, unit);

    let mut reasons = Vec::new();

    // Models already touching an enemy stay where they are
    for path in paths {
        let Some(model) = unit.model(path.model) else { continue };
        let pinned = model.alive && enemies.iter().any(|enemy| in_base_contact(model, enemy, config));
        let displaced = path
            .waypoints
            .iter()
            .any(|p| p.distance(&model.position) > 1e-9);
        if pinned && displaced {
            reasons.push(Reason::new(
                "base_contact",
                format!("model {} is already in base-to-base contact and may not move", model.id),
            ));
        }
    }

    let plan = match plan_moves(unit, paths, &board.terrain_features, budget, config) {
        Ok(plan) => plan,
        Err(mut plan_reasons) => {
            reasons.append(&mut plan_reasons);
            return ResolutionResult::rejected(reasons);
        }
    };

    let others: Vec<&Model> = board
        .units
        .iter()
        .filter(|u| u.id != unit.id)
        .flat_map(|u| u.alive_models())
        .collect();
    let limits = PlacementLimits { bystanders: &[], others: &others };

    let requirements: Vec<(&Model, ContactRequirement)> = unit
        .alive_models()
        .map(|model| {
            let requirement = contact_requirement(
                model,
                budget,
                &enemies,
                &limits,
                &board.terrain_features,
                unit.keywords,
                config,
            );
            (model, requirement)
        })
        .collect();

    let heading = match kind {
        FightMove::PileIn => Heading::Enemy,
        FightMove::Consolidate => {
            let reachable = requirements
                .iter()
                .any(|(_, r)| *r != ContactRequirement::Unconstrained);
            if reachable {
                Heading::Enemy
            } else {
                Heading::Objective
            }
        }
    };

    if heading == Heading::Objective && board.objectives.is_empty() && plan.moving().next().is_some() {
        reasons.push(Reason::new(
            "consolidate",
            "no enemy is within reach and there is no objective marker to consolidate towards",
        ));
    }

    for step in plan.moving() {
        let Some((_, requirement)) = requirements.iter().find(|(m, _)| m.id == step.model) else { continue };
        let Some(placed) = plan.final_model(step.model) else { continue };
        if let Some(reason) = contact_violation(*requirement, placed, &enemies, config) {
            reasons.push(reason);
        }
    }

    reasons.extend(heading_reasons(board, unit, &plan, &enemies, heading, config));

    reasons.extend(overlap_violations(&plan, &others, config));
    reasons.extend(coherency_violation(&plan.final_models, config));

    if !reasons.is_empty() {
        return ResolutionResult::rejected(reasons);
    }

    let diffs = plan.position_diffs();
    tracing::debug!(unit = unit_id.0, moved = diffs.len(), kind = kind.rule(), ?heading, "fight move accepted");
    ResolutionResult::accepted(diffs, Vec::new())
}

/// Validate a 3" pile-in move
pub fn validate_pile_in(board: &BoardSnapshot, unit_id: UnitId, paths: &[ModelPath], config: &RulesConfig) -> ResolutionResult {
    validate_fight_move(board, unit_id, paths, FightMove::PileIn, config)
}

/// Validate a 3" consolidation move
pub fn validate_consolidate(
    board: &BoardSnapshot,
    unit_id: UnitId,
    paths: &[ModelPath],
    config: &RulesConfig,
) -> ResolutionResult {
    validate_fight_move(board, unit_id, paths, FightMove::Consolidate, config)
}
