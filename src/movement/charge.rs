//! Charge move validation

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::types::UnitId;
use crate::geometry::measure::{unit_edge_distance, units_within_engagement, within_engagement_range};
use crate::movement::coherency::coherency_violation;
use crate::movement::contact::{
    contact_requirement, contact_violation, overlap_violations, PlacementLimits,
};
use crate::movement::path::{plan_moves, ModelPath};
use crate::resolution::result::{Diff, Reason, ResolutionResult};
use crate::units::keywords::melee_interaction_allowed;
use crate::units::model::Model;
use crate::units::status::{Expiry, StatusEffect, StatusKind};
use crate::units::unit::Unit;

/// Lowest and highest possible 2D6 charge roll
const MIN_ROLL: u8 = 2;
const MAX_ROLL: u8 = 12;

fn declaration_reasons(
    board: &BoardSnapshot,
    unit: &Unit,
    targets: &[UnitId],
    roll: u8,
    config: &RulesConfig,
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if unit.keywords.is_aircraft() {
        reasons.push(Reason::new("aircraft", format!("unit {} is an aircraft and cannot charge", unit.id)));
    }
    for status in [StatusKind::Advanced, StatusKind::FellBack] {
        if unit.has_status(status) {
            reasons.push(Reason::new(
                "charge_declaration",
                format!("unit {} {} this turn and cannot charge", unit.id, status.as_str().replace('_', " ")),
            ));
        }
    }
    if !(MIN_ROLL..=MAX_ROLL).contains(&roll) {
        reasons.push(Reason::new(
            "charge_roll",
            format!("charge roll {roll} is not a possible 2D6 result"),
        ));
    }
    if targets.is_empty() {
        reasons.push(Reason::new("charge_declaration", "no charge targets were declared"));
    }

    let engaged = board
        .enemies_of(unit)
        .filter(|enemy| melee_interaction_allowed(unit.keywords, enemy.keywords))
        .any(|enemy| units_within_engagement(unit, enemy, config));
    if engaged {
        reasons.push(Reason::new(
            "charge_declaration",
            format!("unit {} is already within engagement range of an enemy", unit.id),
        ));
    }

    for &target_id in targets {
        let Some(target) = board.unit(target_id) else {
            reasons.push(Reason::new("target", format!("unit {target_id} is not on the board")));
            continue;
        };
        if !target.is_enemy_of(unit) || target.is_destroyed() {
            reasons.push(Reason::new("target", format!("unit {target_id} is not a live enemy unit")));
            continue;
        }
        if target.keywords.is_aircraft() && !unit.keywords.can_fly() {
            reasons.push(Reason::new(
                "aircraft",
                format!("only units that can fly may charge aircraft unit {target_id}"),
            ));
        }
        match unit_edge_distance(unit, target, config) {
            Some(gap) if gap <= config.max_charge_distance + 1e-9 => {}
            _ => reasons.push(Reason::new(
                "charge_declaration",
                format!("unit {target_id} is more than {}\" away", config.max_charge_distance),
            )),
        }
    }

    reasons
}

/// Validate a charge move against the rolled distance
pub fn validate_charge(
    board: &BoardSnapshot,
    unit_id: UnitId,
    targets: &[UnitId],
    roll: u8,
    paths: &[ModelPath],
    config: &RulesConfig,
) -> ResolutionResult {
    let Some(unit) = board.unit(unit_id) else {
        return ResolutionResult::rejected(vec![Reason::new("unit", format!("unit {unit_id} is not on the board"))]);
    };
    if unit.is_destroyed() {
        return ResolutionResult::rejected(vec![Reason::new("unit", format!("unit {unit_id} is destroyed"))]);
    }

    let reasons = declaration_reasons(board, unit, targets, roll, config);
    if !reasons.is_empty() {
        return ResolutionResult::rejected(reasons);
    }

    let plan = match plan_moves(unit, paths, &board.terrain_features, roll as f64, config) {
        Ok(plan) => plan,
        Err(reasons) => return ResolutionResult::rejected(reasons),
    };

    let target_units: Vec<&Unit> = targets.iter().filter_map(|id| board.unit(*id)).collect();
    let target_models: Vec<&Model> = target_units.iter().flat_map(|u| u.alive_models()).collect();
    let bystanders: Vec<&Unit> = board
        .enemies_of(unit)
        .filter(|enemy| !targets.contains(&enemy.id))
        .filter(|enemy| melee_interaction_allowed(unit.keywords, enemy.keywords))
        .collect();

    let bystander_models: Vec<&Model> = bystanders.iter().flat_map(|u| u.alive_models()).collect();
    let others: Vec<&Model> = board
        .units
        .iter()
        .filter(|u| u.id != unit.id)
        .flat_map(|u| u.alive_models())
        .collect();
    let limits = PlacementLimits { bystanders: &bystander_models, others: &others };

    let mut reasons = Vec::new();

    // Every model, moved or not, is held to the contact rule
    for model in unit.alive_models() {
        let requirement = contact_requirement(
            model,
            roll as f64,
            &target_models,
            &limits,
            &board.terrain_features,
            unit.keywords,
            config,
        );
        if let Some(placed) = plan.final_model(model.id) {
            if let Some(reason) = contact_violation(requirement, placed, &target_models, config) {
                reasons.push(reason);
            }
        }
    }

    for target in &target_units {
        let reached = plan
            .final_models
            .iter()
            .any(|m| target.alive_models().any(|t| within_engagement_range(m, t, config)));
        if !reached {
            reasons.push(Reason::new(
                "charge_target",
                format!("no charging model ends within engagement range of target unit {}", target.id),
            ));
        }
    }

    for enemy in &bystanders {
        let touched = plan
            .final_models
            .iter()
            .find(|m| enemy.alive_models().any(|e| within_engagement_range(m, e, config)));
        if let Some(model) = touched {
            reasons.push(Reason::new(
                "charge_bystander",
                format!(
                    "model {} would end within engagement range of unit {}, which was not a charge target",
                    model.id, enemy.id
                ),
            ));
        }
    }

    reasons.extend(overlap_violations(&plan, &others, config));
    reasons.extend(coherency_violation(&plan.final_models, config));

    if !reasons.is_empty() {
        return ResolutionResult::rejected(reasons);
    }

    let mut diffs = plan.position_diffs();
    diffs.push(Diff::UnitStatus {
        unit: unit_id,
        status: StatusKind::Charged,
        effect: Some(StatusEffect::new(Expiry::EndOfTurn, "charge")),
    });
    tracing::debug!(unit = unit_id.0, roll, moved = diffs.len() - 1, "charge accepted");
    ResolutionResult::accepted(diffs, Vec::new())
}
