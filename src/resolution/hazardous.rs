//! Self-damage check after firing hazardous weapons
//!
//! One D6 per model that fired. Each 1 either costs the unit a model or,
//! for characters, vehicles and monsters, a fixed number of mortal wounds.

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::types::{ModelId, UnitId};
use crate::dice::log::{DiceContext, DiceLogEntry, LogOutcome};
use crate::dice::roller::DiceRoller;
use crate::resolution::action::ActionRequest;
use crate::resolution::allocation::WoundPool;
use crate::resolution::result::{Reason, ResolutionResult};

/// The check owed after `request`, if it fired any hazardous weapon
pub fn hazardous_check_for(board: &BoardSnapshot, request: &ActionRequest) -> Option<ActionRequest> {
    let ActionRequest::Attack { attacker, assignments, .. } = request else {
        return None;
    };
    let unit = board.unit(*attacker)?;

    let mut models: Vec<ModelId> = Vec::new();
    for assignment in assignments {
        let hazardous = unit
            .weapon(assignment.weapon)
            .is_some_and(|w| w.is_hazardous());
        if hazardous && !models.contains(&assignment.model) {
            models.push(assignment.model);
        }
    }

    (!models.is_empty()).then_some(ActionRequest::HazardousCheck {
        unit: *attacker,
        models,
    })
}

pub fn resolve_hazardous(
    board: &BoardSnapshot,
    unit_id: UnitId,
    models: &[ModelId],
    dice: &mut DiceRoller,
    config: &RulesConfig,
) -> ResolutionResult {
    let Some(unit) = board.unit(unit_id) else {
        return ResolutionResult::rejected(vec![Reason::new(
            "hazardous",
            format!("unit {unit_id} is not on the board"),
        )]);
    };
    let unknown: Vec<Reason> = models
        .iter()
        .filter(|id| unit.model(**id).is_none())
        .map(|id| Reason::new("hazardous", format!("model {id} is not part of unit {unit_id}")))
        .collect();
    if !unknown.is_empty() {
        return ResolutionResult::rejected(unknown);
    }

    let mut pool = WoundPool::from_unit(unit);
    let rolls = dice.d6s(models.len());
    let mortal = unit.keywords.suffers_mortal_self_damage();
    let mut triggered = 0;
    let mut fnp_rolls = Vec::new();
    let mut ignored = 0;

    for (&raw, &model) in rolls.iter().zip(models) {
        if raw != 1 {
            continue;
        }
        triggered += 1;
        if mortal {
            let mut wounds = config.hazardous_mortal_wounds;
            if let Some(needed) = unit.stats.feel_no_pain {
                let saves = dice.d6s(wounds as usize);
                let passed = saves.iter().filter(|&&r| r >= needed).count() as u32;
                wounds -= passed;
                ignored += passed;
                fnp_rolls.extend(saves);
            }
            pool.apply_mortal_wounds(wounds);
        } else {
            // The model that rolled the 1 if it still stands, else the next in line
            let slot = pool
                .slot_of(model)
                .filter(|&slot| pool.is_alive(slot))
                .or_else(|| pool.next_target());
            if let Some(slot) = slot {
                pool.slay(slot);
            }
        }
    }

    let mut log = vec![DiceLogEntry::new(
        DiceContext::Hazardous,
        rolls,
        LogOutcome::Triggered { count: triggered },
    )
    .param("unit", unit_id.0)
    .param("mortal_wounds_per_trigger", if mortal { config.hazardous_mortal_wounds } else { 0 })];
    if !fnp_rolls.is_empty() {
        let failures = fnp_rolls.len() as u32 - ignored;
        let auto_failed = fnp_rolls.iter().filter(|&&r| r == 1).count() as u32;
        log.push(DiceLogEntry::new(
            DiceContext::FeelNoPain,
            fnp_rolls,
            LogOutcome::Tests { successes: ignored, criticals: 0, failures, auto_failed },
        ));
    }

    tracing::debug!(unit = unit_id.0, triggered, mortal, "hazardous check resolved");
    ResolutionResult::accepted(pool.diffs(), log)
}
