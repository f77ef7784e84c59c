//! Shooting and melee attack resolution
//!
//! Validation runs first and rolls nothing. A valid attack is resolved per
//! (weapon, target) group in the order the groups first appear:
//! attacks, hit rolls, wound rolls, allocation and saves, damage, feel no
//! pain. Every stage writes one dice-log entry.

use std::sync::Arc;

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::types::{ModelId, UnitId, WeaponId};
use crate::dice::log::{DiceContext, DiceLogEntry, LogOutcome};
use crate::dice::roller::DiceRoller;
use crate::dice::thresholds::{
    best_save, evaluate_save, evaluate_test, roll_needed, wound_threshold, SaveOutcome, CRITICAL_ROLL,
};
use crate::geometry::measure::{edge_distance, within_engagement_range};
use crate::resolution::action::{AttackKind, WeaponAssignment};
use crate::resolution::allocation::WoundPool;
use crate::resolution::result::{Reason, ResolutionResult};
use crate::terrain::feature::TerrainFeature;
use crate::units::keywords::melee_interaction_allowed;
use crate::units::model::Model;
use crate::units::status::StatusKind;
use crate::units::unit::Unit;
use crate::visibility::los::{benefits_from_cover, unit_visible};
use crate::weapons::keywords::{
    anti_threshold_against, blast_bonus_attacks, half_range_applies, melta_bonus,
    rapid_fire_bonus, sustained_hits, KeywordKind,
};
use crate::weapons::profile::{WeaponClass, WeaponProfile};

/// Models firing one weapon profile at one target unit
struct AttackGroup<'a> {
    weapon: Arc<WeaponProfile>,
    target: &'a Unit,
    models: Vec<&'a Model>,
}

/// Closest edge gap from `model` to any alive model of `target`
fn distance_to_unit(model: &Model, target: &Unit, config: &RulesConfig) -> Option<f64> {
    target
        .alive_models()
        .map(|other| edge_distance(model, other, config))
        .min_by(|a, b| a.total_cmp(b))
}

/// Attacker is within engagement range of an enemy it can interact with
fn attacker_engaged(board: &BoardSnapshot, attacker: &Unit, config: &RulesConfig) -> bool {
    board
        .enemies_of(attacker)
        .filter(|enemy| melee_interaction_allowed(attacker.keywords, enemy.keywords))
        .any(|enemy| {
            attacker.alive_models().any(|ma| {
                enemy
                    .alive_models()
                    .any(|mb| within_engagement_range(ma, mb, config))
            })
        })
}

fn validate<'a>(
    board: &'a BoardSnapshot,
    attacker_id: UnitId,
    kind: AttackKind,
    assignments: &[WeaponAssignment],
    config: &RulesConfig,
) -> Result<(&'a Unit, Vec<AttackGroup<'a>>), Vec<Reason>> {
    let Some(attacker) = board.unit(attacker_id) else {
        return Err(vec![Reason::new("attacker", format!("unit {attacker_id} is not on the board"))]);
    };
    if attacker.is_destroyed() {
        return Err(vec![Reason::new("attacker", format!("unit {attacker_id} is destroyed"))]);
    }
    if assignments.is_empty() {
        return Err(vec![Reason::new("assignments", "no weapon assignments were submitted")]);
    }

    let mut reasons = Vec::new();
    let shooting = kind == AttackKind::Shooting;
    if shooting && attacker.has_status(StatusKind::FellBack) {
        reasons.push(Reason::new("fell_back", format!("unit {attacker_id} fell back and cannot shoot")));
    }
    let engaged = shooting && attacker_engaged(board, attacker, config);

    let mut groups: Vec<AttackGroup<'a>> = Vec::new();
    let mut seen: Vec<(ModelId, WeaponId)> = Vec::new();

    for assignment in assignments {
        let Some(model) = attacker.model(assignment.model) else {
            reasons.push(Reason::new(
                "attacker_model",
                format!("model {} is not part of unit {attacker_id}", assignment.model),
            ));
            continue;
        };
        if !model.alive {
            reasons.push(Reason::new("attacker_model", format!("model {} is dead", model.id)));
            continue;
        }
        if seen.contains(&(model.id, assignment.weapon)) {
            reasons.push(Reason::new(
                "duplicate_assignment",
                format!("model {} uses weapon {} more than once", model.id, assignment.weapon.0),
            ));
            continue;
        }
        seen.push((model.id, assignment.weapon));

        let Some(weapon) = attacker.weapon(assignment.weapon) else {
            reasons.push(Reason::new(
                "weapon",
                format!("unit {attacker_id} has no weapon {}", assignment.weapon.0),
            ));
            continue;
        };
        let expected_class = if shooting { WeaponClass::Ranged } else { WeaponClass::Melee };
        if weapon.class != expected_class {
            reasons.push(Reason::new(
                "weapon_class",
                format!("{} cannot be used for {:?} attacks", weapon.name, kind),
            ));
            continue;
        }

        let Some(target) = board.unit(assignment.target) else {
            reasons.push(Reason::new("target", format!("unit {} is not on the board", assignment.target)));
            continue;
        };
        if !target.is_enemy_of(attacker) {
            reasons.push(Reason::new("target", format!("unit {} is not an enemy", target.id)));
            continue;
        }
        if target.is_destroyed() {
            reasons.push(Reason::new("target", format!("unit {} is destroyed", target.id)));
            continue;
        }

        let distance = distance_to_unit(model, target, config).unwrap_or(f64::INFINITY);
        if shooting {
            if attacker.has_status(StatusKind::Advanced) && !weapon.has(KeywordKind::Assault) {
                reasons.push(Reason::new(
                    "advanced",
                    format!("{} is not an assault weapon and unit {attacker_id} advanced", weapon.name),
                ));
            }
            if engaged && !weapon.has(KeywordKind::Pistol) && !attacker.keywords.fires_while_engaged() {
                reasons.push(Reason::new(
                    "engaged",
                    format!("model {} is in engagement range and {} is not a pistol", model.id, weapon.name),
                ));
            }
            if distance > weapon.range {
                reasons.push(Reason::new(
                    "range",
                    format!(
                        "unit {} is {distance:.2}\" from model {}, beyond {}\" range",
                        target.id, model.id, weapon.range
                    ),
                ));
            }
            if !unit_visible(model, target, &board.terrain_features, config) {
                reasons.push(Reason::new(
                    "line_of_sight",
                    format!("model {} cannot see unit {}", model.id, target.id),
                ));
            }
        } else {
            if !melee_interaction_allowed(attacker.keywords, target.keywords) {
                reasons.push(Reason::new(
                    "aircraft",
                    format!("unit {attacker_id} and unit {} cannot fight: aircraft only fight flyers", target.id),
                ));
            }
            if distance > config.engagement_range + 1e-9 {
                reasons.push(Reason::new(
                    "engagement_range",
                    format!("model {} is {distance:.2}\" from unit {}", model.id, target.id),
                ));
            }
        }

        match groups
            .iter_mut()
            .find(|g| g.weapon.id == weapon.id && g.target.id == target.id)
        {
            Some(group) => group.models.push(model),
            None => groups.push(AttackGroup {
                weapon: Arc::clone(weapon),
                target,
                models: vec![model],
            }),
        }
    }

    if reasons.is_empty() {
        Ok((attacker, groups))
    } else {
        Err(reasons)
    }
}

/// Damage for one unsaved wound
fn roll_damage(weapon: &WeaponProfile, melta: bool, dice: &mut DiceRoller, rolls: &mut Vec<u8>) -> u32 {
    let (mut damage, raw) = dice.roll_expr(weapon.damage);
    rolls.extend(raw);
    if melta {
        if let Some(bonus) = melta_bonus(weapon) {
            let (extra, raw) = dice.roll_expr(bonus);
            rolls.extend(raw);
            damage += extra;
        }
    }
    damage
}

/// Wounds that get through feel no pain
fn feel_no_pain(target: &Unit, damage: u32, dice: &mut DiceRoller, rolls: &mut Vec<u8>) -> u32 {
    let Some(needed) = target.stats.feel_no_pain else {
        return damage;
    };
    let mut kept = 0;
    for _ in 0..damage {
        let raw = dice.d6();
        rolls.push(raw);
        if raw < needed {
            kept += 1;
        }
    }
    kept
}

fn tests_entry(context: DiceContext, rolls: Vec<u8>, successes: u32, criticals: u32) -> DiceLogEntry {
    let auto_failed = rolls.iter().filter(|&&r| r == 1).count() as u32;
    let failures = rolls.len() as u32 - successes;
    DiceLogEntry::new(
        context,
        rolls,
        LogOutcome::Tests { successes, criticals, failures, auto_failed },
    )
}

#[allow(clippy::too_many_arguments)]
fn resolve_group(
    attacker: &Unit,
    group: &AttackGroup<'_>,
    kind: AttackKind,
    pool: &mut WoundPool,
    terrain: &[TerrainFeature],
    dice: &mut DiceRoller,
    log: &mut Vec<DiceLogEntry>,
    config: &RulesConfig,
) {
    let weapon = &group.weapon;
    let target = group.target;
    let shooting = kind == AttackKind::Shooting;

    // Attacks. Blast counts the target as it stood before this attack, so
    // earlier groups' casualties do not shrink it.
    let blast = if weapon.has(KeywordKind::Blast) {
        blast_bonus_attacks(target.alive_count())
    } else {
        0
    };
    let rapid_fire = rapid_fire_bonus(weapon);
    let mut attacks = 0;
    let mut rolls = Vec::new();
    let mut half_range_models = 0;
    for model in &group.models {
        let (count, raw) = dice.roll_expr(weapon.attacks);
        rolls.extend(raw);
        attacks += count + blast;
        let distance = distance_to_unit(model, target, config).unwrap_or(f64::INFINITY);
        if shooting && half_range_applies(weapon.range, distance) {
            half_range_models += 1;
            if let Some(bonus) = rapid_fire {
                let (extra, raw) = dice.roll_expr(bonus);
                rolls.extend(raw);
                attacks += extra;
            }
        }
    }
    log.push(
        DiceLogEntry::new(DiceContext::Attacks, rolls, LogOutcome::Total { value: attacks })
            .param("weapon", weapon.id.0)
            .param("target", target.id.0)
            .param("models", group.models.len())
            .param("blast_bonus", blast)
            .param("half_range_models", half_range_models),
    );
    let melta = half_range_models > 0;

    // Hits
    let (mut hits, critical_hits) = if weapon.is_torrent() {
        log.push(
            DiceLogEntry::new(DiceContext::HitRoll, Vec::new(), LogOutcome::Automatic { value: attacks })
                .param("torrent", true),
        );
        (attacks, 0)
    } else {
        let mut modifiers = Vec::new();
        if shooting && weapon.has(KeywordKind::Heavy) && attacker.has_status(StatusKind::RemainedStationary) {
            modifiers.push(1);
        }
        let needed = roll_needed(weapon.skill, &modifiers);
        let rolls = dice.d6s(attacks as usize);
        let (mut successes, mut criticals) = (0, 0);
        for &raw in &rolls {
            let outcome = evaluate_test(raw, needed, CRITICAL_ROLL);
            if outcome.success {
                successes += 1;
            }
            if outcome.critical {
                criticals += 1;
            }
        }
        log.push(tests_entry(DiceContext::HitRoll, rolls, successes, criticals).param("needed", needed));
        (successes, criticals)
    };

    if critical_hits > 0 {
        if let Some(extra) = sustained_hits(weapon) {
            let mut rolls = Vec::new();
            let mut bonus = 0;
            for _ in 0..critical_hits {
                let (count, raw) = dice.roll_expr(extra);
                rolls.extend(raw);
                bonus += count;
            }
            log.push(DiceLogEntry::new(DiceContext::SustainedHits, rolls, LogOutcome::Total { value: bonus }));
            hits += bonus;
        }
    }
    let automatic_wounds = if weapon.has(KeywordKind::LethalHits) { critical_hits } else { 0 };

    // Wounds
    let mut modifiers = Vec::new();
    if weapon.has(KeywordKind::Lance) && attacker.has_status(StatusKind::Charged) {
        modifiers.push(1);
    }
    let needed = roll_needed(wound_threshold(weapon.strength, target.stats.toughness), &modifiers);
    let critical_on = anti_threshold_against(weapon, target.keywords).unwrap_or(CRITICAL_ROLL);
    let rolls = dice.d6s((hits - automatic_wounds) as usize);
    let (mut wounds, mut critical_wounds, mut failed) = (0, 0, 0);
    for &raw in &rolls {
        let outcome = evaluate_test(raw, needed, critical_on);
        if outcome.success {
            wounds += 1;
        } else {
            failed += 1;
        }
        if outcome.critical {
            critical_wounds += 1;
        }
    }
    log.push(
        tests_entry(DiceContext::WoundRoll, rolls, wounds, critical_wounds)
            .param("needed", needed)
            .param("critical_on", critical_on)
            .param("lethal_hits", automatic_wounds),
    );

    if failed > 0 && weapon.has(KeywordKind::TwinLinked) {
        let rolls = dice.d6s(failed);
        let (mut rerolled, mut rerolled_critical) = (0, 0);
        for &raw in &rolls {
            let outcome = evaluate_test(raw, needed, critical_on);
            if outcome.success {
                rerolled += 1;
            }
            if outcome.critical {
                rerolled_critical += 1;
            }
        }
        log.push(tests_entry(DiceContext::WoundReroll, rolls, rerolled, rerolled_critical));
        wounds += rerolled;
        critical_wounds += rerolled_critical;
    }

    let (saveable, devastating) = if weapon.has(KeywordKind::DevastatingWounds) {
        (wounds - critical_wounds + automatic_wounds, critical_wounds)
    } else {
        (wounds + automatic_wounds, 0)
    };

    // Allocation, saves and damage, one wound at a time
    let cover_allowed = shooting && !weapon.has(KeywordKind::IgnoresCover);
    let mut save_rolls = Vec::new();
    let mut damage_rolls = Vec::new();
    let mut fnp_rolls = Vec::new();
    let (mut saved, mut unsaved, mut damage_dealt) = (0, 0, 0);
    for _ in 0..saveable {
        let Some(slot) = pool.next_target() else { break };
        let in_cover = cover_allowed && benefits_from_cover(&target.models[slot], terrain);
        let choice = best_save(target.stats.save, weapon.ap, pool.invulnerable_save(slot), in_cover);
        let raw = dice.d6();
        save_rolls.push(raw);
        if evaluate_save(raw, choice) == SaveOutcome::Saved {
            saved += 1;
            continue;
        }
        unsaved += 1;
        let damage = roll_damage(weapon, melta, dice, &mut damage_rolls);
        let damage = feel_no_pain(target, damage, dice, &mut fnp_rolls);
        damage_dealt += pool.apply_damage(slot, damage);
    }
    let auto_failed = save_rolls.iter().filter(|&&r| r == 1).count() as u32;
    log.push(
        DiceLogEntry::new(
            DiceContext::SaveRoll,
            save_rolls,
            LogOutcome::Tests { successes: saved, criticals: 0, failures: unsaved, auto_failed },
        )
        .param("ap", weapon.ap),
    );

    // Devastating wounds become mortal wounds after the normal attacks
    let mut mortal_wounds = 0;
    for _ in 0..devastating {
        let damage = roll_damage(weapon, melta, dice, &mut damage_rolls);
        mortal_wounds += feel_no_pain(target, damage, dice, &mut fnp_rolls);
    }
    damage_dealt += pool.apply_mortal_wounds(mortal_wounds);

    log.push(
        DiceLogEntry::new(DiceContext::Damage, damage_rolls, LogOutcome::Total { value: damage_dealt })
            .param("mortal_wounds", mortal_wounds)
            .param("melta", melta),
    );
    if !fnp_rolls.is_empty() {
        let ignored = fnp_rolls
            .iter()
            .filter(|&&r| target.stats.feel_no_pain.is_some_and(|n| r >= n))
            .count() as u32;
        log.push(tests_entry(DiceContext::FeelNoPain, fnp_rolls, ignored, 0));
    }

    tracing::trace!(
        weapon = weapon.id.0,
        target = target.id.0,
        attacks,
        hits,
        wounds,
        damage_dealt,
        "attack group resolved"
    );
}

/// Resolve a shooting or melee attack
pub fn resolve_attack(
    board: &BoardSnapshot,
    attacker_id: UnitId,
    kind: AttackKind,
    assignments: &[WeaponAssignment],
    dice: &mut DiceRoller,
    config: &RulesConfig,
) -> ResolutionResult {
    let (attacker, groups) = match validate(board, attacker_id, kind, assignments, config) {
        Ok(valid) => valid,
        Err(reasons) => return ResolutionResult::rejected(reasons),
    };

    let mut pools: Vec<WoundPool> = Vec::new();
    let mut log = Vec::new();
    for group in &groups {
        let slot = match pools.iter().position(|p| p.unit() == group.target.id) {
            Some(slot) => slot,
            None => {
                pools.push(WoundPool::from_unit(group.target));
                pools.len() - 1
            }
        };
        resolve_group(
            attacker,
            group,
            kind,
            &mut pools[slot],
            &board.terrain_features,
            dice,
            &mut log,
            config,
        );
    }

    let diffs = pools.iter().flat_map(|pool| pool.diffs()).collect();
    ResolutionResult::accepted(diffs, log)
}
