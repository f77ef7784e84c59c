//! Attack and hazardous-check resolution, end to end through the engine

use tabletop_rules::core::types::{ModelId, PlayerId, Position, TerrainId, UnitId, WeaponId};
use tabletop_rules::dice::{DiceContext, DiceExpr, DiceLogEntry, LogOutcome};
use tabletop_rules::resolution::{hazardous_check_for, AttackKind, WeaponAssignment};
use tabletop_rules::terrain::{HeightClass, TerrainFeature};
use tabletop_rules::units::{Expiry, Model, StatusEffect, StatusKind, Unit, UnitKeywords, UnitStats};
use tabletop_rules::weapons::{WeaponKeyword, WeaponProfile};
use tabletop_rules::{ActionRequest, BoardSnapshot, Diff, ResolutionResult, RulesEngine};

fn entry(result: &ResolutionResult, context: DiceContext) -> &DiceLogEntry {
    result
        .dice_log
        .iter()
        .find(|e| e.context == context)
        .unwrap_or_else(|| panic!("no {context:?} entry in {:?}", result.dice_log))
}

fn wounds_lost(before: &BoardSnapshot, after: &BoardSnapshot, unit: UnitId) -> u32 {
    let before = before.unit(unit).unwrap();
    let after = after.unit(unit).unwrap();
    before
        .models
        .iter()
        .zip(&after.models)
        .map(|(b, a)| b.current_wounds - a.current_wounds)
        .sum()
}

fn squad(id: u32, owner: u8, keywords: UnitKeywords, x: f64, count: u32, wounds: u32) -> Unit {
    let mut unit = Unit::new(UnitId(id), PlayerId(owner), keywords);
    for i in 0..count {
        unit.models
            .push(Model::new(ModelId(i + 1), Position::new(x, i as f64 * 1.5), wounds));
    }
    unit
}

/// Successes, criticals and failures of a batch of tests
fn tally(entry: &DiceLogEntry) -> (u32, u32, u32) {
    match entry.outcome {
        LogOutcome::Tests { successes, criticals, failures, .. } => (successes, criticals, failures),
        ref other => panic!("{:?} is not a batch of tests: {other:?}", entry.context),
    }
}

fn rolled_at_least(entry: &DiceLogEntry, value: u8) -> u32 {
    entry.rolls.iter().filter(|&&r| r >= value).count() as u32
}

fn total(entry: &DiceLogEntry) -> u32 {
    match entry.outcome {
        LogOutcome::Total { value } | LogOutcome::Automatic { value } => value,
        ref other => panic!("{:?} has no total: {other:?}", entry.context),
    }
}

/// One model with plenty of wounds and no armour save worth rolling
fn sponge(x: f64, keywords: UnitKeywords) -> Unit {
    squad(2, 1, keywords, x, 1, 200).with_stats(UnitStats {
        save: 7,
        ..UnitStats::default()
    })
}

fn attack(weapon: u32, models: &[u32]) -> ActionRequest {
    ActionRequest::Attack {
        attacker: UnitId(1),
        kind: AttackKind::Shooting,
        assignments: models
            .iter()
            .map(|&m| WeaponAssignment::new(ModelId(m), WeaponId(weapon), UnitId(2)))
            .collect(),
    }
}

#[test]
fn test_natural_one_fails_even_the_best_save_in_cover() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "flamer", 12.0)
            .with_stats(DiceExpr::fixed(12), 0, 10, 0, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::Torrent),
    );
    let mut targets = squad(2, 1, UnitKeywords::INFANTRY, 10.0, 1, 50).with_stats(UnitStats {
        toughness: 3,
        save: 2,
        ..UnitStats::default()
    });
    targets.models[0].invulnerable_save = Some(2);
    let ruin = TerrainFeature::rectangle(
        TerrainId(1),
        Position::new(9.0, -1.0),
        Position::new(11.0, 1.0),
        HeightClass::Low,
    );
    let board = BoardSnapshot::new(vec![shooters, targets], vec![ruin]);

    let mut ones_seen = 0;
    for seed in 0..50 {
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        assert!(result.success, "{:?}", result.reasons);

        let saves = entry(&result, DiceContext::SaveRoll);
        let ones = saves.ones() as u32;
        match saves.outcome {
            LogOutcome::Tests { successes, failures, auto_failed, .. } => {
                assert_eq!(auto_failed, ones);
                assert_eq!(failures, ones);
                assert_eq!(successes as usize, saves.rolls.len() - ones as usize);
            }
            ref other => panic!("unexpected save outcome {other:?}"),
        }

        let after = board.apply_diffs(&result.diffs).unwrap();
        assert_eq!(wounds_lost(&board, &after, UnitId(2)), ones);
        ones_seen += ones;
    }
    assert!(ones_seen > 0);
}

#[test]
fn test_blast_adds_attacks_per_five_models() {
    let engine = RulesEngine::default();
    let launcher = WeaponProfile::ranged(WeaponId(1), "frag launcher", 36.0)
        .with_stats(DiceExpr::fixed(1), 4, 4, 0, DiceExpr::fixed(1))
        .with_keyword(WeaponKeyword::Blast);

    for (models, expected) in [(4, 1), (5, 2), (10, 3), (15, 4)] {
        let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(launcher.clone());
        let targets = squad(2, 1, UnitKeywords::INFANTRY, 20.0, models, 1);
        let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

        let result = engine.resolve_seeded(&board, &attack(1, &[1]), 3);
        assert_eq!(
            entry(&result, DiceContext::Attacks).outcome,
            LogOutcome::Total { value: expected },
            "{models} target models"
        );
    }
}

#[test]
fn test_torrent_skips_the_hit_roll() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 2, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "flamer", 12.0)
            .with_stats(DiceExpr::fixed(3), 0, 4, 0, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::Torrent),
    );
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 8.0, 5, 1);
    let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

    let result = engine.resolve_seeded(&board, &attack(1, &[1, 2]), 11);
    let hits = entry(&result, DiceContext::HitRoll);
    assert!(hits.rolls.is_empty());
    assert_eq!(hits.outcome, LogOutcome::Automatic { value: 6 });
    assert_eq!(entry(&result, DiceContext::WoundRoll).rolls.len(), 6);
}

#[test]
fn test_log_follows_resolution_order() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 3, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "bolter", 24.0).with_stats(DiceExpr::fixed(2), 3, 4, 0, DiceExpr::fixed(1)),
    );
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 12.0, 5, 1);
    let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

    let result = engine.resolve_seeded(&board, &attack(1, &[1, 2, 3]), 5);
    let contexts: Vec<DiceContext> = result.dice_log.iter().map(|e| e.context).collect();
    assert_eq!(
        contexts,
        vec![
            DiceContext::Attacks,
            DiceContext::HitRoll,
            DiceContext::WoundRoll,
            DiceContext::SaveRoll,
            DiceContext::Damage,
        ]
    );
}

#[test]
fn test_rejected_attack_rolls_nothing() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "pistol", 12.0).with_stats(DiceExpr::fixed(1), 3, 4, 0, DiceExpr::fixed(1)),
    );
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 30.0, 1, 1);
    let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

    let result = engine.resolve_seeded(&board, &attack(1, &[1]), 1);
    assert!(!result.success);
    assert!(result.diffs.is_empty());
    assert!(result.dice_log.is_empty());
    assert!(result.mentions("range"));
}

fn plasma_board(keywords: UnitKeywords, wounds: u32) -> BoardSnapshot {
    let gunners = squad(1, 0, keywords, 0.0, 3, wounds).with_weapon(
        WeaponProfile::ranged(WeaponId(7), "plasma gun", 24.0)
            .with_stats(DiceExpr::fixed(1), 3, 8, -3, DiceExpr::fixed(2))
            .with_keyword(WeaponKeyword::Hazardous),
    );
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 12.0, 5, 1);
    BoardSnapshot::new(vec![gunners, targets], vec![])
}

#[test]
fn test_hazardous_character_takes_mortal_wounds_per_one() {
    let engine = RulesEngine::default();
    let board = plasma_board(UnitKeywords::INFANTRY | UnitKeywords::CHARACTER, 10);
    let check = hazardous_check_for(&board, &attack(7, &[1, 2, 3])).unwrap();

    let mut triggered_runs = 0;
    for seed in 0..200 {
        let result = engine.resolve_seeded(&board, &check, seed);
        assert!(result.success);
        let hazardous = entry(&result, DiceContext::Hazardous);
        assert_eq!(hazardous.rolls.len(), 3);
        let ones = hazardous.ones() as u32;
        assert_eq!(hazardous.outcome, LogOutcome::Triggered { count: ones });

        let after = board.apply_diffs(&result.diffs).unwrap();
        assert_eq!(wounds_lost(&board, &after, UnitId(1)), 3 * ones);
        if ones > 0 {
            triggered_runs += 1;
        }
    }
    assert!(triggered_runs > 0);
}

#[test]
fn test_hazardous_infantry_loses_one_model_per_one() {
    let engine = RulesEngine::default();
    let board = plasma_board(UnitKeywords::INFANTRY, 1);
    let check = hazardous_check_for(&board, &attack(7, &[1, 2, 3])).unwrap();

    let mut triggered_runs = 0;
    for seed in 0..200 {
        let result = engine.resolve_seeded(&board, &check, seed);
        let ones = entry(&result, DiceContext::Hazardous).ones();

        let slain = result
            .diffs
            .iter()
            .filter(|d| matches!(d, Diff::ModelAlive { alive: false, .. }))
            .count();
        assert_eq!(slain, ones);

        let after = board.apply_diffs(&result.diffs).unwrap();
        assert_eq!(after.unit(UnitId(1)).unwrap().alive_count(), 3 - ones);
        if ones > 0 {
            triggered_runs += 1;
        }
    }
    assert!(triggered_runs > 0);
}

#[test]
fn test_no_hazardous_check_without_hazardous_weapons() {
    let gunners = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 3, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(7), "bolter", 24.0).with_stats(DiceExpr::fixed(2), 3, 4, 0, DiceExpr::fixed(1)),
    );
    let board = BoardSnapshot::new(vec![gunners, squad(2, 1, UnitKeywords::INFANTRY, 12.0, 5, 1)], vec![]);
    assert!(hazardous_check_for(&board, &attack(7, &[1, 2, 3])).is_none());
}

#[test]
fn test_lethal_and_devastating_wounds_on_one_weapon() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "needle rifle", 24.0)
            .with_stats(DiceExpr::fixed(12), 4, 4, 0, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::LethalHits)
            .with_keyword(WeaponKeyword::DevastatingWounds),
    );
    let board = BoardSnapshot::new(vec![shooters, sponge(12.0, UnitKeywords::INFANTRY)], vec![]);

    let (mut lethal_seen, mut devastating_seen) = (0, 0);
    for seed in 0..40 {
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        assert!(result.success, "{:?}", result.reasons);

        let hit = entry(&result, DiceContext::HitRoll);
        let (hits, critical_hits, _) = tally(hit);
        assert_eq!(hits, rolled_at_least(hit, 4));
        assert_eq!(critical_hits, rolled_at_least(hit, 6));

        // Critical hits skip the wound roll
        let wound = entry(&result, DiceContext::WoundRoll);
        assert_eq!(wound.rolls.len() as u32, hits - critical_hits);
        assert_eq!(wound.parameters["lethal_hits"], serde_json::json!(critical_hits));
        let (wounds, critical_wounds, _) = tally(wound);
        assert_eq!(wounds, rolled_at_least(wound, 4));
        assert_eq!(critical_wounds, rolled_at_least(wound, 6));

        // Critical wounds skip saves and come back as mortal wounds
        let saves = entry(&result, DiceContext::SaveRoll);
        assert_eq!(saves.rolls.len() as u32, wounds - critical_wounds + critical_hits);
        let damage = entry(&result, DiceContext::Damage);
        assert_eq!(damage.parameters["mortal_wounds"], serde_json::json!(critical_wounds));
        assert_eq!(total(damage), saves.rolls.len() as u32 + critical_wounds);

        let after = board.apply_diffs(&result.diffs).unwrap();
        assert_eq!(wounds_lost(&board, &after, UnitId(2)), total(damage));
        lethal_seen += critical_hits;
        devastating_seen += critical_wounds;
    }
    assert!(lethal_seen > 0 && devastating_seen > 0);
}

#[test]
fn test_devastating_wounds_spill_over_models() {
    let engine = RulesEngine::default();
    // Strength 1 against toughness 8 only wounds on a 6, so every wound is critical
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "rupture cannon", 24.0)
            .with_stats(DiceExpr::fixed(6), 0, 1, 0, DiceExpr::fixed(3))
            .with_keyword(WeaponKeyword::Torrent)
            .with_keyword(WeaponKeyword::DevastatingWounds),
    );
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 12.0, 10, 1).with_stats(UnitStats {
        toughness: 8,
        save: 2,
        ..UnitStats::default()
    });
    let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

    let mut spilled = 0;
    for seed in 0..60 {
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        let wound = entry(&result, DiceContext::WoundRoll);
        let (wounds, critical_wounds, _) = tally(wound);
        assert_eq!(wounds, critical_wounds);
        assert!(entry(&result, DiceContext::SaveRoll).rolls.is_empty());

        let after = board.apply_diffs(&result.diffs).unwrap();
        let slain = 10 - after.unit(UnitId(2)).unwrap().alive_count() as u32;
        assert_eq!(slain, (3 * critical_wounds).min(10));
        spilled += slain;
    }
    assert!(spilled > 0);
}

#[test]
fn test_anti_lowers_the_critical_wound_with_blast_and_torrent() {
    let engine = RulesEngine::default();
    let launcher = WeaponProfile::ranged(WeaponId(1), "krak launcher", 36.0)
        .with_stats(DiceExpr::fixed(8), 0, 1, 0, DiceExpr::fixed(1))
        .with_keyword(WeaponKeyword::Blast)
        .with_keyword(WeaponKeyword::Torrent)
        .with_keyword(WeaponKeyword::Anti { keyword: UnitKeywords::VEHICLE, threshold: 4 });

    for (keywords, critical_on) in [(UnitKeywords::VEHICLE, 4u8), (UnitKeywords::INFANTRY, 6)] {
        let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(launcher.clone());
        let targets = squad(2, 1, keywords, 12.0, 10, 100);
        let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

        for seed in 0..10 {
            let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
            // Eight attacks plus two for ten target models, none of them rolled to hit
            assert_eq!(entry(&result, DiceContext::HitRoll).outcome, LogOutcome::Automatic { value: 10 });

            let wound = entry(&result, DiceContext::WoundRoll);
            assert_eq!(wound.rolls.len(), 10);
            assert_eq!(wound.parameters["critical_on"], serde_json::json!(critical_on));
            let (wounds, critical_wounds, failures) = tally(wound);
            assert_eq!(wounds, rolled_at_least(wound, critical_on));
            assert_eq!(critical_wounds, wounds);
            assert_eq!(failures, 10 - wounds);
        }
    }
}

#[test]
fn test_twin_linked_rerolls_only_the_failed_wounds() {
    let engine = RulesEngine::default();
    let cannon = |twin: bool| {
        let weapon = WeaponProfile::ranged(WeaponId(1), "twin autocannon", 48.0)
            .with_stats(DiceExpr::fixed(12), 0, 4, 0, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::Torrent);
        if twin {
            weapon.with_keyword(WeaponKeyword::TwinLinked)
        } else {
            weapon
        }
    };

    let mut rerolled_any = false;
    for seed in 0..20 {
        let board = BoardSnapshot::new(
            vec![
                squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(cannon(true)),
                sponge(20.0, UnitKeywords::INFANTRY),
            ],
            vec![],
        );
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        let wound = entry(&result, DiceContext::WoundRoll);
        let (wounds, _, failures) = tally(wound);
        assert_eq!(wounds, rolled_at_least(wound, 4));

        let saves = entry(&result, DiceContext::SaveRoll).rolls.len() as u32;
        match result.dice_log.iter().find(|e| e.context == DiceContext::WoundReroll) {
            Some(reroll) => {
                rerolled_any = true;
                assert_eq!(reroll.rolls.len() as u32, failures);
                let (rerolled, _, _) = tally(reroll);
                assert_eq!(rerolled, rolled_at_least(reroll, 4));
                assert_eq!(saves, wounds + rerolled);
            }
            None => {
                assert_eq!(failures, 0);
                assert_eq!(saves, wounds);
            }
        }

        let board = BoardSnapshot::new(
            vec![
                squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(cannon(false)),
                sponge(20.0, UnitKeywords::INFANTRY),
            ],
            vec![],
        );
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        assert!(result.dice_log.iter().all(|e| e.context != DiceContext::WoundReroll));
    }
    assert!(rerolled_any);
}

#[test]
fn test_rapid_fire_and_melta_inside_half_range() {
    let engine = RulesEngine::default();
    let fusion = WeaponProfile::ranged(WeaponId(1), "fusion gun", 24.0)
        .with_stats(DiceExpr::fixed(1), 0, 20, 0, DiceExpr::fixed(1))
        .with_keyword(WeaponKeyword::Torrent)
        .with_keyword(WeaponKeyword::RapidFire(DiceExpr::fixed(2)))
        .with_keyword(WeaponKeyword::Melta(DiceExpr::fixed(2)));

    // Model 1 stands inside 12", model 2 beyond it
    let close = Unit::new(UnitId(1), PlayerId(0), UnitKeywords::INFANTRY)
        .with_model(Model::new(ModelId(1), Position::new(9.0, 0.0), 1))
        .with_model(Model::new(ModelId(2), Position::new(0.0, 3.0), 1))
        .with_weapon(fusion.clone());
    let far = Unit::new(UnitId(1), PlayerId(0), UnitKeywords::INFANTRY)
        .with_model(Model::new(ModelId(1), Position::new(0.0, -3.0), 1))
        .with_model(Model::new(ModelId(2), Position::new(0.0, 3.0), 1))
        .with_weapon(fusion);

    for (shooters, attacks, damage_per_wound, melta) in [(close, 4, 3, true), (far, 2, 1, false)] {
        let board = BoardSnapshot::new(vec![shooters, sponge(20.0, UnitKeywords::INFANTRY)], vec![]);
        for seed in 0..10 {
            let result = engine.resolve_seeded(&board, &attack(1, &[1, 2]), seed);
            assert!(result.success, "{:?}", result.reasons);
            let attacks_entry = entry(&result, DiceContext::Attacks);
            assert_eq!(total(attacks_entry), attacks);
            assert_eq!(attacks_entry.parameters["half_range_models"], serde_json::json!(u32::from(melta)));

            let (wounds, _, _) = tally(entry(&result, DiceContext::WoundRoll));
            let damage = entry(&result, DiceContext::Damage);
            assert_eq!(damage.parameters["melta"], serde_json::json!(melta));
            assert_eq!(total(damage), wounds * damage_per_wound);
        }
    }
}

#[test]
fn test_heavy_and_lance_modifiers_follow_unit_status() {
    let engine = RulesEngine::default();
    let base = 32.0 / 25.4;
    let statused = |status: Option<StatusKind>| {
        let mut unit = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1)
            .with_weapon(
                WeaponProfile::ranged(WeaponId(1), "lascannon", 48.0)
                    .with_stats(DiceExpr::fixed(6), 4, 4, 0, DiceExpr::fixed(1))
                    .with_keyword(WeaponKeyword::Heavy),
            )
            .with_weapon(
                WeaponProfile::melee(WeaponId(2), "power lance")
                    .with_stats(DiceExpr::fixed(6), 4, 4, 0, DiceExpr::fixed(1))
                    .with_keyword(WeaponKeyword::Lance),
            );
        if let Some(kind) = status {
            unit.status.insert(kind, StatusEffect::new(Expiry::EndOfTurn, "test"));
        }
        unit
    };
    let needed = |result: &ResolutionResult, context: DiceContext| entry(result, context).parameters["needed"].clone();

    // Shooting from afar: Heavy helps only a unit that stood still
    for (status, hit_needed) in [(Some(StatusKind::RemainedStationary), 3), (None, 4)] {
        let board = BoardSnapshot::new(vec![statused(status), sponge(20.0, UnitKeywords::INFANTRY)], vec![]);
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), 2);
        assert!(result.success, "{:?}", result.reasons);
        assert_eq!(needed(&result, DiceContext::HitRoll), serde_json::json!(hit_needed));
    }

    // Fighting: Lance helps only a unit that charged
    for (status, wound_needed) in [(Some(StatusKind::Charged), 3), (None, 4)] {
        let board = BoardSnapshot::new(
            vec![statused(status), sponge(base + 0.5, UnitKeywords::INFANTRY)],
            vec![],
        );
        let fight = ActionRequest::Attack {
            attacker: UnitId(1),
            kind: AttackKind::Melee,
            assignments: vec![WeaponAssignment::new(ModelId(1), WeaponId(2), UnitId(2))],
        };
        let result = engine.resolve_seeded(&board, &fight, 2);
        assert!(result.success, "{:?}", result.reasons);
        assert_eq!(needed(&result, DiceContext::WoundRoll), serde_json::json!(wound_needed));
    }
}

#[test]
fn test_feel_no_pain_rolls_for_every_point_of_damage() {
    let engine = RulesEngine::default();
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1).with_weapon(
        WeaponProfile::ranged(WeaponId(1), "heavy bolter", 36.0)
            .with_stats(DiceExpr::fixed(10), 0, 20, -1, DiceExpr::fixed(2))
            .with_keyword(WeaponKeyword::Torrent),
    );
    let mut targets = sponge(20.0, UnitKeywords::INFANTRY);
    targets.stats.feel_no_pain = Some(5);
    let board = BoardSnapshot::new(vec![shooters, targets], vec![]);

    for seed in 0..20 {
        let result = engine.resolve_seeded(&board, &attack(1, &[1]), seed);
        let unsaved = entry(&result, DiceContext::SaveRoll).rolls.len() as u32;
        let fnp = entry(&result, DiceContext::FeelNoPain);
        assert_eq!(fnp.rolls.len() as u32, 2 * unsaved);
        let (ignored, _, _) = tally(fnp);
        assert_eq!(ignored, rolled_at_least(fnp, 5));

        let damage = total(entry(&result, DiceContext::Damage));
        assert_eq!(damage, 2 * unsaved - ignored);
        let after = board.apply_diffs(&result.diffs).unwrap();
        assert_eq!(wounds_lost(&board, &after, UnitId(2)), damage);
    }
}

#[test]
fn test_cover_improves_the_save_unless_ignored() {
    let engine = RulesEngine::default();
    let flamer = |id: u32| {
        WeaponProfile::ranged(WeaponId(id), "flamer", 24.0)
            .with_stats(DiceExpr::fixed(12), 0, 20, 0, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::Torrent)
    };
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1)
        .with_weapon(flamer(1))
        .with_weapon(flamer(2).with_keyword(WeaponKeyword::IgnoresCover));
    let targets = squad(2, 1, UnitKeywords::INFANTRY, 10.0, 1, 200).with_stats(UnitStats {
        save: 4,
        ..UnitStats::default()
    });
    let crater = TerrainFeature::rectangle(
        TerrainId(1),
        Position::new(9.0, -1.0),
        Position::new(11.0, 1.0),
        HeightClass::Low,
    );
    let board = BoardSnapshot::new(vec![shooters, targets], vec![crater]);

    for seed in 0..20 {
        for (weapon, save_needed) in [(1, 3u8), (2, 4)] {
            let result = engine.resolve_seeded(&board, &attack(weapon, &[1]), seed);
            let saves = entry(&result, DiceContext::SaveRoll);
            let (saved, _, failures) = tally(saves);
            assert_eq!(saved, rolled_at_least(saves, save_needed));
            assert_eq!(failures as usize, saves.rolls.len() - saved as usize);
        }
    }
}

#[test]
fn test_blast_counts_the_target_before_casualties() {
    let engine = RulesEngine::default();
    let blast = |id: u32, attacks: u8| {
        WeaponProfile::ranged(WeaponId(id), "frag cannon", 24.0)
            .with_stats(DiceExpr::fixed(attacks), 0, 20, -6, DiceExpr::fixed(1))
            .with_keyword(WeaponKeyword::Torrent)
            .with_keyword(WeaponKeyword::Blast)
    };
    let shooters = squad(1, 0, UnitKeywords::INFANTRY, 0.0, 1, 1)
        .with_weapon(blast(1, 2))
        .with_weapon(blast(2, 1));
    let board = BoardSnapshot::new(vec![shooters, squad(2, 1, UnitKeywords::INFANTRY, 12.0, 5, 1)], vec![]);
    let request = ActionRequest::Attack {
        attacker: UnitId(1),
        kind: AttackKind::Shooting,
        assignments: vec![
            WeaponAssignment::new(ModelId(1), WeaponId(1), UnitId(2)),
            WeaponAssignment::new(ModelId(1), WeaponId(2), UnitId(2)),
        ],
    };

    let mut casualties = 0;
    for seed in 0..10 {
        let result = engine.resolve_seeded(&board, &request, seed);
        let volleys: Vec<&DiceLogEntry> = result
            .dice_log
            .iter()
            .filter(|e| e.context == DiceContext::Attacks)
            .collect();
        assert_eq!(volleys.len(), 2);
        assert!(volleys.iter().all(|e| e.parameters["blast_bonus"] == serde_json::json!(1)));
        assert_eq!(total(volleys[1]), 2);

        let after = board.apply_diffs(&result.diffs).unwrap();
        casualties += 5 - after.unit(UnitId(2)).unwrap().alive_count();
    }
    assert!(casualties > 0);
}
