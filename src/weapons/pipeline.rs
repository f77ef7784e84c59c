//! Expected-value pipeline: base profile to effective profile
//!
//! Used by the scoring layer to rank candidate attacks without rolling.
//! Stages run in a fixed order and each touches one axis (attacks, hit,
//! wound, save or damage), so the order only matters where a later stage
//! reads an earlier axis: sustained and lethal hits read the hit chance.

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::dice::thresholds::{best_save, p_success, p_unsaved, roll_needed, wound_threshold, CRITICAL_ROLL};
use crate::units::keywords::UnitKeywords;
use crate::units::status::StatusKind;
use crate::units::unit::Unit;
use crate::weapons::keywords::{
    anti_threshold_against, blast_bonus_attacks, half_range_applies, melta_bonus,
    rapid_fire_bonus, sustained_hits, KeywordKind,
};
use crate::weapons::profile::WeaponProfile;

/// How far the target is, if known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "band", content = "inches", rename_all = "snake_case")]
pub enum RangeBand {
    Known(f64),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AutoHit,
    Blast,
    HalfRangeAttacks,
    HalfRangeDamage,
    Anti,
    SustainedHits,
    LethalHits,
    DevastatingWounds,
}

/// Order the stages run in
pub const STAGE_ORDER: [PipelineStage; 8] = [
    PipelineStage::AutoHit,
    PipelineStage::Blast,
    PipelineStage::HalfRangeAttacks,
    PipelineStage::HalfRangeDamage,
    PipelineStage::Anti,
    PipelineStage::SustainedHits,
    PipelineStage::LethalHits,
    PipelineStage::DevastatingWounds,
];

/// What the pipeline needs to know about the attacker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerContext {
    pub remained_stationary: bool,
    pub charged: bool,
}

impl AttackerContext {
    pub fn from_unit(unit: &Unit) -> Self {
        Self {
            remained_stationary: unit.has_status(StatusKind::RemainedStationary),
            charged: unit.has_status(StatusKind::Charged),
        }
    }
}

/// What the pipeline needs to know about the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetContext {
    pub model_count: usize,
    pub toughness: u8,
    pub save: u8,
    pub invulnerable_save: Option<u8>,
    pub keywords: UnitKeywords,
    pub in_cover: bool,
}

impl TargetContext {
    /// Uses the first alive model's invulnerable save
    pub fn from_unit(unit: &Unit, in_cover: bool) -> Self {
        Self {
            model_count: unit.alive_count(),
            toughness: unit.stats.toughness,
            save: unit.stats.save,
            invulnerable_save: unit.alive_models().next().and_then(|m| m.invulnerable_save),
            keywords: unit.keywords,
            in_cover,
        }
    }
}

/// Expected per-model characteristics after every applicable stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveProfile {
    pub attacks: f64,
    pub hit_probability: f64,
    pub wound_probability: f64,
    pub unsaved_probability: f64,
    pub damage: f64,
    pub auto_hit: bool,
    pub stages_applied: Vec<PipelineStage>,
}

impl EffectiveProfile {
    pub fn expected_unsaved_wounds(&self) -> f64 {
        self.attacks * self.hit_probability * self.wound_probability * self.unsaved_probability
    }

    pub fn expected_damage(&self) -> f64 {
        self.expected_unsaved_wounds() * self.damage
    }
}

/// Weight of a half-range bonus for this range band
fn half_range_weight(weapon: &WeaponProfile, range: RangeBand, config: &RulesConfig) -> f64 {
    match range {
        RangeBand::Known(distance) if half_range_applies(weapon.range, distance) => 1.0,
        RangeBand::Known(_) => 0.0,
        RangeBand::Unknown => config.unknown_range_half_probability,
    }
}

/// Chance of an unmodified critical roll
fn p_critical(critical_on: u8) -> f64 {
    p_success(critical_on)
}

/// Run every stage for one weapon against one target
pub fn effective_profile(
    weapon: &WeaponProfile,
    attacker: &AttackerContext,
    target: &TargetContext,
    range: RangeBand,
    config: &RulesConfig,
) -> EffectiveProfile {
    let mut hit_mods = Vec::new();
    if weapon.has(KeywordKind::Heavy) && attacker.remained_stationary && !weapon.is_melee() {
        hit_mods.push(1);
    }
    let mut wound_mods = Vec::new();
    if weapon.has(KeywordKind::Lance) && attacker.charged {
        wound_mods.push(1);
    }

    let mut wound_probability =
        p_success(roll_needed(wound_threshold(weapon.strength, target.toughness), &wound_mods));
    if weapon.has(KeywordKind::TwinLinked) {
        wound_probability += (1.0 - wound_probability) * wound_probability;
    }

    let in_cover = target.in_cover && !weapon.has(KeywordKind::IgnoresCover);
    let save = best_save(target.save, weapon.ap, target.invulnerable_save, in_cover);

    let mut profile = EffectiveProfile {
        attacks: weapon.attacks.mean(),
        hit_probability: p_success(roll_needed(weapon.skill, &hit_mods)),
        wound_probability,
        unsaved_probability: p_unsaved(save),
        damage: weapon.damage.mean(),
        auto_hit: false,
        stages_applied: Vec::new(),
    };
    let mut critical_wound_chance = p_critical(CRITICAL_ROLL);

    for stage in STAGE_ORDER {
        let fired = match stage {
            PipelineStage::AutoHit => {
                if weapon.is_torrent() {
                    profile.hit_probability = 1.0;
                    profile.auto_hit = true;
                }
                profile.auto_hit
            }
            PipelineStage::Blast => {
                let bonus = blast_bonus_attacks(target.model_count);
                if weapon.has(KeywordKind::Blast) && bonus > 0 {
                    profile.attacks += bonus as f64;
                    true
                } else {
                    false
                }
            }
            PipelineStage::HalfRangeAttacks => match rapid_fire_bonus(weapon) {
                Some(bonus) => {
                    let weight = half_range_weight(weapon, range, config);
                    profile.attacks += bonus.mean() * weight;
                    weight > 0.0
                }
                None => false,
            },
            PipelineStage::HalfRangeDamage => match melta_bonus(weapon) {
                Some(bonus) => {
                    let weight = half_range_weight(weapon, range, config);
                    profile.damage += bonus.mean() * weight;
                    weight > 0.0
                }
                None => false,
            },
            PipelineStage::Anti => match anti_threshold_against(weapon, target.keywords) {
                Some(threshold) => {
                    let p_crit = p_critical(threshold);
                    profile.wound_probability =
                        (1.0 - p_crit) * profile.wound_probability + p_crit;
                    critical_wound_chance = critical_wound_chance.max(p_crit);
                    true
                }
                None => false,
            },
            PipelineStage::SustainedHits => match sustained_hits(weapon) {
                Some(extra) if !profile.auto_hit && profile.hit_probability > 0.0 => {
                    let p_hit = profile.hit_probability;
                    profile.attacks *= (p_hit + extra.mean() * p_critical(CRITICAL_ROLL)) / p_hit;
                    true
                }
                _ => false,
            },
            PipelineStage::LethalHits => {
                if weapon.has(KeywordKind::LethalHits) && !profile.auto_hit && profile.hit_probability > 0.0 {
                    // Critical hits skip the wound roll
                    let p_hit = profile.hit_probability;
                    let p_crit = p_critical(CRITICAL_ROLL);
                    profile.wound_probability =
                        ((p_hit - p_crit) * profile.wound_probability + p_crit) / p_hit;
                    true
                } else {
                    false
                }
            }
            PipelineStage::DevastatingWounds => {
                if weapon.has(KeywordKind::DevastatingWounds) && profile.wound_probability > 0.0 {
                    // Critical wounds bypass the save
                    let w = profile.wound_probability;
                    let p_crit = critical_wound_chance.min(w);
                    profile.unsaved_probability = (p_crit + (w - p_crit) * profile.unsaved_probability) / w;
                    true
                } else {
                    false
                }
            }
        };
        if fired {
            profile.stages_applied.push(stage);
        }
    }

    profile
}
