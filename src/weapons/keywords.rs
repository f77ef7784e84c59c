//! Weapon abilities and the stateless queries the scoring layer calls

use serde::{Deserialize, Serialize};

use crate::dice::expression::DiceExpr;
use crate::units::keywords::UnitKeywords;
use crate::weapons::profile::WeaponProfile;

/// A weapon ability with its parameters, already structured by the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "keyword", content = "value", rename_all = "snake_case")]
pub enum WeaponKeyword {
    /// Hits automatically
    Torrent,
    /// Extra attack per five target models
    Blast,
    /// Extra attacks at half range
    RapidFire(DiceExpr),
    /// Extra damage at half range
    Melta(DiceExpr),
    /// Critical wounds on `threshold`+ against units with `keyword`
    Anti { keyword: UnitKeywords, threshold: u8 },
    /// Critical hits score extra hits
    SustainedHits(DiceExpr),
    /// Critical hits wound automatically
    LethalHits,
    /// Critical wounds ignore saves and become mortal wounds
    DevastatingWounds,
    /// Risky to fire; see the hazardous check
    Hazardous,
    /// Re-roll failed wound rolls
    TwinLinked,
    IgnoresCover,
    /// +1 to hit if the bearer remained stationary
    Heavy,
    /// +1 to wound if the bearer charged
    Lance,
    /// May fire while engaged
    Pistol,
    /// May fire after advancing
    Assault,
}

/// Parameterless discriminant for keyword lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Torrent,
    Blast,
    RapidFire,
    Melta,
    Anti,
    SustainedHits,
    LethalHits,
    DevastatingWounds,
    Hazardous,
    TwinLinked,
    IgnoresCover,
    Heavy,
    Lance,
    Pistol,
    Assault,
}

impl WeaponKeyword {
    pub fn kind(&self) -> KeywordKind {
        match self {
            WeaponKeyword::Torrent => KeywordKind::Torrent,
            WeaponKeyword::Blast => KeywordKind::Blast,
            WeaponKeyword::RapidFire(_) => KeywordKind::RapidFire,
            WeaponKeyword::Melta(_) => KeywordKind::Melta,
            WeaponKeyword::Anti { .. } => KeywordKind::Anti,
            WeaponKeyword::SustainedHits(_) => KeywordKind::SustainedHits,
            WeaponKeyword::LethalHits => KeywordKind::LethalHits,
            WeaponKeyword::DevastatingWounds => KeywordKind::DevastatingWounds,
            WeaponKeyword::Hazardous => KeywordKind::Hazardous,
            WeaponKeyword::TwinLinked => KeywordKind::TwinLinked,
            WeaponKeyword::IgnoresCover => KeywordKind::IgnoresCover,
            WeaponKeyword::Heavy => KeywordKind::Heavy,
            WeaponKeyword::Lance => KeywordKind::Lance,
            WeaponKeyword::Pistol => KeywordKind::Pistol,
            WeaponKeyword::Assault => KeywordKind::Assault,
        }
    }
}

pub fn has_keyword(weapon: &WeaponProfile, kind: KeywordKind) -> bool {
    weapon.keywords.iter().any(|k| k.kind() == kind)
}

/// Extra attacks from Blast: one per five models in the target
pub fn blast_bonus_attacks(target_model_count: usize) -> u32 {
    (target_model_count / 5) as u32
}

/// Half-range bonuses apply at or inside half the weapon's range
pub fn half_range_applies(weapon_range: f64, distance: f64) -> bool {
    weapon_range > 0.0 && distance <= weapon_range / 2.0
}

/// Best Anti threshold that applies against a target's keywords
pub fn anti_threshold_against(weapon: &WeaponProfile, target: UnitKeywords) -> Option<u8> {
    weapon
        .keywords
        .iter()
        .filter_map(|k| match k {
            WeaponKeyword::Anti { keyword, threshold } if target.intersects(*keyword) => {
                Some((*threshold).clamp(2, 6))
            }
            _ => None,
        })
        .min()
}

/// Attacks added by Rapid Fire at half range
pub fn rapid_fire_bonus(weapon: &WeaponProfile) -> Option<DiceExpr> {
    weapon.keywords.iter().find_map(|k| match k {
        WeaponKeyword::RapidFire(expr) => Some(*expr),
        _ => None,
    })
}

pub fn melta_bonus(weapon: &WeaponProfile) -> Option<DiceExpr> {
    weapon.keywords.iter().find_map(|k| match k {
        WeaponKeyword::Melta(expr) => Some(*expr),
        _ => None,
    })
}

pub fn sustained_hits(weapon: &WeaponProfile) -> Option<DiceExpr> {
    weapon.keywords.iter().find_map(|k| match k {
        WeaponKeyword::SustainedHits(expr) => Some(*expr),
        _ => None,
    })
}
