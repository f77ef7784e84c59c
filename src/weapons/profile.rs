//! Weapon profiles as loaded from structured data

use serde::{Deserialize, Serialize};

use crate::core::types::WeaponId;
use crate::dice::expression::DiceExpr;
use crate::weapons::keywords::{has_keyword, KeywordKind, WeaponKeyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Ranged,
    Melee,
}

/// Base characteristics of one weapon. Shared between models via `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub id: WeaponId,
    #[serde(default)]
    pub name: String,
    pub class: WeaponClass,
    /// Inches; zero for melee weapons
    #[serde(default)]
    pub range: f64,
    pub attacks: DiceExpr,
    /// BS or WS, e.g. 3 for 3+
    pub skill: u8,
    pub strength: u8,
    /// Zero or negative
    #[serde(default)]
    pub ap: i8,
    pub damage: DiceExpr,
    #[serde(default)]
    pub keywords: Vec<WeaponKeyword>,
}

impl WeaponProfile {
    /// A plain ranged weapon: 1 attack, BS 4+, S4, AP0, D1
    pub fn ranged(id: WeaponId, name: impl Into<String>, range: f64) -> Self {
        Self {
            id,
            name: name.into(),
            class: WeaponClass::Ranged,
            range,
            attacks: DiceExpr::fixed(1),
            skill: 4,
            strength: 4,
            ap: 0,
            damage: DiceExpr::fixed(1),
            keywords: Vec::new(),
        }
    }

    /// A plain melee weapon: 1 attack, WS 4+, S4, AP0, D1
    pub fn melee(id: WeaponId, name: impl Into<String>) -> Self {
        Self {
            class: WeaponClass::Melee,
            range: 0.0,
            ..Self::ranged(id, name, 0.0)
        }
    }

    pub fn with_stats(mut self, attacks: DiceExpr, skill: u8, strength: u8, ap: i8, damage: DiceExpr) -> Self {
        self.attacks = attacks;
        self.skill = skill;
        self.strength = strength;
        self.ap = ap.min(0);
        self.damage = damage;
        self
    }

    pub fn with_keyword(mut self, keyword: WeaponKeyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn is_melee(&self) -> bool {
        self.class == WeaponClass::Melee
    }

    pub fn has(&self, kind: KeywordKind) -> bool {
        has_keyword(self, kind)
    }

    pub fn is_torrent(&self) -> bool {
        self.has(KeywordKind::Torrent)
    }

    pub fn is_hazardous(&self) -> bool {
        self.has(KeywordKind::Hazardous)
    }
}
