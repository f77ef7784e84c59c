//! Units: an owned, ordered collection of models plus shared stats

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::{ModelId, PlayerId, UnitId, WeaponId};
use crate::units::keywords::UnitKeywords;
use crate::units::model::Model;
use crate::units::status::{StatusEffect, StatusKind};
use crate::weapons::profile::WeaponProfile;

/// Unit characteristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub toughness: u8,
    /// Armour save, e.g. 3 for a 3+ save
    pub save: u8,
    pub leadership: u8,
    pub objective_control: u8,
    /// Move characteristic in inches
    pub movement: f64,
    #[serde(default)]
    pub feel_no_pain: Option<u8>,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            toughness: 4,
            save: 3,
            leadership: 6,
            objective_control: 2,
            movement: 6.0,
            feel_no_pain: None,
        }
    }
}

/// A unit on the battlefield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    #[serde(default)]
    pub name: String,
    pub models: Vec<Model>,
    #[serde(default)]
    pub keywords: UnitKeywords,
    #[serde(default)]
    pub stats: UnitStats,
    #[serde(default)]
    pub weapons: Vec<Arc<WeaponProfile>>,
    #[serde(default)]
    pub status: BTreeMap<StatusKind, StatusEffect>,
}

impl Unit {
    pub fn new(id: UnitId, owner: PlayerId, keywords: UnitKeywords) -> Self {
        Self {
            id,
            owner,
            name: String::new(),
            models: Vec::new(),
            keywords,
            stats: UnitStats::default(),
            weapons: Vec::new(),
            status: BTreeMap::new(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponProfile) -> Self {
        self.weapons.push(Arc::new(weapon));
        self
    }

    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    /// Derived: no model left alive
    pub fn is_destroyed(&self) -> bool {
        !self.models.iter().any(|m| m.alive)
    }

    pub fn alive_models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().filter(|m| m.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_models().count()
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Arc<WeaponProfile>> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status.contains_key(&kind)
    }

    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.owner != other.owner
    }
}
