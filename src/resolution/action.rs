//! Action requests submitted by the decision layer

use serde::{Deserialize, Serialize};

use crate::core::types::{ModelId, UnitId, WeaponId};
use crate::movement::path::ModelPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Shooting,
    Melee,
}

/// One model firing or swinging one weapon at one target unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponAssignment {
    pub model: ModelId,
    pub weapon: WeaponId,
    pub target: UnitId,
}

impl WeaponAssignment {
    pub fn new(model: ModelId, weapon: WeaponId, target: UnitId) -> Self {
        Self { model, weapon, target }
    }
}

/// A structured action to resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Attack {
        attacker: UnitId,
        kind: AttackKind,
        assignments: Vec<WeaponAssignment>,
    },
    ChargeMove {
        unit: UnitId,
        targets: Vec<UnitId>,
        /// The 2D6 charge roll, already rolled by the sequencer
        roll: u8,
        paths: Vec<ModelPath>,
    },
    PileIn {
        unit: UnitId,
        paths: Vec<ModelPath>,
    },
    Consolidate {
        unit: UnitId,
        paths: Vec<ModelPath>,
    },
    HazardousCheck {
        unit: UnitId,
        /// Models that fired a hazardous weapon
        models: Vec<ModelId>,
    },
}

impl ActionRequest {
    /// The unit performing the action
    pub fn actor(&self) -> UnitId {
        match self {
            ActionRequest::Attack { attacker, .. } => *attacker,
            ActionRequest::ChargeMove { unit, .. }
            | ActionRequest::PileIn { unit, .. }
            | ActionRequest::Consolidate { unit, .. }
            | ActionRequest::HazardousCheck { unit, .. } => *unit,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::Attack { kind: AttackKind::Shooting, .. } => "shooting",
            ActionRequest::Attack { kind: AttackKind::Melee, .. } => "melee",
            ActionRequest::ChargeMove { .. } => "charge",
            ActionRequest::PileIn { .. } => "pile_in",
            ActionRequest::Consolidate { .. } => "consolidate",
            ActionRequest::HazardousCheck { .. } => "hazardous",
        }
    }
}
