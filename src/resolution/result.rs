//! What every resolver returns: absolute diffs, dice log and reasons

use serde::{Deserialize, Serialize};

use crate::core::types::{ModelId, Position, UnitId};
use crate::dice::log::DiceLogEntry;
use crate::units::status::{StatusEffect, StatusKind};

/// One state change, carrying the new absolute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "diff", rename_all = "snake_case")]
pub enum Diff {
    ModelWounds {
        unit: UnitId,
        model: ModelId,
        current_wounds: u32,
    },
    ModelAlive {
        unit: UnitId,
        model: ModelId,
        alive: bool,
    },
    ModelPosition {
        unit: UnitId,
        model: ModelId,
        position: Position,
    },
    /// `None` clears the status
    UnitStatus {
        unit: UnitId,
        status: StatusKind,
        effect: Option<StatusEffect>,
    },
}

impl Diff {
    /// Address of the changed field, e.g. `units/7/models/3/current_wounds`
    pub fn path(&self) -> String {
        match self {
            Diff::ModelWounds { unit, model, .. } => format!("units/{unit}/models/{model}/current_wounds"),
            Diff::ModelAlive { unit, model, .. } => format!("units/{unit}/models/{model}/alive"),
            Diff::ModelPosition { unit, model, .. } => format!("units/{unit}/models/{model}/position"),
            Diff::UnitStatus { unit, status, .. } => format!("units/{unit}/status/{}", status.as_str()),
        }
    }

    pub fn unit(&self) -> UnitId {
        match self {
            Diff::ModelWounds { unit, .. }
            | Diff::ModelAlive { unit, .. }
            | Diff::ModelPosition { unit, .. }
            | Diff::UnitStatus { unit, .. } => *unit,
        }
    }
}

/// A violated rule and a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub rule: String,
    pub message: String,
}

impl Reason {
    pub fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Outcome of resolving one action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub success: bool,
    pub diffs: Vec<Diff>,
    pub dice_log: Vec<DiceLogEntry>,
    pub reasons: Vec<Reason>,
}

impl ResolutionResult {
    pub fn accepted(diffs: Vec<Diff>, dice_log: Vec<DiceLogEntry>) -> Self {
        Self {
            success: true,
            diffs,
            dice_log,
            reasons: Vec::new(),
        }
    }

    /// Rejected results carry no diffs
    pub fn rejected(reasons: Vec<Reason>) -> Self {
        tracing::debug!(count = reasons.len(), first = ?reasons.first(), "action rejected");
        Self {
            success: false,
            diffs: Vec::new(),
            dice_log: Vec::new(),
            reasons,
        }
    }

    /// Any reason mentions `needle` in its rule or message
    pub fn mentions(&self, needle: &str) -> bool {
        self.reasons
            .iter()
            .any(|r| r.rule.contains(needle) || r.message.contains(needle))
    }
}
