//! Named, time-bounded status effects on units

use serde::{Deserialize, Serialize};

/// Status effects the rules core reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Advanced,
    FellBack,
    RemainedStationary,
    Charged,
    Fought,
    BattleShocked,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Advanced => "advanced",
            StatusKind::FellBack => "fell_back",
            StatusKind::RemainedStationary => "remained_stationary",
            StatusKind::Charged => "charged",
            StatusKind::Fought => "fought",
            StatusKind::BattleShocked => "battle_shocked",
        }
    }
}

/// When a status effect lapses. The sequencer expires them; the core only sets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    EndOfPhase,
    EndOfTurn,
    EndOfBattleRound(u32),
}

/// One status entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub expires: Expiry,
    /// What applied the effect, for audit
    #[serde(default)]
    pub source: String,
}

impl StatusEffect {
    pub fn new(expires: Expiry, source: impl Into<String>) -> Self {
        Self {
            expires,
            source: source.into(),
        }
    }
}
