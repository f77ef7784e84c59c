//! Audit trail of raw dice and their interpretation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a batch of dice was rolled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceContext {
    Attacks,
    HitRoll,
    SustainedHits,
    WoundRoll,
    WoundReroll,
    SaveRoll,
    Damage,
    FeelNoPain,
    Hazardous,
}

/// Interpreted result of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogOutcome {
    /// A rolled quantity such as attacks or damage
    Total { value: u32 },
    /// A batch of pass/fail tests
    Tests {
        successes: u32,
        criticals: u32,
        failures: u32,
        auto_failed: u32,
    },
    /// Self-damage triggers
    Triggered { count: u32 },
    /// Nothing was rolled; the outcome was forced
    Automatic { value: u32 },
}

/// One batch of dice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceLogEntry {
    pub context: DiceContext,
    pub rolls: Vec<u8>,
    pub outcome: LogOutcome,
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl DiceLogEntry {
    pub fn new(context: DiceContext, rolls: Vec<u8>, outcome: LogOutcome) -> Self {
        Self {
            context,
            rolls,
            outcome,
            parameters: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Raw 1s in this batch
    pub fn ones(&self) -> usize {
        self.rolls.iter().filter(|&&r| r == 1).count()
    }
}
