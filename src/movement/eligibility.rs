//! Fight eligibility and the pending-fight queue

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::types::{PlayerId, UnitId};
use crate::geometry::measure::units_within_engagement;
use crate::units::keywords::melee_interaction_allowed;
use crate::units::unit::Unit;

/// Units waiting to fight, per side, plus those that already have
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightQueue {
    pub pending: BTreeMap<PlayerId, Vec<UnitId>>,
    pub fought: BTreeSet<UnitId>,
}

impl FightQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, unit: UnitId) -> bool {
        self.pending.values().any(|queue| queue.contains(&unit))
    }

    /// Queued or already fought
    pub fn is_accounted_for(&self, unit: UnitId) -> bool {
        self.fought.contains(&unit) || self.is_pending(unit)
    }

    pub fn push(&mut self, owner: PlayerId, unit: UnitId) {
        let queue = self.pending.entry(owner).or_default();
        if !queue.contains(&unit) {
            queue.push(unit);
        }
    }

    pub fn extend_pending(&mut self, entries: &[(PlayerId, UnitId)]) {
        for &(owner, unit) in entries {
            self.push(owner, unit);
        }
    }

    /// Move a unit from pending to fought
    pub fn mark_fought(&mut self, unit: UnitId) {
        for queue in self.pending.values_mut() {
            queue.retain(|u| *u != unit);
        }
        self.fought.insert(unit);
    }
}

fn engaged_enemies<'a>(board: &'a BoardSnapshot, unit: &'a Unit, config: &'a RulesConfig) -> impl Iterator<Item = &'a Unit> + 'a {
    board
        .enemies_of(unit)
        .filter(move |enemy| melee_interaction_allowed(unit.keywords, enemy.keywords))
        .filter(move |enemy| units_within_engagement(unit, enemy, config))
}

/// Any alive model is within engagement range of an enemy it may fight
pub fn fight_eligible(board: &BoardSnapshot, unit_id: UnitId, config: &RulesConfig) -> bool {
    match board.unit(unit_id) {
        Some(unit) if !unit.is_destroyed() => engaged_enemies(board, unit, config).next().is_some(),
        _ => false,
    }
}

/// Enemy units this unit may attack in melee, in board order
pub fn melee_targets(board: &BoardSnapshot, unit_id: UnitId, config: &RulesConfig) -> Vec<UnitId> {
    match board.unit(unit_id) {
        Some(unit) if !unit.is_destroyed() => engaged_enemies(board, unit, config).map(|u| u.id).collect(),
        _ => Vec::new(),
    }
}

/// Units that are now eligible to fight but neither queued nor fought.
///
/// The whole board is scanned, so a consolidation that drags two other units
/// into range of each other is picked up too.
pub fn rescan_after_consolidation(
    board: &BoardSnapshot,
    queue: &FightQueue,
    config: &RulesConfig,
) -> Vec<(PlayerId, UnitId)> {
    let added: Vec<(PlayerId, UnitId)> = board
        .units
        .iter()
        .filter(|unit| !queue.is_accounted_for(unit.id))
        .filter(|unit| fight_eligible(board, unit.id, config))
        .map(|unit| (unit.owner, unit.id))
        .collect();
    if !added.is_empty() {
        tracing::debug!(count = added.len(), "units became eligible to fight");
    }
    added
}
