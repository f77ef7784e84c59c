//! Wound allocation over a working copy of one unit's models
//!
//! The pool never touches the snapshot. Resolvers mutate the pool while
//! rolling and turn it into absolute diffs at the end.

use crate::core::types::{ModelId, UnitId};
use crate::resolution::result::Diff;
use crate::units::unit::Unit;

#[derive(Debug, Clone)]
struct PoolModel {
    id: ModelId,
    alive: bool,
    current_wounds: u32,
    max_wounds: u32,
    invulnerable_save: Option<u8>,
    // As found in the snapshot
    start_alive: bool,
    start_wounds: u32,
}

/// Working wound state of one unit during a resolution
#[derive(Debug, Clone)]
pub struct WoundPool {
    unit: UnitId,
    models: Vec<PoolModel>,
}

impl WoundPool {
    pub fn from_unit(unit: &Unit) -> Self {
        Self {
            unit: unit.id,
            models: unit
                .models
                .iter()
                .map(|m| PoolModel {
                    id: m.id,
                    alive: m.alive,
                    current_wounds: m.current_wounds,
                    max_wounds: m.max_wounds,
                    invulnerable_save: m.invulnerable_save,
                    start_alive: m.alive,
                    start_wounds: m.current_wounds,
                })
                .collect(),
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn alive_count(&self) -> usize {
        self.models.iter().filter(|m| m.alive).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.alive_count() == 0
    }

    /// Slot the next wound goes to: an already wounded model, else the first alive one
    pub fn next_target(&self) -> Option<usize> {
        self.models
            .iter()
            .position(|m| m.alive && m.current_wounds < m.max_wounds)
            .or_else(|| self.models.iter().position(|m| m.alive))
    }

    pub fn slot_of(&self, id: ModelId) -> Option<usize> {
        self.models.iter().position(|m| m.id == id)
    }

    pub fn model_id(&self, slot: usize) -> ModelId {
        self.models[slot].id
    }

    pub fn is_alive(&self, slot: usize) -> bool {
        self.models[slot].alive
    }

    pub fn invulnerable_save(&self, slot: usize) -> Option<u8> {
        self.models[slot].invulnerable_save
    }

    /// Damage from one attack. Excess beyond the model's wounds is lost.
    ///
    /// Returns the wounds actually removed.
    pub fn apply_damage(&mut self, slot: usize, damage: u32) -> u32 {
        let model = &mut self.models[slot];
        if !model.alive || damage == 0 {
            return 0;
        }
        let lost = damage.min(model.current_wounds);
        model.current_wounds -= lost;
        if model.current_wounds == 0 {
            model.alive = false;
        }
        assert!(model.current_wounds <= model.max_wounds);
        lost
    }

    /// Mortal wounds spill from model to model in allocation order
    pub fn apply_mortal_wounds(&mut self, mut amount: u32) -> u32 {
        let mut removed = 0;
        while amount > 0 {
            let Some(slot) = self.next_target() else { break };
            let lost = self.apply_damage(slot, amount);
            amount -= lost;
            removed += lost;
        }
        removed
    }

    /// Remove a whole model regardless of its wounds
    pub fn slay(&mut self, slot: usize) -> bool {
        let model = &mut self.models[slot];
        if !model.alive {
            return false;
        }
        model.current_wounds = 0;
        model.alive = false;
        true
    }

    /// Absolute diffs for every model whose state changed, in unit order
    pub fn diffs(&self) -> Vec<Diff> {
        let mut diffs = Vec::new();
        for model in &self.models {
            if model.current_wounds != model.start_wounds {
                diffs.push(Diff::ModelWounds {
                    unit: self.unit,
                    model: model.id,
                    current_wounds: model.current_wounds,
                });
            }
            if model.alive != model.start_alive {
                diffs.push(Diff::ModelAlive {
                    unit: self.unit,
                    model: model.id,
                    alive: model.alive,
                });
            }
        }
        diffs
    }
}
