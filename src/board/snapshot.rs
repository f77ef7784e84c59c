//! Read-only battlefield snapshot handed to every resolver

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RulesError};
use crate::core::types::{ModelId, ObjectiveId, Position, UnitId};
use crate::resolution::result::Diff;
use crate::terrain::feature::TerrainFeature;
use crate::units::model::Model;
use crate::units::unit::Unit;

/// An objective marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub position: Position,
}

impl Objective {
    pub fn new(id: ObjectiveId, position: Position) -> Self {
        Self { id, position }
    }
}

/// Everything a resolver may look at
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub battle_round: u32,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub terrain_features: Vec<TerrainFeature>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl BoardSnapshot {
    pub fn new(units: Vec<Unit>, terrain_features: Vec<TerrainFeature>) -> Self {
        Self {
            battle_round: 1,
            units,
            terrain_features,
            objectives: Vec::new(),
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn model(&self, unit: UnitId, model: ModelId) -> Option<&Model> {
        self.unit(unit).and_then(|u| u.model(model))
    }

    /// Undestroyed units owned by someone other than `unit`'s owner, in board order
    pub fn enemies_of<'a>(&'a self, unit: &'a Unit) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units
            .iter()
            .filter(move |other| other.is_enemy_of(unit) && !other.is_destroyed())
    }

    /// Unit id to position in `units`; for lookups only
    pub fn unit_index(&self) -> AHashMap<UnitId, usize> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| (unit.id, i))
            .collect()
    }

    /// Apply diffs to a copy, all or nothing.
    ///
    /// The copy's wound bookkeeping is re-checked afterwards and any breach
    /// is reported as an invariant violation.
    pub fn apply_diffs(&self, diffs: &[Diff]) -> Result<BoardSnapshot> {
        let mut next = self.clone();
        let index = next.unit_index();

        for diff in diffs {
            let unit_id = diff.unit();
            let slot = *index.get(&unit_id).ok_or(RulesError::UnknownUnit(unit_id))?;
            let unit = &mut next.units[slot];

            match diff {
                Diff::ModelWounds { model, current_wounds, .. } => {
                    let target = model_mut(unit, *model)?;
                    target.current_wounds = *current_wounds;
                }
                Diff::ModelAlive { model, alive, .. } => {
                    let target = model_mut(unit, *model)?;
                    target.alive = *alive;
                }
                Diff::ModelPosition { model, position, .. } => {
                    let target = model_mut(unit, *model)?;
                    target.position = *position;
                }
                Diff::UnitStatus { status, effect, .. } => match effect {
                    Some(effect) => {
                        unit.status.insert(*status, effect.clone());
                    }
                    None => {
                        unit.status.remove(status);
                    }
                },
            }
        }

        next.check_invariants()?;
        Ok(next)
    }

    /// Wound counts stay inside [0, max] and alive models keep at least one
    pub fn check_invariants(&self) -> Result<()> {
        for unit in &self.units {
            for model in &unit.models {
                if !model.wounds_consistent() {
                    return Err(RulesError::InvariantViolation(format!(
                        "unit {} model {} has {}/{} wounds (alive: {})",
                        unit.id, model.id, model.current_wounds, model.max_wounds, model.alive
                    )));
                }
            }
        }
        Ok(())
    }
}

fn model_mut(unit: &mut Unit, id: ModelId) -> Result<&mut Model> {
    let unit_id = unit.id;
    unit.models
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or(RulesError::UnknownModel { unit: unit_id, model: id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::units::keywords::UnitKeywords;
    use crate::units::status::{Expiry, StatusEffect, StatusKind};

    fn board() -> BoardSnapshot {
        let unit = Unit::new(UnitId(1), PlayerId(0), UnitKeywords::INFANTRY)
            .with_model(Model::new(ModelId(1), Position::new(0.0, 0.0), 2));
        let enemy = Unit::new(UnitId(2), PlayerId(1), UnitKeywords::INFANTRY)
            .with_model(Model::new(ModelId(1), Position::new(10.0, 0.0), 1));
        BoardSnapshot::new(vec![unit, enemy], vec![])
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let board = board();
        let next = board
            .apply_diffs(&[
                Diff::ModelWounds { unit: UnitId(1), model: ModelId(1), current_wounds: 1 },
                Diff::ModelPosition { unit: UnitId(1), model: ModelId(1), position: Position::new(2.0, 0.0) },
                Diff::UnitStatus {
                    unit: UnitId(1),
                    status: StatusKind::Charged,
                    effect: Some(StatusEffect::new(Expiry::EndOfTurn, "charge")),
                },
            ])
            .unwrap();

        assert_eq!(board.model(UnitId(1), ModelId(1)).unwrap().current_wounds, 2);
        let moved = next.model(UnitId(1), ModelId(1)).unwrap();
        assert_eq!(moved.current_wounds, 1);
        assert_eq!(moved.position, Position::new(2.0, 0.0));
        assert!(next.unit(UnitId(1)).unwrap().has_status(StatusKind::Charged));
    }

    #[test]
    fn test_invariant_breach_is_fatal() {
        let board = board();
        let result = board.apply_diffs(&[Diff::ModelWounds {
            unit: UnitId(1),
            model: ModelId(1),
            current_wounds: 5,
        }]);
        assert!(matches!(result, Err(RulesError::InvariantViolation(_))));
    }

    #[test]
    fn test_unknown_targets() {
        let board = board();
        let result = board.apply_diffs(&[Diff::ModelAlive { unit: UnitId(9), model: ModelId(1), alive: false }]);
        assert!(matches!(result, Err(RulesError::UnknownUnit(UnitId(9)))));
        let result = board.apply_diffs(&[Diff::ModelAlive { unit: UnitId(1), model: ModelId(4), alive: false }]);
        assert!(matches!(result, Err(RulesError::UnknownModel { .. })));
    }

    #[test]
    fn test_enemies_skip_destroyed() {
        let mut board = board();
        let me = board.units[0].clone();
        assert_eq!(board.enemies_of(&me).count(), 1);
        board.units[1].models[0].alive = false;
        board.units[1].models[0].current_wounds = 0;
        assert_eq!(board.enemies_of(&me).count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let board = board().with_objective(Objective::new(ObjectiveId(1), Position::new(5.0, 5.0)));
        let back = BoardSnapshot::from_json(&board.to_json().unwrap()).unwrap();
        assert_eq!(back, board);
    }
}
