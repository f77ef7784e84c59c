//! Submitted model paths and their cost against a movement budget

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::types::{ModelId, Position, UnitId};
use crate::resolution::result::{Diff, Reason};
use crate::terrain::feature::TerrainFeature;
use crate::terrain::penalty::{forbidden_terrain, path_length, path_penalty};
use crate::units::model::Model;
use crate::units::unit::Unit;

/// Waypoints for one model, not including where it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPath {
    pub model: ModelId,
    pub waypoints: Vec<Position>,
}

impl ModelPath {
    pub fn new(model: ModelId, waypoints: Vec<Position>) -> Self {
        Self { model, waypoints }
    }

    pub fn straight(model: ModelId, to: Position) -> Self {
        Self::new(model, vec![to])
    }
}

/// One model's move, measured
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMove {
    pub model: ModelId,
    pub start: Position,
    pub end: Position,
    pub length: f64,
    pub penalty: f64,
}

impl PlannedMove {
    pub fn cost(&self) -> f64 {
        self.length + self.penalty
    }

    pub fn moved(&self) -> bool {
        self.start.distance(&self.end) > 1e-9
    }
}

/// Every alive model of a unit with its measured move and final placement
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub unit: UnitId,
    pub moves: Vec<PlannedMove>,
    /// Alive models, in unit order, standing where they end up
    pub final_models: Vec<Model>,
}

impl MovePlan {
    pub fn final_model(&self, id: ModelId) -> Option<&Model> {
        self.final_models.iter().find(|m| m.id == id)
    }

    pub fn moving(&self) -> impl Iterator<Item = &PlannedMove> {
        self.moves.iter().filter(|m| m.moved())
    }

    /// Absolute position diffs for the models that moved
    pub fn position_diffs(&self) -> Vec<Diff> {
        self.moving()
            .map(|m| Diff::ModelPosition {
                unit: self.unit,
                model: m.model,
                position: m.end,
            })
            .collect()
    }
}

/// Measure every path against `budget`. Models without a path stay put.
pub fn plan_moves(
    unit: &Unit,
    paths: &[ModelPath],
    terrain: &[TerrainFeature],
    budget: f64,
    config: &RulesConfig,
) -> Result<MovePlan, Vec<Reason>> {
    let mut reasons = Vec::new();

    let mut seen: Vec<ModelId> = Vec::new();
    for path in paths {
        match unit.model(path.model) {
            None => reasons.push(Reason::new(
                "path",
                format!("model {} is not part of unit {}", path.model, unit.id),
            )),
            Some(model) if !model.alive => reasons.push(Reason::new(
                "path",
                format!("model {} is dead and cannot move", path.model),
            )),
            Some(_) if seen.contains(&path.model) => reasons.push(Reason::new(
                "path",
                format!("model {} has more than one path", path.model),
            )),
            Some(_) if path.waypoints.iter().any(|p| !p.is_finite()) => reasons.push(Reason::new(
                "path",
                format!("model {} has a non-finite waypoint", path.model),
            )),
            Some(_) => seen.push(path.model),
        }
    }
    if !reasons.is_empty() {
        return Err(reasons);
    }

    let flying = unit.keywords.can_fly();
    let mut moves = Vec::new();
    let mut final_models = Vec::new();

    for model in unit.alive_models() {
        let mut route = vec![model.position];
        if let Some(path) = paths.iter().find(|p| p.model == model.id) {
            route.extend(path.waypoints.iter().copied());
        }
        let end = route.last().copied().unwrap_or(model.position);
        let length = path_length(&route);
        let penalty = path_penalty(&route, terrain, flying, config);

        if length + penalty > budget + 1e-9 {
            reasons.push(Reason::new(
                "movement_budget",
                format!(
                    "model {} needs {:.2}\" ({length:.2}\" path + {penalty:.2}\" climbing) but only {budget:.2}\" is available",
                    model.id,
                    length + penalty
                ),
            ));
        }
        if route.len() > 1 {
            for terrain_id in forbidden_terrain(&route, terrain, unit.keywords) {
                reasons.push(Reason::new(
                    "terrain_access",
                    format!("model {} cannot enter terrain {terrain_id}", model.id),
                ));
            }
        }

        let mut placed = model.clone();
        placed.position = end;
        final_models.push(placed);
        moves.push(PlannedMove {
            model: model.id,
            start: model.position,
            end,
            length,
            penalty,
        });
    }

    if reasons.is_empty() {
        Ok(MovePlan { unit: unit.id, moves, final_models })
    } else {
        Err(reasons)
    }
}
