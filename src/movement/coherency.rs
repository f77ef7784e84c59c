//! Unit coherency: models must stay close to their squad mates

use crate::core::config::RulesConfig;
use crate::core::types::ModelId;
use crate::geometry::measure::edge_distance;
use crate::resolution::result::Reason;
use crate::units::model::Model;

/// Unit size from which each model needs two neighbours instead of one
const LARGE_UNIT: usize = 7;

/// Alive models without enough neighbours within coherency distance
pub fn coherency_breaks(models: &[Model], config: &RulesConfig) -> Vec<ModelId> {
    let alive: Vec<&Model> = models.iter().filter(|m| m.alive).collect();
    if alive.len() <= 1 {
        return Vec::new();
    }
    let needed = if alive.len() >= LARGE_UNIT { 2 } else { 1 };

    alive
        .iter()
        .filter(|model| {
            let neighbours = alive
                .iter()
                .filter(|other| other.id != model.id)
                .filter(|other| edge_distance(model, other, config) <= config.coherency_distance + 1e-9)
                .count();
            neighbours < needed
        })
        .map(|model| model.id)
        .collect()
}

pub fn coherency_violation(models: &[Model], config: &RulesConfig) -> Option<Reason> {
    let broken = coherency_breaks(models, config);
    if broken.is_empty() {
        return None;
    }
    let ids: Vec<String> = broken.iter().map(|id| id.to_string()).collect();
    Some(Reason::new(
        "coherency",
        format!(
            "models {} would end more than {}\" from the rest of their unit",
            ids.join(", "),
            config.coherency_distance
        ),
    ))
}
