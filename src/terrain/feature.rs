//! Terrain features: footprint polygon, height class and who may enter

use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::core::types::{Position, TerrainId};
use crate::geometry::polygon::{contains_point, to_polygon, validate_polygon, PolygonIssue};
use crate::units::keywords::UnitKeywords;

/// Height of a terrain piece. Each class maps to a fixed height in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightClass {
    #[default]
    Low,      // Craters, rubble, hedges
    Medium,   // Barricades, ruined walls
    Tall,     // Ruins, containers
    Towering, // Multi-storey ruins
}

impl HeightClass {
    pub const LOWEST: HeightClass = HeightClass::Low;

    pub fn inches(&self) -> f64 {
        match self {
            HeightClass::Low => 1.0,
            HeightClass::Medium => 3.0,
            HeightClass::Tall => 6.0,
            HeightClass::Towering => 9.0,
        }
    }

    /// Anything above the lowest class blocks line of sight
    pub fn blocks_los(&self) -> bool {
        *self > Self::LOWEST
    }
}

/// Which movers may enter a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraversalRule {
    /// Empty means no restriction; otherwise the mover needs one of these keywords
    #[serde(default)]
    pub allowed: UnitKeywords,
}

impl TraversalRule {
    pub fn only(allowed: UnitKeywords) -> Self {
        Self { allowed }
    }

    /// Flyers pass over terrain and are never stopped by it
    pub fn permits(&self, mover: UnitKeywords) -> bool {
        self.allowed.is_empty() || mover.can_fly() || mover.intersects(self.allowed)
    }
}

/// An immutable terrain piece for one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub id: TerrainId,
    #[serde(default)]
    pub name: String,
    pub polygon: Vec<Position>,
    #[serde(default)]
    pub height: HeightClass,
    #[serde(default)]
    pub traversal: TraversalRule,
}

impl TerrainFeature {
    pub fn new(id: TerrainId, polygon: Vec<Position>, height: HeightClass) -> Self {
        Self {
            id,
            name: String::new(),
            polygon,
            height,
            traversal: TraversalRule::default(),
        }
    }

    /// Axis-aligned rectangular footprint
    pub fn rectangle(id: TerrainId, min: Position, max: Position, height: HeightClass) -> Self {
        Self::new(
            id,
            vec![
                Position::new(min.x, min.y),
                Position::new(max.x, min.y),
                Position::new(max.x, max.y),
                Position::new(min.x, max.y),
            ],
            height,
        )
    }

    pub fn with_traversal(mut self, traversal: TraversalRule) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn footprint(&self) -> Polygon<f64> {
        to_polygon(&self.polygon)
    }

    /// Degenerate footprints are skipped by every query
    pub fn is_usable(&self) -> bool {
        validate_polygon(&self.polygon).is_empty()
    }

    pub fn issues(&self) -> Vec<PolygonIssue> {
        validate_polygon(&self.polygon)
    }

    pub fn height_inches(&self) -> f64 {
        self.height.inches()
    }

    pub fn blocks_los(&self) -> bool {
        self.height.blocks_los()
    }

    pub fn contains(&self, point: Position) -> bool {
        self.is_usable() && contains_point(&self.footprint(), point)
    }
}
