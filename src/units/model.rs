//! Individual miniatures and their bases

use serde::{Deserialize, Serialize};

use crate::core::types::{ModelId, Position, MM_PER_INCH};

/// Physical base of a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BaseShape {
    Circle { diameter_mm: f64 },
    /// Oval bases; the long axis points along the model's facing
    Oval { length_mm: f64, width_mm: f64 },
}

impl Default for BaseShape {
    fn default() -> Self {
        BaseShape::Circle { diameter_mm: 32.0 }
    }
}

impl BaseShape {
    /// Usable base: positive, finite dimensions
    pub fn is_valid(&self) -> bool {
        match *self {
            BaseShape::Circle { diameter_mm } => diameter_mm.is_finite() && diameter_mm > 0.0,
            BaseShape::Oval { length_mm, width_mm } => {
                length_mm.is_finite() && width_mm.is_finite() && length_mm > 0.0 && width_mm > 0.0
            }
        }
    }

    /// Largest dimension in millimetres
    pub fn diameter_mm(&self) -> f64 {
        match *self {
            BaseShape::Circle { diameter_mm } => diameter_mm,
            BaseShape::Oval { length_mm, width_mm } => length_mm.max(width_mm),
        }
    }

    /// Radius in inches along `direction` (radians, world frame)
    ///
    /// Ovals use the polar form of an ellipse relative to `facing`.
    pub fn radius_towards(&self, direction: f64, facing: f64) -> f64 {
        match *self {
            BaseShape::Circle { diameter_mm } => diameter_mm / MM_PER_INCH / 2.0,
            BaseShape::Oval { length_mm, width_mm } => {
                let a = length_mm / MM_PER_INCH / 2.0;
                let b = width_mm / MM_PER_INCH / 2.0;
                let theta = direction - facing;
                let denom = ((b * theta.cos()).powi(2) + (a * theta.sin()).powi(2)).sqrt();
                if denom <= f64::EPSILON {
                    a.max(b)
                } else {
                    a * b / denom
                }
            }
        }
    }

    /// Largest radius in inches
    pub fn max_radius(&self) -> f64 {
        self.diameter_mm() / MM_PER_INCH / 2.0
    }
}

/// A single miniature. Owned by its unit, changed only through diffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    #[serde(default = "alive_default")]
    pub alive: bool,
    #[serde(default)]
    pub base: Option<BaseShape>,
    pub position: Position,
    /// Heading in radians; only matters for oval bases
    #[serde(default)]
    pub facing: f64,
    pub max_wounds: u32,
    pub current_wounds: u32,
    #[serde(default)]
    pub invulnerable_save: Option<u8>,
}

fn alive_default() -> bool {
    true
}

impl Model {
    pub fn new(id: ModelId, position: Position, wounds: u32) -> Self {
        Self {
            id,
            alive: true,
            base: Some(BaseShape::default()),
            position,
            facing: 0.0,
            max_wounds: wounds,
            current_wounds: wounds,
            invulnerable_save: None,
        }
    }

    pub fn with_base(mut self, base: BaseShape) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_invulnerable(mut self, save: u8) -> Self {
        self.invulnerable_save = Some(save);
        self
    }

    /// Base to measure with, falling back to a circle of `default_mm`
    pub fn base_or(&self, default_mm: f64) -> BaseShape {
        match self.base {
            Some(base) if base.is_valid() => base,
            _ => BaseShape::Circle { diameter_mm: default_mm },
        }
    }

    /// Has lost at least one wound but is still alive
    pub fn is_wounded(&self) -> bool {
        self.alive && self.current_wounds < self.max_wounds
    }

    /// Wound bookkeeping is consistent for this model
    pub fn wounds_consistent(&self) -> bool {
        if self.alive {
            self.current_wounds > 0 && self.current_wounds <= self.max_wounds
        } else {
            self.current_wounds <= self.max_wounds
        }
    }
}
