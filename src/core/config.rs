//! Rules configuration with documented constants
//!
//! All tabletop distances are in inches, base sizes in millimetres.
//! The config is owned by a `RulesEngine` for the lifetime of one battle;
//! there is no process-wide instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RulesError};

/// Configuration for the rules core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === MEASUREMENT ===
    /// Edge-to-edge distance that counts as melee adjacency
    pub engagement_range: f64,

    /// Slack allowed when deciding two bases are touching
    ///
    /// Submitted paths come from floating point UIs and planners, so an
    /// exact zero gap is never expected.
    pub base_contact_tolerance: f64,

    /// Base diameter assumed when a model carries no usable base size
    pub default_base_mm: f64,

    // === MOVEMENT ===
    /// Declared charge targets must be within this distance
    pub max_charge_distance: f64,

    /// Maximum pile-in move
    pub pile_in_distance: f64,

    /// Maximum consolidation move
    pub consolidate_distance: f64,

    /// Maximum gap between models of one unit
    pub coherency_distance: f64,

    /// Terrain at or below this height never adds a climb penalty
    pub penalty_free_height: f64,

    // === LINE OF SIGHT ===
    /// Bases at least this wide also get full-circumference sampling
    pub large_base_mm: f64,

    /// Lower bound on per-base edge samples
    pub min_edge_samples: usize,

    /// Upper bound on per-base edge samples
    pub max_edge_samples: usize,

    /// Arc length between circumference samples on large bases
    pub circumference_spacing: f64,

    /// Upper bound on circumference samples per base
    pub max_circumference_samples: usize,

    // === ESTIMATION ===
    /// Weight given to half-range bonuses when the distance is unknown
    ///
    /// Only the expectation pipeline reads this. Dice resolvers always
    /// measure the real distance.
    pub unknown_range_half_probability: f64,

    // === SELF DAMAGE ===
    /// Mortal wounds per failed hazardous roll on characters, vehicles and monsters
    pub hazardous_mortal_wounds: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            engagement_range: 1.0,
            base_contact_tolerance: 0.05,
            default_base_mm: 32.0,

            max_charge_distance: 12.0,
            pile_in_distance: 3.0,
            consolidate_distance: 3.0,
            coherency_distance: 2.0,
            penalty_free_height: 2.0,

            large_base_mm: 90.0,
            min_edge_samples: 4,
            max_edge_samples: 16,
            circumference_spacing: 0.5,
            max_circumference_samples: 64,

            unknown_range_half_probability: 0.5,

            hazardous_mortal_wounds: 3,
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.engagement_range <= 0.0 {
            return Err(RulesError::InvalidConfig(format!(
                "engagement_range ({}) must be positive",
                self.engagement_range
            )));
        }

        if self.base_contact_tolerance < 0.0
            || self.base_contact_tolerance >= self.engagement_range
        {
            return Err(RulesError::InvalidConfig(format!(
                "base_contact_tolerance ({}) must be in [0, engagement_range)",
                self.base_contact_tolerance
            )));
        }

        if self.default_base_mm <= 0.0 {
            return Err(RulesError::InvalidConfig(
                "default_base_mm must be positive".into(),
            ));
        }

        if self.pile_in_distance < 0.0
            || self.consolidate_distance < 0.0
            || self.max_charge_distance <= 0.0
        {
            return Err(RulesError::InvalidConfig(
                "movement distances must not be negative".into(),
            ));
        }

        if self.min_edge_samples == 0 || self.min_edge_samples > self.max_edge_samples {
            return Err(RulesError::InvalidConfig(format!(
                "edge sample bounds [{}, {}] are not ordered",
                self.min_edge_samples, self.max_edge_samples
            )));
        }

        if self.max_circumference_samples < self.min_edge_samples {
            return Err(RulesError::InvalidConfig(format!(
                "max_circumference_samples ({}) is below min_edge_samples ({})",
                self.max_circumference_samples, self.min_edge_samples
            )));
        }

        if self.circumference_spacing <= 0.0 {
            return Err(RulesError::InvalidConfig(
                "circumference_spacing must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.unknown_range_half_probability) {
            return Err(RulesError::InvalidConfig(format!(
                "unknown_range_half_probability ({}) must be a probability",
                self.unknown_range_half_probability
            )));
        }

        Ok(())
    }
}
