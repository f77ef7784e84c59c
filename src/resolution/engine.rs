//! The rules engine: owns the config and dispatches requests to resolvers

use rayon::prelude::*;

use crate::board::snapshot::BoardSnapshot;
use crate::core::config::RulesConfig;
use crate::core::error::Result;
use crate::core::types::{ModelId, PlayerId, UnitId};
use crate::dice::roller::DiceRoller;
use crate::movement::charge::validate_charge;
use crate::movement::eligibility::{fight_eligible, melee_targets, rescan_after_consolidation, FightQueue};
use crate::movement::pile_in::{validate_consolidate, validate_pile_in};
use crate::resolution::action::ActionRequest;
use crate::resolution::attack::resolve_attack;
use crate::resolution::hazardous::resolve_hazardous;
use crate::resolution::result::ResolutionResult;
use crate::visibility::los::{visible, LosMethod, VisibilityResult};
use crate::weapons::pipeline::{effective_profile, AttackerContext, EffectiveProfile, RangeBand, TargetContext};
use crate::weapons::profile::WeaponProfile;

/// Rules core for one battle. Stateless apart from its config.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    config: RulesConfig,
}

impl RulesEngine {
    pub fn new(config: RulesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Resolve one request with the caller's dice
    pub fn resolve(&self, board: &BoardSnapshot, request: &ActionRequest, dice: &mut DiceRoller) -> ResolutionResult {
        let _span = tracing::debug_span!("resolve", action = request.name(), unit = request.actor().0).entered();
        let config = &self.config;
        match request {
            ActionRequest::Attack { attacker, kind, assignments } => {
                resolve_attack(board, *attacker, *kind, assignments, dice, config)
            }
            ActionRequest::ChargeMove { unit, targets, roll, paths } => {
                validate_charge(board, *unit, targets, *roll, paths, config)
            }
            ActionRequest::PileIn { unit, paths } => validate_pile_in(board, *unit, paths, config),
            ActionRequest::Consolidate { unit, paths } => validate_consolidate(board, *unit, paths, config),
            ActionRequest::HazardousCheck { unit, models } => {
                resolve_hazardous(board, *unit, models, dice, config)
            }
        }
    }

    /// Resolve with a fresh roller seeded from `seed`
    pub fn resolve_seeded(&self, board: &BoardSnapshot, request: &ActionRequest, seed: u64) -> ResolutionResult {
        let mut dice = DiceRoller::from_seed(seed);
        self.resolve(board, request, &mut dice)
    }

    /// Resolve independent candidates in parallel, each with its own seed.
    ///
    /// Results come back in input order.
    pub fn evaluate_candidates(&self, board: &BoardSnapshot, candidates: &[(ActionRequest, u64)]) -> Vec<ResolutionResult> {
        candidates
            .par_iter()
            .map(|(request, seed)| self.resolve_seeded(board, request, *seed))
            .collect()
    }

    /// Line of sight between two models on the board
    pub fn visible(
        &self,
        board: &BoardSnapshot,
        shooter: (UnitId, ModelId),
        target: (UnitId, ModelId),
    ) -> VisibilityResult {
        match (board.model(shooter.0, shooter.1), board.model(target.0, target.1)) {
            (Some(a), Some(b)) => visible(a, b, &board.terrain_features, &self.config),
            _ => VisibilityResult {
                has_los: false,
                method: LosMethod::Invalid,
                blocking_terrain: Vec::new(),
                attempted_lines: 0,
                failure_reason: Some("model not found on the board".into()),
            },
        }
    }

    pub fn fight_eligible(&self, board: &BoardSnapshot, unit: UnitId) -> bool {
        fight_eligible(board, unit, &self.config)
    }

    pub fn melee_targets(&self, board: &BoardSnapshot, unit: UnitId) -> Vec<UnitId> {
        melee_targets(board, unit, &self.config)
    }

    /// Units that became eligible to fight after a consolidation, appended to `queue`
    pub fn rescan_after_consolidation(&self, board: &BoardSnapshot, queue: &mut FightQueue) -> Vec<(PlayerId, UnitId)> {
        let added = rescan_after_consolidation(board, queue, &self.config);
        queue.extend_pending(&added);
        added
    }

    /// Expected-value profile for one weapon against one unit
    pub fn effective_profile(
        &self,
        weapon: &WeaponProfile,
        attacker: &AttackerContext,
        target: &TargetContext,
        range: RangeBand,
    ) -> EffectiveProfile {
        effective_profile(weapon, attacker, target, range, &self.config)
    }
}
