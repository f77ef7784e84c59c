//! Action requests, the resolvers and their results

pub mod action;
pub mod allocation;
pub mod attack;
pub mod engine;
pub mod hazardous;
pub mod result;

pub use action::{ActionRequest, AttackKind, WeaponAssignment};
pub use allocation::WoundPool;
pub use attack::resolve_attack;
pub use engine::RulesEngine;
pub use hazardous::{hazardous_check_for, resolve_hazardous};
pub use result::{Diff, Reason, ResolutionResult};
