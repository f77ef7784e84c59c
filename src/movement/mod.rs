//! Movement legality: paths, base contact, coherency, charges and fight-phase moves

pub mod charge;
pub mod coherency;
pub mod contact;
pub mod eligibility;
pub mod path;
pub mod pile_in;

pub use charge::validate_charge;
pub use coherency::{coherency_breaks, coherency_violation};
pub use contact::{
    contact_requirement, contact_violation, overlap_violations, ContactRequirement, PlacementLimits,
};
pub use eligibility::{fight_eligible, melee_targets, rescan_after_consolidation, FightQueue};
pub use path::{plan_moves, ModelPath, MovePlan, PlannedMove};
pub use pile_in::{validate_consolidate, validate_pile_in};
