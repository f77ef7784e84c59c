//! Units, models, keywords and status effects

pub mod keywords;
pub mod model;
pub mod status;
pub mod unit;

pub use keywords::{melee_interaction_allowed, UnitKeywords};
pub use model::{BaseShape, Model};
pub use status::{Expiry, StatusEffect, StatusKind};
pub use unit::{Unit, UnitStats};
