//! Unit keyword set
//!
//! Keywords are a closed bitset. Rule text is turned into these flags by
//! the data loader before anything reaches the rules core.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Keywords carried by a unit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    pub struct UnitKeywords: u32 {
        const INFANTRY = 1 << 0;
        const VEHICLE = 1 << 1;
        const MONSTER = 1 << 2;
        const CHARACTER = 1 << 3;
        const FLY = 1 << 4;
        const AIRCRAFT = 1 << 5;
        const TITANIC = 1 << 6;
        const MOUNTED = 1 << 7;
        const BEAST = 1 << 8;
        const SWARM = 1 << 9;
        const BATTLELINE = 1 << 10;
        const PSYKER = 1 << 11;
    }
}

impl UnitKeywords {
    /// Units that take mortal wounds instead of losing a model to self-damage
    pub fn suffers_mortal_self_damage(&self) -> bool {
        self.intersects(Self::CHARACTER | Self::VEHICLE | Self::MONSTER)
    }

    /// Units allowed to shoot non-pistol weapons while engaged
    pub fn fires_while_engaged(&self) -> bool {
        self.intersects(Self::VEHICLE | Self::MONSTER)
    }

    pub fn is_aircraft(&self) -> bool {
        self.contains(Self::AIRCRAFT)
    }

    pub fn can_fly(&self) -> bool {
        self.contains(Self::FLY)
    }
}

/// Aircraft only interact in melee with flyers, in both directions.
///
/// Returns true when a unit with keywords `a` may fight, charge or be
/// engaged by a unit with keywords `b`.
pub fn melee_interaction_allowed(a: UnitKeywords, b: UnitKeywords) -> bool {
    if a.is_aircraft() && !b.can_fly() {
        return false;
    }
    if b.is_aircraft() && !a.can_fly() {
        return false;
    }
    true
}
