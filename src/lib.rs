//! Tabletop Rules - deterministic resolution core for miniatures combat
//!
//! Every resolver is a pure function of a board snapshot, an action request
//! and a seeded dice roller. Nothing here chooses actions or owns turn order.

pub mod board;
pub mod core;
pub mod dice;
pub mod geometry;
pub mod movement;
pub mod resolution;
pub mod terrain;
pub mod units;
pub mod visibility;
pub mod weapons;

pub use crate::core::{Result, RulesConfig, RulesError};
pub use board::BoardSnapshot;
pub use resolution::{ActionRequest, Diff, ResolutionResult, RulesEngine};
