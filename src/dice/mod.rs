//! Dice and probability primitives

pub mod expression;
pub mod log;
pub mod roller;
pub mod thresholds;

pub use expression::DiceExpr;
pub use log::{DiceContext, DiceLogEntry, LogOutcome};
pub use roller::DiceRoller;
pub use thresholds::{
    armour_save_needed, best_save, cap_modifier, evaluate_save, evaluate_test, p_success,
    p_unsaved, roll_needed, wound_threshold, SaveChoice, SaveKind, SaveOutcome, TestOutcome,
    CRITICAL_ROLL,
};
