//! Seeded dice service
//!
//! A roller is handed to each resolver call. Identical seeds replay
//! identical sequences, which is what makes results auditable.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::dice::expression::DiceExpr;

/// Deterministic source of dice rolls
#[derive(Debug, Clone)]
pub struct DiceRoller {
    rng: ChaCha8Rng,
    seed: u64,
    rolled: u64,
}

impl DiceRoller {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            rolled: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of dice rolled so far
    pub fn rolled(&self) -> u64 {
        self.rolled
    }

    pub fn roll(&mut self, sides: u8) -> u8 {
        self.rolled += 1;
        self.rng.gen_range(1..=sides.max(1))
    }

    pub fn d6(&mut self) -> u8 {
        self.roll(6)
    }

    pub fn d3(&mut self) -> u8 {
        self.roll(3)
    }

    /// Roll `count` D6 in order
    pub fn d6s(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.d6()).collect()
    }

    /// Evaluate an expression, returning the total and the raw dice
    pub fn roll_expr(&mut self, expr: DiceExpr) -> (u32, Vec<u8>) {
        if expr.is_fixed() {
            return (expr.modifier as u32, Vec::new());
        }
        let raw: Vec<u8> = (0..expr.count).map(|_| self.roll(expr.sides)).collect();
        let total = raw.iter().map(|&r| r as u32).sum::<u32>() + expr.modifier as u32;
        (total, raw)
    }
}
