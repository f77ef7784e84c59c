//! Roll-needed thresholds and single-die interpretation
//!
//! Ordering inside every check: the unmodified roll is inspected first
//! (1 fails, critical values succeed), then the threshold.

use serde::{Deserialize, Serialize};

/// Lowest value a threshold may take; a natural 1 always fails
pub const MIN_THRESHOLD: u8 = 2;
/// Highest value a hit or wound threshold may take; a natural 6 always succeeds
pub const MAX_THRESHOLD: u8 = 6;
/// Default unmodified roll that counts as critical
pub const CRITICAL_ROLL: u8 = 6;

/// Sum modifiers and cap the total at +/-1
pub fn cap_modifier(modifiers: &[i32]) -> i32 {
    modifiers.iter().sum::<i32>().clamp(-1, 1)
}

/// Roll needed on a D6 for a characteristic such as BS 3+.
///
/// Positive modifiers make the roll easier. The result is clamped to [2, 6].
pub fn roll_needed(stat: u8, modifiers: &[i32]) -> u8 {
    let needed = stat as i32 - cap_modifier(modifiers);
    needed.clamp(MIN_THRESHOLD as i32, MAX_THRESHOLD as i32) as u8
}

/// Base wound roll from strength against toughness
pub fn wound_threshold(strength: u8, toughness: u8) -> u8 {
    let s = strength as u32;
    let t = toughness as u32;
    if s >= 2 * t {
        2
    } else if s > t {
        3
    } else if s == t {
        4
    } else if 2 * s <= t {
        6
    } else {
        5
    }
}

/// Chance that a single D6 meets `needed`
pub fn p_success(needed: u8) -> f64 {
    let needed = needed.clamp(1, 7) as f64;
    ((7.0 - needed) / 6.0).clamp(0.0, 1.0)
}

/// Interpretation of one hit or wound die
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestOutcome {
    pub success: bool,
    pub critical: bool,
}

/// Interpret a hit or wound roll
pub fn evaluate_test(raw: u8, needed: u8, critical_on: u8) -> TestOutcome {
    if raw <= 1 {
        return TestOutcome { success: false, critical: false };
    }
    if raw >= critical_on {
        return TestOutcome { success: true, critical: true };
    }
    TestOutcome { success: raw >= needed, critical: false }
}

/// Which save characteristic is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    Armour,
    Invulnerable,
}

/// The save a model will roll against one attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveChoice {
    pub kind: SaveKind,
    pub needed: u8,
}

/// Armour save after AP and cover. `None` when it cannot succeed.
///
/// `ap` is zero or negative. Cover does not help a 3+ or better save against AP 0.
pub fn armour_save_needed(save: u8, ap: i8, in_cover: bool) -> Option<u8> {
    let mut needed = save as i32 - ap.min(0) as i32;
    if in_cover && !(save <= 3 && ap == 0) {
        needed -= 1;
    }
    let needed = needed.max(MIN_THRESHOLD as i32);
    (needed <= 6).then_some(needed as u8)
}

/// Pick whichever of armour and invulnerable save is numerically better
pub fn best_save(save: u8, ap: i8, invulnerable: Option<u8>, in_cover: bool) -> Option<SaveChoice> {
    let armour = armour_save_needed(save, ap, in_cover).map(|needed| SaveChoice {
        kind: SaveKind::Armour,
        needed,
    });
    let invuln = invulnerable
        .filter(|&v| v <= 6)
        .map(|v| SaveChoice {
            kind: SaveKind::Invulnerable,
            needed: v.max(MIN_THRESHOLD),
        });

    match (armour, invuln) {
        (Some(a), Some(i)) => Some(if i.needed < a.needed { i } else { a }),
        (a, i) => a.or(i),
    }
}

/// Result of one save die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    Failed,
    /// Unmodified 1: fails whatever the characteristic
    AutoFailed,
    /// No save was possible against this attack
    NoSave,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Interpret a save roll. The natural-1 check runs before any comparison.
pub fn evaluate_save(raw: u8, choice: Option<SaveChoice>) -> SaveOutcome {
    if raw <= 1 {
        return SaveOutcome::AutoFailed;
    }
    match choice {
        None => SaveOutcome::NoSave,
        Some(choice) if raw >= choice.needed => SaveOutcome::Saved,
        Some(_) => SaveOutcome::Failed,
    }
}

/// Chance a save fails, including the auto-fail on a 1
pub fn p_unsaved(choice: Option<SaveChoice>) -> f64 {
    match choice {
        None => 1.0,
        Some(choice) => 1.0 - p_success(choice.needed.max(MIN_THRESHOLD)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_needed_clamps() {
        assert_eq!(roll_needed(3, &[]), 3);
        assert_eq!(roll_needed(3, &[1]), 2);
        assert_eq!(roll_needed(2, &[1]), 2);
        assert_eq!(roll_needed(6, &[-1]), 6);
        // Stacked modifiers are capped at +/-1
        assert_eq!(roll_needed(4, &[1, 1, 1]), 3);
        assert_eq!(roll_needed(4, &[-1, -1]), 5);
        assert_eq!(roll_needed(4, &[1, -1]), 4);
    }

    #[test]
    fn test_wound_table() {
        assert_eq!(wound_threshold(8, 4), 2);
        assert_eq!(wound_threshold(5, 4), 3);
        assert_eq!(wound_threshold(4, 4), 4);
        assert_eq!(wound_threshold(3, 4), 5);
        assert_eq!(wound_threshold(4, 8), 6);
        assert_eq!(wound_threshold(3, 7), 6);
        assert_eq!(wound_threshold(4, 7), 5);
    }

    #[test]
    fn test_natural_one_fails_natural_six_crits() {
        assert_eq!(evaluate_test(1, 2, 6), TestOutcome { success: false, critical: false });
        assert_eq!(evaluate_test(6, 6, 6), TestOutcome { success: true, critical: true });
        assert_eq!(evaluate_test(4, 5, 4), TestOutcome { success: true, critical: true });
        assert_eq!(evaluate_test(4, 4, 6), TestOutcome { success: true, critical: false });
        assert_eq!(evaluate_test(3, 4, 6), TestOutcome { success: false, critical: false });
    }

    #[test]
    fn test_best_save_prefers_lower() {
        // 3+ armour vs AP-3 becomes 6+, 4++ invulnerable wins
        let choice = best_save(3, -3, Some(4), false).unwrap();
        assert_eq!(choice.kind, SaveKind::Invulnerable);
        assert_eq!(choice.needed, 4);

        // 2+ armour vs AP-1 becomes 3+, beats 4++
        let choice = best_save(2, -1, Some(4), false).unwrap();
        assert_eq!(choice.kind, SaveKind::Armour);
        assert_eq!(choice.needed, 3);
    }

    #[test]
    fn test_armour_can_be_removed_entirely() {
        assert_eq!(armour_save_needed(5, -2, false), None);
        assert_eq!(best_save(5, -2, None, false), None);
    }

    #[test]
    fn test_cover_rules() {
        assert_eq!(armour_save_needed(4, 0, true), Some(3));
        assert_eq!(armour_save_needed(3, 0, true), Some(3));
        assert_eq!(armour_save_needed(3, -1, true), Some(3));
        assert_eq!(armour_save_needed(2, 0, true), Some(2));
    }

    #[test]
    fn test_auto_fail_before_threshold() {
        let invuln_two = Some(SaveChoice { kind: SaveKind::Invulnerable, needed: 2 });
        assert_eq!(evaluate_save(1, invuln_two), SaveOutcome::AutoFailed);
        assert_eq!(evaluate_save(1, None), SaveOutcome::AutoFailed);
        assert_eq!(evaluate_save(2, invuln_two), SaveOutcome::Saved);
        assert_eq!(evaluate_save(6, None), SaveOutcome::NoSave);
    }

    #[test]
    fn test_probabilities() {
        assert!((p_success(3) - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(p_success(7), 0.0);
        assert!((p_unsaved(Some(SaveChoice { kind: SaveKind::Armour, needed: 2 })) - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(p_unsaved(None), 1.0);
    }
}
