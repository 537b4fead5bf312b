//! Leveling ruleset constants.
//!
//! The numbers encode one game edition (7 attributes, no Luck). They are
//! carried as a value so a variant ruleset can override them without
//! touching the engine.

use serde::{Deserialize, Serialize};

/// Major-skill increase total required before a level-up is allowed.
pub const MAJOR_INCREASE_THRESHOLD: u32 = 10;

/// Highest multiplier an attribute can earn at level-up.
pub const MULTIPLIER_CAP: u32 = 5;

/// How many skills a character build may flag as major.
pub const MAX_MAJOR_SKILLS: usize = 7;

/// Tunable leveling rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Sum of major-skill increases that opens a level-up.
    pub major_increase_threshold: u32,
    /// Cap on the per-attribute multiplier.
    pub multiplier_cap: u32,
    /// Cap on the major-skill selection size.
    pub max_major_skills: usize,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            major_increase_threshold: MAJOR_INCREASE_THRESHOLD,
            multiplier_cap: MULTIPLIER_CAP,
            max_major_skills: MAX_MAJOR_SKILLS,
        }
    }
}

impl Ruleset {
    /// Attribute multiplier earned when `n` distinct linked skills
    /// increased during the level.
    ///
    /// 1 for no increases, 1 + n up to the cap, then flat at the cap.
    pub fn multiplier(&self, n: usize) -> u32 {
        if n == 0 {
            return 1;
        }
        (1 + n as u32).min(self.multiplier_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_table() {
        let rules = Ruleset::default();
        assert_eq!(rules.multiplier(0), 1);
        for n in 1..=4 {
            assert_eq!(rules.multiplier(n), 1 + n as u32);
        }
        for n in 5..=8 {
            assert_eq!(rules.multiplier(n), 5);
        }
    }

    #[test]
    fn multiplier_respects_override() {
        let rules = Ruleset {
            multiplier_cap: 4,
            ..Ruleset::default()
        };
        assert_eq!(rules.multiplier(3), 4);
        assert_eq!(rules.multiplier(4), 4);
        assert_eq!(rules.multiplier(9), 4);
    }
}
