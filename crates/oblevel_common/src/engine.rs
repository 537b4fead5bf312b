//! Efficiency engine: level-up eligibility and attribute multiplier
//! projection.
//!
//! Pure computations over a snapshot of the current level's skill
//! increases. The engine never touches storage and never fails: an empty
//! snapshot is the zero state (nothing eligible, every multiplier 1).

use crate::catalog::{AttributeId, Catalog, SkillId};
use crate::rules::Ruleset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Whether the character may level up, and how far off they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Sum of increases across the character's major skills this level.
    pub total_major_increase: i64,
    pub eligible: bool,
    /// Major-skill points still needed; 0 once eligible.
    pub remaining: i64,
}

/// Projected level-up gain for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProjection {
    pub attribute_id: AttributeId,
    pub attribute: String,
    /// Distinct linked skills with a nonzero increase this level.
    pub skills_increased: usize,
    pub multiplier: u32,
}

/// Everything the player wants to see before deciding to level up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReport {
    pub character: String,
    pub level: u32,
    pub eligibility: Eligibility,
    pub attributes: Vec<AttributeProjection>,
    /// Sum of all projected multipliers; higher ranks a better plan.
    pub efficiency_score: u32,
}

/// Sum the current level's increases over the major skills and compare
/// against the ruleset threshold.
pub fn compute_eligibility(
    rules: &Ruleset,
    majors: &HashSet<SkillId>,
    increases: &HashMap<SkillId, i64>,
) -> Eligibility {
    let total_major_increase: i64 = majors
        .iter()
        .map(|id| increases.get(id).copied().unwrap_or(0).max(0))
        .sum();
    let threshold = i64::from(rules.major_increase_threshold);
    Eligibility {
        total_major_increase,
        eligible: total_major_increase >= threshold,
        remaining: (threshold - total_major_increase).max(0),
    }
}

/// Per-attribute multiplier the character would receive by leveling now.
///
/// Counts distinct linked skills (major and minor alike) whose increase is
/// positive; the ruleset turns that count into a multiplier in
/// `1..=multiplier_cap`. Every catalog attribute appears in the result.
pub fn project_attribute_gains(
    catalog: &Catalog,
    rules: &Ruleset,
    increases: &HashMap<SkillId, i64>,
) -> BTreeMap<AttributeId, u32> {
    let mut gains = BTreeMap::new();
    for attr in catalog.attributes() {
        let n = catalog
            .skills_by_attribute(attr.id)
            .iter()
            .filter(|s| increases.get(&s.id).copied().unwrap_or(0) > 0)
            .count();
        gains.insert(attr.id, rules.multiplier(n));
    }
    gains
}

/// Advisory score for ranking training plans; max is
/// `multiplier_cap * attribute count`.
pub fn efficiency_score(gains: &BTreeMap<AttributeId, u32>) -> u32 {
    gains.values().sum()
}

/// Bundle eligibility, projections, and score for one character level.
pub fn level_report(
    catalog: &Catalog,
    rules: &Ruleset,
    character: &str,
    level: u32,
    majors: &HashSet<SkillId>,
    increases: &HashMap<SkillId, i64>,
) -> LevelReport {
    let eligibility = compute_eligibility(rules, majors, increases);
    let gains = project_attribute_gains(catalog, rules, increases);
    let efficiency_score = efficiency_score(&gains);
    let attributes = catalog
        .attributes()
        .iter()
        .map(|attr| {
            let multiplier = gains.get(&attr.id).copied().unwrap_or(1);
            AttributeProjection {
                attribute_id: attr.id,
                attribute: attr.name.clone(),
                skills_increased: catalog
                    .skills_by_attribute(attr.id)
                    .iter()
                    .filter(|s| increases.get(&s.id).copied().unwrap_or(0) > 0)
                    .count(),
                multiplier,
            }
        })
        .collect();
    LevelReport {
        character: character.to_string(),
        level,
        eligibility,
        attributes,
        efficiency_score,
    }
}
