//! Domain catalog: attributes, skills, and the seed edition.
//!
//! The catalog is reference data, built once and never mutated. Major-skill
//! selection is deliberately NOT part of it; majors belong to a character
//! build, so one shared catalog serves every character (see
//! [`crate::store::Store::set_major_skills`]).

use crate::error::{ObLevelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an attribute in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeId(pub i64);

/// Stable identifier of a skill in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillId(pub i64);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad class a skill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillClass {
    Combat,
    Stealth,
    Magic,
}

impl SkillClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillClass::Combat => "combat",
            SkillClass::Stealth => "stealth",
            SkillClass::Magic => "magic",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "combat" => Ok(SkillClass::Combat),
            "stealth" => Ok(SkillClass::Stealth),
            "magic" => Ok(SkillClass::Magic),
            other => Err(ObLevelError::ConstraintViolation(format!(
                "unknown skill class: {other}"
            ))),
        }
    }
}

impl fmt::Display for SkillClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the seven character attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub description: String,
}

/// A trainable skill, linked to exactly one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub attribute_id: AttributeId,
    pub name: String,
    pub description: String,
    pub class: SkillClass,
    /// Display ordering hint within the skill list.
    pub sort_order: i64,
}

/// Immutable reference data shared by every character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    attributes: Vec<Attribute>,
    skills: Vec<Skill>,
}

const SEED_ATTRIBUTES: &[(i64, &str, &str)] = &[
    (1, "Strength", "Raw power; governs melee damage and carry weight"),
    (2, "Intelligence", "Reasoning and memory; governs magicka pool"),
    (3, "Willpower", "Focus and discipline; governs magicka regeneration"),
    (4, "Agility", "Balance and reflexes; governs bow damage and staggering"),
    (5, "Speed", "Quickness; governs movement and jumping"),
    (6, "Endurance", "Toughness; governs health and fatigue"),
    (7, "Personality", "Charm; governs disposition and bartering"),
];

const SEED_SKILLS: &[(i64, i64, &str, SkillClass, &str)] = &[
    (1, 1, "Blade", SkillClass::Combat, "Swords, daggers, and claymores"),
    (2, 1, "Blunt", SkillClass::Combat, "Maces, axes, and hammers"),
    (3, 1, "Hand to Hand", SkillClass::Combat, "Unarmed strikes"),
    (4, 2, "Alchemy", SkillClass::Magic, "Potion and poison brewing"),
    (5, 2, "Conjuration", SkillClass::Magic, "Summoned creatures and bound weapons"),
    (6, 2, "Mysticism", SkillClass::Magic, "Soul trapping, detection, and dispelling"),
    (7, 3, "Alteration", SkillClass::Magic, "Shields, locks, and water breathing"),
    (8, 3, "Destruction", SkillClass::Magic, "Fire, frost, and shock damage"),
    (9, 3, "Restoration", SkillClass::Magic, "Healing and fortification"),
    (10, 4, "Marksman", SkillClass::Combat, "Bows and arrows"),
    (11, 4, "Security", SkillClass::Stealth, "Lockpicking"),
    (12, 4, "Sneak", SkillClass::Stealth, "Moving unseen and pickpocketing"),
    (13, 5, "Athletics", SkillClass::Combat, "Running and swimming"),
    (14, 5, "Acrobatics", SkillClass::Stealth, "Jumping and falling"),
    (15, 5, "Light Armor", SkillClass::Stealth, "Leather, chain, and mithril"),
    (16, 6, "Armorer", SkillClass::Combat, "Repairing weapons and armor"),
    (17, 6, "Block", SkillClass::Combat, "Shield and weapon parries"),
    (18, 6, "Heavy Armor", SkillClass::Combat, "Steel, dwarven, and ebony"),
    (19, 7, "Illusion", SkillClass::Magic, "Charm, invisibility, and light"),
    (20, 7, "Mercantile", SkillClass::Stealth, "Buying and selling"),
    (21, 7, "Speechcraft", SkillClass::Stealth, "Persuasion"),
];

impl Catalog {
    /// Build a catalog from explicit parts, checking that every skill
    /// references an existing attribute.
    pub fn new(attributes: Vec<Attribute>, skills: Vec<Skill>) -> Result<Self> {
        for skill in &skills {
            if !attributes.iter().any(|a| a.id == skill.attribute_id) {
                return Err(ObLevelError::AttributeNotFound(format!(
                    "skill {} references attribute {}",
                    skill.name, skill.attribute_id
                )));
            }
        }
        Ok(Self { attributes, skills })
    }

    /// The standard edition: 7 attributes, 21 skills, 3 per attribute.
    pub fn standard() -> Self {
        let attributes = SEED_ATTRIBUTES
            .iter()
            .map(|&(id, name, desc)| Attribute {
                id: AttributeId(id),
                name: name.to_string(),
                description: desc.to_string(),
            })
            .collect();
        let skills = SEED_SKILLS
            .iter()
            .map(|&(id, attr, name, class, desc)| Skill {
                id: SkillId(id),
                attribute_id: AttributeId(attr),
                name: name.to_string(),
                description: desc.to_string(),
                class,
                sort_order: id,
            })
            .collect();
        Self { attributes, skills }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn attribute(&self, id: AttributeId) -> Result<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| ObLevelError::AttributeNotFound(id.to_string()))
    }

    pub fn skill(&self, id: SkillId) -> Result<&Skill> {
        self.skills
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ObLevelError::InvalidSkill(id.to_string()))
    }

    /// Case-insensitive lookup by display name.
    pub fn skill_by_name(&self, name: &str) -> Result<&Skill> {
        self.skills
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ObLevelError::InvalidSkill(name.to_string()))
    }

    /// Case-insensitive lookup by display name.
    pub fn attribute_by_name(&self, name: &str) -> Result<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ObLevelError::AttributeNotFound(name.to_string()))
    }

    /// Skills linked to one attribute, in display order.
    pub fn skills_by_attribute(&self, id: AttributeId) -> Vec<&Skill> {
        let mut linked: Vec<&Skill> = self
            .skills
            .iter()
            .filter(|s| s.attribute_id == id)
            .collect();
        linked.sort_by_key(|s| s.sort_order);
        linked
    }
}
