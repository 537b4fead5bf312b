//! oblevel_common - Leveling progress and efficiency engine
//!
//! Tracks a character's skill training per level in a SQLite ledger and
//! derives level-up eligibility and attribute multiplier projections from
//! it, so a player can plan efficient leveling.
//!
//! Layout:
//! - [`catalog`]: the immutable attribute/skill reference data
//! - [`rules`]: threshold and multiplier constants, overridable per edition
//! - [`store`]: the per-character SQLite progress ledger
//! - [`engine`]: pure eligibility and multiplier computations
//! - [`config`]: TOML user configuration

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod store;

pub use catalog::{Attribute, AttributeId, Catalog, Skill, SkillClass, SkillId};
pub use config::Config;
pub use engine::{Eligibility, LevelReport};
pub use error::{ObLevelError, Result};
pub use rules::Ruleset;
pub use store::{Character, ProgressEntry, StatsRow, Store};
