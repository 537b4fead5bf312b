//! Error types for oblevel.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObLevelError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Character already exists: {0}")]
    DuplicateCharacter(String),

    #[error("Unknown skill: {0}")]
    InvalidSkill(String),

    #[error("Unknown attribute: {0}")]
    AttributeNotFound(String),

    #[error("Level {requested} is not open for training (open level is {current})")]
    LevelNotOpen { requested: u32, current: u32 },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ObLevelError>;
