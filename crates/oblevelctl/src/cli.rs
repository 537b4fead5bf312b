//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap. Keeps argument parsing separate
//! from execution logic.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Efficient-leveling tracker CLI
#[derive(Parser)]
#[command(name = "oblevelctl")]
#[command(about = "Track skill training and plan efficient level-ups", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database file (overrides config and the default location)
    #[arg(short = 'd', long, global = true)]
    pub database: Option<PathBuf>,

    /// More logging; repeat for debug output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create and seed the database (safe to re-run)
    Init,

    /// List the store's tables and views
    Tables,

    /// Manage characters
    Character {
        #[command(subcommand)]
        action: CharacterCommands,
    },

    /// Manage a character's major-skill selection
    Majors {
        #[command(subcommand)]
        action: MajorsCommands,
    },

    /// Record a skill's new value at the open level
    Record {
        character: String,
        skill: String,
        value: i64,
    },

    /// Bump a skill by one point
    Inc { character: String, skill: String },

    /// Show eligibility and attribute projections for the open level
    Status {
        character: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show the per-level ledger for one skill
    History {
        character: String,
        skill: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Close the open level and start the next one
    LevelUp {
        character: String,

        /// Level up even while ineligible
        #[arg(long)]
        force: bool,
    },

    /// Dump the character's full stats map as JSON
    Export { character: String },
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// Start tracking a new character
    Create { name: String },

    /// Delete a character and its entire ledger
    Delete { name: String },

    /// List tracked characters
    List {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum MajorsCommands {
    /// Replace the major-skill selection
    Set {
        character: String,

        /// Skill names, e.g. Blade Block Athletics
        #[arg(required = true, num_args = 1..)]
        skills: Vec<String>,
    },

    /// Show the current selection
    Show { character: String },
}
