//! Command execution: every subcommand handler, plus the shared store
//! setup. Domain errors bubble up as `anyhow` errors and are rendered by
//! `main`.

use crate::cli::{CharacterCommands, Cli, Commands, MajorsCommands};
use anyhow::{bail, Context, Result};
use oblevel_common::{Config, LevelReport, Store};
use owo_colors::OwoColorize;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("loading config")?;
    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database_path());
    tracing::debug!(db = %db_path.display(), "using database");
    let store = Store::open_with(&db_path, config.ruleset())
        .with_context(|| format!("opening database {}", db_path.display()))?;

    match cli.command {
        Commands::Init => init(&store),
        Commands::Tables => tables(&store),
        Commands::Character { action } => character(&store, action),
        Commands::Majors { action } => majors(&store, action),
        Commands::Record {
            character,
            skill,
            value,
        } => record(&store, &character, &skill, value),
        Commands::Inc { character, skill } => inc(&store, &character, &skill),
        Commands::Status { character, json } => status(&store, &character, json),
        Commands::History {
            character,
            skill,
            json,
        } => history(&store, &character, &skill, json),
        Commands::LevelUp { character, force } => level_up(&store, &character, force),
        Commands::Export { character } => export(&store, &character),
    }
}

fn init(store: &Store) -> Result<()> {
    // Opening the store created and seeded everything already.
    println!(
        "Database ready at {} ({} attributes, {} skills)",
        store.db_path().display().bold(),
        store.catalog().attributes().len(),
        store.catalog().skills().len()
    );
    Ok(())
}

fn tables(store: &Store) -> Result<()> {
    for name in store.tables()? {
        println!("{name}");
    }
    Ok(())
}

fn character(store: &Store, action: CharacterCommands) -> Result<()> {
    match action {
        CharacterCommands::Create { name } => {
            let character = store.create_character(&name)?;
            println!("Created {} (level {})", character.name.bold(), character.current_level);
        }
        CharacterCommands::Delete { name } => {
            store.delete_character(&name)?;
            println!("Deleted {} and its ledger", name.bold());
        }
        CharacterCommands::List { json } => {
            let characters = store.characters()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&characters)?);
            } else if characters.is_empty() {
                println!("No characters yet; try `oblevelctl character create <name>`");
            } else {
                for c in characters {
                    println!(
                        "{:<20} level {:<3} since {}",
                        c.name.bold(),
                        c.current_level,
                        c.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
    }
    Ok(())
}

fn majors(store: &Store, action: MajorsCommands) -> Result<()> {
    match action {
        MajorsCommands::Set { character, skills } => {
            let picked = store.set_major_skills(&character, &skills)?;
            let names: Vec<&str> = picked.iter().map(|s| s.name.as_str()).collect();
            println!("{} majors: {}", character.bold(), names.join(", "));
        }
        MajorsCommands::Show { character } => {
            let majors = store.major_skills(&character)?;
            if majors.is_empty() {
                println!("{} has no major skills selected", character.bold());
                return Ok(());
            }
            let mut picked: Vec<_> = store
                .catalog()
                .skills()
                .iter()
                .filter(|s| majors.contains(&s.id))
                .collect();
            picked.sort_by_key(|s| s.sort_order);
            for skill in picked {
                let attr = store.catalog().attribute(skill.attribute_id)?;
                println!("{:<14} {:<8} {}", skill.name.bold(), skill.class, attr.name);
            }
        }
    }
    Ok(())
}

fn record(store: &Store, character: &str, skill: &str, value: i64) -> Result<()> {
    let snapshot = store.character(character)?;
    let entry = store.record_training(character, skill, snapshot.current_level, value)?;
    print_entry_line(skill, &entry);
    Ok(())
}

fn inc(store: &Store, character: &str, skill: &str) -> Result<()> {
    let entry = store.increment(character, skill)?;
    print_entry_line(skill, &entry);
    Ok(())
}

fn print_entry_line(skill: &str, entry: &oblevel_common::ProgressEntry) {
    println!(
        "{} now {} at level {} ({} this level)",
        skill.bold(),
        entry.curvalue,
        entry.level,
        format!("+{}", entry.increase()).green()
    );
}

fn status(store: &Store, character: &str, json: bool) -> Result<()> {
    let report = store.report(character)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let rules = store.rules();
    let percent = report.eligibility.total_major_increase.max(0) as u32 * 100
        / rules.major_increase_threshold.max(1);
    println!(
        "{} — level {} — {}% to next level",
        report.character.bold(),
        report.level,
        percent.min(100)
    );
    print_eligibility(&report);

    let rows = store.stats_map(character, Some(report.level))?;
    if rows.is_empty() {
        println!("\nNo training recorded this level");
    } else {
        println!("\n{:<16} {:>6} {:>9}", "Skill".underline(), "Value".underline(), "Increase".underline());
        for row in rows {
            let marker = if row.major { "*" } else { " " };
            let increase = if row.increase > 0 {
                format!("+{}", row.increase).green().to_string()
            } else {
                row.increase.to_string()
            };
            println!("{marker}{:<15} {:>6} {:>9}", row.skill, row.curvalue, increase);
        }
    }

    println!("\n{:<16} {:>10} {:>10}", "Attribute".underline(), "Skills up".underline(), "Multiplier".underline());
    for attr in &report.attributes {
        let mult = format!("x{}", attr.multiplier);
        let mult = if attr.multiplier >= rules.multiplier_cap {
            mult.green().bold().to_string()
        } else if attr.multiplier > 1 {
            mult.green().to_string()
        } else {
            mult.dimmed().to_string()
        };
        println!("{:<16} {:>10} {:>10}", attr.attribute, attr.skills_increased, mult);
    }

    let max_score = rules.multiplier_cap * store.catalog().attributes().len() as u32;
    println!("\nEfficiency score: {} / {}", report.efficiency_score.bold(), max_score);
    Ok(())
}

fn print_eligibility(report: &LevelReport) {
    if report.eligibility.eligible {
        println!(
            "{} ({} major-skill points this level)",
            "Ready to level up".green().bold(),
            report.eligibility.total_major_increase
        );
    } else {
        println!(
            "{} more major-skill point(s) needed ({} so far)",
            report.eligibility.remaining.to_string().yellow(),
            report.eligibility.total_major_increase
        );
    }
}

fn history(store: &Store, character: &str, skill: &str, json: bool) -> Result<()> {
    let entries = store.history(character, skill)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No training recorded for {} yet", skill.bold());
        return Ok(());
    }
    println!("{:<7} {:>6} {:>6} {:>9}", "Level".underline(), "Start".underline(), "Now".underline(), "Increase".underline());
    for entry in entries {
        println!(
            "{:<7} {:>6} {:>6} {:>9}",
            entry.level,
            entry.prevalue,
            entry.curvalue,
            entry.increase()
        );
    }
    Ok(())
}

fn level_up(store: &Store, character: &str, force: bool) -> Result<()> {
    let report = store.report(character)?;
    if !report.eligibility.eligible && !force {
        bail!(
            "{} is not ready: {} more major-skill point(s) needed (--force to override)",
            character,
            report.eligibility.remaining
        );
    }
    print_eligibility(&report);
    let new_level = store.level_up(character)?;
    println!(
        "{} leveled up to {} (efficiency score was {})",
        character.bold(),
        new_level.to_string().bold(),
        report.efficiency_score
    );
    Ok(())
}

fn export(store: &Store, character: &str) -> Result<()> {
    let rows = store.stats_map(character, None)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
