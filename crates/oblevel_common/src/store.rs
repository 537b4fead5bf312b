//! SQLite-backed progress ledger.
//!
//! One database file holds the seeded catalog, every character, their
//! major-skill selections, and the per-level progress rows. All writes go
//! through one mutex-guarded connection; that is enough serialization for
//! a single-player tool.

use crate::catalog::{Catalog, Skill, SkillId};
use crate::engine::{self, LevelReport};
use crate::error::{ObLevelError, Result};
use crate::rules::Ruleset;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A tracked character. All ledger rows are scoped to one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    /// The open level; training always lands here.
    pub current_level: u32,
    pub created_at: DateTime<Utc>,
}

/// One skill's ledger row for one level of one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: i64,
    pub character_id: i64,
    pub skill_id: SkillId,
    pub level: u32,
    /// Skill rating when the level opened. Immutable once written.
    pub prevalue: i64,
    /// Skill rating now. The only field training updates.
    pub curvalue: i64,
    pub updated_at: DateTime<Utc>,
}

impl ProgressEntry {
    pub fn increase(&self) -> i64 {
        self.curvalue - self.prevalue
    }
}

/// A row of the `stats_map` reporting view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    pub skill: String,
    pub attribute: String,
    pub major: bool,
    pub level: u32,
    pub prevalue: i64,
    pub curvalue: i64,
    pub increase: i64,
    pub sort_order: i64,
}

/// Leveling store backed by SQLite.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
    catalog: Catalog,
    rules: Ruleset,
}

impl Store {
    /// Open or create a store with the standard catalog and default rules.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, Ruleset::default())
    }

    /// Open or create a store with an explicit ruleset.
    pub fn open_with(path: &Path, rules: Ruleset) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path.to_path_buf(),
            catalog: Catalog::standard(),
            rules,
        };
        store.init_schema()?;
        store.seed_catalog()?;
        info!(db = %store.db_path.display(), "leveling store open");
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS attributes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY,
                attribute_id INTEGER NOT NULL REFERENCES attributes(id),
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL,
                class TEXT NOT NULL,
                sort_order INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                current_level INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS major_skills (
                character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
                skill_id INTEGER NOT NULL REFERENCES skills(id),
                PRIMARY KEY (character_id, skill_id)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
                skill_id INTEGER NOT NULL REFERENCES skills(id),
                level INTEGER NOT NULL,
                prevalue INTEGER NOT NULL,
                curvalue INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (character_id, skill_id, level)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_progress_char_level ON progress(character_id, level)",
            [],
        )?;

        // Reporting views consumed by external tooling.
        conn.execute(
            r#"
            CREATE VIEW IF NOT EXISTS skill_map AS
            SELECT s.id AS skill_id, s.name AS skill, a.name AS attr,
                   s.class AS class, s.description AS skilldesc, s.sort_order
            FROM skills s
            JOIN attributes a ON a.id = s.attribute_id
            "#,
            [],
        )?;
        conn.execute(
            r#"
            CREATE VIEW IF NOT EXISTS stats_map AS
            SELECT p.character_id, c.name AS character, s.name AS skill,
                   a.name AS attr, p.level, p.prevalue, p.curvalue,
                   p.curvalue - p.prevalue AS increase,
                   CASE WHEN m.skill_id IS NULL THEN 0 ELSE 1 END AS major,
                   s.sort_order
            FROM progress p
            JOIN skills s ON s.id = p.skill_id
            JOIN attributes a ON a.id = s.attribute_id
            JOIN characters c ON c.id = p.character_id
            LEFT JOIN major_skills m
                   ON m.character_id = p.character_id AND m.skill_id = p.skill_id
            "#,
            [],
        )?;

        Ok(())
    }

    /// Load the catalog rows. `INSERT OR IGNORE` keeps re-runs idempotent.
    fn seed_catalog(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        for attr in self.catalog.attributes() {
            conn.execute(
                "INSERT OR IGNORE INTO attributes (id, name, description) VALUES (?, ?, ?)",
                params![attr.id.0, &attr.name, &attr.description],
            )?;
        }
        for skill in self.catalog.skills() {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO skills (id, attribute_id, name, description, class, sort_order)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    skill.id.0,
                    skill.attribute_id.0,
                    &skill.name,
                    &skill.description,
                    skill.class.as_str(),
                    skill.sort_order
                ],
            )?;
        }
        Ok(())
    }

    /// Names of user-visible tables and views, for diagnostics.
    pub fn tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    // ---- characters -----------------------------------------------------

    pub fn create_character(&self, name: &str) -> Result<Character> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM characters WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(ObLevelError::DuplicateCharacter(name.to_string()));
        }
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO characters (name, current_level, created_at) VALUES (?, 0, ?)",
            params![name, created_at],
        )?;
        let id = conn.last_insert_rowid();
        info!(character = name, "character created");
        Ok(Character {
            id,
            name: name.to_string(),
            current_level: 0,
            created_at,
        })
    }

    pub fn character(&self, name: &str) -> Result<Character> {
        let conn = self.conn.lock().unwrap();
        Self::character_locked(&conn, name)
    }

    fn character_locked(conn: &Connection, name: &str) -> Result<Character> {
        conn.query_row(
            "SELECT id, name, current_level, created_at FROM characters WHERE name = ?",
            params![name],
            |row| {
                Ok(Character {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    current_level: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| ObLevelError::CharacterNotFound(name.to_string()))
    }

    pub fn characters(&self) -> Result<Vec<Character>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, current_level, created_at FROM characters ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Character {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    current_level: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Remove a character and, through cascade, every ledger and
    /// major-skill row it owns. Unknown names are an error, not a no-op.
    pub fn delete_character(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM characters WHERE name = ?", params![name])?;
        if deleted == 0 {
            return Err(ObLevelError::CharacterNotFound(name.to_string()));
        }
        info!(character = name, "character deleted");
        Ok(())
    }

    // ---- major skills ---------------------------------------------------

    /// Replace the character's major-skill selection.
    pub fn set_major_skills(&self, character: &str, skill_names: &[String]) -> Result<Vec<Skill>> {
        let mut picked = Vec::new();
        for name in skill_names {
            picked.push(self.catalog.skill_by_name(name)?.clone());
        }
        let mut unique: HashSet<SkillId> = HashSet::new();
        picked.retain(|s| unique.insert(s.id));
        if picked.len() > self.rules.max_major_skills {
            return Err(ObLevelError::ConstraintViolation(format!(
                "at most {} major skills, got {}",
                self.rules.max_major_skills,
                picked.len()
            )));
        }

        let mut conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM major_skills WHERE character_id = ?",
            params![character.id],
        )?;
        for skill in &picked {
            tx.execute(
                "INSERT INTO major_skills (character_id, skill_id) VALUES (?, ?)",
                params![character.id, skill.id.0],
            )?;
        }
        tx.commit()?;
        debug!(character = %character.name, majors = picked.len(), "major skills set");
        Ok(picked)
    }

    pub fn major_skills(&self, character: &str) -> Result<HashSet<SkillId>> {
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        let mut stmt =
            conn.prepare("SELECT skill_id FROM major_skills WHERE character_id = ?")?;
        let ids = stmt
            .query_map(params![character.id], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(SkillId).collect())
    }

    // ---- progress ledger ------------------------------------------------

    /// Record a training session: the skill now sits at `value`.
    ///
    /// First write for `(character, skill, level)` opens the row with
    /// `prevalue` carried forward from the last recorded level (0 when
    /// there is none); later writes touch `curvalue` only. Training must
    /// target the character's open level.
    pub fn record_training(
        &self,
        character: &str,
        skill: &str,
        level: u32,
        value: i64,
    ) -> Result<ProgressEntry> {
        let skill = self.catalog.skill_by_name(skill)?.clone();
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        if level != character.current_level {
            return Err(ObLevelError::LevelNotOpen {
                requested: level,
                current: character.current_level,
            });
        }

        let now = Utc::now();
        let existing =
            Self::entry_locked(&conn, character.id, skill.id, level)?;
        let entry = match existing {
            Some(mut entry) => {
                conn.execute(
                    "UPDATE progress SET curvalue = ?, updated_at = ? WHERE id = ?",
                    params![value, now, entry.id],
                )?;
                entry.curvalue = value;
                entry.updated_at = now;
                entry
            }
            None => {
                let prevalue = Self::carry_value(&conn, character.id, skill.id, level)?;
                conn.execute(
                    r#"
                    INSERT INTO progress (character_id, skill_id, level, prevalue, curvalue, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                    params![character.id, skill.id.0, level, prevalue, value, now],
                )?;
                ProgressEntry {
                    id: conn.last_insert_rowid(),
                    character_id: character.id,
                    skill_id: skill.id,
                    level,
                    prevalue,
                    curvalue: value,
                    updated_at: now,
                }
            }
        };
        debug!(
            character = %character.name,
            skill = %skill.name,
            level,
            curvalue = entry.curvalue,
            increase = entry.increase(),
            "training recorded"
        );
        Ok(entry)
    }

    /// Bump a skill by one point at the character's open level.
    pub fn increment(&self, character: &str, skill: &str) -> Result<ProgressEntry> {
        let snapshot = self.character(character)?;
        let level = snapshot.current_level;
        let current = match self.entry(character, skill, level)? {
            Some(entry) => entry.curvalue,
            None => {
                let resolved = self.catalog.skill_by_name(skill)?;
                let conn = self.conn.lock().unwrap();
                Self::carry_value(&conn, snapshot.id, resolved.id, level)?
            }
        };
        self.record_training(character, skill, level, current + 1)
    }

    /// Last known `curvalue` strictly below `level`; 0 for fresh skills.
    fn carry_value(
        conn: &Connection,
        character_id: i64,
        skill_id: SkillId,
        level: u32,
    ) -> Result<i64> {
        let carried: Option<i64> = conn
            .query_row(
                "SELECT curvalue FROM progress \
                 WHERE character_id = ? AND skill_id = ? AND level < ? \
                 ORDER BY level DESC LIMIT 1",
                params![character_id, skill_id.0, level],
                |row| row.get(0),
            )
            .optional()?;
        Ok(carried.unwrap_or(0))
    }

    fn entry_locked(
        conn: &Connection,
        character_id: i64,
        skill_id: SkillId,
        level: u32,
    ) -> Result<Option<ProgressEntry>> {
        let entry = conn
            .query_row(
                "SELECT id, character_id, skill_id, level, prevalue, curvalue, updated_at \
                 FROM progress WHERE character_id = ? AND skill_id = ? AND level = ?",
                params![character_id, skill_id.0, level],
                |row| {
                    Ok(ProgressEntry {
                        id: row.get(0)?,
                        character_id: row.get(1)?,
                        skill_id: SkillId(row.get(2)?),
                        level: row.get(3)?,
                        prevalue: row.get(4)?,
                        curvalue: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    pub fn entry(
        &self,
        character: &str,
        skill: &str,
        level: u32,
    ) -> Result<Option<ProgressEntry>> {
        let skill = self.catalog.skill_by_name(skill)?;
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        Self::entry_locked(&conn, character.id, skill.id, level)
    }

    /// Every recorded level for one skill, level-ascending.
    pub fn history(&self, character: &str, skill: &str) -> Result<Vec<ProgressEntry>> {
        let skill = self.catalog.skill_by_name(skill)?;
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        let mut stmt = conn.prepare(
            "SELECT id, character_id, skill_id, level, prevalue, curvalue, updated_at \
             FROM progress WHERE character_id = ? AND skill_id = ? ORDER BY level ASC",
        )?;
        let rows = stmt
            .query_map(params![character.id, skill.id.0], |row| {
                Ok(ProgressEntry {
                    id: row.get(0)?,
                    character_id: row.get(1)?,
                    skill_id: SkillId(row.get(2)?),
                    level: row.get(3)?,
                    prevalue: row.get(4)?,
                    curvalue: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// `curvalue - prevalue` at one level; 0 when nothing is recorded.
    pub fn increase(&self, character: &str, skill: &str, level: u32) -> Result<i64> {
        Ok(self
            .entry(character, skill, level)?
            .map(|e| e.increase())
            .unwrap_or(0))
    }

    /// Snapshot of every skill's increase at one level. The engine's input.
    pub fn level_increases(&self, character: &str, level: u32) -> Result<HashMap<SkillId, i64>> {
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        let mut stmt = conn.prepare(
            "SELECT skill_id, curvalue - prevalue FROM progress \
             WHERE character_id = ? AND level = ?",
        )?;
        let rows = stmt
            .query_map(params![character.id, level], |row| {
                Ok((SkillId(row.get(0)?), row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }

    /// Close the open level and open the next one.
    ///
    /// Every skill's closing `curvalue` is copied forward as the new
    /// level's `prevalue` and `curvalue`, so each level's basis is written
    /// once and never rewritten. Eligibility is the caller's concern; the
    /// ledger only moves the boundary.
    pub fn level_up(&self, character: &str) -> Result<u32> {
        let mut conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;
        let next = character.current_level + 1;
        let now = Utc::now();

        let tx = conn.transaction()?;
        for skill in self.catalog.skills() {
            let carried: Option<i64> = tx
                .query_row(
                    "SELECT curvalue FROM progress \
                     WHERE character_id = ? AND skill_id = ? AND level <= ? \
                     ORDER BY level DESC LIMIT 1",
                    params![character.id, skill.id.0, character.current_level],
                    |row| row.get(0),
                )
                .optional()?;
            let carried = carried.unwrap_or(0);
            tx.execute(
                r#"
                INSERT INTO progress (character_id, skill_id, level, prevalue, curvalue, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![character.id, skill.id.0, next, carried, carried, now],
            )?;
        }
        tx.execute(
            "UPDATE characters SET current_level = ? WHERE id = ?",
            params![next, character.id],
        )?;
        tx.commit()?;
        info!(character = %character.name, level = next, "leveled up");
        Ok(next)
    }

    // ---- reporting ------------------------------------------------------

    /// Rows of the `stats_map` view, majors first then display order.
    /// `level = None` returns the full history (export).
    pub fn stats_map(&self, character: &str, level: Option<u32>) -> Result<Vec<StatsRow>> {
        let conn = self.conn.lock().unwrap();
        let character = Self::character_locked(&conn, character)?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StatsRow> {
            Ok(StatsRow {
                skill: row.get(0)?,
                attribute: row.get(1)?,
                major: row.get::<_, i64>(2)? != 0,
                level: row.get(3)?,
                prevalue: row.get(4)?,
                curvalue: row.get(5)?,
                increase: row.get(6)?,
                sort_order: row.get(7)?,
            })
        };
        let rows = match level {
            Some(level) => {
                let mut stmt = conn.prepare(
                    "SELECT skill, attr, major, level, prevalue, curvalue, increase, sort_order \
                     FROM stats_map WHERE character_id = ? AND level = ? \
                     ORDER BY major DESC, sort_order ASC",
                )?;
                let rows = stmt
                    .query_map(params![character.id, level], map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT skill, attr, major, level, prevalue, curvalue, increase, sort_order \
                     FROM stats_map WHERE character_id = ? \
                     ORDER BY level ASC, major DESC, sort_order ASC",
                )?;
                let rows = stmt
                    .query_map(params![character.id], map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// Eligibility plus attribute projections for the open level.
    pub fn report(&self, character: &str) -> Result<LevelReport> {
        let snapshot = self.character(character)?;
        let majors = self.major_skills(character)?;
        let increases = self.level_increases(character, snapshot.current_level)?;
        Ok(engine::level_report(
            &self.catalog,
            &self.rules,
            &snapshot.name,
            snapshot.current_level,
            &majors,
            &increases,
        ))
    }
}
