//! Ledger store integration tests against a real on-disk database.

use oblevel_common::{AttributeId, ObLevelError, Store};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(&dir.path().join("oblevels.db")).expect("open store")
}

#[test]
fn record_then_entry_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    store.record_training("Hero", "Blade", 0, 4).unwrap();
    let entry = store.entry("Hero", "Blade", 0).unwrap().expect("entry");
    assert_eq!(entry.curvalue, 4);
    assert_eq!(entry.prevalue, 0);
    assert_eq!(entry.increase(), 4);
}

#[test]
fn second_record_updates_instead_of_inserting() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    store.record_training("Hero", "Blade", 0, 2).unwrap();
    store.record_training("Hero", "Blade", 0, 5).unwrap();

    let history = store.history("Hero", "Blade").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].curvalue, 5);
    // The opening basis never moves on the update path.
    assert_eq!(history[0].prevalue, 0);
}

#[test]
fn unknown_skill_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    let err = store.record_training("Hero", "Axe", 0, 3).unwrap_err();
    assert!(matches!(err, ObLevelError::InvalidSkill(_)));
}

#[test]
fn unknown_character_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let err = store.record_training("Nobody", "Blade", 0, 3).unwrap_err();
    assert!(matches!(err, ObLevelError::CharacterNotFound(_)));
}

#[test]
fn duplicate_character_is_rejected_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    let err = store.create_character("hero").unwrap_err();
    assert!(matches!(err, ObLevelError::DuplicateCharacter(_)));
    assert_eq!(store.characters().unwrap().len(), 1);
}

#[test]
fn characters_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store.create_character("Villain").unwrap();

    store.record_training("Hero", "Blade", 0, 10).unwrap();
    assert!(store.entry("Villain", "Blade", 0).unwrap().is_none());
    assert_eq!(store.increase("Villain", "Blade", 0).unwrap(), 0);
}

#[test]
fn delete_character_cascades_to_the_ledger() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store
        .set_major_skills("Hero", &["Blade".into(), "Block".into()])
        .unwrap();
    store.record_training("Hero", "Blade", 0, 4).unwrap();
    store.record_training("Hero", "Sneak", 0, 2).unwrap();

    store.delete_character("Hero").unwrap();
    assert!(store.characters().unwrap().is_empty());

    // A fresh character of the same name starts with an empty history.
    store.create_character("Hero").unwrap();
    for skill in store.catalog().skills() {
        assert!(store.history("Hero", &skill.name).unwrap().is_empty());
    }
    assert!(store.major_skills("Hero").unwrap().is_empty());
}

#[test]
fn delete_unknown_character_errors() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let err = store.delete_character("Nobody").unwrap_err();
    assert!(matches!(err, ObLevelError::CharacterNotFound(_)));
}

#[test]
fn seeding_is_idempotent_across_reopens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oblevels.db");
    drop(Store::open(&path).unwrap());
    drop(Store::open(&path).unwrap());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let attrs: i64 = conn
        .query_row("SELECT COUNT(*) FROM attributes", [], |r| r.get(0))
        .unwrap();
    let skills: i64 = conn
        .query_row("SELECT COUNT(*) FROM skills", [], |r| r.get(0))
        .unwrap();
    assert_eq!(attrs, 7);
    assert_eq!(skills, 21);
}

#[test]
fn tables_lists_the_reporting_views() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let tables = store.tables().unwrap();
    for expected in ["attributes", "skills", "characters", "progress", "skill_map", "stats_map"] {
        assert!(tables.iter().any(|t| t == expected), "missing {expected}");
    }
}

#[test]
fn level_up_carries_values_forward_and_closes_the_level() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store.record_training("Hero", "Blade", 0, 30).unwrap();

    assert_eq!(store.level_up("Hero").unwrap(), 1);

    // The new level opens with the closing value as its immutable basis.
    let entry = store.entry("Hero", "Blade", 1).unwrap().expect("entry");
    assert_eq!(entry.prevalue, 30);
    assert_eq!(entry.curvalue, 30);
    assert_eq!(entry.increase(), 0);

    // Untrained skills carry their implicit 0.
    let sneak = store.entry("Hero", "Sneak", 1).unwrap().expect("entry");
    assert_eq!(sneak.prevalue, 0);

    // The closed level rejects further training.
    let err = store.record_training("Hero", "Blade", 0, 99).unwrap_err();
    assert!(matches!(
        err,
        ObLevelError::LevelNotOpen { requested: 0, current: 1 }
    ));

    // Training on the open level builds on the carried basis.
    store.record_training("Hero", "Blade", 1, 32).unwrap();
    assert_eq!(store.increase("Hero", "Blade", 1).unwrap(), 2);
}

#[test]
fn hero_scenario_reaches_eligibility() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store
        .set_major_skills(
            "Hero",
            &["Blade".into(), "Block".into(), "Athletics".into()],
        )
        .unwrap();

    store.record_training("Hero", "Blade", 0, 4).unwrap();
    store.record_training("Hero", "Block", 0, 3).unwrap();
    store.record_training("Hero", "Athletics", 0, 3).unwrap();

    let report = store.report("Hero").unwrap();
    assert_eq!(report.eligibility.total_major_increase, 10);
    assert!(report.eligibility.eligible);
    assert_eq!(report.eligibility.remaining, 0);

    // One skill up under each of Strength, Endurance, and Speed.
    let multiplier = |name: &str| {
        report
            .attributes
            .iter()
            .find(|a| a.attribute == name)
            .unwrap()
            .multiplier
    };
    assert_eq!(multiplier("Strength"), 2);
    assert_eq!(multiplier("Endurance"), 2);
    assert_eq!(multiplier("Speed"), 2);
    assert_eq!(multiplier("Intelligence"), 1);
    assert_eq!(report.efficiency_score, 2 * 3 + 4);
}

#[test]
fn fresh_character_reports_the_zero_state() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    let report = store.report("Hero").unwrap();
    assert_eq!(report.level, 0);
    assert_eq!(report.eligibility.total_major_increase, 0);
    assert!(!report.eligibility.eligible);
    assert_eq!(report.eligibility.remaining, 10);
    assert!(report.attributes.iter().all(|a| a.multiplier == 1));
}

#[test]
fn major_selection_is_bounded_and_replaceable() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();

    let too_many: Vec<String> = store
        .catalog()
        .skills()
        .iter()
        .take(8)
        .map(|s| s.name.clone())
        .collect();
    let err = store.set_major_skills("Hero", &too_many).unwrap_err();
    assert!(matches!(err, ObLevelError::ConstraintViolation(_)));

    store
        .set_major_skills("Hero", &["Blade".into(), "Block".into()])
        .unwrap();
    store.set_major_skills("Hero", &["Sneak".into()]).unwrap();

    let majors = store.major_skills("Hero").unwrap();
    let sneak = store.catalog().skill_by_name("Sneak").unwrap().id;
    assert_eq!(majors.len(), 1);
    assert!(majors.contains(&sneak));
}

#[test]
fn stats_map_sorts_majors_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store.set_major_skills("Hero", &["Sneak".into()]).unwrap();
    store.record_training("Hero", "Blade", 0, 2).unwrap();
    store.record_training("Hero", "Sneak", 0, 3).unwrap();

    let rows = store.stats_map("Hero", Some(0)).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].skill, "Sneak");
    assert!(rows[0].major);
    assert_eq!(rows[0].increase, 3);
    assert_eq!(rows[1].skill, "Blade");
    assert!(!rows[1].major);
    assert_eq!(rows[1].attribute, "Strength");
}

#[test]
fn increases_reset_after_level_up() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_character("Hero").unwrap();
    store.set_major_skills("Hero", &["Blade".into()]).unwrap();

    for value in [4, 10] {
        store.record_training("Hero", "Blade", 0, value).unwrap();
    }
    assert!(store.report("Hero").unwrap().eligibility.eligible);

    store.level_up("Hero").unwrap();
    let report = store.report("Hero").unwrap();
    assert_eq!(report.level, 1);
    assert_eq!(report.eligibility.total_major_increase, 0);
    assert!(!report.eligibility.eligible);

    // Strength shows no increased skills on the new level either.
    let strength = store.catalog().attribute_by_name("Strength").unwrap().id;
    assert_eq!(strength, AttributeId(1));
    assert!(report
        .attributes
        .iter()
        .all(|a| a.skills_increased == 0 && a.multiplier == 1));
}
