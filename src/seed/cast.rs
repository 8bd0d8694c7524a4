//! Characters, their weapons and the relationship edges between them.

use std::collections::BTreeSet;

use rusqlite::Connection;
use serde_json::Value;
use tracing::{debug, info};

use super::{RecordOutcome, SeedStep, StepReport};
use crate::error::Result;
use crate::fixtures::{
    parse_record, CharacterRecord, FixtureDir, WeaponRecord, CHARACTER_FILE, WEAPON_FILE,
};
use crate::model::{NewCharacter, NewWeapon, Race, DEFAULT_ORGANIZATION};
use crate::store::{repo, Store};
use crate::ui::Ui;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn new_character(name: &str, record: &CharacterRecord) -> Result<NewCharacter> {
    let race = match non_blank(record.race.as_deref()) {
        Some(race) => race.parse()?,
        None => Race::default(),
    };

    Ok(NewCharacter {
        name: name.to_string(),
        image: None,
        race,
        ability: record.ability.clone().unwrap_or_default(),
        intro: record.introduction.clone().unwrap_or_default(),
        organization: non_blank(record.organization.as_deref())
            .unwrap_or(DEFAULT_ORGANIZATION)
            .to_string(),
    })
}

/// Make the stored character names equal the fixture's non-blank names.
/// Stale characters are deleted first; missing ones are inserted. Existing
/// characters keep their stored fields.
pub fn reconcile_characters(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(CHARACTER_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Characters);

    // Names come from the raw elements: a record that fails to parse still
    // keeps its stored character.
    let wanted: BTreeSet<String> = items
        .iter()
        .filter_map(|item| non_blank(item.get("name").and_then(Value::as_str)))
        .map(str::to_string)
        .collect();

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match parse_record::<CharacterRecord>(item) {
            Ok(record) => records.push(record),
            Err(err) => report.malformed(index, &err, ui),
        }
    }

    for stale in repo::character_names(conn)?
        .into_iter()
        .filter(|name| !wanted.contains(name))
    {
        if let Some(id) = repo::character_id_by_name(conn, &stale)? {
            report.deleted += repo::delete_character(conn, id)? as u64;
            info!(name = %stale, "deleted character missing from fixture");
        }
    }

    let total = records.len() as u64;
    for (index, record) in records.iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Characters.label());
        let Some(name) = record.trimmed_name() else {
            report.record("(blank)", Ok(RecordOutcome::Skipped("blank name".to_string())), ui);
            continue;
        };

        let outcome = if repo::character_exists(conn, name)? {
            debug!(name, "character already stored");
            Ok(RecordOutcome::Skipped("already exists".to_string()))
        } else {
            new_character(name, record)
                .and_then(|character| repo::insert_character(conn, &character))
                .map(|_| RecordOutcome::Inserted)
        };
        report.record(name, outcome, ui);
    }

    Ok(report)
}

fn seed_weapon(conn: &Connection, record: &WeaponRecord) -> Result<RecordOutcome> {
    let skip = |reason: &str| Ok(RecordOutcome::Skipped(reason.to_string()));

    let Some(name) = non_blank(record.name.as_deref()) else {
        return skip("missing name");
    };
    let Some(owner) = non_blank(record.owner.as_deref()) else {
        return skip("no owner");
    };
    let Some(owner_id) = repo::character_id_by_name(conn, owner)? else {
        return skip("owner is not a known character");
    };
    if repo::weapon_exists(conn, name)? {
        return skip("already exists");
    }
    let Some(description) = non_blank(record.introduction.as_deref()) else {
        return skip("missing introduction");
    };

    repo::insert_weapon(
        conn,
        &NewWeapon {
            name: name.to_string(),
            image: None,
            description: description.to_string(),
            owner_character_id: Some(owner_id),
        },
    )?;
    Ok(RecordOutcome::Inserted)
}

pub fn seed_weapons(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(WEAPON_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Weapons);

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Weapons.label());
        match parse_record::<WeaponRecord>(item) {
            Ok(record) => {
                let label = record.name.clone().unwrap_or_default();
                report.record(&label, seed_weapon(conn, &record), ui);
            }
            Err(err) => report.malformed(index, &err, ui),
        }
    }

    Ok(report)
}

/// Insert the edge `from_name -> to_name` of type `kind` unless that exact
/// triple is already stored. Unknown relationship types are created on the
/// fly; unknown characters skip the edge.
pub fn link_characters(
    conn: &Connection,
    from_name: &str,
    to_name: &str,
    kind: &str,
) -> Result<RecordOutcome> {
    let Some(from) = repo::character_id_by_name(conn, from_name.trim())? else {
        return Ok(RecordOutcome::Skipped(format!("unknown character '{}'", from_name)));
    };
    let Some(to) = repo::character_id_by_name(conn, to_name.trim())? else {
        return Ok(RecordOutcome::Skipped(format!("unknown character '{}'", to_name)));
    };

    let kind = kind.trim();
    let kind_id = match repo::relationship_type_id(conn, kind)? {
        Some(id) => id,
        None => {
            info!(kind, "creating relationship type");
            repo::insert_relationship_type(conn, kind, "")?
        }
    };

    if repo::relationship_exists(conn, from, to, kind_id)? {
        return Ok(RecordOutcome::Skipped("edge already exists".to_string()));
    }
    repo::insert_relationship(conn, from, to, kind_id)?;
    Ok(RecordOutcome::Inserted)
}

/// Build edges from every character's `superiors` (counterpart -> entry)
/// and `subordinates` (entry -> counterpart)
pub fn build_relationships(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(CHARACTER_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Relationships);

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Relationships.label());
        let record = match parse_record::<CharacterRecord>(item) {
            Ok(record) => record,
            Err(err) => {
                report.malformed(index, &err, ui);
                continue;
            }
        };
        let Some(name) = record.trimmed_name() else {
            continue;
        };

        for (superior, kind) in &record.superiors {
            let outcome = link_characters(conn, superior, name, kind);
            report.record(&format!("{} -> {}", superior, name), outcome, ui);
        }
        for (subordinate, kind) in &record.subordinates {
            let outcome = link_characters(conn, name, subordinate, kind);
            report.record(&format!("{} -> {}", name, subordinate), outcome, ui);
        }
    }

    Ok(report)
}
