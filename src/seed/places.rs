//! Locations, chapters and the chapter-location links.

use rusqlite::Connection;
use tracing::info;

use super::{RecordOutcome, SeedStep, StepReport};
use crate::error::{CodexError, Result};
use crate::fixtures::{
    parse_record, ChapterRecord, FixtureDir, PlaceRecord, CHAPTER_FILE, PLACE_FILE,
};
use crate::model::{PLACEHOLDER_DESCRIPTION, SENTINEL_CONTINENT};
use crate::store::{repo, Store};
use crate::ui::Ui;

/// Id of the continent called `name`, falling back to the sentinel
/// continent, which is created with the next free id when it is missing too
pub fn resolve_continent(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(id) = repo::continent_id_by_name(conn, name)? {
        return Ok(id);
    }
    if let Some(id) = repo::continent_id_by_name(conn, SENTINEL_CONTINENT)? {
        return Ok(id);
    }

    let id = repo::next_continent_id(conn)?;
    repo::insert_continent(conn, id, SENTINEL_CONTINENT, "")?;
    info!(id, "created sentinel continent");
    Ok(id)
}

/// Create a location unless one with the same name already exists. An
/// existing location whose continent was cleared by a continent reset is
/// pointed at its continent again.
pub fn upsert_location(conn: &Connection, place: &PlaceRecord) -> Result<RecordOutcome> {
    let name = place.name.trim();
    if name.is_empty() {
        return Ok(RecordOutcome::Skipped("missing location name".to_string()));
    }
    if let Some(id) = repo::location_id_by_name(conn, name)? {
        if repo::location_continent_id(conn, id)?.is_some() {
            return Ok(RecordOutcome::Skipped("already exists".to_string()));
        }
        let continent_id = resolve_continent(conn, place.continent.trim())?;
        repo::set_location_continent(conn, id, continent_id)?;
        return Ok(RecordOutcome::Skipped("already exists; continent restored".to_string()));
    }

    let continent_id = resolve_continent(conn, place.continent.trim())?;
    let description = match place.description.trim() {
        "" => PLACEHOLDER_DESCRIPTION,
        text => text,
    };
    repo::insert_location(conn, name, description, Some(continent_id))?;
    Ok(RecordOutcome::Inserted)
}

pub fn upsert_locations(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(PLACE_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Locations);

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Locations.label());
        match parse_record::<PlaceRecord>(item) {
            Ok(place) => {
                let outcome = upsert_location(conn, &place);
                report.record(&place.name, outcome, ui);
            }
            Err(err) => report.malformed(index, &err, ui),
        }
    }

    Ok(report)
}

/// Insert every chapter. There is no existence check: on a repeat run each
/// chapter fails on its primary key and is counted as failed.
pub fn create_chapters(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(CHAPTER_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Chapters);

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Chapters.label());
        match parse_record::<ChapterRecord>(item) {
            Ok(chapter) => {
                let outcome =
                    repo::insert_chapter(conn, chapter.chapter, &chapter.title, &chapter.summary)
                        .map(|_| RecordOutcome::Inserted);
                report.record(&chapter.title, outcome, ui);
            }
            Err(err) => report.malformed(index, &err, ui),
        }
    }

    Ok(report)
}

/// Link one chapter (found by title) to each of its locations, creating
/// unknown locations with a placeholder description. Runs as one
/// transaction. Returns `(new_links, existing_links)`.
fn link_chapter(store: &mut Store, chapter: &ChapterRecord) -> Result<(u64, u64)> {
    let tx = store.transaction()?;

    let number = repo::chapter_number_by_title(&tx, &chapter.title)?.ok_or_else(|| {
        CodexError::not_found("chapter title", &chapter.title)
    })?;

    let mut linked = 0;
    let mut existing = 0;
    for name in &chapter.locations {
        let location_id = match repo::location_id_by_name(&tx, name)? {
            Some(id) => id,
            None => repo::insert_location(&tx, name, PLACEHOLDER_DESCRIPTION, None)?,
        };

        if repo::chapter_location_exists(&tx, number, location_id)? {
            existing += 1;
        } else {
            repo::insert_chapter_location(&tx, number, location_id)?;
            linked += 1;
        }
    }

    tx.commit()?;
    Ok((linked, existing))
}

pub fn link_chapter_locations(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(CHAPTER_FILE)?;
    let mut report = StepReport::new(SeedStep::ChapterLocations);

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::ChapterLocations.label());
        let chapter = match parse_record::<ChapterRecord>(item) {
            Ok(chapter) => chapter,
            Err(err) => {
                report.malformed(index, &err, ui);
                continue;
            }
        };

        match link_chapter(store, &chapter) {
            Ok((linked, existing)) => {
                report.inserted += linked;
                report.skipped += existing;
            }
            Err(err) => report.record(&chapter.title, Err(err), ui),
        }
    }

    Ok(report)
}
