//! Row-level primitives.
//!
//! Every function takes a plain `&Connection`, so it works both on the
//! store's connection and inside a `Transaction` (which derefs to one).

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::model::{now_timestamp, NewCharacter, NewWeapon};
use crate::schema::TableSchema;

pub fn count_rows(conn: &Connection, schema: &TableSchema) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", schema.name);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Delete every row of a table, returning how many were removed
pub fn clear_table(conn: &Connection, schema: &TableSchema) -> Result<usize> {
    Ok(conn.execute(&format!("DELETE FROM {}", schema.name), [])?)
}

fn names(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

// =============================================================================
// Characters
// =============================================================================

pub fn character_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM characters WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn character_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(character_id_by_name(conn, name)?.is_some())
}

/// Distinct character names in id order
pub fn character_names(conn: &Connection) -> Result<Vec<String>> {
    names(conn, "SELECT name FROM characters ORDER BY id")
}

pub fn insert_character(conn: &Connection, character: &NewCharacter) -> Result<i64> {
    conn.execute(
        "INSERT INTO characters (name, image, race, ability, intro, organization, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            character.name,
            character.image,
            character.race.as_str(),
            character.ability,
            character.intro,
            character.organization,
            now_timestamp(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_character_image(conn: &Connection, id: i64, image: &str) -> Result<()> {
    conn.execute(
        "UPDATE characters SET image = ?1 WHERE id = ?2",
        params![image, id],
    )?;
    Ok(())
}

pub fn character_image(conn: &Connection, id: i64) -> Result<Option<String>> {
    Ok(conn
        .query_row("SELECT image FROM characters WHERE id = ?1", [id], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?
        .flatten())
}

pub fn set_character_intro(conn: &Connection, id: i64, intro: &str) -> Result<()> {
    conn.execute(
        "UPDATE characters SET intro = ?1 WHERE id = ?2",
        params![intro, id],
    )?;
    Ok(())
}

/// Delete a character. Relationship edges cascade; owned weapons keep
/// existing with their owner cleared.
pub fn delete_character(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM characters WHERE id = ?1", [id])?)
}

/// Relationship edges touching a character in either direction
pub fn count_relationships_of(conn: &Connection, character_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM character_relationships
         WHERE from_character_id = ?1 OR to_character_id = ?1",
        [character_id],
        |row| row.get(0),
    )?)
}

pub fn count_weapons_owned_by(conn: &Connection, character_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM weapons WHERE owner_character_id = ?1",
        [character_id],
        |row| row.get(0),
    )?)
}

// =============================================================================
// Weapons
// =============================================================================

pub fn weapon_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM weapons WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?)
}

pub fn weapon_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(weapon_id_by_name(conn, name)?.is_some())
}

pub fn weapon_names(conn: &Connection) -> Result<Vec<String>> {
    names(conn, "SELECT name FROM weapons ORDER BY id")
}

pub fn insert_weapon(conn: &Connection, weapon: &NewWeapon) -> Result<i64> {
    conn.execute(
        "INSERT INTO weapons (name, image, description, owner_character_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            weapon.name,
            weapon.image,
            weapon.description,
            weapon.owner_character_id,
            now_timestamp(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_weapon_image(conn: &Connection, id: i64, image: &str) -> Result<()> {
    conn.execute(
        "UPDATE weapons SET image = ?1 WHERE id = ?2",
        params![image, id],
    )?;
    Ok(())
}

pub fn delete_weapon(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM weapons WHERE id = ?1", [id])?)
}

// =============================================================================
// Continents
// =============================================================================

pub fn insert_continent(conn: &Connection, id: i64, name: &str, description: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO continents (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, description, now_timestamp()],
    )?;
    Ok(())
}

pub fn continent_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM continents WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?)
}

/// Continent ids are assigned explicitly; this is the next unused one
pub fn next_continent_id(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(id), 0) + 1 FROM continents",
        [],
        |row| row.get(0),
    )?)
}

// =============================================================================
// Relationship types
// =============================================================================

pub fn insert_relationship_type(conn: &Connection, kind: &str, description: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO relationship_types (type, description) VALUES (?1, ?2)",
        params![kind, description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn relationship_type_id(conn: &Connection, kind: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM relationship_types WHERE type = ?1 ORDER BY id LIMIT 1",
            [kind],
            |row| row.get(0),
        )
        .optional()?)
}

// =============================================================================
// Calamities
// =============================================================================

pub fn insert_calamity(conn: &Connection, id: i64, title: &str, summary: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO calamities (id, title, summary) VALUES (?1, ?2, ?3)",
        params![id, title, summary],
    )?;
    Ok(())
}

// =============================================================================
// Locations
// =============================================================================

pub fn location_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM locations WHERE name = ?1 ORDER BY id LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn insert_location(
    conn: &Connection,
    name: &str,
    description: &str,
    continent_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO locations (name, description, continent_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, description, continent_id, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_location_continent(conn: &Connection, location_id: i64, continent_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE locations SET continent_id = ?1 WHERE id = ?2",
        params![continent_id, location_id],
    )?;
    Ok(())
}

pub fn location_continent_id(conn: &Connection, location_id: i64) -> Result<Option<i64>> {
    Ok(conn.query_row(
        "SELECT continent_id FROM locations WHERE id = ?1",
        [location_id],
        |row| row.get(0),
    )?)
}

// =============================================================================
// Chapters
// =============================================================================

pub fn insert_chapter(conn: &Connection, number: i64, title: &str, summary: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO chapters (chapter_number, title, summary) VALUES (?1, ?2, ?3)",
        params![number, title, summary],
    )?;
    Ok(())
}

pub fn chapter_number_by_title(conn: &Connection, title: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT chapter_number FROM chapters WHERE title = ?1 ORDER BY chapter_number LIMIT 1",
            [title],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn chapter_location_exists(conn: &Connection, chapter: i64, location_id: i64) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM chapter_locations WHERE chapter_number = ?1 AND location_id = ?2",
            [chapter, location_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub fn insert_chapter_location(conn: &Connection, chapter: i64, location_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO chapter_locations (chapter_number, location_id) VALUES (?1, ?2)",
        [chapter, location_id],
    )?;
    Ok(conn.last_insert_rowid())
}

// =============================================================================
// Character relationships
// =============================================================================

pub fn relationship_exists(conn: &Connection, from: i64, to: i64, kind_id: i64) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM character_relationships
             WHERE from_character_id = ?1 AND to_character_id = ?2 AND relationship_type_id = ?3",
            [from, to, kind_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub fn insert_relationship(conn: &Connection, from: i64, to: i64, kind_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO character_relationships
         (from_character_id, to_character_id, relationship_type_id) VALUES (?1, ?2, ?3)",
        [from, to, kind_id],
    )?;
    Ok(conn.last_insert_rowid())
}
