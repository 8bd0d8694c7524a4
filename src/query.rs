//! Read-only projections from the store to display-ready records.
//!
//! `Query` holds nothing but a borrowed connection, so callers build one per
//! request (usually via [`Store::query`](crate::store::Store::query)).

use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::dedup::DirectedEdge;
use crate::error::{CodexError, Result};

/// Highest calamity id shown in the calamity listing
pub const LAST_CALAMITY: i64 = 81;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalamitySummary {
    pub id: i64,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterTitle {
    pub chapter_number: i64,
    pub title: String,
}

/// Which end of an edge the viewed character sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The viewed character is the edge's source
    From,
    /// The viewed character is the edge's target
    To,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipView {
    pub direction: Direction,
    pub related_character: CharacterRef,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterDetail {
    pub id: i64,
    pub name: String,
    pub intro: String,
    pub ability: String,
    pub image: Option<String>,
    pub relationships: Vec<RelationshipView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterDetail {
    pub chapter_number: i64,
    pub title: String,
    pub summary: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipTypeRef {
    pub id: i64,
    pub name: String,
}

/// One directed edge with both endpoints and its type joined in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipRecord {
    pub id: i64,
    pub from_character: CharacterRef,
    pub to_character: CharacterRef,
    pub relationship_type: RelationshipTypeRef,
}

impl DirectedEdge for RelationshipRecord {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn from_id(&self) -> i64 {
        self.from_character.id
    }

    fn to_id(&self) -> i64 {
        self.to_character.id
    }
}

/// Weapon listing in the `weapon.json` fixture shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponSummary {
    pub name: String,
    pub introduction: String,
    pub owner: Option<String>,
}

pub struct Query<'c> {
    conn: &'c Connection,
}

impl<'c> Query<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// The 81 calamities in order
    pub fn all_calamities(&self) -> Result<Vec<CalamitySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, summary FROM calamities
             WHERE id BETWEEN 1 AND ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([LAST_CALAMITY], |row| {
            Ok(CalamitySummary {
                id: row.get(0)?,
                title: row.get(1)?,
                summary: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn all_characters(&self) -> Result<Vec<CharacterRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM characters ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(CharacterRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn all_chapters(&self) -> Result<Vec<ChapterTitle>> {
        let mut stmt = self
            .conn
            .prepare("SELECT chapter_number, title FROM chapters ORDER BY chapter_number")?;
        let rows = stmt.query_map([], |row| {
            Ok(ChapterTitle {
                chapter_number: row.get(0)?,
                title: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// One character with every edge it takes part in: outgoing edges first,
    /// then incoming, each group in edge id order
    pub fn character_detail(&self, id: i64) -> Result<CharacterDetail> {
        let base = self
            .conn
            .query_row(
                "SELECT id, name, intro, ability, image FROM characters WHERE id = ?1",
                [id],
                |row| {
                    Ok(CharacterDetail {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        intro: row.get(2)?,
                        ability: row.get(3)?,
                        image: row.get(4)?,
                        relationships: Vec::new(),
                    })
                },
            )
            .optional()?;
        let mut detail = base.ok_or_else(|| CodexError::not_found("character", id))?;

        let mut outgoing = self.conn.prepare(
            "SELECT c.id, c.name, t.type
             FROM character_relationships r
             JOIN characters c ON c.id = r.to_character_id
             JOIN relationship_types t ON t.id = r.relationship_type_id
             WHERE r.from_character_id = ?1
             ORDER BY r.id",
        )?;
        let mut incoming = self.conn.prepare(
            "SELECT c.id, c.name, t.type
             FROM character_relationships r
             JOIN characters c ON c.id = r.from_character_id
             JOIN relationship_types t ON t.id = r.relationship_type_id
             WHERE r.to_character_id = ?1
             ORDER BY r.id",
        )?;

        for (stmt, direction) in [(&mut outgoing, Direction::From), (&mut incoming, Direction::To)]
        {
            let rows = stmt.query_map([id], |row| view_from_row(row, direction))?;
            for view in rows {
                detail.relationships.push(view?);
            }
        }

        Ok(detail)
    }

    pub fn chapter_detail(&self, chapter_number: i64) -> Result<ChapterDetail> {
        let base = self
            .conn
            .query_row(
                "SELECT chapter_number, title, summary FROM chapters WHERE chapter_number = ?1",
                [chapter_number],
                |row| {
                    Ok(ChapterDetail {
                        chapter_number: row.get(0)?,
                        title: row.get(1)?,
                        summary: row.get(2)?,
                        locations: Vec::new(),
                    })
                },
            )
            .optional()?;
        let mut detail = base.ok_or_else(|| CodexError::not_found("chapter", chapter_number))?;

        let mut stmt = self.conn.prepare(
            "SELECT l.name FROM chapter_locations cl
             JOIN locations l ON l.id = cl.location_id
             WHERE cl.chapter_number = ?1
             ORDER BY l.name",
        )?;
        let names = stmt.query_map([chapter_number], |row| row.get(0))?;
        detail.locations = names.collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(detail)
    }

    /// Every edge in ascending id order. Feed the result to
    /// [`dedup_symmetric`](crate::dedup::dedup_symmetric) before display.
    pub fn all_relationships(&self) -> Result<Vec<RelationshipRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, f.id, f.name, t.id, t.name, k.id, k.type
             FROM character_relationships r
             JOIN characters f ON f.id = r.from_character_id
             JOIN characters t ON t.id = r.to_character_id
             JOIN relationship_types k ON k.id = r.relationship_type_id
             ORDER BY r.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RelationshipRecord {
                id: row.get(0)?,
                from_character: CharacterRef {
                    id: row.get(1)?,
                    name: row.get(2)?,
                },
                to_character: CharacterRef {
                    id: row.get(3)?,
                    name: row.get(4)?,
                },
                relationship_type: RelationshipTypeRef {
                    id: row.get(5)?,
                    name: row.get(6)?,
                },
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn all_weapons(&self) -> Result<Vec<WeaponSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.name, w.description, c.name
             FROM weapons w
             LEFT JOIN characters c ON c.id = w.owner_character_id
             ORDER BY w.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WeaponSummary {
                name: row.get(0)?,
                introduction: row.get(1)?,
                owner: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Options for the character pickers of the update and delete forms
    pub fn character_names(&self) -> Result<Vec<String>> {
        crate::store::repo::character_names(self.conn)
    }

    pub fn weapon_names(&self) -> Result<Vec<String>> {
        crate::store::repo::weapon_names(self.conn)
    }
}

fn view_from_row(row: &Row<'_>, direction: Direction) -> rusqlite::Result<RelationshipView> {
    Ok(RelationshipView {
        direction,
        related_character: CharacterRef {
            id: row.get(0)?,
            name: row.get(1)?,
        },
        kind: row.get(2)?,
    })
}
