//! Table schema definitions for the encyclopedia database

use super::types::*;

/// Values accepted by `characters.race`
pub const RACES: &[&str] = &["人", "妖", "仙"];

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static CONTINENTS: TableSchema = TableSchema {
    name: "continents",
    source_file: None,
    columns: &[
        Column::primary("id"),
        Column::required("name", ColumnType::Text).unique(),
        Column::required("description", ColumnType::Text).default("''"),
        Column::required("created_at", ColumnType::Timestamp),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static RELATIONSHIP_TYPES: TableSchema = TableSchema {
    name: "relationship_types",
    source_file: None,
    columns: &[
        Column::primary("id"),
        Column::required("type", ColumnType::Text),
        Column::new("description", ColumnType::Text).default("''"),
    ],
    foreign_keys: &[],
    indexes: &[Index::on(&["type"])],
};

pub static CALAMITIES: TableSchema = TableSchema {
    name: "calamities",
    source_file: Some("calamity.json"),
    columns: &[
        Column::primary("id"),
        Column::required("title", ColumnType::Text),
        Column::required("summary", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static CHAPTERS: TableSchema = TableSchema {
    name: "chapters",
    source_file: Some("chapter.json"),
    columns: &[
        Column::primary("chapter_number"),
        Column::required("title", ColumnType::Text),
        Column::required("summary", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::on(&["title"])],
};

pub static CHARACTERS: TableSchema = TableSchema {
    name: "characters",
    source_file: Some("character.json"),
    columns: &[
        Column::primary("id"),
        Column::required("name", ColumnType::Text).unique(),
        Column::new("image", ColumnType::Text),
        Column::required("race", ColumnType::Text).one_of(RACES),
        Column::required("ability", ColumnType::Text),
        Column::required("intro", ColumnType::Text),
        Column::required("organization", ColumnType::Text).default("'无组织'"),
        Column::required("created_at", ColumnType::Timestamp),
    ],
    foreign_keys: &[],
    indexes: &[],
};

// =============================================================================
// Tables with FK dependencies
// =============================================================================

pub static LOCATIONS: TableSchema = TableSchema {
    name: "locations",
    source_file: Some("place.json"),
    columns: &[
        Column::primary("id"),
        Column::required("name", ColumnType::Text),
        Column::required("description", ColumnType::Text).default("'暂无'"),
        Column::new("continent_id", ColumnType::Integer),
        Column::required("created_at", ColumnType::Timestamp),
    ],
    foreign_keys: &[ForeignKey::set_null("continent_id", "continents")],
    indexes: &[Index::on(&["name"])],
};

pub static CHAPTER_LOCATIONS: TableSchema = TableSchema {
    name: "chapter_locations",
    source_file: Some("chapter.json"),
    columns: &[
        Column::primary("id"),
        Column::required("chapter_number", ColumnType::Integer),
        Column::required("location_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::cascade("chapter_number", "chapters").to_column("chapter_number"),
        ForeignKey::cascade("location_id", "locations"),
    ],
    indexes: &[Index::unique(&["chapter_number", "location_id"])],
};

pub static WEAPONS: TableSchema = TableSchema {
    name: "weapons",
    source_file: Some("weapon.json"),
    columns: &[
        Column::primary("id"),
        Column::required("name", ColumnType::Text).unique(),
        Column::new("image", ColumnType::Text),
        Column::required("description", ColumnType::Text),
        Column::new("owner_character_id", ColumnType::Integer),
        Column::required("created_at", ColumnType::Timestamp),
    ],
    foreign_keys: &[ForeignKey::set_null("owner_character_id", "characters")],
    indexes: &[],
};

pub static CHARACTER_RELATIONSHIPS: TableSchema = TableSchema {
    name: "character_relationships",
    source_file: Some("character.json"),
    columns: &[
        Column::primary("id"),
        Column::required("from_character_id", ColumnType::Integer),
        Column::required("to_character_id", ColumnType::Integer),
        Column::required("relationship_type_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::cascade("from_character_id", "characters"),
        ForeignKey::cascade("to_character_id", "characters"),
        ForeignKey::cascade("relationship_type_id", "relationship_types"),
    ],
    indexes: &[],
};

/// All table schemas in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    // Wave 1: No dependencies
    &CONTINENTS,
    &RELATIONSHIP_TYPES,
    &CALAMITIES,
    &CHAPTERS,
    &CHARACTERS,
    // Wave 2: Level 1 deps
    &LOCATIONS,
    // Junction tables
    &CHAPTER_LOCATIONS,
    &WEAPONS,
    &CHARACTER_RELATIONSHIPS,
];

/// Look up a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|t| t.name == name)
}
