use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema. Safe to run against an
/// existing database.
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text | ColumnType::Timestamp => "TEXT",
        };

        let mut def = format!("    {} {}", col.name, sql_type);
        if col.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if !col.nullable && !col.primary_key {
            def.push_str(" NOT NULL");
        }
        if col.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(literal) = col.default {
            def.push_str(&format!(" DEFAULT {}", literal));
        }
        if !col.one_of.is_empty() {
            let allowed: Vec<String> = col.one_of.iter().map(|v| format!("'{}'", v)).collect();
            def.push_str(&format!(" CHECK ({} IN ({}))", col.name, allowed.join(", ")));
        }

        columns.push(def);
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {}",
            fk.column,
            fk.references_table,
            fk.references_column,
            fk.on_delete.as_sql()
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns and explicit
/// indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let fk_indexes = schema.foreign_keys.iter().map(|fk| {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            schema.name, fk.column, schema.name, fk.column
        )
    });

    let explicit = schema.indexes.iter().map(|index| {
        format!(
            "CREATE {}INDEX IF NOT EXISTS {}_{}_{} ON {}({})",
            if index.unique { "UNIQUE " } else { "" },
            if index.unique { "uq" } else { "idx" },
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        )
    });

    fk_indexes.chain(explicit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{CHAPTER_LOCATIONS, CHARACTERS, WEAPONS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&CHARACTERS);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS characters"));
        assert!(sql.contains("id INTEGER PRIMARY KEY"));
        assert!(sql.contains("name TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("image TEXT,"));
        assert!(sql.contains("organization TEXT NOT NULL DEFAULT '无组织'"));
        assert!(sql.contains("CHECK (race IN ('人', '妖', '仙'))"));
    }

    #[test]
    fn test_foreign_key_delete_policies() {
        let sql = generate_create_table(&WEAPONS);
        assert!(sql.contains(
            "FOREIGN KEY (owner_character_id) REFERENCES characters(id) ON DELETE SET NULL"
        ));

        let sql = generate_create_table(&CHAPTER_LOCATIONS);
        assert!(sql.contains(
            "FOREIGN KEY (chapter_number) REFERENCES chapters(chapter_number) ON DELETE CASCADE"
        ));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&CHAPTER_LOCATIONS);
        assert!(indexes
            .iter()
            .any(|i| i.contains("idx_chapter_locations_location_id")));
        assert!(indexes.iter().any(|i| i
            == "CREATE UNIQUE INDEX IF NOT EXISTS uq_chapter_locations_chapter_number_location_id \
                ON chapter_locations(chapter_number, location_id)"));
    }

    #[test]
    fn test_generated_sql_is_valid_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for schema in crate::schema::ALL_TABLES {
            conn.execute(&generate_create_table(schema), []).unwrap();
            for index in generate_indexes(schema) {
                conn.execute(&index, []).unwrap();
            }
        }
    }
}
