pub mod repo;
pub mod schema_gen;

use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CodexError, Result};
use crate::query::Query;
use crate::schema::{DependencyResolver, TableSchema};
use schema_gen::{generate_create_table, generate_indexes};

/// Handle on the encyclopedia database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure every table exists.
    /// Existing data is kept.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        debug!(path = %db_path.display(), "opened database");
        Self::configure(conn)
    }

    /// Open a private in-memory database with the full schema
    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        // Delete policies rely on this being on for every connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Create all tables and indexes in dependency order
    pub fn create_tables(&self) -> Result<()> {
        for schema in ordered_tables(DependencyResolver::new().creation_order())? {
            let sql = generate_create_table(schema);
            self.conn.execute(&sql, [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    /// Drop every table, children first
    pub fn drop_tables(&self) -> Result<()> {
        for schema in ordered_tables(DependencyResolver::new().drop_order())? {
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", schema.name), [])?;
        }
        info!("dropped all tables");
        Ok(())
    }

    /// Drop and recreate the schema, discarding all rows
    pub fn reset(&self) -> Result<()> {
        self.drop_tables()?;
        self.create_tables()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin an all-or-nothing unit of work. Dropping the returned
    /// transaction without committing rolls it back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Read-only projections over this database
    pub fn query(&self) -> Query<'_> {
        Query::new(&self.conn)
    }

    /// Row count per table, in creation order
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        ordered_tables(DependencyResolver::new().creation_order())?
            .into_iter()
            .map(|schema| Ok((schema.name, repo::count_rows(&self.conn, schema)?)))
            .collect()
    }
}

fn ordered_tables(
    order: std::result::Result<Vec<&'static TableSchema>, String>,
) -> Result<Vec<&'static TableSchema>> {
    order.map_err(CodexError::Schema)
}
