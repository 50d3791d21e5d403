//! Schema application and catalog inventory
//!
//! The DDL lives in `schema.sql` next to this file and is compiled in. It is
//! sent as one multi-statement batch: PostgreSQL runs a simple-query batch
//! as a single implicit transaction, so a failing statement leaves nothing
//! half-applied.

use std::path::Path;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{Result, TripError};

/// The bundled schema
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Object counts a correctly applied schema produces
pub const EXPECTED: ObjectCounts = ObjectCounts {
    tables: 5,
    views: 3,
    functions: 2,
    indexes: 16,
    triggers: 3,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObjectCounts {
    pub tables: usize,
    pub views: usize,
    pub functions: usize,
    pub indexes: usize,
    pub triggers: usize,
}

/// Read a schema file from disk, or fall back to the bundled one
pub fn load_schema(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(SCHEMA_SQL.to_string()),
    }
}

/// Count the `CREATE` statements in a DDL script.
///
/// Only looks at statement starts, so it counts what the script declares,
/// not what the server ends up with; see [`inventory`] for the latter.
/// Trigger functions are not counted as functions.
pub fn declared_objects(sql: &str) -> ObjectCounts {
    let mut counts = ObjectCounts::default();
    let mut pending_function = false;

    for line in sql.lines() {
        let line = line.trim_start().to_ascii_uppercase();
        if line.starts_with("--") {
            continue;
        }
        if pending_function && line.starts_with("RETURNS") {
            if !line.starts_with("RETURNS TRIGGER") {
                counts.functions += 1;
            }
            pending_function = false;
        }

        if line.starts_with("CREATE TABLE") {
            counts.tables += 1;
        } else if line.starts_with("CREATE VIEW") || line.starts_with("CREATE OR REPLACE VIEW") {
            counts.views += 1;
        } else if line.starts_with("CREATE INDEX") || line.starts_with("CREATE UNIQUE INDEX") {
            counts.indexes += 1;
        } else if line.starts_with("CREATE TRIGGER") {
            counts.triggers += 1;
        } else if line.starts_with("CREATE FUNCTION")
            || line.starts_with("CREATE OR REPLACE FUNCTION")
        {
            if line.contains("RETURNS TRIGGER") {
                pending_function = false;
            } else if line.contains("RETURNS") {
                counts.functions += 1;
            } else {
                pending_function = true;
            }
        }
    }

    counts
}

/// Apply a DDL script as a single batch.
///
/// Destructive: the bundled script drops every tripdb object before
/// recreating it.
pub async fn apply_schema(pool: &PgPool, sql: &str) -> Result<()> {
    debug!(bytes = sql.len(), "sending schema batch");
    sqlx::raw_sql(sql)
        .execute(pool)
        .await
        .map_err(|source| TripError::Schema { source })?;
    info!("schema applied");
    Ok(())
}

/// Names of the tripdb objects present in the `public` schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaInventory {
    pub tables: Vec<String>,
    pub views: Vec<String>,
    pub functions: Vec<String>,
    /// Named `idx_*` indexes only; primary-key and unique-constraint indexes
    /// are implied by the tables.
    pub indexes: Vec<String>,
    pub triggers: Vec<String>,
}

impl SchemaInventory {
    pub fn counts(&self) -> ObjectCounts {
        ObjectCounts {
            tables: self.tables.len(),
            views: self.views.len(),
            functions: self.functions.len(),
            indexes: self.indexes.len(),
            triggers: self.triggers.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.counts() == EXPECTED
    }
}

/// Read the catalog and list what exists
pub async fn inventory(pool: &PgPool) -> Result<SchemaInventory> {
    Ok(SchemaInventory {
        tables: names(
            pool,
            "tables",
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .await?,
        views: names(
            pool,
            "views",
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'VIEW' \
             ORDER BY table_name",
        )
        .await?,
        functions: names(
            pool,
            "functions",
            "SELECT p.proname::text FROM pg_proc p \
             JOIN pg_namespace n ON n.oid = p.pronamespace \
             WHERE n.nspname = 'public' AND p.prorettype <> 'trigger'::regtype \
             ORDER BY p.proname",
        )
        .await?,
        indexes: names(
            pool,
            "indexes",
            "SELECT indexname::text FROM pg_indexes \
             WHERE schemaname = 'public' AND indexname LIKE 'idx\\_%' \
             ORDER BY indexname",
        )
        .await?,
        triggers: names(
            pool,
            "triggers",
            "SELECT t.tgname::text FROM pg_trigger t \
             JOIN pg_class c ON c.oid = t.tgrelid \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = 'public' AND NOT t.tgisinternal \
             ORDER BY t.tgname",
        )
        .await?,
    })
}

async fn names(pool: &PgPool, context: &'static str, sql: &'static str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(sql)
        .fetch_all(pool)
        .await
        .map_err(|e| TripError::query(context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_declares_expected_objects() {
        assert_eq!(declared_objects(SCHEMA_SQL), EXPECTED);
    }

    #[test]
    fn bundled_schema_drops_before_create() {
        let drop_at = SCHEMA_SQL.find("DROP TABLE IF EXISTS geo_locations").unwrap();
        let create_at = SCHEMA_SQL.find("CREATE TABLE geo_locations").unwrap();
        assert!(drop_at < create_at);
    }

    #[test]
    fn declared_objects_skips_trigger_functions() {
        let sql = "CREATE FUNCTION touch()\nRETURNS TRIGGER AS $$ BEGIN RETURN NEW; END; $$ LANGUAGE plpgsql;\n\
                   CREATE FUNCTION lookup(x TEXT)\nRETURNS TABLE (id INTEGER) AS $$ SELECT 1 $$ LANGUAGE sql;\n\
                   -- CREATE TABLE commented_out (id INT);\n";
        let counts = declared_objects(sql);
        assert_eq!(counts.functions, 1);
        assert_eq!(counts.tables, 0);
    }

    #[test]
    fn load_schema_defaults_to_bundled() {
        assert_eq!(load_schema(None).unwrap(), SCHEMA_SQL);
    }

    #[test]
    fn load_schema_reads_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "CREATE TABLE t (id INT);").unwrap();
        assert_eq!(
            load_schema(Some(file.path())).unwrap(),
            "CREATE TABLE t (id INT);"
        );
    }

    #[test]
    fn inventory_completeness() {
        let mut inv = SchemaInventory::default();
        assert!(!inv.is_complete());

        inv.tables = vec!["t".into(); 5];
        inv.views = vec!["v".into(); 3];
        inv.functions = vec!["f".into(); 2];
        inv.indexes = vec!["i".into(); 16];
        inv.triggers = vec!["g".into(); 3];
        assert!(inv.is_complete());
    }
}
