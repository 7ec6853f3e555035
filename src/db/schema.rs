//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::EngineError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), EngineError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
        migrate_schema(conn, current_version)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, EngineError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| EngineError::Internal(format!("Failed to create schema_version table: {}", e)))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), EngineError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| EngineError::Internal(format!("Failed to clear schema_version: {}", e)))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| EngineError::Internal(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

/// Create all tables
fn create_tables(conn: &Connection) -> Result<(), EngineError> {
    conn.execute_batch(GRAPH_SCHEMA)
        .map_err(|e| EngineError::Internal(format!("Failed to create graph tables: {}", e)))?;

    conn.execute_batch(INDEXES_SCHEMA)
        .map_err(|e| EngineError::Internal(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Migrate schema from older version
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<(), EngineError> {
    // Add migration steps here as schema evolves
    match from_version {
        _ => {}
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

/// Resource graph schema
const GRAPH_SCHEMA: &str = r#"
-- Typed resource nodes. Immutable from the engine's point of view;
-- owned by the content-editing subsystem.
CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY NOT NULL,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    resource_type TEXT NOT NULL,

    -- Display
    cover_image TEXT,

    -- Required-leaf exclusion flag
    optional INTEGER NOT NULL DEFAULT 0,

    -- Flexible fields bag as JSON
    fields_json TEXT,

    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Directed parent->child edges with per-parent ordering.
-- A child id may appear under multiple parents; uniqueness holds only
-- within one traversal root.
CREATE TABLE IF NOT EXISTS edges (
    parent_id TEXT NOT NULL,
    child_id TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (parent_id, child_id),
    FOREIGN KEY (parent_id) REFERENCES resources(id) ON DELETE CASCADE,
    FOREIGN KEY (child_id) REFERENCES resources(id) ON DELETE CASCADE
);

-- Completion log. Append/remove only; timestamps are never edited.
CREATE TABLE IF NOT EXISTS completions (
    resource_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    PRIMARY KEY (resource_id, user_id),
    FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
);
"#;

/// Index definitions for fast queries
const INDEXES_SCHEMA: &str = r#"
-- Resource indexes
CREATE INDEX IF NOT EXISTS idx_resources_slug ON resources(slug);
CREATE INDEX IF NOT EXISTS idx_resources_type ON resources(resource_type);

-- Edge indexes
CREATE INDEX IF NOT EXISTS idx_edges_parent_position ON edges(parent_id, position);
CREATE INDEX IF NOT EXISTS idx_edges_child ON edges(child_id);

-- Completion indexes
CREATE INDEX IF NOT EXISTS idx_completions_user ON completions(user_id);
"#;
