//! SQLite adapter for the resource graph
//!
//! Default [`ResourceGraph`] implementation: resources, parent->child
//! edges with per-parent ordering, and the completion log, all in one
//! SQLite file (WAL mode). The engine itself never touches SQL — it sees
//! only the trait in [`crate::graph`].
//!
//! ## Tables
//!
//! - `resources` - typed nodes (id, slug, title, type, optional flag)
//! - `edges` - `(parent_id, child_id, position)` ordering edges
//! - `completions` - per-user completion log

pub mod completions;
pub mod resources;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::graph::{
    ChildModule, CompletionCounts, CompletionRecord, ModuleKind, ResourceGraph, SubtreeRow,
};

// Re-exports
pub use resources::{CreateResourceInput, ResourceRow};

/// SQLite database holding the resource graph and completion log
pub struct GraphDb {
    conn: Mutex<Connection>,
}

impl GraphDb {
    /// Open or create the graph database
    pub fn open(storage_dir: &Path) -> Result<Self, EngineError> {
        std::fs::create_dir_all(storage_dir)?;

        let db_path = storage_dir.join("graph.db");
        info!("Opening SQLite database at {:?}", db_path);

        let conn = Connection::open(&db_path)
            .map_err(|e| EngineError::Internal(format!("Failed to open SQLite: {}", e)))?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| EngineError::Internal(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, EngineError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()
            .map_err(|e| EngineError::Internal(format!("Failed to open in-memory SQLite: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), EngineError> {
        self.with_conn(|conn| schema::init_schema(conn))
    }

    /// Run a read operation against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, EngineError>
    where
        F: FnOnce(&Connection) -> Result<T, EngineError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Seed one resource (content-editing side of the boundary; used by
    /// embedding applications and tests)
    pub fn create_resource(&self, input: &CreateResourceInput) -> Result<(), EngineError> {
        self.with_conn(|conn| resources::create_resource(conn, input))
    }

    /// Seed one ordering edge
    pub fn create_edge(
        &self,
        parent_id: &str,
        child_id: &str,
        position: i64,
    ) -> Result<(), EngineError> {
        self.with_conn(|conn| resources::create_edge(conn, parent_id, child_id, position))
    }

    /// Get a resource by id
    pub fn get_resource(&self, id: &str) -> Result<Option<ResourceRow>, EngineError> {
        self.with_conn(|conn| resources::get_resource(conn, id))
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats, EngineError> {
        self.with_conn(|conn| {
            Ok(DbStats {
                resource_count: resources::count_resources(conn)?,
                edge_count: resources::count_edges(conn)?,
                completion_count: completions::count_completions(conn)?,
            })
        })
    }
}

impl ResourceGraph for GraphDb {
    fn fetch_module_subtree(
        &self,
        module: &str,
        kind: ModuleKind,
    ) -> Result<Vec<SubtreeRow>, EngineError> {
        self.with_conn(|conn| resources::fetch_module_subtree(conn, module, kind))
    }

    fn fetch_child_modules(&self, root_id: &str) -> Result<Vec<ChildModule>, EngineError> {
        self.with_conn(|conn| resources::get_child_modules(conn, root_id))
    }

    fn fetch_completion_counts(
        &self,
        root_id: &str,
        user_id: &str,
    ) -> Result<CompletionCounts, EngineError> {
        self.with_conn(|conn| completions::get_completion_counts(conn, root_id, user_id))
    }

    fn fetch_completion_records(
        &self,
        module_id: &str,
        user_id: &str,
    ) -> Result<Vec<CompletionRecord>, EngineError> {
        self.with_conn(|conn| completions::get_records_for_module(conn, module_id, user_id))
    }

    fn write_completion(
        &self,
        resource_id: &str,
        user_id: &str,
        completed: bool,
    ) -> Result<(), EngineError> {
        self.with_conn(|conn| {
            if completed {
                completions::upsert_completion(conn, resource_id, user_id, Utc::now())
            } else {
                completions::delete_completion(conn, resource_id, user_id).map(|_| ())
            }
        })
        .map_err(|e| EngineError::WriteFailed {
            resource_id: resource_id.to_string(),
            user_id: user_id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub resource_count: u64,
    pub edge_count: u64,
    pub completion_count: u64,
}
