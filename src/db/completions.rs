//! Completion log repository
//!
//! Append/remove only: a record's timestamp is never edited, and the
//! upsert is idempotent so repeated toggles settle on one record per
//! `(resource_id, user_id)`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::EngineError;
use crate::graph::{CompletionCounts, CompletionRecord};

/// Idempotent completion upsert. Keeps the original timestamp when the
/// record already exists.
pub fn upsert_completion(
    conn: &Connection,
    resource_id: &str,
    user_id: &str,
    completed_at: DateTime<Utc>,
) -> Result<(), EngineError> {
    conn.execute(
        r#"
        INSERT INTO completions (resource_id, user_id, completed_at)
        VALUES (?, ?, ?)
        ON CONFLICT (resource_id, user_id) DO NOTHING
        "#,
        params![resource_id, user_id, completed_at.to_rfc3339()],
    )
    .map_err(|e| EngineError::Internal(format!("Completion insert failed: {}", e)))?;

    Ok(())
}

/// Delete a completion record, returning whether one existed
pub fn delete_completion(
    conn: &Connection,
    resource_id: &str,
    user_id: &str,
) -> Result<bool, EngineError> {
    let changes = conn
        .execute(
            "DELETE FROM completions WHERE resource_id = ? AND user_id = ?",
            params![resource_id, user_id],
        )
        .map_err(|e| EngineError::Internal(format!("Completion delete failed: {}", e)))?;

    Ok(changes > 0)
}

/// Two-level subtree CTE shared by the module-scoped queries below:
/// direct children of the root plus grandchildren through one level of
/// grouping (sections, or a cohort's modules).
const SUBTREE_CTE: &str = r#"
    WITH kids AS (
        SELECT child_id FROM edges WHERE parent_id = ?1
    ),
    grandkids AS (
        SELECT e.child_id FROM edges e JOIN kids k ON e.parent_id = k.child_id
    ),
    subtree AS (
        SELECT child_id FROM kids UNION SELECT child_id FROM grandkids
    )
"#;

/// All completion records for a user within a module's two-level subtree
pub fn get_records_for_module(
    conn: &Connection,
    module_id: &str,
    user_id: &str,
) -> Result<Vec<CompletionRecord>, EngineError> {
    let sql = format!(
        "{} SELECT c.resource_id, c.user_id, c.completed_at
         FROM completions c
         JOIN subtree s ON s.child_id = c.resource_id
         WHERE c.user_id = ?2
         ORDER BY c.completed_at",
        SUBTREE_CTE
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| EngineError::Internal(format!("Prepare failed: {}", e)))?;

    let records = stmt
        .query_map(params![module_id, user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(|e| EngineError::Internal(format!("Query failed: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EngineError::Internal(format!("Row parse failed: {}", e)))?;

    records
        .into_iter()
        .map(|(resource_id, user_id, completed_at)| {
            Ok(CompletionRecord {
                resource_id,
                user_id,
                completed_at: parse_timestamp(&completed_at)?,
            })
        })
        .collect()
}

/// Required-leaf completion aggregate for a root: how many non-optional
/// lessons/exercises in the two-level subtree lack a record for the user,
/// and the latest completion date among those that have one.
pub fn get_completion_counts(
    conn: &Connection,
    root_id: &str,
    user_id: &str,
) -> Result<CompletionCounts, EngineError> {
    let sql = format!(
        "{},
        required AS (
            SELECT r.id FROM resources r
            JOIN subtree s ON s.child_id = r.id
            WHERE r.resource_type IN ('lesson', 'exercise') AND r.optional = 0
        )
        SELECT
            (SELECT COUNT(*) FROM required q
             WHERE NOT EXISTS (
                SELECT 1 FROM completions c
                WHERE c.resource_id = q.id AND c.user_id = ?2
             )),
            (SELECT MAX(c.completed_at) FROM completions c
             JOIN required q ON q.id = c.resource_id
             WHERE c.user_id = ?2)",
        SUBTREE_CTE
    );

    let (incomplete, last): (i64, Option<String>) = conn
        .query_row(&sql, params![root_id, user_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .map_err(|e| EngineError::Internal(format!("Counts query failed: {}", e)))?;

    let last_completed_at = match last {
        Some(ts) => Some(parse_timestamp(&ts)?),
        None => None,
    };

    Ok(CompletionCounts {
        incomplete_count: incomplete as u64,
        last_completed_at,
    })
}

/// Count completion records (for stats)
pub fn count_completions(conn: &Connection) -> Result<u64, EngineError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
        .map_err(|e| EngineError::Internal(format!("Query failed: {}", e)))?;

    Ok(count as u64)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EngineError::Internal(format!("Bad completion timestamp '{}': {}", raw, e)))
}
