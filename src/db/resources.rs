//! Resource and edge repository
//!
//! Seeding helpers plus the batched subtree read behind
//! [`crate::graph::ResourceGraph::fetch_module_subtree`]: the module's own
//! row, sections directly under it, lessons/posts under it or one of its
//! sections (tagged with their section id), and solutions attached to
//! lessons.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::{ChildModule, ModuleKind, RowKind, SubtreeRow};

/// Resource row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub resource_type: String,
    pub cover_image: Option<String>,
    pub optional: bool,
    pub fields_json: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ResourceRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            slug: row.get("slug")?,
            title: row.get("title")?,
            resource_type: row.get("resource_type")?,
            cover_image: row.get("cover_image")?,
            optional: row.get::<_, i64>("optional")? != 0,
            fields_json: row.get("fields_json")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Input for creating a resource
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResourceInput {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub resource_type: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// Flexible fields bag, persisted as JSON
    #[serde(default)]
    pub fields: Option<serde_json::Value>,
}

/// Get a resource by ID
pub fn get_resource(conn: &Connection, id: &str) -> Result<Option<ResourceRow>, EngineError> {
    let mut stmt = conn
        .prepare("SELECT * FROM resources WHERE id = ?")
        .map_err(|e| EngineError::Internal(format!("Prepare failed: {}", e)))?;

    stmt.query_row(params![id], |row| ResourceRow::from_row(row))
        .optional()
        .map_err(|e| EngineError::Internal(format!("Failed to get resource: {}", e)))
}

/// Create a resource
pub fn create_resource(conn: &Connection, input: &CreateResourceInput) -> Result<(), EngineError> {
    if input.id.is_empty() || input.slug.is_empty() {
        return Err(EngineError::Validation(format!(
            "Resource id and slug must be non-empty (id: '{}', slug: '{}')",
            input.id, input.slug
        )));
    }

    let fields_json = input
        .fields
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        r#"
        INSERT INTO resources (id, slug, title, resource_type, cover_image, optional, fields_json)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            input.id,
            input.slug,
            input.title,
            input.resource_type,
            input.cover_image,
            input.optional as i64,
            fields_json,
        ],
    )
    .map_err(|e| EngineError::Internal(format!("Resource insert failed: {}", e)))?;

    Ok(())
}

/// Create a parent->child edge at a position
pub fn create_edge(
    conn: &Connection,
    parent_id: &str,
    child_id: &str,
    position: i64,
) -> Result<(), EngineError> {
    conn.execute(
        "INSERT INTO edges (parent_id, child_id, position) VALUES (?, ?, ?)",
        params![parent_id, child_id, position],
    )
    .map_err(|e| EngineError::Internal(format!("Edge insert failed: {}", e)))?;

    Ok(())
}

/// Resolve a module root row by id or slug, filtered by kind
fn get_module_row(
    conn: &Connection,
    module: &str,
    kind: ModuleKind,
) -> Result<Option<ResourceRow>, EngineError> {
    let mut stmt = conn
        .prepare("SELECT * FROM resources WHERE (id = ?1 OR slug = ?1) AND resource_type = ?2")
        .map_err(|e| EngineError::Internal(format!("Prepare failed: {}", e)))?;

    stmt.query_row(params![module, kind.root_type()], |row| {
        ResourceRow::from_row(row)
    })
    .optional()
    .map_err(|e| EngineError::Internal(format!("Failed to get module row: {}", e)))
}

/// Children of a parent having one of the given types, in position order
fn children_of_type(
    conn: &Connection,
    parent_id: &str,
    types: &[&str],
) -> Result<Vec<(ResourceRow, i64)>, EngineError> {
    // The IN list is built from static type names, never user input.
    let placeholders = types.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT r.*, e.position AS edge_position
         FROM resources r
         JOIN edges e ON e.child_id = r.id
         WHERE e.parent_id = ?1 AND r.resource_type IN ({})
         ORDER BY e.position, r.id",
        placeholders
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| EngineError::Internal(format!("Prepare failed: {}", e)))?;

    let mut values: Vec<&dyn rusqlite::ToSql> = vec![&parent_id];
    for t in types {
        values.push(t);
    }

    let rows = stmt
        .query_map(values.as_slice(), |row| {
            Ok((ResourceRow::from_row(row)?, row.get::<_, i64>("edge_position")?))
        })
        .map_err(|e| EngineError::Internal(format!("Query failed: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EngineError::Internal(format!("Row parse failed: {}", e)))?;

    Ok(rows)
}

const LEAF_TYPES: &[&str] = &["lesson", "exercise", "post"];

/// Batched subtree read for one module
pub fn fetch_module_subtree(
    conn: &Connection,
    module: &str,
    kind: ModuleKind,
) -> Result<Vec<SubtreeRow>, EngineError> {
    let Some(module_row) = get_module_row(conn, module, kind)? else {
        return Ok(vec![]);
    };

    let mut rows = vec![SubtreeRow {
        kind: RowKind::Module,
        id: module_row.id.clone(),
        slug: module_row.slug.clone(),
        title: module_row.title.clone(),
        resource_type: Some(module_row.resource_type.clone()),
        position: None,
        parent_section_id: None,
        owner_lesson_id: None,
        optional: false,
        cover_image: module_row.cover_image.clone(),
    }];

    let sections = children_of_type(conn, &module_row.id, &["section"])?;
    let mut lesson_ids: Vec<String> = Vec::new();

    // Leaves directly under the module.
    for (leaf, position) in children_of_type(conn, &module_row.id, LEAF_TYPES)? {
        if leaf.resource_type != "post" {
            lesson_ids.push(leaf.id.clone());
        }
        rows.push(leaf_row(leaf, position, None));
    }

    // Sections, then leaves grouped under each.
    for (section, position) in sections {
        rows.push(SubtreeRow {
            kind: RowKind::Section,
            id: section.id.clone(),
            slug: section.slug.clone(),
            title: section.title.clone(),
            resource_type: Some(section.resource_type.clone()),
            position: Some(position),
            parent_section_id: None,
            owner_lesson_id: None,
            optional: false,
            cover_image: None,
        });

        for (leaf, leaf_position) in children_of_type(conn, &section.id, LEAF_TYPES)? {
            if leaf.resource_type != "post" {
                lesson_ids.push(leaf.id.clone());
            }
            rows.push(leaf_row(leaf, leaf_position, Some(section.id.clone())));
        }
    }

    // Solutions attached to any fetched lesson. No position: solutions
    // are unordered per lesson.
    for lesson_id in &lesson_ids {
        for (solution, _) in children_of_type(conn, lesson_id, &["solution"])? {
            rows.push(SubtreeRow {
                kind: RowKind::Solution,
                id: solution.id,
                slug: solution.slug,
                title: solution.title,
                resource_type: Some("solution".to_string()),
                position: None,
                parent_section_id: None,
                owner_lesson_id: Some(lesson_id.clone()),
                optional: false,
                cover_image: None,
            });
        }
    }

    Ok(rows)
}

fn leaf_row(leaf: ResourceRow, position: i64, parent_section_id: Option<String>) -> SubtreeRow {
    SubtreeRow {
        kind: RowKind::Leaf,
        id: leaf.id,
        slug: leaf.slug,
        title: leaf.title,
        resource_type: Some(leaf.resource_type),
        position: Some(position),
        parent_section_id,
        owner_lesson_id: None,
        optional: leaf.optional,
        cover_image: leaf.cover_image,
    }
}

/// Modules directly under a cohort-shaped root, in position order
pub fn get_child_modules(conn: &Connection, root_id: &str) -> Result<Vec<ChildModule>, EngineError> {
    let modules = children_of_type(conn, root_id, &["workshop", "tutorial"])?
        .into_iter()
        .map(|(row, position)| ChildModule {
            id: row.id,
            slug: row.slug,
            title: row.title,
            position,
        })
        .collect();

    Ok(modules)
}

/// Count resources (for stats)
pub fn count_resources(conn: &Connection) -> Result<u64, EngineError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))
        .map_err(|e| EngineError::Internal(format!("Query failed: {}", e)))?;

    Ok(count as u64)
}

/// Count edges (for stats)
pub fn count_edges(conn: &Connection) -> Result<u64, EngineError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
        .map_err(|e| EngineError::Internal(format!("Query failed: {}", e)))?;

    Ok(count as u64)
}
