//! Navigation tree builder
//!
//! Converts the flat batch of subtree rows into the typed, ordered tree.
//! Malformed rows are dropped with a logged warning so one corrupt row
//! cannot blank the whole navigation; only a missing module row yields
//! `None` (an empty-state UI case, not an error).

use std::collections::HashMap;

use tracing::warn;

use crate::graph::{RowKind, SubtreeRow};

use super::{
    LessonNode, ModuleNavigation, NavigationNode, PostNode, SectionNode, SolutionRef,
};

/// Sentinel bucket for leaves with no parent section
const TOP_LEVEL: &str = "";

/// Build a module navigation tree from a batched subtree read
///
/// Returns `None` when the batch contains no module row.
pub fn build_navigation(rows: &[SubtreeRow]) -> Option<ModuleNavigation> {
    let module = rows.iter().find(|r| r.kind == RowKind::Module)?;

    // Solutions grouped by owning lesson id. Validity of the owner is
    // checked at attach time, once the lesson set is known.
    let mut solutions: HashMap<&str, Vec<SolutionRef>> = HashMap::new();
    for row in rows.iter().filter(|r| r.kind == RowKind::Solution) {
        let Some(owner) = row.owner_lesson_id.as_deref() else {
            warn!(id = %row.id, "Solution row has no owner lesson, dropping");
            continue;
        };
        solutions.entry(owner).or_default().push(SolutionRef {
            id: row.id.clone(),
            slug: row.slug.clone(),
            title: row.title.clone(),
        });
    }

    // Leaves grouped by section id, top-level bucket for ungrouped ones.
    // Attaching a lesson's solutions removes them from the map, so whatever
    // remains afterwards is orphaned.
    let mut grouped: HashMap<&str, Vec<NavigationNode>> = HashMap::new();
    for row in rows.iter().filter(|r| r.kind == RowKind::Leaf) {
        let Some(node) = leaf_node(row, &mut solutions) else {
            continue;
        };
        let bucket = row.parent_section_id.as_deref().unwrap_or(TOP_LEVEL);
        grouped.entry(bucket).or_default().push(node);
    }

    // Solutions whose owner never materialized are inconsistent rows.
    for (owner, orphans) in &solutions {
        for orphan in orphans {
            warn!(
                id = %orphan.id,
                owner_lesson = %owner,
                "Solution references a lesson not present in the batch, dropping"
            );
        }
    }

    let mut top: Vec<NavigationNode> = grouped.remove(TOP_LEVEL).unwrap_or_default();

    for row in rows.iter().filter(|r| r.kind == RowKind::Section) {
        let Some(position) = row.position else {
            warn!(id = %row.id, "Section row has no position, dropping");
            continue;
        };
        let mut children = grouped.remove(row.id.as_str()).unwrap_or_default();
        sort_nodes(&mut children);
        top.push(NavigationNode::Section(SectionNode {
            id: row.id.clone(),
            slug: row.slug.clone(),
            title: row.title.clone(),
            position,
            resources: children,
        }));
    }

    // Leaves pointing at a section id that was never fetched degrade to
    // nothing rather than surfacing under the wrong parent.
    for (section_id, lost) in &grouped {
        warn!(
            section_id = %section_id,
            count = lost.len(),
            "Leaves reference a section not present in the batch, dropping"
        );
    }

    sort_nodes(&mut top);

    Some(ModuleNavigation {
        id: module.id.clone(),
        slug: module.slug.clone(),
        title: module.title.clone(),
        cover_image: module.cover_image.clone(),
        resources: top,
    })
}

/// Validate one leaf row and convert it to a node, attaching solutions
fn leaf_node(
    row: &SubtreeRow,
    solutions: &mut HashMap<&str, Vec<SolutionRef>>,
) -> Option<NavigationNode> {
    if row.id.is_empty() {
        warn!(slug = %row.slug, "Leaf row has empty id, dropping");
        return None;
    }
    let Some(position) = row.position else {
        warn!(id = %row.id, "Leaf row has no position, dropping");
        return None;
    };

    if row.is_lesson() {
        Some(NavigationNode::Lesson(LessonNode {
            id: row.id.clone(),
            slug: row.slug.clone(),
            title: row.title.clone(),
            position,
            optional: row.optional,
            solutions: solutions.remove(row.id.as_str()).unwrap_or_default(),
        }))
    } else if row.resource_type.as_deref() == Some("post") {
        Some(NavigationNode::Post(PostNode {
            id: row.id.clone(),
            slug: row.slug.clone(),
            title: row.title.clone(),
            position,
        }))
    } else {
        warn!(
            id = %row.id,
            resource_type = ?row.resource_type,
            "Leaf row has unknown resource type, dropping"
        );
        None
    }
}

/// Sort siblings ascending by position; equal positions fall back to
/// lexical id order so rebuilds from the same rows are deterministic.
fn sort_nodes(nodes: &mut [NavigationNode]) {
    nodes.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then_with(|| a.id().cmp(b.id()))
    });
}
