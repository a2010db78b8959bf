//! Pass 1: classify and lift.
//!
//! Walks the generic tree top-down. Heading-delimited sections whose titles
//! classify are rewritten in place into typed [`Section`] nodes; bullet-list
//! items whose first line classifies are promoted out of their list to become
//! siblings immediately after it. Both conversions extract the structured
//! title fields and discard the raw title node (resources keep theirs until
//! Pass 2 resolves the final section title).

use crate::blueprint::classify::{ClassifyContext, classify};
use crate::blueprint::{Action, Resource, Section, SectionKind};
use crate::doctree::{DocTree, Inline, NodeId, NodeKind, make_id};
use crate::error::TransformError;

use super::dedent_blocks;

pub(crate) fn run(tree: &mut DocTree) -> Result<(), TransformError> {
    wrap_bare_document_title(tree);
    let root = tree.root();
    walk(tree, root, ClassifyContext::top_level())
}

/// A document whose very first child is a bare title gets an enclosing
/// section synthesized around the remainder, so a flat document still
/// produces one top-level section.
fn wrap_bare_document_title(tree: &mut DocTree) {
    let root = tree.root();
    let Some(first) = tree.first_child(root) else {
        return;
    };
    let NodeKind::Title { text } = tree.kind(first) else {
        return;
    };
    let id = make_id(text);
    let section = tree.push_node(NodeKind::Section { id: Some(id) });
    tree.transpose_children(root, section);
    tree.append(root, section);
}

fn walk(tree: &mut DocTree, node: NodeId, ctx: ClassifyContext) -> Result<(), TransformError> {
    match tree.kind(node) {
        NodeKind::Section { .. } => {
            if let Some(title) = section_title(tree, node)
                && let Some(kind) = classify(&title, ctx)
            {
                commit(tree, node, kind)?;
                return walk_section(tree, node, ctx);
            }
            walk_children(tree, node, ctx)
        }
        NodeKind::BulletList => lift_list_items(tree, node, ctx),
        NodeKind::Blueprint(_) => walk_section(tree, node, ctx),
        _ => walk_children(tree, node, ctx),
    }
}

fn walk_children(
    tree: &mut DocTree,
    node: NodeId,
    ctx: ClassifyContext,
) -> Result<(), TransformError> {
    for child in tree.children(node).to_vec() {
        walk(tree, child, ctx)?;
    }
    Ok(())
}

/// Walks into an already-typed section, then applies the departure rule: a
/// resource without any action descendant degenerates into its own implied
/// action.
fn walk_section(
    tree: &mut DocTree,
    node: NodeId,
    ctx: ClassifyContext,
) -> Result<(), TransformError> {
    let inside_resource = ctx.inside_resource
        || matches!(
            tree.kind(node),
            NodeKind::Blueprint(Section::Resource(_) | Section::ResourceGroup { .. })
        );
    walk_children(tree, node, ClassifyContext { inside_resource })?;

    if let NodeKind::Blueprint(Section::Resource(resource)) = tree.kind(node)
        && !has_action_descendant(tree, node)
    {
        let resource = resource.clone();
        degenerate_resource(tree, node, resource)?;
    }
    Ok(())
}

fn section_title(tree: &DocTree, node: NodeId) -> Option<String> {
    let first = tree.first_child(node)?;
    match tree.kind(first) {
        NodeKind::Title { text } => Some(text.clone()),
        _ => None,
    }
}

fn has_action_descendant(tree: &DocTree, node: NodeId) -> bool {
    tree.descendants(node)
        .iter()
        .any(|id| matches!(tree.kind(*id), NodeKind::Blueprint(Section::Action(_))))
}

fn degenerate_resource(
    tree: &mut DocTree,
    node: NodeId,
    resource: Resource,
) -> Result<(), TransformError> {
    if resource.http_method.is_empty() {
        return Err(TransformError::StructuralInvariant {
            kind: SectionKind::Resource.label(),
            rule: "must contain at least one Action section".to_string(),
        });
    }
    if let Some(first) = tree.first_child(node)
        && matches!(tree.kind(first), NodeKind::Title { .. })
    {
        tree.detach(first);
    }
    let uri = if resource.uri.is_empty() {
        None
    } else {
        Some(resource.uri)
    };
    tree.replace_kind(
        node,
        NodeKind::Blueprint(Section::Action(Action {
            identifier: resource.identifier,
            http_method: resource.http_method,
            uri,
        })),
    );
    Ok(())
}

/// Converts a node whose title has classified as `kind` into a typed section,
/// extracting the structured fields and dropping the raw title.
fn commit(tree: &mut DocTree, node: NodeId, kind: SectionKind) -> Result<(), TransformError> {
    let Some(title_id) = tree.first_child(node) else {
        return Ok(());
    };
    let title_text = tree.text(title_id);
    let section = Section::from_title(kind, &title_text)?;
    tree.replace_kind(node, NodeKind::Blueprint(section));
    if kind != SectionKind::Resource {
        tree.detach(title_id);
    }
    match kind {
        SectionKind::Headers => collect_header_lines(tree, node),
        SectionKind::Body => dedent_blocks(tree, node),
        _ => {}
    }
    Ok(())
}

/// Moves raw header text out of the tree into the Headers section's ordered
/// line list.
fn collect_header_lines(tree: &mut DocTree, node: NodeId) {
    let mut lines = Vec::new();
    for child in tree.children(node).to_vec() {
        if matches!(
            tree.kind(child),
            NodeKind::Paragraph { .. } | NodeKind::LiteralBlock { .. }
        ) {
            for line in tree.text(child).lines() {
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
            tree.detach(child);
        }
    }
    if let NodeKind::Blueprint(Section::Headers(headers)) = tree.kind_mut(node) {
        headers.lines = lines;
    }
}

/// Relocates classified bullet-list items to siblings right after their list.
///
/// Items are processed in reverse so removal keeps the remaining indices
/// stable and each promoted item lands at `list position + 1`, preserving
/// source order. An emptied list is removed; the remaining content of a list
/// that keeps unmatched items is left untouched.
fn lift_list_items(
    tree: &mut DocTree,
    list: NodeId,
    ctx: ClassifyContext,
) -> Result<(), TransformError> {
    let Some(parent) = tree.parent(list) else {
        return Ok(());
    };
    let items = tree.children(list).to_vec();
    for &item in items.iter().rev() {
        if !matches!(tree.kind(item), NodeKind::ListItem) {
            continue;
        }
        let Some(first) = tree.first_child(item) else {
            continue;
        };
        if !matches!(tree.kind(first), NodeKind::Paragraph { .. }) {
            continue;
        }
        let Some(kind) = classify(&tree.text(first), ctx) else {
            continue;
        };

        split_item_title(tree, item);
        tree.detach(item);
        commit(tree, item, kind)?;
        let index = tree
            .position(parent, list)
            .map(|i| i + 1)
            .unwrap_or_else(|| tree.children(parent).len());
        tree.insert(parent, index, item);
        walk(tree, item, ctx)?;
    }
    if tree.children(list).is_empty() {
        tree.detach(list);
    }
    Ok(())
}

/// Splits a list item's leading line off as its title. A single-line leading
/// paragraph becomes the title outright; a multi-line one keeps the remaining
/// lines as content.
fn split_item_title(tree: &mut DocTree, item: NodeId) {
    let Some(first) = tree.first_child(item) else {
        return;
    };
    let NodeKind::Paragraph { inlines } = tree.kind(first) else {
        return;
    };
    let text: String = inlines.iter().map(Inline::text).collect();
    match text.split_once('\n') {
        Some((head, rest)) => {
            let head = head.to_string();
            if rest.trim().is_empty() {
                tree.replace_kind(first, NodeKind::Title { text: head });
            } else {
                tree.replace_kind(
                    first,
                    NodeKind::Paragraph {
                        inlines: vec![Inline::Text(rest.to_string())],
                    },
                );
                let title = tree.push_node(NodeKind::Title { text: head });
                tree.insert(item, 0, title);
            }
        }
        None => {
            tree.replace_kind(first, NodeKind::Title { text });
        }
    }
}
