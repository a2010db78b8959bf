//! Pass 2: validate, synthesize, render.
//!
//! Assumes Pass 1 has fully typed and nested the tree. Every typed section is
//! validated and restructured on the way down (children must still be typed
//! for the cardinality checks, and a resource must hand its URI to its
//! actions before they render) and replaced by its presentational shape on
//! the way back up, children first.

use crate::blueprint::{Headers, Section, validate_children};
use crate::doctree::{DocTree, Inline, NodeId, NodeKind, make_id};
use crate::error::TransformError;
use crate::xref::{CrossReference, XrefEntry, http_resource_anchor};

use super::dedent_blocks;

pub(crate) fn run(
    tree: &mut DocTree,
    document: &str,
    xref: &mut CrossReference,
) -> Result<(), TransformError> {
    let root = tree.root();
    walk(tree, root, document, xref)
}

fn walk(
    tree: &mut DocTree,
    node: NodeId,
    document: &str,
    xref: &mut CrossReference,
) -> Result<(), TransformError> {
    if matches!(tree.kind(node), NodeKind::Blueprint(_)) {
        validate_node(tree, node)?;
        restruct(tree, node);
    }
    for child in tree.children(node).to_vec() {
        walk(tree, child, document, xref)?;
    }
    if matches!(tree.kind(node), NodeKind::Blueprint(_)) {
        render(tree, node, document, xref)?;
    }
    Ok(())
}

/// Checks the section's cardinality rules against its direct typed children.
/// Ordinary content nodes and deeper descendants are not considered.
fn validate_node(tree: &DocTree, node: NodeId) -> Result<(), TransformError> {
    let NodeKind::Blueprint(section) = tree.kind(node) else {
        return Ok(());
    };
    let child_kinds: Vec<_> = tree
        .children(node)
        .iter()
        .filter_map(|child| match tree.kind(*child) {
            NodeKind::Blueprint(child_section) => Some(child_section.kind()),
            _ => None,
        })
        .collect();
    validate_children(section.kind(), &child_kinds)
}

fn restruct(tree: &mut DocTree, node: NodeId) {
    let is_payload = match tree.kind(node) {
        NodeKind::Blueprint(section) => section.kind().is_payload(),
        _ => false,
    };
    if matches!(tree.kind(node), NodeKind::Blueprint(Section::Resource(_))) {
        restruct_resource(tree, node);
    } else if is_payload {
        restruct_payload(tree, node);
    }
}

/// Resources propagate their URI into actions that did not state one.
fn restruct_resource(tree: &mut DocTree, node: NodeId) {
    let uri = match tree.kind(node) {
        NodeKind::Blueprint(Section::Resource(resource)) => resource.uri.clone(),
        _ => return,
    };
    let actions: Vec<NodeId> = tree
        .children(node)
        .iter()
        .filter(|child| matches!(tree.kind(**child), NodeKind::Blueprint(Section::Action(_))))
        .copied()
        .collect();

    if !actions.is_empty()
        && let NodeKind::Blueprint(Section::Resource(resource)) = tree.kind_mut(node)
    {
        resource.has_action = true;
    }
    if uri.is_empty() {
        return;
    }
    for action_id in actions {
        if let NodeKind::Blueprint(Section::Action(action)) = tree.kind_mut(action_id)
            && action.uri.is_none()
        {
            action.uri = Some(uri.clone());
        }
    }
}

/// Payload sections (Request, Response, Model) wrap untyped trailing content
/// into an implicit Body and merge their content type into a Headers child.
fn restruct_payload(tree: &mut DocTree, node: NodeId) {
    let children = tree.children(node).to_vec();
    let has_section_child = children
        .iter()
        .any(|child| matches!(tree.kind(*child), NodeKind::Blueprint(_)));
    if !children.is_empty() && !has_section_child {
        let body = tree.push_node(NodeKind::Blueprint(Section::Body));
        tree.transpose_children(node, body);
        tree.append(node, body);
        dedent_blocks(tree, body);
    }

    let content_type = match tree.kind(node) {
        NodeKind::Blueprint(Section::Request(request)) => request.content_type.clone(),
        NodeKind::Blueprint(Section::Response(response)) => response.content_type.clone(),
        _ => String::new(),
    };
    if content_type.is_empty() {
        return;
    }
    let line = format!("Content-Type: {content_type}");

    let headers: Vec<NodeId> = tree
        .children(node)
        .iter()
        .filter(|child| matches!(tree.kind(**child), NodeKind::Blueprint(Section::Headers(_))))
        .copied()
        .collect();
    if headers.is_empty() {
        let header_node = tree.push_node(NodeKind::Blueprint(Section::Headers(Headers {
            lines: vec![line],
        })));
        let body_position = tree
            .children(node)
            .iter()
            .position(|child| matches!(tree.kind(*child), NodeKind::Blueprint(Section::Body)));
        match body_position {
            Some(position) => tree.insert(node, position, header_node),
            None => tree.append(node, header_node),
        }
    } else {
        for header_id in headers {
            if let NodeKind::Blueprint(Section::Headers(headers)) = tree.kind_mut(header_id) {
                headers.insert_front(&line);
            }
        }
    }
}

/// Replaces a typed section with its presentational shape. After this the
/// node and its subtree contain only generic output nodes.
fn render(
    tree: &mut DocTree,
    node: NodeId,
    document: &str,
    xref: &mut CrossReference,
) -> Result<(), TransformError> {
    let NodeKind::Blueprint(section) = tree.kind(node).clone() else {
        return Ok(());
    };
    match section {
        Section::ResourceGroup { identifier } => {
            let title = tree.push_node(NodeKind::Title {
                text: identifier.clone(),
            });
            tree.insert(node, 0, title);
            tree.replace_kind(
                node,
                NodeKind::Section {
                    id: Some(make_id(&identifier)),
                },
            );
        }
        Section::Resource(resource) => {
            let text = if resource.identifier.is_empty() {
                resource.uri
            } else {
                resource.identifier
            };
            if let Some(first) = tree.first_child(node)
                && matches!(tree.kind(first), NodeKind::Title { .. })
            {
                tree.replace_kind(first, NodeKind::Title { text: text.clone() });
            } else {
                let title = tree.push_node(NodeKind::Title { text: text.clone() });
                tree.insert(node, 0, title);
            }
            tree.replace_kind(
                node,
                NodeKind::Section {
                    id: Some(make_id(&text)),
                },
            );
        }
        Section::Action(action) => {
            let uri = action
                .uri
                .filter(|uri| !uri.is_empty())
                .ok_or(TransformError::UnresolvedUri {
                    identifier: action.identifier.clone(),
                })?;
            xref.register(
                &action.http_method,
                &uri,
                XrefEntry {
                    document: document.to_string(),
                    identifier: action.identifier.clone(),
                    deprecated: false,
                },
            );
            let text = if action.identifier.is_empty() {
                format!("{} {}", action.http_method, uri)
            } else {
                format!("{} {} ({})", action.http_method, uri, action.identifier)
            };
            let content = tree.push_node(NodeKind::Container);
            tree.transpose_children(node, content);
            let signature = tree.push_node(NodeKind::DescSignature {
                text,
                anchor: http_resource_anchor(&action.http_method, &uri),
            });
            tree.replace_kind(
                node,
                NodeKind::DescEntry {
                    method: action.http_method.to_lowercase(),
                    uri,
                },
            );
            tree.append(node, signature);
            tree.append(node, content);
        }
        Section::Request(request) => {
            let mut inlines = vec![Inline::Strong("Request".to_string())];
            if !request.identifier.is_empty() {
                inlines.push(Inline::Text(format!(" {}", request.identifier)));
            }
            label_container(tree, node, inlines);
        }
        Section::Response(response) => {
            label_container(
                tree,
                node,
                vec![
                    Inline::Strong("Response".to_string()),
                    Inline::Text(" ".to_string()),
                    Inline::Literal(response.status_code.to_string()),
                ],
            );
        }
        Section::Headers(headers) => {
            let block = tree.push_node(NodeKind::LiteralBlock {
                text: headers.lines.join("\n"),
            });
            tree.append(node, block);
            label_container(tree, node, plain_label("Headers:"));
        }
        Section::Parameters => label_container(tree, node, plain_label("Parameters:")),
        Section::Body => label_container(tree, node, plain_label("Body:")),
        Section::Attributes => label_container(tree, node, plain_label("Attributes:")),
        Section::Schema => label_container(tree, node, plain_label("Schema:")),
        Section::Model => label_container(tree, node, plain_label("Model:")),
        Section::DataStructures => label_container(tree, node, plain_label("Data Structures:")),
        Section::Relation => label_container(tree, node, plain_label("Relation:")),
    }
    Ok(())
}

fn plain_label(text: &str) -> Vec<Inline> {
    vec![Inline::Text(text.to_string())]
}

fn label_container(tree: &mut DocTree, node: NodeId, inlines: Vec<Inline>) {
    let paragraph = tree.push_node(NodeKind::Paragraph { inlines });
    tree.insert(node, 0, paragraph);
    tree.replace_kind(node, NodeKind::Container);
}
