//! Output rendering for transformed documentation trees.

use apiblueprint_engine::{CrossReference, DocTree, NodeId, NodeKind, PlainNode};
use serde::Serialize;

/// JSON payload: the presentational tree plus the cross-reference index.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub document: PlainNode,
    pub references: &'a CrossReference,
}

pub fn render_json(tree: &DocTree, references: &CrossReference) -> anyhow::Result<String> {
    let output = JsonOutput {
        document: tree.to_plain(tree.root()),
        references,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Renders the presentational tree as plain readable text: section titles as
/// Markdown-style headings, signatures and paragraphs as lines, literal
/// blocks indented.
pub fn render_text(tree: &DocTree) -> String {
    let mut lines = Vec::new();
    render_node(tree, tree.root(), 1, &mut lines);
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn render_node(tree: &DocTree, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    match tree.kind(node) {
        NodeKind::Document | NodeKind::Container | NodeKind::DescEntry { .. } => {
            for child in tree.children(node) {
                render_node(tree, *child, depth, lines);
            }
        }
        NodeKind::Section { .. } => {
            let mut children = tree.children(node).iter();
            if let Some(first) = children.next() {
                if let NodeKind::Title { text } = tree.kind(*first) {
                    lines.push(format!("{} {}", "#".repeat(depth), text));
                    lines.push(String::new());
                } else {
                    render_node(tree, *first, depth + 1, lines);
                }
            }
            for child in children {
                render_node(tree, *child, depth + 1, lines);
            }
        }
        NodeKind::DescSignature { text, .. } => {
            lines.push(format!("{} {}", "#".repeat(depth), text));
            lines.push(String::new());
        }
        NodeKind::Paragraph { .. } => {
            lines.push(tree.text(node));
            lines.push(String::new());
        }
        NodeKind::LiteralBlock { text } => {
            for line in text.lines() {
                lines.push(format!("    {line}"));
            }
            lines.push(String::new());
        }
        NodeKind::BulletList => {
            for item in tree.children(node) {
                lines.push(format!("- {}", tree.text(*item).replace('\n', " ")));
            }
            lines.push(String::new());
        }
        // Titles are rendered by their parent section; typed sections never
        // reach the output tree
        NodeKind::Title { .. } | NodeKind::ListItem | NodeKind::Blueprint(_) => {}
    }
}
