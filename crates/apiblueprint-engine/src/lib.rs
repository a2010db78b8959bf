//! Core engine: transforms API Blueprint Markdown into a documentation tree.
//!
//! The pipeline is `markdown::parse_markdown` (generic block tree) →
//! `restructure::translate` (two-pass classification, validation and
//! rendering) → a tree of presentational nodes plus a cross-reference index
//! of every emitted operation. The engine needs no filesystem or network
//! access; `io` is only for callers that read blueprints from disk.

pub mod blueprint;
pub mod doctree;
pub mod error;
pub mod io;
pub mod markdown;
pub mod restructure;
pub mod xref;

// Re-export key types for easier usage
pub use doctree::{DocTree, Inline, NodeId, NodeKind, PlainNode, make_id};
pub use error::TransformError;
pub use restructure::translate;
pub use xref::{CrossReference, XrefEntry};

/// Parses and transforms one blueprint document.
///
/// `document` is the name the cross-reference index records for every action
/// found in this blueprint. On error no tree is returned; a blueprint either
/// transforms completely or not at all.
pub fn process_blueprint(
    markdown_text: &str,
    document: &str,
    xref: &mut CrossReference,
) -> Result<DocTree, TransformError> {
    let mut tree = markdown::parse_markdown(markdown_text);
    restructure::translate(&mut tree, document, xref)?;
    Ok(tree)
}
