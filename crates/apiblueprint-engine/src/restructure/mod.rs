//! Two-pass restructuring of a generic block tree into a documentation tree.
//!
//! Pass 1 (classify & lift) must complete over the whole document before
//! Pass 2 (validate, synthesize, render) starts: the bottom-up validation and
//! URI inheritance assume every section is already typed and correctly
//! nested. The passes never interleave.

mod pass1;
mod pass2;

use crate::blueprint::title::dedent;
use crate::doctree::{DocTree, NodeId, NodeKind};
use crate::error::TransformError;
use crate::xref::CrossReference;

/// Transforms a generic document tree in place.
///
/// `document` names the source document in the cross-reference index. On
/// error the tree contents are unspecified and must be discarded; no partial
/// result is emitted.
pub fn translate(
    tree: &mut DocTree,
    document: &str,
    xref: &mut CrossReference,
) -> Result<(), TransformError> {
    pass1::run(tree)?;
    pass2::run(tree, document, xref)
}

/// Re-flows a Body section's raw content: common indentation is stripped and
/// paragraphs become literal blocks, reversing what the bullet-list source
/// notation did to nested payload text.
pub(crate) fn dedent_blocks(tree: &mut DocTree, node: NodeId) {
    for child in tree.children(node).to_vec() {
        if matches!(
            tree.kind(child),
            NodeKind::Paragraph { .. } | NodeKind::LiteralBlock { .. }
        ) {
            let text = dedent(&tree.text(child));
            tree.replace_kind(child, NodeKind::LiteralBlock { text });
        }
    }
}
