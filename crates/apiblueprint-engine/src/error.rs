use thiserror::Error;

/// Fatal restructuring errors.
///
/// A classification miss is not represented here — unrecognized titles leave
/// their nodes untouched. These errors abort the transformation of the whole
/// document: no partial tree is ever emitted.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A node already committed to a section kind has a title that fails the
    /// kind's grammar (e.g. a Response without a numeric status code).
    #[error("cannot parse {kind} section title: {title:?}")]
    TitleParse { kind: &'static str, title: String },

    /// A section violates one of its child cardinality rules.
    #[error("{kind} section {rule}")]
    StructuralInvariant { kind: &'static str, rule: String },

    /// An action still has no URI after inheriting from its enclosing
    /// resource.
    #[error("cannot resolve URI for action {identifier:?}")]
    UnresolvedUri { identifier: String },
}
