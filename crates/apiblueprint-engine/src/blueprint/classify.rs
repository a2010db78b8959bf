//! Section classification from title text.
//!
//! [`classify`] is the pure front gate of the whole transformation: it maps
//! the first line of a candidate node's title to a [`SectionKind`], or to
//! `None` when the text is ordinary content. It never fails — malformed input
//! is a miss, not an error. Hard errors only appear later, when a committed
//! node's title is parsed by its kind (`Section::from_title`).

use super::SectionKind;
use super::title::{extract_option, is_http_method, is_uri_template};

/// Classification context.
///
/// The same title shape `<identifier> [<method> <uri>]` means a Resource with
/// an implied Action at top level, but an Action when an enclosing section is
/// already a Resource or Resource Group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyContext {
    pub inside_resource: bool,
}

impl ClassifyContext {
    pub fn top_level() -> Self {
        ClassifyContext {
            inside_resource: false,
        }
    }

    fn resource_or_action(self) -> SectionKind {
        if self.inside_resource {
            SectionKind::Action
        } else {
            SectionKind::Resource
        }
    }
}

/// Decides which section kind (if any) a title denotes.
///
/// Only the first line of the title participates; rules are tried in strict
/// precedence order.
pub fn classify(title: &str, ctx: ClassifyContext) -> Option<SectionKind> {
    let title = title.lines().next()?.trim();
    if title.is_empty() {
        return None;
    }
    let leading_word = title.split_whitespace().next()?;
    let option = extract_option(title);

    // Exact keyword: "Data Structures"
    if title == "Data Structures" {
        return Some(SectionKind::DataStructures);
    }

    // Leading-word keywords
    match leading_word {
        "Group" => return Some(SectionKind::ResourceGroup),
        "Model" => return Some(SectionKind::Model),
        "Request" => return Some(SectionKind::Request),
        "Response" => return Some(SectionKind::Response),
        "Attributes" => return Some(SectionKind::Attributes),
        "Relation:" => return Some(SectionKind::Relation),
        _ => {}
    }

    // Single keywords
    match title {
        "Schema" => return Some(SectionKind::Schema),
        "Parameters" => return Some(SectionKind::Parameters),
        "Headers" => return Some(SectionKind::Headers),
        "Body" => return Some(SectionKind::Body),
        _ => {}
    }

    // <HTTP request method>
    if is_http_method(title) {
        return Some(SectionKind::Action);
    }

    // <identifier> [<HTTP request method>]
    if option.is_some_and(is_http_method) {
        return Some(SectionKind::Action);
    }

    // <HTTP request method> <URI template>: a resource that represents its
    // only action, or a plain action when already nested in a resource
    if is_http_method(leading_word) {
        return Some(ctx.resource_or_action());
    }

    // <URI template>
    if is_uri_template(title) {
        return Some(SectionKind::Resource);
    }

    // <identifier> [<URI template>]
    if option.is_some_and(is_uri_template) {
        return Some(SectionKind::Resource);
    }

    // <identifier> [<HTTP request method> <URI template>]: same ambiguity as
    // the bracket-free form above
    if let Some(option) = option
        && let Some((method, uri)) = option.split_once(char::is_whitespace)
        && is_http_method(method)
        && is_uri_template(uri.trim())
    {
        return Some(ctx.resource_or_action());
    }

    None
}
