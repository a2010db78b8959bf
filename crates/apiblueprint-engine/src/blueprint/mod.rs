//! Typed API Blueprint sections.
//!
//! Each section kind owns the rule for turning its raw title text into
//! structured attributes ([`Section::from_title`]) and the cardinality rules
//! for its direct section children ([`validate_children`]). Dispatch is a
//! plain `match` over the tagged [`Section`] enum.

pub mod classify;
pub mod title;

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::TransformError;
use title::{extract_option, is_http_method, strip_option};

/// The closed set of section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    ResourceGroup,
    Resource,
    Action,
    Request,
    Response,
    Parameters,
    Attributes,
    Headers,
    Body,
    Schema,
    Model,
    DataStructures,
    Relation,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::ResourceGroup => "Resource Group",
            SectionKind::Resource => "Resource",
            SectionKind::Action => "Action",
            SectionKind::Request => "Request",
            SectionKind::Response => "Response",
            SectionKind::Parameters => "Parameters",
            SectionKind::Attributes => "Attributes",
            SectionKind::Headers => "Headers",
            SectionKind::Body => "Body",
            SectionKind::Schema => "Schema",
            SectionKind::Model => "Model",
            SectionKind::DataStructures => "Data Structures",
            SectionKind::Relation => "Relation",
        }
    }

    /// Payload sections may carry Headers/Attributes/Body/Schema children and
    /// synthesize an implicit Body from untyped content.
    pub fn is_payload(self) -> bool {
        matches!(
            self,
            SectionKind::Request | SectionKind::Response | SectionKind::Model
        )
    }
}

/// A resource: one URI template, optionally named, possibly carrying the
/// method of an implied action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resource {
    pub identifier: String,
    pub http_method: String,
    pub uri: String,
    pub has_action: bool,
}

/// One HTTP-method-handling operation. The URI may be absent until it is
/// inherited from the enclosing resource during restructuring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub identifier: String,
    pub http_method: String,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Request {
    pub identifier: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status_code: u16,
    pub content_type: String,
}

/// Ordered header lines. Content is collected from the section's raw block
/// content in Pass 1; the owning payload's content type is merged in Pass 2.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Headers {
    pub lines: Vec<String>,
}

impl Headers {
    /// Inserts a header line at the front unless an identical line is already
    /// present, so merging the same content type twice is a no-op.
    pub fn insert_front(&mut self, line: &str) {
        if self.lines.iter().any(|existing| existing == line) {
            return;
        }
        self.lines.insert(0, line.to_string());
    }
}

/// A typed section with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Section {
    ResourceGroup { identifier: String },
    Resource(Resource),
    Action(Action),
    Request(Request),
    Response(Response),
    Headers(Headers),
    Parameters,
    Attributes,
    Body,
    Schema,
    Model,
    DataStructures,
    Relation,
}

fn action_title_regex() -> &'static Regex {
    static ACTION_REGEX: OnceLock<Regex> = OnceLock::new();
    ACTION_REGEX.get_or_init(|| Regex::new(r"^(.*)\s+\[(.*)\]$").expect("Invalid action regex"))
}

fn request_title_regex() -> &'static Regex {
    static REQUEST_REGEX: OnceLock<Regex> = OnceLock::new();
    REQUEST_REGEX.get_or_init(|| Regex::new(r"^Request(?:\s+(.+))?$").expect("Invalid request regex"))
}

fn request_argument_regex() -> &'static Regex {
    static ARGUMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    ARGUMENT_REGEX
        .get_or_init(|| Regex::new(r"^(.*?\s+)?\((.+)\)$").expect("Invalid request argument regex"))
}

fn response_title_regex() -> &'static Regex {
    static RESPONSE_REGEX: OnceLock<Regex> = OnceLock::new();
    RESPONSE_REGEX.get_or_init(|| {
        Regex::new(r"^Response\s+(\d+)(?:\s+\((.+)\))?$").expect("Invalid response regex")
    })
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::ResourceGroup { .. } => SectionKind::ResourceGroup,
            Section::Resource(_) => SectionKind::Resource,
            Section::Action(_) => SectionKind::Action,
            Section::Request(_) => SectionKind::Request,
            Section::Response(_) => SectionKind::Response,
            Section::Headers(_) => SectionKind::Headers,
            Section::Parameters => SectionKind::Parameters,
            Section::Attributes => SectionKind::Attributes,
            Section::Body => SectionKind::Body,
            Section::Schema => SectionKind::Schema,
            Section::Model => SectionKind::Model,
            Section::DataStructures => SectionKind::DataStructures,
            Section::Relation => SectionKind::Relation,
        }
    }

    /// Builds a section of the given kind from its raw title text.
    ///
    /// By the time this runs the node has already been committed to `kind` by
    /// the classifier, so a title that fails the kind's stricter grammar is a
    /// fatal [`TransformError::TitleParse`], not a miss.
    pub fn from_title(kind: SectionKind, raw_title: &str) -> Result<Section, TransformError> {
        let title = raw_title.trim();
        match kind {
            SectionKind::ResourceGroup => parse_resource_group(title),
            SectionKind::Resource => parse_resource(title).map(Section::Resource),
            SectionKind::Action => parse_action(title).map(Section::Action),
            SectionKind::Request => parse_request(title).map(Section::Request),
            SectionKind::Response => parse_response(title).map(Section::Response),
            SectionKind::Headers => Ok(Section::Headers(Headers::default())),
            SectionKind::Parameters => Ok(Section::Parameters),
            SectionKind::Attributes => Ok(Section::Attributes),
            SectionKind::Body => Ok(Section::Body),
            SectionKind::Schema => Ok(Section::Schema),
            SectionKind::Model => Ok(Section::Model),
            SectionKind::DataStructures => Ok(Section::DataStructures),
            SectionKind::Relation => Ok(Section::Relation),
        }
    }
}

fn title_error(kind: SectionKind, title: &str) -> TransformError {
    TransformError::TitleParse {
        kind: kind.label(),
        title: title.to_string(),
    }
}

fn parse_resource_group(title: &str) -> Result<Section, TransformError> {
    let identifier = title
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| title_error(SectionKind::ResourceGroup, title))?;
    Ok(Section::ResourceGroup {
        identifier: identifier.to_string(),
    })
}

fn parse_resource(title: &str) -> Result<Resource, TransformError> {
    let parts: Vec<&str> = title.split_whitespace().collect();
    let option = extract_option(title);

    match (parts.as_slice(), option) {
        // <URI template>
        ([uri], None) => Ok(Resource {
            uri: (*uri).to_string(),
            ..Resource::default()
        }),
        // <HTTP request method> <URI template>
        ([method, uri], None) => Ok(Resource {
            http_method: (*method).to_string(),
            uri: (*uri).to_string(),
            ..Resource::default()
        }),
        (_, Some(option)) => {
            let identifier = strip_option(title).to_string();
            let options: Vec<&str> = option.split_whitespace().collect();
            match options.as_slice() {
                // <identifier> [<URI template>]
                [uri] => Ok(Resource {
                    identifier,
                    uri: (*uri).to_string(),
                    ..Resource::default()
                }),
                // <identifier> [<HTTP request method> <URI template>]
                [method, uri] => Ok(Resource {
                    identifier,
                    http_method: (*method).to_string(),
                    uri: (*uri).to_string(),
                    ..Resource::default()
                }),
                _ => Err(title_error(SectionKind::Resource, title)),
            }
        }
        _ => Err(title_error(SectionKind::Resource, title)),
    }
}

fn parse_action(title: &str) -> Result<Action, TransformError> {
    if is_http_method(title) {
        return Ok(Action {
            identifier: String::new(),
            http_method: title.to_string(),
            uri: None,
        });
    }

    // <HTTP request method> <URI template>, no brackets
    let parts: Vec<&str> = title.split_whitespace().collect();
    if let [method, uri] = parts.as_slice()
        && is_http_method(method)
        && extract_option(title).is_none()
    {
        return Ok(Action {
            identifier: String::new(),
            http_method: (*method).to_string(),
            uri: Some((*uri).to_string()),
        });
    }

    // <identifier> [<HTTP request method>] or <identifier> [<method> <URI template>]
    let caps = action_title_regex()
        .captures(title)
        .ok_or_else(|| title_error(SectionKind::Action, title))?;
    let identifier = caps[1].to_string();
    let options: Vec<&str> = caps[2].split_whitespace().collect();
    match options.as_slice() {
        [method] => Ok(Action {
            identifier,
            http_method: (*method).to_string(),
            uri: None,
        }),
        [method, uri] => Ok(Action {
            identifier,
            http_method: (*method).to_string(),
            uri: Some((*uri).to_string()),
        }),
        _ => Err(title_error(SectionKind::Action, title)),
    }
}

fn parse_request(title: &str) -> Result<Request, TransformError> {
    let caps = request_title_regex()
        .captures(title)
        .ok_or_else(|| title_error(SectionKind::Request, title))?;
    let argument = caps.get(1).map(|m| m.as_str()).unwrap_or("");

    match request_argument_regex().captures(argument) {
        Some(caps) => Ok(Request {
            identifier: caps.get(1).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            content_type: caps[2].trim().to_string(),
        }),
        None => Ok(Request {
            identifier: argument.to_string(),
            content_type: String::new(),
        }),
    }
}

fn parse_response(title: &str) -> Result<Response, TransformError> {
    let caps = response_title_regex()
        .captures(title)
        .ok_or_else(|| title_error(SectionKind::Response, title))?;
    let status_code = caps[1]
        .parse::<u16>()
        .map_err(|_| title_error(SectionKind::Response, title))?;
    Ok(Response {
        status_code,
        content_type: caps.get(2).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
    })
}

/// Enforces the cardinality rules a section imposes on its direct section
/// children. Non-section content (paragraphs, code blocks) is not counted.
pub fn validate_children(
    kind: SectionKind,
    children: &[SectionKind],
) -> Result<(), TransformError> {
    let count = |wanted: SectionKind| children.iter().filter(|k| **k == wanted).count();
    let at_most_one = |child: SectionKind| -> Result<(), TransformError> {
        if count(child) > 1 {
            Err(TransformError::StructuralInvariant {
                kind: kind.label(),
                rule: format!("may contain at most one {} section", child.label()),
            })
        } else {
            Ok(())
        }
    };

    match kind {
        SectionKind::Resource => {
            at_most_one(SectionKind::Parameters)?;
            at_most_one(SectionKind::Attributes)?;
            at_most_one(SectionKind::Model)?;
        }
        SectionKind::Action => {
            at_most_one(SectionKind::Relation)?;
            at_most_one(SectionKind::Parameters)?;
            at_most_one(SectionKind::Attributes)?;
            if count(SectionKind::Response) == 0 {
                return Err(TransformError::StructuralInvariant {
                    kind: kind.label(),
                    rule: "must contain at least one Response section".to_string(),
                });
            }
        }
        SectionKind::Request | SectionKind::Response | SectionKind::Model => {
            at_most_one(SectionKind::Headers)?;
            at_most_one(SectionKind::Attributes)?;
            at_most_one(SectionKind::Body)?;
            at_most_one(SectionKind::Schema)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_resource_title_bare_uri() {
        let resource = parse_resource("/posts/{id}").unwrap();
        assert_eq!(resource.uri, "/posts/{id}");
        assert_eq!(resource.identifier, "");
        assert_eq!(resource.http_method, "");
    }

    #[test]
    fn test_resource_title_method_and_uri() {
        let resource = parse_resource("GET /message").unwrap();
        assert_eq!(resource.http_method, "GET");
        assert_eq!(resource.uri, "/message");
    }

    #[test]
    fn test_resource_title_identifier_with_uri_option() {
        let resource = parse_resource("Blog Posts [/posts]").unwrap();
        assert_eq!(resource.identifier, "Blog Posts");
        assert_eq!(resource.uri, "/posts");
        assert_eq!(resource.http_method, "");
    }

    #[test]
    fn test_resource_title_identifier_with_method_and_uri_option() {
        let resource = parse_resource("Delete a Post [DELETE /posts/{id}]").unwrap();
        assert_eq!(resource.identifier, "Delete a Post");
        assert_eq!(resource.http_method, "DELETE");
        assert_eq!(resource.uri, "/posts/{id}");
    }

    #[rstest]
    #[case("GET", "GET", None, "")]
    #[case("GET /message", "GET", Some("/message"), "")]
    #[case("Retrieve Blog Posts [GET]", "GET", None, "Retrieve Blog Posts")]
    #[case(
        "Create a new Post [POST /posts]",
        "POST",
        Some("/posts"),
        "Create a new Post"
    )]
    fn test_action_title_forms(
        #[case] title: &str,
        #[case] method: &str,
        #[case] uri: Option<&str>,
        #[case] identifier: &str,
    ) {
        let action = parse_action(title).unwrap();
        assert_eq!(action.http_method, method);
        assert_eq!(action.uri.as_deref(), uri);
        assert_eq!(action.identifier, identifier);
    }

    #[test]
    fn test_action_title_without_brackets_or_method_fails() {
        assert!(parse_action("Just some words").is_err());
    }

    #[rstest]
    #[case("Request", "", "")]
    #[case("Request (application/json)", "", "application/json")]
    #[case(
        "Request Create a new Post (application/json)",
        "Create a new Post",
        "application/json"
    )]
    #[case("Request Unnamed Payload", "Unnamed Payload", "")]
    fn test_request_title_forms(
        #[case] title: &str,
        #[case] identifier: &str,
        #[case] content_type: &str,
    ) {
        let request = parse_request(title).unwrap();
        assert_eq!(request.identifier, identifier);
        assert_eq!(request.content_type, content_type);
    }

    #[test]
    fn test_response_title_with_content_type() {
        let response = parse_response("Response 200 (text/plain)").unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.content_type, "text/plain");
    }

    #[test]
    fn test_response_title_without_content_type() {
        let response = parse_response("Response 404").unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.content_type, "");
    }

    #[test]
    fn test_response_title_requires_status_code() {
        let err = parse_response("Response").unwrap_err();
        assert!(matches!(err, TransformError::TitleParse { .. }));
        assert!(err.to_string().contains("Response"));
    }

    #[test]
    fn test_resource_group_title() {
        let section = parse_resource_group("Group Blog Posts").unwrap();
        assert_eq!(
            section,
            Section::ResourceGroup {
                identifier: "Blog Posts".to_string()
            }
        );
        assert!(parse_resource_group("Group").is_err());
    }

    #[test]
    fn test_headers_insert_front_is_idempotent() {
        let mut headers = Headers {
            lines: vec!["Accept-Language: ja".to_string()],
        };
        headers.insert_front("Content-Type: text/plain");
        headers.insert_front("Content-Type: text/plain");

        assert_eq!(
            headers.lines,
            vec![
                "Content-Type: text/plain".to_string(),
                "Accept-Language: ja".to_string()
            ]
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_headers() {
        let err = validate_children(
            SectionKind::Response,
            &[SectionKind::Headers, SectionKind::Headers, SectionKind::Body],
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most one Headers"));
    }

    #[test]
    fn test_validate_requires_response_on_action() {
        let err = validate_children(SectionKind::Action, &[SectionKind::Request]).unwrap_err();
        assert!(err.to_string().contains("at least one Response"));

        validate_children(
            SectionKind::Action,
            &[SectionKind::Request, SectionKind::Response],
        )
        .unwrap();
    }

    #[test]
    fn test_validate_allows_repeated_requests() {
        validate_children(
            SectionKind::Action,
            &[
                SectionKind::Request,
                SectionKind::Request,
                SectionKind::Response,
            ],
        )
        .unwrap();
    }
}
