//! End-to-end scenarios: Markdown in, presentational tree and cross-reference
//! index out.

use apiblueprint_engine::{
    CrossReference, DocTree, NodeId, NodeKind, TransformError, process_blueprint,
};
use pretty_assertions::assert_eq;

fn transform(markdown: &str) -> (DocTree, CrossReference) {
    let mut xref = CrossReference::new();
    let tree = process_blueprint(markdown, "api", &mut xref).expect("blueprint should transform");
    (tree, xref)
}

fn transform_err(markdown: &str) -> TransformError {
    let mut xref = CrossReference::new();
    process_blueprint(markdown, "api", &mut xref).expect_err("blueprint should fail")
}

fn child(tree: &DocTree, node: NodeId, index: usize) -> NodeId {
    tree.children(node)[index]
}

fn literal_text(tree: &DocTree, node: NodeId) -> String {
    match tree.kind(node) {
        NodeKind::LiteralBlock { text } => text.clone(),
        other => panic!("expected literal block, got {other:?}"),
    }
}

#[test]
fn test_simple_blueprint() {
    let (tree, xref) = transform(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20       Hello World!\n",
    );

    let root = tree.root();
    assert_eq!(tree.children(root).len(), 1);

    // The top-level resource degenerated into its single implied action
    let entry = child(&tree, root, 0);
    assert_eq!(
        tree.kind(entry),
        &NodeKind::DescEntry {
            method: "get".to_string(),
            uri: "/message".to_string()
        }
    );

    let signature = child(&tree, entry, 0);
    assert_eq!(
        tree.kind(signature),
        &NodeKind::DescSignature {
            text: "GET /message".to_string(),
            anchor: "get--message".to_string()
        }
    );

    let content = child(&tree, entry, 1);
    let response = child(&tree, content, 0);
    assert_eq!(tree.kind(response), &NodeKind::Container);
    assert_eq!(tree.children(response).len(), 3);
    assert_eq!(tree.text(child(&tree, response, 0)), "Response 200");

    let headers = child(&tree, response, 1);
    assert_eq!(tree.text(child(&tree, headers, 0)), "Headers:");
    assert_eq!(
        literal_text(&tree, child(&tree, headers, 1)),
        "Content-Type: text/plain"
    );

    let body = child(&tree, response, 2);
    assert_eq!(tree.text(child(&tree, body, 0)), "Body:");
    assert_eq!(literal_text(&tree, child(&tree, body, 1)), "Hello World!");

    let entry = xref.get("get", "/message").expect("action should be registered");
    assert_eq!(entry.document, "api");
    assert_eq!(entry.identifier, "");
    assert!(!entry.deprecated);
}

#[test]
fn test_description_paragraph_stays_before_headers() {
    let (tree, _) = transform(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \x20   Description of Response\n\
         \n\
         \x20   + Body\n\
         \n\
         \x20         Hello World!\n",
    );

    let entry = child(&tree, tree.root(), 0);
    let response = child(&tree, child(&tree, entry, 1), 0);

    assert_eq!(tree.text(child(&tree, response, 0)), "Response 200");
    assert_eq!(
        tree.text(child(&tree, response, 1)),
        "Description of Response"
    );
    let headers = child(&tree, response, 2);
    assert_eq!(tree.text(child(&tree, headers, 0)), "Headers:");
    assert_eq!(
        literal_text(&tree, child(&tree, headers, 1)),
        "Content-Type: text/plain"
    );
    let body = child(&tree, response, 3);
    assert_eq!(tree.text(child(&tree, body, 0)), "Body:");
    assert_eq!(literal_text(&tree, child(&tree, body, 1)), "Hello World!");
}

#[test]
fn test_explicit_headers_get_content_type_first() {
    let (tree, _) = transform(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \x20   + Headers\n\
         \n\
         \x20         Accept-Language: ja\n\
         \n\
         \x20   + Body\n\
         \n\
         \x20         Hello World!\n",
    );

    let entry = child(&tree, tree.root(), 0);
    let response = child(&tree, child(&tree, entry, 1), 0);

    let headers = child(&tree, response, 1);
    assert_eq!(tree.text(child(&tree, headers, 0)), "Headers:");
    assert_eq!(
        literal_text(&tree, child(&tree, headers, 1)),
        "Content-Type: text/plain\nAccept-Language: ja"
    );

    let body = child(&tree, response, 2);
    assert_eq!(literal_text(&tree, child(&tree, body, 1)), "Hello World!");
}

#[test]
fn test_content_type_merge_is_idempotent() {
    // The declared content type already appears in the explicit Headers
    // section; merging must not duplicate the line.
    let (tree, _) = transform(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \x20   + Headers\n\
         \n\
         \x20         Content-Type: text/plain\n",
    );

    let entry = child(&tree, tree.root(), 0);
    let response = child(&tree, child(&tree, entry, 1), 0);
    let headers = child(&tree, response, 1);
    assert_eq!(
        literal_text(&tree, child(&tree, headers, 1)),
        "Content-Type: text/plain"
    );
}

#[test]
fn test_resource_group_with_two_resources() {
    let (tree, xref) = transform(
        "# Group Blog Posts\n\
         ## GET /posts/{id}\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   Hello World!\n\
         \n\
         ## POST /posts\n\
         + Parameters\n\
         \x20   + message (string, required)\n\
         \n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   OK\n",
    );

    let group = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.kind(group),
        &NodeKind::Section {
            id: Some("blog-posts".to_string())
        }
    );
    assert_eq!(tree.text(child(&tree, group, 0)), "Blog Posts");

    let first = child(&tree, group, 1);
    assert!(matches!(tree.kind(first), NodeKind::DescEntry { .. }));
    assert_eq!(tree.text(child(&tree, first, 0)), "GET /posts/{id}");

    let second = child(&tree, group, 2);
    assert_eq!(tree.text(child(&tree, second, 0)), "POST /posts");

    // Parameters keep their (unclassified) bullet content
    let second_content = child(&tree, second, 1);
    let parameters = child(&tree, second_content, 0);
    assert_eq!(tree.text(child(&tree, parameters, 0)), "Parameters:");
    assert_eq!(
        tree.text(child(&tree, parameters, 1)),
        "message (string, required)"
    );

    assert_eq!(xref.len(), 2);
    assert!(xref.get("get", "/posts/{id}").is_some());
    assert!(xref.get("post", "/posts").is_some());
}

#[test]
fn test_named_actions_inherit_resource_uri() {
    let (tree, xref) = transform(
        "# Blog Posts [/posts]\n\
         ## Retrieve Blog Posts [GET]\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   Hello World!\n\
         \n\
         ## Create a new Post [POST]\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   OK\n",
    );

    let resource = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.kind(resource),
        &NodeKind::Section {
            id: Some("blog-posts".to_string())
        }
    );
    assert_eq!(tree.text(child(&tree, resource, 0)), "Blog Posts");

    let first = child(&tree, resource, 1);
    assert_eq!(
        tree.text(child(&tree, first, 0)),
        "GET /posts (Retrieve Blog Posts)"
    );
    let second = child(&tree, resource, 2);
    assert_eq!(
        tree.text(child(&tree, second, 0)),
        "POST /posts (Create a new Post)"
    );

    assert_eq!(
        xref.get("get", "/posts").map(|e| e.identifier.as_str()),
        Some("Retrieve Blog Posts")
    );
    assert_eq!(
        xref.get("post", "/posts").map(|e| e.identifier.as_str()),
        Some("Create a new Post")
    );
}

#[test]
fn test_uri_inheritance_roundtrip() {
    let (tree, xref) = transform(
        "# /posts/{id}\n\
         ## GET\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   Hello World!\n",
    );

    // The resource has no identifier, so the section title falls back to the URI
    let resource = child(&tree, tree.root(), 0);
    assert_eq!(tree.text(child(&tree, resource, 0)), "/posts/{id}");

    let action = child(&tree, resource, 1);
    assert_eq!(
        tree.kind(action),
        &NodeKind::DescEntry {
            method: "get".to_string(),
            uri: "/posts/{id}".to_string()
        }
    );
    assert!(xref.get("get", "/posts/{id}").is_some());
}

#[test]
fn test_request_with_body_and_content_type() {
    let (tree, _) = transform(
        "# Blog Post [/posts]\n\
         ## Create a new Post [POST]\n\
         + Request (application/json)\n\
         \x20   + Body\n\
         \n\
         \x20         {\n\
         \x20           \"message\": \"hello world\"\n\
         \x20         }\n\
         \n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   OK\n",
    );

    let resource = child(&tree, tree.root(), 0);
    let action = child(&tree, resource, 1);
    let content = child(&tree, action, 1);

    let request = child(&tree, content, 0);
    assert_eq!(tree.text(child(&tree, request, 0)), "Request");
    let headers = child(&tree, request, 1);
    assert_eq!(
        literal_text(&tree, child(&tree, headers, 1)),
        "Content-Type: application/json"
    );
    let body = child(&tree, request, 2);
    assert!(literal_text(&tree, child(&tree, body, 1)).contains("\"message\": \"hello world\""));

    let response = child(&tree, content, 1);
    assert_eq!(tree.text(child(&tree, response, 0)), "Response 200");
}

#[test]
fn test_request_with_identifier() {
    let (tree, _) = transform(
        "# Blog Post [/posts]\n\
         ## Create a new Post [POST]\n\
         + Request Create a new Post (application/json)\n\
         \x20   + Body\n\
         \n\
         \x20         {}\n\
         \n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   OK\n",
    );

    let resource = child(&tree, tree.root(), 0);
    let action = child(&tree, resource, 1);
    let request = child(&tree, child(&tree, action, 1), 0);

    assert_eq!(tree.text(child(&tree, request, 0)), "Request Create a new Post");
}

#[test]
fn test_bracket_action_at_top_level_becomes_resource_with_implied_action() {
    let (tree, xref) = transform(
        "# Delete a Post [DELETE /posts/{id}]\n\
         + Response 204\n",
    );

    let entry = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.kind(entry),
        &NodeKind::DescEntry {
            method: "delete".to_string(),
            uri: "/posts/{id}".to_string()
        }
    );
    assert_eq!(
        tree.text(child(&tree, entry, 0)),
        "DELETE /posts/{id} (Delete a Post)"
    );
    assert_eq!(
        xref.get("delete", "/posts/{id}").map(|e| e.identifier.as_str()),
        Some("Delete a Post")
    );
}

#[test]
fn test_bracket_action_nested_in_resource_stays_action() {
    let (tree, _) = transform(
        "# Blog Posts [/posts]\n\
         ## Delete a Post [DELETE /posts/{id}]\n\
         + Response 204\n",
    );

    let resource = child(&tree, tree.root(), 0);
    assert_eq!(tree.text(child(&tree, resource, 0)), "Blog Posts");
    let action = child(&tree, resource, 1);
    assert_eq!(
        tree.text(child(&tree, action, 0)),
        "DELETE /posts/{id} (Delete a Post)"
    );
}

#[test]
fn test_response_without_status_code_is_fatal() {
    let err = transform_err(
        "# GET /message\n\
         + Response OK\n",
    );

    assert!(matches!(err, TransformError::TitleParse { .. }));
    assert!(err.to_string().contains("Response OK"));
}

#[test]
fn test_action_without_response_is_fatal() {
    let err = transform_err(
        "# Blog Posts [/posts]\n\
         ## Retrieve Blog Posts [GET]\n",
    );

    assert!(matches!(err, TransformError::StructuralInvariant { .. }));
    assert!(err.to_string().contains("at least one Response"));
}

#[test]
fn test_resource_without_action_or_method_is_fatal() {
    let err = transform_err(
        "# /posts\n\
         Nothing here describes an action.\n",
    );

    assert!(matches!(err, TransformError::StructuralInvariant { .. }));
    assert!(err.to_string().contains("at least one Action"));
}

#[test]
fn test_duplicate_headers_sections_are_fatal() {
    let err = transform_err(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \x20   + Headers\n\
         \n\
         \x20         A: 1\n\
         \n\
         \x20   + Headers\n\
         \n\
         \x20         B: 2\n",
    );

    assert!(matches!(err, TransformError::StructuralInvariant { .. }));
    assert!(err.to_string().contains("at most one Headers"));
}

#[test]
fn test_action_without_uri_is_fatal() {
    let err = transform_err(
        "# Retrieve Blog Posts [GET]\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   Hello World!\n",
    );

    assert!(matches!(err, TransformError::UnresolvedUri { .. }));
    assert!(err.to_string().contains("Retrieve Blog Posts"));
}

#[test]
fn test_data_structures_renders_as_labelled_container() {
    let (tree, _) = transform(
        "# GET /message\n\
         + Response 200 (text/plain)\n\
         \n\
         \x20   Hello World!\n\
         \n\
         # Data Structures\n\
         Shared type definitions.\n",
    );

    let data_structures = child(&tree, tree.root(), 1);
    assert_eq!(tree.kind(data_structures), &NodeKind::Container);
    assert_eq!(tree.text(child(&tree, data_structures, 0)), "Data Structures:");
    assert_eq!(
        tree.text(child(&tree, data_structures, 1)),
        "Shared type definitions."
    );
}

#[test]
fn test_no_typed_sections_survive_emission() {
    let (tree, _) = transform(
        "# Group Blog Posts\n\
         ## GET /posts/{id}\n\
         + Request (application/json)\n\
         \x20   + Headers\n\
         \n\
         \x20         X-Api-Key: secret\n\
         \n\
         + Response 200 (application/json)\n\
         \n\
         \x20   {}\n",
    );

    for node in tree.descendants(tree.root()) {
        assert!(
            !matches!(tree.kind(node), NodeKind::Blueprint(_)),
            "typed section leaked into output: {:?}",
            tree.kind(node)
        );
    }
}

#[test]
fn test_unrecognized_content_is_left_untouched() {
    let (tree, xref) = transform(
        "# Introduction\n\
         Just prose, not an API section.\n",
    );

    let section = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.kind(section),
        &NodeKind::Section {
            id: Some("introduction".to_string())
        }
    );
    assert_eq!(tree.text(child(&tree, section, 0)), "Introduction");
    assert_eq!(
        tree.text(child(&tree, section, 1)),
        "Just prose, not an API section."
    );
    assert!(xref.is_empty());
}
