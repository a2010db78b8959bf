//! Shared helpers for the section title grammar.

use regex::Regex;
use std::sync::OnceLock;

/// HTTP request methods (RFC 7231 plus PATCH from RFC 5789).
pub const HTTP_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
];

pub fn is_http_method(word: &str) -> bool {
    HTTP_METHODS.contains(&word)
}

fn option_regex() -> &'static Regex {
    static OPTION_REGEX: OnceLock<Regex> = OnceLock::new();
    OPTION_REGEX.get_or_init(|| Regex::new(r"\[(.*)\]$").expect("Invalid option regex"))
}

fn uri_template_regex() -> &'static Regex {
    static URI_REGEX: OnceLock<Regex> = OnceLock::new();
    URI_REGEX.get_or_init(|| Regex::new(r"^/\S+$").expect("Invalid URI template regex"))
}

/// Extracts the trailing bracket option from a title: `"Name [GET /x]"` yields
/// `"GET /x"`. Returns `None` when the title carries no trailing brackets.
pub fn extract_option(title: &str) -> Option<&str> {
    option_regex()
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Title text with a trailing bracket option (and the whitespace before it)
/// removed.
pub fn strip_option(title: &str) -> &str {
    match option_regex().find(title) {
        Some(m) => title[..m.start()].trim_end(),
        None => title,
    }
}

/// Whether a token looks like a URI template: starts with `/`, no whitespace.
pub fn is_uri_template(token: &str) -> bool {
    uri_template_regex().is_match(token)
}

/// Strips the whitespace prefix common to every non-blank line, undoing the
/// indentation the bullet-list source notation imposes on nested content.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line.strip_prefix(margin).unwrap_or(line));
    }
    out
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map(|((i, ca), _)| i + ca.len_utf8())
        .unwrap_or(0);
    &a[..end]
}
