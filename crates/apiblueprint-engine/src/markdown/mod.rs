//! Markdown front-end adapter.
//!
//! Feeds a pulldown-cmark event stream into a generic [`DocTree`]: headings
//! open nested sections docutils-style (a deeper heading nests, an equal or
//! shallower one closes back up), bullet lists and list items become
//! containers, paragraphs collect inline spans, and code blocks become
//! literal blocks. No API Blueprint semantics live here — the restructuring
//! passes only ever see the generic tree this module produces.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::doctree::{DocTree, Inline, NodeId, NodeKind, make_id};

/// Parses Markdown text into a generic block tree.
pub fn parse_markdown(text: &str) -> DocTree {
    let mut builder = TreeBuilder::new();
    for event in Parser::new(text) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpanStyle {
    Strong,
    Emphasis,
}

struct TreeBuilder {
    tree: DocTree,
    /// Open heading sections, innermost last, with their heading depth.
    section_stack: Vec<(NodeId, u8)>,
    /// Open lists and list items, innermost last.
    container_stack: Vec<NodeId>,
    paragraph: Option<Vec<Inline>>,
    styles: Vec<SpanStyle>,
    heading: Option<(u8, String)>,
    code: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            tree: DocTree::new(),
            section_stack: Vec::new(),
            container_stack: Vec::new(),
            paragraph: None,
            styles: Vec::new(),
            heading: None,
            code: None,
        }
    }

    /// Where block content currently lands: the innermost open list/item,
    /// else the innermost open section, else the document root.
    fn target(&self) -> NodeId {
        self.container_stack
            .last()
            .copied()
            .or_else(|| self.section_stack.last().map(|(id, _)| *id))
            .unwrap_or_else(|| self.tree.root())
    }

    fn section_parent(&self) -> NodeId {
        self.section_stack
            .last()
            .map(|(id, _)| *id)
            .unwrap_or_else(|| self.tree.root())
    }

    fn flush_paragraph(&mut self) {
        if let Some(inlines) = self.paragraph.take()
            && !inlines.is_empty()
        {
            let target = self.target();
            let node = self.tree.push_node(NodeKind::Paragraph { inlines });
            self.tree.append(target, node);
        }
    }

    fn push_inline(&mut self, text: &str) {
        let inlines = self.paragraph.get_or_insert_with(Vec::new);
        let inline = match self.styles.last() {
            Some(SpanStyle::Strong) => Inline::Strong(text.to_string()),
            Some(SpanStyle::Emphasis) => Inline::Emphasis(text.to_string()),
            None => Inline::Text(text.to_string()),
        };
        match (inlines.last_mut(), &inline) {
            (Some(Inline::Text(existing)), Inline::Text(new)) => existing.push_str(new),
            (Some(Inline::Strong(existing)), Inline::Strong(new)) => existing.push_str(new),
            (Some(Inline::Emphasis(existing)), Inline::Emphasis(new)) => existing.push_str(new),
            _ => inlines.push(inline),
        }
    }

    fn push(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_paragraph();
                self.heading = Some((heading_depth(level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, text)) = self.heading.take() {
                    self.open_section(depth, &text);
                }
            }
            Event::Start(Tag::Paragraph) => {
                self.flush_paragraph();
                self.paragraph = Some(Vec::new());
            }
            Event::End(TagEnd::Paragraph) => self.flush_paragraph(),
            Event::Start(Tag::List(_)) => {
                self.flush_paragraph();
                let target = self.target();
                let list = self.tree.push_node(NodeKind::BulletList);
                self.tree.append(target, list);
                self.container_stack.push(list);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush_paragraph();
                self.container_stack.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush_paragraph();
                let list = self.target();
                let item = self.tree.push_node(NodeKind::ListItem);
                self.tree.append(list, item);
                self.container_stack.push(item);
            }
            Event::End(TagEnd::Item) => {
                self.flush_paragraph();
                self.container_stack.pop();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_paragraph();
                self.code = Some(String::new());
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(text) = self.code.take() {
                    let target = self.target();
                    let block = self.tree.push_node(NodeKind::LiteralBlock {
                        text: text.trim_end_matches('\n').to_string(),
                    });
                    self.tree.append(target, block);
                }
            }
            Event::Start(Tag::Strong) => self.styles.push(SpanStyle::Strong),
            Event::End(TagEnd::Strong) => {
                self.styles.pop();
            }
            Event::Start(Tag::Emphasis) => self.styles.push(SpanStyle::Emphasis),
            Event::End(TagEnd::Emphasis) => {
                self.styles.pop();
            }
            Event::Text(text) => {
                if let Some((_, heading)) = self.heading.as_mut() {
                    heading.push_str(&text);
                } else if let Some(code) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_inline(&text);
                }
            }
            Event::Code(text) => {
                if let Some((_, heading)) = self.heading.as_mut() {
                    heading.push_str(&text);
                } else {
                    let inlines = self.paragraph.get_or_insert_with(Vec::new);
                    inlines.push(Inline::Literal(text.to_string()));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, heading)) = self.heading.as_mut() {
                    heading.push(' ');
                } else if self.paragraph.is_some() {
                    self.push_inline("\n");
                }
            }
            // Block quotes, raw HTML, rules and similar constructs are not
            // part of the API Blueprint dialect; their text content (if any)
            // flows through the arms above.
            _ => {}
        }
    }

    fn open_section(&mut self, depth: u8, text: &str) {
        while self
            .section_stack
            .last()
            .is_some_and(|(_, open_depth)| *open_depth >= depth)
        {
            self.section_stack.pop();
        }
        let parent = self.section_parent();
        let section = self.tree.push_node(NodeKind::Section {
            id: Some(make_id(text)),
        });
        let title = self.tree.push_node(NodeKind::Title {
            text: text.to_string(),
        });
        self.tree.append(parent, section);
        self.tree.append(section, title);
        self.section_stack.push((section, depth));
    }

    fn finish(mut self) -> DocTree {
        self.flush_paragraph();
        self.tree
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
