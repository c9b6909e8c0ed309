//! A small Mustache dialect for question templates.
//!
//! Supported tags:
//! - `{{name}}` - value with control characters stripped
//! - `{{{name}}}` and `{{& name}}` - raw value
//! - `{{#name}}...{{/name}}` - section: iterates arrays, enters objects,
//!   renders once for other truthy values
//! - `{{^name}}...{{/name}}` - inverted section
//! - `{{! comment }}`
//!
//! Names are dotted paths (`parameters.format`, `choices.0.choice`) resolved
//! lazily against a stack of contexts; `.` is the current context.
//! Section, inverted, closing and comment tags that sit alone on a line
//! remove that line from the output.
//!
//! A template line whose literal text starts with `@<control>` declares a
//! control (see [`ControlKind`]). Only literal template text can declare
//! controls; substituted values never do.

use serde_json::Value;

use crate::fragment::{ControlKind, Segment};

/// Error type for template parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Unterminated tag at byte {0}")]
    UnterminatedTag(usize),

    #[error("Empty tag at byte {0}")]
    EmptyTag(usize),

    #[error("Section {0:?} is never closed")]
    UnclosedSection(String),

    #[error("Closing tag {found:?} does not match open section {expected:?}")]
    MismatchedClose { expected: String, found: String },

    #[error("Closing tag {0:?} without an open section")]
    UnexpectedClose(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Control(ControlKind),
    Var {
        name: String,
        escaped: bool,
    },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

#[derive(Debug)]
enum Tag<'a> {
    Var { name: &'a str, escaped: bool },
    Open { name: &'a str, inverted: bool },
    Close(&'a str),
    Comment,
}

impl Tag<'_> {
    fn may_stand_alone(&self) -> bool {
        !matches!(self, Tag::Var { .. })
    }
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut root = Vec::new();
        let mut open: Vec<Frame> = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let Some(rel) = source[pos..].find("{{") else {
                push_text(current(&mut root, &mut open), source, pos, source.len());
                break;
            };
            let tag_start = pos + rel;
            let (tag, tag_end) = read_tag(source, tag_start)?;

            let mut text_end = tag_start;
            let mut next = tag_end;
            if tag.may_stand_alone()
                && let Some((line_begin, after_line)) = standalone(source, pos, tag_start, tag_end)
            {
                text_end = line_begin;
                next = after_line;
            }
            push_text(current(&mut root, &mut open), source, pos, text_end);

            match tag {
                Tag::Var { name, escaped } => current(&mut root, &mut open).push(Node::Var {
                    name: name.to_string(),
                    escaped,
                }),
                Tag::Open { name, inverted } => open.push(Frame {
                    name: name.to_string(),
                    inverted,
                    children: Vec::new(),
                }),
                Tag::Close(name) => {
                    let frame = open
                        .pop()
                        .ok_or_else(|| TemplateError::UnexpectedClose(name.to_string()))?;
                    if frame.name != name {
                        return Err(TemplateError::MismatchedClose {
                            expected: frame.name,
                            found: name.to_string(),
                        });
                    }
                    current(&mut root, &mut open).push(Node::Section {
                        name: frame.name,
                        inverted: frame.inverted,
                        children: frame.children,
                    });
                }
                Tag::Comment => {}
            }
            pos = next;
        }

        if let Some(frame) = open.pop() {
            return Err(TemplateError::UnclosedSection(frame.name));
        }
        Ok(Self { nodes: root })
    }

    /// Render against a JSON context.
    pub(crate) fn render(&self, context: &Value) -> Vec<Segment> {
        let mut out = Vec::new();
        let mut stack = vec![context];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }

    /// Render to plain text, controls shown as `@<kind>`.
    pub fn render_text(&self, context: &Value) -> String {
        self.render(context)
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) => text,
                Segment::Control(kind) => format!("@{} ", kind.name()),
            })
            .collect()
    }
}

/// A section whose closing tag has not been seen yet.
struct Frame {
    name: String,
    inverted: bool,
    children: Vec<Node>,
}

fn current<'a>(root: &'a mut Vec<Node>, open: &'a mut [Frame]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

fn read_tag(source: &str, start: usize) -> Result<(Tag<'_>, usize), TemplateError> {
    let inner_start = start + 2;
    if source[inner_start..].starts_with('{') {
        let close = source[inner_start + 1..]
            .find("}}}")
            .ok_or(TemplateError::UnterminatedTag(start))?;
        let name = source[inner_start + 1..inner_start + 1 + close].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyTag(start));
        }
        let end = inner_start + 1 + close + 3;
        return Ok((
            Tag::Var {
                name,
                escaped: false,
            },
            end,
        ));
    }

    let close = source[inner_start..]
        .find("}}")
        .ok_or(TemplateError::UnterminatedTag(start))?;
    let inner = source[inner_start..inner_start + close].trim();
    let end = inner_start + close + 2;

    let mut chars = inner.chars();
    let tag = match chars.next() {
        None => return Err(TemplateError::EmptyTag(start)),
        Some('!') => Tag::Comment,
        Some(sigil @ ('#' | '^' | '/' | '&')) => {
            let name = chars.as_str().trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyTag(start));
            }
            match sigil {
                '#' => Tag::Open {
                    name,
                    inverted: false,
                },
                '^' => Tag::Open {
                    name,
                    inverted: true,
                },
                '/' => Tag::Close(name),
                _ => Tag::Var {
                    name,
                    escaped: false,
                },
            }
        }
        Some(_) => Tag::Var {
            name: inner,
            escaped: true,
        },
    };
    Ok((tag, end))
}

/// If the tag at `tag_start..tag_end` is the only thing on its line, return
/// the byte where that line begins and the byte just past its line break.
fn standalone(source: &str, pos: usize, tag_start: usize, tag_end: usize) -> Option<(usize, usize)> {
    let line_begin = source[..tag_start].rfind('\n').map_or(0, |i| i + 1);
    if line_begin < pos {
        // Another tag shares the line.
        return None;
    }
    let is_blank = |s: &str| s.chars().all(|c| c == ' ' || c == '\t' || c == '\r');
    if !is_blank(&source[line_begin..tag_start]) {
        return None;
    }
    let rest = &source[tag_end..];
    let line_end = rest.find('\n');
    let tail = &rest[..line_end.unwrap_or(rest.len())];
    if !is_blank(tail) {
        return None;
    }
    let after = match line_end {
        Some(i) => tag_end + i + 1,
        None => source.len(),
    };
    Some((line_begin, after))
}

/// Push literal text, splitting out control declarations at line starts.
fn push_text(nodes: &mut Vec<Node>, source: &str, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let text = &source[start..end];
    let mut at_line_start = start == 0 || source.as_bytes()[start - 1] == b'\n';
    let mut literal = String::new();

    for line in text.split_inclusive('\n') {
        match at_line_start.then(|| control_prefix(line)).flatten() {
            Some((kind, rest)) => {
                if !literal.is_empty() {
                    nodes.push(Node::Text(std::mem::take(&mut literal)));
                }
                nodes.push(Node::Control(kind));
                literal.push_str(rest);
            }
            None => literal.push_str(line),
        }
        at_line_start = line.ends_with('\n');
    }
    if !literal.is_empty() {
        nodes.push(Node::Text(literal));
    }
}

fn control_prefix(line: &str) -> Option<(ControlKind, &str)> {
    let body = line.strip_prefix('@')?;
    let name_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let kind = ControlKind::from_name(&body[..name_len])?;
    let rest = &body[name_len..];
    match rest.chars().next() {
        None | Some('\n') | Some('\r') => Some((kind, rest)),
        Some(' ') => Some((kind, &rest[1..])),
        Some(_) => None,
    }
}

fn render_nodes<'v>(nodes: &[Node], stack: &mut Vec<&'v Value>, out: &mut Vec<Segment>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Segment::Text(text.clone())),
            Node::Control(kind) => out.push(Segment::Control(*kind)),
            Node::Var { name, escaped } => {
                if let Some(value) = lookup(stack, name) {
                    let text = stringify(value);
                    let text = if *escaped { sanitize(&text) } else { text };
                    if !text.is_empty() {
                        out.push(Segment::Text(text));
                    }
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(stack, name);
                let truthy = value.is_some_and(is_truthy);
                if *inverted {
                    if !truthy {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }
                let Some(value) = value.filter(|v| is_truthy(v)) else {
                    continue;
                };
                match value {
                    Value::Array(items) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    other => {
                        stack.push(other);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
            }
        }
    }
}

fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return stack.last().copied();
    }
    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|ctx| child(*ctx, first))?;
    for segment in segments {
        value = child(value, segment)?;
    }
    Some(value)
}

fn child<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
    }
}

/// Substituted text must not carry line breaks or terminal escape sequences.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, ctx: Value) -> String {
        Template::parse(source).unwrap().render_text(&ctx)
    }

    #[test]
    fn substitutes_variables_and_paths() {
        let ctx = json!({ "question": "When?", "parameters": { "format": "DD/MM/YYYY" } });
        assert_eq!(
            render("{{question}} ({{parameters.format}})", ctx),
            "When? (DD/MM/YYYY)"
        );
    }

    #[test]
    fn missing_values_render_empty() {
        assert_eq!(render("[{{nope}}][{{a.b.c}}]", json!({ "a": 1 })), "[][]");
    }

    #[test]
    fn iterates_arrays_and_resolves_outer_context() {
        let ctx = json!({
            "type": "MC",
            "choices": [{ "choice": "A" }, { "choice": "B" }]
        });
        assert_eq!(
            render("{{#choices}}{{choice}}/{{type}};{{/choices}}", ctx),
            "A/MC;B/MC;"
        );
    }

    #[test]
    fn nested_sections_traverse_objects_and_arrays() {
        let ctx = json!({
            "groups": [
                { "name": "g1", "items": [1, 2] },
                { "name": "g2", "items": [] }
            ]
        });
        assert_eq!(
            render(
                "{{#groups}}{{name}}:{{#items}}{{.}}{{/items}}{{^items}}none{{/items}} {{/groups}}",
                ctx
            ),
            "g1:12 g2:none "
        );
    }

    #[test]
    fn indexed_path() {
        let ctx = json!({ "choices": [{ "choice": "first" }] });
        assert_eq!(render("{{choices.0.choice}}", ctx), "first");
    }

    #[test]
    fn falsy_values_follow_mustache() {
        let ctx = json!({ "zero": 0, "empty": "", "no": false, "list": [] });
        assert_eq!(
            render("{{#zero}}x{{/zero}}{{#empty}}x{{/empty}}{{#no}}x{{/no}}{{#list}}x{{/list}}", ctx),
            ""
        );
    }

    #[test]
    fn escaped_values_lose_control_characters() {
        let ctx = json!({ "v": "a\nb\u{1b}[31mc" });
        assert_eq!(render("{{v}}", ctx.clone()), "a b[31mc");
        assert_eq!(render("{{{v}}}", ctx.clone()), "a\nb\u{1b}[31mc");
        assert_eq!(render("{{& v}}", ctx), "a\nb\u{1b}[31mc");
    }

    #[test]
    fn standalone_tags_remove_their_line() {
        let source = "Top\n{{#choices}}\n- {{choice}}\n{{/choices}}\n{{! note }}\nEnd\n";
        let ctx = json!({ "choices": [{ "choice": "A" }, { "choice": "B" }] });
        assert_eq!(render(source, ctx), "Top\n- A\n- B\nEnd\n");
    }

    #[test]
    fn declares_controls_only_from_literal_text() {
        let source = "{{question}}\n{{#choices}}\n@option {{choice}}\n{{/choices}}\n@submit OK\n";
        let ctx = json!({
            "question": "@button injected",
            "choices": [{ "choice": "A" }]
        });
        let segments = Template::parse(source).unwrap().render(&ctx);
        let controls: Vec<_> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Control(k) => Some(*k),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(controls, vec![ControlKind::Option, ControlKind::Submit]);
    }

    #[test]
    fn at_sign_mid_line_or_unknown_is_text() {
        let segments = Template::parse("mail me @input\n@bogus x\n@inputs\n")
            .unwrap()
            .render(&json!({}));
        assert!(segments.iter().all(|s| matches!(s, Segment::Text(_))));
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            Template::parse("{{#a}}x"),
            Err(TemplateError::UnclosedSection("a".to_string()))
        );
        assert_eq!(
            Template::parse("{{#a}}x{{/b}}"),
            Err(TemplateError::MismatchedClose {
                expected: "a".to_string(),
                found: "b".to_string()
            })
        );
        assert_eq!(
            Template::parse("x{{/a}}"),
            Err(TemplateError::UnexpectedClose("a".to_string()))
        );
        assert_eq!(Template::parse("x {{a"), Err(TemplateError::UnterminatedTag(2)));
        assert_eq!(Template::parse("{{ }}"), Err(TemplateError::EmptyTag(0)));
    }
}
