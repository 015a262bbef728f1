//! Span-preserving markup reader and attribute renderer.
//!
//! The reader is shared by every host whose annotations are `<!-- -->`
//! comments. It is lenient in the way templates need: unclosed elements are
//! closed at the end of the region and stray end tags are kept as opaque
//! text. It never rewrites anything; every node records the byte range it
//! came from.
//!
//! Tag and attribute scanning works on bytes and only ever cuts at ASCII
//! delimiters, so every span boundary is a char boundary.

use memchr::{memchr, memmem};

use crate::core::{
    AttrValue, Attribute, Document, ElementEdit, Node, NodeId, NodeKind, Patch, Result, Span,
    TransformError, merge_class, merge_style,
};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &[u8] = b"-->";

/// Host syntax layered on top of plain markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupSyntax {
    /// `{expr}` in text and attribute position, `{name}` shorthands.
    pub brace_expressions: bool,
    /// `{#block}`, `{:branch}` and `{/block}` control flow.
    pub blocks: bool,
    /// `${expr}` holes.
    pub template_holes: bool,
}

impl MarkupSyntax {
    pub const HTML: Self = Self {
        brace_expressions: false,
        blocks: false,
        template_holes: false,
    };
    pub const SVELTE: Self = Self {
        brace_expressions: true,
        blocks: true,
        template_holes: false,
    };
    pub const ASTRO: Self = Self {
        brace_expressions: true,
        blocks: false,
        template_holes: false,
    };
    pub const LIT: Self = Self {
        brace_expressions: false,
        blocks: false,
        template_holes: true,
    };
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose body is never markup. Component names such as `<Title>`
/// are not matched; only all-lowercase or all-uppercase spellings are.
fn is_raw_text_element(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    (name == lower || name == name.to_ascii_uppercase())
        && matches!(lower.as_str(), "script" | "style" | "textarea" | "title")
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'.' | b'_' | b'-')
}

/// Parse `region` of `source` into a document.
pub fn parse_markup(source: &str, region: Span, syntax: MarkupSyntax, file: &str) -> Result<Document> {
    let mut reader = Reader {
        source,
        bytes: source.as_bytes(),
        end: region.end,
        pos: region.start,
        syntax,
        file,
        doc: Document::new(region),
        open: Vec::new(),
        blocks: Vec::new(),
        text_start: None,
    };
    reader.open.push(reader.doc.root());
    reader.run()?;
    Ok(reader.doc)
}

struct Reader<'a> {
    source: &'a str,
    bytes: &'a [u8],
    end: usize,
    pos: usize,
    syntax: MarkupSyntax,
    file: &'a str,
    doc: Document,
    /// Open elements and containers, root first.
    open: Vec<NodeId>,
    /// Open blocks with their index in `open`.
    blocks: Vec<(NodeId, usize)>,
    text_start: Option<usize>,
}

impl Reader<'_> {
    fn error(&self, at: usize, message: &str) -> TransformError {
        TransformError::parse_at(self.file, self.source, at, message)
    }

    fn byte(&self, at: usize) -> Option<u8> {
        (at < self.end).then(|| self.bytes[at])
    }

    fn starts_with(&self, at: usize, pattern: &str) -> bool {
        at <= self.end && self.bytes[at..self.end].starts_with(pattern.as_bytes())
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn append(&mut self, node: Node) -> NodeId {
        let parent = self.current();
        self.doc.append(parent, node)
    }

    fn append_opaque(&mut self, start: usize, end: usize) {
        let raw = &self.source[start..end];
        self.append(Node::opaque(raw, Span::new(start, end)));
    }

    fn flush_text(&mut self, upto: usize) {
        if let Some(start) = self.text_start.take()
            && start < upto
        {
            let raw = &self.source[start..upto];
            self.append(Node::text(raw, Span::new(start, upto)));
        }
    }

    fn skip_whitespace(&self, mut at: usize) -> usize {
        while at < self.end && self.bytes[at].is_ascii_whitespace() {
            at += 1;
        }
        at
    }

    fn run(&mut self) -> Result<()> {
        while self.pos < self.end {
            let consumed = match self.bytes[self.pos] {
                b'<' => self.read_angle()?,
                b'{' if self.syntax.brace_expressions => {
                    self.read_brace()?;
                    true
                }
                b'$' if self.syntax.template_holes && self.byte(self.pos + 1) == Some(b'{') => {
                    self.read_hole()?;
                    true
                }
                _ => false,
            };
            if !consumed {
                self.text_start.get_or_insert(self.pos);
                self.pos += 1;
            }
        }
        self.flush_text(self.end);
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if let Some((block, _)) = self.blocks.last() {
            return Err(self.error(self.doc.span(*block).start, "unclosed block"));
        }
        while self.open.len() > 1 {
            if let Some(id) = self.open.pop() {
                self.doc.set_end(id, self.end);
            }
        }
        Ok(())
    }

    /// Returns `false` when the `<` is plain text (`a < b`).
    fn read_angle(&mut self) -> Result<bool> {
        let start = self.pos;
        if self.starts_with(start, COMMENT_START) {
            self.flush_text(start);
            self.read_comment(start)?;
            return Ok(true);
        }
        match self.byte(start + 1) {
            Some(b'!' | b'?') => {
                self.flush_text(start);
                let Some(rel) = memchr(b'>', &self.bytes[start..self.end]) else {
                    return Err(self.error(start, "unterminated tag"));
                };
                self.append_opaque(start, start + rel + 1);
                self.pos = start + rel + 1;
            }
            Some(b'/') if self.byte(start + 2).is_some_and(|b| b.is_ascii_alphabetic()) => {
                self.flush_text(start);
                self.read_end_tag(start)?;
            }
            Some(b) if b.is_ascii_alphabetic() => {
                self.flush_text(start);
                self.read_start_tag(start)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn read_comment(&mut self, start: usize) -> Result<()> {
        let body_start = start + COMMENT_START.len();
        let Some(rel) = memmem::find(&self.bytes[body_start..self.end], COMMENT_END) else {
            return Err(self.error(start, "unterminated comment"));
        };
        let body_end = body_start + rel;
        let end = body_end + COMMENT_END.len();
        let body = self.source[body_start..body_end].to_string();
        self.append(Node::comment(vec![body], Span::new(start, end)));
        self.pos = end;
        Ok(())
    }

    fn scan_tag_name(&self, mut at: usize) -> usize {
        while at < self.end && is_tag_name_byte(self.bytes[at]) {
            at += 1;
        }
        at
    }

    fn read_end_tag(&mut self, start: usize) -> Result<()> {
        let name_start = start + 2;
        let name_end = self.scan_tag_name(name_start);
        let Some(rel) = memchr(b'>', &self.bytes[name_end..self.end]) else {
            return Err(self.error(start, "unterminated tag"));
        };
        let end = name_end + rel + 1;
        self.pos = end;

        let name = &self.source[name_start..name_end];
        let matched = self.open.iter().rposition(|id| {
            let node = self.doc.node(*id);
            node.kind == NodeKind::Container
                || node.tag.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(name))
        });

        match matched {
            Some(index) if self.doc.kind(self.open[index]) == NodeKind::Element => {
                while self.open.len() > index + 1 {
                    if let Some(id) = self.open.pop() {
                        self.doc.set_end(id, start);
                    }
                }
                if let Some(id) = self.open.pop() {
                    self.doc.set_end(id, end);
                }
            }
            _ => self.append_opaque(start, end),
        }
        Ok(())
    }

    fn read_start_tag(&mut self, start: usize) -> Result<()> {
        let name_end = self.scan_tag_name(start + 1);
        let tag = self.source[start + 1..name_end].to_string();
        let mut node = Node::element(tag.clone(), Span::new(start, name_end), name_end);

        let mut cursor = name_end;
        let self_closing = loop {
            cursor = self.skip_whitespace(cursor);
            if cursor >= self.end {
                return Err(self.error(start, "unterminated tag"));
            }
            if self.starts_with(cursor, "/>") {
                cursor += 2;
                break true;
            }
            match self.bytes[cursor] {
                b'>' => {
                    cursor += 1;
                    break false;
                }
                b'{' if self.syntax.brace_expressions => {
                    let close = self.scan_balanced(cursor)?;
                    let raw = &self.source[cursor..close];
                    let inner = raw[1..raw.len() - 1].trim();
                    if !inner.is_empty() && !inner.starts_with("...") {
                        let span = Span::new(cursor, close);
                        node.push_attribute(Attribute {
                            name: inner.to_string(),
                            value: AttrValue::Dynamic {
                                source: raw.to_string(),
                                span,
                            },
                            span,
                        });
                    }
                    cursor = close;
                }
                b'$' if self.syntax.template_holes && self.byte(cursor + 1) == Some(b'{') => {
                    cursor = self.scan_balanced(cursor + 1)?;
                }
                _ => cursor = self.read_attribute(start, cursor, &mut node)?,
            }
            node.attr_insert = Some(cursor);
        };

        node.span = Span::new(start, cursor);
        self.pos = cursor;

        if self_closing || is_void_element(&tag) {
            self.append(node);
            return Ok(());
        }

        if is_raw_text_element(&tag) {
            let id = self.append(node);
            let (body_end, end) = self
                .find_close_tag(cursor, &tag)
                .unwrap_or((self.end, self.end));
            if body_end > cursor {
                let raw = &self.source[cursor..body_end];
                self.doc.append(id, Node::opaque(raw, Span::new(cursor, body_end)));
            }
            self.doc.set_end(id, end);
            self.pos = end;
            return Ok(());
        }

        let id = self.append(node);
        self.open.push(id);
        Ok(())
    }

    /// Read one `name`, `name=value` attribute and return the offset after it.
    fn read_attribute(&self, tag_start: usize, at: usize, node: &mut Node) -> Result<usize> {
        let mut name_end = at;
        while name_end < self.end {
            let b = self.bytes[name_end];
            if b.is_ascii_whitespace()
                || matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'' | b'`')
                || (b == b'{' && self.syntax.brace_expressions)
            {
                break;
            }
            name_end += 1;
        }
        if name_end == at {
            // Stray delimiter such as a lone `/` or `=`.
            return Ok(at + 1);
        }

        let name = self.source[at..name_end].to_string();
        let eq = self.skip_whitespace(name_end);
        if self.byte(eq) != Some(b'=') {
            node.push_attribute(Attribute {
                name,
                value: AttrValue::Missing,
                span: Span::new(at, name_end),
            });
            return Ok(name_end);
        }

        let value_start = self.skip_whitespace(eq + 1);
        let Some(first) = self.byte(value_start) else {
            return Err(self.error(tag_start, "unterminated tag"));
        };
        let value_end = match first {
            b'"' | b'\'' => self.scan_quoted(tag_start, value_start, first)? + 1,
            b'{' if self.syntax.brace_expressions => self.scan_balanced(value_start)?,
            b'$' if self.syntax.template_holes && self.byte(value_start + 1) == Some(b'{') => {
                self.scan_balanced(value_start + 1)?
            }
            _ => {
                let mut i = value_start;
                while i < self.end && !self.bytes[i].is_ascii_whitespace() && self.bytes[i] != b'>' {
                    // Component syntaxes end an unquoted value at `/>`.
                    if self.syntax.brace_expressions && self.starts_with(i, "/>") {
                        break;
                    }
                    i += 1;
                }
                i
            }
        };

        let span = Span::new(value_start, value_end);
        let raw = &self.source[value_start..value_end];
        let value = match first {
            b'"' | b'\'' => AttrValue::Static {
                text: raw[1..raw.len() - 1].to_string(),
                span,
            },
            b'{' | b'$' if raw.ends_with('}') && raw.len() > 1 => AttrValue::Dynamic {
                source: raw.to_string(),
                span,
            },
            _ => AttrValue::Static {
                text: raw.to_string(),
                span,
            },
        };
        node.push_attribute(Attribute {
            name,
            value,
            span: Span::new(at, value_end),
        });
        Ok(value_end)
    }

    /// Index of the closing quote. Host holes inside the value may contain
    /// the quote character.
    fn scan_quoted(&self, tag_start: usize, open: usize, quote: u8) -> Result<usize> {
        let mut i = open + 1;
        while i < self.end {
            match self.bytes[i] {
                b if b == quote => return Ok(i),
                b'{' if self.syntax.brace_expressions => i = self.scan_balanced(i)?,
                b'$' if self.syntax.template_holes && self.byte(i + 1) == Some(b'{') => {
                    i = self.scan_balanced(i + 1)?
                }
                _ => i += 1,
            }
        }
        Err(self.error(tag_start, "unterminated tag"))
    }

    /// Offset just past the `}` matching the `{` at `open`.
    fn scan_balanced(&self, open: usize) -> Result<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.end {
            match self.bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i + 1);
                    }
                }
                q @ (b'"' | b'\'') => {
                    i = self.skip_string(i, q);
                    continue;
                }
                b'`' => {
                    i = self.skip_template(i)?;
                    continue;
                }
                b'/' if self.byte(i + 1) == Some(b'*') => {
                    let Some(rel) = memmem::find(&self.bytes[i + 2..self.end], b"*/") else {
                        break;
                    };
                    i += rel + 4;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        Err(self.error(open, "unbalanced expression"))
    }

    /// Skip a string literal. A quote with no partner on its line is taken
    /// as text (`{ok && <p>Don't</p>}`).
    fn skip_string(&self, open: usize, quote: u8) -> usize {
        let mut i = open + 1;
        while i < self.end {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => break,
                b if b == quote => return i + 1,
                _ => i += 1,
            }
        }
        open + 1
    }

    fn skip_template(&self, open: usize) -> Result<usize> {
        let mut i = open + 1;
        while i < self.end {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'`' => return Ok(i + 1),
                b'$' if self.byte(i + 1) == Some(b'{') => i = self.scan_balanced(i + 1)?,
                _ => i += 1,
            }
        }
        Err(self.error(open, "unbalanced expression"))
    }

    /// `(start, end)` of the `</name>` closing a raw-text element.
    fn find_close_tag(&self, from: usize, name: &str) -> Option<(usize, usize)> {
        let mut i = from;
        while i < self.end {
            i += memchr(b'<', &self.bytes[i..self.end])?;
            let name_start = i + 2;
            let name_end = name_start + name.len();
            if self.byte(i + 1) == Some(b'/')
                && name_end <= self.end
                && self.bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            {
                let k = self.skip_whitespace(name_end);
                if self.byte(k) == Some(b'>') {
                    return Some((i, k + 1));
                }
            }
            i += 1;
        }
        None
    }

    fn read_hole(&mut self) -> Result<()> {
        let start = self.pos;
        self.flush_text(start);
        let end = self.scan_balanced(start + 1)?;
        self.append_opaque(start, end);
        self.pos = end;
        Ok(())
    }

    fn read_brace(&mut self) -> Result<()> {
        let start = self.pos;
        self.flush_text(start);
        let end = self.scan_balanced(start)?;
        self.pos = end;

        if self.syntax.blocks {
            match self.bytes.get(start + 1) {
                Some(b'#') => {
                    self.open_block(start, end);
                    return Ok(());
                }
                Some(b':') if !self.blocks.is_empty() => {
                    self.next_branch(start, end);
                    return Ok(());
                }
                Some(b'/') if !self.blocks.is_empty() => {
                    self.close_block(start, end);
                    return Ok(());
                }
                _ => {}
            }
        }
        self.append_opaque(start, end);
        Ok(())
    }

    fn open_block(&mut self, start: usize, end: usize) {
        let keyword: String = self.source[start + 1..end - 1]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();
        let block = self.append(Node::container(Some(keyword), Span::new(start, end)));
        self.blocks.push((block, self.open.len()));
        self.open.push(block);
        let branch = self.doc.append(block, Node::container(None, Span::new(end, end)));
        self.open.push(branch);
    }

    /// Close everything above the block, leaving it on top of `open`.
    fn unwind_to_block(&mut self, depth: usize, at: usize) {
        while self.open.len() > depth + 1 {
            if let Some(id) = self.open.pop() {
                self.doc.set_end(id, at);
            }
        }
    }

    fn next_branch(&mut self, start: usize, end: usize) {
        let Some(&(block, depth)) = self.blocks.last() else {
            return;
        };
        self.unwind_to_block(depth, start);
        let raw = &self.source[start..end];
        self.doc.append(block, Node::opaque(raw, Span::new(start, end)));
        let branch = self.doc.append(block, Node::container(None, Span::new(end, end)));
        self.open.push(branch);
    }

    fn close_block(&mut self, start: usize, end: usize) {
        let Some((block, depth)) = self.blocks.pop() else {
            return;
        };
        self.unwind_to_block(depth, start);
        self.open.truncate(depth);
        self.doc.set_end(block, end);
    }
}

/// How a merged value is written over an attribute holding a host expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicValues {
    /// Interpolate inside a quoted value: `"{expr} tok"`, `"${expr} tok"`.
    Interpolate,
    /// Wrap in a template literal: ``{`${expr} tok`}``.
    TemplateLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Class,
    Style,
}

impl Target {
    fn name(self) -> &'static str {
        match self {
            Target::Class => "class",
            Target::Style => "style",
        }
    }

    fn additions(self, edit: &ElementEdit) -> Vec<String> {
        match self {
            Target::Class => edit.classes.clone(),
            Target::Style => edit.style_texts().into_iter().map(str::to_string).collect(),
        }
    }
}

fn escape_quote(text: &str, quote: char) -> String {
    match quote {
        '"' => text.replace('"', "&quot;"),
        '\'' => text.replace('\'', "&#39;"),
        _ => text.to_string(),
    }
}

fn escape_template(text: &str) -> String {
    text.replace('`', "\\`").replace("${", "\\${")
}

/// Prefer double quotes unless only single quotes avoid escaping.
fn pick_quote(additions: &[String]) -> char {
    let has_double = additions.iter().any(|a| a.contains('"'));
    let has_single = additions.iter().any(|a| a.contains('\''));
    if has_double && !has_single { '\'' } else { '"' }
}

fn merge(target: Target, existing: Option<&str>, additions: &[String]) -> Option<String> {
    match target {
        Target::Class => merge_class(existing, additions),
        Target::Style => {
            let additions: Vec<&str> = additions.iter().map(String::as_str).collect();
            merge_style(existing, &additions)
        }
    }
}

/// The `{...}` body of a braced expression, or the text itself.
pub fn braced_inner(raw: &str) -> &str {
    raw.strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .unwrap_or(raw)
}

/// Where and how a merged value replaces an existing attribute.
struct Slot {
    start: usize,
    end: usize,
    existing: Option<String>,
    open: String,
    close: String,
    escaped: Vec<String>,
}

enum Rendered {
    Unchanged,
    Insert { value: String, text: String },
    Overwrite { value: String, patch: Patch },
}

fn escape_all(additions: &[String], quote: char) -> Vec<String> {
    additions.iter().map(|a| escape_quote(a, quote)).collect()
}

fn render_value(
    source: &str,
    attr: Option<&Attribute>,
    target: Target,
    additions: &[String],
    dynamic: DynamicValues,
) -> Option<Rendered> {
    let name = target.name();
    let Some(attr) = attr else {
        let quote = pick_quote(additions);
        return Some(match merge(target, None, &escape_all(additions, quote)) {
            Some(value) => Rendered::Insert {
                text: format!(" {name}={quote}{value}{quote}"),
                value,
            },
            None => Rendered::Unchanged,
        });
    };

    let slot = match &attr.value {
        AttrValue::Missing => {
            let quote = pick_quote(additions);
            Slot {
                start: attr.span.start,
                end: attr.span.end,
                existing: None,
                open: format!("{name}={quote}"),
                close: quote.to_string(),
                escaped: escape_all(additions, quote),
            }
        }
        AttrValue::Static { text, span } => {
            let quote = match source.as_bytes().get(span.start) {
                Some(b'"') => '"',
                Some(b'\'') => '\'',
                _ => pick_quote(additions),
            };
            Slot {
                start: span.start,
                end: span.end,
                existing: Some(text.clone()),
                open: quote.to_string(),
                close: quote.to_string(),
                escaped: escape_all(additions, quote),
            }
        }
        AttrValue::Dynamic { source: raw, span } => {
            let (start, prefix) = if attr.is_shorthand() {
                (attr.span.start, format!("{name}="))
            } else {
                (span.start, String::new())
            };
            match dynamic {
                DynamicValues::Interpolate => Slot {
                    start,
                    end: span.end,
                    existing: Some(raw.clone()),
                    open: format!("{prefix}\""),
                    close: "\"".to_string(),
                    escaped: escape_all(additions, '"'),
                },
                DynamicValues::TemplateLiteral => {
                    let inner = braced_inner(raw).trim();
                    if target == Target::Style && inner.starts_with('{') {
                        return None;
                    }
                    Slot {
                        start,
                        end: span.end,
                        existing: Some(format!("${{{inner}}}")),
                        open: format!("{prefix}{{`"),
                        close: "`}".to_string(),
                        escaped: additions.iter().map(|a| escape_template(a)).collect(),
                    }
                }
            }
        }
    };

    Some(match merge(target, slot.existing.as_deref(), &slot.escaped) {
        Some(value) => Rendered::Overwrite {
            patch: Patch::overwrite(slot.start, slot.end, format!("{}{value}{}", slot.open, slot.close)),
            value,
        },
        None => Rendered::Unchanged,
    })
}

/// Render the merged `class`/`style` edit for a markup element.
///
/// Existing values are overwritten in place, new attributes are inserted
/// together after the last attribute. Returns `None` when an existing
/// expression cannot take the merge (an object-valued `style={{...}}`).
pub fn render_attributes(
    source: &str,
    doc: &mut Document,
    element: NodeId,
    edit: &ElementEdit,
    dynamic: DynamicValues,
) -> Result<Option<Vec<Patch>>> {
    let mut patches = Vec::new();
    let mut inserted = String::new();

    for target in [Target::Class, Target::Style] {
        let additions = target.additions(edit);
        if additions.is_empty() {
            continue;
        }
        let attr = doc.get_attribute(element, target.name());
        let Some(rendered) = render_value(source, attr, target, &additions, dynamic) else {
            return Ok(None);
        };
        match rendered {
            Rendered::Unchanged => {}
            Rendered::Insert { value, text } => {
                inserted.push_str(&text);
                doc.set_attribute(element, target.name(), &value);
            }
            Rendered::Overwrite { value, patch } => {
                patches.push(patch);
                doc.set_attribute(element, target.name(), &value);
            }
        }
    }

    if !inserted.is_empty() {
        let node = doc.node(element);
        let at = node.attr_insert.unwrap_or(node.span.start);
        patches.push(Patch::insert(at, inserted));
    }
    Ok(Some(patches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PatchSet, classify};
    use pretty_assertions::assert_eq;

    fn parse(src: &str, syntax: MarkupSyntax) -> Document {
        parse_markup(src, Span::new(0, src.len()), syntax, "test").unwrap()
    }

    /// Compact outline of the tree for assertions.
    fn outline(doc: &Document, id: NodeId) -> String {
        let node = doc.node(id);
        let children: Vec<String> = node.children.iter().map(|c| outline(doc, *c)).collect();
        let inner = if children.is_empty() {
            String::new()
        } else {
            format!("[{}]", children.join(" "))
        };
        match node.kind {
            NodeKind::Element => format!("{}{}", node.tag.as_deref().unwrap_or(""), inner),
            NodeKind::Text if node.is_whitespace_text() => "_".to_string(),
            NodeKind::Text => "text".to_string(),
            NodeKind::Comment => format!("!{}", node.bodies.join("|").trim()),
            NodeKind::Container => format!("{}{}", node.tag.as_deref().unwrap_or("@"), inner),
            NodeKind::Opaque => "~".to_string(),
        }
    }

    fn render(src: &str, syntax: MarkupSyntax, dynamic: DynamicValues, element_tag: &str, bodies: &[&str]) -> String {
        let mut doc = parse(src, syntax);
        let id = doc
            .pre_order()
            .into_iter()
            .find(|id| doc.tag(*id) == Some(element_tag) && doc.node(*id).is_element())
            .unwrap();
        let mut edit = ElementEdit::default();
        for body in bodies {
            edit.add(classify(body));
        }
        let patches = render_attributes(src, &mut doc, id, &edit, dynamic).unwrap().unwrap();
        let mut set = PatchSet::new();
        set.extend(patches);
        set.apply(src, "test").unwrap()
    }

    #[test]
    fn test_tree_shape() {
        let doc = parse(
            "<!DOCTYPE html><div id=a><p>hi</p>\n<!-- x --><br><img src=\"a\"/></div>",
            MarkupSyntax::HTML,
        );
        assert_eq!(outline(&doc, doc.root()), "@[~ div[p[text] _ !x br img]]");
    }

    #[test]
    fn test_spans_cover_source() {
        let src = "<ul>\n  <li class=\"a\">one</li>\n</ul>";
        let doc = parse(src, MarkupSyntax::HTML);
        let ul = doc.children(doc.root())[0];
        assert_eq!(doc.span(ul).slice(src), src);
        let li = doc.children(ul)[1];
        assert_eq!(doc.span(li).slice(src), "<li class=\"a\">one</li>");
        let class = doc.get_attribute(li, "class").unwrap();
        assert_eq!(class.span.slice(src), "class=\"a\"");
        assert_eq!(class.value.span().unwrap().slice(src), "\"a\"");
        assert_eq!(class.value.static_text(), Some("a"));
        assert_eq!(doc.node(li).attr_insert, Some(20));
    }

    #[test]
    fn test_attribute_forms() {
        let src = "<input disabled value=plain data-x='q' data-y = \"spaced\">";
        let doc = parse(src, MarkupSyntax::HTML);
        let input = doc.children(doc.root())[0];
        let node = doc.node(input);
        let names: Vec<&str> = node.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["disabled", "value", "data-x", "data-y"]);
        assert_eq!(node.attribute("disabled").unwrap().value, AttrValue::Missing);
        assert_eq!(node.attribute("value").unwrap().value.static_text(), Some("plain"));
        assert_eq!(node.attribute("data-y").unwrap().value.static_text(), Some("spaced"));
        assert_eq!(node.attr_insert, Some(src.len() - 1));
    }

    #[test]
    fn test_unquoted_value_before_self_close() {
        let doc = parse("<div><Icon name=x/>text</div>", MarkupSyntax::SVELTE);
        assert_eq!(outline(&doc, doc.root()), "@[div[Icon text]]");
        let div = doc.children(doc.root())[0];
        let icon = doc.children(div)[0];
        assert_eq!(doc.node(icon).attribute("name").unwrap().value.static_text(), Some("x"));

        // Plain HTML keeps the slash in the value.
        let doc = parse("<a href=x/>text</a>", MarkupSyntax::HTML);
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.node(a).attribute("href").unwrap().value.static_text(), Some("x/"));
    }

    #[test]
    fn test_raw_text_bodies_are_opaque() {
        let doc = parse(
            "<script>if (a < b) { x('<!-- no -->') }</script><style>p{}</style><textarea><!-- t --></textarea>",
            MarkupSyntax::HTML,
        );
        assert_eq!(outline(&doc, doc.root()), "@[script[~] style[~] textarea[~]]");
    }

    #[test]
    fn test_lenient_closing() {
        let src = "<div><p>one<p>two</span></div><section>";
        let doc = parse(src, MarkupSyntax::HTML);
        assert_eq!(outline(&doc, doc.root()), "@[div[p[text p[text ~]]] section]");
        let section = doc.children(doc.root())[1];
        assert_eq!(doc.span(section).end, src.len());
    }

    #[test]
    fn test_lone_angle_is_text() {
        let doc = parse("<p>a < b</p>", MarkupSyntax::HTML);
        assert_eq!(outline(&doc, doc.root()), "@[p[text]]");
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_markup("<p>\n<!-- open", Span::new(0, 13), MarkupSyntax::HTML, "a.html").unwrap_err();
        assert_eq!(err.to_string(), "a.html:2:1: parse error: unterminated comment");

        let err = parse_markup("<div class=\"x", Span::new(0, 13), MarkupSyntax::HTML, "a.html").unwrap_err();
        assert!(err.to_string().contains("unterminated tag"));
    }

    #[test]
    fn test_svelte_blocks() {
        let doc = parse(
            "<ul>{#each items as item}<li>{item}</li><!-- a -->{:else}<p></p>{/each}</ul>",
            MarkupSyntax::SVELTE,
        );
        assert_eq!(outline(&doc, doc.root()), "@[ul[#each[@[li[~] !a] ~ @[p]]]]");
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        let src = "<div>{#if a}<p></p></div>";
        let err = parse_markup(src, Span::new(0, src.len()), MarkupSyntax::SVELTE, "a.svelte").unwrap_err();
        assert!(err.to_string().contains("unclosed block"));
    }

    #[test]
    fn test_brace_attributes() {
        let src = "<Button {disabled} {...rest} class={cls} on:click={() => go('}')}>x</Button>";
        let doc = parse(src, MarkupSyntax::SVELTE);
        let button = doc.children(doc.root())[0];
        let node = doc.node(button);
        assert!(node.attribute("disabled").unwrap().is_shorthand());
        assert_eq!(
            node.attribute("class").unwrap().value,
            AttrValue::Dynamic {
                source: "{cls}".into(),
                span: Span::new(35, 40)
            }
        );
        assert_eq!(node.attr_insert, Some(65));
    }

    #[test]
    fn test_unbalanced_expression() {
        let src = "<p>{a</p>";
        let err = parse_markup(src, Span::new(0, src.len()), MarkupSyntax::ASTRO, "a.astro").unwrap_err();
        assert!(err.to_string().contains("unbalanced expression"));
    }

    #[test]
    fn test_template_holes() {
        let src = "<p class=${c} ?hidden=${!on}>${label}</p><!-- a -->";
        let doc = parse(src, MarkupSyntax::LIT);
        assert_eq!(outline(&doc, doc.root()), "@[p[~] !a]");
        let p = doc.children(doc.root())[0];
        assert!(matches!(
            doc.get_attribute(p, "class").unwrap().value,
            AttrValue::Dynamic { .. }
        ));
    }

    #[test]
    fn test_region_offsets_are_absolute() {
        let src = "---\nconst a = 1;\n---\n<p></p>";
        let region = Span::new(20, src.len());
        let doc = parse_markup(src, region, MarkupSyntax::ASTRO, "a.astro").unwrap();
        let p = doc.children(doc.root())[1];
        assert_eq!(doc.span(p).slice(src), "<p></p>");
    }

    #[test]
    fn test_render_insert_new_attributes() {
        assert_eq!(
            render("<p></p>", MarkupSyntax::HTML, DynamicValues::Interpolate, "p", &["a b", "color: red"]),
            r#"<p class="a b" style="color: red"></p>"#
        );
        assert_eq!(
            render("<img src=x />", MarkupSyntax::HTML, DynamicValues::Interpolate, "img", &["round"]),
            r#"<img src=x class="round" />"#
        );
    }

    #[test]
    fn test_render_keeps_quote_style() {
        assert_eq!(
            render("<p class='a'></p>", MarkupSyntax::HTML, DynamicValues::Interpolate, "p", &["b"]),
            "<p class='a b'></p>"
        );
        assert_eq!(
            render("<p class=a></p>", MarkupSyntax::HTML, DynamicValues::Interpolate, "p", &["b"]),
            r#"<p class="a b"></p>"#
        );
        assert_eq!(
            render("<p class></p>", MarkupSyntax::HTML, DynamicValues::Interpolate, "p", &["b"]),
            r#"<p class="b"></p>"#
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        assert_eq!(
            render("<p></p>", MarkupSyntax::HTML, DynamicValues::Interpolate, "p", &[r#"font-family: "Inter""#]),
            r#"<p style='font-family: "Inter"'></p>"#
        );
        assert_eq!(
            render(
                r#"<p style="color: red"></p>"#,
                MarkupSyntax::HTML,
                DynamicValues::Interpolate,
                "p",
                &[r#"font-family: "Inter""#]
            ),
            r#"<p style="color: red; font-family: &quot;Inter&quot;"></p>"#
        );
    }

    #[test]
    fn test_render_dynamic_values() {
        assert_eq!(
            render("<p class={cls}></p>", MarkupSyntax::SVELTE, DynamicValues::Interpolate, "p", &["b"]),
            r#"<p class="{cls} b"></p>"#
        );
        assert_eq!(
            render("<p {class}></p>", MarkupSyntax::SVELTE, DynamicValues::Interpolate, "p", &["b"]),
            r#"<p class="{class} b"></p>"#
        );
        assert_eq!(
            render("<p class=${c}></p>", MarkupSyntax::LIT, DynamicValues::Interpolate, "p", &["b"]),
            r#"<p class="${c} b"></p>"#
        );
        assert_eq!(
            render("<p class={cls}></p>", MarkupSyntax::ASTRO, DynamicValues::TemplateLiteral, "p", &["b"]),
            "<p class={`${cls} b`}></p>"
        );
    }

    #[test]
    fn test_render_quoted_value_with_holes() {
        assert_eq!(
            render(
                r#"<p class="{on ? 'x y' : ''} a"></p>"#,
                MarkupSyntax::SVELTE,
                DynamicValues::Interpolate,
                "p",
                &["a", "b"]
            ),
            r#"<p class="{on ? 'x y' : ''} a b"></p>"#
        );
    }

    #[test]
    fn test_object_style_expression_is_not_rendered() {
        let src = "<p style={{ color: 'red' }}></p>";
        let mut doc = parse(src, MarkupSyntax::ASTRO);
        let p = doc.children(doc.root())[0];
        let mut edit = ElementEdit::default();
        edit.add(classify("margin: 0"));
        assert_eq!(
            render_attributes(src, &mut doc, p, &edit, DynamicValues::TemplateLiteral).unwrap(),
            None
        );
    }
}
