//! JSX/TSX host.
//!
//! Every JSX tree in the module becomes its own document. Elements reached
//! through child and attribute expressions (`{items.map(i => <li/>)}`) start
//! new documents, so an expression is always opaque to its enclosing tree.
//! Annotations are `{/* ... */}` children.

use serde::{Deserialize, Serialize};
use swc_common::Spanned;
use swc_ecma_ast::{
    Expr, JSXAttr, JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementChild, JSXExpr,
    JSXFragment, Lit,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::{
    AttrValue, Attribute, Declaration, Document, ElementEdit, Node, NodeId, Patch, Result, Span,
    StyleText, merge_class,
};
use crate::hosts::markup::braced_inner;
use crate::hosts::script::{ParsedScript, parse_script};
use crate::hosts::{HostAdapter, TransformOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxFramework {
    #[default]
    React,
    Solid,
}

impl JsxFramework {
    /// Attribute written when an element has no class attribute yet.
    pub fn class_attribute(self) -> &'static str {
        match self {
            JsxFramework::React => "className",
            JsxFramework::Solid => "class",
        }
    }
}

pub const JSX_DIALECT: &str = "jsx";

pub struct JsxHost;

impl HostAdapter for JsxHost {
    fn name(&self) -> &'static str {
        "jsx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jsx", "tsx"]
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        let script = parse_script(source, path)?;
        Ok(jsx_documents(source, &script))
    }

    fn render(
        &self,
        _source: &str,
        doc: &mut Document,
        element: NodeId,
        edit: &ElementEdit,
        options: &TransformOptions,
    ) -> Result<Option<Vec<Patch>>> {
        Ok(Some(render_jsx(doc, element, edit, options.jsx_framework)))
    }
}

/// Every JSX tree in an already parsed module, tagged [`JSX_DIALECT`].
pub fn jsx_documents(source: &str, script: &ParsedScript) -> Vec<Document> {
    let mut builder = TreeBuilder {
        source,
        script,
        docs: Vec::new(),
    };
    script.module.visit_with(&mut builder);
    builder
        .docs
        .into_iter()
        .map(|doc| doc.with_dialect(JSX_DIALECT))
        .collect()
}

struct TreeBuilder<'a> {
    source: &'a str,
    script: &'a ParsedScript,
    docs: Vec<Document>,
}

impl TreeBuilder<'_> {
    fn span(&self, span: swc_common::Span) -> Span {
        self.script.span(span)
    }

    fn raw(&self, span: Span) -> &str {
        span.slice(self.source)
    }

    fn map_element(&mut self, doc: &mut Document, parent: NodeId, element: &JSXElement) {
        let opening = &element.opening;
        let name = self.span(opening.name.span());
        let mut attr_insert = match &opening.type_args {
            Some(args) => self.span(args.span).end,
            None => name.end,
        };

        let mut node = Node::element(self.raw(name), self.span(element.span), attr_insert);
        for attr in &opening.attrs {
            match attr {
                JSXAttrOrSpread::JSXAttr(attr) => {
                    let mapped = self.map_attribute(attr);
                    attr_insert = mapped.span.end;
                    node.push_attribute(mapped);
                }
                JSXAttrOrSpread::SpreadElement(spread) => {
                    let expr_end = self.span(spread.expr.span()).end;
                    attr_insert = self.source[expr_end..]
                        .find('}')
                        .map_or(expr_end, |rel| expr_end + rel + 1);
                    spread.expr.visit_with(self);
                }
            }
        }
        node.attr_insert = Some(attr_insert);

        let id = doc.append(parent, node);
        self.map_children(doc, id, &element.children);
    }

    fn map_attribute(&mut self, attr: &JSXAttr) -> Attribute {
        let name = self.span(attr.name.span());
        let value = match &attr.value {
            None => AttrValue::Missing,
            Some(JSXAttrValue::Str(s)) => {
                let span = self.span(s.span);
                AttrValue::Static {
                    text: unquote(self.raw(span)).to_string(),
                    span,
                }
            }
            Some(JSXAttrValue::JSXExprContainer(container)) => {
                let span = self.span(container.span);
                match &container.expr {
                    JSXExpr::Expr(expr) => {
                        // A string literal carries escapes; its cooked value is the class text.
                        if let Expr::Lit(Lit::Str(s)) = &**expr
                            && let Some(text) = s.value.as_str()
                        {
                            AttrValue::Static {
                                text: text.to_string(),
                                span,
                            }
                        } else {
                            expr.visit_with(self);
                            AttrValue::Dynamic {
                                source: self.raw(span).to_string(),
                                span,
                            }
                        }
                    }
                    JSXExpr::JSXEmptyExpr(_) => AttrValue::Dynamic {
                        source: self.raw(span).to_string(),
                        span,
                    },
                }
            }
            Some(other) => {
                other.visit_with(self);
                let span = self.span(other.span());
                AttrValue::Dynamic {
                    source: self.raw(span).to_string(),
                    span,
                }
            }
        };
        let end = value.span().map_or(name.end, |s| s.end);
        Attribute {
            name: self.raw(name).to_string(),
            value,
            span: Span::new(name.start, end),
        }
    }

    fn map_children(&mut self, doc: &mut Document, parent: NodeId, children: &[JSXElementChild]) {
        for child in children {
            match child {
                JSXElementChild::JSXText(text) => {
                    let span = self.span(text.span);
                    doc.append(parent, Node::text(self.raw(span), span));
                }
                JSXElementChild::JSXExprContainer(container) => {
                    let span = self.span(container.span);
                    match &container.expr {
                        JSXExpr::JSXEmptyExpr(_) => {
                            let bodies = lex_comments(braced_inner(self.raw(span)));
                            let node = if bodies.is_empty() {
                                Node::opaque(self.raw(span), span)
                            } else {
                                Node::comment(bodies, span)
                            };
                            doc.append(parent, node);
                        }
                        JSXExpr::Expr(expr) => {
                            doc.append(parent, Node::opaque(self.raw(span), span));
                            expr.visit_with(self);
                        }
                    }
                }
                JSXElementChild::JSXSpreadChild(spread) => {
                    let span = self.span(spread.span);
                    doc.append(parent, Node::opaque(self.raw(span), span));
                    spread.expr.visit_with(self);
                }
                JSXElementChild::JSXElement(element) => self.map_element(doc, parent, element),
                JSXElementChild::JSXFragment(fragment) => self.map_fragment(doc, parent, fragment),
            }
        }
    }

    fn map_fragment(&mut self, doc: &mut Document, parent: NodeId, fragment: &JSXFragment) {
        let span = self.span(fragment.span);
        let id = doc.append(parent, Node::container(None, span));
        self.map_children(doc, id, &fragment.children);
    }
}

impl Visit for TreeBuilder<'_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let mut doc = Document::new(self.span(node.span));
        let root = doc.root();
        self.map_element(&mut doc, root, node);
        self.docs.push(doc);
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        let mut doc = Document::new(self.span(node.span));
        let root = doc.root();
        self.map_fragment(&mut doc, root, node);
        self.docs.push(doc);
    }
}

fn unquote(raw: &str) -> &str {
    raw.get(1..raw.len().saturating_sub(1)).unwrap_or(raw)
}

/// Bodies of the `/* */` and `//` comments in an empty expression container.
fn lex_comments(text: &str) -> Vec<String> {
    let mut bodies = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("/*") {
            let Some(end) = after.find("*/") else {
                break;
            };
            bodies.push(after[..end].to_string());
            rest = after[end + 2..].trim_start();
        } else if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('\n').unwrap_or(after.len());
            bodies.push(after[..end].to_string());
            rest = after[end..].trim_start();
        } else {
            break;
        }
    }
    bodies
}

/// A JSX attribute value for a plain string.
fn jsx_string(value: &str) -> String {
    if value.contains('"') {
        format!("{{{}}}", js_string(value))
    } else {
        format!("\"{value}\"")
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Object key for a CSS property.
fn style_key(property: &str, framework: JsxFramework) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        return js_string(property);
    }
    let property = property.to_ascii_lowercase();
    match framework {
        JsxFramework::Solid => js_string(&property),
        JsxFramework::React => {
            // `-ms-` is the one vendor prefix React keeps lowercase.
            let name = property.strip_prefix('-').filter(|p| p.starts_with("ms-")).unwrap_or(property.as_str());
            let mut key = String::with_capacity(name.len());
            let mut upper = false;
            for c in name.chars() {
                if c == '-' {
                    upper = true;
                } else if upper {
                    key.push(c.to_ascii_uppercase());
                    upper = false;
                } else {
                    key.push(c);
                }
            }
            key
        }
    }
}

fn style_value(value: &str) -> String {
    let value = value.trim();
    let bytes = value.as_bytes();
    let unquoted = match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) if value.len() >= 2 => {
            &value[1..value.len() - 1]
        }
        _ => value,
    };
    js_string(unquoted)
}

fn style_properties<'a>(
    declarations: impl IntoIterator<Item = &'a Declaration>,
    framework: JsxFramework,
) -> String {
    declarations
        .into_iter()
        .map(|d| format!("{}: {}", style_key(&d.property, framework), style_value(&d.value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_simple_path(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// `{ ...existing, props }` merged into an existing expression.
fn extend_style_object(expr: &str, props: &str) -> String {
    let expr = expr.trim();
    if expr.starts_with('{')
        && let Some(close) = expr.rfind('}')
    {
        let head = expr[..close].trim_end();
        return if head == "{" {
            format!("{{ {props} }}")
        } else if head.ends_with(',') {
            format!("{head} {props} }}")
        } else {
            format!("{head}, {props} }}")
        };
    }
    if is_simple_path(expr) {
        format!("{{ ...{expr}, {props} }}")
    } else {
        format!("{{ ...({expr}), {props} }}")
    }
}

/// Patches writing `edit` onto a JSX element.
pub(crate) fn render_jsx(
    doc: &mut Document,
    element: NodeId,
    edit: &ElementEdit,
    framework: JsxFramework,
) -> Vec<Patch> {
    let mut patches = Vec::new();
    let mut inserted = String::new();

    if !edit.classes.is_empty() {
        let existing = doc
            .get_attribute(element, "className")
            .or_else(|| doc.get_attribute(element, "class"))
            .cloned();
        let name = existing
            .as_ref()
            .map_or(framework.class_attribute(), |a| a.name.as_str())
            .to_string();
        let (value, written) = match existing.as_ref().map(|a| (&a.value, a.span)) {
            None => {
                let value = merge_class(None, &edit.classes).unwrap_or_default();
                inserted.push_str(&format!(" {name}={}", jsx_string(&value)));
                (value, None)
            }
            Some((AttrValue::Missing, span)) => {
                let value = merge_class(None, &edit.classes).unwrap_or_default();
                let text = format!("{name}={}", jsx_string(&value));
                (value, Some(Patch::overwrite(span.start, span.end, text)))
            }
            Some((AttrValue::Static { text, span }, _)) => {
                let value = merge_class(Some(text.as_str()), &edit.classes).unwrap_or_default();
                let patch = Patch::overwrite(span.start, span.end, jsx_string(&value));
                (value, Some(patch))
            }
            Some((AttrValue::Dynamic { source: raw, span }, _)) => {
                let hole = format!("${{{}}}", braced_inner(raw).trim());
                let additions: Vec<String> = edit.classes.iter().map(|c| escape_template(c)).collect();
                let value = merge_class(Some(hole.as_str()), &additions).unwrap_or_default();
                let patch = Patch::overwrite(span.start, span.end, format!("{{`{value}`}}"));
                (value, Some(patch))
            }
        };
        patches.extend(written);
        doc.set_attribute(element, &name, &value);
    }

    let props = style_properties(edit.declarations(), framework);
    if !props.is_empty() {
        let existing = doc.get_attribute(element, "style").cloned();
        let object = match existing.as_ref().map(|a| &a.value) {
            None => {
                let object = format!("{{ {props} }}");
                inserted.push_str(&format!(" style={{{object}}}"));
                object
            }
            Some(AttrValue::Missing) => {
                let object = format!("{{ {props} }}");
                let span = existing.as_ref().map(|a| a.span).unwrap_or_default();
                patches.push(Patch::overwrite(span.start, span.end, format!("style={{{object}}}")));
                object
            }
            Some(AttrValue::Static { text, span }) => {
                let parsed = StyleText::parse(text);
                let props = style_properties(parsed.declarations.iter().chain(edit.declarations()), framework);
                let object = format!("{{ {props} }}");
                patches.push(Patch::overwrite(span.start, span.end, format!("{{{object}}}")));
                object
            }
            Some(AttrValue::Dynamic { source: raw, span }) => {
                let object = extend_style_object(braced_inner(raw), &props);
                patches.push(Patch::overwrite(span.start, span.end, format!("{{{object}}}")));
                object
            }
        };
        doc.set_attribute(element, "style", &object);
    }

    if !inserted.is_empty() {
        let node = doc.node(element);
        let at = node.attr_insert.unwrap_or(node.span.start);
        patches.push(Patch::insert(at, inserted));
    }
    patches
}
