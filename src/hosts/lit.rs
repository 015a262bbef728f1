use std::{path::Path, sync::LazyLock};

use regex::Regex;
use swc_ecma_ast::{Expr, TaggedTpl};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::{Document, ElementEdit, NodeId, Patch, Result, Span};
use crate::hosts::jsx::{JSX_DIALECT, jsx_documents, render_jsx};
use crate::hosts::markup::{DynamicValues, MarkupSyntax, parse_markup, render_attributes};
use crate::hosts::script::{ParsedScript, parse_script};
use crate::hosts::{HostAdapter, TransformOptions};

static HTML_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhtml\s*`").unwrap());
static JSX_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\s*/[*/]").unwrap());

/// Script modules: the markup lives in `` html`...` `` tagged templates
/// (Lit). Plain JavaScript may also hold JSX trees, read in the same pass.
pub struct LitHost;

impl HostAdapter for LitHost {
    fn name(&self) -> &'static str {
        "lit"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "ts", "mjs"]
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        let templates = HTML_TAG_REGEX.is_match(source);
        let jsx = allows_jsx(path) && JSX_COMMENT_REGEX.is_match(source);
        // Plain modules are common here; skip the parse when there is nothing to find.
        if !templates && !jsx {
            return Ok(Vec::new());
        }
        let script = parse_script(source, path)?;

        let mut docs = Vec::new();
        if templates {
            let mut collector = TemplateCollector {
                source,
                script: &script,
                regions: Vec::new(),
            };
            script.module.visit_with(&mut collector);
            for region in collector.regions {
                docs.push(parse_markup(source, region, MarkupSyntax::LIT, path)?);
            }
        }
        if jsx {
            docs.extend(jsx_documents(source, &script));
        }
        Ok(docs)
    }

    fn render(
        &self,
        source: &str,
        doc: &mut Document,
        element: NodeId,
        edit: &ElementEdit,
        options: &TransformOptions,
    ) -> Result<Option<Vec<Patch>>> {
        if doc.dialect() == Some(JSX_DIALECT) {
            return Ok(Some(render_jsx(doc, element, edit, options.jsx_framework)));
        }
        render_attributes(source, doc, element, edit, DynamicValues::Interpolate)
    }
}

/// TypeScript without the `tsx` flag has no JSX.
fn allows_jsx(path: &str) -> bool {
    !Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ts" | "mts" | "cts"))
}

/// Collects the body of every `html` tagged template, nested ones included.
struct TemplateCollector<'a> {
    source: &'a str,
    script: &'a ParsedScript,
    regions: Vec<Span>,
}

impl TemplateCollector<'_> {
    /// Bytes between the backticks of `node`'s template.
    fn body(&self, node: &TaggedTpl) -> Option<Span> {
        let tpl = self.script.span(node.tpl.span);
        let open = tpl.start + self.source[tpl.start..tpl.end].find('`')?;
        let close = open + 1 + self.source[open + 1..tpl.end].rfind('`')?;
        Some(Span::new(open + 1, close))
    }
}

impl Visit for TemplateCollector<'_> {
    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        if let Expr::Ident(ident) = &*node.tag
            && ident.sym == "html"
            && let Some(region) = self.body(node)
        {
            self.regions.push(region);
        }
        node.visit_children_with(self);
    }
}
