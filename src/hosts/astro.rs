use memchr::memmem;

use crate::core::{Document, ElementEdit, NodeId, Patch, Result, Span, TransformError};
use crate::hosts::markup::{DynamicValues, MarkupSyntax, parse_markup, render_attributes};
use crate::hosts::{HostAdapter, TransformOptions};

const FENCE: &str = "---";

pub struct AstroHost;

impl HostAdapter for AstroHost {
    fn name(&self) -> &'static str {
        "astro"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["astro"]
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        let start = markup_start(source, path)?;
        let doc = parse_markup(source, Span::new(start, source.len()), MarkupSyntax::ASTRO, path)?;
        Ok(vec![doc])
    }

    fn render(
        &self,
        source: &str,
        doc: &mut Document,
        element: NodeId,
        edit: &ElementEdit,
        _options: &TransformOptions,
    ) -> Result<Option<Vec<Patch>>> {
        render_attributes(source, doc, element, edit, DynamicValues::TemplateLiteral)
    }
}

/// Offset where the template starts, past the frontmatter fence if any.
fn markup_start(source: &str, path: &str) -> Result<usize> {
    let open = source.len() - source.trim_start().len();
    if !source[open..].starts_with(FENCE) {
        return Ok(0);
    }
    let body = open + FENCE.len();
    let Some(rel) = memmem::find(&source.as_bytes()[body..], b"\n---") else {
        return Err(TransformError::parse_at(path, source, open, "unterminated frontmatter"));
    };
    Ok(body + rel + 1 + FENCE.len())
}
