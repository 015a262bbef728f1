use crate::core::{AnnotateOptions, Document, Result, ScanOptions, Span};
use crate::hosts::HostAdapter;
use crate::hosts::markup::{MarkupSyntax, parse_markup};

/// Plain HTML pages, often fed to a templating engine afterwards
/// (Jekyll/Liquid), hence template-safe by default.
pub struct HtmlHost;

impl HostAdapter for HtmlHost {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn defaults(&self) -> AnnotateOptions {
        AnnotateOptions {
            scan: ScanOptions {
                template_safe: true,
            },
            ..Default::default()
        }
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        let doc = parse_markup(source, Span::new(0, source.len()), MarkupSyntax::HTML, path)?;
        Ok(vec![doc])
    }
}
