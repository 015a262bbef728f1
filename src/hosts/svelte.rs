use crate::core::{AnnotateOptions, Document, NodeKind, ResolveOptions, Result, Span};
use crate::hosts::HostAdapter;
use crate::hosts::markup::{MarkupSyntax, parse_markup};

pub struct SvelteHost;

impl HostAdapter for SvelteHost {
    fn name(&self) -> &'static str {
        "svelte"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["svelte"]
    }

    fn defaults(&self) -> AnnotateOptions {
        AnnotateOptions {
            resolve: ResolveOptions {
                forward_fallback: true,
            },
            ..Default::default()
        }
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        let mut doc = parse_markup(source, Span::new(0, source.len()), MarkupSyntax::SVELTE, path)?;

        // Component-level script and style blocks are not annotation targets.
        let top_level = doc.children(doc.root()).to_vec();
        for id in top_level {
            if matches!(doc.tag(id), Some("script" | "style")) {
                doc.node_mut(id).kind = NodeKind::Opaque;
            }
        }
        Ok(vec![doc])
    }
}
