//! Host adapters: one per document format.
//!
//! A host only knows how to find its annotated regions, map them into
//! [`Document`]s and spell a merged attribute in its own syntax. Everything
//! else runs in [`crate::core`], the same way for every host.

use std::{path::Path, sync::LazyLock};

use tracing::{debug, instrument};

use crate::core::{
    AnnotateOptions, AnnotateReport, Document, ElementEdit, NodeId, Patch, PatchSet, Result,
    TransformError, annotate,
};

pub mod astro;
pub mod html;
pub mod jsx;
pub mod lit;
pub mod markup;
pub mod script;
pub mod svelte;
pub mod vue;

pub use jsx::JsxFramework;

use markup::{DynamicValues, render_attributes};

/// Caller-facing knobs, usually built from `.oliverc.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub jsx_framework: JsxFramework,
    /// Overrides every host's template-safe default when set.
    pub template_safe: Option<bool>,
    /// Overrides every host's forward-fallback default when set.
    pub forward_fallback: Option<bool>,
}

pub trait HostAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase file extensions, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    fn defaults(&self) -> AnnotateOptions {
        AnnotateOptions::default()
    }

    /// Host defaults with configuration overrides applied.
    fn options(&self, options: &TransformOptions) -> AnnotateOptions {
        let mut resolved = self.defaults();
        if let Some(template_safe) = options.template_safe {
            resolved.scan.template_safe = template_safe;
        }
        if let Some(forward_fallback) = options.forward_fallback {
            resolved.resolve.forward_fallback = forward_fallback;
        }
        resolved
    }

    /// One document per annotated region, spans absolute in `source`.
    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>>;

    /// Patches writing `edit` onto `element`, or `None` when this host
    /// cannot express it.
    fn render(
        &self,
        source: &str,
        doc: &mut Document,
        element: NodeId,
        edit: &ElementEdit,
        _options: &TransformOptions,
    ) -> Result<Option<Vec<Patch>>> {
        render_attributes(source, doc, element, edit, DynamicValues::Interpolate)
    }
}

static HOSTS: LazyLock<Vec<Box<dyn HostAdapter>>> = LazyLock::new(|| {
    vec![
        Box::new(html::HtmlHost),
        Box::new(vue::VueHost),
        Box::new(svelte::SvelteHost),
        Box::new(astro::AstroHost),
        Box::new(lit::LitHost),
        Box::new(jsx::JsxHost),
    ]
});

pub fn hosts() -> &'static [Box<dyn HostAdapter>] {
    &HOSTS
}

/// The host that claims `path` by extension.
pub fn host_for_path(path: impl AsRef<Path>) -> Option<&'static dyn HostAdapter> {
    let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    hosts()
        .iter()
        .find(|host| host.extensions().contains(&extension.as_str()))
        .map(|host| host.as_ref())
}

/// Output of one transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub code: String,
    pub report: AnnotateReport,
}

#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn transform(&self, source: &str, path: &str) -> Result<String> {
        self.transform_with_report(source, path).map(|t| t.code)
    }

    /// Like [`transform`](Self::transform), but hands back the original text
    /// alongside the error instead of failing.
    pub fn transform_or_original(&self, source: &str, path: &str) -> (String, Option<TransformError>) {
        match self.transform(source, path) {
            Ok(code) => (code, None),
            Err(err) => (source.to_string(), Some(err)),
        }
    }

    #[instrument(skip(self, source), fields(host = tracing::field::Empty))]
    pub fn transform_with_report(&self, source: &str, path: &str) -> Result<Transformed> {
        let unchanged = |report: AnnotateReport| Transformed {
            code: source.to_string(),
            report,
        };

        let Some(host) = host_for_path(path) else {
            debug!("no host for this extension, leaving file unchanged");
            return Ok(unchanged(AnnotateReport::default()));
        };
        tracing::Span::current().record("host", host.name());

        let options = host.options(&self.options);
        let mut patches = PatchSet::new();
        let mut report = AnnotateReport::default();
        for mut doc in host.parse(source, path)? {
            let doc_report = annotate(&mut doc, options, &mut patches, |doc, element, edit| {
                host.render(source, doc, element, edit, &self.options)
            })?;
            report.combine(doc_report);
        }

        if patches.is_empty() {
            return Ok(unchanged(report));
        }
        let code = patches.apply(source, path)?;
        debug!(
            merged = report.merged,
            unresolved = report.unresolved,
            skipped = report.skipped,
            "annotated"
        );
        Ok(Transformed { code, report })
    }
}

/// Transform `source` with default options, picking the host from `path`.
pub fn transform(source: &str, path: &str) -> Result<String> {
    Transformer::default().transform(source, path)
}
