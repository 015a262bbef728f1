//! One annotation pass over a document.
//!
//! `Scan → Resolve → Group → Classify → Merge → Render → Patch`, run once.
//! Groups that land on the same element are folded into a single
//! [`ElementEdit`] before the host renders it, so each attribute is patched
//! at most once.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::classify::classify;
use crate::core::document::{Document, NodeId};
use crate::core::error::Result;
use crate::core::group::collect_run;
use crate::core::merge::ElementEdit;
use crate::core::patch::{Patch, PatchSet};
use crate::core::resolve::{ResolveOptions, resolve_target};
use crate::core::scan::{ScanOptions, scan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    pub scan: ScanOptions,
    pub resolve: ResolveOptions,
}

/// Counters for one pass (or several, once combined).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    /// Comment groups that found a target.
    pub groups: usize,
    /// Comments rewritten into attributes and removed.
    pub merged: usize,
    /// Eligible comments without a target, left verbatim.
    pub unresolved: usize,
    /// Comments whose merge the host could not express, left verbatim.
    pub skipped: usize,
}

impl AnnotateReport {
    pub fn combine(&mut self, other: AnnotateReport) {
        self.groups += other.groups;
        self.merged += other.merged;
        self.unresolved += other.unresolved;
        self.skipped += other.skipped;
    }

    pub fn changed(&self) -> bool {
        self.merged > 0
    }
}

#[derive(Default)]
struct PendingEdit {
    edit: ElementEdit,
    comments: Vec<NodeId>,
}

/// Run the pass over `doc`, pushing the resulting patches into `patches`.
///
/// `render` turns the folded edit for one element into patches, recording
/// the written values on the tree. It returns `None` when the host cannot
/// express the merge; those comments stay in place.
pub fn annotate<F>(
    doc: &mut Document,
    options: AnnotateOptions,
    patches: &mut PatchSet,
    mut render: F,
) -> Result<AnnotateReport>
where
    F: FnMut(&mut Document, NodeId, &ElementEdit) -> Result<Option<Vec<Patch>>>,
{
    let mut report = AnnotateReport::default();
    let mut claimed: HashSet<NodeId> = HashSet::new();
    let mut pending: IndexMap<NodeId, PendingEdit> = IndexMap::new();

    for comment in scan(doc, options.scan) {
        if claimed.contains(&comment) {
            continue;
        }
        let Some(resolution) = resolve_target(doc, comment, options.resolve) else {
            debug!(start = doc.span(comment).start, "leaving comment without a target");
            report.unresolved += 1;
            continue;
        };

        let target = resolution.target();
        debug!(?resolution, tag = doc.tag(target), "resolved comment group");

        let run = collect_run(doc, comment, options.scan);
        let entry = pending.entry(target).or_default();
        for id in &run {
            for body in &doc.node(*id).bodies {
                entry.edit.add(classify(body));
            }
        }
        claimed.extend(run.iter().copied());
        entry.comments.extend(run);
        report.groups += 1;
    }

    for (target, PendingEdit { edit, comments }) in pending {
        match render(doc, target, &edit)? {
            Some(rendered) => {
                patches.extend(rendered);
                for id in &comments {
                    let span = doc.span(*id);
                    patches.push(Patch::remove(span.start, span.end));
                    doc.mark_consumed(*id);
                }
                report.merged += comments.len();
            }
            None => {
                warn!(
                    tag = doc.tag(target),
                    start = doc.span(target).start,
                    "cannot express merged attributes on this element, leaving comments"
                );
                report.skipped += comments.len();
            }
        }
    }

    Ok(report)
}
