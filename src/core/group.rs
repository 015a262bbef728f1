//! Comment grouping: stacked annotations after one element form one group.
//!
//! ```html
//! <button></button>
//! <!-- btn -->
//! <!-- btn-primary -->
//! <!-- margin-top: 4px -->
//! ```
//!
//! All three comments above share the `<button>` target, resolved once from
//! the first comment of the run.

use crate::core::document::{Document, NodeId};
use crate::core::scan::{ScanOptions, is_eligible};

/// A run of consecutive eligible comments sharing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub target: NodeId,
    pub comments: Vec<NodeId>,
}

/// Collect the maximal run of eligible comments starting at `first`.
///
/// Whitespace-only text is skipped without ending the run; any other node,
/// an ineligible comment included, ends it.
pub fn collect_run(doc: &Document, first: NodeId, options: ScanOptions) -> Vec<NodeId> {
    let (Some(parent), Some(start)) = (doc.parent(first), doc.index_in_parent(first)) else {
        return vec![first];
    };

    let mut run = Vec::new();
    for id in &doc.children(parent)[start..] {
        let node = doc.node(*id);
        if node.is_comment() && is_eligible(doc, *id, options) {
            run.push(*id);
        } else if !node.is_whitespace_text() {
            break;
        }
    }
    run
}
