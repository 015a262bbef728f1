//! Target resolution: which element does a comment annotate?
//!
//! Comments are trailing annotations for the element right before them.
//! When there is none, the comment styles its parent element, or the
//! nearest element above a chain of structural containers (fragments,
//! `{#if}` blocks). Hosts may opt into a final forward search.

use tracing::trace;

use crate::core::document::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Look for the first following element when everything else fails.
    pub forward_fallback: bool,
}

/// Which rule produced the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Preceding(NodeId),
    Parent(NodeId),
    Ancestor(NodeId),
    Following(NodeId),
}

impl Resolution {
    pub fn target(self) -> NodeId {
        match self {
            Resolution::Preceding(id)
            | Resolution::Parent(id)
            | Resolution::Ancestor(id)
            | Resolution::Following(id) => id,
        }
    }
}

/// What a sibling scan does with one node.
enum Step {
    Found,
    Skip,
    Blocked,
}

fn classify_sibling(doc: &Document, id: NodeId) -> Step {
    let node = doc.node(id);
    match node.kind {
        NodeKind::Element => Step::Found,
        NodeKind::Comment => Step::Skip,
        NodeKind::Text if node.is_whitespace_text() => Step::Skip,
        _ => Step::Blocked,
    }
}

fn scan_siblings<'a>(doc: &Document, mut siblings: impl Iterator<Item = &'a NodeId>) -> Option<NodeId> {
    siblings.find_map(|id| match classify_sibling(doc, *id) {
        Step::Found => Some(Some(*id)),
        Step::Skip => None,
        Step::Blocked => Some(None),
    })?
}

/// Resolve the target element for `comment`, or `None` when it has none.
pub fn resolve_target(doc: &Document, comment: NodeId, options: ResolveOptions) -> Option<Resolution> {
    let parent = doc.parent(comment)?;
    let siblings = doc.children(parent);
    let index = doc.index_in_parent(comment)?;

    if let Some(id) = scan_siblings(doc, siblings[..index].iter().rev()) {
        return Some(Resolution::Preceding(id));
    }

    match doc.kind(parent) {
        NodeKind::Element => return Some(Resolution::Parent(parent)),
        NodeKind::Container => {
            if let Some(id) = doc.ancestors(parent).find(|a| doc.kind(*a) == NodeKind::Element) {
                return Some(Resolution::Ancestor(id));
            }
        }
        _ => {}
    }

    if options.forward_fallback
        && let Some(id) = scan_siblings(doc, siblings[index + 1..].iter())
    {
        return Some(Resolution::Following(id));
    }

    trace!(start = doc.span(comment).start, "comment has no target");
    None
}
