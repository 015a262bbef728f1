//! Comment scanner: finds comment nodes that are annotation candidates.

use crate::core::document::{Document, NodeId};

/// Characters that could turn back into live template syntax when the
/// output is consumed by a templating engine (Liquid, Jinja, ...).
pub const TEMPLATE_UNSAFE_CHARS: &[char] = &['<', '>', '$', '{', '}'];

/// Prefix that marks a comment as a plain note.
pub const ESCAPE_PREFIX: &str = "//";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Reject comments containing [`TEMPLATE_UNSAFE_CHARS`].
    pub template_safe: bool,
}

/// Eligibility of a single comment body.
pub fn is_eligible_text(text: &str, options: ScanOptions) -> bool {
    let text = text.trim();
    if text.is_empty() || text.starts_with(ESCAPE_PREFIX) {
        return false;
    }
    !(options.template_safe && text.contains(TEMPLATE_UNSAFE_CHARS))
}

/// A comment node is eligible when it is unconsumed and every body is.
pub fn is_eligible(doc: &Document, id: NodeId, options: ScanOptions) -> bool {
    let node = doc.node(id);
    node.is_comment()
        && !node.is_consumed()
        && !node.bodies.is_empty()
        && node.bodies.iter().all(|b| is_eligible_text(b, options))
}

/// All eligible comments in pre-order.
pub fn scan(doc: &Document, options: ScanOptions) -> Vec<NodeId> {
    doc.pre_order()
        .into_iter()
        .filter(|id| is_eligible(doc, *id, options))
        .collect()
}
