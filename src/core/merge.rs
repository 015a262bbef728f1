//! Merging new class tokens and style declarations into existing values.
//!
//! Policy: append-only, last declaration wins. Class tokens are an ordered
//! set. Style text is concatenated without per-property de-duplication;
//! a later `color` simply overrides an earlier one through the cascade, the
//! same outcome object-literal hosts get from duplicate keys.

use crate::core::classify::{Annotation, Declaration, StyleText, split_class_tokens, split_declarations};

/// Everything a set of comment groups wants to add to one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementEdit {
    pub classes: Vec<String>,
    pub styles: Vec<StyleText>,
}

impl ElementEdit {
    pub fn add(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Class(tokens) => self.classes.extend(tokens),
            Annotation::Style(style) => self.styles.push(style),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.styles.is_empty()
    }

    pub fn style_texts(&self) -> Vec<&str> {
        self.styles.iter().map(|s| s.raw.as_str()).collect()
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.styles.iter().flat_map(|s| s.declarations.iter())
    }
}

/// Union of existing and new tokens, first-seen order, no duplicates.
pub fn merge_class_tokens(existing: Option<&str>, additions: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let existing = existing.map(split_class_tokens).unwrap_or_default();
    for token in existing.into_iter().chain(additions.iter().cloned()) {
        if !merged.contains(&token) {
            merged.push(token);
        }
    }
    merged
}

/// Merged `class` value, or `None` when there is nothing to write.
pub fn merge_class(existing: Option<&str>, additions: &[String]) -> Option<String> {
    let merged = merge_class_tokens(existing, additions);
    (!merged.is_empty()).then(|| merged.join(" "))
}

/// Merged `style` value, or `None` when there is nothing to write.
///
/// The existing value is kept as written and closed with `;` before the new
/// declarations are appended. Empty declarations among the additions
/// collapse; a trailing `;` is kept when the last addition ended with one.
pub fn merge_style(existing: Option<&str>, additions: &[&str]) -> Option<String> {
    let existing = existing.map(str::trim).filter(|t| !t.is_empty());
    let texts: Vec<&str> = additions
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    let declarations: Vec<&str> = texts.iter().flat_map(|t| split_declarations(t)).collect();
    if declarations.is_empty() {
        return existing.map(str::to_string);
    }

    let mut added = declarations.join("; ");
    if texts.last().is_some_and(|t| t.ends_with(';')) {
        added.push(';');
    }

    Some(match existing {
        Some(base) if base.ends_with(';') => format!("{base} {added}"),
        Some(base) => format!("{base}; {added}"),
        None => added,
    })
}
