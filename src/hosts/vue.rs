use std::sync::LazyLock;

use memchr::{memchr, memmem};
use regex::Regex;
use tracing::debug;

use crate::core::{Document, Result, Span, TransformError};
use crate::hosts::HostAdapter;
use crate::hosts::markup::{MarkupSyntax, parse_markup};

static LANG_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\blang\s*=\s*["']?([A-Za-z0-9_-]+)"#).unwrap());

/// Vue single-file components: only the top-level `<template>` is markup.
pub struct VueHost;

impl HostAdapter for VueHost {
    fn name(&self) -> &'static str {
        "vue"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["vue"]
    }

    fn parse(&self, source: &str, path: &str) -> Result<Vec<Document>> {
        match template_region(source, path)? {
            Some(region) => Ok(vec![parse_markup(source, region, MarkupSyntax::HTML, path)?]),
            None => Ok(Vec::new()),
        }
    }
}

fn is_tag_at(bytes: &[u8], at: usize, tag: &[u8]) -> bool {
    bytes[at..].starts_with(tag)
        && bytes
            .get(at + tag.len())
            .is_some_and(|b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/'))
}

fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    memmem::find(&bytes[from..], needle).map(|rel| from + rel + needle.len())
}

/// End of the start tag beginning at `start`, skipping quoted values.
fn start_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, b) in bytes.iter().enumerate().skip(start) {
        match (quote, *b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(*b),
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Inner content of the top-level `<template>` block.
///
/// Nested `<template>` tags (`v-if`, slots) are counted so the region ends
/// at the matching close tag. Templates in another language are skipped.
fn template_region(source: &str, path: &str) -> Result<Option<Span>> {
    let bytes = source.as_bytes();
    let mut i = 0;
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        i += rel;
        if bytes[i..].starts_with(b"<!--") {
            let Some(next) = skip_past(bytes, i, b"-->") else {
                return Ok(None);
            };
            i = next;
        } else if is_tag_at(bytes, i, b"<script") || is_tag_at(bytes, i, b"<style") {
            let close: &[u8] = if bytes[i + 1] == b's' && bytes[i + 2] == b'c' {
                b"</script"
            } else {
                b"</style"
            };
            let Some(next) = skip_past(bytes, i, close) else {
                return Ok(None);
            };
            i = next;
        } else if is_tag_at(bytes, i, b"<template") {
            let Some(content_start) = start_tag_end(bytes, i) else {
                return Err(TransformError::parse_at(path, source, i, "unterminated tag"));
            };
            if let Some(lang) = LANG_ATTR_REGEX.captures(&source[i..content_start]).and_then(|c| c.get(1))
                && !lang.as_str().eq_ignore_ascii_case("html")
            {
                debug!(lang = lang.as_str(), "skipping non-html template");
                return Ok(None);
            }
            return find_template_close(source, i, content_start, path).map(Some);
        } else {
            i += 1;
        }
    }
    Ok(None)
}

fn find_template_close(source: &str, open: usize, content_start: usize, path: &str) -> Result<Span> {
    let bytes = source.as_bytes();
    let mut depth = 1usize;
    let mut i = content_start;
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        i += rel;
        if bytes[i..].starts_with(b"<!--") {
            match skip_past(bytes, i, b"-->") {
                Some(next) => i = next,
                None => break,
            }
            continue;
        }
        if is_tag_at(bytes, i, b"</template") {
            depth -= 1;
            if depth == 0 {
                return Ok(Span::new(content_start, i));
            }
        } else if is_tag_at(bytes, i, b"<template") {
            depth += 1;
        }
        i += 1;
    }
    Err(TransformError::parse_at(path, source, open, "unclosed <template>"))
}
