//! Declaration classifier: is a comment a list of classes or of styles?

use std::sync::LazyLock;

use regex::Regex;

/// A CSS-property-shaped token followed by a colon.
static STYLE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z-]+\s*:").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// A style comment, kept both as authored text and as parsed declarations.
///
/// String-valued hosts append `raw`; object-valued hosts (JSX) emit
/// `declarations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleText {
    pub raw: String,
    pub declarations: Vec<Declaration>,
}

impl StyleText {
    pub fn parse(text: &str) -> Self {
        let raw = text.trim().to_string();
        let declarations = split_declarations(&raw)
            .into_iter()
            .filter_map(parse_declaration)
            .collect();
        Self { raw, declarations }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Class(Vec<String>),
    Style(StyleText),
}

pub fn is_style(text: &str) -> bool {
    STYLE_PREFIX_REGEX.is_match(text.trim())
}

/// Classify one trimmed comment body.
pub fn classify(text: &str) -> Annotation {
    let text = text.trim();
    if is_style(text) {
        Annotation::Style(StyleText::parse(text))
    } else {
        Annotation::Class(split_class_tokens(text))
    }
}

/// Split on whitespace, keeping `{...}` and `${...}` holes in one token.
pub fn split_class_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Split a declaration list on `;`, ignoring separators inside quotes,
/// parentheses and braces. Empty pieces are dropped.
pub fn split_declarations(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '{' | '[') => depth += 1,
            (None, ')' | '}' | ']') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 && !ends_with_entity(&text[start..i]) => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// `&quot;`, `&#39;`: markup escapes whose `;` is not a separator.
fn ends_with_entity(text: &str) -> bool {
    let Some(amp) = text.rfind('&') else {
        return false;
    };
    let name = text[amp + 1..].strip_prefix('#').unwrap_or(&text[amp + 1..]);
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parse `property: value`. Pieces without a property or value are skipped.
pub fn parse_declaration(piece: &str) -> Option<Declaration> {
    let (property, value) = piece.split_once(':')?;
    let (property, value) = (property.trim(), value.trim());
    if property.is_empty() || value.is_empty() {
        return None;
    }
    Some(Declaration {
        property: property.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(property: &str, value: &str) -> Declaration {
        Declaration {
            property: property.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_style_detection() {
        assert!(is_style("color: red"));
        assert!(is_style("  margin-top :10px;"));
        assert!(is_style("--brand: #333"));
        assert!(!is_style("btn btn-primary"));
        assert!(!is_style("a1: b"));
        // Letter-only variant prefixes read as a property.
        assert!(is_style("md:flex"));
    }

    #[test]
    fn test_class_tokens_split_on_any_whitespace() {
        assert_eq!(
            classify("2xl:flex  p-4\n mx-auto"),
            Annotation::Class(vec!["2xl:flex".into(), "p-4".into(), "mx-auto".into()])
        );
    }

    #[test]
    fn test_class_tokens_keep_holes_atomic() {
        assert_eq!(
            split_class_tokens("a ${on ? 'x' : 'y'} {b ? c : d} e"),
            vec!["a", "${on ? 'x' : 'y'}", "{b ? c : d}", "e"]
        );
    }

    #[test]
    fn test_style_declarations() {
        let Annotation::Style(style) = classify(" color: red; margin-top: 10px; ") else {
            panic!("expected style");
        };
        assert_eq!(style.raw, "color: red; margin-top: 10px;");
        assert_eq!(
            style.declarations,
            vec![decl("color", "red"), decl("margin-top", "10px")]
        );
    }

    #[test]
    fn test_declaration_split_respects_quotes_and_parens() {
        assert_eq!(
            split_declarations(r#"background: url("a;b.png"); content: ';'; x: calc(1px;2px)"#),
            vec![r#"background: url("a;b.png")"#, "content: ';'", "x: calc(1px;2px)"]
        );
    }

    #[test]
    fn test_declaration_split_skips_entities() {
        assert_eq!(
            split_declarations("font-family: &quot;Inter&quot;; color: red"),
            vec!["font-family: &quot;Inter&quot;", "color: red"]
        );
    }

    #[test]
    fn test_value_keeps_later_colons() {
        assert_eq!(
            parse_declaration("background: url(http://x/y.png)"),
            Some(decl("background", "url(http://x/y.png)"))
        );
        assert_eq!(parse_declaration("bold"), None);
        assert_eq!(parse_declaration("color:"), None);
    }
}
