//! JavaScript/TypeScript reader shared by the JSX and Lit hosts.

use std::path::Path;

use swc_common::{BytePos, FileName, GLOBALS, Globals, SourceMap, Spanned};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::core::{Result, Span, TransformError};

#[derive(Debug)]
pub struct ParsedScript {
    pub module: Module,
    start: BytePos,
}

impl ParsedScript {
    /// Byte offset into the source for an swc position.
    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start.0) as usize
    }

    pub fn span(&self, span: swc_common::Span) -> Span {
        Span::new(self.offset(span.lo), self.offset(span.hi))
    }
}

/// Pick the syntax from the file extension.
pub fn syntax_for(path: &str) -> Syntax {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        Some("ts" | "mts" | "cts") => Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

/// Parse `source` as a module.
pub fn parse_script(source: &str, path: &str) -> Result<ParsedScript> {
    GLOBALS.set(&Globals::new(), || {
        let source_map = SourceMap::default();
        let source_file =
            source_map.new_source_file(FileName::Real(path.into()).into(), source.to_string());

        let mut parser = Parser::new(syntax_for(path), StringInput::from(&*source_file), None);
        let module = parser.parse_module().map_err(|e| {
            let offset = e.span().lo.0.saturating_sub(source_file.start_pos.0) as usize;
            TransformError::parse_at(path, source, offset, e.kind().msg())
        })?;

        Ok(ParsedScript {
            module,
            start: source_file.start_pos,
        })
    })
}
