//! Recursive-descent parser: token stream to a single file [`ast::File`].
//!
//! One token of lookahead, matching the tokenizer's own lookahead discipline
//! (`self.current` is always the token already returned by the last
//! `scan()`). On a syntax error the parser records a diagnostic and skips
//! forward to the next statement boundary so a single run can report every
//! independent error in a file, not just the first.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::ast;
use crate::diagnostic::{Diagnostic, DiagnosticBag, Severity};
use crate::reference::{Reference, Span};
use crate::token::Token;
use crate::tokenizer::{Lexeme, Tokenizer};

pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    file_path: PathBuf,
    current: Lexeme,
    /// Span of the most recently consumed token; used to close out the
    /// reference of a production without threading an explicit "end" value
    /// through every helper.
    prev_span: Span,
    pending_docs: Vec<String>,
    last_trivia_line: Option<usize>,
    diagnostics: DiagnosticBag,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file_path: impl Into<PathBuf>) -> Self {
        let tokenizer = Tokenizer::new(source);
        let placeholder = Lexeme {
            span: Span::at(crate::reference::Position::start()),
            token: Token::Eof,
            literal: String::new(),
        };
        let mut parser = Parser {
            tokenizer,
            file_path: file_path.into(),
            current: placeholder.clone(),
            prev_span: placeholder.span,
            pending_docs: Vec::new(),
            last_trivia_line: None,
            diagnostics: DiagnosticBag::new(),
        };
        parser.advance();
        parser
    }

    /// Parses the whole file and returns the AST (always produced, even in
    /// the presence of errors) alongside every diagnostic collected while
    /// doing so.
    pub fn parse_file(mut self, package: impl Into<String>, name: impl Into<String>) -> (ast::File, DiagnosticBag) {
        let file_path = self.file_path.clone();
        debug!(file = %file_path.display(), "parsing file");
        let mut imports = Vec::new();
        let mut types = Vec::new();

        while self.current.token == Token::Import {
            if let Some(import) = self.parse_import() {
                imports.push(import);
            }
            self.pending_docs.clear();
        }

        while self.current.token != Token::Eof {
            match self.current.token {
                Token::Struct | Token::Enum | Token::Union | Token::Base | Token::At => {
                    if let Some(ty) = self.parse_type() {
                        types.push(ty);
                    } else {
                        self.resync();
                    }
                }
                Token::Import => {
                    self.push_current_diag(
                        "syntax-error",
                        "import statements must precede all type declarations",
                    );
                    self.skip_stray_token_or_resync();
                }
                _ => {
                    self.push_current_diag(
                        "syntax-error",
                        format!("expected a type declaration, found {}", self.current.token),
                    );
                    self.skip_stray_token_or_resync();
                }
            }
        }

        debug!(
            file = %file_path.display(),
            imports = imports.len(),
            types = types.len(),
            errors = self.diagnostics.len(),
            "finished parsing file"
        );

        let file = ast::File {
            name: name.into(),
            package: package.into(),
            imports,
            types,
        };
        (file, self.diagnostics)
    }

    fn parse_import(&mut self) -> Option<ast::ImportStmt> {
        let start = self.current.span;
        self.advance(); // consume 'import'
        let path_tok = self.expect(Token::String)?;
        let mut alias = None;
        if self.current.token == Token::As {
            self.advance();
            let ident = self.expect(Token::Ident)?;
            alias = Some(ident.literal);
        }
        Some(ast::ImportStmt {
            reference: self.reference_for(start),
            path: path_tok.literal,
            alias,
        })
    }

    fn parse_type(&mut self) -> Option<ast::TypeStmt> {
        let documentation = self.take_docs();
        let annotations = self.parse_annotations()?;
        let start = self.current.span;

        let kind = match self.current.token {
            Token::Struct => ast::TypeKind::Struct,
            Token::Enum => ast::TypeKind::Enum,
            Token::Union => ast::TypeKind::Union,
            Token::Base => ast::TypeKind::Base,
            _ => {
                self.push_current_diag(
                    "syntax-error",
                    format!("expected struct, enum, union or base, found {}", self.current.token),
                );
                return None;
            }
        };
        self.advance(); // consume the modifier keyword

        let name_tok = self.expect(Token::Ident)?;
        trace!(name = %name_tok.literal, kind = ?kind, "parsing type");

        let base_type = if self.current.token == Token::Extends {
            self.advance();
            Some(self.parse_type_ident()?)
        } else {
            None
        };

        self.expect(Token::Lbrace)?;

        let is_enum = kind == ast::TypeKind::Enum;
        let mut fields = Vec::new();
        while self.current.token != Token::Rbrace && self.current.token != Token::Eof {
            match self.parse_field(is_enum) {
                Some(field) => fields.push(field),
                None => self.resync(),
            }
        }
        self.expect(Token::Rbrace)?;

        Some(ast::TypeStmt {
            reference: self.reference_for(start),
            kind,
            name: name_tok.literal,
            base_type,
            fields,
            documentation,
            annotations,
        })
    }

    fn parse_field(&mut self, is_enum: bool) -> Option<ast::FieldStmt> {
        let documentation = self.take_docs();
        let annotations = self.parse_annotations()?;
        let start = self.current.span;

        let index = if self.current.token == Token::Int {
            let lit = self.current.literal.clone();
            let lit_span = self.current.span;
            self.advance();
            self.expect(Token::Colon)?;
            match lit.parse::<i64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    self.push_diag_at_span(
                        lit_span,
                        "syntax-error",
                        format!("invalid field index '{lit}'"),
                    );
                    None
                }
            }
        } else {
            None
        };

        let name_tok = self.expect(Token::Ident)?;
        trace!(name = %name_tok.literal, index = ?index, "parsing field");

        let value_type = if is_enum {
            None
        } else {
            Some(self.parse_value_type()?)
        };

        let default_value = if !is_enum && self.current.token == Token::Assign {
            self.advance();
            Some(self.parse_value()?)
        } else {
            None
        };

        Some(ast::FieldStmt {
            reference: self.reference_for(start),
            name: name_tok.literal,
            value_type,
            index,
            default_value,
            documentation,
            annotations,
        })
    }

    fn parse_value_type(&mut self) -> Option<ast::ValueTypeStmt> {
        let start = self.current.span;
        let ident = self.parse_type_ident()?;

        let mut arguments = Vec::new();
        if self.current.token == Token::Lparen {
            self.advance();
            loop {
                arguments.push(self.parse_value_type()?);
                if self.current.token == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(Token::Rparen)?;
        }

        let nullable = if self.current.token == Token::Nullable {
            self.advance();
            true
        } else {
            false
        };

        Some(ast::ValueTypeStmt {
            reference: self.reference_for(start),
            ident,
            nullable,
            arguments,
        })
    }

    /// `Ident [ "." Ident ]`, used both for base-type references and the
    /// head identifier of a `ValueType`.
    fn parse_type_ident(&mut self) -> Option<ast::IdentifierStmt> {
        let start = self.current.span;
        let first = self.expect(Token::Ident)?;
        let mut lit = first.literal;
        if self.current.token == Token::Period {
            self.advance();
            let second = self.expect(Token::Ident)?;
            lit = format!("{lit}.{}", second.literal);
        }
        Some(ast::IdentifierStmt {
            reference: self.reference_for(start),
            lit,
        })
    }

    fn parse_value(&mut self) -> Option<ast::ValueStmt> {
        let start = self.current.span;
        match self.current.token {
            Token::String => {
                let lit = self.current.literal.clone();
                self.advance();
                Some(ast::ValueStmt::Primitive(ast::PrimitiveValueStmt {
                    reference: self.reference_for(start),
                    value: ast::PrimitiveLit::String(lit),
                }))
            }
            Token::Int => {
                let lit = self.current.literal.clone();
                self.advance();
                match lit.parse::<i64>() {
                    Ok(v) => Some(ast::ValueStmt::Primitive(ast::PrimitiveValueStmt {
                        reference: self.reference_for(start),
                        value: ast::PrimitiveLit::Int(v),
                    })),
                    Err(_) => {
                        self.push_diag_at_span(start, "syntax-error", format!("invalid integer literal '{lit}'"));
                        None
                    }
                }
            }
            Token::Float => {
                let lit = self.current.literal.clone();
                self.advance();
                match lit.parse::<f64>() {
                    Ok(v) => Some(ast::ValueStmt::Primitive(ast::PrimitiveValueStmt {
                        reference: self.reference_for(start),
                        value: ast::PrimitiveLit::Float(v),
                    })),
                    Err(_) => {
                        self.push_diag_at_span(start, "syntax-error", format!("invalid float literal '{lit}'"));
                        None
                    }
                }
            }
            Token::True | Token::False => {
                let value = self.current.token == Token::True;
                self.advance();
                Some(ast::ValueStmt::Primitive(ast::PrimitiveValueStmt {
                    reference: self.reference_for(start),
                    value: ast::PrimitiveLit::Bool(value),
                }))
            }
            Token::Null => {
                self.advance();
                Some(ast::ValueStmt::Primitive(ast::PrimitiveValueStmt {
                    reference: self.reference_for(start),
                    value: ast::PrimitiveLit::Null,
                }))
            }
            Token::Ident => {
                let ident = self.parse_enum_member_ident()?;
                Some(ast::ValueStmt::Type(ast::TypeValueStmt {
                    reference: ident.reference.clone(),
                    ident,
                }))
            }
            Token::Lbrack => self.parse_list_value(),
            Token::Lbrace => self.parse_map_value(),
            _ => {
                self.push_current_diag(
                    "syntax-error",
                    format!("expected a value, found {}", self.current.token),
                );
                None
            }
        }
    }

    /// `Ident "." Ident`, an enum member reference used as a default value.
    fn parse_enum_member_ident(&mut self) -> Option<ast::IdentifierStmt> {
        let start = self.current.span;
        let first = self.expect(Token::Ident)?;
        self.expect(Token::Period)?;
        let second = self.expect(Token::Ident)?;
        Some(ast::IdentifierStmt {
            reference: self.reference_for(start),
            lit: format!("{}.{}", first.literal, second.literal),
        })
    }

    fn parse_list_value(&mut self) -> Option<ast::ValueStmt> {
        let start = self.current.span;
        self.advance(); // consume '['
        let mut values = Vec::new();
        if self.current.token != Token::Rbrack {
            loop {
                values.push(self.parse_value()?);
                if self.current.token == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::Rbrack)?;
        Some(ast::ValueStmt::List(ast::ListValueStmt {
            reference: self.reference_for(start),
            values,
        }))
    }

    fn parse_map_value(&mut self) -> Option<ast::ValueStmt> {
        let start = self.current.span;
        self.advance(); // consume '{'
        let mut entries = Vec::new();
        if self.current.token != Token::Rbrace {
            loop {
                let key = self.parse_value()?;
                self.expect(Token::Colon)?;
                let value = self.parse_value()?;
                entries.push(ast::MapEntryStmt { key, value });
                if self.current.token == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::Rbrace)?;
        Some(ast::ValueStmt::Map(ast::MapValueStmt {
            reference: self.reference_for(start),
            entries,
        }))
    }

    fn parse_annotations(&mut self) -> Option<Vec<ast::Annotation>> {
        let mut out = Vec::new();
        while self.current.token == Token::At {
            out.push(self.parse_annotation()?);
        }
        Some(out)
    }

    fn parse_annotation(&mut self) -> Option<ast::Annotation> {
        let start = self.current.span;
        self.advance(); // consume '@'
        let name_tok = self.expect(Token::Ident)?;
        self.expect(Token::Lparen)?;
        let mut arguments = Vec::new();
        if self.current.token != Token::Rparen {
            loop {
                arguments.push(self.parse_annotation_arg()?);
                if self.current.token == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::Rparen)?;
        Some(ast::Annotation {
            reference: self.reference_for(start),
            name: name_tok.literal,
            arguments,
        })
    }

    /// An annotation argument is either a bare identifier (a reference to a
    /// sibling field's name, as in `@default(name, value)`) or a full
    /// `Value`. Telling them apart needs only the lookahead already in
    /// hand: consume the identifier, then check whether a `.` follows.
    fn parse_annotation_arg(&mut self) -> Option<ast::AnnotationArg> {
        if self.current.token == Token::Ident {
            let start = self.current.span;
            let first = self.current.literal.clone();
            self.advance();
            if self.current.token == Token::Period {
                self.advance();
                let second = self.expect(Token::Ident)?;
                let lit = format!("{first}.{}", second.literal);
                let reference = self.reference_for(start);
                return Some(ast::AnnotationArg::Value(ast::ValueStmt::Type(ast::TypeValueStmt {
                    reference: reference.clone(),
                    ident: ast::IdentifierStmt { reference, lit },
                })));
            }
            return Some(ast::AnnotationArg::Ident(ast::IdentifierStmt {
                reference: self.reference_for(start),
                lit: first,
            }));
        }
        Some(ast::AnnotationArg::Value(self.parse_value()?))
    }

    fn expect(&mut self, token: Token) -> Option<Lexeme> {
        if self.current.token == token {
            let lex = self.current.clone();
            self.advance();
            Some(lex)
        } else {
            self.push_current_diag(
                "syntax-error",
                format!("expected {token}, found {}", self.current.token),
            );
            None
        }
    }

    /// Skips tokens until the next statement boundary: a top-level
    /// declaration keyword, a closing `}`, or end of file. Stops *before*
    /// consuming the boundary token so callers decide whether it belongs to
    /// them.
    fn resync(&mut self) {
        loop {
            match self.current.token {
                Token::Eof
                | Token::Rbrace
                | Token::Struct
                | Token::Enum
                | Token::Union
                | Token::Base
                | Token::Import => return,
                _ => self.advance(),
            }
        }
    }

    /// Used at file scope, where a `}` can only ever be a stray token (file
    /// scope opens no block of its own): consume it to guarantee resync()
    /// makes forward progress, otherwise fall back to the general resync.
    fn skip_stray_token_or_resync(&mut self) {
        if self.current.token == Token::Rbrace {
            self.advance();
        } else {
            self.resync();
        }
    }

    fn advance(&mut self) {
        loop {
            match self.tokenizer.scan() {
                Ok(lex) => {
                    if lex.token == Token::Comment {
                        self.record_comment(&lex);
                        continue;
                    }
                    self.detach_docs_if_blank_line_before(lex.span.line_start);
                    self.prev_span = self.current.span;
                    self.current = lex;
                    return;
                }
                Err(err) => {
                    self.push_diag_at(err.pos, "lexical-error", err.message.clone());
                    self.prev_span = self.current.span;
                    self.current = Lexeme {
                        span: Span::at(err.pos),
                        token: Token::Eof,
                        literal: String::new(),
                    };
                    return;
                }
            }
        }
    }

    fn record_comment(&mut self, lex: &Lexeme) {
        self.detach_docs_if_blank_line_before(lex.span.line_start);
        self.pending_docs.push(lex.literal.clone());
        self.last_trivia_line = Some(lex.span.line_end);
    }

    /// A blank source line between the last accumulated comment and the
    /// next token (comment or declaration) breaks the doc-comment run.
    fn detach_docs_if_blank_line_before(&mut self, line_start: usize) {
        if let Some(last) = self.last_trivia_line {
            if line_start > last + 1 {
                self.pending_docs.clear();
            }
        }
    }

    fn take_docs(&mut self) -> Vec<String> {
        self.last_trivia_line = None;
        std::mem::take(&mut self.pending_docs)
    }

    fn reference_for(&self, start: Span) -> Reference {
        Reference::new(self.file_path.clone(), start.merge(&self.prev_span))
    }

    fn push_current_diag(&mut self, rule_key: &str, message: impl Into<String>) {
        self.push_diag_at_span(self.current.span, rule_key, message);
    }

    fn push_diag_at_span(&mut self, span: Span, rule_key: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(
            Reference::new(self.file_path.clone(), span),
            rule_key,
            Severity::Error,
            message,
        ));
    }

    fn push_diag_at(&mut self, pos: crate::reference::Position, rule_key: &str, message: impl Into<String>) {
        self.push_diag_at_span(Span::at(pos), rule_key, message);
    }
}

/// Parses the contents of a single `.nex` file.
pub fn parse(source: &str, file_path: impl Into<PathBuf>, package: impl Into<String>, name: impl Into<String>) -> (ast::File, DiagnosticBag) {
    Parser::new(source, file_path).parse_file(package, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_src(src: &str) -> (ast::File, DiagnosticBag) {
        parse(src, "test.nex", "pkg", "test.nex")
    }

    #[test]
    fn parses_struct_with_explicit_indices() {
        let (file, diags) = parse_src("struct Foo { 0: a string 1: b int32 }");
        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        assert_eq!(file.types.len(), 1);
        let ty = &file.types[0];
        assert_eq!(ty.kind, ast::TypeKind::Struct);
        assert_eq!(ty.name, "Foo");
        assert_eq!(ty.fields.len(), 2);
        assert_eq!(ty.fields[0].index, Some(0));
        assert_eq!(ty.fields[0].name, "a");
        assert_eq!(ty.fields[1].index, Some(1));
        assert_eq!(ty.fields[1].name, "b");
    }

    #[test]
    fn parses_enum_without_value_types() {
        let (file, diags) = parse_src("enum Parent { A B }");
        assert!(diags.is_empty());
        let ty = &file.types[0];
        assert_eq!(ty.kind, ast::TypeKind::Enum);
        assert_eq!(ty.fields.len(), 2);
        assert!(ty.fields[0].value_type.is_none());
        assert!(ty.fields[1].value_type.is_none());
    }

    #[test]
    fn parses_extends_clause() {
        let (file, diags) = parse_src("struct Child extends Parent {}");
        assert!(diags.is_empty());
        let ty = &file.types[0];
        assert_eq!(ty.base_type.as_ref().unwrap().lit, "Parent");
    }

    #[test]
    fn parses_nested_list_and_map_types() {
        let (file, diags) = parse_src("struct Foo { a list(string) b map(string, int32) }");
        assert!(diags.is_empty());
        let ty = &file.types[0];
        let list_type = ty.fields[0].value_type.as_ref().unwrap();
        assert_eq!(list_type.ident.lit, "list");
        assert_eq!(list_type.arguments.len(), 1);
        let map_type = ty.fields[1].value_type.as_ref().unwrap();
        assert_eq!(map_type.ident.lit, "map");
        assert_eq!(map_type.arguments.len(), 2);
    }

    #[test]
    fn parses_nullable_value_type() {
        let (file, diags) = parse_src("struct Foo { a string? }");
        assert!(diags.is_empty());
        assert!(ty_field_nullable(&file, 0, 0));
    }

    fn ty_field_nullable(file: &ast::File, ty_idx: usize, field_idx: usize) -> bool {
        file.types[ty_idx].fields[field_idx].value_type.as_ref().unwrap().nullable
    }

    #[test]
    fn parses_default_value_and_enum_member_reference() {
        let (file, diags) = parse_src("struct Foo { a Color.Red = Color.Red }");
        assert!(diags.is_empty());
        let field = &file.types[0].fields[0];
        match field.default_value.as_ref().unwrap() {
            ast::ValueStmt::Type(t) => assert_eq!(t.ident.lit, "Color.Red"),
            other => panic!("expected enum member reference, got {other:?}"),
        }
    }

    #[test]
    fn parses_list_and_map_literal_defaults() {
        let (file, diags) = parse_src(r#"struct Foo { a list(int32) = [1, 2, 3] b map(string, bool) = {"x": true} }"#);
        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        match file.types[0].fields[0].default_value.as_ref().unwrap() {
            ast::ValueStmt::List(l) => assert_eq!(l.values.len(), 3),
            other => panic!("expected list value, got {other:?}"),
        }
        match file.types[0].fields[1].default_value.as_ref().unwrap() {
            ast::ValueStmt::Map(m) => assert_eq!(m.entries.len(), 1),
            other => panic!("expected map value, got {other:?}"),
        }
    }

    #[test]
    fn binds_doc_comments_to_following_type() {
        let (file, _) = parse_src("// first line\n// second line\nstruct Foo {}");
        assert_eq!(file.types[0].documentation, vec!["first line", "second line"]);
    }

    #[test]
    fn blank_line_detaches_doc_comment() {
        let (file, _) = parse_src("// stray\n\nstruct Foo {}");
        assert!(file.types[0].documentation.is_empty());
    }

    #[test]
    fn parses_annotation_with_field_name_and_value_arguments() {
        let (file, diags) = parse_src(r#"struct Foo { @default(b, 1) a string b int32 }"#);
        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        let annotation = &file.types[0].fields[0].annotations[0];
        assert_eq!(annotation.name, "default");
        assert_eq!(annotation.arguments.len(), 2);
        assert!(matches!(annotation.arguments[0], ast::AnnotationArg::Ident(_)));
        assert!(matches!(annotation.arguments[1], ast::AnnotationArg::Value(_)));
    }

    #[test]
    fn recovers_after_syntax_error_and_keeps_parsing_next_type() {
        let (file, diags) = parse_src("struct Foo { a !!! } enum Bar { X }");
        assert!(!diags.is_empty());
        assert_eq!(file.types.len(), 2);
        assert_eq!(file.types[1].name, "Bar");
    }

    #[test]
    fn reports_two_errors_in_a_single_run_without_bailing_out() {
        let (_file, diags) = parse_src("struct Foo { a !!! b @@@ } struct Baz { c string }");
        assert!(diags.len() >= 2);
    }

    #[test]
    fn single_dot_in_float_is_consumed_but_second_is_not() {
        let (file, diags) = parse_src("struct Foo { a float32 = 1.2 }");
        assert!(diags.is_empty());
        match file.types[0].fields[0].default_value.as_ref().unwrap() {
            ast::ValueStmt::Primitive(p) => assert_eq!(p.value, ast::PrimitiveLit::Float(1.2)),
            other => panic!("expected float literal, got {other:?}"),
        }
    }
}
