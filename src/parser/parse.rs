//! Recursive-descent parser building a [`File`] from source text.
//!
//! Matches spec §4.2's contract at the syntax level: parses declarations
//! fully, keeps comments available by retaining the source string rather
//! than attaching comment nodes, and never descends into a method body
//! beyond its first statement (spec.md Non-goals: LogCop does not
//! evaluate method bodies).

use std::path::{Path, PathBuf};

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{LogCopError, Result};
use crate::types::{line_col, Pos};

struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    src: &'a str,
    file: PathBuf,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, file: &Path) -> Self {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token();
        Parser {
            lexer,
            cur,
            src,
            file: file.to_path_buf(),
        }
    }

    fn bump(&mut self) -> Token {
        let old = self.cur.clone();
        self.cur = self.lexer.next_token();
        old
    }

    fn err(&self, pos: Pos, message: impl Into<String>) -> LogCopError {
        let (line, col) = line_col(self.src, pos);
        LogCopError::Parse {
            file: self.file.clone(),
            line,
            col,
            message: message.into(),
        }
    }

    fn skip_seps(&mut self) {
        while matches!(self.cur.kind, TokenKind::Semi) {
            self.bump();
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match &self.cur.kind {
            TokenKind::Ident(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.err(self.cur.pos, "expected identifier")),
        }
    }

    fn expect_kind(&mut self, kind: &TokenKind, what: &str) -> Result<Pos> {
        if &self.cur.kind == kind {
            Ok(self.bump().pos)
        } else {
            Err(self.err(self.cur.pos, format!("expected {what}")))
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.cur.kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    // ---- top level -------------------------------------------------

    fn parse_file(&mut self) -> Result<File> {
        self.skip_seps();
        self.expect_ident_value("package")?;
        let package_name = self.expect_ident()?;
        self.skip_seps();

        let mut imports = Vec::new();
        let mut decls = Vec::new();
        let mut first_decl_pos = None;

        loop {
            self.skip_seps();
            match &self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Ident(kw) if kw == "import" => {
                    imports.push(self.parse_import_decl()?);
                }
                TokenKind::Ident(kw) if kw == "type" => {
                    if first_decl_pos.is_none() {
                        first_decl_pos = Some(self.cur.pos);
                    }
                    decls.push(TopDecl::Type(self.parse_type_decl()?));
                }
                TokenKind::Ident(kw) if kw == "func" => {
                    if first_decl_pos.is_none() {
                        first_decl_pos = Some(self.cur.pos);
                    }
                    decls.push(TopDecl::Func(self.parse_func_decl()?));
                }
                _ => {
                    return Err(self.err(
                        self.cur.pos,
                        "expected 'import', 'type', or 'func' at top level",
                    ));
                }
            }
            self.skip_seps();
        }

        Ok(File {
            package_name,
            imports,
            decls,
            first_decl_pos,
        })
    }

    fn expect_ident_value(&mut self, value: &str) -> Result<()> {
        match &self.cur.kind {
            TokenKind::Ident(s) if s == value => {
                self.bump();
                Ok(())
            }
            _ => Err(self.err(self.cur.pos, format!("expected '{value}'"))),
        }
    }

    // ---- imports -----------------------------------------------------

    fn parse_import_decl(&mut self) -> Result<ImportDecl> {
        let pos = self.cur.pos;
        self.expect_ident_value("import")?;
        self.skip_seps();

        let mut specs = Vec::new();
        let block_open = if self.cur.kind == TokenKind::LParen {
            let open = self.bump().pos;
            self.skip_seps();
            while self.cur.kind != TokenKind::RParen {
                specs.push(self.parse_import_spec()?);
                self.skip_seps();
            }
            self.bump();
            Some(open)
        } else {
            specs.push(self.parse_import_spec()?);
            None
        };

        Ok(ImportDecl {
            specs,
            block_open,
            pos,
        })
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec> {
        let spec_pos = self.cur.pos;
        let alias = match &self.cur.kind {
            TokenKind::Ident(s) => {
                let s = s.clone();
                self.bump();
                Some(s)
            }
            _ => None,
        };
        let path = match &self.cur.kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                s
            }
            _ => return Err(self.err(self.cur.pos, "expected import path string")),
        };
        Ok(ImportSpec {
            alias,
            path,
            pos: spec_pos,
        })
    }

    // ---- types ---------------------------------------------------------

    fn parse_type_decl(&mut self) -> Result<TypeDecl> {
        self.expect_ident_value("type")?;
        let name_pos = self.cur.pos;
        let name = self.expect_ident()?;

        let kind = match &self.cur.kind {
            TokenKind::Ident(kw) if kw == "struct" => {
                self.bump();
                self.expect_kind(&TokenKind::LBrace, "'{'")?;
                TypeKind::Struct {
                    fields: self.parse_struct_fields()?,
                }
            }
            TokenKind::Ident(kw) if kw == "interface" => {
                self.bump();
                self.expect_kind(&TokenKind::LBrace, "'{'")?;
                TypeKind::Interface {
                    methods: self.parse_interface_methods()?,
                }
            }
            _ => {
                // `type Name Underlying` — skip the rest of the line.
                self.skip_until_terminator_or(&[TokenKind::RBrace]);
                TypeKind::Other
            }
        };

        Ok(TypeDecl {
            name,
            name_pos,
            kind,
        })
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        self.skip_seps();
        while self.cur.kind != TokenKind::RBrace {
            let pos = self.cur.pos;
            if self.cur.kind == TokenKind::Star {
                self.bump();
                let type_name = self.parse_possibly_qualified_type()?;
                self.skip_optional_tag();
                fields.push(Field {
                    name: None,
                    type_name,
                    type_is_ptr: true,
                    pos,
                });
            } else {
                let first = self.expect_ident()?;
                let looks_like_named = matches!(
                    self.cur.kind,
                    TokenKind::Ident(_) | TokenKind::Star
                );
                if looks_like_named {
                    let type_is_ptr = self.eat(&TokenKind::Star);
                    let type_name = self.parse_possibly_qualified_type()?;
                    self.skip_optional_tag();
                    fields.push(Field {
                        name: Some(first),
                        type_name,
                        type_is_ptr,
                        pos,
                    });
                } else if self.cur.kind == TokenKind::Dot {
                    self.bump();
                    let rest = self.expect_ident()?;
                    self.skip_optional_tag();
                    fields.push(Field {
                        name: None,
                        type_name: format!("{first}.{rest}"),
                        type_is_ptr: false,
                        pos,
                    });
                } else {
                    self.skip_optional_tag();
                    fields.push(Field {
                        name: None,
                        type_name: first,
                        type_is_ptr: false,
                        pos,
                    });
                }
            }
            self.skip_seps();
        }
        self.bump(); // RBrace
        Ok(fields)
    }

    fn parse_possibly_qualified_type(&mut self) -> Result<String> {
        let base = self.expect_ident()?;
        if self.cur.kind == TokenKind::Dot {
            self.bump();
            let rest = self.expect_ident()?;
            Ok(format!("{base}.{rest}"))
        } else {
            Ok(base)
        }
    }

    fn skip_optional_tag(&mut self) {
        if matches!(self.cur.kind, TokenKind::Str(_)) {
            self.bump();
        }
    }

    fn parse_interface_methods(&mut self) -> Result<Vec<(String, Pos)>> {
        let mut methods = Vec::new();
        self.skip_seps();
        while self.cur.kind != TokenKind::RBrace {
            let pos = self.cur.pos;
            let name = self.expect_ident()?;
            if self.cur.kind == TokenKind::LParen {
                self.skip_signature_tail(&[TokenKind::RBrace]);
                methods.push((name, pos));
            } else {
                // Embedded interface name (unsupported — see DESIGN.md);
                // skip to the next separator without recording a method.
                self.skip_until_terminator_or(&[TokenKind::RBrace]);
            }
            self.skip_seps();
        }
        self.bump(); // RBrace
        Ok(methods)
    }

    /// Skip a parameter list and optional result clause, stopping just
    /// before a token in `stop_at_depth0` or an explicit `;`, without
    /// consuming it. Used for interface method signatures, which have no
    /// body to locate.
    fn skip_signature_tail(&mut self, stop_at_depth0: &[TokenKind]) {
        let mut depth = 0i32;
        loop {
            if depth == 0
                && (self.cur.kind == TokenKind::Semi
                    || stop_at_depth0.contains(&self.cur.kind))
            {
                return;
            }
            match self.cur.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                TokenKind::Eof => return,
                _ => {}
            }
            self.bump();
        }
    }

    fn skip_until_terminator_or(&mut self, stop_at: &[TokenKind]) {
        while self.cur.kind != TokenKind::Semi
            && self.cur.kind != TokenKind::Eof
            && !stop_at.contains(&self.cur.kind)
        {
            self.bump();
        }
    }

    // ---- funcs -----------------------------------------------------

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        self.expect_ident_value("func")?;

        let receiver = if self.cur.kind == TokenKind::LParen {
            self.bump();
            self.expect_ident()?; // receiver variable name, unused
            let is_ptr = self.eat(&TokenKind::Star);
            let type_name = self.expect_ident()?;
            self.expect_kind(&TokenKind::RParen, "')'")?;
            Some(Receiver { type_name, is_ptr })
        } else {
            None
        };

        let name_pos = self.cur.pos;
        let name = self.expect_ident()?;

        // Parameter list + optional result clause, up to the body's '{'.
        let mut depth = 0i32;
        loop {
            if depth == 0 && self.cur.kind == TokenKind::LBrace {
                break;
            }
            match self.cur.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                TokenKind::Eof => {
                    return Err(self.err(self.cur.pos, "unexpected end of file in function signature"));
                }
                _ => {}
            }
            self.bump();
        }

        let body = Some(self.parse_body()?);

        Ok(FuncDecl {
            receiver,
            name,
            name_pos,
            body,
        })
    }

    fn parse_body(&mut self) -> Result<Body> {
        let open = self.expect_kind(&TokenKind::LBrace, "'{'")?;
        let close = find_matching_brace(self.src, open)
            .ok_or_else(|| self.err(open, "unterminated function body"))?;

        self.skip_seps();
        let first_stmt = if self.cur.kind == TokenKind::RBrace {
            None
        } else if matches!(&self.cur.kind, TokenKind::Ident(kw) if kw == "defer") {
            self.bump();
            Some(Stmt::Defer(self.parse_expr()?))
        } else {
            Some(Stmt::Other)
        };

        // Resume right after the body, regardless of how much of the
        // first statement we parsed — LogCop never reads further.
        self.resume_at(close + 1);

        Ok(Body {
            open,
            close,
            first_stmt,
        })
    }

    fn resume_at(&mut self, pos: Pos) {
        self.lexer = Lexer::new(self.src);
        // Fast-forward the fresh lexer to `pos` by construction rather
        // than re-lexing byte by byte: the lexer has no internal state
        // beyond its cursor, so seeking is just setting it directly.
        self.lexer.seek(pos);
        self.cur = self.lexer.next_token();
    }

    // ---- expressions (first statement only) -------------------------

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.cur.kind == TokenKind::Amp {
            let pos = self.bump().pos;
            let inner = self.parse_unary()?;
            return Ok(Expr::Addr(Box::new(inner), pos));
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.cur.kind.clone() {
            TokenKind::Ident(name) => {
                let pos = self.bump().pos;
                Ok(Expr::Ident(name, pos))
            }
            TokenKind::Str(s) => {
                let pos = self.bump().pos;
                Ok(Expr::StringLit(s, pos))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_kind(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => {
                let pos = self.bump().pos;
                Ok(Expr::Unknown(pos))
            }
        }
    }

    fn parse_postfix(&mut self, mut e: Expr) -> Result<Expr> {
        loop {
            match self.cur.kind {
                TokenKind::Dot => {
                    self.bump();
                    let pos = self.cur.pos;
                    let name = self.expect_ident()?;
                    e = Expr::Selector(Box::new(e), name, pos);
                }
                TokenKind::LParen => {
                    let pos = self.bump().pos;
                    let args = self.parse_args()?;
                    self.expect_kind(&TokenKind::RParen, "')'")?;
                    e = Expr::Call(Box::new(e), args, pos);
                }
                _ => break,
            }
        }
        Ok(e)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        self.skip_seps();
        if self.cur.kind == TokenKind::RParen {
            return Ok(args);
        }
        loop {
            args.push(self.parse_unary()?);
            self.skip_seps();
            if self.cur.kind == TokenKind::Comma {
                self.bump();
                self.skip_seps();
            } else {
                break;
            }
        }
        Ok(args)
    }
}

/// Scan forward from `open` (the position of a `{`) to find its matching
/// `}`, using a real lexer pass so string/comment contents never throw
/// off the brace count.
fn find_matching_brace(src: &str, open: Pos) -> Option<Pos> {
    let mut lexer = Lexer::new(src);
    lexer.seek(open);
    let first = lexer.next_token();
    debug_assert_eq!(first.kind, TokenKind::LBrace);
    let mut depth = 1i32;
    loop {
        let tok = lexer.next_token();
        match tok.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(tok.pos);
                }
            }
            TokenKind::Eof => return None,
            _ => {}
        }
    }
}

/// Parse one source file. Comments are not attached to the tree; callers
/// needing suppression-comment detection re-scan `src` directly (see
/// [`crate::validator`]).
pub fn parse_file(src: &str, file: &Path) -> Result<File> {
    let mut parser = Parser::new(src, file);
    parser.parse_file()
}
