//! A small hand-rolled lexer for the declaration surface LogCop needs:
//! package/import clauses, type/func declarations, struct fields,
//! interface method sets, and the handful of expression forms the
//! Validator inspects in a method's first statement.
//!
//! This is deliberately not a full language lexer — spec.md's Non-goals
//! rule out evaluating method bodies, so statement text beyond the first
//! statement is only ever skipped via brace/paren balance counting, never
//! tokenized into a full statement grammar.

use crate::types::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// Unescaped contents of a double- or back-quoted string literal.
    Str(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Star,
    Amp,
    Semi,
    /// Any other single-byte punctuation LogCop doesn't need to
    /// distinguish further (`+`, `=`, `:`, digits, ...).
    Other(char),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Skip spaces/tabs/carriage-returns and comments, but stop at a
    /// newline rather than consuming it — newlines are significant (see
    /// `next_token`), the one ASI-like wrinkle this grammar borrows from
    /// the subject language to make struct fields and interface methods
    /// parseable without requiring explicit `;` separators.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.pos < self.bytes.len() {
                        if self.peek_byte() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Lex the next non-trivia token, leaving `self.pos` positioned just
    /// past it. A run of one or more newlines (and any whitespace or
    /// comments around them) collapses into a single `Semi` token, the
    /// same kind an explicit `;` produces — both are "terminators" to the
    /// parser.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;

        if self.peek_byte() == Some(b'\n') {
            while self.peek_byte() == Some(b'\n') {
                self.pos += 1;
                self.skip_trivia();
            }
            return Token {
                kind: TokenKind::Semi,
                pos: start,
            };
        }

        let Some(b) = self.peek_byte() else {
            return Token {
                kind: TokenKind::Eof,
                pos: start,
            };
        };

        let kind = match b {
            b'(' => {
                self.pos += 1;
                TokenKind::LParen
            }
            b')' => {
                self.pos += 1;
                TokenKind::RParen
            }
            b'{' => {
                self.pos += 1;
                TokenKind::LBrace
            }
            b'}' => {
                self.pos += 1;
                TokenKind::RBrace
            }
            b'[' => {
                self.pos += 1;
                TokenKind::LBracket
            }
            b']' => {
                self.pos += 1;
                TokenKind::RBracket
            }
            b'.' => {
                self.pos += 1;
                TokenKind::Dot
            }
            b',' => {
                self.pos += 1;
                TokenKind::Comma
            }
            b'*' => {
                self.pos += 1;
                TokenKind::Star
            }
            b'&' => {
                self.pos += 1;
                TokenKind::Amp
            }
            b';' => {
                self.pos += 1;
                TokenKind::Semi
            }
            b'"' | b'`' => self.lex_string(b),
            c if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident(),
            _ => {
                // Decode one UTF-8 scalar so non-ASCII punctuation (or
                // anything we don't special-case) never splits a
                // multi-byte char.
                let ch = self.src[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                self.pos += ch.len_utf8();
                TokenKind::Other(ch)
            }
        };

        Token { kind, pos: start }
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        TokenKind::Ident(self.src[start..self.pos].to_string())
    }

    fn lex_string(&mut self, quote: u8) -> TokenKind {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == quote {
                break;
            }
            if quote == b'"' && b == b'\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
        }
        let value = self.src[start..self.pos.min(self.src.len())].to_string();
        if self.peek_byte() == Some(quote) {
            self.pos += 1;
        }
        TokenKind::Str(value)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor. Only ever called with an offset previously
    /// returned by this same lexer (a token boundary), so it can never
    /// land mid-codepoint.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_idents_and_punct() {
        assert_eq!(
            kinds("foo.Bar(1)"),
            vec![
                TokenKind::Ident("foo".into()),
                TokenKind::Dot,
                TokenKind::Ident("Bar".into()),
                TokenKind::LParen,
                TokenKind::Other('1'),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments_newline_becomes_semi() {
        assert_eq!(
            kinds("a // comment\n/* block */ b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Semi,
                TokenKind::Ident("b".into()),
            ]
        );
    }

    #[test]
    fn lexes_string_literals() {
        assert_eq!(
            kinds(r#""a/b" `c/d`"#),
            vec![
                TokenKind::Str("a/b".into()),
                TokenKind::Str("c/d".into()),
            ]
        );
    }

    #[test]
    fn comment_containing_sentinel_is_skipped_as_trivia() {
        // The lexer itself never classifies comments; suppression
        // detection re-scans raw source text instead (see validator).
        assert_eq!(
            kinds("//nologcall\nfmt.Println()"),
            vec![
                TokenKind::Semi,
                TokenKind::Ident("fmt".into()),
                TokenKind::Dot,
                TokenKind::Ident("Println".into()),
                TokenKind::LParen,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn multiple_blank_lines_collapse_to_one_semi() {
        assert_eq!(
            kinds("a\n\n\nb"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Semi,
                TokenKind::Ident("b".into()),
            ]
        );
    }
}
