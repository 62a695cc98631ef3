//! Syntax tree for one source file. Comments are not attached as nodes
//! (spec §4.2 says comments are "retained"); LogCop retains them by
//! keeping the original source string alongside the tree and re-scanning
//! byte ranges for suppression markers (see [`crate::validator`]), rather
//! than threading a comment-group type through every node the way a full
//! pretty-printing-capable AST would.

use crate::types::Pos;

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
    /// Byte offset of the specifier as a whole (start of its alias, or of
    /// its path string if unaliased), used by the Patcher to insert a new
    /// specifier adjacent to the best-matching existing one.
    pub pos: Pos,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specs: Vec<ImportSpec>,
    /// `Some(pos of the opening '(')` for a parenthesised block, `None`
    /// for a standalone `import "path"` line.
    pub block_open: Option<Pos>,
    /// Byte offset of the `import` keyword itself.
    pub pos: Pos,
}

#[derive(Debug, Clone)]
pub struct Field {
    /// `None` marks an embedded field (the type name doubles as the
    /// field name per the subject language's embedding rule).
    pub name: Option<String>,
    pub type_name: String,
    pub type_is_ptr: bool,
    pub pos: Pos,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Struct { fields: Vec<Field> },
    Interface { methods: Vec<(String, Pos)> },
    /// `type Name Underlying` — an alias/defined type over something that
    /// isn't itself a struct or interface literal (e.g. `type ID int`).
    /// Carried only for completeness of the declaration scan; it never
    /// contributes methods or embeddings.
    Other,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub name_pos: Pos,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub type_name: String,
    pub is_ptr: bool,
}

/// An expression, restricted to the forms the Validator needs to
/// recognize a logging construct plus the address-of operator used in
/// its argument lists. Anything else collapses to `Unknown`.
#[derive(Debug, Clone)]
pub enum Expr {
    Ident(String, Pos),
    Selector(Box<Expr>, String, Pos),
    Call(Box<Expr>, Vec<Expr>, Pos),
    Addr(Box<Expr>, Pos),
    StringLit(String, Pos),
    Unknown(Pos),
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Ident(_, p)
            | Expr::Selector(_, _, p)
            | Expr::Call(_, _, p)
            | Expr::Addr(_, p)
            | Expr::StringLit(_, p)
            | Expr::Unknown(p) => *p,
        }
    }
}

/// The only statement shapes the Validator discriminates between; any
/// other statement (assignment, if, for, ...) parses as `Other`.
#[derive(Debug, Clone)]
pub enum Stmt {
    Defer(Expr),
    Other,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub open: Pos,
    pub close: Pos,
    pub first_stmt: Option<Stmt>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.first_stmt.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: String,
    pub name_pos: Pos,
    pub body: Option<Body>,
}

#[derive(Debug, Clone)]
pub enum TopDecl {
    Type(TypeDecl),
    Func(FuncDecl),
}

#[derive(Debug, Clone)]
pub struct File {
    pub package_name: String,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<TopDecl>,
    /// Byte offset of the first top-level declaration after imports, used
    /// by the Patcher when synthesising a standalone import line (spec
    /// §4.5 step 2).
    pub first_decl_pos: Option<Pos>,
}
