//! AST node definitions.
//!
//! The grammar admits exactly the constructs named below; there is no
//! catch-all `Expr::Other` or similar escape hatch, so a match over any of
//! these enums can (and should) be exhaustive.

use std::cell::Cell;

use impc_util::{Span, Symbol};

/// A whole translation unit: zero or more struct and function declarations,
/// followed by a top-level body that must end in a `return`.
#[derive(Debug, Clone)]
pub struct Program {
    pub structs: Vec<StructDecl>,
    pub functions: Vec<FunctionDecl>,
    pub body: Block,
}

/// One of the three primitive types or a user-defined struct name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    I32,
    I64,
    Bool,
    Named(Symbol),
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::I32 | Type::I64)
    }
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ty: Type,
    pub mutable: bool,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
    pub span: Span,
    /// Set by the item parser for functions nested inside a `struct` body;
    /// the generator lowers these to `StructName_method` with an implicit
    /// receiver parameter.
    pub receiver: Option<Symbol>,
}

/// `{ stmt* return_stmt? }`. A block's final return, if present, must be its
/// last statement — nothing may follow it.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub tail_return: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assign),
    If(If),
}

/// `type ["mut"] IDENT "{" expr { "," expr } "}"`.
///
/// `init` holds one expression for a primitive (`i32 x { 1 + 2 }`) or one
/// expression per field in declaration order for a struct literal
/// (`Point p { 1, 2 }`); the analyzer is the one that knows which, since it
/// depends on `ty`.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: Type,
    pub mutable: bool,
    pub name: Symbol,
    pub init: Vec<Expr>,
    pub span: Span,
}

/// `IDENT { "." IDENT } "=" expr`. `path[0]` is the base variable; any
/// further segments are field accesses on it.
#[derive(Debug, Clone)]
pub struct Assign {
    pub path: Vec<Symbol>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct If {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: i64,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Identifier {
        name: Symbol,
        span: Span,
    },
    /// `path.len() >= 2`: a chain of field accesses rooted at a variable.
    FieldAccess {
        path: Vec<Symbol>,
        span: Span,
    },
    FunctionCall {
        name: Symbol,
        args: Vec<Expr>,
        span: Span,
    },
    /// `receiver_path.method(args)`. `receiver_path` is the dotted chain
    /// before the final, call-position identifier.
    MethodCall {
        receiver_path: Vec<Symbol>,
        method: Symbol,
        args: Vec<Expr>,
        span: Span,
    },
    /// Inline struct literal (`Point{1, 2}`) used as a sub-expression,
    /// distinct from the `var_decl` initializer form which shares the same
    /// braces but never names the struct.
    StructInit {
        name: Symbol,
        fields: Vec<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
        /// Filled in by the semantic analyzer once operand types are known;
        /// `None` until then. A `Cell` lets the analyzer annotate through a
        /// shared `&Expr` without mutably re-threading the tree.
        ty: Cell<Option<Type>>,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Boolean { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::StructInit { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. } => *span,
        }
    }
}
