use std::sync::Arc;

use ace_span::{Ident, SrcLocation};

use crate::expr::ExprSyntax;
use crate::name::TypeName;
use crate::token::Op;

#[derive(Debug, Clone, PartialEq)]
pub enum StmtSyntax {
    Block(Arc<BlockStmtSyntax>),
    Expr(Arc<ExprStmtSyntax>),
    Var(Arc<VarStmtSyntax>),
    Assignment(Arc<AssignmentStmtSyntax>),
    CompoundAssignment(Arc<CompoundAssignmentStmtSyntax>),
    If(Arc<IfStmtSyntax>),
    While(Arc<WhileStmtSyntax>),
    Ret(Arc<RetStmtSyntax>),
    Exit(Arc<ExitStmtSyntax>),
    Assert(Arc<AssertStmtSyntax>),
}

impl StmtSyntax {
    pub fn location(&self) -> SrcLocation {
        match self {
            StmtSyntax::Block(stmt) => stmt.location,
            StmtSyntax::Expr(stmt) => stmt.location,
            StmtSyntax::Var(stmt) => stmt.location,
            StmtSyntax::Assignment(stmt) => stmt.location,
            StmtSyntax::CompoundAssignment(stmt) => stmt.location,
            StmtSyntax::If(stmt) => stmt.location,
            StmtSyntax::While(stmt) => stmt.location,
            StmtSyntax::Ret(stmt) => stmt.location,
            StmtSyntax::Exit(stmt) => stmt.location,
            StmtSyntax::Assert(stmt) => stmt.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmtSyntax {
    pub location: SrcLocation,
    pub stmts: Vec<StmtSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmtSyntax {
    pub location: SrcLocation,
    pub expr: ExprSyntax,
}

/// A local variable: `name: Type = init;`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarStmtSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub type_name: TypeName,
    pub initializer: Option<ExprSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmtSyntax {
    pub location: SrcLocation,
    pub lhs: ExprSyntax,
    pub rhs: ExprSyntax,
}

/// `lhs op= rhs`; lowered to a simple assignment over the op trait call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignmentStmtSyntax {
    pub location: SrcLocation,
    pub lhs: ExprSyntax,
    pub rhs: ExprSyntax,
    pub op: Op,
}

/// One `if`/`elif`/`else` chain: `bodies.len()` is `conditions.len()` when
/// there is no `else` block and one more when there is.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmtSyntax {
    pub location: SrcLocation,
    pub conditions: Vec<ExprSyntax>,
    pub bodies: Vec<Arc<BlockStmtSyntax>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmtSyntax {
    pub location: SrcLocation,
    pub condition: ExprSyntax,
    pub body: Arc<BlockStmtSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetStmtSyntax {
    pub location: SrcLocation,
    pub expr: Option<ExprSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitStmtSyntax {
    pub location: SrcLocation,
}

/// `assert cond;`, lowered to `if !cond { exit; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmtSyntax {
    pub location: SrcLocation,
    pub condition: ExprSyntax,
}
