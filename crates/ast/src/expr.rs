use std::sync::Arc;

use ace_span::{Ident, SrcLocation};

use crate::name::{SymbolName, TypeName};
use crate::token::{NumericSuffix, Op};

#[derive(Debug, Clone, PartialEq)]
pub enum ExprSyntax {
    Literal(Arc<LiteralExprSyntax>),
    SymbolRef(Arc<SymbolRefExprSyntax>),
    Paren(Arc<ParenExprSyntax>),
    MemberAccess(Arc<MemberAccessExprSyntax>),
    Call(Arc<CallExprSyntax>),
    StructInit(Arc<StructInitExprSyntax>),
    UserUnary(Arc<UserUnaryExprSyntax>),
    UserBinary(Arc<UserBinaryExprSyntax>),
    And(Arc<AndExprSyntax>),
    Or(Arc<OrExprSyntax>),
    Cast(Arc<CastExprSyntax>),
    AddressOf(Arc<AddressOfExprSyntax>),
    SizeOf(Arc<SizeOfExprSyntax>),
    DerefAs(Arc<DerefAsExprSyntax>),
    Box(Arc<BoxExprSyntax>),
    Unbox(Arc<UnboxExprSyntax>),
}

impl ExprSyntax {
    pub fn location(&self) -> SrcLocation {
        match self {
            ExprSyntax::Literal(expr) => expr.location,
            ExprSyntax::SymbolRef(expr) => expr.location,
            ExprSyntax::Paren(expr) => expr.location,
            ExprSyntax::MemberAccess(expr) => expr.location,
            ExprSyntax::Call(expr) => expr.location,
            ExprSyntax::StructInit(expr) => expr.location,
            ExprSyntax::UserUnary(expr) => expr.location,
            ExprSyntax::UserBinary(expr) => expr.location,
            ExprSyntax::And(expr) => expr.location,
            ExprSyntax::Or(expr) => expr.location,
            ExprSyntax::Cast(expr) => expr.location,
            ExprSyntax::AddressOf(expr) => expr.location,
            ExprSyntax::SizeOf(expr) => expr.location,
            ExprSyntax::DerefAs(expr) => expr.location,
            ExprSyntax::Box(expr) => expr.location,
            ExprSyntax::Unbox(expr) => expr.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    Int {
        value: u64,
        suffix: Option<NumericSuffix>,
    },
    Float {
        value: f64,
        suffix: NumericSuffix,
    },
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExprSyntax {
    pub location: SrcLocation,
    pub kind: LiteralKind,
}

/// A name in expression position; resolution decides what it denotes.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRefExprSyntax {
    pub location: SrcLocation,
    pub name: SymbolName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExprSyntax {
    pub location: SrcLocation,
    pub inner: ExprSyntax,
}

/// `expr.name` or `expr.name[args]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccessExprSyntax {
    pub location: SrcLocation,
    pub expr: ExprSyntax,
    pub name: Ident,
    pub template_args: Vec<TypeName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExprSyntax {
    pub location: SrcLocation,
    pub callee: ExprSyntax,
    pub args: Vec<ExprSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInitSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    /// Absent for field-punning: `Point { x, y }`.
    pub value: Option<ExprSyntax>,
}

/// `Name { field: expr, ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInitExprSyntax {
    pub location: SrcLocation,
    pub type_name: SymbolName,
    pub fields: Vec<FieldInitSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserUnaryExprSyntax {
    pub location: SrcLocation,
    pub op: Op,
    pub operand: ExprSyntax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserBinaryExprSyntax {
    pub location: SrcLocation,
    pub op: Op,
    pub lhs: ExprSyntax,
    pub rhs: ExprSyntax,
}

/// Short-circuiting `&&`; built in over `bool`, not an op trait.
#[derive(Debug, Clone, PartialEq)]
pub struct AndExprSyntax {
    pub location: SrcLocation,
    pub lhs: ExprSyntax,
    pub rhs: ExprSyntax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrExprSyntax {
    pub location: SrcLocation,
    pub lhs: ExprSyntax,
    pub rhs: ExprSyntax,
}

/// `cast[T](expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExprSyntax {
    pub location: SrcLocation,
    pub type_name: TypeName,
    pub expr: ExprSyntax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressOfExprSyntax {
    pub location: SrcLocation,
    pub expr: ExprSyntax,
}

/// `__size_of[T]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeOfExprSyntax {
    pub location: SrcLocation,
    pub type_name: TypeName,
}

/// `__deref_as[T](expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerefAsExprSyntax {
    pub location: SrcLocation,
    pub type_name: TypeName,
    pub expr: ExprSyntax,
}

/// `box(expr)` allocates a strong pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxExprSyntax {
    pub location: SrcLocation,
    pub expr: ExprSyntax,
}

/// `unbox(expr)` dereferences a strong pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboxExprSyntax {
    pub location: SrcLocation,
    pub expr: ExprSyntax,
}
