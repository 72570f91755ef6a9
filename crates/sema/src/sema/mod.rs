//! The sema tree: the typed, resolved counterpart of the syntax tree.
//!
//! Nodes are immutable and share unchanged children through `Arc`. Each
//! node offers `create_type_checked` (verify invariants, insert
//! conversions, rewrite children) and `create_lowered` (rewrite into a
//! simpler form); the lowering driver iterates until a node reports
//! [`Rewrite::Unchanged`].

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use ace_error::DiagnosticBag;

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::SymbolId;
use crate::ty::{conversion, ConversionKind, TypeInfo, ValueKind};

/// Result of one rewrite step. The transformation is monotone: once a
/// node answers `Unchanged` it stays unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite<T> {
    Unchanged,
    Changed(T),
}

impl<T: Clone> Rewrite<T> {
    pub fn into_node(self, original: &T) -> T {
        match self {
            Rewrite::Unchanged => original.clone(),
            Rewrite::Changed(node) => node,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Rewrite::Changed(_))
    }
}

/// What type-checking needs from the enclosing context: the function's
/// declared return type.
#[derive(Debug, Clone, Copy)]
pub struct TypeCheckCtx {
    pub return_type: SymbolId,
}

/// Lowering currently needs nothing from its context.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCtx;

/// Wrap `expr` so it is acceptable where `target` is expected, or diagnose
/// a mismatch and hand the expression back untouched so checking
/// continues.
pub fn convert_expr(
    comp: &mut Compilation,
    expr: ExprSema,
    target: SymbolId,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    let info = expr.type_info();
    match conversion(comp, info, target) {
        Some(ConversionKind::Identity) => expr,
        Some(kind) => {
            let value_kind = match kind {
                ConversionKind::Deref => ValueKind::LValue,
                _ => ValueKind::RValue,
            };
            ExprSema::conversion(comp, kind, expr, TypeInfo { ty: target, value_kind })
        }
        None => {
            bag.add(diagnostics::mismatched_type_error(
                comp,
                expr.location(),
                target,
                info.ty,
            ));
            expr
        }
    }
}
