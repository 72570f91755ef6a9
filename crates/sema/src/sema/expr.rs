//! Expression semas. Every expression carries its [`TypeInfo`]; operator
//! expressions carry the op function resolution made during binding and
//! lower into plain static calls.

use std::sync::Arc;

use ace_ast::{LiteralKind, Op};
use ace_error::{Diagnosed, DiagnosticBag};
use ace_span::SrcLocation;

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::scope::ScopeId;
use crate::sema::{convert_expr, LowerCtx, Rewrite, TypeCheckCtx};
use crate::symbol::{SymbolId, SymbolKind};
use crate::ty::{ConversionKind, TypeInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum ExprSema {
    Literal(Arc<LiteralExprSema>),
    VarRef(Arc<VarRefExprSema>),
    FieldAccess(Arc<FieldAccessExprSema>),
    Call(Arc<CallExprSema>),
    StructInit(Arc<StructInitExprSema>),
    Conversion(Arc<ConversionExprSema>),
    UserUnary(Arc<UserUnaryExprSema>),
    UserBinary(Arc<UserBinaryExprSema>),
    And(Arc<AndExprSema>),
    Or(Arc<OrExprSema>),
    AddressOf(Arc<AddressOfExprSema>),
    SizeOf(Arc<SizeOfExprSema>),
    DerefAs(Arc<DerefAsExprSema>),
    BoxExpr(Arc<BoxExprSema>),
    Unbox(Arc<UnboxExprSema>),
    Error(Arc<ErrorExprSema>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub literal: LiteralKind,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarRefExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub var: SymbolId,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub expr: ExprSema,
    pub field: SymbolId,
    pub ty: TypeInfo,
}

/// A call in static form; instance calls carry their receiver as the
/// first argument, already converted to the self parameter type.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub function: SymbolId,
    pub args: Vec<ExprSema>,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructInitExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub struct_type: SymbolId,
    /// `(field symbol, value)` in field-index order.
    pub fields: Vec<(SymbolId, ExprSema)>,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub kind: ConversionKind,
    pub expr: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserUnaryExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub op: Op,
    pub op_fn: SymbolId,
    pub operand: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserBinaryExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub op: Op,
    pub op_fn: SymbolId,
    pub lhs: ExprSema,
    pub rhs: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AndExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub lhs: ExprSema,
    pub rhs: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub lhs: ExprSema,
    pub rhs: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressOfExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub expr: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeOfExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub target_type: SymbolId,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerefAsExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub target_type: SymbolId,
    pub expr: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub expr: ExprSema,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnboxExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub expr: ExprSema,
    pub ty: TypeInfo,
}

/// Sentinel expression standing where nothing could be built; carries the
/// error type so downstream checks stay quiet.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorExprSema {
    pub location: SrcLocation,
    pub scope: ScopeId,
    pub ty: TypeInfo,
}

impl ExprSema {
    pub fn location(&self) -> SrcLocation {
        match self {
            ExprSema::Literal(expr) => expr.location,
            ExprSema::VarRef(expr) => expr.location,
            ExprSema::FieldAccess(expr) => expr.location,
            ExprSema::Call(expr) => expr.location,
            ExprSema::StructInit(expr) => expr.location,
            ExprSema::Conversion(expr) => expr.location,
            ExprSema::UserUnary(expr) => expr.location,
            ExprSema::UserBinary(expr) => expr.location,
            ExprSema::And(expr) => expr.location,
            ExprSema::Or(expr) => expr.location,
            ExprSema::AddressOf(expr) => expr.location,
            ExprSema::SizeOf(expr) => expr.location,
            ExprSema::DerefAs(expr) => expr.location,
            ExprSema::BoxExpr(expr) => expr.location,
            ExprSema::Unbox(expr) => expr.location,
            ExprSema::Error(expr) => expr.location,
        }
    }

    pub fn scope(&self) -> ScopeId {
        match self {
            ExprSema::Literal(expr) => expr.scope,
            ExprSema::VarRef(expr) => expr.scope,
            ExprSema::FieldAccess(expr) => expr.scope,
            ExprSema::Call(expr) => expr.scope,
            ExprSema::StructInit(expr) => expr.scope,
            ExprSema::Conversion(expr) => expr.scope,
            ExprSema::UserUnary(expr) => expr.scope,
            ExprSema::UserBinary(expr) => expr.scope,
            ExprSema::And(expr) => expr.scope,
            ExprSema::Or(expr) => expr.scope,
            ExprSema::AddressOf(expr) => expr.scope,
            ExprSema::SizeOf(expr) => expr.scope,
            ExprSema::DerefAs(expr) => expr.scope,
            ExprSema::BoxExpr(expr) => expr.scope,
            ExprSema::Unbox(expr) => expr.scope,
            ExprSema::Error(expr) => expr.scope,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        match self {
            ExprSema::Literal(expr) => expr.ty,
            ExprSema::VarRef(expr) => expr.ty,
            ExprSema::FieldAccess(expr) => expr.ty,
            ExprSema::Call(expr) => expr.ty,
            ExprSema::StructInit(expr) => expr.ty,
            ExprSema::Conversion(expr) => expr.ty,
            ExprSema::UserUnary(expr) => expr.ty,
            ExprSema::UserBinary(expr) => expr.ty,
            ExprSema::And(expr) => expr.ty,
            ExprSema::Or(expr) => expr.ty,
            ExprSema::AddressOf(expr) => expr.ty,
            ExprSema::SizeOf(expr) => expr.ty,
            ExprSema::DerefAs(expr) => expr.ty,
            ExprSema::BoxExpr(expr) => expr.ty,
            ExprSema::Unbox(expr) => expr.ty,
            ExprSema::Error(expr) => expr.ty,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExprSema::Error(_))
    }

    pub fn error(comp: &Compilation, location: SrcLocation, scope: ScopeId) -> ExprSema {
        ExprSema::Error(Arc::new(ErrorExprSema {
            location,
            scope,
            ty: TypeInfo::rvalue(comp.error_symbols.error_type),
        }))
    }

    pub fn conversion(
        _comp: &Compilation,
        kind: ConversionKind,
        expr: ExprSema,
        ty: TypeInfo,
    ) -> ExprSema {
        ExprSema::Conversion(Arc::new(ConversionExprSema {
            location: expr.location(),
            scope: expr.scope(),
            kind,
            expr,
            ty,
        }))
    }

    /// Verify this expression's invariants and rewrite children into their
    /// type-checked forms. Call arguments and struct-init fields are
    /// wrapped with the conversions the parameter types require.
    pub fn create_type_checked(
        &self,
        comp: &mut Compilation,
        ctx: &TypeCheckCtx,
    ) -> Diagnosed<ExprSema> {
        let mut bag = DiagnosticBag::new();
        let checked = match self {
            ExprSema::Literal(_)
            | ExprSema::VarRef(_)
            | ExprSema::SizeOf(_)
            | ExprSema::Error(_) => self.clone(),

            ExprSema::FieldAccess(expr) => {
                let base = bag.collect(expr.expr.create_type_checked(comp, ctx));
                if base == expr.expr {
                    self.clone()
                } else {
                    ExprSema::FieldAccess(Arc::new(FieldAccessExprSema {
                        expr: base,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::Call(expr) => {
                let function = comp.get_root(expr.function);
                let param_types: Vec<SymbolId> = match comp.symbol(function).as_function() {
                    Some(function) => function
                        .params
                        .iter()
                        .filter_map(|param| comp.var_type(*param))
                        .collect(),
                    None => {
                        if !comp.is_error_symbol(function) {
                            bag.add(diagnostics::expected_function_error(
                                comp,
                                expr.location,
                                function,
                            ));
                        }
                        return Diagnosed::new(self.clone(), bag);
                    }
                };
                let mut args = Vec::with_capacity(expr.args.len());
                for (index, arg) in expr.args.iter().enumerate() {
                    let arg = bag.collect(arg.create_type_checked(comp, ctx));
                    let arg = match param_types.get(index) {
                        Some(target) => convert_expr(comp, arg, *target, &mut bag),
                        None => arg,
                    };
                    args.push(arg);
                }
                if args == expr.args {
                    self.clone()
                } else {
                    ExprSema::Call(Arc::new(CallExprSema {
                        args,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::StructInit(expr) => {
                let mut fields = Vec::with_capacity(expr.fields.len());
                for (field, value) in &expr.fields {
                    let value = bag.collect(value.create_type_checked(comp, ctx));
                    let value = match comp.var_type(*field) {
                        Some(target) => convert_expr(comp, value, target, &mut bag),
                        None => value,
                    };
                    fields.push((*field, value));
                }
                if fields == expr.fields {
                    self.clone()
                } else {
                    ExprSema::StructInit(Arc::new(StructInitExprSema {
                        fields,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::Conversion(expr) => {
                let inner = bag.collect(expr.expr.create_type_checked(comp, ctx));
                if inner == expr.expr {
                    self.clone()
                } else {
                    ExprSema::Conversion(Arc::new(ConversionExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::UserUnary(expr) => {
                let operand = bag.collect(expr.operand.create_type_checked(comp, ctx));
                if operand == expr.operand {
                    self.clone()
                } else {
                    ExprSema::UserUnary(Arc::new(UserUnaryExprSema {
                        operand,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::UserBinary(expr) => {
                let lhs = bag.collect(expr.lhs.create_type_checked(comp, ctx));
                let rhs = bag.collect(expr.rhs.create_type_checked(comp, ctx));
                if lhs == expr.lhs && rhs == expr.rhs {
                    self.clone()
                } else {
                    ExprSema::UserBinary(Arc::new(UserBinaryExprSema {
                        lhs,
                        rhs,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::And(expr) => {
                let bool_ = comp.natives.bool_;
                let lhs = bag.collect(expr.lhs.create_type_checked(comp, ctx));
                let lhs = convert_expr(comp, lhs, bool_, &mut bag);
                let rhs = bag.collect(expr.rhs.create_type_checked(comp, ctx));
                let rhs = convert_expr(comp, rhs, bool_, &mut bag);
                if lhs == expr.lhs && rhs == expr.rhs {
                    self.clone()
                } else {
                    ExprSema::And(Arc::new(AndExprSema {
                        lhs,
                        rhs,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::Or(expr) => {
                let bool_ = comp.natives.bool_;
                let lhs = bag.collect(expr.lhs.create_type_checked(comp, ctx));
                let lhs = convert_expr(comp, lhs, bool_, &mut bag);
                let rhs = bag.collect(expr.rhs.create_type_checked(comp, ctx));
                let rhs = convert_expr(comp, rhs, bool_, &mut bag);
                if lhs == expr.lhs && rhs == expr.rhs {
                    self.clone()
                } else {
                    ExprSema::Or(Arc::new(OrExprSema {
                        lhs,
                        rhs,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::AddressOf(expr) => {
                let inner = bag.collect(expr.expr.create_type_checked(comp, ctx));
                if inner == expr.expr {
                    self.clone()
                } else {
                    ExprSema::AddressOf(Arc::new(AddressOfExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::DerefAs(expr) => {
                let inner = bag.collect(expr.expr.create_type_checked(comp, ctx));
                if inner == expr.expr {
                    self.clone()
                } else {
                    ExprSema::DerefAs(Arc::new(DerefAsExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::BoxExpr(expr) => {
                let inner = bag.collect(expr.expr.create_type_checked(comp, ctx));
                if inner == expr.expr {
                    self.clone()
                } else {
                    ExprSema::BoxExpr(Arc::new(BoxExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                }
            }

            ExprSema::Unbox(expr) => {
                let inner = bag.collect(expr.expr.create_type_checked(comp, ctx));
                let inner_root = comp.get_root(inner.type_info().ty);
                let is_strong = matches!(
                    comp.symbol(comp.get_without_ref(inner_root)).kind,
                    SymbolKind::StrongPtr(_)
                );
                if !is_strong && !comp.is_error_symbol(inner_root) {
                    let found = inner.type_info().ty;
                    let expected = comp.strong_ptr_type(found);
                    bag.add(diagnostics::mismatched_type_error(
                        comp, expr.location, expected, found,
                    ));
                }
                if inner == expr.expr {
                    self.clone()
                } else {
                    ExprSema::Unbox(Arc::new(UnboxExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                }
            }
        };
        Diagnosed::new(checked, bag)
    }

    /// Rewrite into a simpler form: user operator expressions become
    /// static calls over their resolved op functions. Idempotent on its
    /// output.
    pub fn create_lowered(
        &self,
        comp: &mut Compilation,
        ctx: &LowerCtx,
    ) -> Diagnosed<Rewrite<ExprSema>> {
        let mut bag = DiagnosticBag::new();
        let rewrite = match self {
            ExprSema::UserUnary(expr) => {
                let operand = lower_child(comp, ctx, &expr.operand, &mut bag);
                let self_target = op_self_param_type(comp, expr.op_fn);
                let operand = match self_target {
                    Some(target) => convert_expr(comp, operand, target, &mut bag),
                    None => operand,
                };
                Rewrite::Changed(ExprSema::Call(Arc::new(CallExprSema {
                    location: expr.location,
                    scope: expr.scope,
                    function: expr.op_fn,
                    args: vec![operand],
                    ty: expr.ty,
                })))
            }
            ExprSema::UserBinary(expr) => {
                let lhs = lower_child(comp, ctx, &expr.lhs, &mut bag);
                let rhs = lower_child(comp, ctx, &expr.rhs, &mut bag);
                let lhs = match op_self_param_type(comp, expr.op_fn) {
                    Some(target) => convert_expr(comp, lhs, target, &mut bag),
                    None => lhs,
                };
                let rhs = match op_rhs_param_type(comp, expr.op_fn) {
                    Some(target) => convert_expr(comp, rhs, target, &mut bag),
                    None => rhs,
                };
                Rewrite::Changed(ExprSema::Call(Arc::new(CallExprSema {
                    location: expr.location,
                    scope: expr.scope,
                    function: expr.op_fn,
                    args: vec![lhs, rhs],
                    ty: expr.ty,
                })))
            }

            ExprSema::FieldAccess(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::FieldAccess(Arc::new(FieldAccessExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }
            ExprSema::Call(expr) => {
                let mut changed = false;
                let mut args = Vec::with_capacity(expr.args.len());
                for arg in &expr.args {
                    let lowered = bag.collect(arg.create_lowered(comp, ctx));
                    changed |= lowered.is_changed();
                    args.push(lowered.into_node(arg));
                }
                if changed {
                    Rewrite::Changed(ExprSema::Call(Arc::new(CallExprSema {
                        args,
                        ..(**expr).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            ExprSema::StructInit(expr) => {
                let mut changed = false;
                let mut fields = Vec::with_capacity(expr.fields.len());
                for (field, value) in &expr.fields {
                    let lowered = bag.collect(value.create_lowered(comp, ctx));
                    changed |= lowered.is_changed();
                    fields.push((*field, lowered.into_node(value)));
                }
                if changed {
                    Rewrite::Changed(ExprSema::StructInit(Arc::new(StructInitExprSema {
                        fields,
                        ..(**expr).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            ExprSema::Conversion(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::Conversion(Arc::new(ConversionExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }
            ExprSema::And(expr) => {
                let lhs = bag.collect(expr.lhs.create_lowered(comp, ctx));
                let rhs = bag.collect(expr.rhs.create_lowered(comp, ctx));
                if lhs.is_changed() || rhs.is_changed() {
                    Rewrite::Changed(ExprSema::And(Arc::new(AndExprSema {
                        lhs: lhs.into_node(&expr.lhs),
                        rhs: rhs.into_node(&expr.rhs),
                        ..(**expr).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            ExprSema::Or(expr) => {
                let lhs = bag.collect(expr.lhs.create_lowered(comp, ctx));
                let rhs = bag.collect(expr.rhs.create_lowered(comp, ctx));
                if lhs.is_changed() || rhs.is_changed() {
                    Rewrite::Changed(ExprSema::Or(Arc::new(OrExprSema {
                        lhs: lhs.into_node(&expr.lhs),
                        rhs: rhs.into_node(&expr.rhs),
                        ..(**expr).clone()
                    })))
                } else {
                    Rewrite::Unchanged
                }
            }
            ExprSema::AddressOf(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::AddressOf(Arc::new(AddressOfExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }
            ExprSema::DerefAs(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::DerefAs(Arc::new(DerefAsExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }
            ExprSema::BoxExpr(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::BoxExpr(Arc::new(BoxExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }
            ExprSema::Unbox(expr) => {
                lower_wrap(comp, ctx, &expr.expr, &mut bag, |inner| {
                    ExprSema::Unbox(Arc::new(UnboxExprSema {
                        expr: inner,
                        ..(**expr).clone()
                    }))
                })
            }

            ExprSema::Literal(_)
            | ExprSema::VarRef(_)
            | ExprSema::SizeOf(_)
            | ExprSema::Error(_) => Rewrite::Unchanged,
        };
        Diagnosed::new(rewrite, bag)
    }
}

fn lower_child(
    comp: &mut Compilation,
    ctx: &LowerCtx,
    child: &ExprSema,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    bag.collect(child.create_lowered(comp, ctx)).into_node(child)
}

fn lower_wrap(
    comp: &mut Compilation,
    ctx: &LowerCtx,
    child: &ExprSema,
    bag: &mut DiagnosticBag,
    rebuild: impl FnOnce(ExprSema) -> ExprSema,
) -> Rewrite<ExprSema> {
    let lowered = bag.collect(child.create_lowered(comp, ctx));
    if lowered.is_changed() {
        Rewrite::Changed(rebuild(lowered.into_node(child)))
    } else {
        Rewrite::Unchanged
    }
}

fn op_self_param_type(comp: &Compilation, op_fn: SymbolId) -> Option<SymbolId> {
    let function = comp.symbol(comp.get_root(op_fn)).as_function()?;
    comp.var_type(*function.params.first()?)
}

fn op_rhs_param_type(comp: &Compilation, op_fn: SymbolId) -> Option<SymbolId> {
    let function = comp.symbol(comp.get_root(op_fn)).as_function()?;
    comp.var_type(*function.params.get(1)?)
}
