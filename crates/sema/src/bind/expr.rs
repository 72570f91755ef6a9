//! Expression binding: resolve names, member accesses, operator symbols
//! and construction fields against the scope graph while building typed
//! sema nodes. Resolution failures yield error-sentinel expressions so
//! the surrounding code keeps producing diagnostics.

use std::sync::Arc;

use ace_ast::{
    CallExprSyntax, ExprSyntax, LiteralKind, MemberAccessExprSyntax, NumericSuffix,
    StructInitExprSyntax, SymbolName, SymbolNameSection,
};
use ace_error::{Diagnosed, DiagnosticBag};

use crate::bind::ops::{op_fn_return_type, resolve_binary_op_fn, resolve_unary_op_fn};
use crate::bind::BindCtx;
use crate::compilation::Compilation;
use crate::diagnostics;
use crate::resolve::{self, ExpectedKind};
use crate::scope::ScopeId;
use crate::sema::{
    AddressOfExprSema, AndExprSema, BoxExprSema, CallExprSema, ConversionExprSema,
    DerefAsExprSema, ExprSema, FieldAccessExprSema, LiteralExprSema, OrExprSema, SizeOfExprSema,
    StructInitExprSema, UnboxExprSema, UserBinaryExprSema, UserUnaryExprSema, VarRefExprSema,
};
use crate::symbol::{SymbolCategory, SymbolId, SymbolKind};
use crate::ty::{ConversionKind, TypeInfo, ValueKind};

pub fn bind_expr(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &ExprSyntax,
    ctx: &mut BindCtx,
) -> Diagnosed<ExprSema> {
    let mut bag = DiagnosticBag::new();
    let sema = bind_expr_inner(comp, scope, syntax, ctx, &mut bag);
    Diagnosed::new(sema, bag)
}

fn bind_expr_inner(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &ExprSyntax,
    ctx: &mut BindCtx,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    match syntax {
        ExprSyntax::Literal(literal) => {
            let ty = literal_type(comp, &literal.kind);
            ExprSema::Literal(Arc::new(LiteralExprSema {
                location: literal.location,
                scope,
                literal: literal.kind.clone(),
                ty: TypeInfo::rvalue(ty),
            }))
        }

        ExprSyntax::Paren(paren) => bind_expr_inner(comp, scope, &paren.inner, ctx, bag),

        ExprSyntax::SymbolRef(symbol_ref) => {
            let resolved = resolve::resolve_symbol(
                comp,
                scope,
                &symbol_ref.name,
                None,
                ExpectedKind::Value,
            );
            match bag.collect_opt(resolved) {
                Some(var) => {
                    let ty = comp
                        .var_type(comp.get_root(var))
                        .unwrap_or(comp.error_symbols.error_type);
                    ExprSema::VarRef(Arc::new(VarRefExprSema {
                        location: symbol_ref.location,
                        scope,
                        var,
                        ty: TypeInfo::lvalue(ty),
                    }))
                }
                None => ExprSema::error(comp, symbol_ref.location, scope),
            }
        }

        ExprSyntax::MemberAccess(member) => bind_member_access(comp, scope, member, ctx, bag),

        ExprSyntax::Call(call) => bind_call(comp, scope, call, ctx, bag),

        ExprSyntax::StructInit(init) => bind_struct_init(comp, scope, init, ctx, bag),

        ExprSyntax::UserUnary(unary) => {
            let operand = bind_expr_inner(comp, scope, &unary.operand, ctx, bag);
            let op_fn = resolve_unary_op_fn(comp, &unary.op, operand.type_info().ty, bag);
            let return_type = op_fn_return_type(comp, op_fn);
            ExprSema::UserUnary(Arc::new(UserUnaryExprSema {
                location: unary.location,
                scope,
                op: unary.op,
                op_fn,
                operand,
                ty: TypeInfo::rvalue(return_type),
            }))
        }

        ExprSyntax::UserBinary(binary) => {
            let lhs = bind_expr_inner(comp, scope, &binary.lhs, ctx, bag);
            let rhs = bind_expr_inner(comp, scope, &binary.rhs, ctx, bag);
            let op_fn = resolve_binary_op_fn(
                comp,
                &binary.op,
                lhs.type_info().ty,
                rhs.type_info().ty,
                bag,
            );
            let return_type = op_fn_return_type(comp, op_fn);
            ExprSema::UserBinary(Arc::new(UserBinaryExprSema {
                location: binary.location,
                scope,
                op: binary.op,
                op_fn,
                lhs,
                rhs,
                ty: TypeInfo::rvalue(return_type),
            }))
        }

        ExprSyntax::And(and) => {
            let lhs = bind_expr_inner(comp, scope, &and.lhs, ctx, bag);
            let rhs = bind_expr_inner(comp, scope, &and.rhs, ctx, bag);
            ExprSema::And(Arc::new(AndExprSema {
                location: and.location,
                scope,
                lhs,
                rhs,
                ty: TypeInfo::rvalue(comp.natives.bool_),
            }))
        }

        ExprSyntax::Or(or) => {
            let lhs = bind_expr_inner(comp, scope, &or.lhs, ctx, bag);
            let rhs = bind_expr_inner(comp, scope, &or.rhs, ctx, bag);
            ExprSema::Or(Arc::new(OrExprSema {
                location: or.location,
                scope,
                lhs,
                rhs,
                ty: TypeInfo::rvalue(comp.natives.bool_),
            }))
        }

        ExprSyntax::Cast(cast) => {
            let expr = bind_expr_inner(comp, scope, &cast.expr, ctx, bag);
            let target = resolve::resolve_type_or_error(comp, scope, &cast.type_name, bag);
            ExprSema::Conversion(Arc::new(ConversionExprSema {
                location: cast.location,
                scope,
                kind: ConversionKind::Explicit,
                expr,
                ty: TypeInfo::rvalue(target),
            }))
        }

        ExprSyntax::AddressOf(address_of) => {
            let expr = bind_expr_inner(comp, scope, &address_of.expr, ctx, bag);
            let pointee = comp.get_root(expr.type_info().ty);
            let ty = comp.reference_type(pointee);
            ExprSema::AddressOf(Arc::new(AddressOfExprSema {
                location: address_of.location,
                scope,
                expr,
                ty: TypeInfo::rvalue(ty),
            }))
        }

        ExprSyntax::SizeOf(size_of) => {
            let target_type =
                resolve::resolve_type_or_error(comp, scope, &size_of.type_name, bag);
            ExprSema::SizeOf(Arc::new(SizeOfExprSema {
                location: size_of.location,
                scope,
                target_type,
                ty: TypeInfo::rvalue(comp.natives.int),
            }))
        }

        ExprSyntax::DerefAs(deref_as) => {
            let target_type =
                resolve::resolve_type_or_error(comp, scope, &deref_as.type_name, bag);
            let expr = bind_expr_inner(comp, scope, &deref_as.expr, ctx, bag);
            ExprSema::DerefAs(Arc::new(DerefAsExprSema {
                location: deref_as.location,
                scope,
                target_type,
                expr,
                ty: TypeInfo::lvalue(target_type),
            }))
        }

        ExprSyntax::Box(box_expr) => {
            let expr = bind_expr_inner(comp, scope, &box_expr.expr, ctx, bag);
            let inner = comp.get_root(expr.type_info().ty);
            let ty = comp.strong_ptr_type(inner);
            ExprSema::BoxExpr(Arc::new(BoxExprSema {
                location: box_expr.location,
                scope,
                expr,
                ty: TypeInfo::rvalue(ty),
            }))
        }

        ExprSyntax::Unbox(unbox) => {
            let expr = bind_expr_inner(comp, scope, &unbox.expr, ctx, bag);
            let stripped = comp.get_without_ref(expr.type_info().ty);
            let inner = match &comp.symbol(stripped).kind {
                SymbolKind::StrongPtr(wrapper) => comp.get_root(wrapper.inner),
                _ => comp.error_symbols.error_type,
            };
            ExprSema::Unbox(Arc::new(UnboxExprSema {
                location: unbox.location,
                scope,
                expr,
                ty: TypeInfo::lvalue(inner),
            }))
        }
    }
}

fn literal_type(comp: &Compilation, literal: &LiteralKind) -> SymbolId {
    match literal {
        LiteralKind::Int { suffix, .. } => match suffix {
            Some(suffix) => suffix_type(comp, *suffix),
            None => comp.natives.int,
        },
        LiteralKind::Float { suffix, .. } => suffix_type(comp, *suffix),
        LiteralKind::Bool(_) => comp.natives.bool_,
        LiteralKind::Str(_) => comp.natives.string,
    }
}

fn suffix_type(comp: &Compilation, suffix: NumericSuffix) -> SymbolId {
    match suffix {
        NumericSuffix::I8 => comp.natives.i8,
        NumericSuffix::I16 => comp.natives.i16,
        NumericSuffix::I32 => comp.natives.i32,
        NumericSuffix::I64 => comp.natives.i64,
        NumericSuffix::U8 => comp.natives.u8,
        NumericSuffix::U16 => comp.natives.u16,
        NumericSuffix::U32 => comp.natives.u32,
        NumericSuffix::U64 => comp.natives.u64,
        NumericSuffix::Int => comp.natives.int,
        NumericSuffix::F32 => comp.natives.f32,
        NumericSuffix::F64 => comp.natives.f64,
    }
}

fn member_name(member: &MemberAccessExprSyntax) -> SymbolName {
    SymbolName::new(
        vec![SymbolNameSection::with_args(
            member.name.clone(),
            member.template_args.clone(),
        )],
        false,
    )
}

fn bind_member_access(
    comp: &mut Compilation,
    scope: ScopeId,
    member: &MemberAccessExprSyntax,
    ctx: &mut BindCtx,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    let base = bind_expr_inner(comp, scope, &member.expr, ctx, bag);
    if base.is_error() {
        return ExprSema::error(comp, member.location, scope);
    }
    let resolved = resolve::resolve_instance_member(
        comp,
        scope,
        base.type_info().ty,
        &member_name(member),
        None,
    );
    let Some(symbol) = bag.collect_opt(resolved) else {
        return ExprSema::error(comp, member.location, scope);
    };
    match &comp.symbol(comp.get_root(symbol)).kind {
        SymbolKind::InstanceVar(var) => {
            let ty = var.var_type;
            ExprSema::FieldAccess(Arc::new(FieldAccessExprSema {
                location: member.location,
                scope,
                expr: base,
                field: symbol,
                ty: TypeInfo {
                    ty,
                    value_kind: ValueKind::LValue,
                },
            }))
        }
        _ => {
            bag.add(diagnostics::incorrect_symbol_category_error(
                member.name.location,
                SymbolCategory::Instance,
            ));
            ExprSema::error(comp, member.location, scope)
        }
    }
}

fn bind_call(
    comp: &mut Compilation,
    scope: ScopeId,
    call: &CallExprSyntax,
    ctx: &mut BindCtx,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    let mut args: Vec<ExprSema> = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        args.push(bind_expr_inner(comp, scope, arg, ctx, bag));
    }
    let arg_types: Vec<SymbolId> = args.iter().map(|arg| arg.type_info().ty).collect();

    match &call.callee {
        ExprSyntax::SymbolRef(symbol_ref) => {
            let resolved = resolve::resolve_symbol(
                comp,
                scope,
                &symbol_ref.name,
                Some(&arg_types),
                ExpectedKind::Callable,
            );
            let Some(function) = bag.collect_opt(resolved) else {
                return ExprSema::error(comp, call.location, scope);
            };
            finish_call(comp, scope, call, function, args)
        }
        ExprSyntax::MemberAccess(member) => {
            let base = bind_expr_inner(comp, scope, &member.expr, ctx, bag);
            if base.is_error() {
                return ExprSema::error(comp, call.location, scope);
            }
            let resolved = resolve::resolve_instance_member(
                comp,
                scope,
                base.type_info().ty,
                &member_name(member),
                Some(&arg_types),
            );
            let Some(function) = bag.collect_opt(resolved) else {
                return ExprSema::error(comp, call.location, scope);
            };
            let mut full_args = Vec::with_capacity(args.len() + 1);
            full_args.push(base);
            full_args.extend(args);
            finish_call(comp, scope, call, function, full_args)
        }
        other => {
            let callee = bind_expr_inner(comp, scope, other, ctx, bag);
            if !callee.is_error() {
                let found = callee.type_info().ty;
                bag.add(diagnostics::expected_function_error(
                    comp,
                    other.location(),
                    found,
                ));
            }
            ExprSema::error(comp, call.location, scope)
        }
    }
}

fn finish_call(
    comp: &mut Compilation,
    scope: ScopeId,
    call: &CallExprSyntax,
    function: SymbolId,
    args: Vec<ExprSema>,
) -> ExprSema {
    let root = comp.get_root(function);
    let return_type = match &comp.symbol(root).kind {
        SymbolKind::Function(data) => data.return_type,
        SymbolKind::Prototype(data) => data.return_type,
        _ => comp.error_symbols.error_type,
    };
    ExprSema::Call(Arc::new(CallExprSema {
        location: call.location,
        scope,
        function,
        args,
        ty: TypeInfo::rvalue(return_type),
    }))
}

fn bind_struct_init(
    comp: &mut Compilation,
    scope: ScopeId,
    init: &StructInitExprSyntax,
    ctx: &mut BindCtx,
    bag: &mut DiagnosticBag,
) -> ExprSema {
    let resolved =
        resolve::resolve_symbol(comp, scope, &init.type_name, None, ExpectedKind::Type);
    let Some(struct_type) = bag.collect_opt(resolved) else {
        return ExprSema::error(comp, init.location, scope);
    };
    let root = comp.get_root(struct_type);
    let Some(struct_fields) = comp.symbol(root).as_struct().map(|data| data.fields.clone())
    else {
        let location = init.type_name.location();
        bag.add(diagnostics::expected_struct_error(comp, location, root));
        return ExprSema::error(comp, init.location, scope);
    };

    let mut values: Vec<(SymbolId, ExprSema)> = Vec::new();
    for field_init in &init.fields {
        let field = struct_fields
            .iter()
            .copied()
            .find(|field| comp.symbol(*field).ident.name == field_init.name.name);
        let Some(field) = field else {
            bag.add(diagnostics::struct_has_no_field_named_error(
                comp,
                root,
                &field_init.name,
            ));
            continue;
        };
        if values.iter().any(|(seen, _)| *seen == field) {
            bag.add(diagnostics::struct_construction_var_specified_more_than_once_error(
                field_init.location,
                &field_init.name,
            ));
            continue;
        }
        let value = match &field_init.value {
            Some(value) => bind_expr_inner(comp, scope, value, ctx, bag),
            None => {
                // Field punning: `Point { x }` reads the variable `x`.
                let name = SymbolName::from_ident(field_init.name.clone());
                let resolved =
                    resolve::resolve_symbol(comp, scope, &name, None, ExpectedKind::Value);
                match bag.collect_opt(resolved) {
                    Some(var) => {
                        let ty = comp
                            .var_type(comp.get_root(var))
                            .unwrap_or(comp.error_symbols.error_type);
                        ExprSema::VarRef(Arc::new(VarRefExprSema {
                            location: field_init.location,
                            scope,
                            var,
                            ty: TypeInfo::lvalue(ty),
                        }))
                    }
                    None => ExprSema::error(comp, field_init.location, scope),
                }
            }
        };
        values.push((field, value));
    }

    let missing: Vec<SymbolId> = struct_fields
        .iter()
        .copied()
        .filter(|field| !values.iter().any(|(seen, _)| seen == field))
        .collect();
    if !missing.is_empty() {
        bag.add(diagnostics::missing_struct_construction_vars_error(
            comp,
            init.location,
            &missing,
        ));
    }

    values.sort_by_key(|(field, _)| match &comp.symbol(*field).kind {
        SymbolKind::InstanceVar(var) => var.index,
        _ => usize::MAX,
    });

    ExprSema::StructInit(Arc::new(StructInitExprSema {
        location: init.location,
        scope,
        struct_type: root,
        fields: values,
        ty: TypeInfo::rvalue(root),
    }))
}
