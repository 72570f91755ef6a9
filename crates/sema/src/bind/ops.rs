//! Operator resolution. `a + b` resolves through the op trait surface on
//! each operand's type: both operands naming the same function accepts
//! it, disagreement is ambiguous, neither is undeclared. Error-typed
//! operands short-circuit to the error function silently.

use ace_ast::Op;
use ace_error::DiagnosticBag;

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::instantiate;
use crate::natives::op_method_name;
use crate::scope::{template_key, ScopeId};
use crate::symbol::{SymbolId, SymbolKind};
use crate::ty::TypeInfo;

/// Probe one operand type's lookup surface for a usable op function;
/// silent on failure.
fn find_op_fn(
    comp: &mut Compilation,
    operand: SymbolId,
    method: &str,
    arg_types: &[SymbolId],
) -> Option<SymbolId> {
    let derefed = comp.get_derefed(operand);
    let self_scope = comp.body_scope(derefed)?;
    let mut scopes: Vec<ScopeId> = vec![self_scope];
    scopes.extend(comp.scope(self_scope).associations.iter().copied());
    if let Some(template) = comp.type_template(derefed) {
        if let Some(template_scope) = comp.body_scope(template) {
            for association in comp.scope(template_scope).associations.iter().copied() {
                if !scopes.contains(&association) {
                    scopes.push(association);
                }
            }
        }
    }

    let impl_args = comp.collect_type_args(derefed);
    let template = template_key(method);

    for scope in scopes {
        for candidate in comp.scope(scope).symbols_named(method).to_vec() {
            if op_fn_accepts(comp, candidate, arg_types) {
                return Some(candidate);
            }
        }
        for candidate in comp.scope(scope).symbols_named(&template).to_vec() {
            let location = comp.symbol(candidate).ident.location;
            let instantiated = instantiate::resolve_or_instantiate(
                comp,
                candidate,
                &[],
                &impl_args,
                Some(&arg_types[1..]),
                location,
            );
            let mut scratch = DiagnosticBag::new();
            if let Some(instance) = scratch.collect_opt(instantiated) {
                if op_fn_accepts(comp, instance, arg_types) {
                    return Some(instance);
                }
            }
        }
    }
    None
}

fn op_fn_accepts(comp: &Compilation, candidate: SymbolId, arg_types: &[SymbolId]) -> bool {
    let root = comp.get_root(candidate);
    let Some(function) = comp.symbol(root).as_function() else {
        return false;
    };
    if function.params.len() != arg_types.len() {
        return false;
    }
    function
        .params
        .iter()
        .zip(arg_types)
        .all(|(param, arg)| match comp.var_type(*param) {
            Some(target) => {
                comp.are_types_convertible(TypeInfo::lvalue(*arg), target)
                    || comp.are_types_convertible(TypeInfo::rvalue(*arg), target)
            }
            None => false,
        })
}

pub fn resolve_binary_op_fn(
    comp: &mut Compilation,
    op: &Op,
    lhs: SymbolId,
    rhs: SymbolId,
    bag: &mut DiagnosticBag,
) -> SymbolId {
    if comp.is_error_symbol(lhs) || comp.is_error_symbol(rhs) {
        return comp.error_symbols.error_function;
    }
    let method = op_method_name(op.kind);
    let args = [lhs, rhs];
    let via_lhs = find_op_fn(comp, lhs, method, &args);
    let via_rhs = find_op_fn(comp, rhs, method, &args);
    match (via_lhs, via_rhs) {
        (Some(lhs_fn), Some(rhs_fn)) => {
            if comp.get_root(lhs_fn) == comp.get_root(rhs_fn) {
                lhs_fn
            } else {
                bag.add(diagnostics::ambiguous_binary_op_error(comp, op, lhs, rhs));
                comp.error_symbols.error_function
            }
        }
        (Some(found), None) | (None, Some(found)) => found,
        (None, None) => {
            bag.add(diagnostics::undeclared_binary_op_error(comp, op, lhs, rhs));
            comp.error_symbols.error_function
        }
    }
}

pub fn resolve_unary_op_fn(
    comp: &mut Compilation,
    op: &Op,
    operand: SymbolId,
    bag: &mut DiagnosticBag,
) -> SymbolId {
    if comp.is_error_symbol(operand) {
        return comp.error_symbols.error_function;
    }
    let method = op_method_name(op.kind);
    match find_op_fn(comp, operand, method, &[operand]) {
        Some(found) => found,
        None => {
            bag.add(diagnostics::undeclared_unary_op_error(comp, op, operand));
            comp.error_symbols.error_function
        }
    }
}

/// The declared return type of a resolved op function, for typing the
/// operator expression.
pub fn op_fn_return_type(comp: &Compilation, op_fn: SymbolId) -> SymbolId {
    match &comp.symbol(comp.get_root(op_fn)).kind {
        SymbolKind::Function(function) => function.return_type,
        _ => comp.error_symbols.error_type,
    }
}
