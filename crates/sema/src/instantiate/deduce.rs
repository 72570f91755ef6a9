//! Template-argument deduction: structural unification of call-site
//! argument types against the placeholder parameter types of a template.

use ace_error::{DiagnosticBag, Expected};
use ace_span::SrcLocation;

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SymbolId, SymbolKind};

enum UnifyOutcome {
    Ok,
    Mismatch,
    Conflict {
        param: SymbolId,
        deduced: SymbolId,
        conflicting: SymbolId,
    },
}

/// Unify one argument type against one parameter type, recording
/// deductions for the parameters of `template`. References never deduce
/// references, so both sides are stripped first.
fn unify(
    comp: &Compilation,
    template: SymbolId,
    arg: SymbolId,
    param: SymbolId,
    deduced: &mut [Option<SymbolId>],
) -> UnifyOutcome {
    let arg = comp.get_without_ref(arg);
    let param = comp.get_without_ref(param);
    let param_root = comp.get_root(param);

    if let SymbolKind::TemplateParamType(placeholder) = &comp.symbol(param_root).kind {
        if placeholder.owner == Some(template) && !placeholder.is_impl_param {
            let slot = &mut deduced[placeholder.index];
            return match slot {
                Some(existing) if !comp.types_equal(*existing, arg) => UnifyOutcome::Conflict {
                    param: param_root,
                    deduced: *existing,
                    conflicting: arg,
                },
                _ => {
                    *slot = Some(comp.get_root(arg));
                    UnifyOutcome::Ok
                }
            };
        }
        // A foreign placeholder (an enclosing impl's parameter, a trait's
        // `Self`) matches anything without recording.
        return UnifyOutcome::Ok;
    }

    let arg_root = comp.get_root(arg);
    match (&comp.symbol(arg_root).kind, &comp.symbol(param_root).kind) {
        (SymbolKind::StrongPtr(lhs), SymbolKind::StrongPtr(rhs))
        | (SymbolKind::WeakPtr(lhs), SymbolKind::WeakPtr(rhs)) => {
            unify(comp, template, lhs.inner, rhs.inner, deduced)
        }
        (SymbolKind::Struct(lhs), SymbolKind::Struct(rhs)) => {
            match (lhs.template, rhs.template) {
                (Some(lhs_template), Some(rhs_template)) if lhs_template == rhs_template => {
                    let lhs_args = lhs.template_args.clone();
                    let rhs_args = rhs.template_args.clone();
                    for (lhs_arg, rhs_arg) in lhs_args.iter().zip(&rhs_args) {
                        match unify(comp, template, *lhs_arg, *rhs_arg, deduced) {
                            UnifyOutcome::Ok => {}
                            other => return other,
                        }
                    }
                    UnifyOutcome::Ok
                }
                _ => {
                    if arg_root == param_root {
                        UnifyOutcome::Ok
                    } else {
                        UnifyOutcome::Mismatch
                    }
                }
            }
        }
        _ => {
            if arg_root == param_root {
                UnifyOutcome::Ok
            } else {
                UnifyOutcome::Mismatch
            }
        }
    }
}

/// Produce the full argument tuple for `template` from explicit arguments
/// plus, for functions, the call-site argument types.
pub fn deduce_args(
    comp: &Compilation,
    template: SymbolId,
    explicit: &[SymbolId],
    args_hint: Option<&[SymbolId]>,
    location: SrcLocation,
) -> Expected<Vec<SymbolId>> {
    let mut bag = DiagnosticBag::new();
    let template_symbol = comp
        .symbol(template)
        .as_template()
        .expect("deduction target is a template");
    let params = template_symbol.params.clone();

    if explicit.len() > params.len() {
        return Expected::fail(diagnostics::too_many_template_args_error(location));
    }
    if explicit.len() == params.len() {
        return Expected::found(explicit.iter().map(|arg| comp.get_root(*arg)).collect());
    }

    let mut deduced: Vec<Option<SymbolId>> = vec![None; params.len()];
    for (index, arg) in explicit.iter().enumerate() {
        deduced[index] = Some(comp.get_root(*arg));
    }

    let Some(hint) = args_hint else {
        if params.is_empty() {
            return Expected::found(Vec::new());
        }
        // No argument types to deduce from: one diagnostic per missing
        // parameter, never a silent placeholder.
        for (index, slot) in deduced.iter().enumerate() {
            if slot.is_none() {
                let ident = comp.symbol(params[index]).ident.clone();
                bag.add(diagnostics::unable_to_deduce_template_arg_error(
                    location, &ident,
                ));
            }
        }
        return Expected::none(bag);
    };

    // Parameter types come from the placeholder instance, where every
    // template parameter is still itself.
    let param_types = match template_symbol.placeholder {
        Some(placeholder) => match comp.symbol(placeholder).as_function() {
            Some(function) => {
                let skip = if function.has_self_param { 1 } else { 0 };
                function
                    .params
                    .iter()
                    .skip(skip)
                    .filter_map(|param| comp.var_type(*param))
                    .collect::<Vec<_>>()
            }
            None => Vec::new(),
        },
        None => Vec::new(),
    };

    if param_types.is_empty() {
        for (index, slot) in deduced.iter().enumerate() {
            if slot.is_none() {
                let ident = comp.symbol(params[index]).ident.clone();
                bag.add(diagnostics::unable_to_deduce_template_arg_error(
                    location, &ident,
                ));
            }
        }
        return Expected::none(bag);
    }

    for (arg, param_type) in hint.iter().zip(&param_types) {
        match unify(comp, template, *arg, *param_type, &mut deduced) {
            UnifyOutcome::Ok => {}
            UnifyOutcome::Mismatch => {
                bag.add(diagnostics::unable_to_deduce_template_args_error(location));
                return Expected::none(bag);
            }
            UnifyOutcome::Conflict {
                param,
                deduced: existing,
                conflicting,
            } => {
                let ident = comp.symbol(param).ident.clone();
                bag.add(diagnostics::template_arg_deduction_conflict_error(
                    comp,
                    location,
                    &ident,
                    existing,
                    conflicting,
                ));
                return Expected::none(bag);
            }
        }
    }

    let mut result = Vec::with_capacity(params.len());
    for (index, slot) in deduced.iter().enumerate() {
        match slot {
            Some(arg) => result.push(*arg),
            None => {
                let ident = comp.symbol(params[index]).ident.clone();
                bag.add(diagnostics::unable_to_deduce_template_arg_error(
                    location, &ident,
                ));
                return Expected::none(bag);
            }
        }
    }
    Expected::found_with(result, bag)
}
