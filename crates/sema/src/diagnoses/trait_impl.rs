//! Trait-impl completeness and signature agreement: every prototype needs
//! a matching implementation, supertraits need their own impls, and
//! nothing outside the trait may be declared in a trait impl.

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SymbolId, SymbolKind};

/// Whether `fn_type` implements `proto_type`, reading the trait's `Self`
/// placeholder as the implemented subject; wrappers match structurally.
fn proto_type_matches(
    comp: &Compilation,
    proto_type: SymbolId,
    fn_type: SymbolId,
    subject: SymbolId,
) -> bool {
    let proto_root = comp.get_root(proto_type);
    let fn_root = comp.get_root(fn_type);
    // `Self` (and trait type parameters) stand for the subject side.
    if matches!(
        comp.symbol(proto_root).kind,
        SymbolKind::TemplateParamType(_)
    ) {
        return comp.types_equal(fn_root, subject) || comp.is_placeholder(fn_root);
    }
    match (&comp.symbol(proto_root).kind, &comp.symbol(fn_root).kind) {
        (SymbolKind::Reference(lhs), SymbolKind::Reference(rhs))
        | (SymbolKind::StrongPtr(lhs), SymbolKind::StrongPtr(rhs))
        | (SymbolKind::WeakPtr(lhs), SymbolKind::WeakPtr(rhs)) => {
            proto_type_matches(comp, lhs.inner, rhs.inner, subject)
        }
        _ => proto_root == fn_root,
    }
}

fn function_type_param_count(comp: &Compilation, function: SymbolId) -> usize {
    match &comp.symbol(function).kind {
        SymbolKind::FunctionTemplate(template) => template.params.len(),
        _ => 0,
    }
}

fn function_signature(comp: &Compilation, function: SymbolId) -> Option<(Vec<SymbolId>, SymbolId)> {
    match &comp.symbol(comp.get_root(function)).kind {
        SymbolKind::Function(data) => {
            let params = data
                .params
                .iter()
                .filter_map(|param| comp.var_type(*param))
                .collect();
            Some((params, data.return_type))
        }
        SymbolKind::FunctionTemplate(template) => {
            template.placeholder.and_then(|placeholder| function_signature(comp, placeholder))
        }
        _ => None,
    }
}

fn constraint_set(comp: &Compilation, function: SymbolId) -> Vec<(SymbolId, SymbolId)> {
    let Some(scope) = comp.body_scope(comp.get_root(function)) else {
        return Vec::new();
    };
    comp.scope(scope)
        .all_symbols()
        .filter_map(|symbol| match &comp.symbol(symbol).kind {
            SymbolKind::Constraint(constraint) => Some((
                comp.get_root(constraint.subject),
                comp.get_root(constraint.bound_trait),
            )),
            _ => None,
        })
        .collect()
}

pub fn diagnose_invalid_trait_impls(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();

    for impl_id in comp.impls.clone() {
        let SymbolKind::TraitImpl(data) = &comp.symbol(impl_id).kind else {
            continue;
        };
        let (trait_id, subject, functions) = (
            comp.get_root(data.implemented_trait),
            data.subject,
            data.functions.clone(),
        );
        let impl_location = comp.symbol(impl_id).ident.location;
        let Some(trait_data) = comp.symbol(trait_id).as_trait() else {
            continue;
        };
        let prototypes = trait_data.prototypes.clone();
        let supertraits = trait_data.supertraits.clone();

        // Prototype by prototype: find the implementation, then hold its
        // signature against the prototype's.
        for prototype in &prototypes {
            let proto_name = comp.symbol(*prototype).ident.name.clone();
            let implementation = functions
                .iter()
                .copied()
                .find(|function| comp.symbol(*function).ident.name == proto_name);
            let Some(function) = implementation else {
                bag.add(diagnostics::unimplemented_trait_function_error(
                    comp,
                    impl_location,
                    *prototype,
                ));
                continue;
            };

            let proto_data = comp.symbol(*prototype).as_prototype().unwrap();
            let proto_params: Vec<SymbolId> = proto_data
                .params
                .iter()
                .filter_map(|param| comp.var_type(*param))
                .collect();
            let proto_return = proto_data.return_type;
            let proto_type_params = proto_data.type_param_count;

            let Some((fn_params, fn_return)) = function_signature(comp, function) else {
                continue;
            };

            if proto_params.len() != fn_params.len() {
                bag.add(diagnostics::mismatched_trait_impl_param_count_error(
                    comp, function, *prototype,
                ));
                continue;
            }
            if proto_type_params != function_type_param_count(comp, function) {
                bag.add(diagnostics::mismatched_trait_impl_type_param_count_error(
                    comp, function, *prototype,
                ));
                continue;
            }

            let params_match = proto_params
                .iter()
                .zip(&fn_params)
                .all(|(proto, implemented)| {
                    proto_type_matches(comp, *proto, *implemented, subject)
                });
            let return_matches = proto_type_matches(comp, proto_return, fn_return, subject);
            if !params_match || !return_matches {
                bag.add(diagnostics::mismatched_trait_impl_type_error(
                    comp.symbol(function).ident.location,
                    comp.symbol(*prototype).ident.location,
                ));
            }

            let proto_constraints = constraint_set(comp, *prototype);
            let fn_constraints = constraint_set(comp, function);
            let stricter = fn_constraints
                .iter()
                .any(|constraint| !proto_constraints.contains(constraint));
            if stricter {
                bag.add(diagnostics::impl_stricter_than_prototype_error(
                    comp, function, *prototype,
                ));
            }
        }

        // Functions with no prototype behind them do not belong here.
        for function in &functions {
            let name = comp.symbol(*function).ident.name.clone();
            let in_trait = prototypes
                .iter()
                .any(|prototype| comp.symbol(*prototype).ident.name == name);
            if !in_trait {
                bag.add(diagnostics::function_is_not_trait_member_error(
                    comp, *function, trait_id,
                ));
            }
        }

        // Every supertrait needs its own impl for the same subject.
        for supertrait in supertraits {
            let satisfied = comp.impls.iter().any(|other| {
                let SymbolKind::TraitImpl(other_data) = &comp.symbol(*other).kind else {
                    return false;
                };
                comp.get_root(other_data.implemented_trait) == comp.get_root(supertrait)
                    && comp.types_equal(other_data.subject, subject)
            });
            if !satisfied {
                bag.add(diagnostics::unimplemented_supertrait_error(
                    comp,
                    impl_location,
                    supertrait,
                ));
            }
        }
    }

    Diagnosed::new((), bag)
}
