//! A `where T: Trait` clause over fully concrete types constrains
//! nothing; flag it. Constraint records inside template instances are the
//! template's own constraints after substitution and stay quiet.

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SymbolId, SymbolKind};

fn owner_is_instance(comp: &Compilation, scope: crate::scope::ScopeId) -> bool {
    let Some(owner) = comp.scope(scope).owner else {
        return false;
    };
    match &comp.symbol(owner).kind {
        SymbolKind::Function(data) => data.template.is_some(),
        SymbolKind::Struct(data) => data.template.is_some(),
        _ => false,
    }
}

pub fn diagnose_concrete_constraints(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    let constraints: Vec<(SymbolId, SymbolId, SymbolId)> = comp
        .symbols
        .iter()
        .filter_map(|(id, symbol)| match &symbol.kind {
            SymbolKind::Constraint(constraint) => {
                Some((id, constraint.subject, constraint.bound_trait))
            }
            _ => None,
        })
        .collect();

    for (id, subject, bound_trait) in constraints {
        if comp.is_error_symbol(subject) || comp.is_error_symbol(bound_trait) {
            continue;
        }
        if comp.is_placeholder(subject) || comp.is_placeholder(bound_trait) {
            continue;
        }
        if owner_is_instance(comp, comp.symbol(id).scope) {
            continue;
        }
        let location = comp.symbol(id).ident.location;
        bag.add(diagnostics::concrete_constraint_error(location));
    }
    Diagnosed::new((), bag)
}
