//! Overlapping inherent impls. Two impls overlap when some substitution
//! of their free type parameters makes their subjects identical after
//! unaliasing; colliding member names across overlapping impls are
//! errors, and a member re-declared for the very same type is its own
//! kind.

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SymbolId, SymbolKind};

/// The documented could-unify relation: parameters are wildcards on both
/// sides, wrappers and template instances unify structurally.
pub fn placeholders_overlap(comp: &Compilation, lhs: SymbolId, rhs: SymbolId) -> bool {
    comp.could_unify(lhs, rhs)
}

/// An impl subject in unifiable form: templates stand in as their
/// placeholder instance, so `impl[T] Foo[T]` unifies with `Foo[i32]`.
fn subject_pattern(comp: &Compilation, subject: SymbolId) -> SymbolId {
    match &comp.symbol(subject).kind {
        SymbolKind::TypeTemplate(template) => template.placeholder.unwrap_or(subject),
        _ => subject,
    }
}

pub fn diagnose_overlapping_inherent_impls(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();

    let inherent: Vec<(SymbolId, SymbolId, Vec<SymbolId>)> = comp
        .impls
        .iter()
        .filter_map(|impl_id| match &comp.symbol(*impl_id).kind {
            SymbolKind::InherentImpl(data) => {
                Some((*impl_id, data.subject, data.functions.clone()))
            }
            _ => None,
        })
        .collect();

    for (index, (_, lhs_subject, lhs_functions)) in inherent.iter().enumerate() {
        for (_, rhs_subject, rhs_functions) in &inherent[index + 1..] {
            let lhs_pattern = subject_pattern(comp, *lhs_subject);
            let rhs_pattern = subject_pattern(comp, *rhs_subject);
            if !placeholders_overlap(comp, lhs_pattern, rhs_pattern) {
                continue;
            }
            let identical = comp.types_equal(lhs_pattern, rhs_pattern);
            for lhs_function in lhs_functions {
                let lhs_ident = comp.symbol(*lhs_function).ident.clone();
                for rhs_function in rhs_functions {
                    let rhs_ident = comp.symbol(*rhs_function).ident.clone();
                    if lhs_ident.name != rhs_ident.name {
                        continue;
                    }
                    if identical {
                        bag.add(diagnostics::inherent_function_redeclaration_error(
                            &lhs_ident, &rhs_ident,
                        ));
                    } else {
                        bag.add(diagnostics::overlapping_inherent_impl_symbol_error(
                            &lhs_ident, &rhs_ident,
                        ));
                    }
                }
            }
        }
    }

    Diagnosed::new((), bag)
}
