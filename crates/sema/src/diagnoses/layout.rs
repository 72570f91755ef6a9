//! Layout diagnoses: field cycles through value types, and symbols whose
//! declared type is unsized.

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SizeKind, SymbolId, SymbolKind};

/// Force `size_kind` over every concrete struct; re-entrant field walks
/// surface as `StructFieldCausesCycle` at the field closing the cycle.
pub fn diagnose_layout_cycles(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    let struct_ids: Vec<SymbolId> = comp
        .symbols
        .iter()
        .filter(|(_, symbol)| matches!(symbol.kind, SymbolKind::Struct(_)))
        .map(|(id, _)| id)
        .collect();
    for id in struct_ids {
        if comp.is_error_symbol(id) || comp.is_placeholder(id) {
            continue;
        }
        let (_, cycle_bag) = comp.size_kind(id).into_parts();
        bag.add_bag(cycle_bag);
    }
    Diagnosed::new((), bag)
}

/// Fields, parameters, locals and statics must have sized types.
pub fn diagnose_unsized_symbols(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    let var_ids: Vec<SymbolId> = comp
        .symbols
        .iter()
        .filter(|(_, symbol)| {
            matches!(
                symbol.kind,
                SymbolKind::StaticVar(_)
                    | SymbolKind::InstanceVar(_)
                    | SymbolKind::LocalVar(_)
                    | SymbolKind::Param(_)
            )
        })
        .map(|(id, _)| id)
        .collect();

    for id in var_ids {
        if comp.is_error_symbol(id) || comp.is_placeholder(id) {
            continue;
        }
        let Some(var_type) = comp.var_type(id) else {
            continue;
        };
        if comp.is_error_symbol(var_type) || comp.is_placeholder(var_type) {
            continue;
        }
        let (size_kind, _) = comp.size_kind(var_type).into_parts();
        if size_kind == SizeKind::Unsized {
            let ident = comp.symbol(id).ident.clone();
            bag.add(diagnostics::unsized_symbol_type_error(comp, &ident, var_type));
        }
    }
    Diagnosed::new((), bag)
}
