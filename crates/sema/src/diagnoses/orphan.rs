//! Orphan rules: an inherent impl lives in the package of the implemented
//! type; a trait impl lives in the package of the trait or of the type.
//! Native types belong to no package and accept impls from anywhere.

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SymbolId, SymbolKind};

fn package_of(comp: &Compilation, symbol: SymbolId) -> Option<SymbolId> {
    let root = comp.get_root(symbol);
    comp.find_package_mod(comp.symbol(root).scope)
}

pub fn diagnose_orphans(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    for impl_id in comp.impls.clone() {
        let impl_package = comp.find_package_mod(comp.symbol(impl_id).scope);
        let location = comp.symbol(impl_id).ident.location;
        match &comp.symbol(impl_id).kind {
            SymbolKind::InherentImpl(data) => {
                let subject_package = package_of(comp, data.subject);
                if let Some(subject_package) = subject_package {
                    if impl_package != Some(subject_package) {
                        bag.add(diagnostics::orphan_inherent_impl_error(location));
                    }
                }
            }
            SymbolKind::TraitImpl(data) => {
                let subject_package = package_of(comp, data.subject);
                let trait_package = package_of(comp, data.implemented_trait);
                // The impl must be local to at least one side.
                let subject_foreign =
                    subject_package.is_some() && impl_package != subject_package;
                let trait_foreign = trait_package.is_some() && impl_package != trait_package;
                if subject_foreign && trait_foreign {
                    bag.add(diagnostics::orphan_trait_impl_error(location));
                }
            }
            _ => {}
        }
    }
    Diagnosed::new((), bag)
}
