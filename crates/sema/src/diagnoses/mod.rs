//! Cross-cutting diagnoses run once all bodies are bound and every
//! referenced mono exists. Each diagnosis fills the bag and none aborts
//! the compilation.

mod constraint;
mod layout;
mod orphan;
mod overlap;
mod trait_impl;

pub use overlap::placeholders_overlap;

use ace_error::{Diagnosed, DiagnosticBag};

use crate::compilation::Compilation;

pub fn run(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    bag.collect(layout::diagnose_layout_cycles(comp));
    bag.collect(layout::diagnose_unsized_symbols(comp));
    bag.collect(orphan::diagnose_orphans(comp));
    bag.collect(trait_impl::diagnose_invalid_trait_impls(comp));
    bag.collect(overlap::diagnose_overlapping_inherent_impls(comp));
    bag.collect(constraint::diagnose_concrete_constraints(comp));
    Diagnosed::new((), bag)
}
