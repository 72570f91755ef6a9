//! The compilation driver: declaration, placeholder instantiation, body
//! binding to fixpoint, glue generation, global diagnoses, and the
//! emission handoff. Failing passes never abort their siblings; the
//! model is withheld only when the final bag carries errors.

use std::sync::Arc;

use ace_ast::{BlockStmtSyntax, ExprSyntax, ItemSyntax};
use ace_error::{Diagnosed, DiagnosticBag};

use crate::bind;
use crate::compilation::Compilation;
use crate::declare;
use crate::diagnoses;
use crate::emit::{self, EmitModel};
use crate::glue::{self, GlueProvider};
use crate::instantiate;
use crate::scope::ScopeId;
use crate::symbol::SymbolId;

/// A function symbol paired with the block syntax the binding pass will
/// visit for it.
#[derive(Debug, Clone)]
pub struct FunctionBlockBinding {
    pub function: SymbolId,
    pub block: Arc<BlockStmtSyntax>,
}

/// A static variable with an initializer awaiting type-checking.
#[derive(Debug, Clone)]
pub struct StaticVarBinding {
    pub var: SymbolId,
    pub scope: ScopeId,
    pub initializer: ExprSyntax,
}

/// Run the whole core over the package's items. Returns the emission
/// model when the global bag holds no errors, `None` otherwise.
pub fn compile(
    comp: &mut Compilation,
    items: &[ItemSyntax],
    glue_provider: &mut dyn GlueProvider,
) -> Diagnosed<Option<EmitModel>> {
    let mut bag = DiagnosticBag::new();

    let output = bag.collect(declare::run(comp, items));
    comp.natives.assert_registered();

    bag.collect(instantiate::instantiate_placeholders(comp));

    bag.collect(bind::bind_function_bodies(comp, output.bindings));
    bag.collect(bind::bind_static_inits(comp, output.static_inits));

    // Glue registration can reference fresh monos; bind whatever appeared.
    glue::generate_and_bind(comp, glue_provider);
    bag.collect(bind::bind_function_bodies(comp, Vec::new()));

    bag.collect(diagnoses::run(comp));

    if bag.has_errors() {
        Diagnosed::new(None, bag)
    } else {
        let model = emit::build_model(comp);
        Diagnosed::new(Some(model), bag)
    }
}
