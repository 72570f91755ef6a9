//! The emission handoff: everything the backend needs to materialise
//! code, and nothing it does not. File layouts and IR are the backend's
//! business.

use std::sync::Arc;

use ace_error::Expected;

use crate::compilation::Compilation;
use crate::sema::{BlockStmtSema, ExprSema};
use crate::symbol::{SizeKind, SymbolId, SymbolKind};

#[derive(Debug, Clone)]
pub struct EmitFunction {
    pub symbol: SymbolId,
    pub block: Arc<BlockStmtSema>,
}

#[derive(Debug, Clone)]
pub struct EmitType {
    pub symbol: SymbolId,
    pub size_kind: SizeKind,
    pub trivially_copyable: bool,
    pub trivially_droppable: bool,
    pub copy_glue: Option<SymbolId>,
    pub drop_glue: Option<SymbolId>,
}

/// The verified model: bound function bodies, type metadata, the list of
/// concrete instantiations, and static initializers.
#[derive(Debug, Clone)]
pub struct EmitModel {
    pub functions: Vec<EmitFunction>,
    pub types: Vec<EmitType>,
    pub instances: Vec<SymbolId>,
    pub static_inits: Vec<(SymbolId, ExprSema)>,
}

/// The emission collaborator: consumes the model, writes object code,
/// invokes the linker.
pub trait Backend {
    fn emit(&mut self, comp: &Compilation, model: &EmitModel) -> Expected<()>;
}

/// Assemble the handoff from a fully-checked compilation.
pub fn build_model(comp: &mut Compilation) -> EmitModel {
    let ids = comp.symbols.ids();

    let mut functions = Vec::new();
    let mut types = Vec::new();
    let mut instances = Vec::new();

    for id in ids {
        if comp.is_error_symbol(id) || comp.is_placeholder(id) {
            continue;
        }
        if matches!(comp.symbol(id).kind, SymbolKind::Struct(_)) {
            // Layout diagnostics already ran; the cached kind is taken
            // as-is here.
            let (size_kind, _) = comp.size_kind(id).into_parts();
            let data = comp.symbol(id).as_struct().unwrap();
            let (copy_glue, drop_glue) = (data.copy_glue, data.drop_glue);
            types.push(EmitType {
                symbol: id,
                size_kind,
                trivially_copyable: comp.is_trivially_copyable(id),
                trivially_droppable: comp.is_trivially_droppable(id),
                copy_glue,
                drop_glue,
            });
            continue;
        }
        match &comp.symbol(id).kind {
            SymbolKind::Function(data) => {
                if let Some(block) = &data.body {
                    functions.push(EmitFunction {
                        symbol: id,
                        block: block.clone(),
                    });
                }
            }
            SymbolKind::TypeTemplate(template) | SymbolKind::FunctionTemplate(template) => {
                for (_, instance) in &template.instances {
                    if !comp.is_placeholder(*instance) {
                        instances.push(*instance);
                    }
                }
            }
            _ => {}
        }
    }

    EmitModel {
        functions,
        types,
        instances,
        static_inits: comp.static_inits.clone(),
    }
}
