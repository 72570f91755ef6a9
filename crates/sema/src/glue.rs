//! Copy/drop glue registration. For every non-trivial concrete type the
//! engine synthesizes a function symbol (`(&Self, &Self) -> void` for
//! copy, `(&Self) -> void` for drop) and binds the body the emission
//! collaborator supplies. Trivially copyable/droppable types carry no
//! glue.

use std::sync::Arc;

use ace_ast::AccessModifier;
use ace_span::Ident;

use crate::compilation::Compilation;
use crate::sema::BlockStmtSema;
use crate::symbol::{
    FunctionSymbol, GlueKind, ParamSymbol, Symbol, SymbolCategory, SymbolId, SymbolKind,
};
use crate::ty::TypeFlags;

/// Supplies glue bodies; implemented by the emission collaborator. The
/// core only binds what the provider returns.
pub trait GlueProvider {
    fn create_copy_glue_body(
        &mut self,
        comp: &Compilation,
        ty: SymbolId,
        glue_fn: SymbolId,
    ) -> Option<Arc<BlockStmtSema>>;

    fn create_drop_glue_body(
        &mut self,
        comp: &Compilation,
        ty: SymbolId,
        glue_fn: SymbolId,
    ) -> Option<Arc<BlockStmtSema>>;
}

/// Provider used when no emission collaborator is attached; registers
/// glue symbols with unbound bodies.
pub struct NullGlueProvider;

impl GlueProvider for NullGlueProvider {
    fn create_copy_glue_body(
        &mut self,
        _comp: &Compilation,
        _ty: SymbolId,
        _glue_fn: SymbolId,
    ) -> Option<Arc<BlockStmtSema>> {
        None
    }

    fn create_drop_glue_body(
        &mut self,
        _comp: &Compilation,
        _ty: SymbolId,
        _glue_fn: SymbolId,
    ) -> Option<Arc<BlockStmtSema>> {
        None
    }
}

/// Register glue for every concrete struct type that needs it.
pub fn generate_and_bind(comp: &mut Compilation, provider: &mut dyn GlueProvider) {
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
        let data = comp.symbol(id).as_struct().unwrap();
        if data.flags.contains(TypeFlags::NATIVE) {
            continue;
        }
        let (has_copy, has_drop) = (data.copy_glue.is_some(), data.drop_glue.is_some());

        if !has_copy && !comp.is_trivially_copyable(id) {
            let glue_fn = create_glue_fn(comp, id, GlueKind::Copy);
            if let Some(struct_data) = comp.symbol_mut(id).as_struct_mut() {
                struct_data.copy_glue = Some(glue_fn);
            }
            if let Some(body) = provider.create_copy_glue_body(comp, id, glue_fn) {
                if let Some(function) = comp.symbol_mut(glue_fn).as_function_mut() {
                    function.body = Some(body);
                }
            }
        }
        if !has_drop && !comp.is_trivially_droppable(id) {
            let glue_fn = create_glue_fn(comp, id, GlueKind::Drop);
            if let Some(struct_data) = comp.symbol_mut(id).as_struct_mut() {
                struct_data.drop_glue = Some(glue_fn);
            }
            if let Some(body) = provider.create_drop_glue_body(comp, id, glue_fn) {
                if let Some(function) = comp.symbol_mut(glue_fn).as_function_mut() {
                    function.body = Some(body);
                }
            }
        }
    }
}

fn create_glue_fn(comp: &mut Compilation, ty: SymbolId, kind: GlueKind) -> SymbolId {
    let self_scope = comp.symbol(ty).as_struct().unwrap().self_scope;
    let name = match kind {
        GlueKind::Copy => "$copy_glue",
        GlueKind::Drop => "$drop_glue",
    };
    let fn_scope = comp.scopes.create_child(self_scope, Some(name));
    let self_ref = comp.reference_type(ty);

    let mut params = Vec::new();
    let param_names: &[&str] = match kind {
        GlueKind::Copy => &["self", "other"],
        GlueKind::Drop => &["self"],
    };
    for (index, param_name) in param_names.iter().enumerate() {
        params.push(comp.install_symbol(Symbol {
            ident: Ident::synthesized(*param_name),
            scope: fn_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::Param(ParamSymbol {
                var_type: self_ref,
                index,
                is_self: false,
            }),
            is_error: false,
        }));
    }

    let glue_fn = comp.install_symbol(Symbol {
        ident: Ident::synthesized(name),
        scope: self_scope,
        access: AccessModifier::Private,
        kind: SymbolKind::Function(FunctionSymbol {
            self_scope: fn_scope,
            params,
            has_self_param: false,
            return_type: comp.natives.void,
            category: SymbolCategory::Static,
            is_native: false,
            is_extern: false,
            body: None,
            template: None,
            template_args: Vec::new(),
            impl_template_args: Vec::new(),
            glue_of: Some((kind, ty)),
        }),
        is_error: false,
    });
    comp.scopes.get_mut(fn_scope).owner = Some(glue_fn);
    glue_fn
}
