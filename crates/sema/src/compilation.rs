//! The compilation: owner of every long-lived store. Created once per
//! invocation; scopes and symbols allocated into it are never removed.

use std::collections::HashMap;
use std::path::PathBuf;

use ace_ast::AccessModifier;
use ace_span::{Ident, SrcBufferStore};

use crate::compile::FunctionBlockBinding;
use crate::natives::{self, Natives};
use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::{
    ModuleSymbol, Symbol, SymbolArena, SymbolId, SymbolKind, WrapperTypeSymbol,
};

/// Distinguishes the three interned wrapper type families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Reference,
    StrongPtr,
    WeakPtr,
}

/// The error-sentinel family installed at compilation start. Resolution
/// failures return these so downstream passes keep producing diagnostics
/// instead of cascading from a single root cause.
#[derive(Debug, Clone, Copy)]
pub struct ErrorSymbols {
    pub error_type: SymbolId,
    pub error_function: SymbolId,
    pub error_var: SymbolId,
}

#[derive(Debug)]
pub struct Compilation {
    pub buffers: SrcBufferStore,
    pub scopes: ScopeArena,
    pub symbols: SymbolArena,
    pub natives: Natives,
    pub error_symbols: ErrorSymbols,
    pub package_name: String,
    pub output_dir: PathBuf,
    /// The package-level module every file's items land in by default.
    pub package_module: SymbolId,
    /// Bindings queued by the instantiation engine for the next binding
    /// iteration.
    pub pending_bindings: Vec<FunctionBlockBinding>,
    /// Every inherent and trait impl, in declaration order; the global
    /// diagnoses and dyn coercion walk this instead of the whole arena.
    pub impls: Vec<SymbolId>,
    /// Verified static-variable initializers, in declaration order.
    pub static_inits: Vec<(SymbolId, crate::sema::ExprSema)>,
    wrapper_cache: HashMap<(WrapperKind, SymbolId), SymbolId>,
    label_counter: u64,
}

impl Compilation {
    pub fn new(package_name: impl Into<String>, output_dir: PathBuf) -> Self {
        Self::with_buffers(package_name, output_dir, SrcBufferStore::new())
    }

    pub fn with_buffers(
        package_name: impl Into<String>,
        output_dir: PathBuf,
        buffers: SrcBufferStore,
    ) -> Self {
        let package_name = package_name.into();
        let mut scopes = ScopeArena::new();
        let mut symbols = SymbolArena::new();
        let global = scopes.global();

        let natives = natives::register(&mut scopes, &mut symbols);
        let error_symbols = natives::install_error_symbols(&mut scopes, &mut symbols);

        // The package module: a body scope directly under the global scope.
        let body_scope = scopes.create_child(global, Some(&package_name));
        let package_module = symbols.alloc(Symbol {
            ident: Ident::synthesized(package_name.clone()),
            scope: global,
            access: AccessModifier::Public,
            kind: SymbolKind::Module(ModuleSymbol { body_scope }),
            is_error: false,
        });
        scopes.get_mut(body_scope).owner = Some(package_module);
        scopes
            .get_mut(global)
            .symbols
            .entry(package_name.clone())
            .or_default()
            .push(package_module);

        Self {
            buffers,
            scopes,
            symbols,
            natives,
            error_symbols,
            package_name,
            output_dir,
            package_module,
            pending_bindings: Vec::new(),
            impls: Vec::new(),
            static_inits: Vec::new(),
            wrapper_cache: HashMap::new(),
            label_counter: 0,
        }
    }

    #[inline]
    pub fn global_scope(&self) -> ScopeId {
        self.scopes.global()
    }

    pub fn package_scope(&self) -> ScopeId {
        match &self.symbol(self.package_module).kind {
            SymbolKind::Module(module) => module.body_scope,
            _ => unreachable!("package module is always a module symbol"),
        }
    }

    /// The interned wrapper type around `inner`; `&T` twice is the same
    /// symbol, so identity comparison works after unaliasing.
    pub fn wrapper_type(&mut self, kind: WrapperKind, inner: SymbolId) -> SymbolId {
        let inner = self.get_root(inner);
        if let Some(cached) = self.wrapper_cache.get(&(kind, inner)) {
            return *cached;
        }
        let sigil = match kind {
            WrapperKind::Reference => '&',
            WrapperKind::StrongPtr => '*',
            WrapperKind::WeakPtr => '~',
        };
        let ident = Ident::synthesized(format!("{}{}", sigil, self.symbol(inner).ident.name));
        let scope = self.symbol(inner).scope;
        let wrapper = WrapperTypeSymbol { inner };
        let symbol = Symbol {
            ident,
            scope,
            access: AccessModifier::Public,
            kind: match kind {
                WrapperKind::Reference => SymbolKind::Reference(wrapper),
                WrapperKind::StrongPtr => SymbolKind::StrongPtr(wrapper),
                WrapperKind::WeakPtr => SymbolKind::WeakPtr(wrapper),
            },
            is_error: false,
        };
        let id = self.symbols.alloc(symbol);
        self.wrapper_cache.insert((kind, inner), id);
        id
    }

    pub fn reference_type(&mut self, inner: SymbolId) -> SymbolId {
        self.wrapper_type(WrapperKind::Reference, inner)
    }

    pub fn strong_ptr_type(&mut self, inner: SymbolId) -> SymbolId {
        self.wrapper_type(WrapperKind::StrongPtr, inner)
    }

    pub fn weak_ptr_type(&mut self, inner: SymbolId) -> SymbolId {
        self.wrapper_type(WrapperKind::WeakPtr, inner)
    }

    /// A fresh label symbol for lowering-introduced jumps.
    pub fn fresh_label(&mut self, scope: ScopeId) -> SymbolId {
        self.label_counter += 1;
        let ident = Ident::synthesized(format!("$label{}", self.label_counter));
        self.install_symbol(Symbol {
            ident,
            scope,
            access: AccessModifier::Private,
            kind: SymbolKind::Label,
            is_error: false,
        })
    }
}
