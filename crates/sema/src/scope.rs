//! The lexical scope tree: a true tree with back edges, held in an arena
//! and addressed by [`ScopeId`]. Associations are cross-links that extend
//! a scope's lookup surface (an `impl T` block associates `T`'s self-scope
//! with the impl's own scope); they never replace `parent`.

use ace_span::SrcLocation;
use generational_arena::{Arena, Index};
use indexmap::{IndexMap, IndexSet};

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{Symbol, SymbolId, SymbolKind};
use ace_error::Expected;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) Index);

/// The key a template is stored under in its scope's symbol map, distinct
/// from the plain name its instances share.
pub fn template_key(name: &str) -> String {
    format!("__template_{}", name)
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub name: String,
    pub nest_level: usize,
    /// Name → symbols; multiplicity supports overloads, template
    /// instances and impls.
    pub symbols: IndexMap<String, Vec<SymbolId>>,
    pub associations: IndexSet<ScopeId>,
    /// The symbol whose body this scope is, when any.
    pub owner: Option<SymbolId>,
}

impl Scope {
    pub fn symbols_named(&self, name: &str) -> &[SymbolId] {
        self.symbols.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// All symbols declared directly in this scope, in declaration order.
    pub fn all_symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.values().flatten().copied()
    }
}

#[derive(Debug)]
pub struct ScopeArena {
    arena: Arena<Scope>,
    global: ScopeId,
    anon_counter: u64,
}

impl ScopeArena {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let global = ScopeId(arena.insert(Scope {
            parent: None,
            children: Vec::new(),
            name: "$global".to_string(),
            nest_level: 0,
            symbols: IndexMap::new(),
            associations: IndexSet::new(),
            owner: None,
        }));
        Self {
            arena,
            global,
            anon_counter: 0,
        }
    }

    #[inline]
    pub fn global(&self) -> ScopeId {
        self.global
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id.0]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.arena[id.0]
    }

    /// Append a child scope; anonymous children get fresh unique names.
    pub fn create_child(&mut self, parent: ScopeId, name: Option<&str>) -> ScopeId {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                self.anon_counter += 1;
                format!("$anon{}", self.anon_counter)
            }
        };
        let nest_level = self.get(parent).nest_level + 1;
        let child = ScopeId(self.arena.insert(Scope {
            parent: Some(parent),
            children: Vec::new(),
            name,
            nest_level,
            symbols: IndexMap::new(),
            associations: IndexSet::new(),
            owner: None,
        }));
        self.get_mut(parent).children.push(child);
        child
    }

    /// Install a non-owning association; idempotent.
    pub fn define_association(&mut self, scope: ScopeId, other: ScopeId) {
        self.get_mut(scope).associations.insert(other);
    }

    /// Whether `ancestor` is `scope` or one of its ancestors along `parent`.
    pub fn is_ancestor_of(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).parent;
        }
        false
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Compilation {
    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.get(id)
    }

    /// The key `symbol` is (or would be) stored under in its scope.
    fn declaration_key(symbol: &Symbol) -> String {
        if symbol.is_template() {
            template_key(&symbol.ident.name)
        } else {
            symbol.ident.name.clone()
        }
    }

    /// Whether two same-name symbols collide under the overload-and-
    /// template-argument key: non-templates collide unless they are
    /// function overloads with distinct parameter-type lists; template
    /// instances collide on the same `(impl_args, args)` tuple; templates
    /// collide by name.
    fn symbols_collide(&self, existing: SymbolId, incoming: &Symbol) -> bool {
        let existing_symbol = self.symbol(existing);
        if existing_symbol.is_template() && incoming.is_template() {
            return true;
        }
        if existing_symbol.is_template() != incoming.is_template() {
            return false;
        }
        match (&existing_symbol.kind, &incoming.kind) {
            (SymbolKind::Function(lhs), SymbolKind::Function(rhs)) => {
                match (&lhs.template, &rhs.template) {
                    (Some(lhs_template), Some(rhs_template)) => {
                        lhs_template == rhs_template
                            && self.type_lists_equal(&lhs.impl_template_args, &rhs.impl_template_args)
                            && self.type_lists_equal(&lhs.template_args, &rhs.template_args)
                    }
                    (None, None) => {
                        let lhs_params: Vec<_> = lhs
                            .params
                            .iter()
                            .filter_map(|param| self.var_type(*param))
                            .collect();
                        let rhs_params: Vec<_> = rhs
                            .params
                            .iter()
                            .filter_map(|param| self.var_type(*param))
                            .collect();
                        self.type_lists_equal(&lhs_params, &rhs_params)
                    }
                    _ => false,
                }
            }
            (SymbolKind::Struct(lhs), SymbolKind::Struct(rhs)) => {
                match (&lhs.template, &rhs.template) {
                    (Some(lhs_template), Some(rhs_template)) => {
                        lhs_template == rhs_template
                            && self.type_lists_equal(&lhs.impl_template_args, &rhs.impl_template_args)
                            && self.type_lists_equal(&lhs.template_args, &rhs.template_args)
                    }
                    (None, None) => true,
                    _ => false,
                }
            }
            // Impls of the same type coexist; overlap is a global diagnosis.
            (SymbolKind::InherentImpl(_), SymbolKind::InherentImpl(_))
            | (SymbolKind::TraitImpl(_), SymbolKind::TraitImpl(_))
            | (SymbolKind::InherentImpl(_), SymbolKind::TraitImpl(_))
            | (SymbolKind::TraitImpl(_), SymbolKind::InherentImpl(_)) => false,
            _ => true,
        }
    }

    /// Place an owned symbol in its scope's symbol mapping, diagnosing
    /// redefinition against the collision key.
    pub fn declare_symbol(&mut self, symbol: Symbol) -> Expected<SymbolId> {
        let key = Self::declaration_key(&symbol);
        let scope = symbol.scope;
        for existing in self.scope(scope).symbols_named(&key).to_vec() {
            if self.symbols_collide(existing, &symbol) {
                let original = self.symbol(existing).ident.clone();
                return Expected::fail(diagnostics::symbol_redefinition_error(
                    &symbol.ident,
                    &original,
                ));
            }
        }
        Expected::found(self.insert_symbol_unchecked(key, symbol))
    }

    /// Insert without the collision check; reserved for compiler-created
    /// symbols whose names cannot collide (natives, aliases, glue, labels).
    pub fn insert_symbol_unchecked(&mut self, key: String, symbol: Symbol) -> SymbolId {
        let scope = symbol.scope;
        let id = self.symbols.alloc(symbol);
        self.scopes
            .get_mut(scope)
            .symbols
            .entry(key)
            .or_default()
            .push(id);
        id
    }

    /// Declare under the symbol's own name, panicking never: collisions are
    /// impossible for synthesized names.
    pub fn install_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let key = Self::declaration_key(&symbol);
        self.insert_symbol_unchecked(key, symbol)
    }

    /// The nearest enclosing module along `parent`, when any.
    pub fn find_module(&self, scope: ScopeId) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(owner) = self.scope(id).owner {
                if matches!(self.symbol(owner).kind, SymbolKind::Module(_)) {
                    return Some(owner);
                }
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// The enclosing package-level module: the outermost module on the
    /// `parent` chain. Used by the orphan diagnoses.
    pub fn find_package_mod(&self, scope: ScopeId) -> Option<SymbolId> {
        let mut found = None;
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(owner) = self.scope(id).owner {
                if matches!(self.symbol(owner).kind, SymbolKind::Module(_)) {
                    found = Some(owner);
                }
            }
            current = self.scope(id).parent;
        }
        found
    }

    /// The location a scope's owner was declared at, for notes.
    pub fn scope_location(&self, scope: ScopeId) -> Option<SrcLocation> {
        self.scope(scope)
            .owner
            .map(|owner| self.symbol(owner).ident.location)
    }
}
