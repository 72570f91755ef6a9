//! Symbol queries shared by every pass. Aliases forward through
//! `get_root`; wrapper types forward through their inner type where that
//! is what a caller needs.

use crate::compilation::Compilation;
use crate::scope::ScopeId;
use crate::symbol::{Symbol, SymbolCategory, SymbolId, SymbolKind};

impl Symbol {
    pub fn as_struct(&self) -> Option<&super::StructSymbol> {
        match &self.kind {
            SymbolKind::Struct(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut super::StructSymbol> {
        match &mut self.kind {
            SymbolKind::Struct(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_trait(&self) -> Option<&super::TraitSymbol> {
        match &self.kind {
            SymbolKind::Trait(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&super::FunctionSymbol> {
        match &self.kind {
            SymbolKind::Function(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut super::FunctionSymbol> {
        match &mut self.kind {
            SymbolKind::Function(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_prototype(&self) -> Option<&super::PrototypeSymbol> {
        match &self.kind {
            SymbolKind::Prototype(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&super::ModuleSymbol> {
        match &self.kind {
            SymbolKind::Module(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&super::TemplateSymbol> {
        match &self.kind {
            SymbolKind::TypeTemplate(symbol) | SymbolKind::FunctionTemplate(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_template_mut(&mut self) -> Option<&mut super::TemplateSymbol> {
        match &mut self.kind {
            SymbolKind::TypeTemplate(symbol) | SymbolKind::FunctionTemplate(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::TypeTemplate(_) | SymbolKind::FunctionTemplate(_)
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }
}

impl Compilation {
    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    #[inline]
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        self.symbols.get_mut(id)
    }

    /// The un-aliased defining symbol: follows template-argument-alias and
    /// re-export chains.
    pub fn get_root(&self, id: SymbolId) -> SymbolId {
        let mut current = id;
        loop {
            match &self.symbol(current).kind {
                SymbolKind::TemplateArgAlias(alias) => current = alias.aliased,
                SymbolKind::ReimportAlias(alias) => current = alias.aliased,
                _ => return current,
            }
        }
    }

    /// The scope of a symbol's members, when it has one: module bodies,
    /// type and impl self-scopes, function parameter scopes.
    pub fn body_scope(&self, id: SymbolId) -> Option<ScopeId> {
        match &self.symbol(id).kind {
            SymbolKind::Module(symbol) => Some(symbol.body_scope),
            SymbolKind::Struct(symbol) => Some(symbol.self_scope),
            SymbolKind::Trait(symbol) => Some(symbol.self_scope),
            SymbolKind::Function(symbol) => Some(symbol.self_scope),
            SymbolKind::Prototype(symbol) => Some(symbol.self_scope),
            SymbolKind::TypeTemplate(symbol) | SymbolKind::FunctionTemplate(symbol) => {
                Some(symbol.self_scope)
            }
            SymbolKind::InherentImpl(symbol) => Some(symbol.self_scope),
            SymbolKind::TraitImpl(symbol) => Some(symbol.self_scope),
            SymbolKind::TemplateArgAlias(_) | SymbolKind::ReimportAlias(_) => {
                self.body_scope(self.get_root(id))
            }
            _ => None,
        }
    }

    pub fn category(&self, id: SymbolId) -> SymbolCategory {
        match &self.symbol(id).kind {
            SymbolKind::Function(symbol) => symbol.category,
            SymbolKind::Prototype(symbol) => {
                if symbol.has_self_param {
                    SymbolCategory::Instance
                } else {
                    SymbolCategory::Static
                }
            }
            SymbolKind::InstanceVar(_) => SymbolCategory::Instance,
            SymbolKind::TemplateArgAlias(_) | SymbolKind::ReimportAlias(_) => {
                self.category(self.get_root(id))
            }
            _ => SymbolCategory::Static,
        }
    }

    /// Whether the symbol denotes a type.
    pub fn is_type_symbol(&self, id: SymbolId) -> bool {
        match &self.symbol(id).kind {
            SymbolKind::Struct(_)
            | SymbolKind::Trait(_)
            | SymbolKind::TemplateParamType(_)
            | SymbolKind::Reference(_)
            | SymbolKind::StrongPtr(_)
            | SymbolKind::WeakPtr(_) => true,
            SymbolKind::TemplateArgAlias(_) | SymbolKind::ReimportAlias(_) => {
                self.is_type_symbol(self.get_root(id))
            }
            _ => false,
        }
    }

    /// Whether any template parameter in the symbol's type is unbound.
    pub fn is_placeholder(&self, id: SymbolId) -> bool {
        match &self.symbol(id).kind {
            SymbolKind::TemplateParamType(_) => true,
            SymbolKind::TypeTemplate(_) | SymbolKind::FunctionTemplate(_) => true,
            SymbolKind::Reference(wrapper)
            | SymbolKind::StrongPtr(wrapper)
            | SymbolKind::WeakPtr(wrapper) => self.is_placeholder(wrapper.inner),
            SymbolKind::Struct(symbol) => symbol
                .template_args
                .iter()
                .chain(&symbol.impl_template_args)
                .any(|arg| self.is_placeholder(*arg)),
            SymbolKind::Function(symbol) => symbol
                .template_args
                .iter()
                .chain(&symbol.impl_template_args)
                .any(|arg| self.is_placeholder(*arg)),
            SymbolKind::Constraint(symbol) => {
                self.is_placeholder(symbol.subject) || self.is_placeholder(symbol.bound_trait)
            }
            SymbolKind::TemplateArgAlias(_) | SymbolKind::ReimportAlias(_) => {
                self.is_placeholder(self.get_root(id))
            }
            _ => false,
        }
    }

    /// Whether the symbol belongs to the error-sentinel family installed at
    /// compilation start.
    pub fn is_error_symbol(&self, id: SymbolId) -> bool {
        let symbol = self.symbol(id);
        if symbol.is_error {
            return true;
        }
        match &symbol.kind {
            SymbolKind::Reference(wrapper)
            | SymbolKind::StrongPtr(wrapper)
            | SymbolKind::WeakPtr(wrapper) => self.is_error_symbol(wrapper.inner),
            SymbolKind::TemplateArgAlias(_) | SymbolKind::ReimportAlias(_) => {
                self.is_error_symbol(self.get_root(id))
            }
            _ => false,
        }
    }

    /// The declared type of a variable-like symbol.
    pub fn var_type(&self, id: SymbolId) -> Option<SymbolId> {
        match &self.symbol(id).kind {
            SymbolKind::StaticVar(var) => Some(var.var_type),
            SymbolKind::InstanceVar(var) => Some(var.var_type),
            SymbolKind::LocalVar(var) => Some(var.var_type),
            SymbolKind::Param(var) => Some(var.var_type),
            _ => None,
        }
    }

    /// Printable form of a symbol for diagnostics: wrapper sigils and the
    /// template argument list of instances are spelled out.
    pub fn symbol_display(&self, id: SymbolId) -> String {
        let symbol = self.symbol(id);
        match &symbol.kind {
            SymbolKind::Reference(wrapper) => format!("&{}", self.symbol_display(wrapper.inner)),
            SymbolKind::StrongPtr(wrapper) => format!("*{}", self.symbol_display(wrapper.inner)),
            SymbolKind::WeakPtr(wrapper) => format!("~{}", self.symbol_display(wrapper.inner)),
            SymbolKind::TemplateArgAlias(alias) => self.symbol_display(alias.aliased),
            SymbolKind::ReimportAlias(alias) => self.symbol_display(alias.aliased),
            SymbolKind::Struct(decl) if !decl.template_args.is_empty() => {
                let args = decl
                    .template_args
                    .iter()
                    .map(|arg| self.symbol_display(*arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}[{}]", symbol.ident.name, args)
            }
            SymbolKind::Function(decl) if !decl.template_args.is_empty() => {
                let args = decl
                    .template_args
                    .iter()
                    .map(|arg| self.symbol_display(*arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}[{}]", symbol.ident.name, args)
            }
            _ => symbol.ident.name.clone(),
        }
    }
}
