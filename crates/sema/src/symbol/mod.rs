//! The symbol graph: a typed directory of every declared entity.
//!
//! Symbols live in one arena for the life of the compilation and are
//! addressed by [`SymbolId`]. A symbol is a tagged variant; the queries
//! every pass relies on (`get_root`, body scopes, categories, placeholder
//! and error sentinels) are defined here and on [`crate::Compilation`].

mod queries;

pub use queries::*;

use ace_ast::AccessModifier;
use ace_span::Ident;
use generational_arena::{Arena, Index};

use crate::scope::ScopeId;
use crate::ty::TypeFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) Index);

/// Static symbols resolve through scope paths; instance symbols resolve
/// through a value of their owning type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Static,
    Instance,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub ident: Ident,
    /// The scope this symbol is declared in.
    pub scope: ScopeId,
    pub access: AccessModifier,
    pub kind: SymbolKind,
    /// Marks the error-sentinel family installed at compilation start.
    pub is_error: bool,
}

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Module(ModuleSymbol),
    Struct(StructSymbol),
    Trait(TraitSymbol),
    Function(FunctionSymbol),
    Prototype(PrototypeSymbol),
    StaticVar(StaticVarSymbol),
    InstanceVar(InstanceVarSymbol),
    LocalVar(LocalVarSymbol),
    Param(ParamSymbol),
    TypeTemplate(TemplateSymbol),
    FunctionTemplate(TemplateSymbol),
    /// A placeholder type standing for an unbound template parameter.
    TemplateParamType(TemplateParamTypeSymbol),
    /// Binds a template parameter name to its argument inside an
    /// instantiated scope; forwards every query to the aliased symbol.
    TemplateArgAlias(TemplateArgAliasSymbol),
    /// A `use` re-export: a private alias installed in the importing scope.
    ReimportAlias(ReimportAliasSymbol),
    Label,
    InherentImpl(ImplSymbol),
    TraitImpl(TraitImplSymbol),
    /// A `where Subject: Trait` record.
    Constraint(ConstraintSymbol),
    /// `&T`: borrow, pointer-sized, trivially copyable and droppable.
    Reference(WrapperTypeSymbol),
    /// Owning reference-counted pointer.
    StrongPtr(WrapperTypeSymbol),
    /// Non-owning reference to a strong pointer's control block.
    WeakPtr(WrapperTypeSymbol),
}

#[derive(Debug, Clone)]
pub struct ModuleSymbol {
    pub body_scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct StructSymbol {
    pub self_scope: ScopeId,
    /// Field symbols in declaration (and layout) order.
    pub fields: Vec<SymbolId>,
    pub flags: TypeFlags,
    pub size_cache: Option<SizeKind>,
    /// Set while `size_kind` walks this struct's fields; re-entry means a
    /// layout cycle.
    pub size_in_progress: bool,
    pub copy_glue: Option<SymbolId>,
    pub drop_glue: Option<SymbolId>,
    /// The template this struct was instantiated from, with its argument
    /// tuple; `None` for plain structs.
    pub template: Option<SymbolId>,
    pub template_args: Vec<SymbolId>,
    pub impl_template_args: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct TraitSymbol {
    pub self_scope: ScopeId,
    pub supertraits: Vec<SymbolId>,
    pub prototypes: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub self_scope: ScopeId,
    /// Parameter symbols in call order; the self parameter, when present,
    /// is `params[0]`.
    pub params: Vec<SymbolId>,
    pub has_self_param: bool,
    pub return_type: SymbolId,
    pub category: SymbolCategory,
    pub is_native: bool,
    pub is_extern: bool,
    /// The verified sema block, bound by the binding pass.
    pub body: Option<std::sync::Arc<crate::sema::BlockStmtSema>>,
    pub template: Option<SymbolId>,
    pub template_args: Vec<SymbolId>,
    pub impl_template_args: Vec<SymbolId>,
    /// Set on compiler-synthesized copy/drop glue.
    pub glue_of: Option<(GlueKind, SymbolId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueKind {
    Copy,
    Drop,
}

#[derive(Debug, Clone)]
pub struct PrototypeSymbol {
    pub self_scope: ScopeId,
    pub params: Vec<SymbolId>,
    pub has_self_param: bool,
    pub return_type: SymbolId,
    /// The trait the prototype belongs to.
    pub owner_trait: SymbolId,
    pub type_param_count: usize,
    pub is_dyn_dispatchable: bool,
}

#[derive(Debug, Clone)]
pub struct StaticVarSymbol {
    pub var_type: SymbolId,
}

#[derive(Debug, Clone)]
pub struct InstanceVarSymbol {
    pub var_type: SymbolId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct LocalVarSymbol {
    pub var_type: SymbolId,
    /// Index of the declaring statement within its scope; fixes drop order
    /// without re-walking the sema tree.
    pub stmt_index: usize,
}

#[derive(Debug, Clone)]
pub struct ParamSymbol {
    pub var_type: SymbolId,
    pub index: usize,
    pub is_self: bool,
}

#[derive(Debug, Clone)]
pub enum TemplateDecl {
    Struct(std::sync::Arc<ace_ast::StructSyntax>),
    Function(std::sync::Arc<ace_ast::FunctionSyntax>),
}

#[derive(Debug, Clone)]
pub struct TemplateSymbol {
    /// Scope holding the placeholder parameter types.
    pub self_scope: ScopeId,
    pub params: Vec<SymbolId>,
    pub impl_params: Vec<SymbolId>,
    /// For members of an impl: the implemented type (or type template),
    /// typing the self parameter of instances.
    pub impl_subject: Option<SymbolId>,
    pub decl: TemplateDecl,
    /// Instance registry keyed by `(impl_args, args)`; insertion order,
    /// exact type-identity match after alias unwrapping.
    pub instances: Vec<(InstanceKey, SymbolId)>,
    /// The instance keyed by the parameters themselves, used to type-check
    /// the template body generically.
    pub placeholder: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceKey {
    pub impl_args: Vec<SymbolId>,
    pub args: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct TemplateParamTypeSymbol {
    pub index: usize,
    pub is_impl_param: bool,
    /// The template (or impl) that introduced the parameter.
    pub owner: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct TemplateArgAliasSymbol {
    pub aliased: SymbolId,
    pub index: usize,
    pub is_impl_arg: bool,
}

#[derive(Debug, Clone)]
pub struct ReimportAliasSymbol {
    pub aliased: SymbolId,
}

#[derive(Debug, Clone)]
pub struct ImplSymbol {
    pub self_scope: ScopeId,
    /// The implemented type, or the type template for a templated impl.
    pub subject: SymbolId,
    pub impl_params: Vec<SymbolId>,
    pub functions: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct TraitImplSymbol {
    pub self_scope: ScopeId,
    pub implemented_trait: SymbolId,
    pub subject: SymbolId,
    pub impl_params: Vec<SymbolId>,
    pub functions: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ConstraintSymbol {
    pub subject: SymbolId,
    pub bound_trait: SymbolId,
}

#[derive(Debug, Clone)]
pub struct WrapperTypeSymbol {
    pub inner: SymbolId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Sized,
    Unsized,
}

/// Arena of all symbols in one compilation. Append-only: symbols are
/// added during declaration, binding and instantiation, never removed
/// once visible.
#[derive(Debug, Default)]
pub struct SymbolArena {
    arena: Arena<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        SymbolId(self.arena.insert(symbol))
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.0]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.arena.iter().map(|(index, symbol)| (SymbolId(index), symbol))
    }

    pub fn ids(&self) -> Vec<SymbolId> {
        self.arena.iter().map(|(index, _)| SymbolId(index)).collect()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
