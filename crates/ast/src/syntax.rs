//! Item-level syntax nodes: modules, types, traits, impls, functions and
//! variables. A file parses to one [`ModuleSyntax`] per `module` item; the
//! package's root module is synthesized by the driver.

use std::sync::Arc;

use ace_span::{Ident, SrcLocation};

use crate::expr::ExprSyntax;
use crate::name::{AccessModifier, SymbolName, TypeName};
use crate::stmt::BlockStmtSyntax;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemSyntax {
    Module(Arc<ModuleSyntax>),
    Use(Arc<UseSyntax>),
    Struct(Arc<StructSyntax>),
    Trait(Arc<TraitSyntax>),
    Impl(Arc<ImplSyntax>),
    Function(Arc<FunctionSyntax>),
    StaticVar(Arc<StaticVarSyntax>),
}

impl ItemSyntax {
    pub fn location(&self) -> SrcLocation {
        match self {
            ItemSyntax::Module(item) => item.location,
            ItemSyntax::Use(item) => item.location,
            ItemSyntax::Struct(item) => item.location,
            ItemSyntax::Trait(item) => item.location,
            ItemSyntax::Impl(item) => item.location,
            ItemSyntax::Function(item) => item.location,
            ItemSyntax::StaticVar(item) => item.location,
        }
    }
}

/// `module a::b { ... }`. A multi-section name declares nested modules;
/// the same module may be declared in several files and the declarations
/// merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSyntax {
    pub location: SrcLocation,
    pub name: Vec<Ident>,
    pub access: AccessModifier,
    pub items: Vec<ItemSyntax>,
}

/// `use path::to::Type;` installs a re-export alias in the enclosing
/// scope.
#[derive(Debug, Clone, PartialEq)]
pub struct UseSyntax {
    pub location: SrcLocation,
    pub access: AccessModifier,
    pub target: SymbolName,
}

/// A declaration-level template parameter: the bare identifier in
/// `struct List[T]` or `fn id[T]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParamSyntax {
    pub location: SrcLocation,
    pub ident: Ident,
}

/// A `where Subject: Trait` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSyntax {
    pub location: SrcLocation,
    pub subject: TypeName,
    pub traits: Vec<SymbolName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub access: AccessModifier,
    pub template_params: Vec<TemplateParamSyntax>,
    pub fields: Vec<FieldSyntax>,
}

/// An instance variable of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub access: AccessModifier,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub access: AccessModifier,
    pub template_params: Vec<TemplateParamSyntax>,
    pub supertraits: Vec<SymbolName>,
    pub prototypes: Vec<Arc<PrototypeSyntax>>,
}

/// A callable signature inside a trait, with no body.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub template_params: Vec<TemplateParamSyntax>,
    pub self_param: Option<SelfParamSyntax>,
    pub params: Vec<ParamSyntax>,
    pub return_type: Option<TypeName>,
}

/// `impl Type { ... }` or `impl Trait for Type { ... }`. Template
/// parameters on the impl are visible to every member.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplSyntax {
    pub location: SrcLocation,
    pub template_params: Vec<TemplateParamSyntax>,
    pub trait_name: Option<SymbolName>,
    pub type_name: TypeName,
    pub functions: Vec<Arc<FunctionSyntax>>,
    pub constraints: Vec<ConstraintSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub access: AccessModifier,
    pub template_params: Vec<TemplateParamSyntax>,
    pub self_param: Option<SelfParamSyntax>,
    pub params: Vec<ParamSyntax>,
    pub return_type: Option<TypeName>,
    pub constraints: Vec<ConstraintSyntax>,
    pub block: Option<Arc<BlockStmtSyntax>>,
    pub is_extern: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub type_name: TypeName,
}

/// The `self` parameter; typed as a reference to the implemented type.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfParamSyntax {
    pub location: SrcLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticVarSyntax {
    pub location: SrcLocation,
    pub name: Ident,
    pub access: AccessModifier,
    pub type_name: TypeName,
    pub initializer: Option<ExprSyntax>,
}
