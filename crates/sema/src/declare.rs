//! The symbol declaration pass: syntax → symbols, ordered by kind so that
//! every declaration can resolve what it needs. Modules come first (their
//! body scopes must exist), then types, templates, impls, inherent
//! members, functions, and variables; nesting depth breaks ties.

use std::sync::Arc;

use ace_ast::{
    AccessModifier, ConstraintSyntax, FieldSyntax, FunctionSyntax, ImplSyntax, ItemSyntax,
    ModuleSyntax, PrototypeSyntax, StaticVarSyntax, StructSyntax, TraitSyntax, UseSyntax,
};
use ace_error::{Diagnosed, DiagnosticBag, Expected};
use ace_span::{Ident, SrcLocation};

use crate::compilation::Compilation;
use crate::compile::{FunctionBlockBinding, StaticVarBinding};
use crate::diagnostics;
use crate::instantiate;
use crate::resolve::{self, ExpectedKind};
use crate::scope::ScopeId;
use crate::symbol::{
    ConstraintSymbol, FunctionSymbol, ImplSymbol, InstanceVarSymbol, ModuleSymbol, ParamSymbol,
    PrototypeSymbol, ReimportAliasSymbol, StaticVarSymbol, StructSymbol, Symbol, SymbolCategory,
    SymbolId, SymbolKind, TemplateArgAliasSymbol, TemplateDecl, TemplateParamTypeSymbol,
    TemplateSymbol, TraitImplSymbol, TraitSymbol,
};
use crate::ty::TypeFlags;

/// Fixed ordering of declaration kinds, with nesting depth as
/// sub-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DeclOrder {
    Type,
    Template,
    Impl,
    InherentMember,
    Function,
    Variable,
}

enum Entry {
    Struct {
        scope: ScopeId,
        syntax: Arc<StructSyntax>,
    },
    Trait {
        scope: ScopeId,
        syntax: Arc<TraitSyntax>,
    },
    StructTemplate {
        scope: ScopeId,
        syntax: Arc<StructSyntax>,
    },
    FunctionTemplate {
        scope: ScopeId,
        syntax: Arc<FunctionSyntax>,
    },
    Impl {
        scope: ScopeId,
        syntax: Arc<ImplSyntax>,
    },
    Use {
        scope: ScopeId,
        syntax: Arc<UseSyntax>,
    },
    Function {
        scope: ScopeId,
        syntax: Arc<FunctionSyntax>,
    },
    StaticVar {
        scope: ScopeId,
        syntax: Arc<StaticVarSyntax>,
    },
}

impl Entry {
    fn order(&self) -> DeclOrder {
        match self {
            Entry::Struct { .. } | Entry::Trait { .. } => DeclOrder::Type,
            Entry::StructTemplate { .. } | Entry::FunctionTemplate { .. } => DeclOrder::Template,
            Entry::Impl { .. } => DeclOrder::Impl,
            Entry::Use { .. } => DeclOrder::InherentMember,
            Entry::Function { .. } => DeclOrder::Function,
            Entry::StaticVar { .. } => DeclOrder::Variable,
        }
    }
}

#[derive(Debug, Default)]
pub struct DeclOutput {
    pub bindings: Vec<FunctionBlockBinding>,
    pub static_inits: Vec<StaticVarBinding>,
}

/// Member declarations that must wait for a whole earlier stage: trait
/// bodies and impl bodies after every type exists, fields last.
#[derive(Default)]
struct Deferred {
    trait_members: Vec<(SymbolId, Arc<TraitSyntax>)>,
    impl_members: Vec<(SymbolId, SymbolId, Vec<SymbolId>, Arc<ImplSyntax>)>,
    fields: Vec<(SymbolId, usize, FieldSyntax)>,
}

/// Declare every item reachable from the package's top-level items.
pub fn run(comp: &mut Compilation, items: &[ItemSyntax]) -> Diagnosed<DeclOutput> {
    let mut bag = DiagnosticBag::new();
    let mut entries: Vec<(usize, Entry)> = Vec::new();
    let package_scope = comp.package_scope();

    let mut walker = Walker {
        entries: &mut entries,
        bag: &mut bag,
        depth: 0,
    };
    walker.walk_items(comp, package_scope, items);

    entries.sort_by(|(lhs_seq, lhs), (rhs_seq, rhs)| {
        lhs.order()
            .cmp(&rhs.order())
            .then(lhs_seq.cmp(rhs_seq))
    });

    let mut output = DeclOutput::default();
    let mut deferred = Deferred::default();
    for (_, entry) in entries {
        declare_entry(comp, entry, &mut output, &mut deferred, &mut bag);
    }
    for (trait_symbol, syntax) in std::mem::take(&mut deferred.trait_members) {
        declare_trait_members(comp, trait_symbol, &syntax, &mut bag);
    }
    for (impl_symbol, subject, impl_params, syntax) in std::mem::take(&mut deferred.impl_members) {
        declare_impl_members(
            comp,
            impl_symbol,
            subject,
            &impl_params,
            &syntax,
            &mut output,
            &mut bag,
        );
    }
    for (struct_symbol, index, field) in std::mem::take(&mut deferred.fields) {
        declare_field(comp, struct_symbol, index, &field, &mut bag);
    }
    Diagnosed::new(output, bag)
}

struct Walker<'a> {
    entries: &'a mut Vec<(usize, Entry)>,
    bag: &'a mut DiagnosticBag,
    depth: usize,
}

impl<'a> Walker<'a> {
    fn push(&mut self, entry: Entry) {
        // Sequence numbers encode (depth, discovery order) so the stable
        // sort keeps outer declarations ahead of nested ones.
        let seq = self.depth * 1_000_000 + self.entries.len();
        self.entries.push((seq, entry));
    }

    fn walk_items(&mut self, comp: &mut Compilation, scope: ScopeId, items: &[ItemSyntax]) {
        for item in items {
            match item {
                ItemSyntax::Module(module) => self.walk_module(comp, scope, module),
                ItemSyntax::Use(use_syntax) => self.push(Entry::Use {
                    scope,
                    syntax: use_syntax.clone(),
                }),
                ItemSyntax::Struct(struct_syntax) => {
                    if struct_syntax.template_params.is_empty() {
                        self.push(Entry::Struct {
                            scope,
                            syntax: struct_syntax.clone(),
                        });
                    } else {
                        self.push(Entry::StructTemplate {
                            scope,
                            syntax: struct_syntax.clone(),
                        });
                    }
                }
                ItemSyntax::Trait(trait_syntax) => self.push(Entry::Trait {
                    scope,
                    syntax: trait_syntax.clone(),
                }),
                ItemSyntax::Impl(impl_syntax) => self.push(Entry::Impl {
                    scope,
                    syntax: impl_syntax.clone(),
                }),
                ItemSyntax::Function(function) => {
                    if function.template_params.is_empty() {
                        self.push(Entry::Function {
                            scope,
                            syntax: function.clone(),
                        });
                    } else {
                        self.push(Entry::FunctionTemplate {
                            scope,
                            syntax: function.clone(),
                        });
                    }
                }
                ItemSyntax::StaticVar(var) => self.push(Entry::StaticVar {
                    scope,
                    syntax: var.clone(),
                }),
            }
        }
    }

    /// Modules are declared during the walk itself: their body scopes must
    /// exist before anything inside them is collected. Re-declaring an
    /// existing module merges into it (multi-file modules).
    fn walk_module(&mut self, comp: &mut Compilation, scope: ScopeId, module: &Arc<ModuleSyntax>) {
        let mut current = scope;
        for segment in &module.name {
            match declare_or_merge_module(comp, current, segment, module.access, self.bag) {
                Some(body) => current = body,
                None => return,
            }
        }
        self.depth += 1;
        self.walk_items(comp, current, &module.items);
        self.depth -= 1;
    }
}

/// Partial symbol creation for modules: a same-name module in the target
/// scope is merged into, after an access-modifier check; anything else of
/// that name is a redefinition.
fn declare_or_merge_module(
    comp: &mut Compilation,
    scope: ScopeId,
    name: &Ident,
    access: AccessModifier,
    bag: &mut DiagnosticBag,
) -> Option<ScopeId> {
    let existing = comp.scope(scope).symbols_named(&name.name).to_vec();
    if let Some(existing) = existing.first() {
        return match &comp.symbol(*existing).kind {
            SymbolKind::Module(module) => {
                if comp.symbol(*existing).access != access {
                    let original = comp.symbol(*existing).ident.clone();
                    bag.add(diagnostics::mismatched_access_modifier_error(
                        name.location,
                        &original,
                    ));
                }
                Some(module.body_scope)
            }
            _ => {
                let original = comp.symbol(*existing).ident.clone();
                bag.add(diagnostics::symbol_redefinition_error(name, &original));
                None
            }
        };
    }

    let body_scope = comp.scopes.create_child(scope, Some(&name.name));
    let symbol = comp.install_symbol(Symbol {
        ident: name.clone(),
        scope,
        access,
        kind: SymbolKind::Module(ModuleSymbol { body_scope }),
        is_error: false,
    });
    comp.scopes.get_mut(body_scope).owner = Some(symbol);
    Some(body_scope)
}

fn declare_entry(
    comp: &mut Compilation,
    entry: Entry,
    output: &mut DeclOutput,
    deferred: &mut Deferred,
    bag: &mut DiagnosticBag,
) {
    match entry {
        Entry::Struct { scope, syntax } => {
            declare_struct(comp, scope, &syntax, deferred, bag);
        }
        Entry::Trait { scope, syntax } => {
            if let Some(trait_symbol) = declare_trait(comp, scope, &syntax, bag) {
                // Prototypes and supertraits resolve once every type
                // exists.
                deferred.trait_members.push((trait_symbol, syntax));
            }
        }
        Entry::StructTemplate { scope, syntax } => {
            declare_template(comp, scope, TemplateDecl::Struct(syntax), bag);
        }
        Entry::FunctionTemplate { scope, syntax } => {
            declare_template(comp, scope, TemplateDecl::Function(syntax), bag);
        }
        Entry::Impl { scope, syntax } => {
            declare_impl(comp, scope, &syntax, deferred, bag);
        }
        Entry::Use { scope, syntax } => {
            declare_use(comp, scope, &syntax, bag);
        }
        Entry::Function { scope, syntax } => {
            declare_function(comp, scope, &syntax, None, &[], output, bag);
        }
        Entry::StaticVar { scope, syntax } => {
            declare_static_var(comp, scope, &syntax, output, bag);
        }
    }
}

fn declare_struct(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<StructSyntax>,
    deferred: &mut Deferred,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let self_scope = comp.scopes.create_child(scope, Some(&syntax.name.name));
    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope,
        access: syntax.access,
        kind: SymbolKind::Struct(StructSymbol {
            self_scope,
            fields: Vec::new(),
            flags: TypeFlags::empty(),
            size_cache: None,
            size_in_progress: false,
            copy_glue: None,
            drop_glue: None,
            template: None,
            template_args: Vec::new(),
            impl_template_args: Vec::new(),
        }),
        is_error: false,
    });
    let symbol = bag.collect_opt(declared)?;
    comp.scopes.get_mut(self_scope).owner = Some(symbol);
    for (index, field) in syntax.fields.iter().enumerate() {
        deferred.fields.push((symbol, index, field.clone()));
    }
    Some(symbol)
}

fn declare_trait(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<TraitSyntax>,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let self_scope = comp.scopes.create_child(scope, Some(&syntax.name.name));
    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope,
        access: syntax.access,
        kind: SymbolKind::Trait(TraitSymbol {
            self_scope,
            supertraits: Vec::new(),
            prototypes: Vec::new(),
        }),
        is_error: false,
    });
    let symbol = bag.collect_opt(declared)?;
    comp.scopes.get_mut(self_scope).owner = Some(symbol);

    // `Self` stands for the implementing type inside the trait's body.
    comp.install_symbol(Symbol {
        ident: Ident::synthesized("Self"),
        scope: self_scope,
        access: AccessModifier::Private,
        kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
            index: 0,
            is_impl_param: false,
            owner: Some(symbol),
        }),
        is_error: false,
    });

    // Trait-level template parameters resolve to placeholders in the body.
    for (index, param) in syntax.template_params.iter().enumerate() {
        comp.install_symbol(Symbol {
            ident: param.ident.clone(),
            scope: self_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
                index,
                is_impl_param: false,
                owner: Some(symbol),
            }),
            is_error: false,
        });
    }
    Some(symbol)
}

fn declare_trait_members(
    comp: &mut Compilation,
    trait_symbol: SymbolId,
    syntax: &Arc<TraitSyntax>,
    bag: &mut DiagnosticBag,
) {
    let self_scope = comp.symbol(trait_symbol).as_trait().unwrap().self_scope;

    let mut supertraits = Vec::new();
    for supertrait in &syntax.supertraits {
        let resolved = resolve::resolve_symbol(comp, self_scope, supertrait, None, ExpectedKind::Trait);
        if let Some(symbol) = bag.collect_opt(resolved) {
            supertraits.push(comp.get_root(symbol));
        }
    }

    let mut prototypes = Vec::new();
    for prototype in &syntax.prototypes {
        if let Some(symbol) = declare_prototype(comp, trait_symbol, self_scope, prototype, bag) {
            prototypes.push(symbol);
        }
    }

    if let SymbolKind::Trait(trait_data) = &mut comp.symbol_mut(trait_symbol).kind {
        trait_data.supertraits = supertraits;
        trait_data.prototypes = prototypes;
    }
}

fn declare_prototype(
    comp: &mut Compilation,
    trait_symbol: SymbolId,
    trait_scope: ScopeId,
    syntax: &Arc<PrototypeSyntax>,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let proto_scope = comp.scopes.create_child(trait_scope, Some(&syntax.name.name));

    for (index, param) in syntax.template_params.iter().enumerate() {
        comp.install_symbol(Symbol {
            ident: param.ident.clone(),
            scope: proto_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
                index,
                is_impl_param: false,
                owner: None,
            }),
            is_error: false,
        });
    }

    let mut params = Vec::new();
    if let Some(self_param) = &syntax.self_param {
        // `self` in a prototype is typed over the trait's `Self`.
        let self_type = comp
            .scope(trait_scope)
            .symbols_named("Self")
            .first()
            .copied()
            .unwrap_or(comp.error_symbols.error_type);
        let self_ref = comp.reference_type(self_type);
        params.push(comp.install_symbol(Symbol {
            ident: Ident::new(self_param.location, "self"),
            scope: proto_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::Param(ParamSymbol {
                var_type: self_ref,
                index: 0,
                is_self: true,
            }),
            is_error: false,
        }));
    }
    for param in &syntax.params {
        let var_type = resolve::resolve_type_or_error(comp, proto_scope, &param.type_name, bag);
        let index = params.len();
        params.push(comp.install_symbol(Symbol {
            ident: param.name.clone(),
            scope: proto_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::Param(ParamSymbol {
                var_type,
                index,
                is_self: false,
            }),
            is_error: false,
        }));
    }

    let return_type = match &syntax.return_type {
        Some(type_name) => resolve::resolve_type_or_error(comp, proto_scope, type_name, bag),
        None => comp.natives.void,
    };

    // A prototype is dynamically dispatchable only when nothing about it
    // depends on compile-time type parameters beyond `Self`.
    let is_dyn_dispatchable = syntax.template_params.is_empty() && syntax.self_param.is_some();

    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope: trait_scope,
        access: AccessModifier::Public,
        kind: SymbolKind::Prototype(PrototypeSymbol {
            self_scope: proto_scope,
            params,
            has_self_param: syntax.self_param.is_some(),
            return_type,
            owner_trait: trait_symbol,
            type_param_count: syntax.template_params.len(),
            is_dyn_dispatchable,
        }),
        is_error: false,
    });
    let symbol = bag.collect_opt(declared)?;
    comp.scopes.get_mut(proto_scope).owner = Some(symbol);
    Some(symbol)
}

fn declare_use(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<UseSyntax>,
    bag: &mut DiagnosticBag,
) {
    let resolved = resolve::resolve_symbol(comp, scope, &syntax.target, None, ExpectedKind::Any);
    let Some(target) = bag.collect_opt(resolved) else {
        return;
    };
    let name = syntax.target.last().ident.name.clone();
    let declared = comp.declare_symbol(Symbol {
        ident: Ident::new(syntax.location, name),
        scope,
        access: syntax.access,
        kind: SymbolKind::ReimportAlias(ReimportAliasSymbol {
            aliased: comp.get_root(target),
        }),
        is_error: false,
    });
    bag.collect_opt(declared);
}

fn declare_constraints(
    comp: &mut Compilation,
    scope: ScopeId,
    constraints: &[ConstraintSyntax],
    bag: &mut DiagnosticBag,
) {
    for constraint in constraints {
        let subject = resolve::resolve_type_or_error(comp, scope, &constraint.subject, bag);
        for trait_name in &constraint.traits {
            let resolved =
                resolve::resolve_symbol(comp, scope, trait_name, None, ExpectedKind::Trait);
            let Some(bound_trait) = bag.collect_opt(resolved) else {
                continue;
            };
            comp.install_symbol(Symbol {
                ident: Ident::new(constraint.location, "$constraint"),
                scope,
                access: AccessModifier::Private,
                kind: SymbolKind::Constraint(ConstraintSymbol {
                    subject,
                    bound_trait: comp.get_root(bound_trait),
                }),
                is_error: false,
            });
        }
    }
}

/// Create and declare a function symbol. `self_type` is the implemented
/// type for impl members; `alias_args` pre-installs template-argument
/// aliases (instances only).
#[allow(clippy::too_many_arguments)]
fn create_function_symbol(
    comp: &mut Compilation,
    syntax: &FunctionSyntax,
    declaring_scope: ScopeId,
    self_type: Option<SymbolId>,
    aliases: &[(Ident, SymbolId, usize, bool)],
    template_identity: Option<(SymbolId, Vec<SymbolId>, Vec<SymbolId>)>,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let fn_scope = comp.scopes.create_child(declaring_scope, Some(&syntax.name.name));

    for (ident, aliased, index, is_impl_arg) in aliases {
        comp.install_symbol(Symbol {
            ident: ident.clone(),
            scope: fn_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateArgAlias(TemplateArgAliasSymbol {
                aliased: *aliased,
                index: *index,
                is_impl_arg: *is_impl_arg,
            }),
            is_error: false,
        });
    }

    let mut params = Vec::new();
    if syntax.self_param.is_some() {
        if let Some(self_type) = self_type {
            let self_ref = comp.reference_type(self_type);
            let location = syntax.self_param.as_ref().unwrap().location;
            params.push(comp.install_symbol(Symbol {
                ident: Ident::new(location, "self"),
                scope: fn_scope,
                access: AccessModifier::Private,
                kind: SymbolKind::Param(ParamSymbol {
                    var_type: self_ref,
                    index: 0,
                    is_self: true,
                }),
                is_error: false,
            }));
        }
    }
    for param in &syntax.params {
        let var_type = resolve::resolve_type_or_error(comp, fn_scope, &param.type_name, bag);
        let index = params.len();
        let declared = comp.declare_symbol(Symbol {
            ident: param.name.clone(),
            scope: fn_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::Param(ParamSymbol {
                var_type,
                index,
                is_self: false,
            }),
            is_error: false,
        });
        if let Some(param_symbol) = bag.collect_opt(declared) {
            params.push(param_symbol);
        }
    }

    let return_type = match &syntax.return_type {
        Some(type_name) => resolve::resolve_type_or_error(comp, fn_scope, type_name, bag),
        None => comp.natives.void,
    };

    declare_constraints(comp, fn_scope, &syntax.constraints, bag);

    let has_self_param = syntax.self_param.is_some() && self_type.is_some();
    let (template, template_args, impl_template_args) = match template_identity {
        Some((template, args, impl_args)) => (Some(template), args, impl_args),
        None => (None, Vec::new(), Vec::new()),
    };
    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope: declaring_scope,
        access: syntax.access,
        kind: SymbolKind::Function(FunctionSymbol {
            self_scope: fn_scope,
            params,
            has_self_param,
            return_type,
            category: if has_self_param {
                SymbolCategory::Instance
            } else {
                SymbolCategory::Static
            },
            is_native: false,
            is_extern: syntax.is_extern,
            body: None,
            template,
            template_args,
            impl_template_args,
            glue_of: None,
        }),
        is_error: false,
    });
    let symbol = bag.collect_opt(declared)?;
    comp.scopes.get_mut(fn_scope).owner = Some(symbol);
    Some(symbol)
}

fn declare_function(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<FunctionSyntax>,
    self_type: Option<SymbolId>,
    _impl_params: &[SymbolId],
    output: &mut DeclOutput,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let symbol = create_function_symbol(comp, syntax, scope, self_type, &[], None, bag)?;
    if let Some(block) = &syntax.block {
        output.bindings.push(FunctionBlockBinding {
            function: symbol,
            block: block.clone(),
        });
    }
    Some(symbol)
}

/// Declare a type or function template: the symbol, its placeholder
/// parameter types, and nothing else; the subtree is re-declared per
/// instantiation.
fn declare_template(
    comp: &mut Compilation,
    scope: ScopeId,
    decl: TemplateDecl,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    declare_template_in(comp, scope, decl, &[], None, bag)
}

fn declare_template_in(
    comp: &mut Compilation,
    scope: ScopeId,
    decl: TemplateDecl,
    impl_params: &[SymbolId],
    impl_subject: Option<SymbolId>,
    bag: &mut DiagnosticBag,
) -> Option<SymbolId> {
    let (name, param_syntaxes) = match &decl {
        TemplateDecl::Struct(syntax) => (syntax.name.clone(), syntax.template_params.clone()),
        TemplateDecl::Function(syntax) => (syntax.name.clone(), syntax.template_params.clone()),
    };
    let self_scope = comp.scopes.create_child(scope, Some(&name.name));
    let kind = match &decl {
        TemplateDecl::Struct(_) => SymbolKind::TypeTemplate(TemplateSymbol {
            self_scope,
            params: Vec::new(),
            impl_params: impl_params.to_vec(),
            impl_subject,
            decl: decl.clone(),
            instances: Vec::new(),
            placeholder: None,
        }),
        TemplateDecl::Function(_) => SymbolKind::FunctionTemplate(TemplateSymbol {
            self_scope,
            params: Vec::new(),
            impl_params: impl_params.to_vec(),
            impl_subject,
            decl: decl.clone(),
            instances: Vec::new(),
            placeholder: None,
        }),
    };
    let access = match &decl {
        TemplateDecl::Struct(syntax) => syntax.access,
        TemplateDecl::Function(syntax) => syntax.access,
    };
    let declared = comp.declare_symbol(Symbol {
        ident: name,
        scope,
        access,
        kind,
        is_error: false,
    });
    let symbol = bag.collect_opt(declared)?;
    comp.scopes.get_mut(self_scope).owner = Some(symbol);

    let mut params = Vec::new();
    for (index, param) in param_syntaxes.iter().enumerate() {
        params.push(comp.install_symbol(Symbol {
            ident: param.ident.clone(),
            scope: self_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
                index,
                is_impl_param: false,
                owner: Some(symbol),
            }),
            is_error: false,
        }));
    }
    if let Some(template) = comp.symbol_mut(symbol).as_template_mut() {
        template.params = params;
    }
    Some(symbol)
}

fn declare_static_var(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<StaticVarSyntax>,
    output: &mut DeclOutput,
    bag: &mut DiagnosticBag,
) {
    let var_type = resolve::resolve_type_or_error(comp, scope, &syntax.type_name, bag);
    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope,
        access: syntax.access,
        kind: SymbolKind::StaticVar(StaticVarSymbol { var_type }),
        is_error: false,
    });
    let Some(symbol) = bag.collect_opt(declared) else {
        return;
    };
    if let Some(initializer) = &syntax.initializer {
        output.static_inits.push(StaticVarBinding {
            var: symbol,
            scope,
            initializer: initializer.clone(),
        });
    }
}

fn declare_field(
    comp: &mut Compilation,
    struct_symbol: SymbolId,
    index: usize,
    syntax: &FieldSyntax,
    bag: &mut DiagnosticBag,
) {
    let self_scope = comp.symbol(struct_symbol).as_struct().unwrap().self_scope;
    let var_type = resolve::resolve_type_or_error(comp, self_scope, &syntax.type_name, bag);
    let declared = comp.declare_symbol(Symbol {
        ident: syntax.name.clone(),
        scope: self_scope,
        access: syntax.access,
        kind: SymbolKind::InstanceVar(InstanceVarSymbol { var_type, index }),
        is_error: false,
    });
    if let Some(field) = bag.collect_opt(declared) {
        if let Some(struct_data) = comp.symbol_mut(struct_symbol).as_struct_mut() {
            struct_data.fields.push(field);
        }
    }
}

fn declare_impl(
    comp: &mut Compilation,
    scope: ScopeId,
    syntax: &Arc<ImplSyntax>,
    deferred: &mut Deferred,
    bag: &mut DiagnosticBag,
) {
    let self_scope = comp.scopes.create_child(scope, None);

    // Impl-level template parameters become placeholders in the impl's
    // scope; the subject is then the type template itself.
    let mut impl_params = Vec::new();
    for (index, param) in syntax.template_params.iter().enumerate() {
        impl_params.push(comp.install_symbol(Symbol {
            ident: param.ident.clone(),
            scope: self_scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
                index,
                is_impl_param: true,
                owner: None,
            }),
            is_error: false,
        }));
    }

    let subject = if syntax.template_params.is_empty() {
        let resolved = resolve::resolve_type(comp, scope, &syntax.type_name);
        match bag.collect_opt(resolved) {
            Some(subject) => comp.get_root(subject),
            None => return,
        }
    } else {
        let resolved =
            resolve::exclusive_resolve_template(comp, scope, &syntax.type_name.name.last().ident);
        match bag.collect_opt(resolved) {
            Some(subject) => subject,
            None => return,
        }
    };

    let trait_symbol = match &syntax.trait_name {
        Some(trait_name) => {
            let resolved =
                resolve::resolve_symbol(comp, scope, trait_name, None, ExpectedKind::Trait);
            match bag.collect_opt(resolved) {
                Some(symbol) => Some(comp.get_root(symbol)),
                None => return,
            }
        }
        None => None,
    };

    declare_constraints(comp, self_scope, &syntax.constraints, bag);

    let kind = match trait_symbol {
        Some(implemented_trait) => SymbolKind::TraitImpl(TraitImplSymbol {
            self_scope,
            implemented_trait,
            subject,
            impl_params: impl_params.clone(),
            functions: Vec::new(),
        }),
        None => SymbolKind::InherentImpl(ImplSymbol {
            self_scope,
            subject,
            impl_params: impl_params.clone(),
            functions: Vec::new(),
        }),
    };
    let declared = comp.declare_symbol(Symbol {
        ident: Ident::new(syntax.location, "$impl"),
        scope,
        access: AccessModifier::Public,
        kind,
        is_error: false,
    });
    let Some(impl_symbol) = bag.collect_opt(declared) else {
        return;
    };
    comp.scopes.get_mut(self_scope).owner = Some(impl_symbol);
    comp.impls.push(impl_symbol);

    // The association extends the subject's lookup surface with the
    // impl's scope; for templates it lives on the template's self-scope so
    // every instance sees it.
    if let Some(subject_body) = comp.body_scope(subject) {
        comp.scopes.define_association(subject_body, self_scope);
    }

    deferred
        .impl_members
        .push((impl_symbol, subject, impl_params, syntax.clone()));
}

/// Declare the member functions of an impl; runs at the inherent-member
/// stage so the subject and every type they mention exist.
fn declare_impl_members(
    comp: &mut Compilation,
    impl_symbol: SymbolId,
    subject: SymbolId,
    impl_params: &[SymbolId],
    syntax: &Arc<ImplSyntax>,
    output: &mut DeclOutput,
    bag: &mut DiagnosticBag,
) {
    let self_scope = match &comp.symbol(impl_symbol).kind {
        SymbolKind::InherentImpl(data) => data.self_scope,
        SymbolKind::TraitImpl(data) => data.self_scope,
        _ => return,
    };
    let is_templated = !impl_params.is_empty();

    let mut functions = Vec::new();
    for function in &syntax.functions {
        let symbol = if is_templated || !function.template_params.is_empty() {
            declare_template_in(
                comp,
                self_scope,
                TemplateDecl::Function(function.clone()),
                impl_params,
                Some(subject),
                bag,
            )
        } else {
            let member = create_function_symbol(
                comp,
                function,
                self_scope,
                Some(subject),
                &[],
                None,
                bag,
            );
            if let (Some(symbol), Some(block)) = (member, &function.block) {
                output.bindings.push(FunctionBlockBinding {
                    function: symbol,
                    block: block.clone(),
                });
            }
            member
        };
        if let Some(symbol) = symbol {
            functions.push(symbol);
        }
    }

    match &mut comp.symbol_mut(impl_symbol).kind {
        SymbolKind::InherentImpl(data) => data.functions = functions,
        SymbolKind::TraitImpl(data) => data.functions = functions,
        _ => {}
    }
}

/// Materialise a struct-template instance: fresh self-scope, argument
/// aliases, re-declared fields. The instance is registered before its
/// fields resolve, so self-referential types terminate.
pub fn declare_struct_instance(
    comp: &mut Compilation,
    syntax: &Arc<StructSyntax>,
    template: SymbolId,
    impl_args: &[SymbolId],
    args: &[SymbolId],
) -> Expected<SymbolId> {
    let mut bag = DiagnosticBag::new();
    let defining_scope = comp.symbol(template).scope;
    let template_data = comp.symbol(template).as_template().unwrap();
    let params = template_data.params.clone();
    let impl_params = template_data.impl_params.clone();

    let self_scope = comp.scopes.create_child(defining_scope, None);
    install_arg_aliases(comp, self_scope, &params, args, false);
    install_arg_aliases(comp, self_scope, &impl_params, impl_args, true);

    let symbol = comp.install_symbol(Symbol {
        ident: syntax.name.clone(),
        scope: defining_scope,
        access: syntax.access,
        kind: SymbolKind::Struct(StructSymbol {
            self_scope,
            fields: Vec::new(),
            flags: TypeFlags::empty(),
            size_cache: None,
            size_in_progress: false,
            copy_glue: None,
            drop_glue: None,
            template: Some(template),
            template_args: args.iter().map(|arg| comp.get_root(*arg)).collect(),
            impl_template_args: impl_args.iter().map(|arg| comp.get_root(*arg)).collect(),
        }),
        is_error: false,
    });
    comp.scopes.get_mut(self_scope).owner = Some(symbol);
    instantiate::register_instance(comp, template, impl_args, args, symbol);

    for (index, field) in syntax.fields.iter().enumerate() {
        declare_field(comp, symbol, index, field, &mut bag);
    }
    Expected::found_with(symbol, bag)
}

/// Materialise a function-template instance; queues its body for the next
/// binding iteration.
pub fn declare_function_instance(
    comp: &mut Compilation,
    syntax: &Arc<FunctionSyntax>,
    template: SymbolId,
    impl_args: &[SymbolId],
    args: &[SymbolId],
    location: SrcLocation,
) -> Expected<SymbolId> {
    let mut bag = DiagnosticBag::new();
    let defining_scope = comp.symbol(template).scope;
    let template_data = comp.symbol(template).as_template().unwrap();
    let params = template_data.params.clone();
    let impl_params = template_data.impl_params.clone();
    let impl_subject = template_data.impl_subject;

    // The self type of a member instance: the subject, instantiated with
    // the impl arguments when the subject is itself a template.
    let self_type = match impl_subject {
        Some(subject) => {
            if comp.symbol(subject).is_template() {
                match instantiate::lookup_instance(comp, subject, &[], impl_args) {
                    Some(instance) => Some(instance),
                    None => {
                        let instantiated =
                            instantiate::instantiate(comp, subject, &[], impl_args, location);
                        bag.collect_opt(instantiated)
                    }
                }
            } else {
                Some(subject)
            }
        }
        None => None,
    };

    let mut aliases = Vec::new();
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        aliases.push((comp.symbol(*param).ident.clone(), *arg, index, false));
    }
    for (index, (param, arg)) in impl_params.iter().zip(impl_args).enumerate() {
        aliases.push((comp.symbol(*param).ident.clone(), *arg, index, true));
    }

    let identity = Some((
        template,
        args.iter().map(|arg| comp.get_root(*arg)).collect(),
        impl_args.iter().map(|arg| comp.get_root(*arg)).collect(),
    ));
    let Some(symbol) =
        create_function_symbol(comp, syntax, defining_scope, self_type, &aliases, identity, &mut bag)
    else {
        return Expected::none(bag);
    };
    instantiate::register_instance(comp, template, impl_args, args, symbol);

    if let Some(block) = &syntax.block {
        comp.pending_bindings.push(FunctionBlockBinding {
            function: symbol,
            block: block.clone(),
        });
    }
    Expected::found_with(symbol, bag)
}

fn install_arg_aliases(
    comp: &mut Compilation,
    scope: ScopeId,
    params: &[SymbolId],
    args: &[SymbolId],
    is_impl_arg: bool,
) {
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let ident = comp.symbol(*param).ident.clone();
        comp.install_symbol(Symbol {
            ident,
            scope,
            access: AccessModifier::Private,
            kind: SymbolKind::TemplateArgAlias(TemplateArgAliasSymbol {
                aliased: *arg,
                index,
                is_impl_arg,
            }),
            is_error: false,
        });
    }
}
