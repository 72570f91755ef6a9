//! Multi-section symbol-path resolution.
//!
//! A path resolves section by section: the start scope is found by walking
//! outward until a scope knows the first name (or its template key); every
//! later section looks inside the previous symbol's body scope and that
//! scope's associations. Template sections deduce arguments and resolve or
//! instantiate through the generic engine; the final section filters by
//! expected kind, argument-type convertibility and visibility.

use ace_ast::{SymbolName, SymbolNameSection, TypeName, TypeNameModifier};
use ace_error::{DiagnosticBag, Expected};
use ace_span::Ident;

use crate::compilation::{Compilation, WrapperKind};
use crate::diagnostics;
use crate::instantiate;
use crate::scope::{template_key, ScopeId};
use crate::symbol::{SymbolCategory, SymbolId, SymbolKind};
use crate::ty::TypeInfo;

/// What the caller expects the resolved symbol to be; wrong-kind
/// candidates are discarded before the zero/many check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Any,
    Type,
    Trait,
    Callable,
    Value,
}

fn kind_matches(comp: &Compilation, id: SymbolId, expected: ExpectedKind) -> bool {
    let root = comp.get_root(id);
    match expected {
        ExpectedKind::Any => true,
        ExpectedKind::Type => comp.is_type_symbol(root),
        ExpectedKind::Trait => matches!(comp.symbol(root).kind, SymbolKind::Trait(_)),
        ExpectedKind::Callable => matches!(
            comp.symbol(root).kind,
            SymbolKind::Function(_) | SymbolKind::Prototype(_)
        ),
        ExpectedKind::Value => matches!(
            comp.symbol(root).kind,
            SymbolKind::StaticVar(_)
                | SymbolKind::LocalVar(_)
                | SymbolKind::Param(_)
                | SymbolKind::InstanceVar(_)
        ),
    }
}

/// A symbol is visible when it is public or when its defining module's
/// body scope is an ancestor of the resolving scope.
pub fn is_symbol_visible(comp: &Compilation, symbol: SymbolId, from: ScopeId) -> bool {
    match comp.symbol(symbol).access {
        ace_ast::AccessModifier::Public => true,
        ace_ast::AccessModifier::Private => {
            let Some(module) = comp.find_module(comp.symbol(symbol).scope) else {
                // Compiler-installed symbols outside any module.
                return true;
            };
            let Some(body) = comp.body_scope(module) else {
                return true;
            };
            comp.scopes.is_ancestor_of(body, from)
        }
    }
}

/// Template-argument aliases of the enclosing instantiated impl scopes,
/// outward from `scope`; these feed templated-impl member instantiation.
pub fn collect_impl_args_static(comp: &Compilation, scope: ScopeId) -> Vec<SymbolId> {
    let mut current = Some(scope);
    while let Some(id) = current {
        let mut aliases: Vec<(usize, SymbolId)> = comp
            .scope(id)
            .all_symbols()
            .filter_map(|symbol| match &comp.symbol(symbol).kind {
                SymbolKind::TemplateArgAlias(alias) if alias.is_impl_arg => {
                    Some((alias.index, alias.aliased))
                }
                _ => None,
            })
            .collect();
        if !aliases.is_empty() {
            aliases.sort_by_key(|(index, _)| *index);
            return aliases.into_iter().map(|(_, aliased)| aliased).collect();
        }
        current = comp.scope(id).parent;
    }
    Vec::new()
}

fn find_start_scope(comp: &Compilation, from: ScopeId, name: &str) -> Option<ScopeId> {
    let template = template_key(name);
    let mut current = Some(from);
    while let Some(id) = current {
        let scope = comp.scope(id);
        if scope.has_name(name) || scope.has_name(&template) {
            return Some(id);
        }
        current = scope.parent;
    }
    None
}

/// Resolve the explicit template arguments of one path section.
fn resolve_section_args(
    comp: &mut Compilation,
    from: ScopeId,
    section: &SymbolNameSection,
    bag: &mut DiagnosticBag,
) -> Vec<SymbolId> {
    section
        .template_args
        .iter()
        .map(|arg| resolve_type_or_error(comp, from, arg, bag))
        .collect()
}

struct SectionMatch {
    symbols: Vec<SymbolId>,
    /// A template matched but deduction or instantiation failed; the
    /// cause is already in the bag.
    template_failed: bool,
}

fn collect_matching(
    comp: &mut Compilation,
    scope: ScopeId,
    section: &SymbolNameSection,
    is_last: bool,
    explicit_args: &[SymbolId],
    impl_args: &[SymbolId],
    args_hint: Option<&[SymbolId]>,
    bag: &mut DiagnosticBag,
) -> SectionMatch {
    let name = section.ident.name.as_str();
    let template = template_key(name);

    let plain: Vec<SymbolId> = comp.scope(scope).symbols_named(name).to_vec();
    let template_symbols: Vec<SymbolId> = comp.scope(scope).symbols_named(&template).to_vec();

    if template_symbols.is_empty() {
        return SectionMatch {
            symbols: plain,
            template_failed: false,
        };
    }

    // A single instance variable shadows the template form on the last
    // section: `value.len` must not instantiate a `len` template.
    let is_instance_var = is_last
        && plain.len() == 1
        && matches!(
            comp.symbol(comp.get_root(plain[0])).kind,
            SymbolKind::InstanceVar(_)
        );

    let treat_as_template = !is_instance_var && (is_last || !section.template_args.is_empty());
    if !treat_as_template {
        // A template named mid-path without arguments: its self-scope
        // hosts the placeholder members.
        return SectionMatch {
            symbols: template_symbols,
            template_failed: false,
        };
    }

    let template_id = template_symbols[0];
    let resolved = instantiate::resolve_or_instantiate(
        comp,
        template_id,
        explicit_args,
        impl_args,
        args_hint,
        section.ident.location,
    );
    match bag.collect_opt(resolved) {
        Some(instance) => SectionMatch {
            symbols: vec![instance],
            template_failed: false,
        },
        None => SectionMatch {
            symbols: vec![],
            template_failed: true,
        },
    }
}

fn candidate_idents(comp: &Compilation, candidates: &[SymbolId]) -> Vec<Ident> {
    candidates
        .iter()
        .map(|id| comp.symbol(*id).ident.clone())
        .collect()
}

/// Discard function candidates whose parameter lists cannot accept the
/// hinted argument types under the conversion rules. `skip_self` skips
/// the self parameter for instance calls.
fn filter_by_arg_types(
    comp: &Compilation,
    candidates: &mut Vec<SymbolId>,
    hint: &[SymbolId],
    skip_self: bool,
) {
    candidates.retain(|candidate| {
        let root = comp.get_root(*candidate);
        let Some(function) = comp.symbol(root).as_function() else {
            return true;
        };
        // An instance function reached through a static path survives the
        // filter; the category check owns that diagnosis.
        if function.has_self_param && !skip_self {
            return true;
        }
        let params: Vec<SymbolId> = function
            .params
            .iter()
            .skip(if skip_self && function.has_self_param { 1 } else { 0 })
            .filter_map(|param| comp.var_type(*param))
            .collect();
        if params.len() != hint.len() {
            return false;
        }
        params.iter().zip(hint).all(|(param, arg)| {
            comp.are_types_convertible(TypeInfo::rvalue(*arg), *param)
                || comp.are_types_convertible(TypeInfo::lvalue(*arg), *param)
        })
    });
}

fn resolve_in_scopes(
    comp: &mut Compilation,
    from: ScopeId,
    name: &SymbolName,
    mut scopes: Vec<ScopeId>,
    impl_args: Vec<SymbolId>,
    args_hint: Option<&[SymbolId]>,
    skip_self_in_hint: bool,
    expected: ExpectedKind,
) -> Expected<SymbolId> {
    let mut bag = DiagnosticBag::new();

    for (index, section) in name.sections.iter().enumerate() {
        let is_last = index + 1 == name.sections.len();
        let explicit_args = resolve_section_args(comp, from, section, &mut bag);

        let mut candidates: Vec<SymbolId> = Vec::new();
        let mut template_failed = false;
        for scope in scopes.clone() {
            let matched = collect_matching(
                comp,
                scope,
                section,
                is_last,
                &explicit_args,
                &impl_args,
                args_hint,
                &mut bag,
            );
            template_failed |= matched.template_failed;
            for symbol in matched.symbols {
                if !candidates.contains(&symbol) {
                    candidates.push(symbol);
                }
            }
        }

        if is_last {
            candidates.retain(|candidate| kind_matches(comp, *candidate, expected));
            if let Some(hint) = args_hint {
                filter_by_arg_types(comp, &mut candidates, hint, skip_self_in_hint);
            }
            match candidates.len() {
                0 => {
                    if !template_failed {
                        bag.add(diagnostics::undeclared_symbol_ref_error(
                            section.ident.location,
                            &section.ident.name,
                        ));
                    }
                    return Expected::none(bag);
                }
                1 => {
                    let symbol = candidates[0];
                    if !is_symbol_visible(comp, symbol, from) {
                        let declaration = comp.symbol(symbol).ident.clone();
                        bag.add(diagnostics::inaccessible_symbol_error(
                            section.ident.location,
                            &declaration,
                        ));
                        return Expected::none(bag);
                    }
                    return Expected::found_with(symbol, bag);
                }
                _ => {
                    bag.add(diagnostics::ambiguous_symbol_ref_error(
                        section.ident.location,
                        &section.ident.name,
                        &candidate_idents(comp, &candidates),
                    ));
                    return Expected::none(bag);
                }
            }
        }

        // Middle sections must name exactly one self-scoped, visible
        // symbol; its body scope and associations carry the next section.
        match candidates.len() {
            0 => {
                if !template_failed {
                    bag.add(diagnostics::undeclared_symbol_ref_error(
                        section.ident.location,
                        &section.ident.name,
                    ));
                }
                return Expected::none(bag);
            }
            1 => {}
            _ => {
                bag.add(diagnostics::ambiguous_symbol_ref_error(
                    section.ident.location,
                    &section.ident.name,
                    &candidate_idents(comp, &candidates),
                ));
                return Expected::none(bag);
            }
        }
        let symbol = candidates[0];
        if !is_symbol_visible(comp, symbol, from) {
            let declaration = comp.symbol(symbol).ident.clone();
            bag.add(diagnostics::inaccessible_symbol_error(
                section.ident.location,
                &declaration,
            ));
            return Expected::none(bag);
        }
        let Some(body) = comp.body_scope(comp.get_root(symbol)) else {
            let ident = comp.symbol(symbol).ident.clone();
            bag.add(diagnostics::scope_access_of_non_self_scoped_symbol_error(
                section.ident.location,
                &ident,
            ));
            return Expected::none(bag);
        };
        scopes = std::iter::once(body)
            .chain(comp.scope(body).associations.iter().copied())
            .collect();
    }

    unreachable!("symbol names always have at least one section")
}

/// Resolve a static symbol path from `from`.
pub fn resolve_symbol(
    comp: &mut Compilation,
    from: ScopeId,
    name: &SymbolName,
    args_hint: Option<&[SymbolId]>,
    expected: ExpectedKind,
) -> Expected<SymbolId> {
    let start = if name.is_global {
        comp.global_scope()
    } else {
        match find_start_scope(comp, from, &name.first().ident.name) {
            Some(scope) => scope,
            None => {
                return Expected::fail(diagnostics::undeclared_symbol_ref_error(
                    name.first().ident.location,
                    &name.first().ident.name,
                ));
            }
        }
    };

    let impl_args = collect_impl_args_static(comp, start);
    let resolved = resolve_in_scopes(
        comp,
        from,
        name,
        vec![start],
        impl_args,
        args_hint,
        false,
        expected,
    );

    // Static paths never land on instance symbols.
    let (value, mut bag) = resolved.into_parts();
    if let Some(symbol) = value {
        if comp.category(symbol) == SymbolCategory::Instance {
            bag.add(diagnostics::incorrect_symbol_category_error(
                name.last().ident.location,
                SymbolCategory::Static,
            ));
            return Expected::none(bag);
        }
    }
    Expected::new(value, bag)
}

/// Resolve a member reached through a value of `self_type`: the scopes are
/// the type's self-scope plus its (or its template's) associations.
pub fn resolve_instance_member(
    comp: &mut Compilation,
    from: ScopeId,
    self_type: SymbolId,
    name: &SymbolName,
    args_hint: Option<&[SymbolId]>,
) -> Expected<SymbolId> {
    let derefed = comp.get_derefed(self_type);
    if comp.is_error_symbol(derefed) {
        return Expected::found(comp.error_symbols.error_var);
    }
    let Some(self_scope) = comp.body_scope(derefed) else {
        return Expected::fail(diagnostics::scope_access_of_non_self_scoped_symbol_error(
            name.first().ident.location,
            &comp.symbol(derefed).ident.clone(),
        ));
    };

    // Impls on the concrete type associate its own self-scope; impls on
    // the template associate the template's self-scope, visible to every
    // mono. Both surfaces apply.
    let mut scopes: Vec<ScopeId> = vec![self_scope];
    scopes.extend(comp.scope(self_scope).associations.iter().copied());
    if let Some(template) = comp.type_template(derefed) {
        if let Some(template_scope) = comp.body_scope(template) {
            for association in comp.scope(template_scope).associations.iter().copied() {
                if !scopes.contains(&association) {
                    scopes.push(association);
                }
            }
        }
    }

    let impl_args = comp.collect_type_args(derefed);

    let resolved = resolve_in_scopes(
        comp,
        from,
        name,
        scopes,
        impl_args,
        args_hint,
        true,
        ExpectedKind::Any,
    );
    let (value, mut bag) = resolved.into_parts();
    if let Some(symbol) = value {
        if comp.category(symbol) == SymbolCategory::Static {
            bag.add(diagnostics::incorrect_symbol_category_error(
                name.last().ident.location,
                SymbolCategory::Instance,
            ));
            return Expected::none(bag);
        }
    }
    Expected::new(value, bag)
}

/// Resolve a written type: the path, then the wrapper modifiers outermost
/// first.
pub fn resolve_type(
    comp: &mut Compilation,
    from: ScopeId,
    type_name: &TypeName,
) -> Expected<SymbolId> {
    let mut bag = DiagnosticBag::new();
    let resolved = resolve_symbol(comp, from, &type_name.name, None, ExpectedKind::Type);
    let Some(mut ty) = bag.collect_opt(resolved) else {
        return Expected::none(bag);
    };
    for modifier in type_name.modifiers.iter().rev() {
        ty = match modifier {
            TypeNameModifier::Reference => comp.wrapper_type(WrapperKind::Reference, ty),
            TypeNameModifier::StrongPtr => comp.wrapper_type(WrapperKind::StrongPtr, ty),
            TypeNameModifier::WeakPtr => comp.wrapper_type(WrapperKind::WeakPtr, ty),
        };
    }
    Expected::found_with(ty, bag)
}

/// Resolve a type, substituting the error sentinel on failure so the
/// caller keeps checking.
pub fn resolve_type_or_error(
    comp: &mut Compilation,
    from: ScopeId,
    type_name: &TypeName,
    bag: &mut DiagnosticBag,
) -> SymbolId {
    bag.collect_opt(resolve_type(comp, from, type_name))
        .unwrap_or(comp.error_symbols.error_type)
}

/// Resolve a template symbol by its bare name, walking outward; used when
/// an impl names the template it extends.
pub fn exclusive_resolve_template(
    comp: &mut Compilation,
    from: ScopeId,
    ident: &Ident,
) -> Expected<SymbolId> {
    let key = template_key(&ident.name);
    let mut current = Some(from);
    while let Some(id) = current {
        let found = comp.scope(id).symbols_named(&key).to_vec();
        if let Some(template) = found.first() {
            return Expected::found(*template);
        }
        current = comp.scope(id).parent;
    }
    Expected::fail(diagnostics::undeclared_symbol_ref_error(
        ident.location,
        &ident.name,
    ))
}
