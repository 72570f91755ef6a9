//! The monomorphiser: resolves template instances out of each template's
//! registry or materialises new ones by re-running declaration over the
//! template's subtree with argument aliases installed. Instances are
//! cached before their bodies are visited, so the lazy body-binding loop
//! terminates.

mod deduce;

pub use deduce::deduce_args;

use ace_error::{Diagnosed, DiagnosticBag, Expected};
use ace_span::SrcLocation;

use crate::compilation::Compilation;
use crate::declare;
use crate::diagnostics;
use crate::symbol::{InstanceKey, SymbolId, TemplateDecl};

/// Exact-match lookup in the template's instance registry: type identity
/// after alias unwrapping.
pub fn lookup_instance(
    comp: &Compilation,
    template: SymbolId,
    impl_args: &[SymbolId],
    args: &[SymbolId],
) -> Option<SymbolId> {
    let template_symbol = comp.symbol(template).as_template()?;
    template_symbol
        .instances
        .iter()
        .find(|(key, _)| {
            comp.type_lists_equal(&key.impl_args, impl_args)
                && comp.type_lists_equal(&key.args, args)
        })
        .map(|(_, instance)| *instance)
}

/// Deduce the full argument tuple, then resolve the already-instantiated
/// symbol or request a new instantiation.
pub fn resolve_or_instantiate(
    comp: &mut Compilation,
    template: SymbolId,
    explicit_args: &[SymbolId],
    impl_args: &[SymbolId],
    args_hint: Option<&[SymbolId]>,
    location: SrcLocation,
) -> Expected<SymbolId> {
    let mut bag = DiagnosticBag::new();

    let deduced = deduce_args(comp, template, explicit_args, args_hint, location);
    let Some(args) = bag.collect_opt(deduced) else {
        return Expected::none(bag);
    };

    let impl_param_count = comp
        .symbol(template)
        .as_template()
        .map(|symbol| symbol.impl_params.len())
        .unwrap_or(0);
    let impl_args: Vec<SymbolId> = if impl_args.len() == impl_param_count {
        impl_args.iter().map(|arg| comp.get_root(*arg)).collect()
    } else if impl_param_count == 0 {
        Vec::new()
    } else {
        bag.add(diagnostics::unable_to_deduce_template_args_error(location));
        return Expected::none(bag);
    };

    if let Some(instance) = lookup_instance(comp, template, &impl_args, &args) {
        return Expected::found_with(instance, bag);
    }

    let instantiated = instantiate(comp, template, &impl_args, &args, location);
    Expected::new(bag.collect_opt(instantiated), bag)
}

/// Materialise one instance. The declaration machinery creates the
/// instance's self-scope, installs one template-argument alias per
/// parameter, and re-declares the subtree through those aliases; the new
/// symbol is recorded in the registry keyed by `(impl_args, args)`.
pub fn instantiate(
    comp: &mut Compilation,
    template: SymbolId,
    impl_args: &[SymbolId],
    args: &[SymbolId],
    location: SrcLocation,
) -> Expected<SymbolId> {
    let decl = comp
        .symbol(template)
        .as_template()
        .expect("instantiation target is a template")
        .decl
        .clone();
    match decl {
        TemplateDecl::Struct(syntax) => {
            declare::declare_struct_instance(comp, &syntax, template, impl_args, args)
        }
        TemplateDecl::Function(syntax) => {
            declare::declare_function_instance(comp, &syntax, template, impl_args, args, location)
        }
    }
}

pub(crate) fn register_instance(
    comp: &mut Compilation,
    template: SymbolId,
    impl_args: &[SymbolId],
    args: &[SymbolId],
    instance: SymbolId,
) {
    let key = InstanceKey {
        impl_args: impl_args.iter().map(|arg| comp.get_root(*arg)).collect(),
        args: args.iter().map(|arg| comp.get_root(*arg)).collect(),
    };
    comp.symbol_mut(template)
        .as_template_mut()
        .expect("registering an instance on a template")
        .instances
        .push((key, instance));
}

/// Instantiate every template with its own parameters as arguments; the
/// resulting placeholder instances let template bodies be type-checked
/// generically and carry the parameter types deduction unifies against.
pub fn instantiate_placeholders(comp: &mut Compilation) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    let template_ids: Vec<SymbolId> = comp
        .symbols
        .iter()
        .filter(|(_, symbol)| symbol.is_template())
        .map(|(id, _)| id)
        .collect();

    for template in template_ids {
        let (params, impl_params, done) = {
            let symbol = comp.symbol(template).as_template().unwrap();
            (
                symbol.params.clone(),
                symbol.impl_params.clone(),
                symbol.placeholder.is_some(),
            )
        };
        if done {
            continue;
        }
        let location = comp.symbol(template).ident.location;
        let instantiated = instantiate(comp, template, &impl_params, &params, location);
        if let Some(instance) = bag.collect_opt(instantiated) {
            comp.symbol_mut(template)
                .as_template_mut()
                .unwrap()
                .placeholder = Some(instance);
        }
    }
    Diagnosed::new((), bag)
}
