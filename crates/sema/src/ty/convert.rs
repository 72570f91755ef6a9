//! The type-conversion rules: what makes an argument acceptable where a
//! parameter type is expected, and which coercion the sema node must
//! record for the emitter.

use crate::compilation::Compilation;
use crate::symbol::{SizeKind, SymbolId, SymbolKind};
use crate::ty::{TypeInfo, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Same unaliased type.
    Identity,
    /// Implicit native conversion from the widening map.
    NativeWidening,
    /// `T` l-value where `&T` is expected.
    Borrow,
    /// `&T` where sized `T` is expected.
    Deref,
    /// `&Struct` where `&Trait` is expected and the struct implements the
    /// trait; the emitter materialises the vtable.
    Dyn,
    /// A written `cast[T](expr)`; checked loosely over primitives.
    Explicit,
}

/// The conversion that makes `src` acceptable as `dst`, or `None`.
pub fn conversion(comp: &Compilation, src: TypeInfo, dst: SymbolId) -> Option<ConversionKind> {
    let src_root = comp.get_root(src.ty);
    let dst_root = comp.get_root(dst);

    // Error sentinels convert to anything; the cause is already reported.
    if comp.is_error_symbol(src_root) || comp.is_error_symbol(dst_root) {
        return Some(ConversionKind::Identity);
    }

    if src_root == dst_root {
        return Some(ConversionKind::Identity);
    }

    if comp.natives.is_implicitly_convertible(src_root, dst_root) {
        return Some(ConversionKind::NativeWidening);
    }

    // Reference coercion: T l-value → &T.
    if let SymbolKind::Reference(expected) = &comp.symbol(dst_root).kind {
        let expected_inner = comp.get_root(expected.inner);
        if expected_inner == src_root && src.value_kind == ValueKind::LValue {
            return Some(ConversionKind::Borrow);
        }
        // Dyn coercion: &Struct → &Trait.
        if let SymbolKind::Reference(given) = &comp.symbol(src_root).kind {
            let given_inner = comp.get_root(given.inner);
            let expected_is_trait =
                matches!(comp.symbol(expected_inner).kind, SymbolKind::Trait(_));
            if expected_is_trait && struct_implements_trait(comp, given_inner, expected_inner) {
                return Some(ConversionKind::Dyn);
            }
        }
    }

    // Auto-deref: &T → T for sized T.
    if let SymbolKind::Reference(given) = &comp.symbol(src_root).kind {
        let given_inner = comp.get_root(given.inner);
        if given_inner == dst_root && is_statically_sized(comp, given_inner) {
            return Some(ConversionKind::Deref);
        }
    }

    None
}

impl Compilation {
    /// Whether an argument of `src` is acceptable as a parameter of `dst`.
    pub fn are_types_convertible(&self, src: TypeInfo, dst: SymbolId) -> bool {
        conversion(self, src, dst).is_some()
    }
}

fn is_statically_sized(comp: &Compilation, id: SymbolId) -> bool {
    match &comp.symbol(comp.get_root(id)).kind {
        SymbolKind::Struct(symbol) => symbol.size_cache != Some(SizeKind::Unsized),
        SymbolKind::Trait(_) => false,
        _ => true,
    }
}

/// Whether a trait impl for `(trait, struct)` is declared, directly or
/// through the struct's template.
pub fn struct_implements_trait(
    comp: &Compilation,
    struct_id: SymbolId,
    trait_id: SymbolId,
) -> bool {
    let struct_root = comp.get_root(struct_id);
    let trait_root = comp.get_root(trait_id);
    let template = comp.type_template(struct_root);
    comp.impls.iter().any(|impl_id| {
        let SymbolKind::TraitImpl(trait_impl) = &comp.symbol(*impl_id).kind else {
            return false;
        };
        if comp.get_root(trait_impl.implemented_trait) != trait_root {
            return false;
        }
        let subject = comp.get_root(trait_impl.subject);
        subject == struct_root || Some(subject) == template
    })
}
