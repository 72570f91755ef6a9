//! Type queries over the symbol graph: alias/wrapper projections, size
//! kinds with layout-cycle detection, triviality, and structural
//! could-unify used by the overlap diagnosis.

mod convert;

pub use convert::{conversion, ConversionKind};

use ace_error::{Diagnosed, DiagnosticBag};
use bitflags::bitflags;

use crate::compilation::Compilation;
use crate::diagnostics;
use crate::symbol::{SizeKind, SymbolId, SymbolKind};

bitflags! {
    /// Properties registered on native types and propagated to template
    /// instances; fast access to what would otherwise be a field walk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeFlags: u8 {
        const PRIMITIVELY_EMITTABLE = 1 << 0;
        const TRIVIALLY_COPYABLE = 1 << 1;
        const TRIVIALLY_DROPPABLE = 1 << 2;
        const NATIVE = 1 << 3;
    }
}

/// Whether an expression denotes a place or a temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    LValue,
    RValue,
}

/// The type half of every expression sema: a type symbol plus a value
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub ty: SymbolId,
    pub value_kind: ValueKind,
}

impl TypeInfo {
    pub fn lvalue(ty: SymbolId) -> Self {
        Self {
            ty,
            value_kind: ValueKind::LValue,
        }
    }

    pub fn rvalue(ty: SymbolId) -> Self {
        Self {
            ty,
            value_kind: ValueKind::RValue,
        }
    }
}

impl Compilation {
    /// Alias-free view of a type symbol.
    #[inline]
    pub fn get_unaliased(&self, id: SymbolId) -> SymbolId {
        self.get_root(id)
    }

    /// Strip reference wrappers (not pointers).
    pub fn get_without_ref(&self, id: SymbolId) -> SymbolId {
        let mut current = self.get_root(id);
        while let SymbolKind::Reference(wrapper) = &self.symbol(current).kind {
            current = self.get_root(wrapper.inner);
        }
        current
    }

    /// Strip references, strong pointers and weak pointers.
    pub fn get_derefed(&self, id: SymbolId) -> SymbolId {
        let mut current = self.get_root(id);
        loop {
            match &self.symbol(current).kind {
                SymbolKind::Reference(wrapper)
                | SymbolKind::StrongPtr(wrapper)
                | SymbolKind::WeakPtr(wrapper) => current = self.get_root(wrapper.inner),
                _ => return current,
            }
        }
    }

    /// Type identity after alias unwrapping. Wrapper types are interned,
    /// so identity extends through them.
    #[inline]
    pub fn types_equal(&self, lhs: SymbolId, rhs: SymbolId) -> bool {
        self.get_root(lhs) == self.get_root(rhs)
    }

    pub fn type_lists_equal(&self, lhs: &[SymbolId], rhs: &[SymbolId]) -> bool {
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(rhs)
                .all(|(lhs, rhs)| self.types_equal(*lhs, *rhs))
    }

    /// The template a type was instantiated from, when any.
    pub fn type_template(&self, id: SymbolId) -> Option<SymbolId> {
        match &self.symbol(self.get_root(id)).kind {
            SymbolKind::Struct(symbol) => symbol.template,
            _ => None,
        }
    }

    /// The template-argument tuple of an instance, in parameter order.
    pub fn collect_type_args(&self, id: SymbolId) -> Vec<SymbolId> {
        match &self.symbol(self.get_root(id)).kind {
            SymbolKind::Struct(symbol) => symbol.template_args.clone(),
            _ => Vec::new(),
        }
    }

    /// Sized or unsized. Cached per struct; re-entry into a struct whose
    /// fields are mid-walk is a layout cycle, reported at the field that
    /// closes it.
    pub fn size_kind(&mut self, id: SymbolId) -> Diagnosed<SizeKind> {
        let mut bag = DiagnosticBag::new();
        let kind = self.size_kind_inner(id, &mut bag);
        Diagnosed::new(kind, bag)
    }

    fn size_kind_inner(&mut self, id: SymbolId, bag: &mut DiagnosticBag) -> SizeKind {
        let root = self.get_root(id);
        match &self.symbol(root).kind {
            SymbolKind::Struct(symbol) => {
                if let Some(cached) = symbol.size_cache {
                    return cached;
                }
                if symbol.size_in_progress {
                    // The caller reports the cycle at the re-entrant field;
                    // degrade to sized so one cycle yields one diagnostic.
                    return SizeKind::Sized;
                }
                let fields = symbol.fields.clone();
                self.symbol_mut(root).as_struct_mut().unwrap().size_in_progress = true;
                let mut kind = SizeKind::Sized;
                for field in fields {
                    let Some(field_type) = self.var_type(field) else {
                        continue;
                    };
                    let field_root = self.get_root(field_type);
                    let re_entrant = matches!(
                        &self.symbol(field_root).kind,
                        SymbolKind::Struct(inner) if inner.size_in_progress
                    );
                    if re_entrant {
                        let field_ident = self.symbol(field).ident.clone();
                        bag.add(diagnostics::struct_field_causes_cycle_error(
                            self,
                            &field_ident,
                            field_root,
                        ));
                        continue;
                    }
                    if self.size_kind_inner(field_type, bag) == SizeKind::Unsized {
                        kind = SizeKind::Unsized;
                    }
                }
                let symbol = self.symbol_mut(root).as_struct_mut().unwrap();
                symbol.size_in_progress = false;
                symbol.size_cache = Some(kind);
                kind
            }
            SymbolKind::Trait(_) => SizeKind::Unsized,
            SymbolKind::Reference(_) | SymbolKind::StrongPtr(_) | SymbolKind::WeakPtr(_) => {
                SizeKind::Sized
            }
            SymbolKind::TemplateParamType(_) => SizeKind::Sized,
            _ => SizeKind::Sized,
        }
    }

    pub fn is_trivially_copyable(&self, id: SymbolId) -> bool {
        self.triviality(id, TypeFlags::TRIVIALLY_COPYABLE, &mut Vec::new())
    }

    pub fn is_trivially_droppable(&self, id: SymbolId) -> bool {
        self.triviality(id, TypeFlags::TRIVIALLY_DROPPABLE, &mut Vec::new())
    }

    pub fn is_primitively_emittable(&self, id: SymbolId) -> bool {
        match &self.symbol(self.get_root(id)).kind {
            SymbolKind::Struct(symbol) => symbol.flags.contains(TypeFlags::PRIMITIVELY_EMITTABLE),
            SymbolKind::Reference(_) => true,
            _ => false,
        }
    }

    fn triviality(&self, id: SymbolId, flag: TypeFlags, visiting: &mut Vec<SymbolId>) -> bool {
        let root = self.get_root(id);
        if visiting.contains(&root) {
            // Layout cycles are reported elsewhere; stay trivial here.
            return true;
        }
        match &self.symbol(root).kind {
            SymbolKind::Struct(symbol) => {
                if symbol.flags.contains(TypeFlags::NATIVE) {
                    return symbol.flags.contains(flag);
                }
                visiting.push(root);
                let trivial = symbol.fields.iter().all(|field| {
                    self.var_type(*field)
                        .map(|field_type| self.triviality(field_type, flag, visiting))
                        .unwrap_or(true)
                });
                visiting.pop();
                trivial
            }
            SymbolKind::Reference(_) => true,
            SymbolKind::StrongPtr(_) | SymbolKind::WeakPtr(_) => false,
            SymbolKind::TemplateParamType(_) => true,
            SymbolKind::Trait(_) => false,
            _ => true,
        }
    }

    /// Whether some substitution of the free template parameters of either
    /// side makes the two types identical after unaliasing. Parameters act
    /// as wildcards on both sides; wrappers and instances unify
    /// structurally.
    pub fn could_unify(&self, lhs: SymbolId, rhs: SymbolId) -> bool {
        let lhs = self.get_root(lhs);
        let rhs = self.get_root(rhs);
        if lhs == rhs {
            return true;
        }
        match (&self.symbol(lhs).kind, &self.symbol(rhs).kind) {
            (SymbolKind::TemplateParamType(_), _) | (_, SymbolKind::TemplateParamType(_)) => true,
            (SymbolKind::Reference(lhs), SymbolKind::Reference(rhs))
            | (SymbolKind::StrongPtr(lhs), SymbolKind::StrongPtr(rhs))
            | (SymbolKind::WeakPtr(lhs), SymbolKind::WeakPtr(rhs)) => {
                self.could_unify(lhs.inner, rhs.inner)
            }
            (SymbolKind::Struct(lhs), SymbolKind::Struct(rhs)) => {
                match (lhs.template, rhs.template) {
                    (Some(lhs_template), Some(rhs_template)) => {
                        lhs_template == rhs_template
                            && lhs.template_args.len() == rhs.template_args.len()
                            && lhs
                                .template_args
                                .iter()
                                .zip(&rhs.template_args)
                                .all(|(lhs, rhs)| self.could_unify(*lhs, *rhs))
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}
