//! Registration of the native types and operations the language is built
//! over: the primitive type symbols, the operator traits, the native
//! operator functions on each primitive, and the implicit widening map
//! consulted by the conversion rules.

use std::collections::{HashMap, HashSet};

use ace_ast::{AccessModifier, OpKind};
use ace_span::Ident;

use crate::compilation::ErrorSymbols;
use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::{
    FunctionSymbol, ParamSymbol, PrototypeSymbol, SizeKind, StructSymbol, Symbol, SymbolArena,
    SymbolCategory, SymbolId, SymbolKind, TemplateParamTypeSymbol, TraitSymbol,
};
use crate::ty::TypeFlags;

#[derive(Debug)]
pub struct Natives {
    pub void: SymbolId,
    pub bool_: SymbolId,
    pub int: SymbolId,
    pub i8: SymbolId,
    pub i16: SymbolId,
    pub i32: SymbolId,
    pub i64: SymbolId,
    pub u8: SymbolId,
    pub u16: SymbolId,
    pub u32: SymbolId,
    pub u64: SymbolId,
    pub f32: SymbolId,
    pub f64: SymbolId,
    pub string: SymbolId,
    op_traits: HashMap<OpKind, SymbolId>,
    /// `(from, to)` pairs accepted as implicit conversions.
    implicit_from_ops: HashSet<(SymbolId, SymbolId)>,
}

impl Natives {
    /// Whether `(from, to)` is an implicit native conversion.
    pub fn is_implicitly_convertible(&self, from: SymbolId, to: SymbolId) -> bool {
        self.implicit_from_ops.contains(&(from, to))
    }

    pub fn op_trait(&self, op: OpKind) -> Option<SymbolId> {
        self.op_traits.get(&op).copied()
    }

    pub fn all_types(&self) -> Vec<SymbolId> {
        vec![
            self.void, self.bool_, self.int, self.i8, self.i16, self.i32, self.i64, self.u8,
            self.u16, self.u32, self.u64, self.f32, self.f64, self.string,
        ]
    }

    /// Verify the registration invariants hold; cheap and run once by the
    /// driver after declaration.
    pub fn assert_registered(&self) {
        debug_assert!(self.op_traits.len() == OP_TRAITS.len());
    }
}

/// The trait and method name an operator resolves through.
pub fn op_method_name(op: OpKind) -> &'static str {
    match op {
        OpKind::Add => "op_add",
        OpKind::Sub => "op_sub",
        OpKind::Mul => "op_mul",
        OpKind::Div => "op_div",
        OpKind::Rem => "op_rem",
        OpKind::Eq => "op_eq",
        OpKind::Ne => "op_ne",
        OpKind::Lt => "op_lt",
        OpKind::Gt => "op_gt",
        OpKind::Le => "op_le",
        OpKind::Ge => "op_ge",
        OpKind::Shl => "op_shl",
        OpKind::Shr => "op_shr",
        OpKind::BitAnd => "op_and",
        OpKind::BitOr => "op_or",
        OpKind::BitXor => "op_xor",
        OpKind::Not => "op_not",
        OpKind::Neg => "op_neg",
    }
}

pub fn op_trait_name(op: OpKind) -> &'static str {
    match op {
        OpKind::Add => "Add",
        OpKind::Sub => "Sub",
        OpKind::Mul => "Mul",
        OpKind::Div => "Div",
        OpKind::Rem => "Rem",
        OpKind::Eq => "Eq",
        OpKind::Ne => "Ne",
        OpKind::Lt => "Lt",
        OpKind::Gt => "Gt",
        OpKind::Le => "Le",
        OpKind::Ge => "Ge",
        OpKind::Shl => "Shl",
        OpKind::Shr => "Shr",
        OpKind::BitAnd => "BitAnd",
        OpKind::BitOr => "BitOr",
        OpKind::BitXor => "BitXor",
        OpKind::Not => "Not",
        OpKind::Neg => "Neg",
    }
}

const OP_TRAITS: &[OpKind] = &[
    OpKind::Add,
    OpKind::Sub,
    OpKind::Mul,
    OpKind::Div,
    OpKind::Rem,
    OpKind::Eq,
    OpKind::Ne,
    OpKind::Lt,
    OpKind::Gt,
    OpKind::Le,
    OpKind::Ge,
    OpKind::Shl,
    OpKind::Shr,
    OpKind::BitAnd,
    OpKind::BitOr,
    OpKind::BitXor,
    OpKind::Not,
    OpKind::Neg,
];

fn is_comparison(op: OpKind) -> bool {
    matches!(
        op,
        OpKind::Eq | OpKind::Ne | OpKind::Lt | OpKind::Gt | OpKind::Le | OpKind::Ge
    )
}

fn is_unary(op: OpKind) -> bool {
    matches!(op, OpKind::Not | OpKind::Neg)
}

struct Registrar<'a> {
    scopes: &'a mut ScopeArena,
    symbols: &'a mut SymbolArena,
    global: ScopeId,
}

impl<'a> Registrar<'a> {
    fn insert(&mut self, scope: ScopeId, key: &str, symbol: Symbol) -> SymbolId {
        let id = self.symbols.alloc(symbol);
        self.scopes
            .get_mut(scope)
            .symbols
            .entry(key.to_string())
            .or_default()
            .push(id);
        id
    }

    fn native_type(&mut self, name: &str, flags: TypeFlags) -> SymbolId {
        let self_scope = self.scopes.create_child(self.global, Some(name));
        let id = self.insert(
            self.global,
            name,
            Symbol {
                ident: Ident::synthesized(name),
                scope: self.global,
                access: AccessModifier::Public,
                kind: SymbolKind::Struct(StructSymbol {
                    self_scope,
                    fields: Vec::new(),
                    flags,
                    size_cache: Some(SizeKind::Sized),
                    size_in_progress: false,
                    copy_glue: None,
                    drop_glue: None,
                    template: None,
                    template_args: Vec::new(),
                    impl_template_args: Vec::new(),
                }),
                is_error: false,
            },
        );
        self.scopes.get_mut(self_scope).owner = Some(id);
        id
    }

    /// A native function with no body; the emitter knows these by name.
    fn native_fn(
        &mut self,
        declaring_scope: ScopeId,
        name: &str,
        self_type: Option<SymbolId>,
        params: &[(&str, SymbolId)],
        return_type: SymbolId,
    ) -> SymbolId {
        let fn_scope = self.scopes.create_child(declaring_scope, Some(name));
        let mut param_ids = Vec::new();
        if let Some(self_type) = self_type {
            let param = self.insert(
                fn_scope,
                "self",
                Symbol {
                    ident: Ident::synthesized("self"),
                    scope: fn_scope,
                    access: AccessModifier::Private,
                    kind: SymbolKind::Param(ParamSymbol {
                        var_type: self_type,
                        index: 0,
                        is_self: true,
                    }),
                    is_error: false,
                },
            );
            param_ids.push(param);
        }
        for (param_name, param_type) in params {
            let index = param_ids.len();
            let param = self.insert(
                fn_scope,
                param_name,
                Symbol {
                    ident: Ident::synthesized(*param_name),
                    scope: fn_scope,
                    access: AccessModifier::Private,
                    kind: SymbolKind::Param(ParamSymbol {
                        var_type: *param_type,
                        index,
                        is_self: false,
                    }),
                    is_error: false,
                },
            );
            param_ids.push(param);
        }
        let has_self_param = self_type.is_some();
        let id = self.insert(
            declaring_scope,
            name,
            Symbol {
                ident: Ident::synthesized(name),
                scope: declaring_scope,
                access: AccessModifier::Public,
                kind: SymbolKind::Function(FunctionSymbol {
                    self_scope: fn_scope,
                    params: param_ids,
                    has_self_param,
                    return_type,
                    category: if has_self_param {
                        SymbolCategory::Instance
                    } else {
                        SymbolCategory::Static
                    },
                    is_native: true,
                    is_extern: false,
                    body: None,
                    template: None,
                    template_args: Vec::new(),
                    impl_template_args: Vec::new(),
                    glue_of: None,
                }),
                is_error: false,
            },
        );
        self.scopes.get_mut(fn_scope).owner = Some(id);
        id
    }

    /// The operator trait for `op`: one prototype over a `Self`
    /// placeholder.
    fn op_trait(&mut self, op: OpKind, bool_: SymbolId) -> SymbolId {
        let name = op_trait_name(op);
        let self_scope = self.scopes.create_child(self.global, Some(name));
        let trait_id = self.insert(
            self.global,
            name,
            Symbol {
                ident: Ident::synthesized(name),
                scope: self.global,
                access: AccessModifier::Public,
                kind: SymbolKind::Trait(TraitSymbol {
                    self_scope,
                    supertraits: Vec::new(),
                    prototypes: Vec::new(),
                }),
                is_error: false,
            },
        );
        self.scopes.get_mut(self_scope).owner = Some(trait_id);

        let self_type = self.insert(
            self_scope,
            "Self",
            Symbol {
                ident: Ident::synthesized("Self"),
                scope: self_scope,
                access: AccessModifier::Private,
                kind: SymbolKind::TemplateParamType(TemplateParamTypeSymbol {
                    index: 0,
                    is_impl_param: false,
                    owner: Some(trait_id),
                }),
                is_error: false,
            },
        );

        let method = op_method_name(op);
        let proto_scope = self.scopes.create_child(self_scope, Some(method));
        let self_param = self.insert(
            proto_scope,
            "self",
            Symbol {
                ident: Ident::synthesized("self"),
                scope: proto_scope,
                access: AccessModifier::Private,
                kind: SymbolKind::Param(ParamSymbol {
                    var_type: self_type,
                    index: 0,
                    is_self: true,
                }),
                is_error: false,
            },
        );
        let mut params = vec![self_param];
        if !is_unary(op) {
            let rhs = self.insert(
                proto_scope,
                "rhs",
                Symbol {
                    ident: Ident::synthesized("rhs"),
                    scope: proto_scope,
                    access: AccessModifier::Private,
                    kind: SymbolKind::Param(ParamSymbol {
                        var_type: self_type,
                        index: 1,
                        is_self: false,
                    }),
                    is_error: false,
                },
            );
            params.push(rhs);
        }
        let return_type = if is_comparison(op) { bool_ } else { self_type };
        let proto = self.insert(
            self_scope,
            method,
            Symbol {
                ident: Ident::synthesized(method),
                scope: self_scope,
                access: AccessModifier::Public,
                kind: SymbolKind::Prototype(PrototypeSymbol {
                    self_scope: proto_scope,
                    params,
                    has_self_param: true,
                    return_type,
                    owner_trait: trait_id,
                    type_param_count: 0,
                    is_dyn_dispatchable: true,
                }),
                is_error: false,
            },
        );
        self.scopes.get_mut(proto_scope).owner = Some(proto);
        match &mut self.symbols.get_mut(trait_id).kind {
            SymbolKind::Trait(trait_symbol) => trait_symbol.prototypes.push(proto),
            _ => unreachable!(),
        }
        trait_id
    }
}

/// Register native types, operator traits and native operator functions.
/// Runs on the raw arenas before the [`crate::Compilation`] is assembled.
pub fn register(scopes: &mut ScopeArena, symbols: &mut SymbolArena) -> Natives {
    let global = scopes.global();
    let mut reg = Registrar {
        scopes,
        symbols,
        global,
    };

    let primitive = TypeFlags::PRIMITIVELY_EMITTABLE
        | TypeFlags::TRIVIALLY_COPYABLE
        | TypeFlags::TRIVIALLY_DROPPABLE
        | TypeFlags::NATIVE;

    let void = reg.native_type("void", primitive);
    let bool_ = reg.native_type("bool", primitive);
    let int = reg.native_type("int", primitive);
    let i8 = reg.native_type("i8", primitive);
    let i16 = reg.native_type("i16", primitive);
    let i32 = reg.native_type("i32", primitive);
    let i64 = reg.native_type("i64", primitive);
    let u8 = reg.native_type("u8", primitive);
    let u16 = reg.native_type("u16", primitive);
    let u32 = reg.native_type("u32", primitive);
    let u64 = reg.native_type("u64", primitive);
    let f32 = reg.native_type("f32", primitive);
    let f64 = reg.native_type("f64", primitive);
    let string = reg.native_type("string", primitive);

    let mut op_traits = HashMap::new();
    for op in OP_TRAITS {
        op_traits.insert(*op, reg.op_trait(*op, bool_));
    }

    let signed = [i8, i16, i32, i64, int];
    let unsigned = [u8, u16, u32, u64];
    let floats = [f32, f64];
    let integers: Vec<SymbolId> = signed.iter().chain(&unsigned).copied().collect();

    for ty in integers.iter().copied() {
        let scope = symbol_self_scope(reg.symbols, ty);
        for op in [
            OpKind::Add,
            OpKind::Sub,
            OpKind::Mul,
            OpKind::Div,
            OpKind::Rem,
            OpKind::Shl,
            OpKind::Shr,
            OpKind::BitAnd,
            OpKind::BitOr,
            OpKind::BitXor,
        ] {
            reg.native_fn(scope, op_method_name(op), Some(ty), &[("rhs", ty)], ty);
        }
        for op in [
            OpKind::Eq,
            OpKind::Ne,
            OpKind::Lt,
            OpKind::Gt,
            OpKind::Le,
            OpKind::Ge,
        ] {
            reg.native_fn(scope, op_method_name(op), Some(ty), &[("rhs", ty)], bool_);
        }
    }
    for ty in signed {
        let scope = symbol_self_scope(reg.symbols, ty);
        reg.native_fn(scope, op_method_name(OpKind::Neg), Some(ty), &[], ty);
    }
    for ty in floats {
        let scope = symbol_self_scope(reg.symbols, ty);
        for op in [OpKind::Add, OpKind::Sub, OpKind::Mul, OpKind::Div] {
            reg.native_fn(scope, op_method_name(op), Some(ty), &[("rhs", ty)], ty);
        }
        for op in [
            OpKind::Eq,
            OpKind::Ne,
            OpKind::Lt,
            OpKind::Gt,
            OpKind::Le,
            OpKind::Ge,
        ] {
            reg.native_fn(scope, op_method_name(op), Some(ty), &[("rhs", ty)], bool_);
        }
        reg.native_fn(scope, op_method_name(OpKind::Neg), Some(ty), &[], ty);
    }
    {
        let scope = symbol_self_scope(reg.symbols, bool_);
        for op in [OpKind::Eq, OpKind::Ne] {
            reg.native_fn(
                scope,
                op_method_name(op),
                Some(bool_),
                &[("rhs", bool_)],
                bool_,
            );
        }
        reg.native_fn(scope, op_method_name(OpKind::Not), Some(bool_), &[], bool_);
    }

    // Same-signedness integer widenings, transitively closed, plus the
    // float widening.
    let mut implicit_from_ops = HashSet::new();
    let widening_chains: [&[SymbolId]; 3] = [&[i8, i16, i32, i64], &[u8, u16, u32, u64], &[f32, f64]];
    for chain in widening_chains {
        for (index, from) in chain.iter().enumerate() {
            for to in &chain[index + 1..] {
                implicit_from_ops.insert((*from, *to));
            }
        }
    }
    for from in [i8, i16, i32] {
        implicit_from_ops.insert((from, int));
    }

    Natives {
        void,
        bool_,
        int,
        i8,
        i16,
        i32,
        i64,
        u8,
        u16,
        u32,
        u64,
        f32,
        f64,
        string,
        op_traits,
        implicit_from_ops,
    }
}

fn symbol_self_scope(symbols: &SymbolArena, id: SymbolId) -> ScopeId {
    match &symbols.get(id).kind {
        SymbolKind::Struct(symbol) => symbol.self_scope,
        _ => unreachable!("native types are struct symbols"),
    }
}

/// Install the error-sentinel family: an error type, an error function and
/// an error variable, all tagged `is_error` so later passes skip them.
pub fn install_error_symbols(scopes: &mut ScopeArena, symbols: &mut SymbolArena) -> ErrorSymbols {
    let global = scopes.global();
    let mut reg = Registrar {
        scopes,
        symbols,
        global,
    };

    let flags = TypeFlags::TRIVIALLY_COPYABLE | TypeFlags::TRIVIALLY_DROPPABLE;
    let error_type = reg.native_type("$error", flags);
    reg.symbols.get_mut(error_type).is_error = true;

    let error_function = reg.native_fn(global, "$error_fn", None, &[], error_type);
    reg.symbols.get_mut(error_function).is_error = true;

    let error_var = reg.insert(
        global,
        "$error_var",
        Symbol {
            ident: Ident::synthesized("$error_var"),
            scope: global,
            access: AccessModifier::Public,
            kind: SymbolKind::StaticVar(crate::symbol::StaticVarSymbol {
                var_type: error_type,
            }),
            is_error: true,
        },
    );

    ErrorSymbols {
        error_type,
        error_function,
        error_var,
    }
}
