use std::path::PathBuf;

use ace_ast::AccessModifier;
use ace_error::{DiagnosticBag, DiagnosticCode};
use ace_span::{Ident, SrcBufferStore};

use crate::compilation::Compilation;
use crate::compile::compile;
use crate::glue::NullGlueProvider;
use crate::scope::template_key;
use crate::sema::{LowerCtx, Rewrite, StmtSema};
use crate::symbol::{
    ModuleSymbol, SizeKind, StructSymbol, Symbol, SymbolId, SymbolKind,
};
use crate::ty::TypeFlags;

fn compile_source(text: &str) -> (Compilation, DiagnosticBag) {
    compile_source_with(text, |_| {})
}

/// Parse, then run the whole core over `text`; `prepare` may pre-install
/// symbols (a foreign package, say) before declaration runs.
fn compile_source_with(
    text: &str,
    prepare: impl FnOnce(&mut Compilation),
) -> (Compilation, DiagnosticBag) {
    let mut store = SrcBufferStore::new();
    let (items, parse_bag) = ace_parser::parse_file(&mut store, "test.ace", text).into_parts();
    assert!(
        !parse_bag.has_errors(),
        "parse failed: {:?}",
        parse_bag.groups()
    );
    let items = items.unwrap();

    let mut comp = Compilation::with_buffers("test_pkg", PathBuf::from("."), store);
    prepare(&mut comp);
    let mut glue = NullGlueProvider;
    let (_, bag) = compile(&mut comp, &items, &mut glue).into_parts();
    (comp, bag)
}

fn assert_no_errors(bag: &DiagnosticBag) {
    assert!(!bag.has_errors(), "unexpected errors: {:?}", bag.groups());
}

fn find_in_package(comp: &Compilation, name: &str) -> SymbolId {
    let scope = comp.package_scope();
    comp.scope(scope)
        .symbols_named(name)
        .first()
        .copied()
        .unwrap_or_else(|| panic!("`{}` not declared in the package scope", name))
}

// ---- declaration and lookup ----

#[test]
fn test_declare_then_lookup_returns_same_symbol() {
    let (comp, bag) = compile_source("pub struct Point { x: i32, y: i32 }\n");
    assert_no_errors(&bag);
    let point = find_in_package(&comp, "Point");
    // The symbol's scope pointer names the scope that owns it.
    assert_eq!(comp.symbol(point).scope, comp.package_scope());
    let fields = &comp.symbol(point).as_struct().unwrap().fields;
    assert_eq!(fields.len(), 2);
    assert_eq!(comp.symbol(fields[1]).ident.name, "y");
}

#[test]
fn test_symbol_redefinition_is_diagnosed() {
    let (_, bag) = compile_source("struct X { a: i32 }\nstruct X { b: i32 }\n");
    assert_eq!(bag.with_code(DiagnosticCode::SymbolRedefinition).len(), 1);
}

#[test]
fn test_module_merge_across_declarations() {
    let (comp, bag) = compile_source(
        "pub module m { pub struct A { v: i32 } }\n\
         pub module m { pub struct B { v: i32 } }\n",
    );
    assert_no_errors(&bag);
    let module = find_in_package(&comp, "m");
    let body = comp.body_scope(module).unwrap();
    assert!(comp.scope(body).has_name("A"));
    assert!(comp.scope(body).has_name("B"));
}

#[test]
fn test_module_merge_checks_access_modifier() {
    let (_, bag) = compile_source("pub module m { }\nmodule m { }\n");
    assert_eq!(
        bag.with_code(DiagnosticCode::MismatchedAccessModifier).len(),
        1
    );
}

// ---- overload selection ----

#[test]
fn test_function_overload_selection() {
    let source = "\
        f(x: i32) -> i32 { ret x; }\n\
        f(x: f64) -> f64 { ret x; }\n\
        g() {\n\
            a: i32 = f(1_i32);\n\
            b: f64 = f(1.5_f64);\n\
        }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_function_overload_with_no_convertible_candidate() {
    let source = "\
        f(x: i32) -> i32 { ret x; }\n\
        f(x: f64) -> f64 { ret x; }\n\
        g() { f(true); }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::UndeclaredSymbolRef).len(), 1);
}

// ---- generics ----

#[test]
fn test_generic_function_deduction_caches_instances() {
    let source = "\
        id[T](x: T) -> T { ret x; }\n\
        g() {\n\
            a: i32 = id(42_i32);\n\
            b: i32 = id(7_i32);\n\
        }\n";
    let (comp, bag) = compile_source(source);
    assert_no_errors(&bag);

    let scope = comp.package_scope();
    let template = comp
        .scope(scope)
        .symbols_named(&template_key("id"))
        .first()
        .copied()
        .expect("id declared as a template");
    let instances = &comp.symbol(template).as_template().unwrap().instances;
    let concrete: Vec<SymbolId> = instances
        .iter()
        .map(|(_, instance)| *instance)
        .filter(|instance| !comp.is_placeholder(*instance))
        .collect();
    // Two identical calls share one mono.
    assert_eq!(concrete.len(), 1);
    let args = &comp.symbol(concrete[0]).as_function().unwrap().template_args;
    assert!(comp.types_equal(args[0], comp.natives.i32));
}

#[test]
fn test_generic_struct_instantiation_identity() {
    let source = "\
        struct Holder[T] { value: T }\n\
        g() {\n\
            a: Holder[i32] = Holder[i32] { value: 1_i32 };\n\
            b: Holder[i32] = Holder[i32] { value: 2_i32 };\n\
        }\n";
    let (comp, bag) = compile_source(source);
    assert_no_errors(&bag);
    let template = comp
        .scope(comp.package_scope())
        .symbols_named(&template_key("Holder"))
        .first()
        .copied()
        .unwrap();
    let concrete: Vec<SymbolId> = comp
        .symbol(template)
        .as_template()
        .unwrap()
        .instances
        .iter()
        .map(|(_, instance)| *instance)
        .filter(|instance| !comp.is_placeholder(*instance))
        .collect();
    assert_eq!(concrete.len(), 1);
}

#[test]
fn test_template_deduction_conflict() {
    let source = "\
        pair[T](a: T, b: T) -> T { ret a; }\n\
        g() { pair(1_i32, 2_i64); }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::TemplateArgDeductionConflict).len(),
        1
    );
}

#[test]
fn test_generic_path_without_deducible_args() {
    let source = "\
        struct Holder[T] { value: T }\n\
        g() { h: Holder = h; }\n";
    let (_, bag) = compile_source(source);
    assert!(!bag
        .with_code(DiagnosticCode::UnableToDeduceTemplateArg)
        .is_empty());
}

#[test]
fn test_templated_impl_member_through_instance() {
    let source = "\
        struct List[T] { head: T }\n\
        impl[T] List[T] {\n\
            head_of(self) -> T { ret self.head; }\n\
        }\n\
        g() {\n\
            l: List[i32] = List[i32] { head: 5_i32 };\n\
            h: i32 = l.head_of();\n\
        }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

// ---- layout ----

#[test]
fn test_struct_field_layout_cycle() {
    let source = "struct A { b: B }\nstruct B { a: A }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::StructFieldCausesCycle).len(), 1);
}

#[test]
fn test_size_kind_is_cached_and_sized() {
    let (mut comp, bag) = compile_source("struct P { x: i32, y: i32 }\n");
    assert_no_errors(&bag);
    let p = find_in_package(&comp, "P");
    let (size, _) = comp.size_kind(p).into_parts();
    assert_eq!(size, SizeKind::Sized);
    let (again, _) = comp.size_kind(p).into_parts();
    assert_eq!(again, SizeKind::Sized);
}

// ---- orphan impls ----

/// Install a second package-level module holding one struct, the way a
/// dependency's symbols would appear beside the current package.
fn install_foreign_struct(comp: &mut Compilation) {
    let global = comp.global_scope();
    let body_scope = comp.scopes.create_child(global, Some("q"));
    let module = comp.install_symbol(Symbol {
        ident: Ident::synthesized("q"),
        scope: global,
        access: AccessModifier::Public,
        kind: SymbolKind::Module(ModuleSymbol { body_scope }),
        is_error: false,
    });
    comp.scopes.get_mut(body_scope).owner = Some(module);

    let self_scope = comp.scopes.create_child(body_scope, Some("Foo"));
    let foo = comp.install_symbol(Symbol {
        ident: Ident::synthesized("Foo"),
        scope: body_scope,
        access: AccessModifier::Public,
        kind: SymbolKind::Struct(StructSymbol {
            self_scope,
            fields: Vec::new(),
            flags: TypeFlags::empty(),
            size_cache: Some(SizeKind::Sized),
            size_in_progress: false,
            copy_glue: None,
            drop_glue: None,
            template: None,
            template_args: Vec::new(),
            impl_template_args: Vec::new(),
        }),
        is_error: false,
    });
    comp.scopes.get_mut(self_scope).owner = Some(foo);
}

#[test]
fn test_orphan_inherent_impl() {
    let source = "impl ::q::Foo { m(self) -> i32 { ret 1_i32; } }\n";
    let (_, bag) = compile_source_with(source, install_foreign_struct);
    assert_eq!(bag.with_code(DiagnosticCode::OrphanInherentImpl).len(), 1);
}

#[test]
fn test_local_inherent_impl_is_not_orphan() {
    let source = "\
        struct Foo { v: i32 }\n\
        impl Foo { m(self) -> i32 { ret 1_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

// ---- trait impls ----

#[test]
fn test_unimplemented_trait_function() {
    let source = "\
        trait Show { show(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Show for S { }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::UnimplementedTraitFunction).len(),
        1
    );
}

#[test]
fn test_complete_trait_impl_passes() {
    let source = "\
        trait Show { show(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Show for S { show(self) -> i32 { ret 1_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_trait_impl_param_count_mismatch() {
    let source = "\
        trait Show { show(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Show for S { show(self, extra: i32) -> i32 { ret extra; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::MismatchedTraitImplParamCount).len(),
        1
    );
}

#[test]
fn test_function_not_in_trait() {
    let source = "\
        trait Show { show(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Show for S {\n\
            show(self) -> i32 { ret 1_i32; }\n\
            other(self) -> i32 { ret 2_i32; }\n\
        }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::FunctionIsNotTraitMember).len(),
        1
    );
}

#[test]
fn test_unimplemented_supertrait() {
    let source = "\
        trait Base { base(self) -> i32; }\n\
        trait Derived: Base { derived(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Derived for S { derived(self) -> i32 { ret 1_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::UnimplementedSupertrait).len(),
        1
    );
}

// ---- visibility ----

#[test]
fn test_private_symbol_inaccessible_from_sibling_module() {
    let source = "\
        module m1 { x: i32 = 0_i32; }\n\
        module m2 { f() -> i32 { ret m1::x; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::InaccessibleSymbol).len(), 1);
}

#[test]
fn test_private_symbol_accessible_within_module() {
    let source = "module m1 { x: i32 = 0_i32; f() -> i32 { ret x; } }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_public_symbol_accessible_from_sibling_module() {
    let source = "\
        module m1 { pub x: i32 = 0_i32; }\n\
        module m2 { f() -> i32 { ret m1::x; } }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

// ---- resolution boundaries ----

#[test]
fn test_scope_access_of_non_self_scoped_symbol() {
    let source = "f() -> i32 { x: i32 = 0_i32; ret x::y; }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::ScopeAccessOfNonSelfScopedSymbol).len(),
        1
    );
}

#[test]
fn test_static_path_to_instance_symbol_is_category_error() {
    let source = "\
        struct S { v: i32 }\n\
        impl S { m(self) -> i32 { ret self.v; } }\n\
        g() { S::m(); }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::IncorrectSymbolCategory).len(),
        1
    );
}

// ---- operators and lowering ----

#[test]
fn test_binary_op_resolves_through_natives() {
    let source = "f(a: i32, b: i32) -> i32 { ret a + b; }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_undeclared_binary_op() {
    let source = "\
        struct S { v: i32 }\n\
        f(a: S, b: S) -> i32 { ret 1_i32; }\n\
        g(a: S, b: S) { x: S = a; c: bool = a == b; }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::UndeclaredBinaryOpRef).len(), 1);
}

#[test]
fn test_compound_assignment_lowers_to_op_call() {
    let source = "f() -> i32 { a: i32 = 1_i32; a += 2_i32; ret a; }\n";
    let (comp, bag) = compile_source(source);
    assert_no_errors(&bag);
    let function = find_in_package(&comp, "f");
    let body = comp
        .symbol(function)
        .as_function()
        .unwrap()
        .body
        .clone()
        .expect("f has a bound body");
    // The compound assignment is gone after lowering.
    fn contains_compound(stmt: &StmtSema) -> bool {
        match stmt {
            StmtSema::CompoundAssign(_) => true,
            StmtSema::Block(block) => block.stmts.iter().any(contains_compound),
            StmtSema::Group(group) => group.stmts.iter().any(contains_compound),
            _ => false,
        }
    }
    assert!(!body.stmts.iter().any(contains_compound));
}

#[test]
fn test_lowering_reaches_fixed_point() {
    let source = "\
        f(n: i32) -> i32 {\n\
            total: i32 = 0_i32;\n\
            while total < n { total += 1_i32; }\n\
            assert total == n;\n\
            ret total;\n\
        }\n";
    let (mut comp, bag) = compile_source(source);
    assert_no_errors(&bag);
    let function = find_in_package(&comp, "f");
    let body = comp
        .symbol(function)
        .as_function()
        .unwrap()
        .body
        .clone()
        .unwrap();
    // A bound body is already at the fixed point: one more application
    // reports no change.
    let node = StmtSema::Block(body);
    let (rewrite, lower_bag) = node.create_lowered(&mut comp, &LowerCtx).into_parts();
    assert!(!lower_bag.has_errors());
    assert_eq!(rewrite, Rewrite::Unchanged);
}

#[test]
fn test_not_all_control_paths_return() {
    let source = "f(c: bool) -> i32 { if c { ret 1_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::NotAllControlPathsReturn).len(),
        1
    );
}

#[test]
fn test_all_paths_return_through_else() {
    let source = "f(c: bool) -> i32 { if c { ret 1_i32; } else { ret 2_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

// ---- conversions ----

#[test]
fn test_implicit_integer_widening() {
    let source = "f(x: i16) -> i64 { ret x; }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_no_cross_signedness_widening() {
    let source = "f(x: u16) -> i64 { ret x; }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::MismatchedType).len(), 1);
}

#[test]
fn test_reference_coercion_on_call() {
    let source = "\
        struct S { v: i32 }\n\
        take(r: &S) -> i32 { ret 1_i32; }\n\
        g() { s: S = S { v: 1_i32 }; take(s); }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

#[test]
fn test_dyn_coercion_requires_trait_impl() {
    let source = "\
        trait Show { show(self) -> i32; }\n\
        struct S { v: i32 }\n\
        impl Show for S { show(self) -> i32 { ret self.v; } }\n\
        struct Other { v: i32 }\n\
        take(r: &Show) -> i32 { ret 1_i32; }\n\
        g() {\n\
            s: S = S { v: 1_i32 };\n\
            take(__address_of(s));\n\
        }\n\
        h() {\n\
            o: Other = Other { v: 1_i32 };\n\
            take(__address_of(o));\n\
        }\n";
    let (_, bag) = compile_source(source);
    // The `S` coercion holds; `Other` has no impl and fails resolution.
    assert_eq!(bag.with_code(DiagnosticCode::UndeclaredSymbolRef).len(), 1);
}

// ---- struct construction ----

#[test]
fn test_struct_init_diagnoses_field_mistakes() {
    let source = "\
        struct P { x: i32, y: i32 }\n\
        g() {\n\
            a: P = P { x: 1_i32 };\n\
            b: P = P { x: 1_i32, x: 2_i32, y: 3_i32 };\n\
            c: P = P { x: 1_i32, y: 2_i32, z: 3_i32 };\n\
        }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::MissingStructConstructionVars).len(),
        1
    );
    assert_eq!(
        bag.with_code(DiagnosticCode::StructConstructionVarSpecifiedMoreThanOnce)
            .len(),
        1
    );
    assert_eq!(bag.with_code(DiagnosticCode::StructHasNoFieldNamed).len(), 1);
}

// ---- overlap and constraints ----

#[test]
fn test_overlapping_inherent_impls() {
    let source = "\
        struct Wrap[T] { v: T }\n\
        impl Wrap[i32] { get(self) -> i32 { ret self.v; } }\n\
        impl[T] Wrap[T] { get(self) -> T { ret self.v; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::OverlappingInherentImplSymbol).len(),
        1
    );
}

#[test]
fn test_inherent_function_redeclaration_across_impls() {
    let source = "\
        struct S { v: i32 }\n\
        impl S { m(self) -> i32 { ret 1_i32; } }\n\
        impl S { m(self) -> i32 { ret 2_i32; } }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(
        bag.with_code(DiagnosticCode::InherentFunctionRedeclaration).len(),
        1
    );
}

#[test]
fn test_concrete_constraint_is_flagged() {
    let source = "f() -> i32 where i32: Eq { ret 1_i32; }\n";
    let (_, bag) = compile_source(source);
    assert_eq!(bag.with_code(DiagnosticCode::ConcreteConstraint).len(), 1);
}

#[test]
fn test_generic_constraint_is_not_flagged() {
    let source = "largest[T](a: T, b: T) -> T where T: Lt { ret a; }\n\
                  g() { largest(1_i32, 2_i32); }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}

// ---- glue ----

#[test]
fn test_glue_registered_for_non_trivial_types() {
    let source = "\
        struct Boxed { ptr: *i32 }\n\
        struct Plain { v: i32 }\n\
        g() { b: Boxed = Boxed { ptr: box(1_i32) }; p: Plain = Plain { v: 1_i32 }; }\n";
    let (comp, bag) = compile_source(source);
    assert_no_errors(&bag);
    let boxed = find_in_package(&comp, "Boxed");
    let plain = find_in_package(&comp, "Plain");
    let boxed_data = comp.symbol(boxed).as_struct().unwrap();
    assert!(boxed_data.copy_glue.is_some());
    assert!(boxed_data.drop_glue.is_some());
    let plain_data = comp.symbol(plain).as_struct().unwrap();
    assert!(plain_data.copy_glue.is_none());
    assert!(plain_data.drop_glue.is_none());
}

// ---- re-exports ----

#[test]
fn test_use_reexports_type() {
    let source = "\
        module inner { pub struct T { v: i32 } }\n\
        pub use inner::T;\n\
        g() { t: T = T { v: 1_i32 }; }\n";
    let (_, bag) = compile_source(source);
    assert_no_errors(&bag);
}
