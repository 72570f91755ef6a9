//! Constructors for every diagnostic the core raises. Messages carry the
//! offending identifiers and types spelled the way the user wrote them;
//! notes point back at declarations.

use ace_ast::Op;
use ace_error::{Diagnostic, DiagnosticCode, DiagnosticGroup, Severity};
use ace_span::{Ident, SrcLocation};

use crate::compilation::Compilation;
use crate::symbol::{SymbolCategory, SymbolId};

pub fn mismatched_access_modifier_error(
    new_location: SrcLocation,
    original: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(new_location, "mismatched access modifier")
            .with_code(DiagnosticCode::MismatchedAccessModifier),
    )
    .with_note(Diagnostic::note(
        original.location,
        "originally declared here",
    ))
}

pub fn symbol_redefinition_error(redefined: &Ident, original: &Ident) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            redefined.location,
            format!("redefinition of `{}`", redefined.name),
        )
        .with_code(DiagnosticCode::SymbolRedefinition),
    )
    .with_note(Diagnostic::note(
        original.location,
        "previously declared here",
    ))
}

pub fn unable_to_deduce_template_args_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, "unable to deduce template arguments")
            .with_code(DiagnosticCode::UnableToDeduceTemplateArgs),
    )
}

pub fn unable_to_deduce_template_arg_error(
    location: SrcLocation,
    param: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!("unable to deduce template argument `{}`", param.name),
        )
        .with_code(DiagnosticCode::UnableToDeduceTemplateArg),
    )
    .with_note(Diagnostic::note(param.location, "parameter declared here"))
}

pub fn too_many_template_args_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, "too many template arguments")
            .with_code(DiagnosticCode::TooManyTemplateArgs),
    )
}

pub fn template_arg_deduction_conflict_error(
    comp: &Compilation,
    location: SrcLocation,
    param: &Ident,
    deduced: SymbolId,
    conflicting: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!(
                "conflicting deductions for template argument `{}`",
                param.name
            ),
        )
        .with_code(DiagnosticCode::TemplateArgDeductionConflict),
    )
    .with_note(Diagnostic::new(
        Severity::Note,
        None,
        format!(
            "deduced both `{}` and `{}`",
            comp.symbol_display(deduced),
            comp.symbol_display(conflicting)
        ),
    ))
}

pub fn undeclared_symbol_ref_error(location: SrcLocation, name: &str) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, format!("undeclared symbol `{}`", name))
            .with_code(DiagnosticCode::UndeclaredSymbolRef),
    )
}

pub fn ambiguous_symbol_ref_error(
    location: SrcLocation,
    name: &str,
    candidates: &[Ident],
) -> DiagnosticGroup {
    let mut group = DiagnosticGroup::new(
        Diagnostic::error(location, format!("ambiguous reference to `{}`", name))
            .with_code(DiagnosticCode::AmbiguousSymbolRef),
    );
    for candidate in candidates {
        group = group.with_note(Diagnostic::note(candidate.location, "candidate"));
    }
    group
}

pub fn inaccessible_symbol_error(location: SrcLocation, declaration: &Ident) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!("symbol `{}` is inaccessible", declaration.name),
        )
        .with_code(DiagnosticCode::InaccessibleSymbol),
    )
    .with_note(Diagnostic::note(declaration.location, "declared here"))
}

pub fn scope_access_of_non_self_scoped_symbol_error(
    location: SrcLocation,
    symbol: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!("`{}` does not have a scope to access", symbol.name),
        )
        .with_code(DiagnosticCode::ScopeAccessOfNonSelfScopedSymbol),
    )
}

pub fn undeclared_template_instance_ref_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, "reference to undeclared template instance")
            .with_code(DiagnosticCode::UndeclaredTemplateInstanceRef),
    )
}

pub fn incorrect_symbol_category_error(
    location: SrcLocation,
    expected: SymbolCategory,
) -> DiagnosticGroup {
    let expected = match expected {
        SymbolCategory::Static => "static",
        SymbolCategory::Instance => "instance",
    };
    DiagnosticGroup::new(
        Diagnostic::error(location, format!("expected {} symbol", expected))
            .with_code(DiagnosticCode::IncorrectSymbolCategory),
    )
}

pub fn mismatched_type_error(
    comp: &Compilation,
    location: SrcLocation,
    expected: SymbolId,
    found: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!(
                "expected `{}`, found `{}`",
                comp.symbol_display(expected),
                comp.symbol_display(found)
            ),
        )
        .with_code(DiagnosticCode::MismatchedType),
    )
}

pub fn expected_struct_error(
    comp: &Compilation,
    location: SrcLocation,
    found: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!(
                "expected a struct type, found `{}`",
                comp.symbol_display(found)
            ),
        )
        .with_code(DiagnosticCode::MismatchedType),
    )
}

pub fn undeclared_unary_op_error(
    comp: &Compilation,
    op: &Op,
    operand: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            op.location,
            format!(
                "`{}` is not declared for `{}`",
                op.kind,
                comp.symbol_display(operand)
            ),
        )
        .with_code(DiagnosticCode::UndeclaredUnaryOpRef),
    )
}

pub fn undeclared_binary_op_error(
    comp: &Compilation,
    op: &Op,
    lhs: SymbolId,
    rhs: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            op.location,
            format!(
                "`{}` is not declared for `{}` and `{}`",
                op.kind,
                comp.symbol_display(lhs),
                comp.symbol_display(rhs)
            ),
        )
        .with_code(DiagnosticCode::UndeclaredBinaryOpRef),
    )
}

pub fn ambiguous_binary_op_error(
    comp: &Compilation,
    op: &Op,
    lhs: SymbolId,
    rhs: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            op.location,
            format!(
                "`{}` is ambiguous for `{}` and `{}`",
                op.kind,
                comp.symbol_display(lhs),
                comp.symbol_display(rhs)
            ),
        )
        .with_code(DiagnosticCode::AmbiguousBinaryOpRef),
    )
}

pub fn expected_function_error(
    comp: &Compilation,
    location: SrcLocation,
    found: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!("expected a function, found `{}`", comp.symbol_display(found)),
        )
        .with_code(DiagnosticCode::ExpectedFunction),
    )
}

pub fn missing_struct_construction_vars_error(
    comp: &Compilation,
    location: SrcLocation,
    missing: &[SymbolId],
) -> DiagnosticGroup {
    let names = missing
        .iter()
        .map(|field| comp.symbol(*field).ident.name.clone())
        .collect::<Vec<_>>()
        .join("`, `");
    let mut group = DiagnosticGroup::new(
        Diagnostic::error(location, format!("missing field `{}`", names))
            .with_code(DiagnosticCode::MissingStructConstructionVars),
    );
    for field in missing {
        group = group.with_note(Diagnostic::note(
            comp.symbol(*field).ident.location,
            "field declared here",
        ));
    }
    group
}

pub fn struct_has_no_field_named_error(
    comp: &Compilation,
    struct_id: SymbolId,
    field: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            field.location,
            format!(
                "`{}` has no field named `{}`",
                comp.symbol_display(struct_id),
                field.name
            ),
        )
        .with_code(DiagnosticCode::StructHasNoFieldNamed),
    )
}

pub fn struct_construction_var_specified_more_than_once_error(
    location: SrcLocation,
    field: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            format!("field `{}` specified more than once", field.name),
        )
        .with_code(DiagnosticCode::StructConstructionVarSpecifiedMoreThanOnce),
    )
}

pub fn unsized_symbol_type_error(
    comp: &Compilation,
    ident: &Ident,
    ty: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            ident.location,
            format!(
                "`{}` has unsized type `{}`",
                ident.name,
                comp.symbol_display(ty)
            ),
        )
        .with_code(DiagnosticCode::UnsizedSymbolType),
    )
}

pub fn struct_field_causes_cycle_error(
    comp: &Compilation,
    field: &Ident,
    owner: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            field.location,
            format!(
                "field `{}` closes a layout cycle through `{}`",
                field.name,
                comp.symbol_display(owner)
            ),
        )
        .with_code(DiagnosticCode::StructFieldCausesCycle),
    )
}

pub fn not_all_control_paths_return_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, "not all control paths return a value")
            .with_code(DiagnosticCode::NotAllControlPathsReturn),
    )
}

pub fn unimplemented_trait_function_error(
    comp: &Compilation,
    impl_location: SrcLocation,
    prototype: SymbolId,
) -> DiagnosticGroup {
    let prototype_ident = &comp.symbol(prototype).ident;
    DiagnosticGroup::new(
        Diagnostic::error(
            prototype_ident.location,
            format!("`{}` is not implemented", prototype_ident.name),
        )
        .with_code(DiagnosticCode::UnimplementedTraitFunction),
    )
    .with_note(Diagnostic::note(impl_location, "required by this impl"))
}

pub fn unimplemented_supertrait_error(
    comp: &Compilation,
    impl_location: SrcLocation,
    supertrait: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            impl_location,
            format!(
                "supertrait `{}` is not implemented",
                comp.symbol_display(supertrait)
            ),
        )
        .with_code(DiagnosticCode::UnimplementedSupertrait),
    )
    .with_note(Diagnostic::note(
        comp.symbol(supertrait).ident.location,
        "supertrait declared here",
    ))
}

pub fn mismatched_trait_impl_type_error(
    function_location: SrcLocation,
    prototype_location: SrcLocation,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(function_location, "type differs from the trait prototype")
            .with_code(DiagnosticCode::MismatchedTraitImplType),
    )
    .with_note(Diagnostic::note(prototype_location, "prototype declared here"))
}

pub fn mismatched_trait_impl_param_count_error(
    comp: &Compilation,
    function: SymbolId,
    prototype: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            comp.symbol(function).ident.location,
            "parameter count differs from the trait prototype",
        )
        .with_code(DiagnosticCode::MismatchedTraitImplParamCount),
    )
    .with_note(Diagnostic::note(
        comp.symbol(prototype).ident.location,
        "prototype declared here",
    ))
}

pub fn mismatched_trait_impl_type_param_count_error(
    comp: &Compilation,
    function: SymbolId,
    prototype: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            comp.symbol(function).ident.location,
            "type parameter count differs from the trait prototype",
        )
        .with_code(DiagnosticCode::MismatchedTraitImplTypeParamCount),
    )
    .with_note(Diagnostic::note(
        comp.symbol(prototype).ident.location,
        "prototype declared here",
    ))
}

pub fn function_is_not_trait_member_error(
    comp: &Compilation,
    function: SymbolId,
    trait_id: SymbolId,
) -> DiagnosticGroup {
    let function_ident = &comp.symbol(function).ident;
    DiagnosticGroup::new(
        Diagnostic::error(
            function_ident.location,
            format!(
                "`{}` is not a member of `{}`",
                function_ident.name,
                comp.symbol_display(trait_id)
            ),
        )
        .with_code(DiagnosticCode::FunctionIsNotTraitMember),
    )
}

pub fn impl_stricter_than_prototype_error(
    comp: &Compilation,
    function: SymbolId,
    prototype: SymbolId,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            comp.symbol(function).ident.location,
            "impl has stricter constraints than the trait prototype",
        )
        .with_code(DiagnosticCode::ImplStricterThanPrototype),
    )
    .with_note(Diagnostic::note(
        comp.symbol(prototype).ident.location,
        "prototype declared here",
    ))
}

pub fn inherent_function_redeclaration_error(
    original: &Ident,
    redeclared: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            redeclared.location,
            format!("`{}` is already declared for this type", redeclared.name),
        )
        .with_code(DiagnosticCode::InherentFunctionRedeclaration),
    )
    .with_note(Diagnostic::note(original.location, "previously declared here"))
}

pub fn overlapping_inherent_impl_symbol_error(
    original: &Ident,
    overlapping: &Ident,
) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            overlapping.location,
            format!(
                "`{}` collides with a member of an overlapping impl",
                overlapping.name
            ),
        )
        .with_code(DiagnosticCode::OverlappingInherentImplSymbol),
    )
    .with_note(Diagnostic::note(original.location, "other member declared here"))
}

pub fn orphan_inherent_impl_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            "inherent impl must live in the package of the implemented type",
        )
        .with_code(DiagnosticCode::OrphanInherentImpl),
    )
}

pub fn orphan_trait_impl_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(
            location,
            "trait impl must live in the package of the trait or of the type",
        )
        .with_code(DiagnosticCode::OrphanTraitImpl),
    )
}

pub fn concrete_constraint_error(location: SrcLocation) -> DiagnosticGroup {
    DiagnosticGroup::new(
        Diagnostic::error(location, "constraint over concrete types is useless")
            .with_code(DiagnosticCode::ConcreteConstraint),
    )
}
