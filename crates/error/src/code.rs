//! Machine-readable diagnostic codes, gathered in one place so tests and
//! tooling can match on them without parsing messages.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Resolution.
    UndeclaredSymbolRef,
    AmbiguousSymbolRef,
    InaccessibleSymbol,
    ScopeAccessOfNonSelfScopedSymbol,
    IncorrectSymbolCategory,
    UndeclaredTemplateInstanceRef,

    // Templates.
    UnableToDeduceTemplateArgs,
    UnableToDeduceTemplateArg,
    TooManyTemplateArgs,
    TemplateArgDeductionConflict,

    // Types and operators.
    MismatchedType,
    UndeclaredUnaryOpRef,
    UndeclaredBinaryOpRef,
    AmbiguousBinaryOpRef,
    ExpectedFunction,
    MissingStructConstructionVars,
    StructHasNoFieldNamed,
    StructConstructionVarSpecifiedMoreThanOnce,

    // Trait impl signature mismatches, one code per mismatch.
    MismatchedTraitImplType,
    MismatchedTraitImplParamCount,
    MismatchedTraitImplTypeParamCount,
    FunctionIsNotTraitMember,
    ImplStricterThanPrototype,

    // Redefinition and access.
    SymbolRedefinition,
    MismatchedAccessModifier,
    InherentFunctionRedeclaration,
    OverlappingInherentImplSymbol,
    OrphanInherentImpl,
    OrphanTraitImpl,

    // Layout and lifetimes.
    UnsizedSymbolType,
    StructFieldCausesCycle,
    NotAllControlPathsReturn,

    // Trait impl completeness.
    UnimplementedTraitFunction,
    UnimplementedSupertrait,

    // Constraints.
    ConcreteConstraint,

    // Surface: CLI.
    MissingCLIOptionName,
    UnknownCLIOptionName,
    MissingCLIOptionValue,
    UnexpectedCLIOptionValue,
    MissingPackagePathArg,
    MultiplePackagePathArgs,

    // Surface: package manifest.
    UnexpectedPackageProperty,
    UnexpectedPackagePropertyType,
    MissingPackageProperty,
    UndefinedRefToPackagePathMacro,
    TrailingPackagePathCharacters,
    InvalidPackageJson,

    // Surface: file system and syntax.
    FileNotFound,
    FileSystem,
    InvalidSyntax,
}

impl DiagnosticCode {
    pub fn name(&self) -> String {
        format!("{:?}", self)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
