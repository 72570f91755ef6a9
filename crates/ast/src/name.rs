use ace_span::{Ident, SrcLocation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessModifier {
    Public,
    Private,
}

/// One `name[args]` section of a symbol path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNameSection {
    pub ident: Ident,
    pub template_args: Vec<TypeName>,
}

impl SymbolNameSection {
    pub fn new(ident: Ident) -> Self {
        Self {
            ident,
            template_args: Vec::new(),
        }
    }

    pub fn with_args(ident: Ident, template_args: Vec<TypeName>) -> Self {
        Self {
            ident,
            template_args,
        }
    }
}

/// A possibly-qualified symbol path: `a::b::c[i32]`, with an `is_global`
/// flag for paths anchored at the global scope (`::a::b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolName {
    pub sections: Vec<SymbolNameSection>,
    pub is_global: bool,
}

impl SymbolName {
    pub fn new(sections: Vec<SymbolNameSection>, is_global: bool) -> Self {
        debug_assert!(!sections.is_empty());
        Self {
            sections,
            is_global,
        }
    }

    pub fn from_ident(ident: Ident) -> Self {
        Self {
            sections: vec![SymbolNameSection::new(ident)],
            is_global: false,
        }
    }

    pub fn first(&self) -> &SymbolNameSection {
        &self.sections[0]
    }

    pub fn last(&self) -> &SymbolNameSection {
        self.sections.last().expect("symbol name has no sections")
    }

    pub fn location(&self) -> SrcLocation {
        let first = self.first().ident.location;
        let last = self.last().ident.location;
        if first.is_dummy() {
            return last;
        }
        first.join(&last)
    }

    /// The dotted text of the path, without template arguments.
    pub fn text(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.ident.name.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// Wrapper applied around a named type, ordered outermost first:
/// `&*T` is `[Reference, StrongPtr]` around `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeNameModifier {
    Reference,
    StrongPtr,
    WeakPtr,
}

/// A type as written: a symbol path plus reference/pointer wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: SymbolName,
    pub modifiers: Vec<TypeNameModifier>,
}

impl TypeName {
    pub fn plain(name: SymbolName) -> Self {
        Self {
            name,
            modifiers: Vec::new(),
        }
    }

    pub fn wrapped(name: SymbolName, modifiers: Vec<TypeNameModifier>) -> Self {
        Self { name, modifiers }
    }

    pub fn location(&self) -> SrcLocation {
        self.name.location()
    }
}
