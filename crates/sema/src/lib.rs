//! The semantic core of the `ace` compiler.
//!
//! Three interlocking subsystems live here: the scope graph and name
//! resolution, the generic instantiation engine, and the syntax → sema
//! construction pipeline (declaration, binding, type-checking, lowering,
//! global diagnoses). Resolution triggers instantiation; instantiation
//! declares new symbols that resolution then sees; the binding pass drives
//! both until a fixed point and hands the verified model to the emission
//! collaborator.

pub mod bind;
pub mod cflow;
pub mod compilation;
pub mod declare;
pub mod diagnoses;
pub mod diagnostics;
pub mod emit;
pub mod glue;
pub mod instantiate;
pub mod natives;
pub mod resolve;
pub mod scope;
pub mod sema;
pub mod symbol;
pub mod ty;

mod compile;

pub use compilation::Compilation;
pub use compile::{compile, FunctionBlockBinding};
pub use emit::{Backend, EmitFunction, EmitModel, EmitType};
pub use glue::{GlueProvider, NullGlueProvider};
pub use scope::ScopeId;
pub use symbol::SymbolId;

#[cfg(test)]
mod tests;
