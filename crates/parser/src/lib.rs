//! Lexer and recursive-descent parser for the `ace` surface syntax.
//!
//! The parser produces `ace-ast` nodes and raises `InvalidSyntax`
//! diagnostics; every semantic judgement stays in the core.

mod lexer;
mod parser;

pub use lexer::{lex, Token};
pub use parser::parse_tokens;

use ace_ast::ItemSyntax;
use ace_error::{DiagnosticBag, Expected};
use ace_span::{BufferId, SrcBufferStore};

/// Lex and parse one source buffer into its top-level items.
pub fn parse_buffer(store: &SrcBufferStore, buffer: BufferId) -> Expected<Vec<ItemSyntax>> {
    let mut bag = DiagnosticBag::new();
    let text = match store.get(buffer) {
        Some(buffer) => buffer.text().to_string(),
        None => return Expected::none(bag),
    };
    let tokens = bag.collect(lex(buffer, &text));
    let items = bag.collect_opt(parse_tokens(&tokens));
    Expected::new(items, bag)
}

/// Register `text` as a new file buffer and parse it; the convenience
/// entry tests and the driver share.
pub fn parse_file(
    store: &mut SrcBufferStore,
    path: impl Into<std::path::PathBuf>,
    text: impl Into<String>,
) -> Expected<Vec<ItemSyntax>> {
    let buffer = store.add_file(path, text);
    parse_buffer(store, buffer)
}

#[cfg(test)]
mod tests;
