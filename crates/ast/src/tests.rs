use ace_span::{Ident, SrcLocation};

use crate::{
    keyword_token, NumericSuffix, SymbolName, SymbolNameSection, TokenKind, TypeName,
    TypeNameModifier,
};

#[test]
fn test_keyword_table() {
    assert_eq!(keyword_token("module"), Some(TokenKind::ModuleKeyword));
    assert_eq!(keyword_token("ret"), Some(TokenKind::RetKeyword));
    assert_eq!(keyword_token("__size_of"), Some(TokenKind::SizeOfKeyword));
    assert_eq!(keyword_token("i32"), Some(TokenKind::Int32Keyword));
    assert_eq!(keyword_token("return"), None);
}

#[test]
fn test_numeric_suffixes() {
    assert_eq!(NumericSuffix::from_str("i32"), Some(NumericSuffix::I32));
    assert_eq!(NumericSuffix::from_str("f64"), Some(NumericSuffix::F64));
    assert!(NumericSuffix::from_str("f64").unwrap().is_float());
    assert!(!NumericSuffix::from_str("u8").unwrap().is_float());
    assert_eq!(NumericSuffix::from_str("isize"), None);
}

#[test]
fn test_symbol_name_text_and_sections() {
    let name = SymbolName::new(
        vec![
            SymbolNameSection::new(Ident::synthesized("std")),
            SymbolNameSection::new(Ident::synthesized("rc")),
            SymbolNameSection::new(Ident::synthesized("StrongPtr")),
        ],
        true,
    );
    assert_eq!(name.text(), "std::rc::StrongPtr");
    assert_eq!(name.first().ident.name, "std");
    assert_eq!(name.last().ident.name, "StrongPtr");
}

#[test]
fn test_type_name_modifier_order_is_outermost_first() {
    let name = SymbolName::from_ident(Ident::new(SrcLocation::dummy(), "T"));
    let ty = TypeName::wrapped(
        name,
        vec![TypeNameModifier::Reference, TypeNameModifier::StrongPtr],
    );
    assert_eq!(ty.modifiers[0], TypeNameModifier::Reference);
}
