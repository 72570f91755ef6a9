use ace_ast::{
    ExprSyntax, ItemSyntax, LiteralKind, NumericSuffix, StmtSyntax, TokenKind, TypeNameModifier,
};
use ace_span::SrcBufferStore;

use crate::{lex, parse_file};

fn parse(text: &str) -> Vec<ItemSyntax> {
    let mut store = SrcBufferStore::new();
    let (items, bag) = parse_file(&mut store, "test.ace", text).into_parts();
    assert!(!bag.has_errors(), "unexpected diagnostics: {:?}", bag);
    items.unwrap()
}

#[test]
fn test_lex_basic_tokens() {
    let mut store = SrcBufferStore::new();
    let id = store.add_file("t.ace", "ret x_1 1_i32 2.5 == <<= // comment\n");
    let (tokens, bag) = lex(id, store.get(id).unwrap().text()).into_parts();
    assert!(!bag.has_errors());
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::RetKeyword,
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::FloatLit,
            TokenKind::EqualsEquals,
            TokenKind::LessThanLessThanEquals,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[2].text, "1_i32");
}

#[test]
fn test_parse_module_and_function() {
    let items = parse(
        "pub module math {\n\
         pub add_one(x: i32) -> i32 {\n\
             ret x + 1_i32;\n\
         }\n\
         }\n",
    );
    assert_eq!(items.len(), 1);
    let ItemSyntax::Module(module) = &items[0] else {
        panic!("expected a module, got {:?}", items[0]);
    };
    assert_eq!(module.name[0].name, "math");
    let ItemSyntax::Function(function) = &module.items[0] else {
        panic!("expected a function");
    };
    assert_eq!(function.name.name, "add_one");
    assert_eq!(function.params.len(), 1);
    assert!(function.return_type.is_some());
    let block = function.block.as_ref().unwrap();
    assert!(matches!(block.stmts[0], StmtSyntax::Ret(_)));
}

#[test]
fn test_parse_struct_with_template_params() {
    let items = parse("pub struct Pair[A, B] { first: A, second: B }\n");
    let ItemSyntax::Struct(pair) = &items[0] else {
        panic!("expected a struct");
    };
    assert_eq!(pair.template_params.len(), 2);
    assert_eq!(pair.fields.len(), 2);
    assert_eq!(pair.fields[1].name.name, "second");
}

#[test]
fn test_parse_trait_impl_with_for() {
    let items = parse(
        "trait Show { show(self) -> i32; }\n\
         struct Point { x: i32 }\n\
         impl Show for Point {\n\
             show(self) -> i32 { ret 0_i32; }\n\
         }\n",
    );
    let ItemSyntax::Impl(impl_syntax) = &items[2] else {
        panic!("expected an impl");
    };
    assert!(impl_syntax.trait_name.is_some());
    assert_eq!(impl_syntax.type_name.name.text(), "Point");
    assert_eq!(impl_syntax.functions.len(), 1);
    assert!(impl_syntax.functions[0].self_param.is_some());
}

#[test]
fn test_parse_templated_impl() {
    let items = parse(
        "struct List[T] { head: i32 }\n\
         impl[T] List[T] { len(self) -> int { ret 0; } }\n",
    );
    let ItemSyntax::Impl(impl_syntax) = &items[1] else {
        panic!("expected an impl");
    };
    assert_eq!(impl_syntax.template_params.len(), 1);
    assert!(impl_syntax.trait_name.is_none());
}

#[test]
fn test_parse_type_modifiers_and_paths() {
    let items = parse("holder: &*std::rc::Control;\n");
    let ItemSyntax::StaticVar(var) = &items[0] else {
        panic!("expected a static var");
    };
    assert_eq!(
        var.type_name.modifiers,
        vec![TypeNameModifier::Reference, TypeNameModifier::StrongPtr]
    );
    assert_eq!(var.type_name.name.text(), "std::rc::Control");
}

#[test]
fn test_parse_literals_with_suffixes() {
    let items = parse("f() { x: i32 = 7_i32; y: f32 = 1.5_f32; b: bool = true; }\n");
    let ItemSyntax::Function(function) = &items[0] else {
        panic!("expected a function");
    };
    let block = function.block.as_ref().unwrap();
    let StmtSyntax::Var(x) = &block.stmts[0] else {
        panic!("expected a var stmt");
    };
    let ExprSyntax::Literal(literal) = x.initializer.as_ref().unwrap() else {
        panic!("expected a literal");
    };
    assert_eq!(
        literal.kind,
        LiteralKind::Int {
            value: 7,
            suffix: Some(NumericSuffix::I32)
        }
    );
}

#[test]
fn test_parse_control_flow_statements() {
    let items = parse(
        "loop_demo(n: i32) -> i32 {\n\
             total: i32 = 0_i32;\n\
             while total < n {\n\
                 total += 1_i32;\n\
             }\n\
             if total == n { ret total; } else { ret 0_i32; }\n\
         }\n",
    );
    let ItemSyntax::Function(function) = &items[0] else {
        panic!("expected a function");
    };
    let block = function.block.as_ref().unwrap();
    assert!(matches!(block.stmts[1], StmtSyntax::While(_)));
    assert!(matches!(block.stmts[2], StmtSyntax::If(_)));
}

#[test]
fn test_parse_struct_init_and_member_call() {
    let items = parse(
        "make() -> i32 {\n\
             p: Point = Point { x: 1_i32, y: 2_i32 };\n\
             ret p.x;\n\
         }\n",
    );
    let ItemSyntax::Function(function) = &items[0] else {
        panic!("expected a function");
    };
    let block = function.block.as_ref().unwrap();
    let StmtSyntax::Var(var) = &block.stmts[0] else {
        panic!("expected a var stmt");
    };
    assert!(matches!(
        var.initializer.as_ref().unwrap(),
        ExprSyntax::StructInit(_)
    ));
    let StmtSyntax::Ret(ret) = &block.stmts[1] else {
        panic!("expected a ret stmt");
    };
    assert!(matches!(
        ret.expr.as_ref().unwrap(),
        ExprSyntax::MemberAccess(_)
    ));
}

#[test]
fn test_parse_error_recovers() {
    let mut store = SrcBufferStore::new();
    let (items, bag) = parse_file(&mut store, "bad.ace", "struct { }\n f() { ret; }\n").into_parts();
    assert!(bag.has_errors());
    // The function after the broken struct still parses.
    let items = items.unwrap();
    assert!(items
        .iter()
        .any(|item| matches!(item, ItemSyntax::Function(_))));
}

#[test]
fn test_parse_use_and_where_clause() {
    let items = parse(
        "use math::Vector;\n\
         largest[T](a: T, b: T) -> T where T: Ord {\n\
             ret a;\n\
         }\n",
    );
    assert!(matches!(items[0], ItemSyntax::Use(_)));
    let ItemSyntax::Function(function) = &items[1] else {
        panic!("expected a function");
    };
    assert_eq!(function.template_params.len(), 1);
    assert_eq!(function.constraints.len(), 1);
}
