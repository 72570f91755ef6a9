//! Recursive-descent parser over the token stream. Error recovery skips
//! to the next statement or item boundary so one mistake yields one
//! diagnostic.

use std::sync::Arc;

use ace_ast::{
    AccessModifier, AddressOfExprSyntax, AndExprSyntax, AssertStmtSyntax, AssignmentStmtSyntax,
    BlockStmtSyntax, BoxExprSyntax, CallExprSyntax, CastExprSyntax, CompoundAssignmentStmtSyntax,
    ConstraintSyntax, DerefAsExprSyntax, ExitStmtSyntax, ExprStmtSyntax, ExprSyntax,
    FieldInitSyntax, FieldSyntax, FunctionSyntax, IfStmtSyntax, ImplSyntax, ItemSyntax,
    LiteralExprSyntax, LiteralKind, MemberAccessExprSyntax, ModuleSyntax, NumericSuffix, Op,
    OpKind, OrExprSyntax, ParamSyntax, ParenExprSyntax, PrototypeSyntax, RetStmtSyntax,
    SelfParamSyntax, SizeOfExprSyntax, StaticVarSyntax, StmtSyntax, StructInitExprSyntax,
    StructSyntax, SymbolName, SymbolNameSection, SymbolRefExprSyntax, TemplateParamSyntax,
    TokenKind, TraitSyntax, TypeName, TypeNameModifier, UnboxExprSyntax, UseSyntax,
    UserBinaryExprSyntax, UserUnaryExprSyntax, VarStmtSyntax, WhileStmtSyntax,
};
use ace_error::{Diagnostic, DiagnosticBag, DiagnosticCode, Expected};
use ace_span::{Ident, SrcLocation};

use crate::lexer::Token;

pub fn parse_tokens(tokens: &[Token]) -> Expected<Vec<ItemSyntax>> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        bag: DiagnosticBag::new(),
    };
    let items = parser.parse_items(TokenKind::Eof);
    Expected::found_with(items, parser.bag)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    bag: DiagnosticBag,
}

const PRIMITIVE_TYPE_KEYWORDS: &[TokenKind] = &[
    TokenKind::IntKeyword,
    TokenKind::Int8Keyword,
    TokenKind::Int16Keyword,
    TokenKind::Int32Keyword,
    TokenKind::Int64Keyword,
    TokenKind::UInt8Keyword,
    TokenKind::UInt16Keyword,
    TokenKind::UInt32Keyword,
    TokenKind::UInt64Keyword,
    TokenKind::Float32Keyword,
    TokenKind::Float64Keyword,
    TokenKind::BoolKeyword,
    TokenKind::VoidKeyword,
    TokenKind::StringKeyword,
];

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_at(&self, ahead: usize) -> TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn location(&self) -> SrcLocation {
        self.peek().location
    }

    fn error_here(&mut self, message: &str) {
        let location = self.location();
        self.bag
            .add(Diagnostic::error(location, message).with_code(DiagnosticCode::InvalidSyntax));
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            self.error_here(&format!("expected {}", what));
            None
        }
    }

    fn is_name_start(&self) -> bool {
        self.at(TokenKind::Ident)
            || self.at(TokenKind::SelfKeyword)
            || PRIMITIVE_TYPE_KEYWORDS.contains(&self.peek_kind())
    }

    fn parse_name_ident(&mut self) -> Option<Ident> {
        if self.is_name_start() {
            let token = self.bump();
            Some(Ident::new(token.location, token.text))
        } else {
            self.error_here("expected a name");
            None
        }
    }

    fn skip_to(&mut self, kinds: &[TokenKind]) {
        while !self.at(TokenKind::Eof) && !kinds.contains(&self.peek_kind()) {
            self.bump();
        }
    }

    // ---- items ----

    fn parse_items(&mut self, terminator: TokenKind) -> Vec<ItemSyntax> {
        let mut items = Vec::new();
        while !self.at(terminator) && !self.at(TokenKind::Eof) {
            let before = self.pos;
            if let Some(item) = self.parse_item() {
                items.push(item);
            }
            if self.pos == before {
                // Nothing consumed: drop the offending token and move on.
                self.bump();
            }
        }
        items
    }

    fn parse_access(&mut self) -> AccessModifier {
        if self.eat(TokenKind::PubKeyword).is_some() {
            AccessModifier::Public
        } else {
            AccessModifier::Private
        }
    }

    fn parse_item(&mut self) -> Option<ItemSyntax> {
        let start = self.location();
        let access = self.parse_access();
        match self.peek_kind() {
            TokenKind::ModuleKeyword => self.parse_module(start, access),
            TokenKind::UseKeyword => self.parse_use(start, access),
            TokenKind::StructKeyword => self.parse_struct(start, access),
            TokenKind::TraitKeyword => self.parse_trait(start, access),
            TokenKind::ImplKeyword => self.parse_impl(start),
            TokenKind::ExternKeyword => {
                self.bump();
                self.parse_function(start, access, true)
                    .map(ItemSyntax::Function)
            }
            TokenKind::Ident => {
                // `name(` or `name[` opens a function; `name:` a static
                // variable.
                match self.peek_at(1) {
                    TokenKind::OpenParen | TokenKind::OpenBracket => self
                        .parse_function(start, access, false)
                        .map(ItemSyntax::Function),
                    TokenKind::Colon => self.parse_static_var(start, access),
                    _ => {
                        self.error_here("expected a declaration");
                        self.skip_to(&[TokenKind::Semicolon, TokenKind::CloseBrace]);
                        self.eat(TokenKind::Semicolon);
                        None
                    }
                }
            }
            _ => {
                self.error_here("expected a declaration");
                self.skip_to(&[TokenKind::Semicolon, TokenKind::CloseBrace]);
                self.eat(TokenKind::Semicolon);
                None
            }
        }
    }

    fn parse_module(&mut self, start: SrcLocation, access: AccessModifier) -> Option<ItemSyntax> {
        self.bump();
        let mut name = vec![self.parse_name_ident()?];
        while self.eat(TokenKind::ColonColon).is_some() {
            name.push(self.parse_name_ident()?);
        }
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let items = self.parse_items(TokenKind::CloseBrace);
        let end = self.location();
        self.expect(TokenKind::CloseBrace, "`}`");
        Some(ItemSyntax::Module(Arc::new(ModuleSyntax {
            location: start.join(&end),
            name,
            access,
            items,
        })))
    }

    fn parse_use(&mut self, start: SrcLocation, access: AccessModifier) -> Option<ItemSyntax> {
        self.bump();
        let target = self.parse_symbol_name()?;
        let end = self.location();
        self.expect(TokenKind::Semicolon, "`;`");
        Some(ItemSyntax::Use(Arc::new(UseSyntax {
            location: start.join(&end),
            access,
            target,
        })))
    }

    fn parse_template_params(&mut self) -> Vec<TemplateParamSyntax> {
        let mut params = Vec::new();
        if self.eat(TokenKind::OpenBracket).is_none() {
            return params;
        }
        loop {
            if let Some(ident) = self.parse_name_ident() {
                params.push(TemplateParamSyntax {
                    location: ident.location,
                    ident,
                });
            } else {
                break;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::CloseBracket, "`]`");
        params
    }

    fn parse_struct(&mut self, start: SrcLocation, access: AccessModifier) -> Option<ItemSyntax> {
        self.bump();
        let name = self.parse_name_ident()?;
        let template_params = if self.at(TokenKind::OpenBracket) {
            self.parse_template_params()
        } else {
            Vec::new()
        };
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let field_start = self.location();
            let field_access = self.parse_access();
            let Some(field_name) = self.parse_name_ident() else {
                self.skip_to(&[TokenKind::Comma, TokenKind::CloseBrace]);
                self.eat(TokenKind::Comma);
                continue;
            };
            self.expect(TokenKind::Colon, "`:`");
            let Some(type_name) = self.parse_type_name() else {
                self.skip_to(&[TokenKind::Comma, TokenKind::CloseBrace]);
                self.eat(TokenKind::Comma);
                continue;
            };
            fields.push(FieldSyntax {
                location: field_start.join(&type_name.location()),
                name: field_name,
                access: field_access,
                type_name,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let end = self.location();
        self.expect(TokenKind::CloseBrace, "`}`");
        Some(ItemSyntax::Struct(Arc::new(StructSyntax {
            location: start.join(&end),
            name,
            access,
            template_params,
            fields,
        })))
    }

    fn parse_trait(&mut self, start: SrcLocation, access: AccessModifier) -> Option<ItemSyntax> {
        self.bump();
        let name = self.parse_name_ident()?;
        let template_params = if self.at(TokenKind::OpenBracket) {
            self.parse_template_params()
        } else {
            Vec::new()
        };
        let mut supertraits = Vec::new();
        if self.eat(TokenKind::Colon).is_some() {
            loop {
                if let Some(supertrait) = self.parse_symbol_name() {
                    supertraits.push(supertrait);
                }
                if self.eat(TokenKind::Plus).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut prototypes = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            if let Some(prototype) = self.parse_prototype() {
                prototypes.push(prototype);
            } else {
                self.skip_to(&[TokenKind::Semicolon, TokenKind::CloseBrace]);
                self.eat(TokenKind::Semicolon);
            }
        }
        let end = self.location();
        self.expect(TokenKind::CloseBrace, "`}`");
        Some(ItemSyntax::Trait(Arc::new(TraitSyntax {
            location: start.join(&end),
            name,
            access,
            template_params,
            supertraits,
            prototypes,
        })))
    }

    fn parse_prototype(&mut self) -> Option<Arc<PrototypeSyntax>> {
        let start = self.location();
        let name = self.parse_name_ident()?;
        let template_params = if self.at(TokenKind::OpenBracket) {
            self.parse_template_params()
        } else {
            Vec::new()
        };
        self.expect(TokenKind::OpenParen, "`(`")?;
        let (self_param, params) = self.parse_params();
        let return_type = if self.eat(TokenKind::Arrow).is_some() {
            self.parse_type_name()
        } else {
            None
        };
        let end = self.location();
        self.expect(TokenKind::Semicolon, "`;`");
        Some(Arc::new(PrototypeSyntax {
            location: start.join(&end),
            name,
            template_params,
            self_param,
            params,
            return_type,
        }))
    }

    fn parse_impl(&mut self, start: SrcLocation) -> Option<ItemSyntax> {
        self.bump();
        let template_params = if self.at(TokenKind::OpenBracket) {
            self.parse_template_params()
        } else {
            Vec::new()
        };
        let first = self.parse_type_name()?;
        let (trait_name, type_name) = if self.eat(TokenKind::ForKeyword).is_some() {
            let subject = self.parse_type_name()?;
            (Some(first.name), subject)
        } else {
            (None, first)
        };
        let constraints = self.parse_where_clause();
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut functions = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let fn_start = self.location();
            let fn_access = self.parse_access();
            let is_extern = self.eat(TokenKind::ExternKeyword).is_some();
            if let Some(function) = self.parse_function(fn_start, fn_access, is_extern) {
                functions.push(function);
            } else {
                self.skip_to(&[TokenKind::CloseBrace, TokenKind::Semicolon]);
                self.eat(TokenKind::Semicolon);
            }
        }
        let end = self.location();
        self.expect(TokenKind::CloseBrace, "`}`");
        Some(ItemSyntax::Impl(Arc::new(ImplSyntax {
            location: start.join(&end),
            template_params,
            trait_name,
            type_name,
            functions,
            constraints,
        })))
    }

    fn parse_where_clause(&mut self) -> Vec<ConstraintSyntax> {
        let mut constraints = Vec::new();
        if self.eat(TokenKind::WhereKeyword).is_none() {
            return constraints;
        }
        loop {
            let start = self.location();
            let Some(subject) = self.parse_type_name() else {
                break;
            };
            if self.expect(TokenKind::Colon, "`:`").is_none() {
                break;
            }
            let mut traits = Vec::new();
            loop {
                if let Some(bound) = self.parse_symbol_name() {
                    traits.push(bound);
                }
                if self.eat(TokenKind::Plus).is_none() {
                    break;
                }
            }
            constraints.push(ConstraintSyntax {
                location: start,
                subject,
                traits,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        constraints
    }

    fn parse_function(
        &mut self,
        start: SrcLocation,
        access: AccessModifier,
        is_extern: bool,
    ) -> Option<Arc<FunctionSyntax>> {
        let name = self.parse_name_ident()?;
        let template_params = if self.at(TokenKind::OpenBracket) {
            self.parse_template_params()
        } else {
            Vec::new()
        };
        self.expect(TokenKind::OpenParen, "`(`")?;
        let (self_param, params) = self.parse_params();
        let return_type = if self.eat(TokenKind::Arrow).is_some() {
            self.parse_type_name()
        } else {
            None
        };
        let constraints = self.parse_where_clause();
        let (block, end) = if self.at(TokenKind::OpenBrace) {
            let block = self.parse_block()?;
            let end = block.location;
            (Some(block), end)
        } else {
            let end = self.location();
            self.expect(TokenKind::Semicolon, "`;` or a block");
            (None, end)
        };
        Some(Arc::new(FunctionSyntax {
            location: start.join(&end),
            name,
            access,
            template_params,
            self_param,
            params,
            return_type,
            constraints,
            block,
            is_extern,
        }))
    }

    /// Parse `(self, a: T, b: U)`; the closing paren is consumed.
    fn parse_params(&mut self) -> (Option<SelfParamSyntax>, Vec<ParamSyntax>) {
        let mut self_param = None;
        let mut params = Vec::new();
        if self.eat(TokenKind::CloseParen).is_some() {
            return (self_param, params);
        }
        if self.at(TokenKind::SelfKeyword) {
            let token = self.bump();
            self_param = Some(SelfParamSyntax {
                location: token.location,
            });
            if self.eat(TokenKind::Comma).is_none() {
                self.expect(TokenKind::CloseParen, "`)`");
                return (self_param, params);
            }
        }
        loop {
            let Some(name) = self.parse_name_ident() else {
                break;
            };
            self.expect(TokenKind::Colon, "`:`");
            let Some(type_name) = self.parse_type_name() else {
                break;
            };
            params.push(ParamSyntax {
                location: name.location.join(&type_name.location()),
                name,
                type_name,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::CloseParen, "`)`");
        (self_param, params)
    }

    fn parse_static_var(
        &mut self,
        start: SrcLocation,
        access: AccessModifier,
    ) -> Option<ItemSyntax> {
        let name = self.parse_name_ident()?;
        self.expect(TokenKind::Colon, "`:`")?;
        let type_name = self.parse_type_name()?;
        let initializer = if self.eat(TokenKind::Equals).is_some() {
            self.parse_expr(true)
        } else {
            None
        };
        let end = self.location();
        self.expect(TokenKind::Semicolon, "`;`");
        Some(ItemSyntax::StaticVar(Arc::new(StaticVarSyntax {
            location: start.join(&end),
            name,
            access,
            type_name,
            initializer,
        })))
    }

    // ---- names and types ----

    fn parse_symbol_name(&mut self) -> Option<SymbolName> {
        let is_global = self.eat(TokenKind::ColonColon).is_some();
        let mut sections = vec![self.parse_name_section()?];
        while self.at(TokenKind::ColonColon) {
            self.bump();
            sections.push(self.parse_name_section()?);
        }
        Some(SymbolName::new(sections, is_global))
    }

    fn parse_name_section(&mut self) -> Option<SymbolNameSection> {
        let ident = self.parse_name_ident()?;
        let mut template_args = Vec::new();
        if self.at(TokenKind::OpenBracket) {
            self.bump();
            loop {
                if let Some(arg) = self.parse_type_name() {
                    template_args.push(arg);
                } else {
                    break;
                }
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::CloseBracket, "`]`");
        }
        Some(SymbolNameSection::with_args(ident, template_args))
    }

    fn parse_type_name(&mut self) -> Option<TypeName> {
        let mut modifiers = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Ampersand => {
                    self.bump();
                    modifiers.push(TypeNameModifier::Reference);
                }
                TokenKind::Asterisk => {
                    self.bump();
                    modifiers.push(TypeNameModifier::StrongPtr);
                }
                TokenKind::Tilde => {
                    self.bump();
                    modifiers.push(TypeNameModifier::WeakPtr);
                }
                _ => break,
            }
        }
        let name = self.parse_symbol_name()?;
        Some(TypeName::wrapped(name, modifiers))
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Option<Arc<BlockStmtSyntax>> {
        let start = self.location();
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let before = self.pos;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.pos == before {
                self.bump();
            }
        }
        let end = self.location();
        self.expect(TokenKind::CloseBrace, "`}`");
        Some(Arc::new(BlockStmtSyntax {
            location: start.join(&end),
            stmts,
        }))
    }

    fn parse_stmt(&mut self) -> Option<StmtSyntax> {
        let start = self.location();
        match self.peek_kind() {
            TokenKind::OpenBrace => self.parse_block().map(StmtSyntax::Block),
            TokenKind::IfKeyword => self.parse_if(start),
            TokenKind::WhileKeyword => {
                self.bump();
                let condition = self.parse_expr(false)?;
                let body = self.parse_block()?;
                Some(StmtSyntax::While(Arc::new(WhileStmtSyntax {
                    location: start.join(&body.location),
                    condition,
                    body,
                })))
            }
            TokenKind::RetKeyword => {
                self.bump();
                let expr = if self.at(TokenKind::Semicolon) {
                    None
                } else {
                    self.parse_expr(true)
                };
                let end = self.location();
                self.expect(TokenKind::Semicolon, "`;`");
                Some(StmtSyntax::Ret(Arc::new(RetStmtSyntax {
                    location: start.join(&end),
                    expr,
                })))
            }
            TokenKind::ExitKeyword => {
                self.bump();
                let end = self.location();
                self.expect(TokenKind::Semicolon, "`;`");
                Some(StmtSyntax::Exit(Arc::new(ExitStmtSyntax {
                    location: start.join(&end),
                })))
            }
            TokenKind::AssertKeyword => {
                self.bump();
                let condition = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::Semicolon, "`;`");
                Some(StmtSyntax::Assert(Arc::new(AssertStmtSyntax {
                    location: start.join(&end),
                    condition,
                })))
            }
            TokenKind::Ident if self.peek_at(1) == TokenKind::Colon => {
                // `name: Type = init;` declares a local.
                let name = self.parse_name_ident()?;
                self.bump();
                let type_name = self.parse_type_name()?;
                let initializer = if self.eat(TokenKind::Equals).is_some() {
                    self.parse_expr(true)
                } else {
                    None
                };
                let end = self.location();
                self.expect(TokenKind::Semicolon, "`;`");
                Some(StmtSyntax::Var(Arc::new(VarStmtSyntax {
                    location: start.join(&end),
                    name,
                    type_name,
                    initializer,
                })))
            }
            _ => self.parse_expr_like_stmt(start),
        }
    }

    fn parse_if(&mut self, start: SrcLocation) -> Option<StmtSyntax> {
        self.bump();
        let mut conditions = vec![self.parse_expr(false)?];
        let mut bodies = vec![self.parse_block()?];
        let mut end = bodies.last().unwrap().location;
        loop {
            if self.eat(TokenKind::ElifKeyword).is_some() {
                conditions.push(self.parse_expr(false)?);
                bodies.push(self.parse_block()?);
                end = bodies.last().unwrap().location;
            } else if self.eat(TokenKind::ElseKeyword).is_some() {
                bodies.push(self.parse_block()?);
                end = bodies.last().unwrap().location;
                break;
            } else {
                break;
            }
        }
        Some(StmtSyntax::If(Arc::new(IfStmtSyntax {
            location: start.join(&end),
            conditions,
            bodies,
        })))
    }

    /// Expression statement, assignment, or compound assignment.
    fn parse_expr_like_stmt(&mut self, start: SrcLocation) -> Option<StmtSyntax> {
        let expr = self.parse_expr(true)?;
        let compound_op = match self.peek_kind() {
            TokenKind::PlusEquals => Some(OpKind::Add),
            TokenKind::MinusEquals => Some(OpKind::Sub),
            TokenKind::AsteriskEquals => Some(OpKind::Mul),
            TokenKind::SlashEquals => Some(OpKind::Div),
            TokenKind::PercentEquals => Some(OpKind::Rem),
            TokenKind::LessThanLessThanEquals => Some(OpKind::Shl),
            TokenKind::GreaterThanGreaterThanEquals => Some(OpKind::Shr),
            TokenKind::AmpersandEquals => Some(OpKind::BitAnd),
            TokenKind::VerticalBarEquals => Some(OpKind::BitOr),
            TokenKind::CaretEquals => Some(OpKind::BitXor),
            _ => None,
        };
        if let Some(kind) = compound_op {
            let op_token = self.bump();
            let rhs = self.parse_expr(true)?;
            let end = self.location();
            self.expect(TokenKind::Semicolon, "`;`");
            return Some(StmtSyntax::CompoundAssignment(Arc::new(
                CompoundAssignmentStmtSyntax {
                    location: start.join(&end),
                    lhs: expr,
                    rhs,
                    op: Op {
                        location: op_token.location,
                        kind,
                    },
                },
            )));
        }
        if self.eat(TokenKind::Equals).is_some() {
            let rhs = self.parse_expr(true)?;
            let end = self.location();
            self.expect(TokenKind::Semicolon, "`;`");
            return Some(StmtSyntax::Assignment(Arc::new(AssignmentStmtSyntax {
                location: start.join(&end),
                lhs: expr,
                rhs,
            })));
        }
        let end = self.location();
        self.expect(TokenKind::Semicolon, "`;`");
        Some(StmtSyntax::Expr(Arc::new(ExprStmtSyntax {
            location: start.join(&end),
            expr,
        })))
    }

    // ---- expressions ----

    fn parse_expr(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        self.parse_or(allow_struct_init)
    }

    fn parse_or(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        let mut lhs = self.parse_and(allow_struct_init)?;
        while self.at(TokenKind::VerticalBarVerticalBar) {
            let token = self.bump();
            let rhs = self.parse_and(allow_struct_init)?;
            lhs = ExprSyntax::Or(Arc::new(OrExprSyntax {
                location: lhs.location().join(&token.location).join(&rhs.location()),
                lhs,
                rhs,
            }));
        }
        Some(lhs)
    }

    fn parse_and(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        let mut lhs = self.parse_binary(0, allow_struct_init)?;
        while self.at(TokenKind::AmpersandAmpersand) {
            let token = self.bump();
            let rhs = self.parse_binary(0, allow_struct_init)?;
            lhs = ExprSyntax::And(Arc::new(AndExprSyntax {
                location: lhs.location().join(&token.location).join(&rhs.location()),
                lhs,
                rhs,
            }));
        }
        Some(lhs)
    }

    fn binary_op_at(&self, level: usize) -> Option<OpKind> {
        // Loosest first; `parse_binary(0)` starts at bitwise-or.
        let kind = self.peek_kind();
        let op = match (level, kind) {
            (0, TokenKind::VerticalBar) => OpKind::BitOr,
            (1, TokenKind::Caret) => OpKind::BitXor,
            (2, TokenKind::Ampersand) => OpKind::BitAnd,
            (3, TokenKind::EqualsEquals) => OpKind::Eq,
            (3, TokenKind::ExclamationEquals) => OpKind::Ne,
            (4, TokenKind::LessThan) => OpKind::Lt,
            (4, TokenKind::GreaterThan) => OpKind::Gt,
            (4, TokenKind::LessThanEquals) => OpKind::Le,
            (4, TokenKind::GreaterThanEquals) => OpKind::Ge,
            (5, TokenKind::LessThanLessThan) => OpKind::Shl,
            (5, TokenKind::GreaterThanGreaterThan) => OpKind::Shr,
            (6, TokenKind::Plus) => OpKind::Add,
            (6, TokenKind::Minus) => OpKind::Sub,
            (7, TokenKind::Asterisk) => OpKind::Mul,
            (7, TokenKind::Slash) => OpKind::Div,
            (7, TokenKind::Percent) => OpKind::Rem,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, level: usize, allow_struct_init: bool) -> Option<ExprSyntax> {
        if level > 7 {
            return self.parse_unary(allow_struct_init);
        }
        let mut lhs = self.parse_binary(level + 1, allow_struct_init)?;
        while let Some(kind) = self.binary_op_at(level) {
            let token = self.bump();
            let rhs = self.parse_binary(level + 1, allow_struct_init)?;
            lhs = ExprSyntax::UserBinary(Arc::new(UserBinaryExprSyntax {
                location: lhs.location().join(&rhs.location()),
                op: Op {
                    location: token.location,
                    kind,
                },
                lhs,
                rhs,
            }));
        }
        Some(lhs)
    }

    fn parse_unary(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        let kind = match self.peek_kind() {
            TokenKind::Minus => Some(OpKind::Neg),
            TokenKind::Exclamation => Some(OpKind::Not),
            _ => None,
        };
        if let Some(kind) = kind {
            let token = self.bump();
            let operand = self.parse_unary(allow_struct_init)?;
            return Some(ExprSyntax::UserUnary(Arc::new(UserUnaryExprSyntax {
                location: token.location.join(&operand.location()),
                op: Op {
                    location: token.location,
                    kind,
                },
                operand,
            })));
        }
        self.parse_postfix(allow_struct_init)
    }

    fn parse_postfix(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        let mut expr = self.parse_primary(allow_struct_init)?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.parse_name_ident()?;
                    let mut template_args = Vec::new();
                    if self.at(TokenKind::OpenBracket) {
                        self.bump();
                        loop {
                            if let Some(arg) = self.parse_type_name() {
                                template_args.push(arg);
                            } else {
                                break;
                            }
                            if self.eat(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                        self.expect(TokenKind::CloseBracket, "`]`");
                    }
                    expr = ExprSyntax::MemberAccess(Arc::new(MemberAccessExprSyntax {
                        location: expr.location().join(&name.location),
                        expr,
                        name,
                        template_args,
                    }));
                }
                TokenKind::OpenParen => {
                    self.bump();
                    let mut args = Vec::new();
                    if !self.at(TokenKind::CloseParen) {
                        loop {
                            if let Some(arg) = self.parse_expr(true) {
                                args.push(arg);
                            } else {
                                break;
                            }
                            if self.eat(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    let end = self.location();
                    self.expect(TokenKind::CloseParen, "`)`");
                    expr = ExprSyntax::Call(Arc::new(CallExprSyntax {
                        location: expr.location().join(&end),
                        callee: expr,
                        args,
                    }));
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_struct_init_fields(&mut self) -> Vec<FieldInitSyntax> {
        let mut fields = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let Some(name) = self.parse_name_ident() else {
                break;
            };
            let value = if self.eat(TokenKind::Colon).is_some() {
                self.parse_expr(true)
            } else {
                None
            };
            fields.push(FieldInitSyntax {
                location: name.location,
                name,
                value,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        fields
    }

    fn parse_primary(&mut self, allow_struct_init: bool) -> Option<ExprSyntax> {
        let start = self.location();
        match self.peek_kind() {
            TokenKind::IntLit | TokenKind::FloatLit => {
                let token = self.bump();
                let kind = self.parse_numeric_literal(&token);
                Some(ExprSyntax::Literal(Arc::new(LiteralExprSyntax {
                    location: token.location,
                    kind,
                })))
            }
            TokenKind::StringLit => {
                let token = self.bump();
                let value = unescape_string(token.text.trim_matches('"'));
                Some(ExprSyntax::Literal(Arc::new(LiteralExprSyntax {
                    location: token.location,
                    kind: LiteralKind::Str(value),
                })))
            }
            TokenKind::TrueKeyword | TokenKind::FalseKeyword => {
                let token = self.bump();
                Some(ExprSyntax::Literal(Arc::new(LiteralExprSyntax {
                    location: token.location,
                    kind: LiteralKind::Bool(token.kind == TokenKind::TrueKeyword),
                })))
            }
            TokenKind::OpenParen => {
                self.bump();
                let inner = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::Paren(Arc::new(ParenExprSyntax {
                    location: start.join(&end),
                    inner,
                })))
            }
            TokenKind::CastKeyword => {
                self.bump();
                self.expect(TokenKind::OpenBracket, "`[`")?;
                let type_name = self.parse_type_name()?;
                self.expect(TokenKind::CloseBracket, "`]`")?;
                self.expect(TokenKind::OpenParen, "`(`")?;
                let expr = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::Cast(Arc::new(CastExprSyntax {
                    location: start.join(&end),
                    type_name,
                    expr,
                })))
            }
            TokenKind::SizeOfKeyword => {
                self.bump();
                self.expect(TokenKind::OpenBracket, "`[`")?;
                let type_name = self.parse_type_name()?;
                let end = self.location();
                self.expect(TokenKind::CloseBracket, "`]`");
                Some(ExprSyntax::SizeOf(Arc::new(SizeOfExprSyntax {
                    location: start.join(&end),
                    type_name,
                })))
            }
            TokenKind::AddressOfKeyword => {
                self.bump();
                self.expect(TokenKind::OpenParen, "`(`")?;
                let expr = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::AddressOf(Arc::new(AddressOfExprSyntax {
                    location: start.join(&end),
                    expr,
                })))
            }
            TokenKind::DerefAsKeyword => {
                self.bump();
                self.expect(TokenKind::OpenBracket, "`[`")?;
                let type_name = self.parse_type_name()?;
                self.expect(TokenKind::CloseBracket, "`]`")?;
                self.expect(TokenKind::OpenParen, "`(`")?;
                let expr = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::DerefAs(Arc::new(DerefAsExprSyntax {
                    location: start.join(&end),
                    type_name,
                    expr,
                })))
            }
            TokenKind::BoxKeyword => {
                self.bump();
                self.expect(TokenKind::OpenParen, "`(`")?;
                let expr = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::Box(Arc::new(BoxExprSyntax {
                    location: start.join(&end),
                    expr,
                })))
            }
            TokenKind::UnboxKeyword => {
                self.bump();
                self.expect(TokenKind::OpenParen, "`(`")?;
                let expr = self.parse_expr(true)?;
                let end = self.location();
                self.expect(TokenKind::CloseParen, "`)`");
                Some(ExprSyntax::Unbox(Arc::new(UnboxExprSyntax {
                    location: start.join(&end),
                    expr,
                })))
            }
            kind if kind == TokenKind::Ident
                || kind == TokenKind::SelfKeyword
                || kind == TokenKind::ColonColon
                || PRIMITIVE_TYPE_KEYWORDS.contains(&kind) =>
            {
                let name = self.parse_symbol_name()?;
                if allow_struct_init && self.at(TokenKind::OpenBrace) {
                    self.bump();
                    let fields = self.parse_struct_init_fields();
                    let end = self.location();
                    self.expect(TokenKind::CloseBrace, "`}`");
                    return Some(ExprSyntax::StructInit(Arc::new(StructInitExprSyntax {
                        location: start.join(&end),
                        type_name: name,
                        fields,
                    })));
                }
                Some(ExprSyntax::SymbolRef(Arc::new(SymbolRefExprSyntax {
                    location: name.location(),
                    name,
                })))
            }
            _ => {
                self.error_here("expected an expression");
                None
            }
        }
    }

    fn parse_numeric_literal(&mut self, token: &Token) -> LiteralKind {
        let text = token.text.as_str();
        // Split the optional `_`-separated primitive suffix off the raw
        // text.
        let (digits, suffix) = split_numeric_suffix(text);
        let suffix = match suffix {
            Some(raw) => match NumericSuffix::from_str(raw) {
                Some(suffix) => Some(suffix),
                None => {
                    let location = token.location;
                    self.bag.add(
                        Diagnostic::error(
                            location,
                            format!("unknown numeric suffix `{}`", raw),
                        )
                        .with_code(DiagnosticCode::InvalidSyntax),
                    );
                    None
                }
            },
            None => None,
        };
        if token.kind == TokenKind::FloatLit || matches!(suffix, Some(suffix) if suffix.is_float())
        {
            let value = digits.replace('_', "").parse::<f64>().unwrap_or(0.0);
            LiteralKind::Float {
                value,
                suffix: suffix.unwrap_or(NumericSuffix::F64),
            }
        } else {
            let value = digits.replace('_', "").parse::<u64>().unwrap_or(0);
            LiteralKind::Int { value, suffix }
        }
    }
}

fn split_numeric_suffix(text: &str) -> (&str, Option<&str>) {
    let boundary = text
        .char_indices()
        .find(|(_, c)| c.is_ascii_alphabetic())
        .map(|(index, _)| index);
    match boundary {
        Some(index) => {
            let digits = text[..index].trim_end_matches('_');
            (digits, Some(&text[index..]))
        }
        None => (text, None),
    }
}

fn unescape_string(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => break,
        }
    }
    result
}
