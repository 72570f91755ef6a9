//! The token enumeration of the surface language. Keywords, operator
//! tokens and literal suffixes are parameters of this enumeration; the
//! binding pass consumes operator kinds through [`Op`].

use std::collections::HashMap;
use std::fmt;

use ace_span::SrcLocation;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Eof,

    Colon,
    ColonColon,
    Semicolon,
    Comma,
    Exclamation,
    Tilde,
    Dot,
    Arrow,

    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,

    Ident,
    IntLit,
    FloatLit,
    StringLit,

    Equals,
    EqualsEquals,
    ExclamationEquals,
    Plus,
    PlusEquals,
    Minus,
    MinusEquals,
    Asterisk,
    AsteriskEquals,
    Slash,
    SlashEquals,
    Percent,
    PercentEquals,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    LessThanLessThan,
    LessThanLessThanEquals,
    GreaterThanGreaterThan,
    GreaterThanGreaterThanEquals,
    Caret,
    CaretEquals,
    Ampersand,
    AmpersandEquals,
    AmpersandAmpersand,
    VerticalBar,
    VerticalBarEquals,
    VerticalBarVerticalBar,

    IfKeyword,
    ElifKeyword,
    ElseKeyword,
    WhileKeyword,
    RetKeyword,
    ModuleKeyword,
    UseKeyword,
    StructKeyword,
    TraitKeyword,
    ImplKeyword,
    ForKeyword,
    WhereKeyword,
    OpKeyword,
    PubKeyword,
    ExternKeyword,
    CastKeyword,
    ExitKeyword,
    AssertKeyword,
    BoxKeyword,
    UnboxKeyword,
    TrueKeyword,
    FalseKeyword,
    SelfKeyword,
    AddressOfKeyword,
    SizeOfKeyword,
    DerefAsKeyword,

    IntKeyword,
    Int8Keyword,
    Int16Keyword,
    Int32Keyword,
    Int64Keyword,
    UInt8Keyword,
    UInt16Keyword,
    UInt32Keyword,
    UInt64Keyword,
    Float32Keyword,
    Float64Keyword,
    BoolKeyword,
    VoidKeyword,
    StringKeyword,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("if", TokenKind::IfKeyword),
        ("elif", TokenKind::ElifKeyword),
        ("else", TokenKind::ElseKeyword),
        ("while", TokenKind::WhileKeyword),
        ("ret", TokenKind::RetKeyword),
        ("module", TokenKind::ModuleKeyword),
        ("use", TokenKind::UseKeyword),
        ("struct", TokenKind::StructKeyword),
        ("trait", TokenKind::TraitKeyword),
        ("impl", TokenKind::ImplKeyword),
        ("for", TokenKind::ForKeyword),
        ("where", TokenKind::WhereKeyword),
        ("op", TokenKind::OpKeyword),
        ("pub", TokenKind::PubKeyword),
        ("extern", TokenKind::ExternKeyword),
        ("cast", TokenKind::CastKeyword),
        ("exit", TokenKind::ExitKeyword),
        ("assert", TokenKind::AssertKeyword),
        ("box", TokenKind::BoxKeyword),
        ("unbox", TokenKind::UnboxKeyword),
        ("true", TokenKind::TrueKeyword),
        ("false", TokenKind::FalseKeyword),
        ("self", TokenKind::SelfKeyword),
        ("__address_of", TokenKind::AddressOfKeyword),
        ("__size_of", TokenKind::SizeOfKeyword),
        ("__deref_as", TokenKind::DerefAsKeyword),
        ("int", TokenKind::IntKeyword),
        ("i8", TokenKind::Int8Keyword),
        ("i16", TokenKind::Int16Keyword),
        ("i32", TokenKind::Int32Keyword),
        ("i64", TokenKind::Int64Keyword),
        ("u8", TokenKind::UInt8Keyword),
        ("u16", TokenKind::UInt16Keyword),
        ("u32", TokenKind::UInt32Keyword),
        ("u64", TokenKind::UInt64Keyword),
        ("f32", TokenKind::Float32Keyword),
        ("f64", TokenKind::Float64Keyword),
        ("bool", TokenKind::BoolKeyword),
        ("void", TokenKind::VoidKeyword),
        ("string", TokenKind::StringKeyword),
    ])
});

/// The token kind of a keyword, if `text` is one.
pub fn keyword_token(text: &str) -> Option<TokenKind> {
    KEYWORDS.get(text).copied()
}

/// Suffix of a numeric literal, naming the native type it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericSuffix {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Int,
    F32,
    F64,
}

impl NumericSuffix {
    pub fn from_str(text: &str) -> Option<Self> {
        Some(match text {
            "i8" => NumericSuffix::I8,
            "i16" => NumericSuffix::I16,
            "i32" => NumericSuffix::I32,
            "i64" => NumericSuffix::I64,
            "u8" => NumericSuffix::U8,
            "u16" => NumericSuffix::U16,
            "u32" => NumericSuffix::U32,
            "u64" => NumericSuffix::U64,
            "int" => NumericSuffix::Int,
            "f32" => NumericSuffix::F32,
            "f64" => NumericSuffix::F64,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, NumericSuffix::F32 | NumericSuffix::F64)
    }
}

/// An operator kind, detached from its token spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Not,
    Neg,
}

impl OpKind {
    /// The punctuation the operator was written with.
    pub fn spelling(&self) -> &'static str {
        match self {
            OpKind::Add => "+",
            OpKind::Sub => "-",
            OpKind::Mul => "*",
            OpKind::Div => "/",
            OpKind::Rem => "%",
            OpKind::Eq => "==",
            OpKind::Ne => "!=",
            OpKind::Lt => "<",
            OpKind::Gt => ">",
            OpKind::Le => "<=",
            OpKind::Ge => ">=",
            OpKind::Shl => "<<",
            OpKind::Shr => ">>",
            OpKind::BitAnd => "&",
            OpKind::BitOr => "|",
            OpKind::BitXor => "^",
            OpKind::Not => "!",
            OpKind::Neg => "-",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// An operator occurrence: the kind plus where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Op {
    pub location: SrcLocation,
    pub kind: OpKind,
}
