//! Lexer for the Java subset using logos

use std::fmt;

use logos::{FilterResult, Logos};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // Declaration keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("throws")]
    Throws,
    #[token("void")]
    Void,

    // Modifiers
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,
    #[token("native")]
    Native,
    #[token("synchronized")]
    Synchronized,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,
    #[token("default")]
    Default,

    // Primitive types
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("char")]
    Char,
    #[token("float")]
    Float,
    #[token("double")]
    Double,

    // Statement keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,

    // Expression keywords
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("instanceof")]
    Instanceof,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Reserved words the subset never accepts, kept so they can't lex as identifiers
    #[token("enum")]
    Enum,
    #[token("assert")]
    Assert,
    #[token("const")]
    Const,
    #[token("goto")]
    Goto,

    // Separators
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,

    // Operators (longer patterns win in logos, `>>` is lexed as two `>` so generics close)
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token(">>>=")]
    UshrAssign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<<")]
    Shl,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // Literals - identifiers must come after keywords
    #[regex(r"[\p{XID_Start}_$][\p{XID_Continue}$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(
        r"0[xX][0-9a-fA-F_]+[lL]?|0[bB][01_]+[lL]?|[0-9][0-9_]*[lL]?",
        |lex| lex.slice().to_string()
    )]
    IntLit(String),

    #[regex(
        r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?[fFdD]?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdD]?|[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?|[0-9][0-9_]*[fFdD]",
        |lex| lex.slice().to_string()
    )]
    FloatLit(String),

    // exactly one character or escape sequence
    #[regex(
        r#"'([^'\\\n\r]|\\([btnfr"'\\]|[0-3][0-7][0-7]|[0-7][0-7]?|u+[0-9a-fA-F]{4}))'"#,
        |lex| {
            let s = lex.slice();
            s[1..s.len()-1].to_string()
        }
    )]
    CharLit(String),

    #[regex(
        r#""([^"\\\n\r]|\\([btnfr"'\\]|[0-3][0-7][0-7]|[0-7][0-7]?|u+[0-9a-fA-F]{4}))*""#,
        |lex| {
            let s = lex.slice();
            s[1..s.len()-1].to_string()
        }
    )]
    StringLit(String),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,
}

/// Skip to the end of a block comment; an unclosed comment is a lexical error
fn block_comment(lex: &mut logos::Lexer<Token>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

impl Token {
    /// Member modifiers that statements recovery may skip at the start of a line
    pub fn is_member_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Protected
                | Token::Private
                | Token::Static
                | Token::Final
                | Token::Transient
                | Token::Volatile
                | Token::Abstract
                | Token::Native
                | Token::Strictfp
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Package => "package",
            Token::Import => "import",
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::Throws => "throws",
            Token::Void => "void",
            Token::Public => "public",
            Token::Protected => "protected",
            Token::Private => "private",
            Token::Static => "static",
            Token::Final => "final",
            Token::Abstract => "abstract",
            Token::Native => "native",
            Token::Synchronized => "synchronized",
            Token::Transient => "transient",
            Token::Volatile => "volatile",
            Token::Strictfp => "strictfp",
            Token::Default => "default",
            Token::Boolean => "boolean",
            Token::Byte => "byte",
            Token::Short => "short",
            Token::Int => "int",
            Token::Long => "long",
            Token::Char => "char",
            Token::Float => "float",
            Token::Double => "double",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Do => "do",
            Token::For => "for",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Throw => "throw",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::New => "new",
            Token::This => "this",
            Token::Super => "super",
            Token::Instanceof => "instanceof",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Enum => "enum",
            Token::Assert => "assert",
            Token::Const => "const",
            Token::Goto => "goto",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::BraceOpen => "{",
            Token::BraceClose => "}",
            Token::BracketOpen => "[",
            Token::BracketClose => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Ellipsis => "...",
            Token::Dot => ".",
            Token::At => "@",
            Token::ColonColon => "::",
            Token::Arrow => "->",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PercentAssign => "%=",
            Token::AmpAssign => "&=",
            Token::PipeAssign => "|=",
            Token::CaretAssign => "^=",
            Token::ShlAssign => "<<=",
            Token::ShrAssign => ">>=",
            Token::UshrAssign => ">>>=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::LessEq => "<=",
            Token::GreaterEq => ">=",
            Token::Less => "<",
            Token::Greater => ">",
            Token::Shl => "<<",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Ident(s) | Token::IntLit(s) | Token::FloatLit(s) => s.as_str(),
            Token::CharLit(s) => return write!(f, "'{}'", s),
            Token::StringLit(s) => return write!(f, "\"{}\"", s),
            Token::LineComment | Token::BlockComment => "comment",
        };
        f.write_str(text)
    }
}

/// Lex input string into tokens with spans, keeping invalid input as `Err(span)`
pub fn lex(input: &str) -> impl Iterator<Item = Result<(Token, Span), Span>> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(_) => Err(span),
        })
}

/// Lex input and drop anything that isn't a valid token
pub fn tokens(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    lex(input).filter_map(Result::ok)
}
