//! Error types for parsing, validation and substitution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;
use crate::template::{Category, Classification};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A diagnostic reported by the syntax oracle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("Invalid character(s) at {span:?}: {text:?}")]
    Lexical { span: Span, text: String },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::Lexical { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (span, message, note) = match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let note = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (span.clone(), message.clone(), note)
            }
            ParseError::Lexical { span, text } => (
                span.clone(),
                format!("Invalid character(s) {:?}", text),
                String::new(),
            ),
        };

        // Clamp so a span at end of input still points inside the source
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(&message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(format!("{}{}", message, note))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Syntax error on token {}", format_token(tok)),
                None => "Syntax error, unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::IntLit(_) | Token::FloatLit(_) | Token::CharLit(_) | Token::StringLit(_) => {
            format!("literal {}", tok)
        }
        _ => format!("\"{}\"", tok),
    }
}

/// Why a set of attributes can't be substituted into a template.
///
/// The first failing variable determines the reason; nothing is generated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("A variable has no name.")]
    MissingName,

    #[error("Attributes missing variable: {0}")]
    MissingAttribute(String),

    #[error("Variable {0} is untyped.")]
    UntypedVariable(String),

    #[error("No possible Type for attribute {0} found. It may consist of errors.")]
    NoPossibleType(String),

    #[error("Attribute {name} has possible types {possible} but {declared} was expected.")]
    TypeMismatch {
        name: String,
        declared: Category,
        possible: Classification,
    },
}

/// Errors from the substitution engine
#[derive(Error, Debug)]
pub enum FillError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}
