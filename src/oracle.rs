//! Syntax oracle: the parsing capability the template engine is built on
//!
//! The engine never inspects Java itself. It asks an oracle whether a piece of text is
//! well-formed in some grammar context and, for statement lists, for the parsed result.
//! [`JavaOracle`] answers with the crate's own Java-subset parser.

use crate::config::LanguageLevel;
use crate::error::ParseError;
use crate::parser::{self, CompilationUnit, Spanned, Stmt};

/// Grammar entry point a text is parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarContext {
    CompilationUnit,
    Statements,
}

/// Per-call language settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    pub level: LanguageLevel,
    /// Skip leading member modifiers when parsing statements
    pub statements_recovery: bool,
}

impl LanguageConfig {
    pub fn new(level: LanguageLevel) -> Self {
        Self {
            level,
            statements_recovery: false,
        }
    }

    pub fn with_statements_recovery(mut self, enabled: bool) -> Self {
        self.statements_recovery = enabled;
        self
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::new(LanguageLevel::BASELINE)
    }
}

/// Structured result of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFragment {
    Unit(CompilationUnit),
    Statements(Vec<Spanned<Stmt>>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutcome {
    pub diagnostics: Vec<ParseError>,
    pub result: Option<ParsedFragment>,
}

impl ParseOutcome {
    /// True when the oracle reported no diagnostics
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn statements(&self) -> Option<&[Spanned<Stmt>]> {
        match &self.result {
            Some(ParsedFragment::Statements(stmts)) => Some(stmts),
            _ => None,
        }
    }

    pub fn into_unit(self) -> Option<CompilationUnit> {
        match self.result {
            Some(ParsedFragment::Unit(unit)) => Some(unit),
            _ => None,
        }
    }
}

pub trait SyntaxOracle {
    fn try_parse(&self, text: &str, context: GrammarContext, config: &LanguageConfig)
        -> ParseOutcome;
}

impl<T: SyntaxOracle + ?Sized> SyntaxOracle for &T {
    fn try_parse(
        &self,
        text: &str,
        context: GrammarContext,
        config: &LanguageConfig,
    ) -> ParseOutcome {
        (**self).try_parse(text, context, config)
    }
}

/// Oracle backed by the logos/chumsky Java-subset parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaOracle;

impl SyntaxOracle for JavaOracle {
    fn try_parse(
        &self,
        text: &str,
        context: GrammarContext,
        config: &LanguageConfig,
    ) -> ParseOutcome {
        let (result, diagnostics) = match context {
            GrammarContext::CompilationUnit => {
                let (unit, errors) = parser::parse_unit(text, config.level);
                (unit.map(ParsedFragment::Unit), errors)
            }
            GrammarContext::Statements => {
                let (stmts, errors) =
                    parser::parse_statements(text, config.level, config.statements_recovery);
                (stmts.map(ParsedFragment::Statements), errors)
            }
        };

        tracing::trace!(
            ?context,
            level = %config.level,
            diagnostics = diagnostics.len(),
            "oracle parse"
        );

        ParseOutcome {
            diagnostics,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_context() {
        let outcome = JavaOracle.try_parse(
            "public class A { void f() {} }",
            GrammarContext::CompilationUnit,
            &LanguageConfig::default(),
        );
        assert!(outcome.is_clean());
        let unit = outcome.into_unit().expect("Should parse");
        assert_eq!(unit.methods().len(), 1);
    }

    #[test]
    fn test_statements_context_returns_statements() {
        let outcome = JavaOracle.try_parse(
            "int x = 1; x++;",
            GrammarContext::Statements,
            &LanguageConfig::default(),
        );
        assert!(outcome.is_clean());
        assert_eq!(outcome.statements().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_diagnostics_reported() {
        let outcome = JavaOracle.try_parse(
            "class {",
            GrammarContext::CompilationUnit,
            &LanguageConfig::default(),
        );
        assert!(!outcome.is_clean());
        assert!(outcome.result.is_none());
    }

    #[test]
    fn test_statements_recovery() {
        let config = LanguageConfig::default().with_statements_recovery(true);
        let outcome =
            JavaOracle.try_parse("public int x = 0;", GrammarContext::Statements, &config);
        assert!(outcome.is_clean());

        let outcome = JavaOracle.try_parse(
            "public int x = 0;",
            GrammarContext::Statements,
            &LanguageConfig::default(),
        );
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_level_is_respected() {
        let text = "class A { Runnable r = () -> go(); }";
        let java8 = LanguageConfig::new(LanguageLevel::Java8);
        let java7 = LanguageConfig::new(LanguageLevel::Java7);
        assert!(JavaOracle
            .try_parse(text, GrammarContext::CompilationUnit, &java8)
            .is_clean());
        assert!(!JavaOracle
            .try_parse(text, GrammarContext::CompilationUnit, &java7)
            .is_clean());
    }

    #[test]
    fn test_reference_oracle() {
        let oracle = &JavaOracle;
        let outcome = oracle.try_parse("f();", GrammarContext::Statements, &LanguageConfig::default());
        assert!(outcome.is_clean());
    }
}
