//! Java Templates - typed code templates checked by a Java parser
//!
//! This library classifies code snippets by the syntactic role they can play, validates
//! and substitutes them into placeholder-bearing Java source, and renders parseable
//! previews of templates that are still being written.
//!
//! # Example
//!
//! ```rust
//! use java_templates::{Attributes, TemplateEngine};
//!
//! let engine = TemplateEngine::new();
//! let template = engine.template("void <m:Name>() { <e:Expr> }");
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("m".to_string(), "run".to_string());
//! attributes.insert("e".to_string(), "doWork();".to_string());
//!
//! let generated = engine.fill(&template, &attributes).unwrap();
//! assert_eq!(generated.source, "void run() { doWork(); }");
//! assert!(generated.is_clean());
//!
//! assert_eq!(engine.smooth(&template), "void TemplateName() {  }");
//! ```

pub mod config;
pub mod error;
pub mod oracle;
pub mod parser;
pub mod template;

pub use config::{ConfigError, EngineConfig, LanguageLevel};
pub use error::{FillError, ParseError, ValidationError};
pub use oracle::{GrammarContext, JavaOracle, LanguageConfig, ParseOutcome, SyntaxOracle};
pub use template::{
    Attributes, Category, Classification, DelimiterSyntax, GeneratedUnit, JavaType, ReturnKind,
    Template, TemplateVariable, TypeDescriptor,
};

/// Template operations bound to one oracle and configuration
///
/// The engine holds no per-call state, so a shared reference can serve any number of
/// classifications and fills.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine<O = JavaOracle> {
    oracle: O,
    config: EngineConfig,
}

impl TemplateEngine {
    /// Create an engine backed by the Java parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: SyntaxOracle> TemplateEngine<O> {
    /// Create an engine backed by a custom oracle
    pub fn with_oracle(oracle: O) -> Self {
        Self {
            oracle,
            config: EngineConfig::default(),
        }
    }

    /// Replace the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Extract a template from `code` using the configured delimiters
    pub fn template(&self, code: impl Into<String>) -> Template {
        Template::with_delimiters(code, self.config.delimiters.clone())
    }

    /// Categories `snippet` can legally fill
    pub fn classify(&self, snippet: &str) -> Classification {
        template::classify(&self.oracle, snippet, self.config.level)
    }

    /// Type a value placed at the hole identifier in `snippet` would have
    pub fn resolve_value_type(&self, snippet: &str) -> Option<TypeDescriptor> {
        template::resolve_value_type(&self.oracle, snippet, self.config.level)
    }

    pub fn validate(
        &self,
        variables: &[TemplateVariable],
        attributes: &Attributes,
    ) -> Result<(), ValidationError> {
        template::validate(&self.oracle, variables, attributes, self.config.level)
    }

    pub fn translate(&self, template: &Template) -> String {
        template::translate(template)
    }

    /// Validate, substitute and parse
    pub fn fill(
        &self,
        template: &Template,
        attributes: &Attributes,
    ) -> Result<GeneratedUnit, FillError> {
        template::fill(&self.oracle, template, attributes, self.config.level)
    }

    /// Replace placeholders with neutral stand-ins; never fails
    pub fn smooth(&self, template: &Template) -> String {
        template::smooth(&self.oracle, template, self.config.level)
    }
}
