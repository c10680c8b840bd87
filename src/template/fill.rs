//! Substitution of validated attributes into a template

use handlebars::{no_escape, Handlebars};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LanguageLevel;
use crate::error::{FillError, ParseError, ValidationError};
use crate::oracle::{GrammarContext, LanguageConfig, SyntaxOracle};
use crate::parser::CompilationUnit;
use crate::template::model::{Attributes, Template};
use crate::template::translate::{translate, BACKSLASH_HELPER, LBRACE_HELPER};
use crate::template::validate::validate;

/// Source produced by [`fill`] together with its parse
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub source: String,
    pub unit: Option<CompilationUnit>,
    /// Diagnostics from parsing `source`; attributes can still combine into bad code
    pub diagnostics: Vec<ParseError>,
}

impl GeneratedUnit {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.unit.is_some()
    }
}

/// Rendering context; the field name matches [`crate::template::translate::SLOT_ROOT`]
#[derive(Serialize)]
struct RenderData<'a> {
    slot: &'a Attributes,
}

fn lbrace_helper(
    _: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write("{")?;
    Ok(())
}

fn backslash_helper(
    _: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write("\\")?;
    Ok(())
}

/// Handlebars registry set up to reproduce code verbatim
fn registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(no_escape);
    handlebars.register_helper(LBRACE_HELPER, Box::new(lbrace_helper));
    handlebars.register_helper(BACKSLASH_HELPER, Box::new(backslash_helper));
    handlebars
}

/// Validate `attributes`, substitute them into `template` and parse the result.
///
/// Nothing is generated when validation fails. A successful fill can still carry parse
/// diagnostics: each attribute fits its category, yet their combination may not.
pub fn fill<O>(
    oracle: &O,
    template: &Template,
    attributes: &Attributes,
    level: LanguageLevel,
) -> Result<GeneratedUnit, FillError>
where
    O: SyntaxOracle + ?Sized,
{
    validate(oracle, template.variables(), attributes, level)?;

    // a placeholder left out of the variable list has no declared category
    if let Some(unlisted) = template
        .placeholders()
        .into_iter()
        .find(|p| template.variable(&p.name).is_none())
    {
        return Err(ValidationError::UntypedVariable(unlisted.name).into());
    }

    let translated = translate(template);
    debug!(template = %translated, "translated template");

    let source = registry().render_template(&translated, &RenderData { slot: attributes })?;

    let outcome = oracle.try_parse(
        &source,
        GrammarContext::CompilationUnit,
        &LanguageConfig::new(level),
    );
    if !outcome.is_clean() {
        warn!(
            diagnostics = outcome.diagnostics.len(),
            "generated code does not parse"
        );
    }

    let diagnostics = outcome.diagnostics.clone();
    Ok(GeneratedUnit {
        source,
        unit: outcome.into_unit(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::JavaOracle;
    use crate::parser::{Item, Member, Stmt};
    use crate::template::model::{Category, DelimiterSyntax, TemplateVariable};
    use pretty_assertions::assert_eq;

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fill_source(code: &str, pairs: &[(&str, &str)]) -> Result<GeneratedUnit, FillError> {
        fill(
            &JavaOracle,
            &Template::from_source(code),
            &attributes(pairs),
            LanguageLevel::BASELINE,
        )
    }

    #[test]
    fn test_method_template() {
        let generated = fill_source(
            "void <m:Name>() { <e:Expr> }",
            &[("m", "run"), ("e", "doWork();")],
        )
        .expect("Should fill");

        assert_eq!(generated.source, "void run() { doWork(); }");
        assert!(generated.is_clean());

        let unit = generated.unit.expect("Should parse");
        let methods = unit.methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name.node.as_str(), "run");
        let body = methods[0].body.as_ref().expect("method has a body");
        assert_eq!(body.stmts.len(), 1);
        assert!(matches!(body.stmts[0].node, Stmt::Expr(_)));
    }

    #[test]
    fn test_attribute_text_is_verbatim() {
        let generated = fill_source(
            "class A { String s = <v:Value>; }",
            &[("v", "\"<a href='x'>&amp;</a>\"")],
        )
        .expect("Should fill");
        assert_eq!(
            generated.source,
            "class A { String s = \"<a href='x'>&amp;</a>\"; }"
        );
        assert!(generated.is_clean());
    }

    #[test]
    fn test_braces_and_escapes_survive() {
        let generated = fill_source(
            "class A { void f() {<e:Expr>} char c = '\\\\'; String s = \"{{x}}\"; }",
            &[("e", "g();")],
        )
        .expect("Should fill");
        assert_eq!(
            generated.source,
            "class A { void f() {g();} char c = '\\\\'; String s = \"{{x}}\"; }"
        );
        assert!(generated.is_clean());
    }

    #[test]
    fn test_repeated_placeholder() {
        let generated = fill_source(
            "class <n:Name> { <n:Name>() {} }",
            &[("n", "Widget")],
        )
        .expect("Should fill");
        assert_eq!(generated.source, "class Widget { Widget() {} }");
        let unit = generated.unit.expect("Should parse");
        match &unit.items[0].node {
            Item::Class(class) => {
                assert_eq!(class.name.node.as_str(), "Widget");
                assert!(matches!(class.members[0].node, Member::Constructor(_)));
            }
            other => panic!("Expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_helper_named_variable() {
        let generated = fill_source(
            "class A { int <len:Name>; }",
            &[("len", "size")],
        )
        .expect("Should fill");
        assert_eq!(generated.source, "class A { int size; }");
    }

    #[test]
    fn test_keyword_and_helper_like_names() {
        let generated = fill_source(
            "class A { int <this:Name>; int <else:Name>; int <lookup:Name>; }",
            &[("this", "a"), ("else", "b"), ("lookup", "c")],
        )
        .expect("Should fill");
        assert_eq!(generated.source, "class A { int a; int b; int c; }");
        assert!(generated.is_clean());
    }

    #[test]
    fn test_unicode_name() {
        let generated =
            fill_source("class A { int <n:Name> = 1; }", &[("n", "größe")]).expect("Should fill");
        assert_eq!(generated.source, "class A { int größe = 1; }");
        assert!(generated.is_clean());
    }

    #[test]
    fn test_template_with_javadoc() {
        let generated = fill_source(
            "/**\n * Generated holder.\n */\nclass <n:Name> {\n    /** count **/ int c;/**/\n}",
            &[("n", "Holder")],
        )
        .expect("Should fill");
        assert!(generated.is_clean(), "{:?}", generated.diagnostics);
    }

    #[test]
    fn test_unlisted_placeholder_rejected() {
        let template = Template::new(
            "class <n:Name> { int <f:Name>; }",
            DelimiterSyntax::default(),
            vec![TemplateVariable::new("n", Category::Name)],
        );
        let result = fill(
            &JavaOracle,
            &template,
            &attributes(&[("n", "A"), ("f", "x")]),
            LanguageLevel::BASELINE,
        );
        match result {
            Err(FillError::Validation(ValidationError::UntypedVariable(name))) => {
                assert_eq!(name, "f")
            }
            other => panic!("Expected untyped variable, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_failure_generates_nothing() {
        let result = fill_source("class A { int x = <v:Value>; }", &[]);
        match result {
            Err(FillError::Validation(ValidationError::MissingAttribute(name))) => {
                assert_eq!(name, "v")
            }
            other => panic!("Expected missing attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_fitting_attributes_can_still_combine_badly() {
        // each is a valid Name, but a class and its constructor must agree
        let generated = fill_source(
            "class <a:Name> { public <b:Name>() {} }",
            &[("a", "Left"), ("b", "Right")],
        )
        .expect("Validation passes");
        assert!(!generated.diagnostics.is_empty());
        assert!(!generated.is_clean());
    }
}
