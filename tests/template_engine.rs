//! Integration tests for classification, validation and substitution

use std::cell::RefCell;

use java_templates::parser::Stmt;
use java_templates::{
    Attributes, Category, Classification, FillError, GrammarContext, JavaOracle, LanguageConfig,
    ParseOutcome, SyntaxOracle, TemplateEngine, TemplateVariable, ValidationError,
};

/// Counts parser calls on the way to the Java oracle
#[derive(Default)]
struct CountingOracle {
    calls: RefCell<Vec<GrammarContext>>,
}

impl SyntaxOracle for CountingOracle {
    fn try_parse(&self, text: &str, context: GrammarContext, config: &LanguageConfig) -> ParseOutcome {
        self.calls.borrow_mut().push(context);
        JavaOracle.try_parse(text, context, config)
    }
}

fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Template with a single `v` placeholder in a position of `category`
fn template_for(category: Category) -> &'static str {
    match category {
        Category::Args => "class A { void f() { g(<v:Args>); } }",
        Category::ArgsDef => "class A { void f(<v:ArgsDef>) {} }",
        Category::Expr => "class A { A() { <v:Expr> } }",
        Category::Name => "class <v:Name> { <v:Name>() {} }",
        Category::ReturnType => "class A { <v:ReturnType> m() {} }",
        Category::Value => "class A { Object o = <v:Value>; }",
    }
}

#[test]
fn test_method_from_name_and_statement() {
    let engine = TemplateEngine::new();
    let template = engine.template("void <m:Name>() { <e:Expr> }");

    let generated = engine
        .fill(&template, &attributes(&[("m", "run"), ("e", "doWork();")]))
        .expect("Should fill");

    assert!(generated.is_clean());
    let unit = generated.unit.expect("Should parse");
    let methods = unit.methods();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name.node.as_str(), "run");
    let body = methods[0].body.as_ref().expect("Should have a body");
    assert_eq!(body.stmts.len(), 1);
    assert!(matches!(body.stmts[0].node, Stmt::Expr(_)));
}

#[test]
fn test_blank_value_is_a_type_mismatch() {
    let engine = TemplateEngine::new();
    let result = engine.validate(
        &[TemplateVariable::new("v", Category::Value)],
        &attributes(&[("v", "")]),
    );
    assert_eq!(
        result,
        Err(ValidationError::TypeMismatch {
            name: "v".to_string(),
            declared: Category::Value,
            possible: [Category::Args, Category::ArgsDef, Category::Expr]
                .into_iter()
                .collect(),
        })
    );
}

#[test]
fn test_untyped_variable_rejected() {
    let engine = TemplateEngine::new();
    let template = engine.template("class A { int x = <x:>; }");
    match engine.fill(&template, &attributes(&[("x", "1")])) {
        Err(FillError::Validation(ValidationError::UntypedVariable(name))) => assert_eq!(name, "x"),
        other => panic!("Expected untyped variable, got {:?}", other),
    }
}

#[test]
fn test_missing_attribute_rejected() {
    let engine = TemplateEngine::new();
    let result = engine.validate(
        &[TemplateVariable::new("x", Category::Expr)],
        &attributes(&[]),
    );
    assert_eq!(result, Err(ValidationError::MissingAttribute("x".to_string())));
}

#[test]
fn test_fill_is_atomic() {
    let engine = TemplateEngine::new();
    let template = engine.template("class <n:Name> { int f = <v:Value>; }");
    // `n` is fine, `v` does not parse
    let result = engine.fill(&template, &attributes(&[("n", "A"), ("v", "1 +")]));
    assert!(matches!(
        result,
        Err(FillError::Validation(ValidationError::NoPossibleType(_)))
    ));
}

#[test]
fn test_classified_categories_round_trip() {
    let engine = TemplateEngine::new();
    let snippets = [
        "",
        "Foo",
        "a + b",
        "x, 42",
        "int a, String b",
        "void",
        "List<String>",
        "doWork();",
        "for (int i = 0; i < n; i++) { sum += i; }",
        "new StringBuilder().append('x')",
    ];

    for snippet in snippets {
        let classification = engine.classify(snippet);
        for category in classification.iter() {
            let template = engine.template(template_for(category));
            let generated = engine
                .fill(&template, &attributes(&[("v", snippet)]))
                .unwrap_or_else(|e| panic!("{:?} as {}: {}", snippet, category, e));
            assert!(
                generated.is_clean(),
                "{:?} as {} produced {:?}",
                snippet,
                category,
                generated.source
            );
        }
    }
}

#[test]
fn test_rejected_categories_do_not_fill() {
    let engine = TemplateEngine::new();
    let snippet = "int a, String b";
    let classification = engine.classify(snippet);
    for category in Category::ALL {
        if classification.contains(category) {
            continue;
        }
        let template = engine.template(template_for(category));
        assert!(
            engine.fill(&template, &attributes(&[("v", snippet)])).is_err(),
            "{} should be rejected",
            category
        );
    }
}

#[test]
fn test_statement_classification_stops_after_one_parse() {
    let engine = TemplateEngine::with_oracle(CountingOracle::default());
    let classification = engine.classify("System.out.println(1);");
    assert_eq!(classification, [Category::Expr].into_iter().collect());
    assert_eq!(engine.oracle().calls.borrow().len(), 1);
}

#[test]
fn test_blank_classification_needs_no_parser() {
    let engine = TemplateEngine::with_oracle(CountingOracle::default());
    assert_eq!(engine.classify(" \n "), Classification::blank());
    assert!(engine.oracle().calls.borrow().is_empty());
}

#[test]
fn test_fill_parses_once_after_validation() {
    let engine = TemplateEngine::with_oracle(CountingOracle::default());
    let template = engine.template("class A { void f() { <e:Expr> } }");
    engine
        .fill(&template, &attributes(&[("e", "go();")]))
        .expect("Should fill");
    let calls = engine.oracle().calls.borrow();
    // one parse to classify the statement, one parse of the result
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| *c == GrammarContext::CompilationUnit));
}
