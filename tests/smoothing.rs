//! Integration tests for the smoothing preview

use insta::assert_snapshot;
use java_templates::{EngineConfig, GrammarContext, LanguageConfig, SyntaxOracle, TemplateEngine};

const SERVICE_TEMPLATE: &str = r#"package demo;

public class <cls:Name> {
    private static final long serialVersionUID = <uid:Value>;
    private int count = <start:Value>;
    private String label = <label:Value>;
    private boolean enabled = <flag:Value>;

    public <cls:Name>(<params:ArgsDef>) { <init:Expr> }

    public <result:ReturnType> <method:Name>() {
        double ratio = <ratio:Value>;
        helper(<args:Args>);
        return <fallback:Value>;
    }
}"#;

fn parses(engine: &TemplateEngine, source: &str) -> bool {
    engine
        .oracle()
        .try_parse(
            source,
            GrammarContext::CompilationUnit,
            &LanguageConfig::new(engine.config().level),
        )
        .is_clean()
}

#[test]
fn test_service_template_preview() {
    let engine = TemplateEngine::new();
    let smoothed = engine.smooth(&engine.template(SERVICE_TEMPLATE));
    assert_snapshot!(smoothed, @r#"
package demo;

public class TemplateName {
    private static final long serialVersionUID = 0L;
    private int count = 0;
    private String label = "";
    private boolean enabled = false;

    public TemplateName() {  }

    public void TemplateName() {
        double ratio = 0.0;
        helper();
        return ;
    }
}
"#);
}

#[test]
fn test_sole_unresolvable_return_type() {
    let engine = TemplateEngine::new();
    let smoothed = engine.smooth(&engine.template("<T:ReturnType>"));
    assert_eq!(smoothed, "");
}

#[test]
fn test_preview_of_fillable_template_parses() {
    let engine = TemplateEngine::new();
    let template = engine.template(
        "class <n:Name> {\n    <T:ReturnType> <m:Name>(<p:ArgsDef>) {\n        <body:Expr>\n    }\n    char c = <c:Value>;\n    float[] xs = <xs:Value>;\n}",
    );
    let smoothed = engine.smooth(&template);
    assert!(parses(&engine, &smoothed), "{}", smoothed);
}

#[test]
fn test_smoothing_twice_changes_nothing() {
    let engine = TemplateEngine::new();
    let once = engine.smooth(&engine.template(SERVICE_TEMPLATE));
    let twice = engine.smooth(&engine.template(once.clone()));
    assert_eq!(once, twice);
}

#[test]
fn test_custom_delimiters() {
    let config = EngineConfig::from_str(
        r#"
[delimiters]
open = "/*<"
separator = ":"
close = ">*/"
"#,
    )
    .expect("Should parse config");
    let engine = TemplateEngine::new().with_config(config);
    let smoothed = engine.smooth(&engine.template("class /*<n:Name>*/ { int x = /*<v:Value>*/; }"));
    assert_eq!(smoothed, "class TemplateName { int x = 0; }");
}

#[test]
fn test_values_inside_nested_bodies() {
    let engine = TemplateEngine::new();
    let template = engine.template(
        "class A {\n    Object o = new Object() { long id = <id:Value>; };\n    Runnable r = () -> { char c = <c:Value>; };\n}",
    );
    let smoothed = engine.smooth(&template);
    assert_eq!(
        smoothed,
        "class A {\n    Object o = new Object() { long id = 0L; };\n    Runnable r = () -> { char c = ' '; };\n}"
    );
    assert!(parses(&engine, &smoothed), "{}", smoothed);
}
