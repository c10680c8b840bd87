//! Trial-parse classification of attribute snippets

use tracing::debug;

use crate::config::LanguageLevel;
use crate::oracle::{GrammarContext, LanguageConfig, SyntaxOracle};
use crate::template::model::{Category, Classification};

/// Embed `snippet` where a fragment of `category` belongs
fn wrap(category: Category, snippet: &str) -> String {
    match category {
        Category::Args => format!(
            "class Type{{\npublic Type(){{\n}}\n\npublic void test(){{\nSomeClass.someMethod({});\n}}\n}}",
            snippet
        ),
        Category::ArgsDef => format!(
            "class Type{{\npublic Type(){{\n}}\n\npublic void test({}){{\n}}\n}}",
            snippet
        ),
        Category::Expr => format!("class Type{{\npublic Type(){{\n{}\n}}\n}}", snippet),
        Category::Name => format!(
            "class {0}{{\npublic {0}(){{\n}}\n\npublic void test(){{\n}}\n}}",
            snippet
        ),
        Category::ReturnType => format!(
            "class Type{{\npublic Type(){{\n}}\npublic {} someMethod(){{\n}}\n}}",
            snippet
        ),
        Category::Value => format!(
            "class Type{{\npublic Type(){{\nObject o = {};\n}}\n}}",
            snippet
        ),
    }
}

fn fits<O>(oracle: &O, category: Category, snippet: &str, config: &LanguageConfig) -> bool
where
    O: SyntaxOracle + ?Sized,
{
    let outcome = oracle.try_parse(
        &wrap(category, snippet),
        GrammarContext::CompilationUnit,
        config,
    );
    debug!(
        %category,
        diagnostics = outcome.diagnostics.len(),
        "classification attempt"
    );
    outcome.is_clean()
}

/// Decide which categories `snippet` can legally fill.
///
/// A blank snippet is an empty argument list, parameter list or statement list and
/// needs no parse. A snippet that parses as statements is only ever `Expr`; otherwise
/// every remaining context is tried and the successes are collected.
pub fn classify<O>(oracle: &O, snippet: &str, level: LanguageLevel) -> Classification
where
    O: SyntaxOracle + ?Sized,
{
    let snippet = snippet.trim();
    if snippet.is_empty() {
        return Classification::blank();
    }

    let config = LanguageConfig::new(level);
    if fits(oracle, Category::Expr, snippet, &config) {
        return [Category::Expr].into_iter().collect();
    }

    [
        Category::Args,
        Category::ArgsDef,
        Category::Name,
        Category::ReturnType,
        Category::Value,
    ]
    .into_iter()
    .filter(|&category| fits(oracle, category, snippet, &config))
    .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::oracle::{JavaOracle, ParseOutcome};

    /// Records every text it is asked about and delegates to the Java oracle
    #[derive(Default)]
    pub(crate) struct RecordingOracle {
        pub calls: RefCell<Vec<(String, GrammarContext)>>,
    }

    impl SyntaxOracle for RecordingOracle {
        fn try_parse(
            &self,
            text: &str,
            context: GrammarContext,
            config: &LanguageConfig,
        ) -> ParseOutcome {
            self.calls.borrow_mut().push((text.to_string(), context));
            JavaOracle.try_parse(text, context, config)
        }
    }

    fn categories(snippet: &str) -> Vec<Category> {
        classify(&JavaOracle, snippet, LanguageLevel::BASELINE)
            .iter()
            .collect()
    }

    #[test]
    fn test_blank_snippet_skips_oracle() {
        let oracle = RecordingOracle::default();
        for snippet in ["", "   ", "\n\t"] {
            assert_eq!(
                classify(&oracle, snippet, LanguageLevel::BASELINE),
                Classification::blank()
            );
        }
        assert!(oracle.calls.borrow().is_empty());
    }

    #[test]
    fn test_statement_is_expr_only() {
        let oracle = RecordingOracle::default();
        let result = classify(&oracle, "doWork();", LanguageLevel::BASELINE);
        assert_eq!(result.iter().collect::<Vec<_>>(), vec![Category::Expr]);
        assert_eq!(oracle.calls.borrow().len(), 1);
    }

    #[test]
    fn test_non_statement_tries_every_other_context() {
        let oracle = RecordingOracle::default();
        classify(&oracle, "a + b", LanguageLevel::BASELINE);
        assert_eq!(oracle.calls.borrow().len(), 6);
        assert!(oracle
            .calls
            .borrow()
            .iter()
            .all(|(_, context)| *context == GrammarContext::CompilationUnit));
    }

    #[test]
    fn test_identifier_fits_several_contexts() {
        assert_eq!(
            categories("Foo"),
            vec![
                Category::Args,
                Category::Name,
                Category::ReturnType,
                Category::Value
            ]
        );
    }

    #[test]
    fn test_expression_is_value_and_args() {
        assert_eq!(categories("a + b"), vec![Category::Args, Category::Value]);
        assert_eq!(categories("\"text\""), vec![Category::Args, Category::Value]);
    }

    #[test]
    fn test_argument_lists() {
        assert_eq!(categories("x, 42"), vec![Category::Args]);
        // `Object o = a, b;` declares a second variable
        assert_eq!(categories("a, b"), vec![Category::Args, Category::Value]);
        assert_eq!(categories("int a, String b"), vec![Category::ArgsDef]);
    }

    #[test]
    fn test_types() {
        assert_eq!(categories("void"), vec![Category::ReturnType]);
        assert_eq!(categories("List<String>"), vec![Category::ReturnType]);
        assert_eq!(categories("int[]"), vec![Category::ReturnType]);
    }

    #[test]
    fn test_malformed_snippet_fits_nowhere() {
        assert!(categories("a +").is_empty());
        assert!(categories("1 2").is_empty());
    }

    #[test]
    fn test_deeply_nested_snippets() {
        assert_eq!(categories("f(g(h(i(j(x)))));"), vec![Category::Expr]);
        assert_eq!(categories("((((x))))"), vec![Category::Args, Category::Value]);
        assert_eq!(
            categories("a[b[c[d[0]]]] = (((1 + 2) * 3) - 4);"),
            vec![Category::Expr]
        );
    }

    #[test]
    fn test_comments_inside_snippets() {
        assert_eq!(categories("/** doc */ foo();"), vec![Category::Expr]);
        assert_eq!(categories("foo(); /**/"), vec![Category::Expr]);
        assert_eq!(categories("/* a ** b */ foo();"), vec![Category::Expr]);
    }

    #[test]
    fn test_literals_follow_java_lexical_rules() {
        assert!(categories("'ab'").is_empty());
        assert!(categories("\"\\q\"").is_empty());
        assert_eq!(categories("0b101"), vec![Category::Args, Category::Value]);
        assert_eq!(categories("größe"), categories("Foo"));
    }

    #[test]
    fn test_java8_statement_forms() {
        let snippets = [
            "try (Reader r = open(); Writer w = create()) { r.read(); }",
            "List<String> l = Collections.<String>emptyList();",
            "a.<T>b();",
            "Outer.this.run();",
            "Supplier<String[]> s = String[]::new;",
            "Inner i = x.new Inner();",
            "class Local { int f() { return 1; } }",
            "Runnable r = new Runnable() { public void run() {} };",
            "Runnable r = () -> {};",
            "Function<Integer, Integer> f = x -> { return x + 1; };",
            "outer: for (;;) { break outer; }",
            "assert n > 0 : \"positive\";",
        ];
        for snippet in snippets {
            assert_eq!(categories(snippet), vec![Category::Expr], "{}", snippet);
        }
    }

    #[test]
    fn test_java8_expression_forms() {
        let snippets = [
            "new Runnable() { public void run() {} }",
            "() -> {}",
            "Outer.this",
            "int[]::new",
            "x.new Inner()",
        ];
        for snippet in snippets {
            assert_eq!(
                categories(snippet),
                vec![Category::Args, Category::Value],
                "{}",
                snippet
            );
        }
    }

    #[test]
    fn test_snippet_is_trimmed() {
        assert_eq!(categories("  run  "), categories("run"));
    }
}
