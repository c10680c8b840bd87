//! Rewrites template markers into Handlebars expressions

use crate::template::model::Template;

/// Helper rendering a literal `{`
pub const LBRACE_HELPER: &str = "lbrace";
/// Helper rendering a literal `\`
pub const BACKSLASH_HELPER: &str = "backslash";
/// Context key the attributes are rendered under
pub const SLOT_ROOT: &str = "slot";

/// Copy literal code, escaping what Handlebars would interpret
fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '{' => {
                out.push_str("{{");
                out.push_str(LBRACE_HELPER);
                out.push_str("}}");
            }
            '\\' => {
                out.push_str("{{");
                out.push_str(BACKSLASH_HELPER);
                out.push_str("}}");
            }
            c => out.push(c),
        }
    }
}

/// Translate `template` into a Handlebars template.
///
/// Every placeholder becomes `{{lookup slot "<name>"}}` and its annotation is dropped.
/// The name is a string key, so `this`, `else` or a helper name never reach the
/// path grammar. Braces and backslashes in the code become helper calls so they render
/// back verbatim.
pub fn translate(template: &Template) -> String {
    let code = template.code();
    let mut out = String::with_capacity(code.len());
    let mut last = 0;

    for placeholder in template.placeholders() {
        push_literal(&mut out, &code[last..placeholder.range.start]);
        out.push_str("{{lookup ");
        out.push_str(SLOT_ROOT);
        out.push_str(" \"");
        out.push_str(&placeholder.name);
        out.push_str("\"}}");
        last = placeholder.range.end;
    }
    push_literal(&mut out, &code[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::model::DelimiterSyntax;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placeholders_become_expressions() {
        let template = Template::from_source("<T:ReturnType> <m:Name>(<p:ArgsDef>);");
        assert_eq!(
            translate(&template),
            r#"{{lookup slot "T"}} {{lookup slot "m"}}({{lookup slot "p"}});"#
        );
    }

    #[test]
    fn test_braces_are_escaped() {
        let template = Template::from_source("void f() {<e:Expr>}");
        assert_eq!(
            translate(&template),
            r#"void f() {{lbrace}}{{lookup slot "e"}}}"#
        );
    }

    #[test]
    fn test_backslash_is_escaped() {
        let template = Template::from_source("char c = '\\n';");
        assert_eq!(translate(&template), "char c = '{{backslash}}n';");
    }

    #[test]
    fn test_generics_untouched() {
        let template = Template::from_source("Map<K, V> <x:Name>;");
        assert_eq!(translate(&template), r#"Map<K, V> {{lookup slot "x"}};"#);
    }

    #[test]
    fn test_annotation_dropped_for_untyped_occurrence() {
        let template = Template::from_source("<x:Value> + <x:>");
        assert_eq!(
            translate(&template),
            r#"{{lookup slot "x"}} + {{lookup slot "x"}}"#
        );
    }

    #[test]
    fn test_custom_delimiters() {
        let delimiters = DelimiterSyntax::new("${", "|", "}").expect("valid delimiters");
        let template = Template::with_delimiters("int ${v|Value} = 0;", delimiters);
        assert_eq!(translate(&template), r#"int {{lookup slot "v"}} = 0;"#);
    }

    #[test]
    fn test_keyword_names_are_string_keys() {
        let template = Template::from_source("int <this:Name> = <else:Value>;");
        assert_eq!(
            translate(&template),
            r#"int {{lookup slot "this"}} = {{lookup slot "else"}};"#
        );
    }
}
