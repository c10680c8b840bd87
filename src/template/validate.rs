//! Checks that attributes fit the variables they are bound to

use tracing::debug;

use crate::config::LanguageLevel;
use crate::error::ValidationError;
use crate::oracle::SyntaxOracle;
use crate::template::classify::classify;
use crate::template::model::{Attributes, TemplateVariable};

/// Validate every variable against its attribute, stopping at the first failure.
///
/// Per variable: it must be named, bound, typed, its attribute must fit at least one
/// category, and that set must contain the declared category.
pub fn validate<O>(
    oracle: &O,
    variables: &[TemplateVariable],
    attributes: &Attributes,
    level: LanguageLevel,
) -> Result<(), ValidationError>
where
    O: SyntaxOracle + ?Sized,
{
    for variable in variables {
        let name = variable.name.as_deref().ok_or(ValidationError::MissingName)?;

        let attribute = attributes
            .get(name)
            .ok_or_else(|| ValidationError::MissingAttribute(name.to_string()))?;

        let declared = variable
            .category
            .ok_or_else(|| ValidationError::UntypedVariable(name.to_string()))?;

        let possible = classify(oracle, attribute, level);
        debug!(variable = name, %declared, %possible, "classified attribute");

        if possible.is_empty() {
            return Err(ValidationError::NoPossibleType(name.to_string()));
        }
        if !possible.contains(declared) {
            return Err(ValidationError::TypeMismatch {
                name: name.to_string(),
                declared,
                possible,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::JavaOracle;
    use crate::template::classify::tests::RecordingOracle;
    use crate::template::model::{Category, Classification};

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn check(variables: &[TemplateVariable], pairs: &[(&str, &str)]) -> Result<(), ValidationError> {
        validate(&JavaOracle, variables, &attributes(pairs), LanguageLevel::BASELINE)
    }

    #[test]
    fn test_matching_attributes() {
        let variables = [
            TemplateVariable::new("m", Category::Name),
            TemplateVariable::new("e", Category::Expr),
        ];
        assert_eq!(check(&variables, &[("m", "run"), ("e", "doWork();")]), Ok(()));
    }

    #[test]
    fn test_blank_attribute_is_not_a_value() {
        let variables = [TemplateVariable::new("v", Category::Value)];
        assert_eq!(
            check(&variables, &[("v", "")]),
            Err(ValidationError::TypeMismatch {
                name: "v".to_string(),
                declared: Category::Value,
                possible: Classification::blank(),
            })
        );
    }

    #[test]
    fn test_blank_attribute_fills_argument_list() {
        let variables = [TemplateVariable::new("a", Category::ArgsDef)];
        assert_eq!(check(&variables, &[("a", "  ")]), Ok(()));
    }

    #[test]
    fn test_untyped_variable() {
        let variables = [TemplateVariable::untyped("x")];
        assert_eq!(
            check(&variables, &[("x", "1")]),
            Err(ValidationError::UntypedVariable("x".to_string()))
        );
    }

    #[test]
    fn test_missing_attribute() {
        let variables = [TemplateVariable::new("x", Category::Value)];
        assert_eq!(
            check(&variables, &[("y", "1")]),
            Err(ValidationError::MissingAttribute("x".to_string()))
        );
    }

    #[test]
    fn test_missing_name() {
        let variables = [TemplateVariable::unnamed(Some(Category::Expr))];
        assert_eq!(check(&variables, &[]), Err(ValidationError::MissingName));
    }

    #[test]
    fn test_attribute_with_errors() {
        let variables = [TemplateVariable::new("v", Category::Value)];
        assert_eq!(
            check(&variables, &[("v", "1 +")]),
            Err(ValidationError::NoPossibleType("v".to_string()))
        );
    }

    #[test]
    fn test_missing_attribute_reported_before_untyped() {
        let variables = [TemplateVariable::untyped("x")];
        assert_eq!(
            check(&variables, &[]),
            Err(ValidationError::MissingAttribute("x".to_string()))
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let oracle = RecordingOracle::default();
        let variables = [
            TemplateVariable::untyped("first"),
            TemplateVariable::new("second", Category::Value),
        ];
        let result = validate(
            &oracle,
            &variables,
            &attributes(&[("first", "a"), ("second", "b")]),
            LanguageLevel::BASELINE,
        );
        assert_eq!(result, Err(ValidationError::UntypedVariable("first".to_string())));
        assert!(oracle.calls.borrow().is_empty());
    }
}
