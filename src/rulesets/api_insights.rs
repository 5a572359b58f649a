//! Built-in api-insights OpenAPI rules

use crate::diagnostic::Severity;
use crate::functions::RuleFunction;
use crate::rule::Rule;

const GUIDELINES_URL: &str = "https://developer.cisco.com/docs/api-insights/#!api-guidelines-analyzer";

/// Get all built-in api-insights rules
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "date-response-header-format-pattern-requirement",
            &format!(
                "All 'Date' response headers should use a custom pattern match for RFC 5322. \
                 date-time or other given formats should not be used ({})",
                GUIDELINES_URL
            ),
            "$.paths.*.*.responses.*.headers.Date.schema",
        )
        .with_message("{{description}}")
        .with_then(Some("pattern"), RuleFunction::Truthy)
        .with_then(Some("format"), RuleFunction::Falsy)
        .with_severity(Severity::Warning)
        .with_docs(GUIDELINES_URL)
        .with_tag("headers"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_are_valid_and_unique() {
        let rules = builtin_rules();
        let mut codes: Vec<_> = rules.iter().map(|r| r.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), rules.len());

        for rule in &rules {
            assert!(rule.validate().is_ok(), "{} failed validation", rule.code);
        }
    }

    #[test]
    fn test_date_rule_message() {
        let rules = builtin_rules();
        assert_eq!(
            rules[0].description,
            "All 'Date' response headers should use a custom pattern match for RFC 5322. \
             date-time or other given formats should not be used \
             (https://developer.cisco.com/docs/api-insights/#!api-guidelines-analyzer)"
        );
    }
}
