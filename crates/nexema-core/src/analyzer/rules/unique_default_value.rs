//! At most one default value may govern a given field. A field can get a
//! default two ways — an inline `= value` on the field itself, or a
//! `@default(name, value)` annotation on the enclosing type — and either
//! form can collide with a second occurrence of the other.

use std::collections::HashMap;

use super::common::default_annotations;
use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;
use crate::reference::Reference;

pub struct UniqueDefaultValue;

impl Rule for UniqueDefaultValue {
    fn key(&self) -> &'static str {
        "unique-default-value"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            let mut seen: HashMap<&str, Reference> = HashMap::new();
            for field in &ty.fields {
                if field.default_value.is_some() {
                    seen.insert(field.name.as_str(), field.reference.clone());
                }
            }
            for (annotation, field_name, _value) in default_annotations(ty) {
                if let Some(prev) = seen.get(field_name) {
                    diagnostics.push(self.diagnostic(
                        annotation.reference.clone(),
                        format!("field '{field_name}' already has a default value set at {prev}"),
                    ));
                } else {
                    seen.insert(field_name, annotation.reference.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests_support::analyze_source;

    #[test]
    fn no_duplicates_is_clean() {
        let diagnostics = analyze_source(r#"@default(a, "hello") @default(b, true) struct Foo { a string b bool }"#);
        assert!(diagnostics.iter().all(|d| d.rule_key != "unique-default-value"));
    }

    #[test]
    fn second_annotation_default_for_same_field_is_reported() {
        let diagnostics = analyze_source(r#"@default(a, "hello") @default(a, "world") struct Foo { a string }"#);
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "unique-default-value").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn annotation_default_colliding_with_inline_default_is_reported() {
        let diagnostics = analyze_source(r#"@default(a, "world") struct Foo { a string = "hello" }"#);
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "unique-default-value").collect();
        assert_eq!(hits.len(), 1);
    }
}
