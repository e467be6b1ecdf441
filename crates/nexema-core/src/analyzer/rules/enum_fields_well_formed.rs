//! `enum` types carry no field types and no defaults; `UniqueFieldIndex`
//! already enforces index uniqueness for every type kind, enum included.

use crate::analyzer::{LocalScope, Rule};
use crate::ast::TypeKind;
use crate::diagnostic::DiagnosticBag;

pub struct EnumFieldsWellFormed;

impl Rule for EnumFieldsWellFormed {
    fn key(&self) -> &'static str {
        "enum-fields-well-formed"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            if ty.kind != TypeKind::Enum {
                continue;
            }
            for field in &ty.fields {
                if field.value_type.is_some() {
                    diagnostics.push(
                        self.diagnostic(field.reference.clone(), "enum fields may not declare a value type"),
                    );
                }
                if field.default_value.is_some() {
                    diagnostics.push(
                        self.diagnostic(field.reference.clone(), "enum fields may not declare a default value"),
                    );
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
    fn plain_enum_members_are_clean() {
        let diagnostics = analyze_source("enum Color { Red Green Blue }");
        assert!(diagnostics.iter().all(|d| d.rule_key != "enum-fields-well-formed"));
    }
}
