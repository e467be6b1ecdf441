//! Each `@default(fieldName, value)` annotation must name a field actually
//! declared on the same type.

use super::common::default_annotations;
use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;

pub struct DefaultValueValidField;

impl Rule for DefaultValueValidField {
    fn key(&self) -> &'static str {
        "default-value-valid-field"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            for (annotation, field_name, _value) in default_annotations(ty) {
                if !ty.fields.iter().any(|f| f.name == field_name) {
                    diagnostics.push(self.diagnostic(
                        annotation.reference.clone(),
                        format!("'@default' references unknown field '{field_name}'"),
                    ));
                }
            }
        }
    }
}
