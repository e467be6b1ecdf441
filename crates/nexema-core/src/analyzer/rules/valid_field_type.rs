//! Checks that every field's declared type resolves, either to a built-in
//! primitive or to a type reachable through the file's local scope.
//!
//! Only the field's own top-level identifier is this rule's concern; the
//! element types nested inside `list`/`map` arguments are validated by
//! [`super::valid_list_arguments`] and [`super::valid_map_arguments`]
//! respectively, each walking the whole value-type tree for the container
//! kind it owns.

use super::common::check_type_resolves;
use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;

pub struct ValidFieldType;

impl Rule for ValidFieldType {
    fn key(&self) -> &'static str {
        "valid-field-type"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            for field in &ty.fields {
                let Some(value_type) = &field.value_type else {
                    continue;
                };
                check_type_resolves(scope, value_type, self.key(), diagnostics);
            }
        }
    }
}
