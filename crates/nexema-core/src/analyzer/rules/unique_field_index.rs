//! Flags a collision between two fields' *final* indices, after
//! auto-assignment has filled in every field that did not declare one
//! explicitly. A collision can only happen when two fields
//! declared the same explicit index — auto-assignment never produces a
//! value already claimed by an explicit one.

use std::collections::HashMap;

use crate::ast::assign_field_indices;
use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;

pub struct UniqueFieldIndex;

impl Rule for UniqueFieldIndex {
    fn key(&self) -> &'static str {
        "unique-field-index"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            let assigned = assign_field_indices(&ty.fields);
            let mut seen: HashMap<i64, &crate::reference::Reference> = HashMap::new();
            for (field, index) in ty.fields.iter().zip(assigned.iter()) {
                if let Some(prev) = seen.get(index) {
                    diagnostics.push(self.diagnostic(
                        field.reference.clone(),
                        format!("field index {index} is already used at {prev}"),
                    ));
                } else {
                    seen.insert(*index, &field.reference);
                }
            }
        }
    }
}
