//! Flags a repeated field name within one type declaration.

use std::collections::HashMap;

use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;

pub struct UniqueFieldName;

impl Rule for UniqueFieldName {
    fn key(&self) -> &'static str {
        "unique-field-name"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            let mut seen: HashMap<&str, &crate::reference::Reference> = HashMap::new();
            for field in &ty.fields {
                if let Some(prev) = seen.get(field.name.as_str()) {
                    diagnostics.push(self.diagnostic(
                        field.reference.clone(),
                        format!("field '{}' is already declared at {prev}", field.name),
                    ));
                } else {
                    seen.insert(field.name.as_str(), &field.reference);
                }
            }
        }
    }
}
