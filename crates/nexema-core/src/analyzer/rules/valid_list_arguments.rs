//! Every `list` node anywhere in a field's value type — top-level or nested
//! inside another `list`/`map` — must carry exactly one type argument, and
//! that argument must itself resolve.

use super::common::{check_type_resolves, walk_value_type};
use crate::analyzer::{LocalScope, Rule, TypeRef};
use crate::diagnostic::DiagnosticBag;
use crate::primitive::Primitive;

pub struct ValidListArguments;

impl Rule for ValidListArguments {
    fn key(&self) -> &'static str {
        "valid-list-arguments"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            for field in &ty.fields {
                let Some(value_type) = &field.value_type else {
                    continue;
                };
                walk_value_type(value_type, &mut |node| {
                    if !matches!(scope.resolve(&node.ident), Ok(TypeRef::Primitive(Primitive::List))) {
                        return;
                    }
                    if node.arguments.len() != 1 {
                        diagnostics.push(self.diagnostic(
                            node.reference.clone(),
                            format!("'list' expects exactly one type argument, given {}", node.arguments.len()),
                        ));
                        return;
                    }
                    check_type_resolves(scope, &node.arguments[0], self.key(), diagnostics);
                });
            }
        }
    }
}
