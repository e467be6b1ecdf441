//! Every `map` node anywhere in a field's value type must carry exactly two
//! type arguments: a key that resolves to a hashable built-in (`string`,
//! `bool`, or one of the integer primitives) and a value that resolves to
//! anything valid.

use super::common::{check_type_resolves, walk_value_type};
use crate::analyzer::{LocalScope, Rule, TypeRef};
use crate::diagnostic::DiagnosticBag;
use crate::primitive::Primitive;

pub struct ValidMapArguments;

impl Rule for ValidMapArguments {
    fn key(&self) -> &'static str {
        "valid-map-arguments"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            for field in &ty.fields {
                let Some(value_type) = &field.value_type else {
                    continue;
                };
                walk_value_type(value_type, &mut |node| {
                    if !matches!(scope.resolve(&node.ident), Ok(TypeRef::Primitive(Primitive::Map))) {
                        return;
                    }
                    if node.arguments.len() != 2 {
                        diagnostics.push(self.diagnostic(
                            node.reference.clone(),
                            format!("'map' expects exactly two type arguments, given {}", node.arguments.len()),
                        ));
                        return;
                    }
                    let key_arg = &node.arguments[0];
                    let value_arg = &node.arguments[1];
                    match scope.resolve(&key_arg.ident) {
                        Ok(TypeRef::Primitive(primitive)) if primitive.is_hashable() => {}
                        Ok(_) => diagnostics.push(self.diagnostic(
                            key_arg.reference.clone(),
                            format!(
                                "map key type '{}' is not hashable; use string, bool or an integer type",
                                key_arg.ident.lit
                            ),
                        )),
                        Err(_) => {
                            check_type_resolves(scope, key_arg, self.key(), diagnostics);
                        }
                    }
                    check_type_resolves(scope, value_arg, self.key(), diagnostics);
                });
            }
        }
    }
}
