//! A declared `base` reference must resolve to a declared type whose own
//! modifier is `base` — a `base` type contributes fields but is never
//! instantiated, so it cannot itself extend something not marked `base`,
//! nor can anything else extend a primitive. Only `struct` and `union`
//! types may declare a base at all; a `base` or `enum` type with an
//! `extends` clause is rejected regardless of what it names. Separately, a
//! `base` type may not declare a field of `union` type.

use crate::analyzer::{LocalScope, Rule, TypeRef};
use crate::ast::TypeKind;
use crate::diagnostic::DiagnosticBag;

pub struct ValidBaseType;

impl Rule for ValidBaseType {
    fn key(&self) -> &'static str {
        "valid-base-type"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            if let Some(base_ident) = &ty.base_type {
                if !matches!(ty.kind, TypeKind::Struct | TypeKind::Union) {
                    diagnostics.push(self.diagnostic(
                        ty.reference.clone(),
                        format!("'{}' types cannot declare a base", ty.kind.as_str()),
                    ));
                    continue;
                }

                match scope.resolve(base_ident) {
                    Ok(TypeRef::Object { object, .. }) if object.stmt.kind == TypeKind::Base => {}
                    Ok(TypeRef::Object { .. }) => diagnostics.push(self.diagnostic(
                        base_ident.reference.clone(),
                        format!("'{}' cannot be used as a base type because it is not declared as 'base'", base_ident.lit),
                    )),
                    Ok(TypeRef::Primitive(_)) => diagnostics.push(self.diagnostic(
                        base_ident.reference.clone(),
                        format!("'{}' is a primitive type and cannot be used as a base type", base_ident.lit),
                    )),
                    Err(_) => diagnostics.push(self.diagnostic(
                        base_ident.reference.clone(),
                        format!("base type '{}' not found", base_ident.lit),
                    )),
                }
            }

            if ty.kind == TypeKind::Base {
                for field in &ty.fields {
                    let Some(value_type) = &field.value_type else {
                        continue;
                    };
                    if let Ok(TypeRef::Object { object, .. }) = scope.resolve(&value_type.ident) {
                        if object.stmt.kind == TypeKind::Union {
                            diagnostics.push(self.diagnostic(
                                field.reference.clone(),
                                format!("base type fields cannot be of union type '{}'", value_type.ident.lit),
                            ));
                        }
                    }
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
    fn extending_a_non_base_type_is_reported() {
        let diagnostics = analyze_source("struct Child extends Parent {} enum Parent { A B }");
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "valid-base-type").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn extending_a_base_type_is_fine() {
        let diagnostics = analyze_source("struct Child extends Parent {} base Parent { a string }");
        assert!(diagnostics.iter().all(|d| d.rule_key != "valid-base-type"));
    }

    #[test]
    fn base_type_cannot_declare_a_union_field() {
        let diagnostics = analyze_source("base Foo { a Bar } union Bar { x string }");
        assert!(diagnostics.iter().any(|d| d.rule_key == "valid-base-type"));
    }

    #[test]
    fn enum_cannot_declare_a_base() {
        let diagnostics = analyze_source("enum Child extends Parent { A B } base Parent { a string }");
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "valid-base-type").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn base_type_cannot_declare_a_base() {
        let diagnostics = analyze_source("base Child extends Parent { a string } base Parent { b string }");
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "valid-base-type").collect();
        assert_eq!(hits.len(), 1);
    }
}
