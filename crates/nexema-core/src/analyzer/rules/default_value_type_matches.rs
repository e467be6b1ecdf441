//! Checks that a field's effective default value — inline `= value` or an
//! out-of-line `@default(name, value)` annotation — is actually assignable
//! to the field's declared type: primitives must share a family (the
//! integer family accepts integer literals, the float family accepts float
//! literals, and so on), enum members must name a member of an enum-typed
//! field, and list/map literals are checked recursively against their
//! element types.

use super::common::default_annotations;
use crate::analyzer::{LocalScope, Rule, TypeRef};
use crate::ast;
use crate::diagnostic::DiagnosticBag;
use crate::primitive::Primitive;
use crate::reference::Reference;

pub struct DefaultValueTypeMatches;

impl Rule for DefaultValueTypeMatches {
    fn key(&self) -> &'static str {
        "default-value-type-matches"
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag) {
        for ty in scope.types() {
            for field in &ty.fields {
                let Some(value_type) = &field.value_type else {
                    continue;
                };

                let effective: Option<(Reference, &ast::ValueStmt)> = field
                    .default_value
                    .as_ref()
                    .map(|v| (field.reference.clone(), v))
                    .or_else(|| {
                        default_annotations(ty)
                            .find(|(_, name, _)| *name == field.name)
                            .map(|(annotation, _, value)| (annotation.reference.clone(), value))
                    });

                let Some((reference, value)) = effective else {
                    continue;
                };

                if !type_matches(scope, value_type, value) {
                    diagnostics.push(self.diagnostic(
                        reference,
                        format!("default value for field '{}' is not compatible with its declared type", field.name),
                    ));
                }
            }
        }
    }
}

fn type_matches(scope: &LocalScope, value_type: &ast::ValueTypeStmt, value: &ast::ValueStmt) -> bool {
    let Ok(type_ref) = scope.resolve(&value_type.ident) else {
        // Unresolved types are `ValidFieldType`'s concern; do not pile on.
        return true;
    };

    match (&type_ref, value) {
        (TypeRef::Primitive(Primitive::List), ast::ValueStmt::List(list)) => {
            let Some(element_type) = value_type.arguments.first() else {
                return true; // arity mismatch is `ValidListArguments`'s concern
            };
            list.values.iter().all(|v| type_matches(scope, element_type, v))
        }
        (TypeRef::Primitive(Primitive::List), _) => false,
        (TypeRef::Primitive(Primitive::Map), ast::ValueStmt::Map(map)) => {
            let (Some(key_type), Some(value_type)) = (value_type.arguments.first(), value_type.arguments.get(1)) else {
                return true; // arity mismatch is `ValidMapArguments`'s concern
            };
            map.entries
                .iter()
                .all(|entry| type_matches(scope, key_type, &entry.key) && type_matches(scope, value_type, &entry.value))
        }
        (TypeRef::Primitive(Primitive::Map), _) => false,
        (TypeRef::Primitive(primitive), ast::ValueStmt::Primitive(literal)) => primitive_matches(*primitive, &literal.value),
        (TypeRef::Primitive(_), _) => false,
        (TypeRef::Object { object, .. }, ast::ValueStmt::Type(type_value)) => {
            object.stmt.kind == ast::TypeKind::Enum
                && object
                    .stmt
                    .fields
                    .iter()
                    .any(|f| f.name == type_value.ident.split_package().1)
        }
        (TypeRef::Object { .. }, _) => false,
    }
}

fn primitive_matches(primitive: Primitive, literal: &ast::PrimitiveLit) -> bool {
    match literal {
        ast::PrimitiveLit::Null => true,
        ast::PrimitiveLit::String(_) => primitive == Primitive::String,
        ast::PrimitiveLit::Bool(_) => primitive == Primitive::Bool,
        ast::PrimitiveLit::Int(_) => matches!(
            primitive,
            Primitive::Varint
                | Primitive::Uvarint
                | Primitive::Int8
                | Primitive::Int16
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::Uint8
                | Primitive::Uint16
                | Primitive::Uint32
                | Primitive::Uint64
                | Primitive::Timestamp
                | Primitive::Duration
        ),
        ast::PrimitiveLit::Float(_) => matches!(primitive, Primitive::Float32 | Primitive::Float64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests_support::analyze_source;

    #[test]
    fn matching_inline_default_is_clean() {
        let diagnostics = analyze_source("struct Foo { a string = \"hi\" }");
        assert!(diagnostics.iter().all(|d| d.rule_key != "default-value-type-matches"));
    }

    #[test]
    fn string_default_on_int_field_is_reported() {
        let diagnostics = analyze_source("struct Foo { a int32 = \"hi\" }");
        let hits: Vec<_> = diagnostics.iter().filter(|d| d.rule_key == "default-value-type-matches").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn enum_member_default_matches_enum_field() {
        let diagnostics = analyze_source("struct Foo { a Color = Color.Red } enum Color { Red Green }");
        assert!(diagnostics.iter().all(|d| d.rule_key != "default-value-type-matches"));
    }

    #[test]
    fn unknown_enum_member_default_is_reported() {
        let diagnostics = analyze_source("struct Foo { a Color = Color.Purple } enum Color { Red Green }");
        assert!(diagnostics.iter().any(|d| d.rule_key == "default-value-type-matches"));
    }

    #[test]
    fn list_literal_default_checks_element_types() {
        let diagnostics = analyze_source("struct Foo { a list(int32) = [1, 2, 3] }");
        assert!(diagnostics.iter().all(|d| d.rule_key != "default-value-type-matches"));

        let diagnostics = analyze_source("struct Foo { a list(int32) = [1, \"two\"] }");
        assert!(diagnostics.iter().any(|d| d.rule_key == "default-value-type-matches"));
    }

    #[test]
    fn annotation_default_is_checked_too() {
        let diagnostics = analyze_source(r#"@default(a, 5) struct Foo { a string }"#);
        assert!(diagnostics.iter().any(|d| d.rule_key == "default-value-type-matches"));
    }
}
