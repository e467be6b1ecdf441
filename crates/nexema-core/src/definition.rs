//! Flattens a resolved [`Project`] into the self-contained shape a generator
//! consumes: every identifier replaced by a fully-qualified reference, so
//! nothing downstream needs scope lookups or import tables of its own.
//!
//! Lowering assumes the project already analyzed clean — it is only ever
//! invoked once the diagnostic bag is empty, so every `scope.resolve`
//! call below is expected to succeed; a failure falls back to the bare
//! literal rather than panicking, since a malformed snapshot is preferable
//! to crashing a builder that otherwise did everything right.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analyzer::rules::common::default_annotations;
use crate::analyzer::{LocalScope, TypeRef};
use crate::ast::{self, assign_field_indices};
use crate::project::Project;
use crate::scope::{FileScope, Object};

/// A value-type tree with every identifier resolved to a fully-qualified
/// name (`package/path/TypeName`, or a bare primitive name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedType {
    pub name: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ResolvedType>,
}

/// A default value with every enum member reference resolved the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ResolvedValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// `package/path/Enum.Member`.
    EnumMember(String),
    List(Vec<ResolvedValue>),
    Map(Vec<(ResolvedValue, ResolvedValue)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ResolvedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub final_index: i64,
    pub name: String,
    /// Absent only for enum value members, which carry no type.
    pub resolved_type: Option<ResolvedType>,
    pub default_value: Option<ResolvedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<AnnotationDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    pub fully_qualified_name: String,
    pub modifier: &'static str,
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<String>,
    /// The type's own annotations, carried through unexamined the same way
    /// a field's annotations are — including `@default` ones, whose meaning
    /// is already captured on the relevant field's `default_value`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<AnnotationDefinition>,
    pub fields: Vec<FieldDefinition>,
}

/// The serialized project: every type definition plus enough metadata for a
/// generator to name its output without re-deriving it from the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub project_name: String,
    pub project_version: u32,
    pub types: Vec<TypeDefinition>,
}

/// Lowers every object in the project to a [`TypeDefinition`], ordered by
/// `(package_path, type_name)` regardless of package enumeration or
/// declaration order, so two runs over the same input produce byte-identical
/// output.
pub fn lower(project: &Project) -> Vec<TypeDefinition> {
    let file_scopes_by_path: BTreeMap<&PathBuf, &FileScope> =
        project.file_scopes.iter().map(|fs| (&fs.file_path, fs)).collect();

    let mut ordered: Vec<(&str, &str, TypeDefinition)> = Vec::new();

    for (package_path, package) in &project.packages {
        for object in package.objects() {
            let Some(file) = project.files.get(&object.declaring_file) else {
                continue;
            };
            let Some(file_scope) = file_scopes_by_path.get(&object.declaring_file) else {
                continue;
            };
            let scope = LocalScope {
                file,
                file_scope: *file_scope,
                package,
                packages: &project.packages,
            };
            ordered.push((package_path.as_str(), object.name.as_str(), lower_object(&scope, object)));
        }
    }

    ordered.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    ordered.into_iter().map(|(_, _, def)| def).collect()
}

fn lower_object(scope: &LocalScope, object: &Object) -> TypeDefinition {
    let ty = &object.stmt;
    let final_indices = assign_field_indices(&ty.fields);

    let fields = ty
        .fields
        .iter()
        .zip(final_indices)
        .map(|(field, final_index)| lower_field(scope, ty, field, final_index))
        .collect();

    let metadata = ty
        .annotations
        .iter()
        .map(|annotation| AnnotationDefinition {
            name: annotation.name.clone(),
            arguments: annotation.arguments.iter().map(|arg| resolve_annotation_arg(scope, arg)).collect(),
        })
        .collect();

    TypeDefinition {
        fully_qualified_name: fully_qualified_name(&scope.package.path, &ty.name),
        modifier: ty.kind.as_str(),
        base: resolve_base(scope, &ty.base_type),
        documentation: ty.documentation.clone(),
        metadata,
        fields,
    }
}

fn lower_field(scope: &LocalScope, ty: &ast::TypeStmt, field: &ast::FieldStmt, final_index: i64) -> FieldDefinition {
    let resolved_type = field.value_type.as_ref().map(|vt| resolve_value_type(scope, vt));

    let default_value = field
        .default_value
        .as_ref()
        .map(|v| (field.value_type.as_ref(), v))
        .or_else(|| {
            default_annotations(ty)
                .find(|(_, name, _)| *name == field.name)
                .map(|(_, _, value)| (field.value_type.as_ref(), value))
        })
        .map(|(expected, value)| resolve_value(scope, expected, value));

    let metadata = field
        .annotations
        .iter()
        .map(|annotation| AnnotationDefinition {
            name: annotation.name.clone(),
            arguments: annotation.arguments.iter().map(|arg| resolve_annotation_arg(scope, arg)).collect(),
        })
        .collect();

    FieldDefinition {
        final_index,
        name: field.name.clone(),
        resolved_type,
        default_value,
        metadata,
    }
}

fn resolve_value_type(scope: &LocalScope, vt: &ast::ValueTypeStmt) -> ResolvedType {
    let name = match scope.resolve(&vt.ident) {
        Ok(TypeRef::Primitive(primitive)) => primitive.as_str().to_string(),
        Ok(TypeRef::Object { package_path, object }) => fully_qualified_name(&package_path, &object.name),
        Err(_) => vt.ident.lit.clone(),
    };
    ResolvedType {
        name,
        nullable: vt.nullable,
        arguments: vt.arguments.iter().map(|arg| resolve_value_type(scope, arg)).collect(),
    }
}

fn resolve_base(scope: &LocalScope, base: &Option<ast::IdentifierStmt>) -> Option<String> {
    let base = base.as_ref()?;
    match scope.resolve(base) {
        Ok(TypeRef::Object { package_path, object }) => Some(fully_qualified_name(&package_path, &object.name)),
        _ => Some(base.lit.clone()),
    }
}

fn resolve_value(scope: &LocalScope, expected: Option<&ast::ValueTypeStmt>, value: &ast::ValueStmt) -> ResolvedValue {
    match value {
        ast::ValueStmt::Primitive(literal) => resolve_primitive(&literal.value),
        ast::ValueStmt::List(list) => {
            let element = expected.and_then(|vt| vt.arguments.first());
            ResolvedValue::List(list.values.iter().map(|v| resolve_value(scope, element, v)).collect())
        }
        ast::ValueStmt::Map(map) => {
            let key_type = expected.and_then(|vt| vt.arguments.first());
            let value_type = expected.and_then(|vt| vt.arguments.get(1));
            ResolvedValue::Map(
                map.entries
                    .iter()
                    .map(|entry| (resolve_value(scope, key_type, &entry.key), resolve_value(scope, value_type, &entry.value)))
                    .collect(),
            )
        }
        ast::ValueStmt::Type(type_value) => {
            let member = type_value.ident.split_package().1;
            let enum_name = expected
                .and_then(|vt| match scope.resolve(&vt.ident) {
                    Ok(TypeRef::Object { package_path, object }) => Some(fully_qualified_name(&package_path, &object.name)),
                    _ => None,
                })
                .unwrap_or_else(|| type_value.ident.split_package().0.unwrap_or_default().to_string());
            ResolvedValue::EnumMember(format!("{enum_name}.{member}"))
        }
    }
}

fn resolve_annotation_arg(scope: &LocalScope, arg: &ast::AnnotationArg) -> ResolvedValue {
    match arg {
        ast::AnnotationArg::Ident(ident) => ResolvedValue::String(ident.lit.clone()),
        ast::AnnotationArg::Value(value) => resolve_value(scope, None, value),
    }
}

fn resolve_primitive(literal: &ast::PrimitiveLit) -> ResolvedValue {
    match literal {
        ast::PrimitiveLit::String(s) => ResolvedValue::String(s.clone()),
        ast::PrimitiveLit::Int(i) => ResolvedValue::Int(*i),
        ast::PrimitiveLit::Float(f) => ResolvedValue::Float(*f),
        ast::PrimitiveLit::Bool(b) => ResolvedValue::Bool(*b),
        ast::PrimitiveLit::Null => ResolvedValue::Null,
    }
}

fn fully_qualified_name(package_path: &str, name: &str) -> String {
    if package_path.is_empty() {
        name.to_string()
    } else {
        format!("{package_path}/{name}")
    }
}
