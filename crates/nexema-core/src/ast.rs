//! The parse tree produced by the parser and consumed by scope resolution
//! and the analyzer.
//!
//! Shapes mirror the Go `Ast`/`File`/`TypeStmt`/`FieldStmt` family closely:
//! one [`File`] per source file, each holding its own comment, import and
//! type statements in source order.

use crate::reference::Reference;

/// A single parsed source file, plus the package it belongs to (the name of
/// its containing directory).
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub name: String,
    pub package: String,
    pub imports: Vec<ImportStmt>,
    pub types: Vec<TypeStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub reference: Reference,
    pub path: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Enum,
    Union,
    Base,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
            TypeKind::Base => "base",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeStmt {
    pub reference: Reference,
    pub kind: TypeKind,
    pub name: String,
    /// `base Foo extends Bar` — `Bar`, unresolved.
    pub base_type: Option<IdentifierStmt>,
    pub fields: Vec<FieldStmt>,
    /// Doc comment lines immediately preceding the declaration, in source
    /// order, comment markers already stripped.
    pub documentation: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldStmt {
    pub reference: Reference,
    pub name: String,
    /// Absent only for enum value fields, which carry no type.
    pub value_type: Option<ValueTypeStmt>,
    /// Explicit `= N` index; `None` means auto-assign.
    pub index: Option<i64>,
    pub default_value: Option<ValueStmt>,
    pub documentation: Vec<String>,
    pub annotations: Vec<Annotation>,
}

/// `@name(args...)`, attached to a type or a field. The only annotation the
/// analyzer gives meaning to is `@default(fieldName, value)` (an
/// out-of-line way to set a field's default, checked against the same
/// uniqueness and type-compatibility rules as an inline `= value`); other
/// annotation names are carried through to the snapshot unexamined.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub reference: Reference,
    pub name: String,
    pub arguments: Vec<AnnotationArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArg {
    Ident(IdentifierStmt),
    Value(ValueStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueTypeStmt {
    pub reference: Reference,
    pub ident: IdentifierStmt,
    pub nullable: bool,
    /// `list(T)` / `map(K, V)` type arguments, recursively typed.
    pub arguments: Vec<ValueTypeStmt>,
}

/// A possibly package-qualified reference to a name: `pkg.Type` parses to
/// `{lit: "pkg.Type"}`, split back into its package prefix and base name by
/// [`IdentifierStmt::split_package`] at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierStmt {
    pub reference: Reference,
    pub lit: String,
}

impl IdentifierStmt {
    /// Splits a qualified identifier like `pkg.Type` into its package
    /// prefix and base name. Returns `(None, "Type")` for unqualified
    /// identifiers.
    pub fn split_package(&self) -> (Option<&str>, &str) {
        match self.lit.rsplit_once('.') {
            Some((pkg, name)) => (Some(pkg), name),
            None => (None, self.lit.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueStmt {
    Primitive(PrimitiveValueStmt),
    Type(TypeValueStmt),
    Map(MapValueStmt),
    List(ListValueStmt),
}

impl ValueStmt {
    pub fn reference(&self) -> &Reference {
        match self {
            ValueStmt::Primitive(v) => &v.reference,
            ValueStmt::Type(v) => &v.reference,
            ValueStmt::Map(v) => &v.reference,
            ValueStmt::List(v) => &v.reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveLit {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveValueStmt {
    pub reference: Reference,
    pub value: PrimitiveLit,
}

/// An enum value reference used as a default, e.g. `= Color.Red`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeValueStmt {
    pub reference: Reference,
    pub ident: IdentifierStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntryStmt {
    pub key: ValueStmt,
    pub value: ValueStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapValueStmt {
    pub reference: Reference,
    pub entries: Vec<MapEntryStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListValueStmt {
    pub reference: Reference,
    pub values: Vec<ValueStmt>,
}

/// Assigns a final field index to every field in declaration order:
/// explicit indices are kept as-is; a missing index gets the smallest
/// non-negative integer not claimed by any explicit index anywhere in the
/// type, continuing upward once every gap below the highest explicit index
/// has been filled. Two fields can still end up with the same final index
/// if their explicit indices collide — detecting that is `UniqueFieldIndex`'s
/// job, not this function's.
pub fn assign_field_indices(fields: &[FieldStmt]) -> Vec<i64> {
    let explicit: std::collections::HashSet<i64> = fields.iter().filter_map(|f| f.index).collect();
    let mut claimed = explicit.clone();
    let mut next: i64 = 0;

    fields
        .iter()
        .map(|field| match field.index {
            Some(index) => index,
            None => {
                while claimed.contains(&next) {
                    next += 1;
                }
                claimed.insert(next);
                let assigned = next;
                next += 1;
                assigned
            }
        })
        .collect()
}
