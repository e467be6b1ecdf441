//! Package/file scopes and the symbol table built over a parsed project.
//!
//! A [`PackageScope`] owns every [`Object`] declared in its package; a
//! [`FileScope`] is a thin, non-owning view onto one file's import table
//! plus a back-reference to its package. Objects never own their scope —
//! that back-reference runs the other way, through a plain index, to avoid
//! an ownership cycle between packages, files and objects.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ast::{self, TypeStmt};
use crate::diagnostic::{Diagnostic, DiagnosticBag};
use crate::reference::Reference;

/// A validated view of a `TypeStmt` living inside exactly one package.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub stmt: TypeStmt,
    /// The file that declared it, for error reporting.
    pub declaring_file: PathBuf,
}

impl Object {
    pub fn reference(&self) -> &Reference {
        &self.stmt.reference
    }
}

/// All files sharing one directory relative to the project root.
#[derive(Debug, Clone)]
pub struct PackageScope {
    /// Directory path relative to the manifest, `""` for the root package.
    pub path: String,
    objects: BTreeMap<String, Object>,
    /// Declaration order, kept alongside the name-keyed map above so
    /// iteration over a scope's objects is deterministic regardless of the
    /// map's own ordering.
    order: Vec<String>,
}

impl PackageScope {
    pub fn new(path: impl Into<String>) -> Self {
        PackageScope {
            path: path.into(),
            objects: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Builds a package scope out of every type declared across the files
    /// making up that package. Duplicate type names are reported as
    /// diagnostics on the second (and later) occurrence; files are assumed
    /// to have already been sorted into a stable order by the caller.
    pub fn build(path: impl Into<String>, files: &[(PathBuf, &ast::File)]) -> (PackageScope, DiagnosticBag) {
        let mut scope = PackageScope::new(path);
        let mut diagnostics = DiagnosticBag::new();

        for (file_path, file) in files {
            for ty in &file.types {
                if let Some(existing) = scope.objects.get(&ty.name) {
                    diagnostics.push(Diagnostic::error(
                        ty.reference.clone(),
                        "unique-type-name",
                        format!(
                            "type '{}' is already declared in this package at {}",
                            ty.name,
                            existing.reference()
                        ),
                    ));
                    continue;
                }
                scope.order.push(ty.name.clone());
                scope.objects.insert(
                    ty.name.clone(),
                    Object {
                        name: ty.name.clone(),
                        stmt: ty.clone(),
                        declaring_file: file_path.clone(),
                    },
                );
            }
        }

        (scope, diagnostics)
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    /// Objects in declaration order (stable across builds, independent of
    /// the underlying map's iteration order).
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.order.iter().map(move |name| &self.objects[name])
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One file's import table: the set of package paths it can resolve
/// identifiers against, keyed by the alias or bare package-path segment
/// used to reach them.
#[derive(Debug, Clone)]
pub struct ImportedPackage {
    pub package_path: String,
    pub alias: Option<String>,
}

/// A single file's view of the world: its own package plus every package it
/// imports. Does not own the `PackageScope`s it refers to — callers keep
/// those alive in a project-wide table and look them up by path.
#[derive(Debug, Clone)]
pub struct FileScope {
    pub file_path: PathBuf,
    pub package_path: String,
    /// Imports keyed by the name used to reach them: an explicit alias, or
    /// (for bare imports) the imported package's own path. Bare imports
    /// additionally populate `unqualified`.
    aliased: BTreeMap<String, ImportedPackage>,
    /// Bare (unaliased) imports, searched when an identifier is used
    /// without a package qualifier and is not found in the local package.
    unqualified: Vec<ImportedPackage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    UnknownAlias,
    NotFound,
    Ambiguous,
}

impl FileScope {
    pub fn new(file_path: impl Into<PathBuf>, package_path: impl Into<String>) -> Self {
        FileScope {
            file_path: file_path.into(),
            package_path: package_path.into(),
            aliased: BTreeMap::new(),
            unqualified: Vec::new(),
        }
    }

    pub fn bind_aliased(&mut self, key: impl Into<String>, imported: ImportedPackage) {
        self.aliased.insert(key.into(), imported);
    }

    pub fn bind_unqualified(&mut self, imported: ImportedPackage) {
        self.unqualified.push(imported);
    }

    /// Resolves `(alias?, typeName)` to the package path that owns it:
    /// an explicit alias restricts the search to the single
    /// import bound to it; no alias searches the local package first, then
    /// every bare import, erroring on ambiguity between two or more bare
    /// imports that both declare the name.
    pub fn resolve_package<'s>(
        &self,
        alias: Option<&str>,
        local: &'s PackageScope,
        packages: &'s BTreeMap<String, PackageScope>,
        type_name: &str,
    ) -> Result<&'s PackageScope, LookupError> {
        if let Some(alias) = alias {
            let imported = self.aliased.get(alias).ok_or(LookupError::UnknownAlias)?;
            return packages.get(&imported.package_path).ok_or(LookupError::UnknownAlias);
        }

        if local.get(type_name).is_some() {
            return Ok(local);
        }

        let mut found: Option<&PackageScope> = None;
        for candidate in &self.unqualified {
            let Some(scope) = packages.get(&candidate.package_path) else {
                continue;
            };
            if scope.get(type_name).is_some() {
                if found.is_some() {
                    return Err(LookupError::Ambiguous);
                }
                found = Some(scope);
            }
        }
        found.ok_or(LookupError::NotFound)
    }
}

/// Resolves every `import` in `file` against the project's known packages,
/// reporting the failure conditions: an unknown path, importing
/// one's own package, two imports resolving to the same package, or an
/// alias colliding with another alias or another import's implicit
/// last-segment name.
pub fn build_file_scope(
    file_path: impl Into<PathBuf>,
    package_path: impl Into<String>,
    file: &ast::File,
    known_packages: &BTreeMap<String, PackageScope>,
) -> (FileScope, DiagnosticBag) {
    let file_path = file_path.into();
    let package_path = package_path.into();
    let mut scope = FileScope::new(file_path, package_path.clone());
    let mut diagnostics = DiagnosticBag::new();

    let mut seen_packages: BTreeMap<String, Reference> = BTreeMap::new();
    let mut seen_keys: BTreeMap<String, Reference> = BTreeMap::new();

    for import in &file.imports {
        if known_packages.get(&import.path).is_none() {
            diagnostics.push(Diagnostic::error(
                import.reference.clone(),
                "unknown-import",
                format!("package '{}' does not exist in this project", import.path),
            ));
            continue;
        }

        if import.path == package_path {
            diagnostics.push(Diagnostic::error(
                import.reference.clone(),
                "self-import",
                format!("package '{}' cannot import itself", import.path),
            ));
            continue;
        }

        if let Some(prev) = seen_packages.get(&import.path) {
            diagnostics.push(Diagnostic::error(
                import.reference.clone(),
                "duplicate-import",
                format!("package '{}' is already imported at {prev}", import.path),
            ));
            continue;
        }

        let key = import
            .alias
            .clone()
            .unwrap_or_else(|| last_segment(&import.path).to_string());

        if let Some(prev) = seen_keys.get(&key) {
            diagnostics.push(Diagnostic::error(
                import.reference.clone(),
                "import-alias-collision",
                format!("'{key}' is already used by another import at {prev}"),
            ));
            continue;
        }

        seen_packages.insert(import.path.clone(), import.reference.clone());
        seen_keys.insert(key.clone(), import.reference.clone());

        let imported = ImportedPackage {
            package_path: import.path.clone(),
            alias: import.alias.clone(),
        };

        if import.alias.is_some() {
            scope.bind_aliased(key, imported);
        } else {
            scope.bind_aliased(key, imported.clone());
            scope.bind_unqualified(imported);
        }
    }

    (scope, diagnostics)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeKind;
    use crate::reference::{Position, Span};

    fn dummy_type(name: &str) -> ast::TypeStmt {
        ast::TypeStmt {
            reference: Reference::new(PathBuf::from("a.nex"), Span::at(Position::start())),
            kind: TypeKind::Struct,
            name: name.to_string(),
            base_type: None,
            fields: Vec::new(),
            documentation: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn file_with_types(names: &[&str]) -> ast::File {
        ast::File {
            name: "a.nex".into(),
            package: "".into(),
            imports: Vec::new(),
            types: names.iter().map(|n| dummy_type(n)).collect(),
        }
    }

    #[test]
    fn duplicate_type_name_is_an_error_on_second_occurrence() {
        let file_a = file_with_types(&["Foo"]);
        let file_b = file_with_types(&["Foo"]);
        let files = vec![
            (PathBuf::from("a.nex"), &file_a),
            (PathBuf::from("b.nex"), &file_b),
        ];
        let (scope, diagnostics) = PackageScope::build("", &files);
        assert_eq!(scope.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().rule_key, "unique-type-name");
    }

    #[test]
    fn objects_iterate_in_declaration_order() {
        let file = file_with_types(&["Zeta", "Alpha", "Mid"]);
        let files = vec![(PathBuf::from("a.nex"), &file)];
        let (scope, _) = PackageScope::build("", &files);
        let names: Vec<_> = scope.objects().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn unknown_import_path_is_an_error() {
        let file = ast::File {
            name: "a.nex".into(),
            package: "".into(),
            imports: vec![ast::ImportStmt {
                reference: Reference::new(PathBuf::from("a.nex"), Span::at(Position::start())),
                path: "nope".into(),
                alias: None,
            }],
            types: Vec::new(),
        };
        let known = BTreeMap::new();
        let (_scope, diagnostics) = build_file_scope("a.nex", "", &file, &known);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().rule_key, "unknown-import");
    }

    #[test]
    fn self_import_is_an_error() {
        let file = ast::File {
            name: "a.nex".into(),
            package: "pkg".into(),
            imports: vec![ast::ImportStmt {
                reference: Reference::new(PathBuf::from("a.nex"), Span::at(Position::start())),
                path: "pkg".into(),
                alias: None,
            }],
            types: Vec::new(),
        };
        let mut known = BTreeMap::new();
        known.insert("pkg".to_string(), PackageScope::new("pkg"));
        let (_scope, diagnostics) = build_file_scope("a.nex", "pkg", &file, &known);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().rule_key, "self-import");
    }

    #[test]
    fn alias_collision_between_two_imports_is_an_error() {
        let reference = || Reference::new(PathBuf::from("a.nex"), Span::at(Position::start()));
        let file = ast::File {
            name: "a.nex".into(),
            package: "".into(),
            imports: vec![
                ast::ImportStmt { reference: reference(), path: "foo".into(), alias: Some("x".into()) },
                ast::ImportStmt { reference: reference(), path: "bar".into(), alias: Some("x".into()) },
            ],
            types: Vec::new(),
        };
        let mut known = BTreeMap::new();
        known.insert("foo".to_string(), PackageScope::new("foo"));
        known.insert("bar".to_string(), PackageScope::new("bar"));
        let (_scope, diagnostics) = build_file_scope("a.nex", "", &file, &known);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().rule_key, "import-alias-collision");
    }
}
