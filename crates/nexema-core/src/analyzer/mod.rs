//! The semantic analyzer: a fixed-order pipeline of small, independent
//! rules run over every file's local scope.
//!
//! Each [`Rule`] is handed a read-only [`LocalScope`] (the file being
//! analyzed, its package, and the project's full package table) and a
//! mutable [`DiagnosticBag`] to append findings to. Splitting those into two
//! parameters rather than bundling them into one mutable context — the
//! shape the original rule-engine sketch used — sidesteps the borrow
//! checker entirely: a rule can hold `scope` borrowed for its whole body
//! while still calling `diagnostics.push(..)` at will, since the two live
//! behind unrelated references.

pub mod rules;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::ast;
use crate::diagnostic::{Diagnostic, DiagnosticBag, Severity};
use crate::primitive::{parse_primitive, Primitive};
use crate::project::Project;
use crate::scope::{FileScope, LookupError, Object, PackageScope};

/// Everything a rule can see while analyzing one file: the file itself,
/// the package that owns it, its resolved import table, and every other
/// package in the project (for cross-package type references).
pub struct LocalScope<'a> {
    pub file: &'a ast::File,
    pub file_scope: &'a FileScope,
    pub package: &'a PackageScope,
    pub packages: &'a BTreeMap<String, PackageScope>,
}

impl<'a> LocalScope<'a> {
    pub fn types(&self) -> &'a [ast::TypeStmt] {
        &self.file.types
    }

    /// Resolves a value-type identifier to either a built-in primitive or
    /// a declared object, following the same alias rules as imports:
    /// `pkg.Type` restricts the search to the import bound to
    /// `pkg`; a bare `Type` checks the local package, then every
    /// unqualified import.
    pub fn resolve(&self, ident: &ast::IdentifierStmt) -> Result<TypeRef<'a>, LookupError> {
        if let Some(prim) = parse_primitive(&ident.lit) {
            return Ok(TypeRef::Primitive(prim));
        }

        let (alias, name) = ident.split_package();
        let package = self
            .file_scope
            .resolve_package(alias, self.package, self.packages, name)?;
        let object = package.get(name).ok_or(LookupError::NotFound)?;
        Ok(TypeRef::Object {
            package_path: package.path.clone(),
            object,
        })
    }
}

/// What a value-type identifier resolved to.
pub enum TypeRef<'a> {
    Primitive(Primitive),
    Object { package_path: String, object: &'a Object },
}

impl<'a> TypeRef<'a> {
    pub fn is_enum(&self) -> bool {
        matches!(self, TypeRef::Object { object, .. } if object.stmt.kind == ast::TypeKind::Enum)
    }
}

/// A single named, independently-checkable semantic constraint.
///
/// `UniqueTypeName` has no implementation here — it is enforced the
/// moment a [`PackageScope`] is built, since two objects can never share a
/// key in that scope's map in the first place. Every other named rule is a
/// `Rule` run by [`run_all`].
pub trait Rule {
    fn key(&self) -> &'static str;

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn analyze(&self, scope: &LocalScope, diagnostics: &mut DiagnosticBag);

    fn diagnostic(&self, reference: crate::reference::Reference, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(reference, self.key(), self.severity(), message.into())
    }
}

/// The fixed, deterministic rule order: name/structure uniqueness first,
/// then type resolution, then value-level checks that assume types already
/// resolve.
pub fn standard_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(rules::unique_field_name::UniqueFieldName),
        Box::new(rules::unique_field_index::UniqueFieldIndex),
        Box::new(rules::enum_fields_well_formed::EnumFieldsWellFormed),
        Box::new(rules::valid_field_type::ValidFieldType),
        Box::new(rules::valid_list_arguments::ValidListArguments),
        Box::new(rules::valid_map_arguments::ValidMapArguments),
        Box::new(rules::valid_base_type::ValidBaseType),
        Box::new(rules::nullable_meaningful::NullableMeaningful),
        Box::new(rules::default_value_valid_field::DefaultValueValidField),
        Box::new(rules::unique_default_value::UniqueDefaultValue),
        Box::new(rules::default_value_type_matches::DefaultValueTypeMatches),
    ]
}

/// Runs every rule, in fixed order, over every file in the project.
/// `project.file_scopes` is already in stable package-then-path order, so
/// the resulting bag is reproducible even before [`DiagnosticBag::sorted`]
/// is applied.
pub fn analyze(project: &Project) -> DiagnosticBag {
    let rules = standard_rules();
    let mut diagnostics = DiagnosticBag::new();
    debug!(files = project.file_scopes.len(), rules = rules.len(), "running analyzer");

    for file_scope in &project.file_scopes {
        let Some(file) = project.files.get(&file_scope.file_path) else {
            continue;
        };
        let Some(package) = project.packages.get(&file_scope.package_path) else {
            continue;
        };
        let scope = LocalScope {
            file,
            file_scope,
            package,
            packages: &project.packages,
        };
        for rule in &rules {
            trace!(file = %file_scope.file_path.display(), rule = rule.key(), "running rule");
            let before = diagnostics.len();
            rule.analyze(&scope, &mut diagnostics);
            if diagnostics.len() > before {
                debug!(
                    file = %file_scope.file_path.display(),
                    rule = rule.key(),
                    new_diagnostics = diagnostics.len() - before,
                    "rule reported diagnostics"
                );
            }
        }
    }

    debug!(diagnostics = diagnostics.len(), "analyzer finished");
    diagnostics
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn clean_project_produces_no_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "shapes.nex",
            "struct Point {\n  x float64 = 0\n  y float64 = 1\n}\n",
        );
        let (project, load_diagnostics) = crate::project::load(dir.path(), &[]).unwrap();
        assert!(load_diagnostics.is_empty());
        let diagnostics = analyze(&project);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics.iter().collect::<Vec<_>>());
    }

    #[test]
    fn unresolvable_field_type_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shapes.nex", "struct Point {\n  x DoesNotExist\n}\n");
        let (project, _) = crate::project::load(dir.path(), &[]).unwrap();
        let diagnostics = analyze(&project);
        assert!(diagnostics.iter().any(|d| d.rule_key == "valid-field-type"));
    }

    /// A single run must surface every independent error it finds, not just
    /// the first one it trips over: no rule's failure short-circuits another
    /// rule, another file, or another package.
    #[test]
    fn independent_errors_across_files_are_all_reported_in_one_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shapes.nex", "struct Point {\n  x DoesNotExist\n}\n");
        write(
            dir.path(),
            "other/dup.nex",
            "struct Dup {\n  a string\n  a string\n}\n",
        );
        let (project, load_diagnostics) = crate::project::load(dir.path(), &[]).unwrap();
        assert!(load_diagnostics.is_empty());

        let diagnostics = analyze(&project);
        let found: Vec<&str> = diagnostics.iter().map(|d| d.rule_key.as_str()).collect();
        assert_eq!(diagnostics.len(), 2, "expected exactly 2 diagnostics, got {found:?}");
        assert!(found.contains(&"valid-field-type"));
        assert!(found.contains(&"unique-field-name"));
    }

    /// Re-running the analyzer over the same project must produce
    /// byte-identical diagnostics: no hidden mutable state, no ordering that
    /// depends on when a rule happens to run.
    #[test]
    fn rerunning_analyze_on_the_same_project_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shapes.nex", "struct Point {\n  x DoesNotExist\n}\n");
        write(
            dir.path(),
            "other/dup.nex",
            "struct Dup {\n  a string\n  a string\n}\n",
        );
        let (project, _) = crate::project::load(dir.path(), &[]).unwrap();

        let first = analyze(&project).into_sorted_vec();
        let second = analyze(&project).into_sorted_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
