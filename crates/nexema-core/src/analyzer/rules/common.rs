//! Small helpers shared by more than one rule: walking a value type's
//! argument tree, resolving a value type's identifier and reporting a
//! uniform "not found" diagnostic, and reading `@default(name, value)`
//! annotations off a type declaration.

use crate::analyzer::LocalScope;
use crate::ast;
use crate::diagnostic::{Diagnostic, DiagnosticBag};

/// Resolves `vt.ident` against `scope`, pushing a diagnostic tagged
/// `rule_key` if it does not resolve. Returns whether it resolved, so
/// callers that only care about the yes/no can ignore the bool or chain on
/// it.
pub(super) fn check_type_resolves(
    scope: &LocalScope,
    vt: &ast::ValueTypeStmt,
    rule_key: &'static str,
    diagnostics: &mut DiagnosticBag,
) -> bool {
    match scope.resolve(&vt.ident) {
        Ok(_) => true,
        Err(_) => {
            diagnostics.push(Diagnostic::error(
                vt.reference.clone(),
                rule_key,
                format!("type '{}' not found", vt.ident.lit),
            ));
            false
        }
    }
}

/// Visits `vt`, then every type argument nested underneath it, depth first.
/// `list(map(string, list(T)))` visits the outer list, the map, the map's
/// two arguments, and finally `T` — so a rule that only cares about one
/// container kind (`list` or `map`) can find every occurrence of it
/// regardless of how deeply it is nested.
pub(super) fn walk_value_type<'a>(vt: &'a ast::ValueTypeStmt, visit: &mut impl FnMut(&'a ast::ValueTypeStmt)) {
    visit(vt);
    for arg in &vt.arguments {
        walk_value_type(arg, visit);
    }
}

/// Every well-formed `@default(fieldName, value)` annotation declared
/// directly on a type, in source order. Malformed shapes (wrong arity, a
/// non-identifier first argument) are silently skipped here — they are not
/// this rule's concern, and a generic "unknown annotation" pass is out of
/// scope (annotation names other than `default` are opaque metadata carried
/// through to the snapshot).
pub(crate) fn default_annotations(ty: &ast::TypeStmt) -> impl Iterator<Item = (&ast::Annotation, &str, &ast::ValueStmt)> {
    ty.annotations.iter().filter_map(|annotation| {
        if annotation.name != "default" || annotation.arguments.len() != 2 {
            return None;
        }
        let field_name = match &annotation.arguments[0] {
            ast::AnnotationArg::Ident(ident) => ident.lit.as_str(),
            ast::AnnotationArg::Value(_) => return None,
        };
        let value = match &annotation.arguments[1] {
            ast::AnnotationArg::Value(value) => value,
            ast::AnnotationArg::Ident(_) => return None,
        };
        Some((annotation, field_name, value))
    })
}
