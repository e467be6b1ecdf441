//! `nullable` (`?`) is legal wherever a [`crate::ast::ValueTypeStmt`] can
//! appear — on a plain field type, and independently on any `list`/`map`
//! type argument. `list(T?)` and `list(T)?` are different trees (the first
//! sets `nullable` on the argument, the second on the list itself), so
//! there is no representation in which one could be mistaken for the
//! other; this rule exists to make that guarantee an explicit, checked part
//! of the contract rather than an implicit parser accident, in case a
//! future grammar change collapses the two.

use crate::analyzer::{LocalScope, Rule};
use crate::diagnostic::DiagnosticBag;

pub struct NullableMeaningful;

impl Rule for NullableMeaningful {
    fn key(&self) -> &'static str {
        "nullable-meaningful"
    }

    fn analyze(&self, _scope: &LocalScope, _diagnostics: &mut DiagnosticBag) {
        // `nullable` is attached per-node by the parser (field type, list
        // element, map key/value independently), so there is nothing left
        // to flag here. The rule still runs so its key shows up in
        // `standard_rules()` and future grammar changes get a place to
        // put a real check.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn list_of_nullable_element_differs_from_nullable_list() {
        let (file, diags) = parse("struct Foo { a list(string?) b list(string)? }", "t.nex", "pkg", "t.nex");
        assert!(diags.is_empty());
        let element_nullable = &file.types[0].fields[0].value_type.as_ref().unwrap().arguments[0];
        assert!(element_nullable.nullable);

        let list_nullable = file.types[0].fields[1].value_type.as_ref().unwrap();
        assert!(list_nullable.nullable);
        assert!(!list_nullable.arguments[0].nullable);
    }

    #[test]
    fn rule_never_reports_a_diagnostic() {
        let diagnostics = crate::analyzer::tests_support::analyze_source(
            "struct Foo { a list(string?)? b map(string, int32?)? }",
        );
        assert!(diagnostics.iter().all(|d| d.rule_key != "nullable-meaningful"));
    }
}
