//! Pass 1: term collection.
//!
//! Harvests every term into a lookup table without expanding anything the
//! terms reference. The table feeds the pattern builder's expansion pass.

use ftl_lex::Token;
use ftl_util::{Error, FxHashMap, Result};

use crate::ast::Entry;

/// Collects all terms of a parsed file into a name table.
///
/// Cross-term references inside the collected terms are left untouched.
/// Duplicate term names are rejected here, before any expansion runs.
pub fn collect_terms(entries: &[Entry], tokens: &[Token]) -> Result<FxHashMap<String, Entry>> {
    let mut terms = FxHashMap::default();
    for entry in entries.iter().filter(|e| e.is_term) {
        if terms.contains_key(&entry.name) {
            return Err(Error::parser(
                format!("duplicate term -{}", entry.name),
                entry.range.resolve(tokens),
            ));
        }
        terms.insert(entry.name.clone(), entry.clone());
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_entries;
    use ftl_lex::tokenize;

    #[test]
    fn test_collects_terms_only() {
        let tokens = tokenize("-a = x\nmsg = y\n-b = z\n");
        let entries = parse_entries(&tokens).unwrap();
        let terms = collect_terms(&entries, &tokens).unwrap();
        assert_eq!(terms.len(), 2);
        assert!(terms.contains_key("a"));
        assert!(terms.contains_key("b"));
        assert!(!terms.contains_key("msg"));
    }

    #[test]
    fn test_cross_references_left_unexpanded() {
        let tokens = tokenize("-a = x\n-b = {-a}!\n");
        let entries = parse_entries(&tokens).unwrap();
        let terms = collect_terms(&entries, &tokens).unwrap();
        let b = &terms["b"];
        assert!(matches!(
            b.elements[0],
            crate::ast::PatternElement::Placeable(crate::ast::Expression::TermReference(_))
        ));
    }

    #[test]
    fn test_duplicate_term_rejected() {
        let tokens = tokenize("-a = x\n-a = y\n");
        let entries = parse_entries(&tokens).unwrap();
        assert!(matches!(
            collect_terms(&entries, &tokens),
            Err(Error::Parser { .. })
        ));
    }

    #[test]
    fn test_name_may_exist_as_message_and_term() {
        let tokens = tokenize("-a = x\na = y\n");
        let entries = parse_entries(&tokens).unwrap();
        let terms = collect_terms(&entries, &tokens).unwrap();
        assert_eq!(terms.len(), 1);
    }
}
