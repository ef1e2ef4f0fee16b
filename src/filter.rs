//! Evaluation of filter predicates against a single node.

use crate::netmap::Node;
use crate::policy::{FilterExpr, Op};

/// Evaluate `expr` against one node's attribute set.
///
/// `EQ` and `NE` are case-sensitive exact string comparisons. A node missing
/// the named attribute fails `EQ` and passes `NE` (null-as-mismatch), so
/// filters over attributes absent from the whole map simply match nothing
/// instead of erroring. `AND` short-circuits left-to-right.
pub fn matches(expr: &FilterExpr, node: &Node) -> bool {
    match expr {
        FilterExpr::And(left, right) => matches(left, node) && matches(right, node),
        FilterExpr::Cond { attr, op, value } => {
            let actual = node.attr(attr);
            match op {
                Op::Eq => actual == Some(value.as_str()),
                Op::Ne => actual != Some(value.as_str()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new("s01")
            .with_attr("Country", "Russia")
            .with_attr("Continent", "Europe")
    }

    fn cond(attr: &str, op: Op, value: &str) -> FilterExpr {
        FilterExpr::Cond {
            attr: attr.into(),
            op,
            value: value.into(),
        }
    }

    #[test]
    fn eq_matches_exact_value() {
        assert!(matches(&cond("Country", Op::Eq, "Russia"), &node()));
        assert!(!matches(&cond("Country", Op::Eq, "Sweden"), &node()));
        // case-sensitive
        assert!(!matches(&cond("Country", Op::Eq, "russia"), &node()));
    }

    #[test]
    fn ne_matches_different_value() {
        assert!(matches(&cond("Country", Op::Ne, "Sweden"), &node()));
        assert!(!matches(&cond("Country", Op::Ne, "Russia"), &node()));
    }

    #[test]
    fn absent_attribute_fails_eq_and_passes_ne() {
        assert!(!matches(&cond("Zone", Op::Eq, "A"), &node()));
        assert!(matches(&cond("Zone", Op::Ne, "A"), &node()));
    }

    #[test]
    fn and_requires_both_sides() {
        let both = FilterExpr::And(
            Box::new(cond("Country", Op::Eq, "Russia")),
            Box::new(cond("Continent", Op::Eq, "Europe")),
        );
        assert!(matches(&both, &node()));

        let one = FilterExpr::And(
            Box::new(cond("Country", Op::Eq, "Russia")),
            Box::new(cond("Continent", Op::Eq, "Asia")),
        );
        assert!(!matches(&one, &node()));
    }
}
