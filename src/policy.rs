//! Structured model of a placement policy.
//!
//! A policy is an ordered list of replica groups, an optional container
//! backward factor, and the selectors and named filters the groups draw
//! nodes from. The `Display` implementation renders the canonical textual
//! form; rendering a parsed policy and parsing it back yields a structurally
//! equal value.

use std::fmt;

/// A parsed placement policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Replica groups in declaration order.
    pub replicas: Vec<ReplicaGroup>,
    /// Container backward factor; 1 when the policy does not set one.
    pub cbf: u32,
    /// Selectors in declaration order.
    pub selectors: Vec<Selector>,
    /// Named filters in declaration order.
    pub filters: Vec<NamedFilter>,
}

/// `REP <n> [IN <selector>]`: how many copies a group requires and which
/// selector supplies its nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaGroup {
    pub count: u32,
    pub selector: Option<String>,
}

/// `SELECT <k> FROM <source> [AS <name>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub count: u32,
    pub source: Source,
    pub name: Option<String>,
}

/// The candidate pool a selector draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `FROM *`: the full live node set.
    All,
    /// `FROM <name>`: a named filter or a previously bound subset.
    Named(String),
}

/// `FILTER <expr> AS <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFilter {
    pub name: String,
    pub expr: FilterExpr,
}

/// Boolean attribute predicate tree. `AND` nodes evaluate left-to-right with
/// short-circuiting; leaves compare one attribute against a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Cond {
        attr: String,
        op: Op,
        value: String,
    },
    And(Box<FilterExpr>, Box<FilterExpr>),
}

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
}

impl Policy {
    /// First filter bound to `name`, if any. Later duplicate definitions of
    /// the same alias are shadowed (first-definition-wins).
    pub fn filter(&self, name: &str) -> Option<&NamedFilter> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// First selector bound to `name`, if any.
    pub fn selector(&self, name: &str) -> Option<&Selector> {
        self.selectors
            .iter()
            .find(|s| s.name.as_deref() == Some(name))
    }
}

const KEYWORDS: &[&str] = &[
    "REP", "IN", "CBF", "SELECT", "FROM", "AS", "FILTER", "AND", "EQ", "NE",
];

/// Whether a token renders without quotes: non-empty, identifier characters
/// only, and not a policy keyword.
pub(crate) fn is_ident_shaped(s: &str) -> bool {
    !s.is_empty()
        && !KEYWORDS.contains(&s)
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
}

fn write_token(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if is_ident_shaped(s) {
        f.write_str(s)
    } else {
        write!(f, "'{}'", s.replace('\'', "''"))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Eq => "EQ",
            Op::Ne => "NE",
        })
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Cond { attr, op, value } => {
                write_token(f, attr)?;
                write!(f, " {op} ")?;
                write_token(f, value)
            }
            FilterExpr::And(left, right) => write!(f, "{left} AND {right}"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::All => f.write_str("*"),
            Source::Named(name) => write_token(f, name),
        }
    }
}

impl fmt::Display for Policy {
    /// Canonical clause order: `REP`s, `CBF`, `SELECT`s, `FILTER`s.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for rep in &self.replicas {
            write!(f, "{sep}REP {}", rep.count)?;
            if let Some(name) = &rep.selector {
                f.write_str(" IN ")?;
                write_token(f, name)?;
            }
            sep = " ";
        }
        write!(f, " CBF {}", self.cbf)?;
        for sel in &self.selectors {
            write!(f, " SELECT {} FROM {}", sel.count, sel.source)?;
            if let Some(name) = &sel.name {
                f.write_str(" AS ")?;
                write_token(f, name)?;
            }
        }
        for flt in &self.filters {
            write!(f, " FILTER {} AS ", flt.expr)?;
            write_token(f, &flt.name)?;
        }
        Ok(())
    }
}
