//! Deterministic node selection with a pluggable diversity constraint.

use crate::filter;
use crate::netmap::Node;
use crate::policy::FilterExpr;

/// Not enough qualifying nodes to satisfy a selector.
///
/// The message is the compatibility surface downstream consumers string-match
/// on; it always contains `not enough nodes to SELECT from`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not enough nodes to SELECT from {context}: required {required}, available {available}")]
pub struct InsufficientNodesError {
    pub required: usize,
    pub available: usize,
    /// Selector source the failure occurred in (`*` or an alias).
    pub context: String,
}

/// Strategy deciding how many qualifying candidates a group needs for a given
/// replica count and container backward factor. The exact backup-counting
/// semantics of CBF are deployment-specific, so the rule is pluggable.
pub trait DiversityConstraint {
    fn required(&self, count: usize, cbf: u32) -> usize;
}

/// Default CBF interpretation: up to `cbf - 1` of the chosen nodes may turn
/// out to be backup-equivalent, so the pool must cover `count + cbf - 1`
/// distinct candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupFactor;

impl DiversityConstraint for BackupFactor {
    fn required(&self, count: usize, cbf: u32) -> usize {
        count.saturating_add((cbf as usize).saturating_sub(1))
    }
}

/// Choose exactly `count` nodes out of `candidates`.
///
/// Candidates failing `filter_expr` are discarded (pass-through when `None`);
/// survivors are stable-sorted by identifier and the first `count` are taken,
/// so the outcome is fully deterministic for a given snapshot. Fails when the
/// pool cannot cover `count`, or cannot cover the diversity requirement
/// derived from `cbf`.
pub fn select<'a>(
    candidates: Vec<&'a Node>,
    filter_expr: Option<&FilterExpr>,
    count: usize,
    cbf: u32,
    constraint: &dyn DiversityConstraint,
    context: &str,
) -> Result<Vec<&'a Node>, InsufficientNodesError> {
    let mut survivors: Vec<&Node> = match filter_expr {
        Some(expr) => candidates
            .into_iter()
            .filter(|n| filter::matches(expr, n))
            .collect(),
        None => candidates,
    };
    survivors.sort_by(|a, b| a.id().cmp(b.id()));

    if survivors.len() < count {
        return Err(InsufficientNodesError {
            required: count,
            available: survivors.len(),
            context: context.to_string(),
        });
    }
    let need = constraint.required(count, cbf);
    if survivors.len() < need {
        return Err(InsufficientNodesError {
            required: need,
            available: survivors.len(),
            context: context.to_string(),
        });
    }

    survivors.truncate(count);
    tracing::debug!(
        context,
        count,
        cbf,
        chosen = ?survivors.iter().map(|n| n.id()).collect::<Vec<_>>(),
        "selector resolved"
    );
    Ok(survivors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        ["s04", "s02", "s01", "s03"]
            .iter()
            .map(|id| Node::new(*id))
            .collect()
    }

    #[test]
    fn picks_first_by_identifier_order() {
        let owned = nodes();
        let chosen = select(owned.iter().collect(), None, 2, 1, &BackupFactor, "*").unwrap();
        let ids: Vec<&str> = chosen.iter().map(|n| n.id()).collect();
        assert_eq!(ids, ["s01", "s02"]);
    }

    #[test]
    fn fails_when_pool_smaller_than_count() {
        let owned = nodes();
        let err = select(owned.iter().collect(), None, 6, 1, &BackupFactor, "*").unwrap_err();
        assert_eq!(err.required, 6);
        assert_eq!(err.available, 4);
        assert!(err.to_string().contains("not enough nodes to SELECT from"));
    }

    #[test]
    fn cbf_raises_the_required_pool_size() {
        let owned = nodes();
        // 4 candidates cover SELECT 4 CBF 1 but not SELECT 4 CBF 2
        assert!(select(owned.iter().collect(), None, 4, 1, &BackupFactor, "*").is_ok());
        let err = select(owned.iter().collect(), None, 4, 2, &BackupFactor, "*").unwrap_err();
        assert_eq!(err.required, 5);
        assert_eq!(err.available, 4);
    }
}
