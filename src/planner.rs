//! Placement planning: resolving a parsed policy against a netmap snapshot.
//!
//! Evaluation is a single synchronous pass over one immutable snapshot.
//! Replica groups are processed in declaration order; selector subsets bound
//! along the way are kept in an explicit alias environment so later groups
//! can reference them. The first unsatisfiable selector aborts the whole
//! evaluation; there is no partial placement and no retry.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::netmap::{Netmap, Node};
use crate::policy::{FilterExpr, Policy, ReplicaGroup, Selector, Source};
use crate::select::{self, BackupFactor, DiversityConstraint, InsufficientNodesError};

/// Errors raised while planning a placement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A selector could not be satisfied from its candidate pool.
    #[error(transparent)]
    InsufficientNodes(#[from] InsufficientNodesError),
    /// A `FROM` or `IN` clause references an alias the policy never binds.
    #[error("unknown alias {0:?} in placement policy")]
    UnknownAlias(String),
}

/// Final node assignment: one identifier list per replica group, in the
/// policy's declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementResult {
    groups: Vec<Vec<String>>,
}

impl PlacementResult {
    /// Per-group node identifier lists.
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Number of copies assigned to group `idx`, zero when out of range.
    pub fn copies(&self, idx: usize) -> usize {
        self.groups.get(idx).map_or(0, Vec::len)
    }

    /// All distinct node identifiers the placement touches.
    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.groups
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// Placement planner with a configurable CBF diversity strategy.
pub struct Planner {
    diversity: Box<dyn DiversityConstraint + Send + Sync>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Planner with the default [`BackupFactor`] CBF rule.
    pub fn new() -> Self {
        Self {
            diversity: Box::new(BackupFactor),
        }
    }

    /// Planner with an explicit diversity strategy.
    pub fn with_diversity(diversity: Box<dyn DiversityConstraint + Send + Sync>) -> Self {
        Self { diversity }
    }

    /// Evaluate `policy` against the live nodes of `netmap`.
    pub fn plan(&self, policy: &Policy, netmap: &Netmap) -> Result<PlacementResult, PlanError> {
        let live: Vec<&Node> = netmap.online().collect();
        // selector alias -> node ids already chosen for it
        let mut env: HashMap<String, Vec<String>> = HashMap::new();
        // nodes holding a replica for an earlier group
        let mut used: HashSet<String> = HashSet::new();
        let mut groups: Vec<Vec<String>> = Vec::with_capacity(policy.replicas.len());

        for (idx, rep) in policy.replicas.iter().enumerate() {
            let fallback;
            let selector = match self.resolve_selector(policy, rep, idx)? {
                Some(sel) => sel,
                None => {
                    fallback = Selector {
                        count: rep.count,
                        source: Source::All,
                        name: None,
                    };
                    &fallback
                }
            };

            // a selector alias consumed by several groups yields the same set
            if let Some(ids) = selector.name.as_ref().and_then(|n| env.get(n)) {
                let assigned = Self::assign(rep, ids.clone(), selector)?;
                groups.push(assigned);
                continue;
            }

            let context = selector.source.to_string();
            let (pool, filter_expr) = self.resolve_pool(policy, selector, &live, &env, &used)?;
            let chosen = select::select(
                pool,
                filter_expr,
                selector.count as usize,
                policy.cbf,
                self.diversity.as_ref(),
                &context,
            )?;
            let ids: Vec<String> = chosen.iter().map(|n| n.id().to_string()).collect();
            if let Some(name) = &selector.name {
                env.insert(name.clone(), ids.clone());
            }
            let assigned = Self::assign(rep, ids, selector)?;
            tracing::debug!(group = idx, nodes = ?assigned, "replica group placed");
            used.extend(assigned.iter().cloned());
            groups.push(assigned);
        }

        Ok(PlacementResult { groups })
    }

    /// Selector for a replica group: its `IN` alias when present, else the
    /// same-index selector, else `None` (caller synthesizes `FROM *`).
    fn resolve_selector<'p>(
        &self,
        policy: &'p Policy,
        rep: &ReplicaGroup,
        idx: usize,
    ) -> Result<Option<&'p Selector>, PlanError> {
        match &rep.selector {
            Some(name) => policy
                .selector(name)
                .map(Some)
                .ok_or_else(|| PlanError::UnknownAlias(name.clone())),
            None => Ok(policy.selectors.get(idx)),
        }
    }

    /// Candidate pool for a selector: the live set for `FROM *`, a named
    /// filter applied to the live set, or a previously bound subset. Nodes
    /// already holding replicas for earlier groups are excluded.
    fn resolve_pool<'a>(
        &self,
        policy: &'a Policy,
        selector: &Selector,
        live: &[&'a Node],
        env: &HashMap<String, Vec<String>>,
        used: &HashSet<String>,
    ) -> Result<(Vec<&'a Node>, Option<&'a FilterExpr>), PlanError> {
        let free = |n: &&Node| !used.contains(n.id());
        match &selector.source {
            Source::All => Ok((live.iter().copied().filter(free).collect(), None)),
            Source::Named(name) => {
                if let Some(flt) = policy.filter(name) {
                    Ok((
                        live.iter().copied().filter(free).collect(),
                        Some(&flt.expr),
                    ))
                } else if let Some(ids) = env.get(name) {
                    let pool = live
                        .iter()
                        .copied()
                        .filter(|n| ids.iter().any(|id| id == n.id()))
                        .filter(free)
                        .collect();
                    Ok((pool, None))
                } else {
                    Err(PlanError::UnknownAlias(name.clone()))
                }
            }
        }
    }

    /// Take the group's replica count out of the selector's chosen set.
    fn assign(
        rep: &ReplicaGroup,
        ids: Vec<String>,
        selector: &Selector,
    ) -> Result<Vec<String>, PlanError> {
        let count = rep.count as usize;
        if ids.len() < count {
            return Err(InsufficientNodesError {
                required: count,
                available: ids.len(),
                context: selector.source.to_string(),
            }
            .into());
        }
        Ok(ids.into_iter().take(count).collect())
    }
}

/// Evaluate `policy` against `netmap` with the default planner.
pub fn plan(policy: &Policy, netmap: &Netmap) -> Result<PlacementResult, PlanError> {
    Planner::new().plan(policy, netmap)
}
