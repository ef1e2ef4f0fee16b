//! Placement-policy evaluation and replica-count verification engine.
//!
//! Parses declarative placement policies
//! (`REP 2 IN X CBF 2 SELECT 2 FROM * AS X`, with `FILTER` attribute
//! predicates and nested location-based selection) and evaluates them against
//! a cluster netmap snapshot to produce a deterministic, reproducible node
//! assignment per replica group.
//!
//! The engine is a pure computation library: it owns no network or storage
//! surface, performs no I/O during evaluation, and never mutates the snapshot
//! it plans against, so concurrent evaluations over one snapshot need no
//! coordination. Retry, backoff and snapshot refresh belong to the caller.

pub mod filter;
pub mod netmap;
pub mod parser;
pub mod planner;
pub mod policy;
pub mod select;

pub use netmap::{Netmap, Node, NodeStatus};
pub use parser::{parse, ParseError};
pub use planner::{plan, PlacementResult, PlanError, Planner};
pub use policy::Policy;
pub use select::InsufficientNodesError;
