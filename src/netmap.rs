//! Cluster topology snapshot and per-node attribute catalog.
//!
//! A [`Netmap`] is the immutable-during-evaluation view of the cluster that
//! placement planning runs against. It is built once from topology
//! configuration (or ingested from a serialized network-map snapshot) and is
//! only ever mutated through node status transitions; nodes are never removed,
//! only marked unavailable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Liveness of a storage node as reported by the network map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Node is in the current network map and accepts placement.
    #[serde(rename = "ONLINE")]
    Online,
    /// Node announced it is leaving; dropped from the map on the next epoch.
    #[serde(rename = "STATUS_UNDEFINED")]
    StatusUndefined,
    /// Node is out of the network map.
    #[serde(rename = "OFFLINE")]
    Offline,
}

/// A single storage node: identifier, static attributes and liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    id: String,
    attrs: BTreeMap<String, String>,
    status: NodeStatus,
    capacity: u64,
}

impl Node {
    /// Create an online node with no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: BTreeMap::new(),
            status: NodeStatus::Online,
            capacity: 0,
        }
    }

    /// Attach an attribute, consuming and returning the node for chaining.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the initial liveness status.
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the advertised capacity hint.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// The node identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Current liveness status.
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Advertised capacity hint.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Whether the node participates in placement.
    pub fn is_online(&self) -> bool {
        self.status == NodeStatus::Online
    }
}

/// On-wire record for one node in a serialized netmap snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    status: NodeStatus,
    #[serde(default)]
    capacity: u64,
}

/// The cluster network map: every known node keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netmap {
    nodes: BTreeMap<String, Node>,
}

impl Netmap {
    /// Create an empty network map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the map, replacing any previous entry with the same id.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Ingest a JSON snapshot of the form
    /// `{"<node-id>": {"attributes": {...}, "status": "ONLINE", "capacity": 0}}`.
    pub fn from_snapshot_json(raw: &str) -> Result<Self, serde_json::Error> {
        let records: BTreeMap<String, NodeRecord> = serde_json::from_str(raw)?;
        let mut map = Self::new();
        for (id, rec) in records {
            map.add_node(Node {
                id,
                attrs: rec.attributes,
                status: rec.status,
                capacity: rec.capacity,
            });
        }
        Ok(map)
    }

    /// Look up a node by identifier.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Transition a node's liveness status. Returns `false` when the node is
    /// not in the map.
    pub fn set_status(&mut self, id: &str, status: NodeStatus) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    /// Iterate over all known nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate over the live node set, i.e. nodes with `ONLINE` status.
    pub fn online(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_online())
    }

    /// Identifiers visible in the current snapshot. Nodes that announced a
    /// status transition away from `ONLINE` no longer appear here.
    pub fn snapshot(&self) -> Vec<&str> {
        self.online().map(Node::id).collect()
    }

    /// Total number of known nodes, regardless of status.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the map holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
