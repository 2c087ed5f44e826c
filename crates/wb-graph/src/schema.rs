//! On-disk board file format.
//!
//! ```json
//! {
//!   "nodes": { "<node-id>": { "name": "...", "type": "<component-id>", "pos": ["0m", "0m"],
//!                             "conns": [ { "port": "a", "edge": "<edge-id>", "side": 0 } ] } },
//!   "edges": { "<edge-id>": { "conns": [ { "connector": "<id>", "node": "<node-id>", "port": "a" },
//!                                        { "connector": "<id>", "pos": ["1m", "0m"] } ],
//!                             "pts": [ ["0.5m", "0.2m"] ] } }
//! }
//! ```
//!
//! Maps are ordered by id so a saved file is stable for a given graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wb_core::Point;

use crate::edge::Side;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeDef>,
    #[serde(default)]
    pub edges: BTreeMap<String, EdgeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub pos: Point,
    #[serde(default)]
    pub conns: Vec<NodeConnDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConnDef {
    pub port: String,
    pub edge: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    pub conns: Vec<ConnDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pts: Vec<Point>,
}

/// One wire end. Either `node` and `port` are set (attached) or `pos` is
/// (floating).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnDef {
    pub connector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Point>,
}

impl ConnDef {
    pub fn attached(connector: impl Into<String>, node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
            node: Some(node.into()),
            port: Some(port.into()),
            pos: None,
        }
    }

    pub fn floating(connector: impl Into<String>, pos: Point) -> Self {
        Self {
            connector: connector.into(),
            node: None,
            port: None,
            pos: Some(pos),
        }
    }
}
