//! Referential integrity checks.

use crate::edge::{Endpoint, Side};
use crate::error::{GraphError, GraphResult};
use crate::graph::BoardGraph;
use crate::node::EdgeConnection;

impl BoardGraph {
    /// Check that ids, nodes and edges agree with each other:
    /// - every id maps to a live slot carrying that id, and every live slot
    ///   has an id;
    /// - every occupied node port points at an edge end attached to it;
    /// - every attached edge end points at a live node whose port records
    ///   that end.
    pub fn validate(&self) -> GraphResult<()> {
        for (id, &handle) in &self.node_ids {
            match self.node(handle) {
                Some(node) if node.id() == id => {}
                Some(node) => {
                    return Err(integrity(format!(
                        "node id {id} maps to {handle:?}, which holds node {}",
                        node.id()
                    )));
                }
                None => return Err(integrity(format!("node id {id} maps to empty {handle:?}"))),
            }
        }
        for (id, &handle) in &self.edge_ids {
            match self.edge(handle) {
                Some(edge) if edge.id() == id => {}
                Some(edge) => {
                    return Err(integrity(format!(
                        "edge id {id} maps to {handle:?}, which holds edge {}",
                        edge.id()
                    )));
                }
                None => return Err(integrity(format!("edge id {id} maps to empty {handle:?}"))),
            }
        }
        let live_nodes = self.nodes.iter().flatten().count();
        let live_edges = self.edges.iter().flatten().count();
        if live_nodes != self.node_ids.len() || live_edges != self.edge_ids.len() {
            return Err(integrity(format!(
                "{live_nodes} nodes and {live_edges} edges are live but {} and {} have ids",
                self.node_ids.len(),
                self.edge_ids.len()
            )));
        }

        for (handle, node) in self.nodes() {
            for (port, conn) in node.connections() {
                if node.port(port).is_none() {
                    return Err(integrity(format!(
                        "node {} records a wire on port {port}, which {} does not have",
                        node.id(),
                        node.component().id()
                    )));
                }
                let edge = self.edge(conn.edge).ok_or_else(|| {
                    integrity(format!(
                        "node {} records {:?}, which is not in the graph",
                        node.id(),
                        conn.edge
                    ))
                })?;
                if edge.side(conn.side).endpoint() != (Endpoint::Attached { node: handle, port }) {
                    return Err(integrity(format!(
                        "node {} records side {:?} of edge {} on port {port}, but that end is elsewhere",
                        node.id(),
                        conn.side,
                        edge.id()
                    )));
                }
            }
        }

        for (handle, edge) in self.edges() {
            for side in Side::BOTH {
                let Endpoint::Attached { node, port } = edge.side(side).endpoint() else {
                    continue;
                };
                let n = self.node(node).ok_or_else(|| {
                    integrity(format!(
                        "edge {} is attached to {node:?}, which is not in the graph",
                        edge.id()
                    ))
                })?;
                if n.port(port).is_none() {
                    return Err(integrity(format!(
                        "edge {} is attached to port {port} of node {}, which {} does not have",
                        edge.id(),
                        n.id(),
                        n.component().id()
                    )));
                }
                if n.connection(port) != Some(EdgeConnection { edge: handle, side }) {
                    return Err(integrity(format!(
                        "edge {} is attached to port {port} of node {}, but the node does not record it",
                        edge.id(),
                        n.id()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn integrity(msg: String) -> GraphError {
    GraphError::Integrity(msg)
}
