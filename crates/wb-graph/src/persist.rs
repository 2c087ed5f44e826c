//! Reading and writing board files.
//!
//! Loading runs in three passes over a parsed [`BoardFile`]:
//! 1. every node, with its component type resolved through the store;
//! 2. every edge, whose attached ends claim their ports on the nodes;
//! 3. each node's `conns` list, checked against what the edges claimed.
//!
//! A node or edge is reserved in the id map before it is built and removed
//! again if building fails, so a failed load never leaves a partial entity
//! behind.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use wb_resource::{Component, Connector, LazyResourceStore};

use crate::edge::{Connection, Endpoint, Side, WireEdge};
use crate::error::{GraphError, GraphResult};
use crate::graph::BoardGraph;
use crate::ids::{EdgeId, NodeId};
use crate::node::{ComponentNode, EdgeConnection};
use crate::schema::{BoardFile, ConnDef, EdgeDef, NodeConnDef, NodeDef};

impl BoardGraph {
    /// Build a graph from board JSON text. Blank text is an empty board.
    pub fn from_json_str(text: &str, res: LazyResourceStore) -> GraphResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new(res));
        }
        let file: BoardFile = serde_json::from_str(text)?;
        Self::from_board_file(&file, res)
    }

    pub fn from_json(json: serde_json::Value, res: LazyResourceStore) -> GraphResult<Self> {
        let file: BoardFile = serde_json::from_value(json)?;
        Self::from_board_file(&file, res)
    }

    pub fn from_board_file(file: &BoardFile, res: LazyResourceStore) -> GraphResult<Self> {
        let mut graph = Self::new(res);
        for id in file.nodes.keys() {
            graph.load_node(id, file)?;
        }
        for id in file.edges.keys() {
            graph.load_edge(id, file)?;
        }
        for (id, def) in &file.nodes {
            graph.check_node_conns(id, def).map_err(|e| e.in_node(id))?;
        }
        graph.validate()?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded board graph"
        );
        Ok(graph)
    }

    /// Make sure node `id` is loaded. Idempotent.
    fn load_node(&mut self, id: &str, file: &BoardFile) -> GraphResult<NodeId> {
        if let Some(&handle) = self.node_ids.get(id) {
            return Ok(handle);
        }
        let handle = self.next_node_handle()?;
        self.nodes.push(None);
        self.node_ids.insert(id.to_string(), handle);

        match self.build_node(id, file) {
            Ok(node) => {
                if let Some(slot) = self.nodes.get_mut(handle.index()) {
                    *slot = Some(node);
                }
                Ok(handle)
            }
            Err(e) => {
                self.node_ids.remove(id);
                if self.nodes.len() == handle.index() + 1 {
                    self.nodes.pop();
                }
                Err(e.in_node(id))
            }
        }
    }

    fn build_node(&mut self, id: &str, file: &BoardFile) -> GraphResult<ComponentNode> {
        let def = file
            .nodes
            .get(id)
            .ok_or_else(|| GraphError::Integrity(format!("no node {id} in board file")))?;
        let ty = self.res.try_get::<Component>(&def.ty)?;
        Ok(ComponentNode::new(
            id.to_string(),
            def.name.clone(),
            ty,
            def.pos,
        ))
    }

    /// Make sure edge `id` is loaded, loading any node it attaches to.
    fn load_edge(&mut self, id: &str, file: &BoardFile) -> GraphResult<EdgeId> {
        if let Some(&handle) = self.edge_ids.get(id) {
            return Ok(handle);
        }
        let handle = self.next_edge_handle()?;
        self.edges.push(None);
        self.edge_ids.insert(id.to_string(), handle);

        match self.build_edge(id, handle, file) {
            Ok(edge) => {
                for side in Side::BOTH {
                    if let Endpoint::Attached { node, port } = edge.side(side).endpoint()
                        && let Some(n) = self.node_mut(node)
                    {
                        n.attach(port, EdgeConnection { edge: handle, side });
                    }
                }
                if let Some(slot) = self.edges.get_mut(handle.index()) {
                    *slot = Some(edge);
                }
                Ok(handle)
            }
            Err(e) => {
                self.edge_ids.remove(id);
                if self.edges.len() == handle.index() + 1 {
                    self.edges.pop();
                }
                Err(e.in_edge(id))
            }
        }
    }

    fn build_edge(&mut self, id: &str, handle: EdgeId, file: &BoardFile) -> GraphResult<WireEdge> {
        let def = file
            .edges
            .get(id)
            .ok_or_else(|| GraphError::Integrity(format!("no edge {id} in board file")))?;
        if def.conns.len() != 2 {
            return Err(GraphError::ConnectionCount {
                edge: id.to_string(),
                count: def.conns.len(),
            });
        }

        let mut conns = Vec::with_capacity(2);
        for (side, conn) in Side::BOTH.into_iter().zip(&def.conns) {
            let connector = self.res.try_get::<Connector>(&conn.connector)?;
            let end = match (&conn.node, &conn.port, conn.pos) {
                (Some(node_id), Some(port_id), _) => {
                    if !file.nodes.contains_key(node_id) && !self.node_ids.contains_key(node_id) {
                        return Err(GraphError::DanglingNode {
                            edge: id.to_string(),
                            node: node_id.clone(),
                        });
                    }
                    let node = self.load_node(node_id, file)?;
                    let n = self.live_node(node)?;
                    let port = n.component().get_port_idx(port_id).ok_or_else(|| {
                        GraphError::DanglingPort {
                            component: n.component().id().to_string(),
                            port: port_id.clone(),
                        }
                    })?;
                    if let Some(taken) = n.connection(port) {
                        let other = self
                            .edge(taken.edge)
                            .map_or_else(|| id.to_string(), |e| e.id().to_string());
                        return Err(GraphError::PortInUse {
                            node: node_id.clone(),
                            port: port_id.clone(),
                            edge: other,
                        });
                    }
                    Endpoint::Attached { node, port }
                }
                (_, _, Some(pos)) => Endpoint::Floating { pos },
                _ => return Err(GraphError::MalformedConnection),
            };
            debug!(edge = id, ?side, ?end, "resolved wire end");
            conns.push(Connection::new(connector, end));
        }

        let [left, right]: [Connection; 2] =
            conns
                .try_into()
                .map_err(|v: Vec<Connection>| GraphError::ConnectionCount {
                    edge: id.to_string(),
                    count: v.len(),
                })?;
        if left.endpoint() == right.endpoint() && !left.is_floating() {
            return Err(GraphError::Integrity(format!(
                "both ends of edge {id} attach to the same port"
            )));
        }
        let mut edge = WireEdge::new(id.to_string(), [left, right]);
        edge.points_mut().extend_from_slice(&def.pts);
        debug!(edge = id, handle = %handle, "loaded wire");
        Ok(edge)
    }

    /// Check a node's `conns` entries against the edges, which own port
    /// occupancy.
    fn check_node_conns(&self, id: &str, def: &NodeDef) -> GraphResult<()> {
        let handle = self
            .find_node(id)
            .ok_or_else(|| GraphError::Integrity(format!("node {id} was not loaded")))?;
        let node = self.live_node(handle)?;
        let mut listed = HashSet::new();

        for conn in &def.conns {
            let port = node.component().get_port_idx(&conn.port).ok_or_else(|| {
                GraphError::DanglingPort {
                    component: node.component().id().to_string(),
                    port: conn.port.clone(),
                }
            })?;
            let edge_handle = self.find_edge(&conn.edge).ok_or_else(|| GraphError::DanglingEdge {
                node: id.to_string(),
                edge: conn.edge.clone(),
            })?;
            let edge = self.live_edge(edge_handle)?;
            let expected = Endpoint::Attached { node: handle, port };
            if edge.side(conn.side).endpoint() != expected {
                return Err(GraphError::Integrity(format!(
                    "node {id} lists port {} on side {:?} of edge {}, but that wire end is not attached there",
                    conn.port, conn.side, conn.edge
                )));
            }
            if !listed.insert(port) {
                warn!(node = id, port = %conn.port, "port listed more than once");
            }
        }

        for (port, conn) in node.connections() {
            if !listed.contains(&port) {
                let edge = self.edge(conn.edge).map_or("?", WireEdge::id);
                warn!(node = id, port, edge, "node does not list a port its wire attaches to");
            }
        }
        Ok(())
    }

    /// Project the graph onto the board file schema.
    pub fn to_board_file(&self) -> GraphResult<BoardFile> {
        let mut file = BoardFile::default();

        for (_, node) in self.nodes() {
            let ty = node.component();
            let mut conns = Vec::new();
            for (port, conn) in node.connections() {
                let port_id = ty.get_port(port).ok_or_else(|| GraphError::DanglingPort {
                    component: ty.id().to_string(),
                    port: port.to_string(),
                })?;
                conns.push(NodeConnDef {
                    port: port_id.id().to_string(),
                    edge: self.live_edge(conn.edge)?.id().to_string(),
                    side: conn.side,
                });
            }
            file.nodes.insert(
                node.id().to_string(),
                NodeDef {
                    name: node.name().to_string(),
                    ty: ty.id().to_string(),
                    pos: node.pos(),
                    conns,
                },
            );
        }

        for (_, edge) in self.edges() {
            let mut conns = Vec::with_capacity(2);
            for conn in edge.connections() {
                let connector = conn.connector().id().to_string();
                conns.push(match conn.endpoint() {
                    Endpoint::Floating { pos } => ConnDef::floating(connector, pos),
                    Endpoint::Attached { node, port } => ConnDef::attached(
                        connector,
                        self.live_node(node)?.id(),
                        self.port_id(node, port)?,
                    ),
                });
            }
            file.edges.insert(
                edge.id().to_string(),
                EdgeDef {
                    conns,
                    pts: edge.points().to_vec(),
                },
            );
        }

        Ok(file)
    }

    pub fn to_json(&self) -> GraphResult<serde_json::Value> {
        Ok(serde_json::to_value(self.to_board_file()?)?)
    }

    /// Write the graph to its file.
    pub fn save(&self) -> GraphResult<()> {
        let path = self.path().ok_or(GraphError::NoSavePath)?;
        self.save_to(path)
    }

    /// Write the graph as pretty-printed JSON to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.to_board_file()?)?;
        fs::write(path, content).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved board graph");
        Ok(())
    }
}
