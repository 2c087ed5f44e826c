//! The board graph: placed components and the wires between them.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error};
use uuid::Uuid;
use wb_core::Point;
use wb_resource::{
    Component, ComponentLoader, Connector, ConnectorLoader, LazyResourceStore, PortIdx,
};

use crate::config::{AssetConfig, BoardConfig};
use crate::edge::{Connection, Endpoint, Side, WireEdge};
use crate::error::{GraphError, GraphResult};
use crate::ids::{EdgeId, NodeId};
use crate::node::{ComponentNode, EdgeConnection};

/// One end of a wire being created with [`BoardGraph::add_edge`].
#[derive(Debug, Clone, Copy)]
pub struct WireEnd<'a> {
    /// Connector resource id.
    pub connector: &'a str,
    pub at: Endpoint,
}

impl<'a> WireEnd<'a> {
    pub fn attached(connector: &'a str, node: NodeId, port: PortIdx) -> Self {
        Self {
            connector,
            at: Endpoint::Attached { node, port },
        }
    }

    pub fn floating(connector: &'a str, pos: Point) -> Self {
        Self {
            connector,
            at: Endpoint::Floating { pos },
        }
    }
}

/// Placed components (nodes) connected by wires (edges).
///
/// Nodes and edges live in slot arenas addressed by [`NodeId`] and
/// [`EdgeId`]; their string ids map to those handles in sorted order.
/// Removing an entity empties its slot for good, so an old handle resolves
/// to nothing rather than to a different entity.
///
/// A graph opened from a file writes itself back there when dropped, unless
/// that is switched off with [`set_save_on_drop`](Self::set_save_on_drop).
pub struct BoardGraph {
    pub(crate) res: LazyResourceStore,
    pub(crate) nodes: Vec<Option<ComponentNode>>,
    pub(crate) edges: Vec<Option<WireEdge>>,
    pub(crate) node_ids: BTreeMap<String, NodeId>,
    pub(crate) edge_ids: BTreeMap<String, EdgeId>,
    path: Option<PathBuf>,
    save_on_drop: bool,
}

impl BoardGraph {
    /// An empty, unsaved graph resolving resources through `res`.
    pub fn new(res: LazyResourceStore) -> Self {
        Self {
            res,
            nodes: Vec::new(),
            edges: Vec::new(),
            node_ids: BTreeMap::new(),
            edge_ids: BTreeMap::new(),
            path: None,
            save_on_drop: false,
        }
    }

    /// An empty, unsaved graph with component and connector loaders for
    /// `assets`.
    pub fn with_assets(assets: &AssetConfig) -> GraphResult<Self> {
        Ok(Self::new(resource_store(assets)?))
    }

    /// Open the board file at `path` with the default asset directories.
    ///
    /// A missing file starts an empty graph if `create` is set and fails
    /// otherwise. With `save`, the graph is written back to `path` on drop.
    pub fn open(path: impl Into<PathBuf>, create: bool, save: bool) -> GraphResult<Self> {
        let config = BoardConfig {
            create_missing: create,
            save_on_drop: save,
            ..BoardConfig::default()
        };
        Self::open_with(path, &config)
    }

    pub fn open_with(path: impl Into<PathBuf>, config: &BoardConfig) -> GraphResult<Self> {
        let path = path.into();
        let res = resource_store(&config.assets)?;
        let mut graph = match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "reading board file");
                Self::from_json_str(&content, res).map_err(|e| GraphError::Parse {
                    path: path.clone(),
                    source: Box::new(e),
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if !config.create_missing {
                    return Err(GraphError::MissingFile { path });
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
                    && let Err(e) = fs::create_dir_all(parent)
                {
                    error!(
                        path = %parent.display(),
                        error = %e,
                        "Failed to create the directory for a new save file"
                    );
                }
                debug!(path = %path.display(), "starting a new board");
                Self::new(res)
            }
            Err(source) => return Err(GraphError::Io { path, source }),
        };
        graph.path = Some(path);
        graph.save_on_drop = config.save_on_drop;
        Ok(graph)
    }

    /// File this graph saves to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn save_on_drop(&self) -> bool {
        self.save_on_drop
    }

    pub fn set_save_on_drop(&mut self, save: bool) {
        self.save_on_drop = save;
    }

    pub fn resources(&self) -> &LazyResourceStore {
        &self.res
    }

    pub fn resources_mut(&mut self) -> &mut LazyResourceStore {
        &mut self.res
    }

    // --- access ---

    pub fn node(&self, node: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(node.index())?.as_ref()
    }

    /// Mutable access for renaming; placement goes through
    /// [`move_node`](Self::move_node).
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(node.index())?.as_mut()
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&WireEdge> {
        self.edges.get(edge.index())?.as_ref()
    }

    pub fn find_node(&self, id: &str) -> Option<NodeId> {
        self.node_ids.get(id).copied()
    }

    pub fn find_edge(&self, id: &str) -> Option<EdgeId> {
        self.edge_ids.get(id).copied()
    }

    pub fn get_node(&self, id: &str) -> Option<&ComponentNode> {
        self.find_node(id).and_then(|h| self.node(h))
    }

    pub fn get_edge(&self, id: &str) -> Option<&WireEdge> {
        self.find_edge(id).and_then(|h| self.edge(h))
    }

    /// Nodes ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ComponentNode)> + '_ {
        self.node_ids
            .values()
            .filter_map(|&h| self.node(h).map(|n| (h, n)))
    }

    /// Edges ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &WireEdge)> + '_ {
        self.edge_ids
            .values()
            .filter_map(|&h| self.edge(h).map(|e| (h, e)))
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty() && self.edge_ids.is_empty()
    }

    /// Board position of one end of a wire, following the node if attached.
    pub fn connection_pos(&self, edge: EdgeId, side: Side) -> GraphResult<Point> {
        match self.live_edge(edge)?.side(side).endpoint() {
            Endpoint::Floating { pos } => Ok(pos),
            Endpoint::Attached { node, port } => self.port_pos(node, port),
        }
    }

    /// Nodes sharing a wire with `node`, ordered by handle.
    pub fn neighbors(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut out = Vec::new();
        for (_, conn) in self.live_node(node)?.connections() {
            let edge = self.live_edge(conn.edge)?;
            if let Some(other) = edge.side(conn.side.other()).node() {
                out.push(other);
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    // --- editing ---

    /// Place a component of type `type_id` under a freshly generated id.
    pub fn component(
        &mut self,
        type_id: &str,
        name: impl Into<String>,
        pos: Point,
    ) -> GraphResult<NodeId> {
        let id = Uuid::new_v4().to_string();
        self.component_with_id(id, type_id, name, pos)
    }

    pub fn component_with_id(
        &mut self,
        id: impl Into<String>,
        type_id: &str,
        name: impl Into<String>,
        pos: Point,
    ) -> GraphResult<NodeId> {
        let id = id.into();
        if self.node_ids.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let ty = self.res.try_get::<Component>(type_id)?;
        let handle = self.next_node_handle()?;
        self.nodes
            .push(Some(ComponentNode::new(id.clone(), name.into(), ty, pos)));
        debug!(node = %id, ty = type_id, "placed component");
        self.node_ids.insert(id, handle);
        Ok(handle)
    }

    /// Create a wire under a freshly generated id.
    pub fn add_edge(&mut self, left: WireEnd<'_>, right: WireEnd<'_>) -> GraphResult<EdgeId> {
        let id = Uuid::new_v4().to_string();
        self.add_edge_with_id(id, left, right)
    }

    /// Create a wire. Attached ends must name free ports.
    pub fn add_edge_with_id(
        &mut self,
        id: impl Into<String>,
        left: WireEnd<'_>,
        right: WireEnd<'_>,
    ) -> GraphResult<EdgeId> {
        let id = id.into();
        if self.edge_ids.contains_key(&id) {
            return Err(GraphError::DuplicateEdge(id));
        }
        for end in [&left, &right] {
            if let Endpoint::Attached { node, port } = end.at {
                self.check_port_free(node, port, &id)?;
            }
        }
        if let (Endpoint::Attached { node: a, port: pa }, Endpoint::Attached { node: b, port: pb }) =
            (left.at, right.at)
            && a == b
            && pa == pb
        {
            return Err(GraphError::PortInUse {
                node: self.live_node(a)?.id().to_string(),
                port: self.port_id(a, pa)?,
                edge: id,
            });
        }

        let conns = [
            Connection::new(self.res.try_get::<Connector>(left.connector)?, left.at),
            Connection::new(self.res.try_get::<Connector>(right.connector)?, right.at),
        ];
        let handle = self.next_edge_handle()?;
        self.edges.push(Some(WireEdge::new(id.clone(), conns)));
        self.edge_ids.insert(id, handle);
        for (side, end) in [(Side::Left, left), (Side::Right, right)] {
            if let Endpoint::Attached { node, port } = end.at {
                self.live_node_mut(node)?
                    .attach(port, EdgeConnection { edge: handle, side });
            }
        }
        Ok(handle)
    }

    /// Attach one end of `edge` to `port` on `node`.
    ///
    /// Whatever wire end already occupies that port is detached first, and
    /// the end's previous attachment, if any, is released.
    pub fn connect_port(
        &mut self,
        edge: EdgeId,
        side: Side,
        node: NodeId,
        port: PortIdx,
    ) -> GraphResult<()> {
        let current = self.live_edge(edge)?.side(side).endpoint();
        self.port_id(node, port)?;
        if current == (Endpoint::Attached { node, port }) {
            return Ok(());
        }

        if let Some(occupant) = self.live_node(node)?.connection(port) {
            if occupant.edge == edge {
                return Err(GraphError::PortInUse {
                    node: self.live_node(node)?.id().to_string(),
                    port: self.port_id(node, port)?,
                    edge: self.live_edge(edge)?.id().to_string(),
                });
            }
            self.detach(occupant.edge, occupant.side)?;
        }
        if let Endpoint::Attached {
            node: old_node,
            port: old_port,
        } = current
        {
            self.live_node_mut(old_node)?.release(old_port);
        }

        self.live_edge_mut(edge)?
            .side_mut(side)
            .set_endpoint(Endpoint::Attached { node, port });
        self.live_node_mut(node)?
            .attach(port, EdgeConnection { edge, side });
        Ok(())
    }

    /// Turn an attached wire end into a floating one at the position it
    /// had, and free the port. Floating ends are left as they are.
    pub fn detach(&mut self, edge: EdgeId, side: Side) -> GraphResult<()> {
        let Endpoint::Attached { node, port } = self.live_edge(edge)?.side(side).endpoint() else {
            return Ok(());
        };
        let pos = self.port_pos(node, port)?;
        self.live_node_mut(node)?.release(port);
        self.live_edge_mut(edge)?
            .side_mut(side)
            .set_endpoint(Endpoint::Floating { pos });
        Ok(())
    }

    /// Place one end of `edge` loose at `pos`, detaching it if needed.
    pub fn move_wire_end(&mut self, edge: EdgeId, side: Side, pos: Point) -> GraphResult<()> {
        self.detach(edge, side)?;
        self.live_edge_mut(edge)?
            .side_mut(side)
            .set_endpoint(Endpoint::Floating { pos });
        Ok(())
    }

    pub fn push_wire_point(&mut self, edge: EdgeId, pt: Point) -> GraphResult<()> {
        self.live_edge_mut(edge)?.points_mut().push(pt);
        Ok(())
    }

    pub fn clear_wire_points(&mut self, edge: EdgeId) -> GraphResult<()> {
        self.live_edge_mut(edge)?.points_mut().clear();
        Ok(())
    }

    pub fn move_node(&mut self, node: NodeId, pos: Point) -> GraphResult<()> {
        self.live_node_mut(node)?.set_pos(pos);
        Ok(())
    }

    /// Remove a wire, freeing the ports it was attached to.
    pub fn remove_edge(&mut self, edge: EdgeId) -> GraphResult<WireEdge> {
        let removed = self
            .edges
            .get_mut(edge.index())
            .and_then(Option::take)
            .ok_or(GraphError::StaleEdge(edge))?;
        for (i, conn) in removed.connections().iter().enumerate() {
            if let Endpoint::Attached { node, port } = conn.endpoint()
                && let Some(n) = self.node_mut(node)
                && n.connection(port).is_some_and(|c| c.edge == edge && c.side.index() == i)
            {
                n.release(port);
            }
        }
        self.edge_ids.remove(removed.id());
        debug!(edge = removed.id(), "removed wire");
        Ok(removed)
    }

    /// Remove a node. Wires attached to it are detached and left floating
    /// where they were.
    pub fn remove_node(&mut self, node: NodeId) -> GraphResult<ComponentNode> {
        let attached: Vec<EdgeConnection> =
            self.live_node(node)?.connections().map(|(_, c)| c).collect();
        for conn in attached {
            self.detach(conn.edge, conn.side)?;
        }
        let removed = self
            .nodes
            .get_mut(node.index())
            .and_then(Option::take)
            .ok_or(GraphError::StaleNode(node))?;
        self.node_ids.remove(removed.id());
        debug!(node = removed.id(), "removed component");
        Ok(removed)
    }

    // --- helpers ---

    pub(crate) fn live_node(&self, node: NodeId) -> GraphResult<&ComponentNode> {
        self.node(node).ok_or(GraphError::StaleNode(node))
    }

    pub(crate) fn live_node_mut(&mut self, node: NodeId) -> GraphResult<&mut ComponentNode> {
        self.node_mut(node).ok_or(GraphError::StaleNode(node))
    }

    pub(crate) fn live_edge(&self, edge: EdgeId) -> GraphResult<&WireEdge> {
        self.edge(edge).ok_or(GraphError::StaleEdge(edge))
    }

    pub(crate) fn live_edge_mut(&mut self, edge: EdgeId) -> GraphResult<&mut WireEdge> {
        self.edges
            .get_mut(edge.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::StaleEdge(edge))
    }

    /// String id of `port` on `node`'s component.
    pub(crate) fn port_id(&self, node: NodeId, port: PortIdx) -> GraphResult<String> {
        let ty = self.live_node(node)?.component();
        ty.get_port(port)
            .map(|p| p.id().to_string())
            .ok_or_else(|| GraphError::DanglingPort {
                component: ty.id().to_string(),
                port: port.to_string(),
            })
    }

    fn port_pos(&self, node: NodeId, port: PortIdx) -> GraphResult<Point> {
        let n = self.live_node(node)?;
        n.port_pos(port).ok_or_else(|| GraphError::DanglingPort {
            component: n.component().id().to_string(),
            port: port.to_string(),
        })
    }

    pub(crate) fn next_node_handle(&self) -> GraphResult<NodeId> {
        NodeId::from_index(self.nodes.len()).ok_or(GraphError::Capacity("node"))
    }

    pub(crate) fn next_edge_handle(&self) -> GraphResult<EdgeId> {
        EdgeId::from_index(self.edges.len()).ok_or(GraphError::Capacity("edge"))
    }

    fn check_port_free(&self, node: NodeId, port: PortIdx, edge: &str) -> GraphResult<()> {
        let port_id = self.port_id(node, port)?;
        let n = self.live_node(node)?;
        match n.connection(port) {
            Some(conn) => Err(GraphError::PortInUse {
                node: n.id().to_string(),
                port: port_id,
                edge: self
                    .edge(conn.edge)
                    .map_or_else(|| edge.to_string(), |e| e.id().to_string()),
            }),
            None => Ok(()),
        }
    }
}

impl Drop for BoardGraph {
    fn drop(&mut self) {
        if !self.save_on_drop {
            return;
        }
        if let Err(e) = self.save() {
            error!(
                path = ?self.path.as_deref().map(Path::display),
                error = %e,
                "Failed to save board graph"
            );
        }
    }
}

impl std::fmt::Debug for BoardGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardGraph")
            .field("path", &self.path)
            .field("nodes", &self.node_ids.len())
            .field("edges", &self.edge_ids.len())
            .field("save_on_drop", &self.save_on_drop)
            .finish()
    }
}

/// A resource store with component and connector loaders for `assets`.
pub fn resource_store(assets: &AssetConfig) -> GraphResult<LazyResourceStore> {
    let mut res = LazyResourceStore::new();
    res.register_loader(ComponentLoader::new(&assets.components))?;
    res.register_loader(ConnectorLoader::new(&assets.connectors))?;
    Ok(res)
}
