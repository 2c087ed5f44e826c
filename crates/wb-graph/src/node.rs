use std::collections::BTreeMap;
use std::rc::Rc;

use wb_core::{Aabb, Point};
use wb_resource::{Component, ConnectionPort, PortIdx};

use crate::edge::Side;
use crate::ids::EdgeId;

/// Which wire, and which end of it, occupies a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeConnection {
    pub edge: EdgeId,
    pub side: Side,
}

/// A component placed on the board.
///
/// Holds its component type alive. The port map only has entries for ports
/// that a wire is currently attached to.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    id: String,
    name: String,
    ty: Rc<Component>,
    pos: Point,
    aabb: Aabb,
    ports: BTreeMap<PortIdx, EdgeConnection>,
}

impl ComponentNode {
    pub(crate) fn new(id: String, name: String, ty: Rc<Component>, pos: Point) -> Self {
        let aabb = *ty.footprint().aabb() + pos;
        Self {
            id,
            name,
            ty,
            pos,
            aabb,
            ports: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The component type this node places.
    pub fn component(&self) -> &Rc<Component> {
        &self.ty
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Footprint bounds in board coordinates.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub(crate) fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
        self.aabb = *self.ty.footprint().aabb() + pos;
    }

    pub fn port(&self, port: PortIdx) -> Option<&ConnectionPort> {
        self.ty.get_port(port)
    }

    /// Board position of a port.
    pub fn port_pos(&self, port: PortIdx) -> Option<Point> {
        self.ty.get_port(port).map(|p| self.pos + p.pos())
    }

    /// The wire attached to `port`, if any.
    pub fn connection(&self, port: PortIdx) -> Option<EdgeConnection> {
        self.ports.get(&port).copied()
    }

    /// Occupied ports in index order.
    pub fn connections(&self) -> impl Iterator<Item = (PortIdx, EdgeConnection)> + '_ {
        self.ports.iter().map(|(port, conn)| (*port, *conn))
    }

    pub(crate) fn attach(&mut self, port: PortIdx, conn: EdgeConnection) -> Option<EdgeConnection> {
        self.ports.insert(port, conn)
    }

    pub(crate) fn release(&mut self, port: PortIdx) -> Option<EdgeConnection> {
        self.ports.remove(&port)
    }
}
