//! Wires and their ends.

use std::fmt;
use std::rc::Rc;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use wb_core::Point;
use wb_resource::{Connector, PortIdx};

use crate::ids::NodeId;

/// Names for the two ends of a wire. The names carry no meaning beyond
/// telling the ends apart; in board files they are `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Serialize for Side {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SideVisitor;

        impl Visitor<'_> for SideVisitor {
            type Value = Side;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("wire side 0 or 1")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Side, E> {
                match v {
                    0 => Ok(Side::Left),
                    1 => Ok(Side::Right),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Side, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_u8(SideVisitor)
    }
}

/// Where a wire end is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// On a port of a placed component; the position follows the node.
    Attached { node: NodeId, port: PortIdx },
    /// Loose on the board at an explicit position.
    Floating { pos: Point },
}

/// One end of a wire: its connector type and where it is.
#[derive(Debug, Clone)]
pub struct Connection {
    connector: Rc<Connector>,
    end: Endpoint,
}

impl Connection {
    pub fn new(connector: Rc<Connector>, end: Endpoint) -> Self {
        Self { connector, end }
    }

    pub fn connector(&self) -> &Rc<Connector> {
        &self.connector
    }

    pub fn endpoint(&self) -> Endpoint {
        self.end
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.end, Endpoint::Floating { .. })
    }

    pub fn node(&self) -> Option<NodeId> {
        match self.end {
            Endpoint::Attached { node, .. } => Some(node),
            Endpoint::Floating { .. } => None,
        }
    }

    pub fn port(&self) -> Option<PortIdx> {
        match self.end {
            Endpoint::Attached { port, .. } => Some(port),
            Endpoint::Floating { .. } => None,
        }
    }

    /// Stored position of a floating end.
    pub fn floating_pos(&self) -> Option<Point> {
        match self.end {
            Endpoint::Floating { pos } => Some(pos),
            Endpoint::Attached { .. } => None,
        }
    }

    pub(crate) fn set_endpoint(&mut self, end: Endpoint) {
        self.end = end;
    }
}

/// A wire between two [`Connection`]s, routed through user-placed points.
#[derive(Debug, Clone)]
pub struct WireEdge {
    id: String,
    conns: [Connection; 2],
    points: Vec<Point>,
}

impl WireEdge {
    pub(crate) fn new(id: String, conns: [Connection; 2]) -> Self {
        Self {
            id,
            conns,
            points: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connections(&self) -> &[Connection; 2] {
        &self.conns
    }

    pub fn side(&self, side: Side) -> &Connection {
        &self.conns[side.index()]
    }

    pub(crate) fn side_mut(&mut self, side: Side) -> &mut Connection {
        &mut self.conns[side.index()]
    }

    /// True if either end is attached to `node`.
    pub fn connects(&self, node: NodeId) -> bool {
        self.conns.iter().any(|c| c.node() == Some(node))
    }

    /// Routing points between the two ends, in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }
}
