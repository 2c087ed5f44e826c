//! wb-graph: the board graph and its save file.
//!
//! A [`BoardGraph`] holds placed components ([`ComponentNode`]) and the
//! wires between their ports ([`WireEdge`]). Component and connector types
//! are loaded on demand through a [`wb_resource::LazyResourceStore`].
//!
//! ```no_run
//! use wb_graph::{BoardGraph, Side};
//!
//! let graph = BoardGraph::open("boards/timer.json", true, true)?;
//! for (handle, edge) in graph.edges() {
//!     let from = graph.connection_pos(handle, Side::Left)?;
//!     println!("{} starts at ({}, {})", edge.id(), from.x, from.y);
//! }
//! # Ok::<(), wb_graph::GraphError>(())
//! ```

pub mod config;
pub mod edge;
pub mod error;
pub mod graph;
pub mod ids;
pub mod node;
pub mod persist;
pub mod schema;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{AssetConfig, BoardConfig, ConfigError};
pub use edge::{Connection, Endpoint, Side, WireEdge};
pub use error::{GraphError, GraphResult};
pub use graph::{BoardGraph, WireEnd, resource_store};
pub use ids::{EdgeId, NodeId};
pub use node::{ComponentNode, EdgeConnection};
pub use schema::{BoardFile, ConnDef, EdgeDef, NodeConnDef, NodeDef};
