//! Board graph errors.

use std::path::PathBuf;

use thiserror::Error;
use wb_resource::ResourceError;

use crate::config::ConfigError;
use crate::ids::{EdgeId, NodeId};

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node {node} connects to nonexistent edge {edge}")]
    DanglingEdge { node: String, edge: String },

    #[error("Edge {edge} connects to nonexistent node {node}")]
    DanglingNode { edge: String, node: String },

    #[error("Component {component} has no port with id {port}")]
    DanglingPort { component: String, port: String },

    #[error("Edge {edge} has {count} connections, must have exactly two")]
    ConnectionCount { edge: String, count: usize },

    #[error(
        "Wire edge connection must have either a 'pos' field if the edge is floating or a 'node' and 'port' field"
    )]
    MalformedConnection,

    #[error("A node with id {0} already exists")]
    DuplicateNode(String),

    #[error("An edge with id {0} already exists")]
    DuplicateEdge(String),

    #[error("Port {port} of node {node} is already connected to edge {edge}")]
    PortInUse {
        node: String,
        port: String,
        edge: String,
    },

    #[error("{0:?} does not refer to a node in this graph")]
    StaleNode(NodeId),

    #[error("{0:?} does not refer to an edge in this graph")]
    StaleEdge(EdgeId),

    #[error("Graph has no free {0} handles left")]
    Capacity(&'static str),

    #[error("Graph integrity violated: {0}")]
    Integrity(String),

    #[error("Failed to load graph node with ID {id}: {source}")]
    Node {
        id: String,
        #[source]
        source: Box<GraphError>,
    },

    #[error("Failed to load graph edge with ID {id}: {source}")]
    Edge {
        id: String,
        #[source]
        source: Box<GraphError>,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("The graph file at {path} does not exist")]
    MissingFile { path: PathBuf },

    #[error("Board graph has no save path")]
    NoSavePath,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read board JSON from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<GraphError>,
    },

    #[error("Invalid board JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphError {
    /// The innermost error, looking through node/edge/file context.
    pub fn root(&self) -> &GraphError {
        match self {
            GraphError::Node { source, .. }
            | GraphError::Edge { source, .. }
            | GraphError::Parse { source, .. } => source.root(),
            other => other,
        }
    }

    /// The resource failure at the root of this error, if any.
    pub fn resource_error(&self) -> Option<&ResourceError> {
        match self.root() {
            GraphError::Resource(e) => Some(e.root()),
            _ => None,
        }
    }

    /// A component or connector type could not be loaded: no loader, or a
    /// missing or malformed resource file.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), GraphError::Resource(e) if e.is_not_found())
    }

    /// The board file refers to something that is not there, or disagrees
    /// with itself.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self.root(),
            GraphError::DanglingEdge { .. }
                | GraphError::DanglingNode { .. }
                | GraphError::DanglingPort { .. }
                | GraphError::ConnectionCount { .. }
                | GraphError::MalformedConnection
                | GraphError::DuplicateNode(_)
                | GraphError::DuplicateEdge(_)
                | GraphError::PortInUse { .. }
                | GraphError::Integrity(_)
        )
    }

    pub(crate) fn in_node(self, id: &str) -> GraphError {
        GraphError::Node {
            id: id.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_edge(self, id: &str) -> GraphError {
        GraphError::Edge {
            id: id.to_string(),
            source: Box::new(self),
        }
    }
}
