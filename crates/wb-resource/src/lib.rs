//! wb-resource: lazily loaded, shared resource types.
//!
//! Provides:
//! - `LazyResourceStore`, an id-keyed, weak-reference cache that loads
//!   resources from `{loader dir}/{id with '.' as '/'}.json` on demand
//! - `Component` / `ConnectionPort` part definitions
//! - `Connector` wire-end definitions
//! - `PurchaseData` shared by both
//!
//! # Example
//!
//! ```no_run
//! use wb_resource::{Component, ComponentLoader, LazyResourceStore};
//!
//! let mut store = LazyResourceStore::new();
//! store.register_loader(ComponentLoader::new("assets/components")).unwrap();
//! // reads assets/components/res/r1.json
//! let r1 = store.try_get::<Component>("res.r1").unwrap();
//! println!("{} has {} ports", r1.name(), r1.ports().count());
//! ```

pub mod component;
pub mod connector;
pub mod error;
pub mod id;
pub mod purchase;
pub mod store;

pub use component::{Component, ComponentLoader, ConnectionPort, PortIdx};
pub use connector::{Connector, ConnectorLoader};
pub use error::{ResourceError, ResourceResult};
pub use id::ResourceId;
pub use purchase::{PurchaseData, PurchaseItem};
pub use store::{LazyResourceStore, ResourceLoader};
