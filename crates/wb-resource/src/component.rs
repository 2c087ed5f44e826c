//! Component part definitions and their loader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wb_core::freelist::FreeIdx;
use wb_core::{Footprint, FreeList, Mass, Optional, Point};

use crate::error::{ResourceError, ResourceResult};
use crate::id::ResourceId;
use crate::purchase::PurchaseData;
use crate::store::{LazyResourceStore, ResourceLoader};

/// Stable index of a port within its component.
pub type PortIdx = FreeIdx;

/// A named attachment point, offset from the component origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPort {
    id: String,
    name: String,
    pos: Point,
}

impl ConnectionPort {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pos: Point) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pos,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pos(&self) -> Point {
        self.pos
    }
}

/// A part type: outline, ports and catalogue data.
///
/// Shared between every node that places it; edges refer to its ports by
/// [`PortIdx`], which stays valid across port removal.
#[derive(Debug, Clone)]
pub struct Component {
    id: ResourceId,
    name: String,
    footprint: Footprint,
    ports: FreeList<ConnectionPort>,
    mass: Option<Mass>,
    purchase: Optional<PurchaseData>,
}

impl Component {
    pub fn new(id: ResourceId, name: impl Into<String>, footprint: Footprint) -> Self {
        Self {
            id,
            name: name.into(),
            footprint,
            ports: FreeList::new(),
            mass: None,
            purchase: Optional::none(),
        }
    }

    pub fn with_mass(mut self, mass: Mass) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_purchase_data(mut self, purchase: PurchaseData) -> Self {
        self.purchase = Optional::some(purchase);
        self
    }

    /// Add a port; port ids must be unique within the component.
    pub fn add_port(&mut self, port: ConnectionPort) -> ResourceResult<PortIdx> {
        if self.get_port_idx(port.id()).is_some() {
            return Err(ResourceError::Invalid(format!(
                "component '{}' already has a port '{}'",
                self.id,
                port.id()
            )));
        }
        Ok(self.ports.emplace(port))
    }

    /// Remove a port. Indices of the remaining ports are unchanged.
    pub fn remove_port(&mut self, idx: PortIdx) -> ResourceResult<ConnectionPort> {
        Ok(self.ports.erase(idx)?)
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn mass(&self) -> Option<Mass> {
        self.mass
    }

    pub fn purchase_data(&self) -> &Optional<PurchaseData> {
        &self.purchase
    }

    pub fn get_port(&self, idx: PortIdx) -> Option<&ConnectionPort> {
        self.ports.get(idx)
    }

    pub fn get_port_by_id(&self, id: &str) -> Option<&ConnectionPort> {
        self.get_port_idx(id).and_then(|idx| self.ports.get(idx))
    }

    pub fn get_port_idx(&self, id: &str) -> Option<PortIdx> {
        self.ports
            .iter()
            .find(|(_, port)| port.id == id)
            .map(|(idx, _)| idx)
    }

    /// Ports with their indices, in index order.
    pub fn ports(&self) -> impl Iterator<Item = (PortIdx, &ConnectionPort)> + '_ {
        self.ports.iter()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDef {
    pub name: String,
    pub footprint: Footprint,
    #[serde(default)]
    pub mass: Option<Mass>,
    #[serde(default)]
    pub purchase: Optional<PurchaseData>,
    #[serde(default)]
    pub ports: BTreeMap<String, PortDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortDef {
    pub name: String,
    pub pos: Point,
}

/// Loads [`Component`]s from `{dir}/{id path}.json`.
#[derive(Debug, Clone)]
pub struct ComponentLoader {
    dir: PathBuf,
}

impl ComponentLoader {
    pub const DEFAULT_DIR: &'static str = "./assets/components";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for ComponentLoader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR)
    }
}

impl ResourceLoader for ComponentLoader {
    type Resource = Component;

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(
        &self,
        id: &ResourceId,
        json: serde_json::Value,
        _store: &mut LazyResourceStore,
    ) -> ResourceResult<Component> {
        let def: ComponentDef = serde_json::from_value(json)?;
        let mut component = Component::new(id.clone(), def.name, def.footprint);
        component.mass = def.mass;
        component.purchase = def.purchase;
        for (port_id, port) in def.ports {
            component.add_port(ConnectionPort::new(port_id, port.name, port.pos))?;
        }
        Ok(component)
    }
}
