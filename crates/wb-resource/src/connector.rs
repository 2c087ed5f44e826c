//! Wire-end types.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use wb_core::Optional;

use crate::error::ResourceResult;
use crate::id::ResourceId;
use crate::purchase::PurchaseData;
use crate::store::{LazyResourceStore, ResourceLoader};

/// The physical termination on one end of a wire (crimp, ferrule, bare...).
#[derive(Debug, Clone)]
pub struct Connector {
    id: ResourceId,
    name: String,
    purchase: Optional<PurchaseData>,
}

impl Connector {
    pub fn new(id: ResourceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            purchase: Optional::none(),
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purchase_data(&self) -> &Optional<PurchaseData> {
        &self.purchase
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConnectorDef {
    name: String,
    #[serde(default)]
    purchase: Optional<PurchaseData>,
}

/// Loads [`Connector`]s from `{dir}/{id path}.json`.
#[derive(Debug, Clone)]
pub struct ConnectorLoader {
    dir: PathBuf,
}

impl ConnectorLoader {
    pub const DEFAULT_DIR: &'static str = "./assets/connectors";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for ConnectorLoader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR)
    }
}

impl ResourceLoader for ConnectorLoader {
    type Resource = Connector;

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(
        &self,
        id: &ResourceId,
        json: serde_json::Value,
        _store: &mut LazyResourceStore,
    ) -> ResourceResult<Connector> {
        let def: ConnectorDef = serde_json::from_value(json)?;
        Ok(Connector {
            id: id.clone(),
            name: def.name,
            purchase: def.purchase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_core::Usd;

    #[test]
    fn purchase_is_optional() {
        let mut store = LazyResourceStore::new();
        let loader = ConnectorLoader::default();
        assert_eq!(loader.dir(), Path::new("./assets/connectors"));

        let bare = loader
            .load(&ResourceId::new("bare"), serde_json::json!({"name": "Bare"}), &mut store)
            .unwrap();
        assert!(bare.purchase_data().is_none());

        let jst = loader
            .load(
                &ResourceId::new("jst.xh"),
                serde_json::json!({"name": "JST XH", "purchase": [{"price": "12c", "url": "u"}]}),
                &mut store,
            )
            .unwrap();
        assert_eq!(jst.name(), "JST XH");
        let cost = jst.purchase_data().map(|p| p.iter().map(|i| i.cost).fold(Usd::default(), |a, b| a + b));
        assert_eq!(cost, Some(Usd::new(0, 12)));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut store = LazyResourceStore::new();
        let c = ConnectorLoader::default()
            .load(
                &ResourceId::new("molex.kk"),
                serde_json::json!({"name": "KK", "pins": 4}),
                &mut store,
            )
            .unwrap();
        assert_eq!(c.name(), "KK");
    }

    #[test]
    fn oversized_price_is_an_error() {
        let mut store = LazyResourceStore::new();
        let err = ConnectorLoader::default()
            .load(
                &ResourceId::new("gold"),
                serde_json::json!({"name": "Gold", "purchase": [{"price": "$18446744073709551615", "url": "u"}]}),
                &mut store,
            )
            .unwrap_err();
        assert!(err.to_string().contains("amount too large"));
    }
}
