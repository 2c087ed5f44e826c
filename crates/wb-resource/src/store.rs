//! Lazy, weakly cached resource registry.
//!
//! Each resource type gets one slot holding its loader and an
//! id -> weak-reference cache. A lookup returns the cached value while any
//! strong reference to it is alive; otherwise the file is read again.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace};

use crate::error::{ResourceError, ResourceResult};
use crate::id::ResourceId;

/// Typed loader for one resource type.
///
/// `load` may call back into `store` to resolve resources of other types.
/// Nothing guards against two ids that require each other; such a pair
/// recurses until the stack overflows.
pub trait ResourceLoader: 'static {
    type Resource: 'static;

    /// Directory that ids are resolved against.
    fn dir(&self) -> &Path;

    fn load(
        &self,
        id: &ResourceId,
        json: serde_json::Value,
        store: &mut LazyResourceStore,
    ) -> ResourceResult<Self::Resource>;
}

/// Object-safe face of [`ResourceLoader`], stored per slot.
trait ErasedLoader {
    fn dir(&self) -> &Path;

    fn load_erased(
        &self,
        id: &ResourceId,
        json: serde_json::Value,
        store: &mut LazyResourceStore,
    ) -> ResourceResult<Rc<dyn Any>>;
}

impl<L: ResourceLoader> ErasedLoader for L {
    fn dir(&self) -> &Path {
        ResourceLoader::dir(self)
    }

    fn load_erased(
        &self,
        id: &ResourceId,
        json: serde_json::Value,
        store: &mut LazyResourceStore,
    ) -> ResourceResult<Rc<dyn Any>> {
        let loaded: Rc<dyn Any> = Rc::new(self.load(id, json, store)?);
        Ok(loaded)
    }
}

struct Slot {
    type_name: &'static str,
    loader: Rc<dyn ErasedLoader>,
    cache: HashMap<ResourceId, Weak<dyn Any>>,
}

/// Registry mapping a resource type plus a string id to a shared instance.
#[derive(Default)]
pub struct LazyResourceStore {
    slots: HashMap<TypeId, Slot>,
}

impl LazyResourceStore {
    /// Performs no I/O.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `loader` to its resource type. Each type takes one loader.
    pub fn register_loader<L: ResourceLoader>(&mut self, loader: L) -> ResourceResult<()> {
        let key = TypeId::of::<L::Resource>();
        let type_name = type_name::<L::Resource>();
        if self.slots.contains_key(&key) {
            return Err(ResourceError::AlreadyRegistered { type_name });
        }
        debug!(type_name, dir = %loader.dir().display(), "registered resource loader");
        self.slots.insert(
            key,
            Slot {
                type_name,
                loader: Rc::new(loader),
                cache: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// File that `id` resolves to for resource type `T`.
    pub fn resource_path<T: 'static>(&self, id: &str) -> ResourceResult<PathBuf> {
        let slot = self.slot::<T>(id)?;
        Ok(resolve_path(slot.loader.dir(), &ResourceId::new(id)))
    }

    /// The live cached instance, without touching the filesystem.
    pub fn cached<T: 'static>(&self, id: &str) -> Option<Rc<T>> {
        self.slots
            .get(&TypeId::of::<T>())?
            .cache
            .get(id)?
            .upgrade()?
            .downcast::<T>()
            .ok()
    }

    /// Number of instances of `T` that are currently alive in the cache.
    pub fn live_count<T: 'static>(&self) -> usize {
        self.slots
            .get(&TypeId::of::<T>())
            .map_or(0, |slot| slot.cache.values().filter(|w| w.strong_count() > 0).count())
    }

    /// Forget cache entries whose resources have been dropped.
    pub fn purge_expired(&mut self) {
        for slot in self.slots.values_mut() {
            slot.cache.retain(|_, weak| weak.strong_count() > 0);
        }
    }

    /// Get a cached resource or load it from disk.
    ///
    /// Any failure while reading, parsing or loading is wrapped in
    /// [`ResourceError::Load`] with the type name and id; the cache keeps no
    /// entry, so the next call retries from disk.
    pub fn try_get<T: 'static>(&mut self, id: &str) -> ResourceResult<Rc<T>> {
        let slot = self.slot::<T>(id)?;
        let type_name = slot.type_name;

        if let Some(live) = slot.cache.get(id).and_then(Weak::upgrade) {
            debug!(type_name, id, "resource cache hit");
            return downcast::<T>(live, type_name, id);
        }

        let loader = Rc::clone(&slot.loader);
        let rid = ResourceId::new(id);
        let path = resolve_path(loader.dir(), &rid);
        trace!(type_name, path = %path.display(), "resource not cached, loading");

        let loaded = read_json(&path)
            .and_then(|json| loader.load_erased(&rid, json, self))
            .map_err(|e| {
                error!(type_name, id, error = %e, "failed to load resource");
                ResourceError::Load {
                    type_name,
                    id: id.to_string(),
                    source: Box::new(e),
                }
            })?;

        if let Some(slot) = self.slots.get_mut(&TypeId::of::<T>()) {
            slot.cache.insert(rid, Rc::downgrade(&loaded));
        }
        downcast::<T>(loaded, type_name, id)
    }

    fn slot<T: 'static>(&self, id: &str) -> ResourceResult<&Slot> {
        self.slots
            .get(&TypeId::of::<T>())
            .ok_or_else(|| ResourceError::Unregistered {
                type_name: type_name::<T>(),
                id: id.to_string(),
            })
    }
}

impl std::fmt::Debug for LazyResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for slot in self.slots.values() {
            map.entry(&slot.type_name, &slot.cache.len());
        }
        map.finish()
    }
}

/// `{dir}/{id with '.' as '/'}.json`
fn resolve_path(dir: &Path, id: &ResourceId) -> PathBuf {
    let mut path = dir.join(id.to_relative_path());
    path.as_mut_os_string().push(".json");
    path
}

fn read_json(path: &Path) -> ResourceResult<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ResourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ResourceError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| ResourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn downcast<T: 'static>(value: Rc<dyn Any>, type_name: &'static str, id: &str) -> ResourceResult<Rc<T>> {
    value.downcast::<T>().map_err(|_| {
        ResourceError::Invalid(format!(
            "cached value for '{id}' is not a {type_name}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Note {
        text: String,
    }

    struct NoteLoader {
        dir: PathBuf,
        loads: Rc<Cell<usize>>,
    }

    impl ResourceLoader for NoteLoader {
        type Resource = Note;

        fn dir(&self) -> &Path {
            &self.dir
        }

        fn load(
            &self,
            _id: &ResourceId,
            json: serde_json::Value,
            _store: &mut LazyResourceStore,
        ) -> ResourceResult<Note> {
            self.loads.set(self.loads.get() + 1);
            let text = json
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ResourceError::Invalid("missing text".into()))?;
            Ok(Note {
                text: text.to_string(),
            })
        }
    }

    fn store_with_notes(dir: &Path) -> (LazyResourceStore, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        let mut store = LazyResourceStore::new();
        store
            .register_loader(NoteLoader {
                dir: dir.to_path_buf(),
                loads: Rc::clone(&loads),
            })
            .unwrap();
        (store, loads)
    }

    #[test]
    fn resolves_dotted_ids_to_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        std::fs::write(tmp.path().join("a/b/c.json"), r#"{"text": "hi"}"#).unwrap();

        let (mut store, _) = store_with_notes(tmp.path());
        assert_eq!(
            store.resource_path::<Note>("a.b.c").unwrap(),
            tmp.path().join("a").join("b").join("c.json")
        );
        let note = store.try_get::<Note>("a.b.c").unwrap();
        assert_eq!(note.text, "hi");
    }

    #[test]
    fn cache_holds_weakly() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("n.json"), r#"{"text": "x"}"#).unwrap();
        let (mut store, loads) = store_with_notes(tmp.path());

        let first = store.try_get::<Note>("n").unwrap();
        let second = store.try_get::<Note>("n").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(loads.get(), 1);
        assert_eq!(store.live_count::<Note>(), 1);

        drop(first);
        drop(second);
        assert!(store.cached::<Note>("n").is_none());
        assert_eq!(store.live_count::<Note>(), 0);

        let _third = store.try_get::<Note>("n").unwrap();
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn unregistered_type_fails() {
        let mut store = LazyResourceStore::new();
        let err = store.try_get::<Note>("n").unwrap_err();
        assert!(matches!(err, ResourceError::Unregistered { ref id, .. } if id == "n"));
        assert!(err.is_not_found());
    }

    #[test]
    fn second_registration_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut store, loads) = store_with_notes(tmp.path());
        let err = store
            .register_loader(NoteLoader {
                dir: tmp.path().to_path_buf(),
                loads,
            })
            .unwrap_err();
        assert!(matches!(err, ResourceError::AlreadyRegistered { .. }));
    }

    #[test]
    fn failed_load_leaves_no_entry_and_retries() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.json"), r#"{"nope": 1}"#).unwrap();
        let (mut store, loads) = store_with_notes(tmp.path());

        let err = store.try_get::<Note>("bad").unwrap_err();
        match &err {
            ResourceError::Load { id, source, .. } => {
                assert_eq!(id, "bad");
                assert!(matches!(**source, ResourceError::Invalid(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(store.cached::<Note>("bad").is_none());

        std::fs::write(tmp.path().join("bad.json"), r#"{"text": "fixed"}"#).unwrap();
        assert_eq!(store.try_get::<Note>("bad").unwrap().text, "fixed");
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn missing_and_malformed_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();
        let (mut store, _) = store_with_notes(tmp.path());

        let missing = store.try_get::<Note>("ghost").unwrap_err();
        assert!(missing.is_not_found());

        let broken = store.try_get::<Note>("broken").unwrap_err();
        assert!(matches!(broken.root(), ResourceError::Json { .. }));
        assert!(broken.is_not_found());
    }

    #[test]
    fn purge_drops_dead_entries() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("n.json"), r#"{"text": "x"}"#).unwrap();
        let (mut store, _) = store_with_notes(tmp.path());
        drop(store.try_get::<Note>("n").unwrap());
        store.purge_expired();
        assert_eq!(format!("{store:?}"), format!("{{{:?}: 0}}", type_name::<Note>()));
    }
}
