//! Transport seam between the reconciler and the remote map service.

use std::collections::BTreeMap;

use lldpmap_error::{Error, Result};
use parking_lot::Mutex;
use strum_macros::{Display, IntoStaticStr};

use crate::map::{MapId, MapSpec};

/// Icon name -> remote icon id.
pub type IconCatalog = BTreeMap<String, String>;

pub trait MapStore {
    /// Look up a map by exact name.
    fn find_map(&self, name: &str) -> Result<Option<MapId>>;

    /// Remove every element, link and url from an existing map.
    fn clear_map(&self, id: &MapId) -> Result<()>;

    fn update_map(&self, id: &MapId, spec: &MapSpec) -> Result<()>;

    fn create_map(&self, spec: &MapSpec) -> Result<MapId>;

    fn icon_catalog(&self) -> Result<IconCatalog>;
}

/// Store operations, as recorded by [`MemoryMapStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOp {
    FindMap,
    ClearMap,
    UpdateMap,
    CreateMap,
    IconCatalog,
}

#[derive(Debug, Default)]
struct MemoryState {
    maps: BTreeMap<MapId, MapSpec>,
    next_id: u64,
    calls: Vec<StoreOp>,
}

/// In-process map store used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryMapStore {
    icons: IconCatalog,
    fail_on: Option<StoreOp>,
    state: Mutex<MemoryState>,
}

impl MemoryMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icons<I, K, V>(mut self, icons: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.icons = icons
            .into_iter()
            .map(|(name, id)| (name.into(), id.into()))
            .collect();
        self
    }

    /// Make every call of `op` fail with a remote error.
    pub fn failing_on(mut self, op: StoreOp) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Current content of the map called `name`.
    pub fn map(&self, name: &str) -> Option<MapSpec> {
        self.state
            .lock()
            .maps
            .values()
            .find(|spec| spec.name == name)
            .cloned()
    }

    pub fn map_count(&self) -> usize {
        self.state.lock().maps.len()
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.state.lock().calls.clone()
    }

    fn record(&self, op: StoreOp) -> Result<parking_lot::MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock();
        state.calls.push(op);
        if self.fail_on == Some(op) {
            return Err(Error::remote_unavailable(format!("injected failure in {op}"))
                .with_operation(op.into()));
        }
        Ok(state)
    }
}

impl MapStore for MemoryMapStore {
    fn find_map(&self, name: &str) -> Result<Option<MapId>> {
        let state = self.record(StoreOp::FindMap)?;
        Ok(state
            .maps
            .iter()
            .find(|(_, spec)| spec.name == name)
            .map(|(id, _)| id.clone()))
    }

    fn clear_map(&self, id: &MapId) -> Result<()> {
        let mut state = self.record(StoreOp::ClearMap)?;
        let spec = state
            .maps
            .get_mut(id)
            .ok_or_else(|| Error::map_update_failed(id.as_str(), "no such map"))?;
        *spec = spec.cleared();
        Ok(())
    }

    fn update_map(&self, id: &MapId, spec: &MapSpec) -> Result<()> {
        let mut state = self.record(StoreOp::UpdateMap)?;
        let slot = state
            .maps
            .get_mut(id)
            .ok_or_else(|| Error::map_update_failed(id.as_str(), "no such map"))?;
        *slot = spec.clone();
        Ok(())
    }

    fn create_map(&self, spec: &MapSpec) -> Result<MapId> {
        let mut state = self.record(StoreOp::CreateMap)?;
        if state.maps.values().any(|existing| existing.name == spec.name) {
            return Err(Error::map_create_failed(
                spec.name.as_str(),
                "a map with this name already exists",
            ));
        }
        state.next_id += 1;
        let id = MapId::new(state.next_id.to_string());
        state.maps.insert(id.clone(), spec.clone());
        Ok(id)
    }

    fn icon_catalog(&self) -> Result<IconCatalog> {
        let _state = self.record(StoreOp::IconCatalog)?;
        Ok(self.icons.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lldpmap_error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn spec(name: &str) -> MapSpec {
        MapSpec {
            name: name.to_string(),
            width: 100,
            height: 100,
            elements: Vec::new(),
            links: Vec::new(),
        }
    }

    #[test]
    fn test_create_then_find() {
        let store = MemoryMapStore::new();
        assert_eq!(store.find_map("m").unwrap(), None);
        let id = store.create_map(&spec("m")).unwrap();
        assert_eq!(store.find_map("m").unwrap(), Some(id));
        assert_eq!(store.map_count(), 1);
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let store = MemoryMapStore::new();
        store.create_map(&spec("m")).unwrap();
        let err = store.create_map(&spec("m")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MapCreateFailed);
    }

    #[test]
    fn test_update_unknown_map() {
        let store = MemoryMapStore::new();
        let err = store.update_map(&MapId::new("42"), &spec("m")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MapUpdateFailed);
    }

    #[test]
    fn test_injected_failure_is_recorded() {
        let store = MemoryMapStore::new().failing_on(StoreOp::FindMap);
        let err = store.find_map("m").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert_eq!(err.operation(), "find_map");
        assert_eq!(store.calls(), vec![StoreOp::FindMap]);
    }

    #[test]
    fn test_icon_catalog() {
        let store = MemoryMapStore::new().with_icons([("Switch_(48)", "7")]);
        assert_eq!(store.icon_catalog().unwrap().get("Switch_(48)").map(String::as_str), Some("7"));
    }
}
