//! Publishing the topology as a remote network map.
//!
//! [`MapReconciler`] computes the desired [`MapSpec`] and replaces the
//! remote map through a [`MapStore`]. [`ZabbixMapStore`] speaks the Zabbix
//! JSON-RPC API; [`MemoryMapStore`] keeps everything in process.

pub mod map;
pub mod reconcile;
pub mod store;
pub mod zabbix;

pub use map::{MapElement, MapId, MapLink, MapRequest, MapSpec, link_color};
pub use reconcile::{MapOutcome, MapReconciler, desired_map};
pub use store::{IconCatalog, MapStore, MemoryMapStore, StoreOp};
pub use zabbix::{ZabbixConfig, ZabbixMapStore};
