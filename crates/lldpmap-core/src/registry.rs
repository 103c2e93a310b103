//! Device snapshot handed over by the telemetry collector.
//!
//! The registry is the input boundary of a run: it holds every monitored
//! device with its inventory attributes and the LLDP neighbor table polled
//! from it. It is fully materialized before the topology is built and is
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use lldpmap_error::{Error, Result};

/// External inventory identifier of a device (the Zabbix host id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(#[serde(deserialize_with = "text")] String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interface speed as the device reported it.
///
/// Collectors forward whatever the agent returned, so the value may be a
/// number, a numeric string, or garbage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkSpeed {
    Bits(u64),
    Text(String),
    Malformed(serde_json::Value),
}

impl LinkSpeed {
    /// Bits per second, or `None` when the reported value is unusable.
    pub fn bits_per_second(&self) -> Option<u64> {
        match self {
            LinkSpeed::Bits(bits) => Some(*bits),
            LinkSpeed::Text(text) => text.trim().parse().ok(),
            LinkSpeed::Malformed(_) => None,
        }
    }
}

/// Scalar JSON values as text. Collectors send SNMP values either way.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Required text field: a string or a number.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a string or number, found {value}")))
}

/// Optional text field; anything that is not a scalar counts as absent.
fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// Text field that falls back to empty.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

/// Integer field given as a number or a numeric string (`"7"`).
fn lenient_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// String map that keeps scalar values and drops the rest.
fn text_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| scalar_text(&value).map(|text| (key, text)))
        .collect())
}

/// One LLDP remote-table row, as seen from a local port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborObservation {
    /// `lldpRemSysName` (or chassis id) of the peer.
    #[serde(default, deserialize_with = "optional_text")]
    pub remote_system_name: Option<String>,
    /// `lldpRemPortId`
    #[serde(default, deserialize_with = "lenient_text")]
    pub remote_port_id: String,
    /// `lldpRemPortIdSubtype`
    #[serde(default, deserialize_with = "lenient_integer")]
    pub remote_port_subtype: Option<i64>,
    /// `lldpRemPortDesc`
    #[serde(default, deserialize_with = "optional_text")]
    pub remote_port_description: Option<String>,
    /// Speed of the local interface the neighbor was seen on.
    #[serde(default)]
    pub link_speed: Option<LinkSpeed>,
}

impl NeighborObservation {
    /// The remote system name, if it is present and not blank.
    pub fn remote_name(&self) -> Option<&str> {
        self.remote_system_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Reported speed in bits per second, `None` if missing or malformed.
    pub fn speed_bits(&self) -> Option<u64> {
        self.link_speed.as_ref().and_then(LinkSpeed::bits_per_second)
    }
}

/// Optional parts of a device record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDetails {
    /// Inventory attributes used by the node label template.
    #[serde(default, deserialize_with = "text_map")]
    pub inventory: BTreeMap<String, String>,
    /// Local port identifier -> neighbor seen on that port.
    #[serde(default)]
    pub neighbors: BTreeMap<String, NeighborObservation>,
}

/// A monitored network device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    id: DeviceId,
    #[serde(deserialize_with = "text")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    system_name: Option<String>,
    #[serde(flatten)]
    details: DeviceDetails,
}

impl Device {
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        system_name: impl Into<String>,
        details: DeviceDetails,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            system_name: Some(system_name.into()),
            details,
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Display name from the inventory system.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical LLDP system name; `None` while the device is unidentified.
    pub fn system_name(&self) -> Option<&str> {
        self.system_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn inventory(&self) -> &BTreeMap<String, String> {
        &self.details.inventory
    }

    pub fn neighbors(&self) -> &BTreeMap<String, NeighborObservation> {
        &self.details.neighbors
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<Value>),
    Wrapped { devices: Vec<Value> },
}

/// Decode one device record, dropping neighbor rows that are not objects.
///
/// Returns the device (if its record is usable) and the number of records
/// dropped along the way.
fn decode_device(mut record: Value, position: usize) -> (Option<Device>, usize) {
    let label = record
        .get("id")
        .and_then(scalar_text)
        .unwrap_or_else(|| format!("#{position}"));

    let rows = match &mut record {
        Value::Object(fields) => fields.remove("neighbors"),
        _ => None,
    };
    let mut dropped = 0;
    let mut neighbors = BTreeMap::new();
    match rows {
        None | Some(Value::Null) => {}
        Some(Value::Object(rows)) => {
            for (port, row) in rows {
                match serde_json::from_value::<NeighborObservation>(row) {
                    Ok(obs) => {
                        neighbors.insert(port, obs);
                    }
                    Err(err) => {
                        warn!(device = %label, port = %port, error = %err, "dropping neighbor row");
                        dropped += 1;
                    }
                }
            }
        }
        Some(other) => {
            warn!(device = %label, found = %other, "neighbor table is not an object, ignoring it");
            dropped += 1;
        }
    }

    match serde_json::from_value::<Device>(record) {
        Ok(mut device) => {
            device.details.neighbors = neighbors;
            (Some(device), dropped)
        }
        Err(err) => {
            warn!(device = %label, error = %err, "dropping device record");
            (None, dropped + 1)
        }
    }
}

/// The full device set for one run, in collector order.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    dropped: usize,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            dropped: 0,
        }
    }

    /// Parse a JSON snapshot: either a bare array of devices or
    /// `{"devices": [...]}`. `origin` is only used in error context.
    ///
    /// Only a document that is not a device list at all is an error. Device
    /// records and neighbor rows that cannot be read are dropped and counted
    /// in [`Self::dropped`].
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(text).map_err(|err| {
            Error::snapshot_invalid(origin, err.to_string())
                .with_operation("registry::from_json_str")
                .set_source(err)
        })?;
        let records = match snapshot {
            Snapshot::List(records) | Snapshot::Wrapped { devices: records } => records,
        };

        let mut registry = Self::default();
        for (position, record) in records.into_iter().enumerate() {
            let (device, dropped) = decode_device(record, position);
            registry.dropped += dropped;
            registry.devices.extend(device);
        }
        Ok(registry)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::read_failed(origin.clone(), err).with_operation("registry::from_json_file")
        })?;
        let registry = Self::from_json_str(&text, &origin)?;
        info!(
            path = %origin,
            devices = registry.len(),
            dropped = registry.dropped(),
            "device snapshot loaded"
        );
        Ok(registry)
    }

    /// Device records and neighbor rows skipped while loading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<Device> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lldpmap_error::ErrorKind;

    #[test]
    fn test_link_speed_variants() {
        assert_eq!(LinkSpeed::Bits(1_000_000_000).bits_per_second(), Some(1_000_000_000));
        assert_eq!(LinkSpeed::Text(" 100000000 ".into()).bits_per_second(), Some(100_000_000));
        assert_eq!(LinkSpeed::Text("fast".into()).bits_per_second(), None);
        assert_eq!(
            LinkSpeed::Malformed(serde_json::json!(-5)).bits_per_second(),
            None
        );
    }

    #[test]
    fn test_blank_names_are_absent() {
        let device = Device::new(DeviceId::new("1"), "sw1", "   ", DeviceDetails::default());
        assert_eq!(device.system_name(), None);

        let obs = NeighborObservation {
            remote_system_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(obs.remote_name(), None);
    }

    #[test]
    fn test_snapshot_forms() {
        let bare = r#"[{"id": "10", "name": "core-1", "system_name": "core-1.lan"}]"#;
        let registry = DeviceRegistry::from_json_str(bare, "inline").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.devices()[0].system_name(), Some("core-1.lan"));

        let wrapped = r#"{"devices": [
            {"id": "11", "name": "edge-1",
             "inventory": {"model": "EX2300"},
             "neighbors": {"ge-0/0/1": {"remote_system_name": "core-1.lan",
                                        "remote_port_id": "xe-0/0/3",
                                        "link_speed": 1.5}}}
        ]}"#;
        let registry = DeviceRegistry::from_json_str(wrapped, "inline").unwrap();
        let device = &registry.devices()[0];
        assert_eq!(device.system_name(), None);
        assert_eq!(device.inventory()["model"], "EX2300");
        assert_eq!(device.neighbors()["ge-0/0/1"].speed_bits(), None);
    }

    #[test]
    fn test_snapshot_invalid() {
        let err = DeviceRegistry::from_json_str("{\"hosts\": []}", "bad.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SnapshotInvalid);
        assert_eq!(err.context_value("path"), Some("bad.json"));
    }

    #[test]
    fn test_bad_records_are_dropped_not_fatal() {
        let text = r#"[
            {"id": "1", "name": "core", "system_name": "core.lan",
             "inventory": {"model": "C9500", "slots": 4, "tags": ["a"]},
             "neighbors": {
                "Gi1/0/1": {"remote_system_name": "access.lan", "remote_port_id": "Gi0/1",
                            "remote_port_subtype": "7", "remote_port_description": "uplink"},
                "Gi1/0/2": {"remote_system_name": "edge.lan", "remote_port_id": 2,
                            "remote_port_subtype": 5},
                "Gi1/0/3": "not a row"
             }},
            {"id": 2, "name": "access", "system_name": "access.lan",
             "neighbors": {"Gi0/1": {"remote_system_name": "core.lan",
                                     "remote_port_subtype": {"bad": true}}}},
            {"id": "3", "name": "edge", "system_name": "edge.lan", "neighbors": []},
            {"name": "no-id"},
            42
        ]"#;
        let registry = DeviceRegistry::from_json_str(text, "inline").unwrap();
        let ids: Vec<_> = registry.iter().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        // One bad row, one bad neighbor table, two bad device records.
        assert_eq!(registry.dropped(), 4);

        let core = &registry.devices()[0];
        assert_eq!(core.inventory().get("slots").map(String::as_str), Some("4"));
        assert_eq!(core.inventory().get("tags"), None);
        assert_eq!(core.neighbors().len(), 2);
        assert_eq!(core.neighbors()["Gi1/0/1"].remote_port_subtype, Some(7));
        assert_eq!(core.neighbors()["Gi1/0/2"].remote_port_id, "2");

        let access = &registry.devices()[1];
        assert_eq!(access.neighbors()["Gi0/1"].remote_port_subtype, None);
        assert_eq!(access.neighbors()["Gi0/1"].remote_port_id, "");
        assert!(registry.devices()[2].neighbors().is_empty());
    }
}
