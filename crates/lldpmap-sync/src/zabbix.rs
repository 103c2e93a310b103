//! Zabbix JSON-RPC map store.
//!
//! Talks to `api_jsonrpc.php` with a pre-issued API token sent as a bearer
//! credential. Only the four methods the reconciler needs are used:
//! `map.get`, `map.create`, `map.update` and `image.get`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lldpmap_error::{Error, ErrorKind, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::map::{MapId, MapSpec};
use crate::store::{IconCatalog, MapStore};

const API_PATH: &str = "api_jsonrpc.php";
/// `ADVANCED_LABELS`
const LABEL_FORMAT: u8 = 1;
/// `LABEL_TYPE_LABEL`
const LABEL_TYPE_IMAGE: u8 = 0;
/// Map element of type host.
const ELEMENT_TYPE_HOST: u8 = 0;

#[derive(Debug, Clone)]
pub struct ZabbixConfig {
    /// Frontend base url or the full `api_jsonrpc.php` url.
    pub url: String,
    pub token: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub timeout: Duration,
}

impl ZabbixConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The JSON-RPC endpoint for [`Self::url`].
    pub fn endpoint(&self) -> String {
        let url = self.url.trim().trim_end_matches('/');
        if url.ends_with(".php") {
            url.to_string()
        } else {
            format!("{url}/{API_PATH}")
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcError {
    fn describe(&self) -> String {
        match &self.data {
            Some(Value::String(data)) if !data.is_empty() => format!("{} {}", self.message, data),
            Some(data) if !data.is_null() => format!("{} {}", self.message, data),
            _ => self.message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapRecord {
    sysmapid: String,
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    imageid: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedMaps {
    sysmapids: Vec<String>,
}

pub struct ZabbixMapStore {
    client: Client,
    endpoint: String,
    token: String,
    request_id: AtomicU64,
}

impl ZabbixMapStore {
    pub fn connect(config: &ZabbixConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::config_invalid("zabbix url is empty").with_operation("zabbix::connect"));
        }
        if config.token.trim().is_empty() {
            return Err(
                Error::config_invalid("zabbix api token is empty").with_operation("zabbix::connect")
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|err| {
                Error::config_invalid(format!("cannot build http client: {err}"))
                    .with_operation("zabbix::connect")
                    .set_source(err)
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            token: config.token.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(method, id, "zabbix request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|err| transport_error(method, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote_unavailable(format!("{method} returned http {status}"))
                .with_context("method", method)
                .with_context("status", status.as_u16().to_string()));
        }

        let envelope: RpcResponse = response.json().map_err(|err| transport_error(method, err))?;
        let result = rpc_result(method, envelope)?;
        serde_json::from_value(result).map_err(|err| {
            Error::new(
                ErrorKind::DeserializationFailed,
                format!("unexpected {method} result: {err}"),
            )
            .with_context("method", method)
            .set_source(err)
        })
    }
}

fn transport_error(method: &'static str, err: reqwest::Error) -> Error {
    let error = if err.is_timeout() {
        Error::timeout(format!("{method} timed out"))
    } else if err.is_decode() {
        Error::new(
            ErrorKind::DeserializationFailed,
            format!("{method} returned a malformed response"),
        )
    } else {
        Error::remote_unavailable(format!("{method} failed: {err}"))
    };
    error.with_context("method", method).set_source(err)
}

fn rpc_result(method: &'static str, envelope: RpcResponse) -> Result<Value> {
    if let Some(error) = envelope.error {
        return Err(Error::remote_rejected(method, error.code, error.describe()));
    }
    envelope.result.ok_or_else(|| {
        Error::new(
            ErrorKind::DeserializationFailed,
            format!("{method} response has neither result nor error"),
        )
        .with_context("method", method)
    })
}

/// `map.create` / `map.update` parameters for `spec`.
pub fn map_params(spec: &MapSpec) -> Value {
    let selements: Vec<Value> = spec
        .elements
        .iter()
        .map(|element| {
            let mut value = json!({
                "selementid": element.ordinal.to_string(),
                "elements": [{"hostid": element.host_id}],
                "x": element.x,
                "y": element.y,
                "use_iconmap": 0,
                "elementtype": ELEMENT_TYPE_HOST,
            });
            if let Some(icon) = &element.icon_id {
                value["iconid_off"] = json!(icon);
            }
            value
        })
        .collect();

    let links: Vec<Value> = spec
        .links
        .iter()
        .map(|link| {
            let mut value = json!({
                "selementid1": link.from.to_string(),
                "selementid2": link.to.to_string(),
            });
            if let Some(color) = &link.color {
                value["color"] = json!(color);
            }
            value
        })
        .collect();

    json!({
        "name": spec.name,
        "width": spec.width,
        "height": spec.height,
        "label_format": LABEL_FORMAT,
        "label_type_image": LABEL_TYPE_IMAGE,
        "selements": selements,
        "links": links,
    })
}

/// `map.update` parameters that strip a map down to nothing.
pub fn clear_params(id: &MapId) -> Value {
    json!({
        "sysmapid": id.as_str(),
        "links": [],
        "selements": [],
        "urls": [],
    })
}

impl MapStore for ZabbixMapStore {
    fn find_map(&self, name: &str) -> Result<Option<MapId>> {
        let params = json!({
            "output": ["sysmapid", "name"],
            "filter": {"name": name},
        });
        let maps: Vec<MapRecord> = self.call("map.get", params).map_err(|err| {
            Error::map_lookup_failed(name, err.message().to_string())
                .with_operation("zabbix::find_map")
                .set_source(err)
        })?;
        Ok(maps.into_iter().next().map(|record| MapId::new(record.sysmapid)))
    }

    fn clear_map(&self, id: &MapId) -> Result<()> {
        self.call::<Value>("map.update", clear_params(id))
            .map_err(|err| {
                Error::map_update_failed(id.as_str(), err.message().to_string())
                    .with_operation("zabbix::clear_map")
                    .set_source(err)
            })?;
        Ok(())
    }

    fn update_map(&self, id: &MapId, spec: &MapSpec) -> Result<()> {
        let mut params = map_params(spec);
        params["sysmapid"] = json!(id.as_str());
        self.call::<Value>("map.update", params).map_err(|err| {
            Error::map_update_failed(id.as_str(), err.message().to_string())
                .with_operation("zabbix::update_map")
                .with_context("name", spec.name.as_str())
                .set_source(err)
        })?;
        Ok(())
    }

    fn create_map(&self, spec: &MapSpec) -> Result<MapId> {
        let created: CreatedMaps = self.call("map.create", map_params(spec)).map_err(|err| {
            Error::map_create_failed(spec.name.as_str(), err.message().to_string())
                .with_operation("zabbix::create_map")
                .set_source(err)
        })?;
        created
            .sysmapids
            .into_iter()
            .next()
            .map(MapId::new)
            .ok_or_else(|| {
                Error::map_create_failed(spec.name.as_str(), "map.create returned no id")
                    .with_operation("zabbix::create_map")
            })
    }

    fn icon_catalog(&self) -> Result<IconCatalog> {
        let params = json!({"output": ["imageid", "name"]});
        let images: Vec<ImageRecord> = self
            .call("image.get", params)
            .map_err(|err| err.with_operation("zabbix::icon_catalog"))?;
        Ok(images
            .into_iter()
            .map(|image| (image.name, image.imageid))
            .collect())
    }
}
