use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lldpmap_core::{DeviceId, Edge, EdgeStyle, Graph, Node, Pixel, PixelLayout};
use lldpmap_error::ErrorKind;
use lldpmap_sync::zabbix::clear_params;
use lldpmap_sync::{
    MapId, MapOutcome, MapReconciler, MapRequest, MapStore, ZabbixConfig, ZabbixMapStore,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[derive(Debug)]
struct Recorded {
    path: String,
    authorization: Option<String>,
    method: String,
    params: Value,
}

/// Answer one request per canned envelope, in order, then stop.
fn serve(envelopes: Vec<Value>) -> (String, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for mut envelope in envelopes {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let path = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string();

            let mut content_length = 0;
            let mut authorization = None;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    match name.to_ascii_lowercase().as_str() {
                        "content-length" => content_length = value.trim().parse().unwrap(),
                        "authorization" => authorization = Some(value.trim().to_string()),
                        _ => {}
                    }
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            let request: Value = serde_json::from_slice(&body).unwrap();

            envelope["jsonrpc"] = json!("2.0");
            envelope["id"] = request["id"].clone();
            let payload = envelope.to_string();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            )
            .unwrap();
            stream.flush().unwrap();

            recorded.push(Recorded {
                path,
                authorization,
                method: request["method"].as_str().unwrap_or_default().to_string(),
                params: request["params"].clone(),
            });
        }
        recorded
    });
    (url, handle)
}

fn connect(url: &str) -> ZabbixMapStore {
    ZabbixMapStore::connect(&ZabbixConfig::new(url, "secret").timeout(Duration::from_secs(5)))
        .unwrap()
}

fn graph() -> (Graph, PixelLayout) {
    let mut graph = Graph::new();
    for (key, id) in [("sw1", "10101"), ("sw2", "10102")] {
        graph.add_node(Node {
            key: key.into(),
            external_id: DeviceId::new(id),
            label: key.into(),
            icon: None,
        });
    }
    graph.add_edge(Edge {
        tail: "sw1".into(),
        head: "sw2".into(),
        speed: 1000,
        style: EdgeStyle::default(),
        head_label: None,
        tail_label: None,
    });
    let pixels = [
        ("sw1".to_string(), Pixel::new(100, 200)),
        ("sw2".to_string(), Pixel::new(300, 400)),
    ]
    .into_iter()
    .collect();
    (graph, pixels)
}

fn request() -> MapRequest {
    MapRequest {
        name: "LLDP Devices".into(),
        width: 1280,
        height: 720,
        default_icon: "Switch_(48)".into(),
    }
}

#[test]
fn test_existing_map_is_cleared_then_updated() {
    let (url, server) = serve(vec![
        json!({"result": [{"imageid": "7", "name": "Switch_(48)"}, {"imageid": "9", "name": "Router_(48)"}]}),
        json!({"result": [{"sysmapid": "3", "name": "LLDP Devices"}]}),
        json!({"result": {"sysmapids": ["3"]}}),
        json!({"result": {"sysmapids": ["3"]}}),
    ]);
    let store = connect(&url);
    let (graph, pixels) = graph();

    let outcome = MapReconciler::new(&store)
        .publish(&graph, &pixels, &request())
        .unwrap();
    assert_eq!(outcome, MapOutcome::Updated(MapId::new("3")));

    let recorded = server.join().unwrap();
    let methods: Vec<_> = recorded.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["image.get", "map.get", "map.update", "map.update"]);
    assert!(recorded.iter().all(|r| r.path == "/api_jsonrpc.php"));
    assert!(recorded.iter().all(|r| r.authorization.as_deref() == Some("Bearer secret")));

    assert_eq!(recorded[1].params["filter"], json!({"name": "LLDP Devices"}));
    assert_eq!(recorded[2].params, clear_params(&MapId::new("3")));

    let update = &recorded[3].params;
    assert_eq!(update["sysmapid"], json!("3"));
    assert_eq!(update["label_format"], json!(1));
    assert_eq!(update["label_type_image"], json!(0));
    assert_eq!(
        update["selements"][1],
        json!({"selementid": "2", "elements": [{"hostid": "10102"}], "x": 300, "y": 400,
               "use_iconmap": 0, "elementtype": 0, "iconid_off": "7"})
    );
    assert_eq!(update["links"], json!([{"selementid1": "1", "selementid2": "2"}]));
}

#[test]
fn test_missing_map_is_created() {
    let (url, server) = serve(vec![
        json!({"result": []}),
        json!({"result": []}),
        json!({"result": {"sysmapids": ["12"]}}),
    ]);
    let store = connect(&url);
    let (graph, pixels) = graph();

    let outcome = MapReconciler::new(&store)
        .publish(&graph, &pixels, &request())
        .unwrap();
    assert_eq!(outcome, MapOutcome::Created(MapId::new("12")));

    let recorded = server.join().unwrap();
    assert_eq!(recorded[2].method, "map.create");
    assert_eq!(recorded[2].params["name"], json!("LLDP Devices"));
    assert_eq!(recorded[2].params.get("sysmapid"), None);
    // No icon catalog entry, so no icon id is sent.
    assert_eq!(recorded[2].params["selements"][0].get("iconid_off"), None);
}

#[test]
fn test_rejected_lookup_aborts() {
    let (url, server) = serve(vec![
        json!({"result": []}),
        json!({"error": {"code": -32500, "message": "Application error.", "data": "No permissions."}}),
    ]);
    let store = connect(&url);
    let (graph, pixels) = graph();

    let err = MapReconciler::new(&store)
        .publish(&graph, &pixels, &request())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MapLookupFailed);
    assert_eq!(err.context_value("map"), Some("LLDP Devices"));
    assert!(err.message().contains("No permissions."));

    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn test_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = connect(&url).icon_catalog().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
    assert!(err.is_retryable());
}
