use std::fs;

use lldpmap_core::{
    Canvas, DeviceRegistry, ErrorKind, Graph, LayoutEngine, LayoutProgram, MapConfig, Point,
    StaticLayout, TopologyBuilder,
};
use pretty_assertions::assert_eq;

#[test]
fn test_load_all_inputs_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("lldpmap.toml");
    fs::write(
        &config_path,
        r##"
map_name = "Lab"
layout = "fdp"
port_labels = false

[[speed_styles]]
speed = 100
color = "#FF0000"
"##,
    )
    .unwrap();

    let devices_path = dir.path().join("devices.json");
    fs::write(
        &devices_path,
        r#"{"devices": [
            {"id": "1", "name": "a", "system_name": "a.lab",
             "neighbors": {"1": {"remote_system_name": "b.lab", "remote_port_id": "2",
                                 "link_speed": "100000000"}}},
            {"id": "2", "name": "b", "system_name": "b.lab"}
        ]}"#,
    )
    .unwrap();

    let positions_path = dir.path().join("positions.json");
    fs::write(
        &positions_path,
        r#"{"a.lab": {"x": 1.5, "y": 2.0}, "b.lab": {"x": 3.0, "y": 4.0}}"#,
    )
    .unwrap();

    let config = MapConfig::from_path(&config_path).unwrap();
    assert_eq!(config.map_name, "Lab");
    assert_eq!(config.layout, LayoutProgram::Fdp);

    let registry = DeviceRegistry::from_json_file(&devices_path).unwrap();
    assert_eq!(registry.len(), 2);

    let graph: Graph = TopologyBuilder::new(&config).unwrap().build(&registry);
    let edge = graph.edge_between("a.lab", "b.lab").unwrap();
    assert_eq!(edge.speed, 100);
    assert_eq!(edge.style.color.as_deref(), Some("#FF0000"));
    assert_eq!(edge.head_label, None);

    let raw = StaticLayout::from_json_file(&positions_path)
        .unwrap()
        .layout(&graph, Canvas::new(100, 100))
        .unwrap();
    assert_eq!(raw["a.lab"], Point::new(1.5, 2.0));
}

#[test]
fn test_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    assert_eq!(
        MapConfig::from_path(&missing).unwrap_err().kind(),
        ErrorKind::FileNotFound
    );

    let bad_positions = dir.path().join("positions.json");
    fs::write(&bad_positions, "[1, 2, 3]").unwrap();
    assert_eq!(
        StaticLayout::from_json_file(&bad_positions)
            .unwrap_err()
            .kind(),
        ErrorKind::LayoutFailed
    );

    let bad_devices = dir.path().join("devices.json");
    fs::write(&bad_devices, "not json").unwrap();
    assert_eq!(
        DeviceRegistry::from_json_file(&bad_devices)
            .unwrap_err()
            .kind(),
        ErrorKind::SnapshotInvalid
    );
}

#[test]
fn test_snapshot_with_bad_records_still_builds() {
    let dir = tempfile::tempdir().unwrap();
    let devices_path = dir.path().join("devices.json");
    fs::write(
        &devices_path,
        r#"[
            {"id": "1", "name": "a", "system_name": "a.lab",
             "neighbors": {
                "ge-0/0/1": {"remote_system_name": "b.lab", "remote_port_id": "517",
                             "remote_port_subtype": "7", "remote_port_description": "ge-0/0/7"},
                "ge-0/0/2": {"remote_system_name": "c.lab", "remote_port_id": 2},
                "ge-0/0/3": null
             }},
            {"id": "2", "name": "b", "system_name": "b.lab"},
            {"id": "3", "name": "c", "system_name": "c.lab", "inventory": "n/a"},
            {"id": {"nested": true}, "name": "d", "system_name": "d.lab"}
        ]"#,
    )
    .unwrap();

    let registry = DeviceRegistry::from_json_file(&devices_path).unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.dropped(), 2);

    let graph = TopologyBuilder::new(&MapConfig::default())
        .unwrap()
        .build(&registry);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    let ab = graph.edge_between("a.lab", "b.lab").unwrap();
    assert_eq!(ab.head_label.as_deref(), Some("ge-0/0/7"));
    let ac = graph.edge_between("a.lab", "c.lab").unwrap();
    assert_eq!(ac.head_label.as_deref(), Some("2"));
}
