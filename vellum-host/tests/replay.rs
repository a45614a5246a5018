//! End-to-end replay tests for the host.

use std::path::PathBuf;

use serde_json::Value;
use vellum_core::EditorConfig;
use vellum_host::{HostApp, HostConfig, Script};

const DOCUMENT: &str = r#"{"items": [
    {"type": "rectangle", "name": "back", "geometry": {"x": 0, "y": 0, "width": 100, "height": 50}},
    {"type": "ellipse", "name": "front", "geometry": {"centerX": 220, "centerY": 20, "radiusX": 20, "radiusY": 20}}
]}"#;

// Canvas (0, 0) sits at screen (400, 300) in an 800x600 viewport.
const SCRIPT: &str = r#"[
    {"atMs": 0, "event": {"type": "press", "x": 450, "y": 325}},
    {"atMs": 10, "event": {"type": "release", "x": 450, "y": 325}},
    {"atMs": 100, "event": {"type": "wheel", "x": 400, "y": 300, "deltaY": -1}},
    {"atMs": 120, "event": {"type": "key", "key": "escape"}}
]"#;

fn write_inputs(dir: &tempfile::TempDir) -> HostConfig {
    let document = dir.path().join("doc.json");
    let script = dir.path().join("input.json");
    std::fs::write(&document, DOCUMENT).expect("write document");
    std::fs::write(&script, SCRIPT).expect("write script");
    HostConfig {
        document: Some(document),
        script: Some(script),
        ..HostConfig::new()
    }
}

fn lines(out: &[u8]) -> Vec<Value> {
    std::str::from_utf8(out)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

fn of_type<'a>(lines: &'a [Value], kind: &str) -> Vec<&'a Value> {
    lines.iter().filter(|line| line["event"]["type"] == kind).collect()
}

#[test]
fn test_virtual_replay_reports_events() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_inputs(&dir);
    let script = config.script().expect("script");
    let mut app = HostApp::new(
        &config,
        config.editor_config().expect("config"),
        config.document().expect("document"),
        Vec::new(),
    )
    .expect("app");
    app.run_virtual(&script).expect("replay");
    let report = lines(&app.into_output());

    // Initial tiles come first, at time zero.
    assert_eq!(report[0]["atMs"], 0);
    assert_eq!(report[0]["event"]["type"], "tilesUpdated");

    let clicked = of_type(&report, "objectClicked");
    assert_eq!(clicked.len(), 1);
    assert_eq!(clicked[0]["atMs"], 10);

    let selections = of_type(&report, "selectionChanged");
    assert_eq!(selections.len(), 2);
    assert_eq!(selections[0]["event"]["index"], 0);
    assert_eq!(selections[1]["atMs"], 120);
    assert!(selections[1]["event"]["index"].is_null());

    // The zoom rebuild lands one debounce window after the wheel.
    let tiles = of_type(&report, "tilesUpdated");
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[1]["atMs"], 150);

    // Timestamps never go backwards.
    let times: Vec<u64> = report.iter().map(|line| line["atMs"].as_u64().expect("atMs")).collect();
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_trailing_deadline_is_flushed() {
    let script = Script::from_json(r#"[{"atMs": 5, "event": {"type": "wheel", "x": 0, "y": 0, "deltaY": 3}}]"#)
        .expect("script");
    let mut app = HostApp::new(
        &HostConfig::new(),
        EditorConfig::default(),
        vellum_host::Document::default(),
        Vec::new(),
    )
    .expect("app");
    app.run_virtual(&script).expect("replay");
    assert!(app.editor().next_deadline().is_none());
    let report = lines(&app.into_output());
    let tiles = of_type(&report, "tilesUpdated");
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[1]["atMs"], 55);
}

#[test]
fn test_invalid_editor_config_is_rejected() {
    let config = EditorConfig {
        min_zoom: 2.0,
        max_zoom: 1.0,
        ..EditorConfig::default()
    };
    let result = HostApp::new(&HostConfig::new(), config, vellum_host::Document::default(), Vec::new());
    assert!(result.is_err());
}

#[test]
fn test_missing_script_file_fails() {
    let config = HostConfig {
        script: Some(PathBuf::from("/nonexistent/input.json")),
        ..HostConfig::new()
    };
    let err = config.script().expect_err("missing script");
    assert!(err.to_string().contains("input.json"));
}

#[tokio::test]
async fn test_realtime_replay_fires_debounced_tiles() {
    let script = Script::from_json(
        r#"[
            {"atMs": 0, "event": {"type": "wheel", "x": 400, "y": 300, "deltaY": -1}},
            {"atMs": 5, "event": {"type": "wheel", "x": 400, "y": 300, "deltaY": -1}}
        ]"#,
    )
    .expect("script");
    let mut app = HostApp::new(
        &HostConfig::new(),
        EditorConfig::default(),
        vellum_host::Document::default(),
        Vec::new(),
    )
    .expect("app");
    app.run_realtime(&script).await.expect("replay");
    let report = lines(&app.into_output());
    // Two wheel steps collapse into one rebuild.
    let tiles = of_type(&report, "tilesUpdated");
    assert_eq!(tiles.len(), 2);
    assert!(tiles[1]["atMs"].as_u64().expect("atMs") >= 50);
}
