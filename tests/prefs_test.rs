/**
 * Tests for preferences persistence
 * Covers defaults, tolerant loading, round-tripping unknown keys and
 * the tab add/remove operations
 */

use std::fs;
use std::path::Path;

use scrib::config::{Prefs, TabEntry};
use tempfile::TempDir;

#[test]
fn test_defaults() {
    // Purpose: Verify the default document shape
    let prefs = Prefs::default();
    assert_eq!(prefs.geometry, [100, 100, 800, 1000]);
    assert_eq!(prefs.tab_index, 0);
    assert!(prefs.tab_data.is_empty());
    assert!(prefs.extra.is_empty());
}

#[test]
fn test_missing_and_malformed_files_fall_back_to_defaults() {
    // Purpose: Verify a bad preferences file never blocks startup
    let dir = TempDir::new().expect("temp dir");

    let missing = dir.path().join("nope.json");
    assert_eq!(Prefs::load(&missing), Prefs::default());

    let malformed = dir.path().join("bad.json");
    fs::write(&malformed, "{ not json").expect("write");
    assert_eq!(Prefs::load(&malformed), Prefs::default());

    let wrong_shape = dir.path().join("wrong.json");
    fs::write(&wrong_shape, "[1, 2, 3]").expect("write");
    assert_eq!(Prefs::load(&wrong_shape), Prefs::default());
}

#[test]
fn test_save_and_reload_round_trip() {
    // Purpose: Verify a full document survives a save/load cycle,
    // including exclusions and saved widget values
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested/prefs.json");

    let mut prefs = Prefs::default();
    prefs.geometry = [10, 20, 640, 480];
    prefs.tab_index = 1;
    prefs.add_tab("render", "/scripts/render.lua").expect("add");
    prefs.add_tab("comp", "/scripts/comp.lua").expect("add");
    prefs.tab_data[0].excluded.push("blow_up".to_string());
    prefs.tab_data[0]
        .saved
        .entry("Frame".to_string())
        .or_default()
        .insert("Scene".to_string(), serde_json::json!("shot.usd"));

    prefs.save(&path).expect("save should create parent dirs");
    let loaded = Prefs::load(&path);
    assert_eq!(loaded, prefs);
    assert_eq!(loaded.tab_data[0].excluded, vec!["blow_up"]);
    assert_eq!(
        loaded.tab_data[0].saved["Frame"]["Scene"],
        serde_json::json!("shot.usd")
    );
}

#[test]
fn test_unknown_keys_round_trip() {
    // Purpose: Verify keys written by other hosts survive a load/save
    // cycle untouched, at both the document and the tab level
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("prefs.json");
    fs::write(
        &path,
        r#"{
            "geometry": [1, 2, 3, 4],
            "tab_index": 0,
            "tab_data": [
                { "name": "a", "script": "/a.lua", "window_state": "maximized" }
            ],
            "theme": "dark"
        }"#,
    )
    .expect("write");

    let prefs = Prefs::load(&path);
    assert_eq!(prefs.extra["theme"], serde_json::json!("dark"));
    assert_eq!(
        prefs.tab_data[0].extra["window_state"],
        serde_json::json!("maximized")
    );

    let out = dir.path().join("out.json");
    prefs.save(&out).expect("save");
    let text = fs::read_to_string(&out).expect("read back");
    assert!(text.contains("\"theme\""));
    assert!(text.contains("\"window_state\""));
}

#[test]
fn test_add_tab_rejects_duplicates() {
    // Purpose: Verify tab names stay unique
    let mut prefs = Prefs::default();
    prefs.add_tab("render", "/a.lua").expect("first add");
    let err = prefs.add_tab("render", "/b.lua").unwrap_err();
    assert!(err.to_string().contains("render"), "{err}");
    assert_eq!(prefs.tab_data.len(), 1);
    assert_eq!(prefs.tab_data[0].script, "/a.lua");
}

#[test]
fn test_remove_tab_clamps_the_active_index() {
    // Purpose: Verify removal reports whether anything happened and
    // keeps tab_index inside the remaining range
    let mut prefs = Prefs::default();
    prefs.add_tab("a", "/a.lua").expect("add");
    prefs.add_tab("b", "/b.lua").expect("add");
    prefs.add_tab("c", "/c.lua").expect("add");
    prefs.tab_index = 2;

    assert!(prefs.remove_tab("c"));
    assert_eq!(prefs.tab_index, 1);
    assert!(!prefs.remove_tab("c"), "second removal finds nothing");

    assert!(prefs.remove_tab("a"));
    assert_eq!(prefs.tab_index, 0);
    assert!(prefs.remove_tab("b"));
    assert_eq!(prefs.tab_index, 0, "emptying the list leaves the index alone");
    assert!(prefs.tab_data.is_empty());
}

#[test]
fn test_resolve_path_honors_the_override() {
    // Purpose: Verify --prefs wins over the platform location
    let resolved =
        Prefs::resolve_path(Some(Path::new("/tmp/custom.json"))).expect("resolve");
    assert_eq!(resolved, Path::new("/tmp/custom.json"));

    let platform = Prefs::resolve_path(None).expect("resolve");
    assert!(platform.ends_with("prefs.json"));
}

#[test]
fn test_tab_entry_new() {
    // Purpose: Verify the fresh-entry constructor starts clean
    let entry = TabEntry::new("render", "/scripts/render.lua");
    assert_eq!(entry.name, "render");
    assert_eq!(entry.script, "/scripts/render.lua");
    assert!(entry.excluded.is_empty());
    assert!(entry.saved.is_empty());
    assert!(entry.extra.is_empty());
}
