/**
 * Tests for the tab lifecycle
 * Covers rebuilds, error capture, saved-value snapshots, exclusion
 * management, filtering and button invocation
 */

use std::fs;
use std::path::PathBuf;

use scrib::config::TabEntry;
use scrib::diagnostics::Console;
use scrib::filtering::parse_keys;
use scrib::tab::{BodyItem, ScriptTab, TabState};
use scrib::widgets::WidgetState;
use tempfile::TempDir;

fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("failed to write test script");
    path
}

fn tab_for(path: &PathBuf) -> ScriptTab {
    ScriptTab::new(TabEntry::new("demo", path.display().to_string()))
}

#[test]
fn test_rebuild_success() {
    // Purpose: Verify a clean rebuild: built state, runtime available,
    // no warnings, no error text
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(&dir, "ok.lua", "function go() end\n");
    let mut tab = tab_for(&path);
    assert!(matches!(tab.state, TabState::Unbuilt));
    assert!(tab.body().is_none());

    tab.rebuild(&Console::new());
    let body = tab.body().expect("tab should build");
    assert!(body.simple);
    assert_eq!(body.items.len(), 1);
    assert!(tab.runtime().is_some());
    assert!(tab.error_text().is_none());
    assert!(tab.warnings.is_empty());
    assert_eq!(tab.name(), "demo");
}

#[test]
fn test_rebuild_missing_script_reports_the_failure() {
    // Purpose: Verify a missing script lands in the error state and on
    // the console, framed
    let console = Console::new();
    let mut tab = ScriptTab::new(TabEntry::new("ghost", "/no/such/tab.lua"));
    tab.rebuild(&console);

    assert!(tab.body().is_none());
    assert!(tab.runtime().is_none());
    let text = tab.error_text().expect("error text");
    assert!(text.starts_with("Failed to parse /no/such/tab.lua"), "{text}");
    assert!(text.contains("# "), "{text}");
    assert!(!console.is_empty(), "the failure should be logged");
}

#[test]
fn test_rebuild_bad_markup_reports_the_failure() {
    // Purpose: Verify a markup mistake fails the tab without touching
    // the process
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "bad.lua",
        "scrib_instructions = { contents = { { simple = \"nope\" } } }\n",
    );
    let mut tab = tab_for(&path);
    tab.rebuild(&Console::new());

    let text = tab.error_text().expect("error text");
    assert!(text.contains("unknown function \"nope\""), "{text}");
}

#[test]
fn test_rebuild_collects_warnings() {
    // Purpose: Verify validation warnings reach both the tab and the
    // console with the warning prefix
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "warny.lua",
        r#"
scrib_instructions = {
    contents = { { inputWidgets = { { type = "check", label = "A", wat = 1 } } } },
}
"#,
    );
    let console = Console::new();
    let mut tab = tab_for(&path);
    tab.rebuild(&console);

    assert!(tab.body().is_some());
    assert_eq!(tab.warnings.len(), 1);
    assert!(tab.warnings[0].contains("wat"), "{}", tab.warnings[0]);
    let logged = console.tail(10);
    assert!(
        logged.iter().any(|l| l.starts_with("warning: ")),
        "console should carry the warning: {logged:?}"
    );
}

#[test]
fn test_capture_saved_replaces_the_snapshot() {
    // Purpose: Verify capture takes save-flagged labelled widgets only
    // and replaces the previous snapshot wholesale
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "save.lua",
        r#"
scrib_instructions = {
    contents = { {
        label = "Frame",
        inputWidgets = {
            { type = "lineEdit", label = "Scene", save = true },
            { type = "lineEdit", label = "Skipped" },
            { type = "lineEdit", save = true },
        },
    } },
}
"#,
    );
    let mut tab = tab_for(&path);
    // Stale snapshot from a group that no longer exists
    tab.entry
        .saved
        .entry("Old group".to_string())
        .or_default()
        .insert("Gone".to_string(), serde_json::json!("stale"));

    tab.rebuild(&Console::new());
    tab.apply_field_text(0, 0, "shot.usd".to_string());
    tab.apply_field_text(0, 1, "ignored".to_string());
    tab.capture_saved();

    assert!(!tab.entry.saved.contains_key("Old group"), "snapshots replace");
    let frame = tab.entry.saved.get("Frame").expect("group snapshot");
    assert_eq!(frame.len(), 1, "unsaved and unlabelled widgets are skipped");
    assert_eq!(frame["Scene"], serde_json::json!("shot.usd"));
}

#[test]
fn test_capture_saved_without_a_body_is_a_no_op() {
    // Purpose: Verify capturing an unbuilt or failed tab keeps the old
    // snapshot, so a broken script cannot wipe saved values
    let mut tab = ScriptTab::new(TabEntry::new("ghost", "/no/such/tab.lua"));
    tab.entry
        .saved
        .entry("Frame".to_string())
        .or_default()
        .insert("Scene".to_string(), serde_json::json!("kept.usd"));

    tab.capture_saved();
    assert_eq!(
        tab.entry.saved["Frame"]["Scene"],
        serde_json::json!("kept.usd")
    );

    tab.rebuild(&Console::new());
    tab.capture_saved();
    assert_eq!(
        tab.entry.saved["Frame"]["Scene"],
        serde_json::json!("kept.usd"),
        "a failed rebuild must not clear saved values"
    );
}

#[test]
fn test_exclusion_round_trip() {
    // Purpose: Verify exclude/include bookkeeping and its effect across
    // a rebuild
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "excl.lua",
        "function alpha() end\nfunction beta() end\n",
    );
    let mut tab = tab_for(&path);
    let console = Console::new();
    tab.rebuild(&console);
    assert_eq!(tab.body().expect("built").items.len(), 2);

    assert!(tab.exclude("alpha"));
    assert!(!tab.exclude("alpha"), "exclusions are deduplicated");
    tab.rebuild(&console);
    let labels: Vec<&str> = tab
        .body()
        .expect("built")
        .items
        .iter()
        .map(|i| i.filter_label())
        .collect();
    assert_eq!(labels, vec!["beta"]);

    assert!(tab.include("alpha"));
    assert!(!tab.include("alpha"), "nothing left to bring back");
    tab.rebuild(&console);
    assert_eq!(tab.body().expect("built").items.len(), 2);

    tab.exclude("alpha");
    tab.exclude("beta");
    tab.include_all();
    assert!(tab.entry.excluded.is_empty());
}

#[test]
fn test_filter_toggles_visibility() {
    // Purpose: Verify filtering hides items without rebuilding them
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "filter.lua",
        "function render_frame() end\nfunction clear_cache() end\n",
    );
    let mut tab = tab_for(&path);
    tab.rebuild(&Console::new());

    tab.apply_filter(&parse_keys("render"));
    let body = tab.body().expect("built");
    let visible: Vec<&str> = body
        .items
        .iter()
        .filter(|i| i.visible())
        .map(|i| i.filter_label())
        .collect();
    assert_eq!(visible, vec!["render_frame"]);
    assert_eq!(body.items.len(), 2, "hidden items stay in the body");

    tab.apply_filter(&parse_keys(""));
    let body = tab.body().expect("built");
    assert!(body.items.iter().all(|i| i.visible()));
}

#[test]
fn test_invoke_button_passes_widget_values() {
    // Purpose: Verify button invocation reads bound widgets in input
    // order and calls the script
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "invoke.lua",
        r#"
got = "unset"
function take(scene, frame)
    got = scene .. "@" .. frame
end
scrib_instructions = {
    contents = { {
        label = "Frame",
        inputWidgets = {
            { type = "lineEdit", label = "Scene" },
            { type = "intSpinner", label = "Frame", value = 7 },
        },
        buttons = { { label = "Go", fn = "take", inputs = { 0, 1 } } },
    } },
}
"#,
    );
    let mut tab = tab_for(&path);
    tab.rebuild(&Console::new());
    tab.apply_field_text(0, 0, "shot.usd".to_string());

    let body = tab.body().expect("built");
    let BodyItem::Group(group) = &body.items[0] else {
        panic!("expected a group");
    };
    tab.invoke_button(&group.buttons[0], &group.widgets);

    let rt = tab.runtime().expect("runtime");
    let got = rt.eval("got").expect("eval");
    assert_eq!(rt.display(&got), "shot.usd@7");
}

#[test]
fn test_invoke_button_aborts_on_a_read_error() {
    // Purpose: Verify a failing widget read stops the call and lands on
    // the console instead
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "abort.lua",
        r#"
called = false
function take(x) called = true end
scrib_instructions = {
    contents = { {
        label = "Frame",
        inputWidgets = {
            { type = "lineEdit", label = "Required", errorIfEmpty = true },
        },
        buttons = { { label = "Go", fn = "take", inputs = { 0 } } },
    } },
}
"#,
    );
    let console = Console::new();
    let mut tab = tab_for(&path);
    tab.rebuild(&console);

    let body = tab.body().expect("built");
    let BodyItem::Group(group) = &body.items[0] else {
        panic!("expected a group");
    };
    tab.invoke_button(&group.buttons[0], &group.widgets);

    let rt = tab.runtime().expect("runtime");
    let called = rt.eval("called").expect("eval");
    assert_eq!(rt.display(&called), "false", "the call must not happen");
    let lines = console.tail(5);
    assert!(
        lines.iter().any(|l| l.contains("Required")),
        "the read error should be logged: {lines:?}"
    );
}

#[test]
fn test_widget_commands_through_the_tab() {
    // Purpose: Verify command dispatch: browse bubbles options up,
    // script commands run in place
    let dir = TempDir::new().expect("temp dir");
    let path = write_script(
        &dir,
        "cmd.lua",
        r#"
function stamp() return "stamped" end
scrib_instructions = {
    contents = { {
        label = "Tools",
        inputWidgets = {
            { type = "browse", label = "Scene", caption = "Pick a scene" },
            { type = "cmdLineEdit", label = "Out", buttonCommand = "stamp" },
        },
    } },
}
"#,
    );
    let mut tab = tab_for(&path);
    tab.rebuild(&Console::new());

    let options = tab
        .run_widget_command(0, 0)
        .expect("browse must bubble up options");
    assert_eq!(options.caption, "Pick a scene");

    assert!(tab.run_widget_command(0, 1).is_none());
    let body = tab.body().expect("built");
    let BodyItem::Group(group) = &body.items[0] else {
        panic!("expected a group");
    };
    let WidgetState::Text(field) = &group.widgets[1].state else {
        panic!("expected a text field");
    };
    assert_eq!(field.text, "stamped");

    // Out-of-range targets are ignored
    assert!(tab.run_widget_command(0, 9).is_none());
    assert!(tab.run_widget_command(9, 0).is_none());
}
