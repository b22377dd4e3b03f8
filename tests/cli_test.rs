/**
 * Tests for the headless command paths
 * Drives tab management and script checking through cli::run with a
 * temp preferences file, asserting on the persisted state
 */

use std::fs;
use std::path::{Path, PathBuf};

use scrib::cli::{Args, Commands, TabsAction, default_tab_name};
use scrib::config::Prefs;
use tempfile::TempDir;

fn tabs_args(prefs: &Path, action: TabsAction) -> Args {
    Args {
        command: Some(Commands::Tabs { action }),
        prefs: Some(prefs.to_path_buf()),
        ..Args::default()
    }
}

#[test]
fn test_default_tab_name() {
    // Purpose: Verify session tabs are named after the file stem
    assert_eq!(default_tab_name(Path::new("/a/b/render.lua")), "render");
    assert_eq!(default_tab_name(Path::new("notes.lua")), "notes");
    assert_eq!(default_tab_name(Path::new("bare")), "bare");
}

#[test]
fn test_tabs_add_persists_and_rejects_duplicates() {
    // Purpose: Verify add writes the preferences file and enforces
    // unique names across invocations
    let dir = TempDir::new().expect("temp dir");
    let prefs_path = dir.path().join("prefs.json");

    let add = TabsAction::Add {
        name: "deploy".to_string(),
        script: PathBuf::from("/scripts/deploy.lua"),
    };
    scrib::cli::run(tabs_args(&prefs_path, add)).expect("add should succeed");

    let prefs = Prefs::load(&prefs_path);
    assert_eq!(prefs.tab_data.len(), 1);
    assert_eq!(prefs.tab_data[0].name, "deploy");
    assert_eq!(prefs.tab_data[0].script, "/scripts/deploy.lua");

    let dup = TabsAction::Add {
        name: "deploy".to_string(),
        script: PathBuf::from("/elsewhere.lua"),
    };
    let err = scrib::cli::run(tabs_args(&prefs_path, dup)).unwrap_err();
    assert!(err.to_string().contains("deploy"), "{err}");

    let prefs = Prefs::load(&prefs_path);
    assert_eq!(prefs.tab_data.len(), 1, "the duplicate must not be written");
}

#[test]
fn test_tabs_remove() {
    // Purpose: Verify remove rewrites the file and missing names fail
    let dir = TempDir::new().expect("temp dir");
    let prefs_path = dir.path().join("prefs.json");

    let mut prefs = Prefs::default();
    prefs.add_tab("a", "/a.lua").expect("add");
    prefs.add_tab("b", "/b.lua").expect("add");
    prefs.save(&prefs_path).expect("save");

    let remove = TabsAction::Remove {
        name: "a".to_string(),
    };
    scrib::cli::run(tabs_args(&prefs_path, remove)).expect("remove should succeed");
    let prefs = Prefs::load(&prefs_path);
    assert_eq!(prefs.tab_data.len(), 1);
    assert_eq!(prefs.tab_data[0].name, "b");

    let missing = TabsAction::Remove {
        name: "ghost".to_string(),
    };
    let err = scrib::cli::run(tabs_args(&prefs_path, missing)).unwrap_err();
    assert!(err.to_string().contains("ghost"), "{err}");
}

#[test]
fn test_tabs_list_runs_with_and_without_tabs() {
    // Purpose: Verify list never fails, whatever the file holds
    let dir = TempDir::new().expect("temp dir");
    let prefs_path = dir.path().join("prefs.json");

    scrib::cli::run(tabs_args(&prefs_path, TabsAction::List)).expect("empty list");

    let mut prefs = Prefs::default();
    prefs.add_tab("a", "/a.lua").expect("add");
    prefs.save(&prefs_path).expect("save");
    scrib::cli::run(tabs_args(&prefs_path, TabsAction::List)).expect("list");
}

#[test]
fn test_check_reports_build_health() {
    // Purpose: Verify check succeeds on a clean script and fails the
    // process on a broken one
    let dir = TempDir::new().expect("temp dir");

    let good = dir.path().join("good.lua");
    fs::write(&good, "function go() end\n").expect("write");
    let args = Args {
        command: Some(Commands::Check { script: good }),
        prefs: Some(dir.path().join("prefs.json")),
        ..Args::default()
    };
    scrib::cli::run(args).expect("a clean script should check");

    let bad = dir.path().join("bad.lua");
    fs::write(&bad, "function broken(\n").expect("write");
    let args = Args {
        command: Some(Commands::Check {
            script: bad.clone(),
        }),
        prefs: Some(dir.path().join("prefs.json")),
        ..Args::default()
    };
    let err = scrib::cli::run(args).unwrap_err();
    assert!(
        err.to_string().contains("failed to build"),
        "{err}"
    );
}

#[test]
fn test_check_accepts_warnings() {
    // Purpose: Verify validation warnings do not fail the check
    let dir = TempDir::new().expect("temp dir");
    let warny = dir.path().join("warny.lua");
    fs::write(
        &warny,
        "scrib_instructions = { contents = { { inputWidgets = { { type = \"check\", label = \"A\", wat = 1 } } } } }\n",
    )
    .expect("write");

    let args = Args {
        command: Some(Commands::Check { script: warny }),
        prefs: Some(dir.path().join("prefs.json")),
        ..Args::default()
    };
    scrib::cli::run(args).expect("warnings are not failures");
}
