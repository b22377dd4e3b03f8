/**
 * Tests for command-line argument parsing
 * Covers defaults, the UI-mode flags and the headless subcommands
 */

use clap::Parser;
use scrib::cli::{Args, Commands, TabsAction};
use std::path::PathBuf;

#[test]
fn test_default_args() {
    // Purpose: Verify all argument fields have quiet defaults
    // Validation:
    // - no subcommand (UI mode)
    // - no session scripts
    // - platform preferences location
    // - dev mode off, verbosity 0
    let args = Args::default();
    assert!(args.command.is_none());
    assert!(args.scripts.is_empty());
    assert!(args.prefs.is_none());
    assert!(!args.dev);
    assert_eq!(args.verbose, 0);
}

#[test]
fn test_bare_invocation_matches_the_defaults() {
    // Purpose: Verify `scrib` with no arguments parses like Default
    let args = Args::try_parse_from(["scrib"]).expect("parse");
    assert!(args.command.is_none());
    assert!(args.scripts.is_empty());
    assert!(args.prefs.is_none());
    assert!(!args.dev);
    assert_eq!(args.verbose, 0);
}

#[test]
fn test_session_scripts_and_flags() {
    // Purpose: Verify positional scripts plus the UI flags
    // Tests:
    // - Multiple script positionals keep their order
    // - --prefs overrides the preferences location
    // - -vv counts verbosity, --dev enables file logging
    let args = Args::try_parse_from([
        "scrib", "notes.lua", "rig.lua", "--prefs", "/tmp/p.json", "-vv", "--dev",
    ])
    .expect("parse");

    assert!(args.command.is_none());
    assert_eq!(
        args.scripts,
        vec![PathBuf::from("notes.lua"), PathBuf::from("rig.lua")]
    );
    assert_eq!(args.prefs, Some(PathBuf::from("/tmp/p.json")));
    assert!(args.dev);
    assert_eq!(args.verbose, 2);
}

#[test]
fn test_tabs_subcommands() {
    // Purpose: Verify the three tab management forms parse
    let args = Args::try_parse_from(["scrib", "tabs", "add", "deploy", "d.lua"]).expect("parse");
    let Some(Commands::Tabs { action }) = args.command else {
        panic!("expected the tabs subcommand");
    };
    match action {
        TabsAction::Add { name, script } => {
            assert_eq!(name, "deploy");
            assert_eq!(script, PathBuf::from("d.lua"));
        }
        other => panic!("expected add, got {other:?}"),
    }

    let args = Args::try_parse_from(["scrib", "tabs", "remove", "deploy"]).expect("parse");
    let Some(Commands::Tabs { action }) = args.command else {
        panic!("expected the tabs subcommand");
    };
    assert!(matches!(action, TabsAction::Remove { name } if name == "deploy"));

    let args = Args::try_parse_from(["scrib", "tabs", "list"]).expect("parse");
    let Some(Commands::Tabs { action }) = args.command else {
        panic!("expected the tabs subcommand");
    };
    assert!(matches!(action, TabsAction::List));
}

#[test]
fn test_check_subcommand() {
    // Purpose: Verify the headless check form parses with its script
    let args = Args::try_parse_from(["scrib", "check", "d.lua"]).expect("parse");
    let Some(Commands::Check { script }) = args.command else {
        panic!("expected the check subcommand");
    };
    assert_eq!(script, PathBuf::from("d.lua"));

    assert!(
        Args::try_parse_from(["scrib", "check"]).is_err(),
        "check requires a script"
    );
}

#[test]
fn test_incomplete_tab_commands_fail() {
    // Purpose: Verify missing operands are parse errors, not panics
    assert!(Args::try_parse_from(["scrib", "tabs"]).is_err());
    assert!(Args::try_parse_from(["scrib", "tabs", "add", "deploy"]).is_err());
    assert!(Args::try_parse_from(["scrib", "tabs", "remove"]).is_err());
}
