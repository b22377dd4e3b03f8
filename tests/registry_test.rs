/**
 * Tests for the widget type registry
 * Covers tag resolution, key whitelists and the family predicates
 */

use scrib::diagnostics::ConfigError;
use scrib::widgets::WidgetKind;
use scrib::widgets::registry::{TAGS, tag_list};

#[test]
fn test_every_tag_resolves_to_its_kind() {
    // Purpose: Verify from_tag and tag() agree for the whole registry
    for (tag, kind) in TAGS {
        let resolved = WidgetKind::from_tag(tag).expect("registry tag must resolve");
        assert_eq!(resolved, kind);
        assert_eq!(resolved.tag(), tag);
    }
    assert_eq!(TAGS.len(), 13, "registry should stay a closed set");
}

#[test]
fn test_unknown_tag_lists_the_valid_set() {
    // Purpose: Verify the unknown-type error enumerates all valid tags
    // Validates:
    // - The error carries the offending tag
    // - Every registry tag appears in the message
    let err = WidgetKind::from_tag("comboBox").unwrap_err();
    match err {
        ConfigError::UnknownWidgetType { tag, valid } => {
            assert_eq!(tag, "comboBox");
            for (known, _) in TAGS {
                assert!(valid.contains(known), "missing {known} in: {valid}");
            }
        }
        other => panic!("expected UnknownWidgetType, got {other:?}"),
    }
    assert!(tag_list().starts_with("stretch, spacer, separator"));
}

#[test]
fn test_allowed_keys_always_include_the_basics() {
    // Purpose: Verify every variant accepts "type" and "share",
    //          and every non-structural variant accepts "label" and "save"
    for (_, kind) in TAGS {
        let keys = kind.allowed_keys();
        assert!(keys.contains(&"type"), "{kind:?} must allow type");
        assert!(keys.contains(&"share"), "{kind:?} must allow share");
        if !kind.is_structural() {
            assert!(keys.contains(&"label"), "{kind:?} must allow label");
            assert!(keys.contains(&"save"), "{kind:?} must allow save");
        }
    }
}

#[test]
fn test_variant_specific_keys() {
    // Purpose: Spot-check the per-variant key whitelists
    assert!(WidgetKind::Spacer.allowed_keys().contains(&"size"));
    assert!(WidgetKind::Separator.allowed_keys().contains(&"vertical"));
    assert!(WidgetKind::LineEdit.allowed_keys().contains(&"eval"));
    assert!(!WidgetKind::Browse.allowed_keys().contains(&"eval"));
    assert!(WidgetKind::Browse.allowed_keys().contains(&"fileMode"));
    assert!(WidgetKind::CmdLineEdit.allowed_keys().contains(&"buttonCommand"));
    assert!(!WidgetKind::LineEdit.allowed_keys().contains(&"buttonCommand"));
    assert!(WidgetKind::Selection.allowed_keys().contains(&"checkExisting"));
    assert!(WidgetKind::IntSpinner.allowed_keys().contains(&"step"));
    assert!(WidgetKind::Check.allowed_keys().contains(&"value"));
}

#[test]
fn test_family_predicates() {
    // Purpose: Verify the predicates that drive layout, focus and reads
    // Tests:
    // - Structural widgets are exactly stretch, spacer and separator
    // - The text family covers the seven field-backed variants
    // - Command buttons, capture and object reads nest as expected
    let structural = [WidgetKind::Stretch, WidgetKind::Spacer, WidgetKind::Separator];
    for (_, kind) in TAGS {
        assert_eq!(kind.is_structural(), structural.contains(&kind));
    }

    assert!(WidgetKind::LineEdit.is_text());
    assert!(WidgetKind::PyNodeMulti.is_text());
    assert!(!WidgetKind::Check.is_text());
    assert!(!WidgetKind::IntSpinner.is_text());

    // lineEdit is the only text variant without a command button
    assert!(!WidgetKind::LineEdit.has_command_button());
    assert!(WidgetKind::Browse.has_command_button());
    assert!(WidgetKind::Selection.has_command_button());

    assert!(WidgetKind::Selection.captures_selection());
    assert!(WidgetKind::PyNode.captures_selection());
    assert!(!WidgetKind::Browse.captures_selection());

    assert!(WidgetKind::SelectionMulti.captures_many());
    assert!(WidgetKind::PyNodeMulti.captures_many());
    assert!(!WidgetKind::Selection.captures_many());

    assert!(WidgetKind::PyNode.reads_objects());
    assert!(WidgetKind::PyNodeMulti.reads_objects());
    assert!(!WidgetKind::SelectionMulti.reads_objects());
}
