/**
 * Tests for doc comment scanning
 * Covers block collection above definitions, the definition forms the
 * scanner recognizes and the exclusion marker
 */

use scrib::script::docs::{EXCLUDE_MARKER, doc_excludes, scan_docs};

#[test]
fn test_block_above_function_is_collected() {
    // Purpose: Verify a contiguous --- block attaches to the function
    // directly below it, joined with newlines
    let source = r#"
--- Render one frame.
--- Slow on first call.
function render_frame(scene)
end
"#;
    let docs = scan_docs(source);
    assert_eq!(
        docs.get("render_frame").map(String::as_str),
        Some("Render one frame.\nSlow on first call.")
    );
}

#[test]
fn test_blank_line_discards_the_block() {
    // Purpose: Verify a gap between the block and the definition breaks
    // the attachment
    let source = r#"
--- Orphaned comment.

function lonely()
end
"#;
    let docs = scan_docs(source);
    assert!(docs.is_empty());
}

#[test]
fn test_unrelated_line_discards_the_block() {
    // Purpose: Verify plain code between block and definition discards it
    let source = r#"
--- This documents nothing.
local x = 1
function after_code()
end
"#;
    let docs = scan_docs(source);
    assert!(!docs.contains_key("after_code"));
}

#[test]
fn test_recognized_definition_forms() {
    // Purpose: Verify all three definition spellings attach docs
    // Tests:
    // - function foo()
    // - local function foo()
    // - foo = function() and local foo = function()
    let source = r#"
--- plain
function plain_fn() end
--- local
local function local_fn() end
--- assigned
assigned_fn = function() end
--- local assigned
local other_fn = function() end
"#;
    let docs = scan_docs(source);
    assert_eq!(docs.get("plain_fn").map(String::as_str), Some("plain"));
    assert_eq!(docs.get("local_fn").map(String::as_str), Some("local"));
    assert_eq!(docs.get("assigned_fn").map(String::as_str), Some("assigned"));
    assert_eq!(docs.get("other_fn").map(String::as_str), Some("local assigned"));
}

#[test]
fn test_method_definitions_are_ignored() {
    // Purpose: Verify dotted and colon names never collect docs; only
    // plain global-style names are simple-mode candidates
    let source = r#"
--- method doc
function obj.method() end
--- colon doc
function obj:method2() end
"#;
    let docs = scan_docs(source);
    assert!(docs.is_empty());
}

#[test]
fn test_exclusion_marker() {
    // Purpose: Verify the marker test: it must lead the doc text
    assert!(doc_excludes(EXCLUDE_MARKER));
    assert!(doc_excludes("scratch_exclude"));
    assert!(doc_excludes("  scratch_exclude and a reason"));
    assert!(doc_excludes("scratch_exclude\nsecond line"));
    assert!(!doc_excludes("uses scratch_exclude later"));
    assert!(!doc_excludes("a normal doc line"));
    assert!(!doc_excludes(""));
}

#[test]
fn test_marker_block_scans_end_to_end() {
    // Purpose: Verify the scan and the marker test compose
    let source = r#"
--- scratch_exclude
--- Internal helper, keep it off the dashboard.
function internal_helper()
end

--- A public entry point.
function public_entry()
end
"#;
    let docs = scan_docs(source);
    assert!(doc_excludes(docs.get("internal_helper").expect("doc should attach")));
    assert!(!doc_excludes(docs.get("public_entry").expect("doc should attach")));
}
