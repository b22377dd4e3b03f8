/**
 * Tests for the search filter engine
 * Covers key parsing, the `not ` prefix and label matching
 */

use scrib::filtering::{FilterKey, label_matches, parse_keys};

#[test]
fn test_parse_single_key() {
    // Purpose: Verify parsing of one search piece
    // Tests:
    // - Plain text becomes a lowercased Contains key
    // - Surrounding whitespace is trimmed
    // - Empty pieces yield nothing
    assert_eq!(
        FilterKey::parse("Render"),
        Some(FilterKey::Contains("render".to_string()))
    );
    assert_eq!(
        FilterKey::parse("  Cache  "),
        Some(FilterKey::Contains("cache".to_string()))
    );
    assert_eq!(FilterKey::parse(""), None);
    assert_eq!(FilterKey::parse("   "), None);
}

#[test]
fn test_parse_not_prefix() {
    // Purpose: Verify the `not ` prefix produces negative keys
    // Tests:
    // - "not foo" becomes NotContains("foo")
    // - A lone "not" stays a plain contains test
    // - "not " with only whitespace after it yields nothing
    assert_eq!(
        FilterKey::parse("not cache"),
        Some(FilterKey::NotContains("cache".to_string()))
    );
    assert_eq!(
        FilterKey::parse("NOT Cache"),
        Some(FilterKey::NotContains("cache".to_string()))
    );
    assert_eq!(
        FilterKey::parse("not"),
        Some(FilterKey::Contains("not".to_string()))
    );
    assert_eq!(FilterKey::parse("not   "), None);

    // "nothing" must not be mistaken for a negation
    assert_eq!(
        FilterKey::parse("nothing"),
        Some(FilterKey::Contains("nothing".to_string()))
    );
}

#[test]
fn test_parse_keys_splits_on_commas() {
    // Purpose: Verify raw search text splits into an ordered key list
    let keys = parse_keys("render, not cache, , frame");
    assert_eq!(
        keys,
        vec![
            FilterKey::Contains("render".to_string()),
            FilterKey::NotContains("cache".to_string()),
            FilterKey::Contains("frame".to_string()),
        ]
    );
    assert!(parse_keys("").is_empty());
    assert!(parse_keys(" , ,, ").is_empty());
}

#[test]
fn test_label_matching_is_case_insensitive() {
    // Purpose: Verify matching lowercases the label, not just the keys
    let keys = parse_keys("render");
    assert!(label_matches("Render Frame", &keys));
    assert!(label_matches("RENDER", &keys));
    assert!(!label_matches("Cache off", &keys));
}

#[test]
fn test_label_matching_ands_all_keys() {
    // Purpose: Verify every key must pass for a label to stay visible
    // Tests:
    // - Contains and NotContains combine as a conjunction
    // - The empty key list passes everything
    let keys = parse_keys("frame, not single");
    assert!(label_matches("Render frame", &keys));
    assert!(!label_matches("Single frame", &keys));
    assert!(!label_matches("Utilities", &keys));

    assert!(label_matches("anything at all", &[]));
}
