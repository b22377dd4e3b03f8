use std::collections::HashMap;

/// Documentation text beginning with this marker hides a callable in
/// simple mode.
pub const EXCLUDE_MARKER: &str = "scratch_exclude";

/// Collect `---` comment blocks sitting immediately above function
/// definitions, keyed by function name. A blank or unrelated line between
/// the block and the definition discards the block.
pub fn scan_docs(source: &str) -> HashMap<String, String> {
    let mut docs = HashMap::new();
    let mut block: Vec<String> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim();
        if let Some(text) = line.strip_prefix("---") {
            block.push(text.trim().to_string());
            continue;
        }
        if !block.is_empty() {
            if let Some(name) = function_name(line) {
                docs.insert(name, block.join("\n"));
            }
            block.clear();
        }
    }
    docs
}

/// Whether this documentation text opts its function out of simple mode.
pub fn doc_excludes(doc: &str) -> bool {
    doc.trim_start().starts_with(EXCLUDE_MARKER)
}

/// Extract the defined name from `function foo(...)`,
/// `local function foo(...)` or `foo = function(...)` lines.
fn function_name(line: &str) -> Option<String> {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("local function ")
        .or_else(|| line.strip_prefix("function "))
    {
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        // Dotted and colon method names are never top-level callables.
        if matches!(rest[name.len()..].chars().next(), Some('.' | ':')) {
            return None;
        }
        return valid_name(name);
    }
    if let Some((left, right)) = line.split_once('=') {
        if right.trim().starts_with("function") {
            let left = left.trim().strip_prefix("local ").unwrap_or(left.trim());
            return valid_name(left.trim().to_string());
        }
    }
    None
}

fn valid_name(name: String) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_alphabetic() && first != '_' {
        return None;
    }
    if chars.all(|c| c.is_alphanumeric() || c == '_') {
        Some(name)
    } else {
        None
    }
}
