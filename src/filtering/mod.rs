use tracing::debug;

/// One parsed search key: a contains or not-contains test against a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    Contains(String),
    NotContains(String),
}

impl FilterKey {
    /// Parse a single comma-separated piece of the search text.
    ///
    /// Pieces are trimmed and lowercased; empty pieces yield nothing. The
    /// exact prefix `not ` turns the trimmed remainder into a negative test;
    /// a lone `not` stays a plain contains test.
    pub fn parse(piece: &str) -> Option<Self> {
        let key = piece.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        match key.strip_prefix("not ") {
            Some(rest) => {
                let rest = rest.trim();
                if rest.is_empty() {
                    None
                } else {
                    Some(FilterKey::NotContains(rest.to_string()))
                }
            }
            None => Some(FilterKey::Contains(key)),
        }
    }

    /// Check one lowercased label against this key.
    pub fn matches(&self, label_lower: &str) -> bool {
        match self {
            FilterKey::Contains(key) => label_lower.contains(key.as_str()),
            FilterKey::NotContains(key) => !label_lower.contains(key.as_str()),
        }
    }
}

/// Split raw search text into filter keys.
pub fn parse_keys(raw: &str) -> Vec<FilterKey> {
    let keys: Vec<FilterKey> = raw.split(',').filter_map(FilterKey::parse).collect();
    debug!("parsed {} filter keys from {:?}", keys.len(), raw);
    keys
}

/// Sequential AND over all keys. The empty key list passes every label.
pub fn label_matches(label: &str, keys: &[FilterKey]) -> bool {
    let label_lower = label.to_lowercase();
    keys.iter().all(|key| key.matches(&label_lower))
}
