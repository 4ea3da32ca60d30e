//! Tag list encoding for the single string column the index offers.
//!
//! Tags are stored as a JSON array string, so any character (including `,`)
//! survives the round trip. The comma-joined form written by schema v1 is only
//! read back by the v1 → v2 migration via [`split_legacy`].

use anyhow::{Context, Result};

/// Collapse duplicates, keeping the first occurrence of each tag.
pub fn normalize(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

pub fn encode(tags: &[String]) -> String {
    serde_json::Value::from(tags.to_vec()).to_string()
}

/// Decode a stored tag column. An empty column decodes to no tags.
pub fn decode(encoded: &str) -> Result<Vec<String>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(encoded).with_context(|| format!("malformed tag column: {encoded}"))
}

/// Split a v1 comma-joined tag column.
///
/// Lossy: a tag that contained `,` comes back as two tags. An empty column is
/// treated as no tags rather than one empty tag.
pub fn split_legacy(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn round_trip_preserves_order() {
        let tags = strings(&["b", "a"]);
        assert_eq!(decode(&encode(&tags)).unwrap(), tags);
    }

    #[test]
    fn empty_list_round_trips_as_empty() {
        assert_eq!(encode(&[]), "[]");
        assert!(decode("[]").unwrap().is_empty());
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn delimiter_inside_tag_survives() {
        let tags = strings(&["a", "b,c"]);
        assert_eq!(decode(&encode(&tags)).unwrap(), tags);
    }

    #[test]
    fn legacy_join_corrupts_delimiter_tags() {
        let joined = strings(&["a", "b,c"]).join(",");
        assert_eq!(split_legacy(&joined), strings(&["a", "b", "c"]));
    }

    #[test]
    fn legacy_empty_needs_special_case() {
        let naive: Vec<&str> = "".split(',').collect();
        assert_eq!(naive, vec![""]);
        assert!(split_legacy("").is_empty());
    }

    #[test]
    fn normalize_drops_duplicates() {
        assert_eq!(normalize(&strings(&["x", "y", "x"])), strings(&["x", "y"]));
    }

    #[test]
    fn malformed_column_is_an_error() {
        assert!(decode("a,b").is_err());
    }
}
