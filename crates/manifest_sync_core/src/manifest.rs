use serde::Serialize;
use sha2::{Digest, Sha256};

/// Separator DataSync uses between alternatives of a `SIMPLE_PATTERN` filter.
pub const FILTER_PATTERN_DELIMITER: &str = "|";
/// Upper bound DataSync accepts for a single filter value.
pub const MAX_FILTER_PATTERN_LEN: usize = 102_400;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Manifest keys split by presence in the target bucket, each side in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyPartition {
    pub found: Vec<String>,
    pub not_found: Vec<String>,
}

/// Decodes a manifest body into candidate keys.
///
/// Lines are trimmed, leading `/` is dropped so keys match S3 object names,
/// blank lines are skipped, and a leading byte-order mark is ignored.
/// Duplicates and ordering are kept as written.
pub fn parse_manifest(body: &[u8]) -> Result<Vec<String>, ValidationError> {
    let text = std::str::from_utf8(body)
        .map_err(|error| ValidationError::new(format!("manifest is not valid UTF-8: {error}")))?;
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    Ok(text
        .lines()
        .map(|line| line.trim().trim_start_matches('/'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Splits `keys` into found and not-found sides using `exists`.
///
/// Stops at the first lookup error.
pub fn partition_keys<E>(
    keys: Vec<String>,
    mut exists: impl FnMut(&str) -> Result<bool, E>,
) -> Result<KeyPartition, E> {
    let mut partition = KeyPartition::default();
    for key in keys {
        if exists(&key)? {
            partition.found.push(key);
        } else {
            partition.not_found.push(key);
        }
    }
    Ok(partition)
}

/// Joins found keys into a DataSync include filter: `/a.bam|/dir/b.bam`.
///
/// Keys are expected as `parse_manifest` yields them, without a leading `/`.
pub fn build_include_pattern(found: &[String]) -> Result<String, ValidationError> {
    if found.is_empty() {
        return Err(ValidationError::new(
            "include pattern requires at least one key",
        ));
    }

    if let Some(key) = found
        .iter()
        .find(|key| key.contains(FILTER_PATTERN_DELIMITER))
    {
        return Err(ValidationError::new(format!(
            "key '{key}' contains the filter delimiter '{FILTER_PATTERN_DELIMITER}'"
        )));
    }

    let pattern = found
        .iter()
        .map(|key| format!("/{key}"))
        .collect::<Vec<_>>()
        .join(FILTER_PATTERN_DELIMITER);

    if pattern.len() > MAX_FILTER_PATTERN_LEN {
        return Err(ValidationError::new(format!(
            "include pattern is {} characters, exceeding MAX_FILTER_PATTERN_LEN={MAX_FILTER_PATTERN_LEN}",
            pattern.len()
        )));
    }

    Ok(pattern)
}

pub fn pattern_fingerprint(pattern: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pattern.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_lines_in_order_and_skips_blanks() {
        let body = b"a.bam\n\n  b.bam  \r\nsub/c.bam\r\n\n";
        let parsed = parse_manifest(body).expect("manifest should parse");
        assert_eq!(parsed, keys(&["a.bam", "b.bam", "sub/c.bam"]));
    }

    #[test]
    fn drops_leading_slashes_from_keys() {
        let parsed = parse_manifest(b"/c.bam\n//runs/d.bam\n/\n").expect("manifest should parse");
        assert_eq!(parsed, keys(&["c.bam", "runs/d.bam"]));
    }

    #[test]
    fn keeps_duplicate_lines() {
        let parsed = parse_manifest(b"a.bam\na.bam\n").expect("manifest should parse");
        assert_eq!(parsed, keys(&["a.bam", "a.bam"]));
    }

    #[test]
    fn strips_leading_byte_order_mark() {
        let body = "\u{feff}a.bam\nb.bam".as_bytes();
        let parsed = parse_manifest(body).expect("manifest should parse");
        assert_eq!(parsed, keys(&["a.bam", "b.bam"]));
    }

    #[test]
    fn rejects_non_utf8_manifest() {
        let error = parse_manifest(&[b'a', 0xff, b'\n']).expect_err("invalid utf-8 should fail");
        assert!(error.message().starts_with("manifest is not valid UTF-8"));
    }

    #[test]
    fn empty_manifest_has_no_candidates() {
        assert!(parse_manifest(b"").expect("empty manifest parses").is_empty());
        assert!(parse_manifest(b"\n \n").expect("blank manifest parses").is_empty());
    }

    #[test]
    fn partitions_adjacent_missing_keys_without_skipping() {
        let present: BTreeSet<&str> = BTreeSet::from(["c.bam"]);
        let partition = partition_keys(keys(&["a.bam", "b.bam", "c.bam", "d.bam"]), |key| {
            Ok::<_, String>(present.contains(key))
        })
        .expect("lookup should succeed");

        assert_eq!(partition.found, keys(&["c.bam"]));
        assert_eq!(partition.not_found, keys(&["a.bam", "b.bam", "d.bam"]));
    }

    #[test]
    fn partition_stops_at_first_lookup_error() {
        let mut lookups = Vec::new();
        let error = partition_keys(keys(&["a.bam", "b.bam", "c.bam"]), |key| {
            lookups.push(key.to_string());
            if key == "b.bam" {
                Err("access denied".to_string())
            } else {
                Ok(true)
            }
        })
        .expect_err("lookup error should propagate");

        assert_eq!(error, "access denied");
        assert_eq!(lookups, keys(&["a.bam", "b.bam"]));
    }

    #[test]
    fn builds_single_key_pattern() {
        let pattern = build_include_pattern(&keys(&["a.bam"])).expect("pattern should build");
        assert_eq!(pattern, "/a.bam");
    }

    #[test]
    fn builds_pipe_separated_pattern_without_trailing_delimiter() {
        let pattern = build_include_pattern(&keys(&["a.bam", "runs/b.bam", "c.bam"]))
            .expect("pattern should build");
        assert_eq!(pattern, "/a.bam|/runs/b.bam|/c.bam");
    }

    #[test]
    fn rejects_empty_found_set() {
        let error = build_include_pattern(&[]).expect_err("empty set should fail");
        assert_eq!(error.message(), "include pattern requires at least one key");
    }

    #[test]
    fn rejects_keys_containing_delimiter() {
        let error =
            build_include_pattern(&keys(&["a|b.bam"])).expect_err("delimiter key should fail");
        assert!(error.message().contains("a|b.bam"));
    }

    #[test]
    fn rejects_oversized_pattern() {
        let long_key = "k".repeat(MAX_FILTER_PATTERN_LEN);
        let error = build_include_pattern(&[long_key]).expect_err("oversized pattern should fail");
        assert!(error.message().contains("MAX_FILTER_PATTERN_LEN"));
    }

    #[test]
    fn fingerprint_is_stable_for_identical_patterns() {
        let first = pattern_fingerprint("/a.bam|/b.bam");
        let second = pattern_fingerprint("/a.bam|/b.bam");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, pattern_fingerprint("/b.bam|/a.bam"));
    }

    proptest! {
        #[test]
        fn partition_covers_every_candidate_exactly_once(
            candidates in prop::collection::vec("[a-c]{1,2}\\.bam", 0..24),
            present in prop::collection::btree_set("[a-c]{1,2}\\.bam", 0..8),
        ) {
            let partition = partition_keys(candidates.clone(), |key| {
                Ok::<_, String>(present.contains(key))
            })
            .expect("lookup is infallible");

            prop_assert_eq!(
                partition.found.len() + partition.not_found.len(),
                candidates.len()
            );
            prop_assert!(partition.found.iter().all(|key| present.contains(key)));
            prop_assert!(partition.not_found.iter().all(|key| !present.contains(key)));

            let expected_found: Vec<String> = candidates
                .iter()
                .filter(|key| present.contains(*key))
                .cloned()
                .collect();
            let expected_missing: Vec<String> = candidates
                .iter()
                .filter(|key| !present.contains(*key))
                .cloned()
                .collect();
            prop_assert_eq!(partition.found, expected_found);
            prop_assert_eq!(partition.not_found, expected_missing);
        }

        #[test]
        fn pattern_lists_every_found_key_in_order(
            found in prop::collection::vec("[a-z0-9_.][a-z0-9_/.]{0,11}", 1..16),
        ) {
            let pattern = build_include_pattern(&found).expect("keys without delimiter build");
            let alternatives: Vec<&str> = pattern.split(FILTER_PATTERN_DELIMITER).collect();

            prop_assert_eq!(alternatives.len(), found.len());
            for (alternative, key) in alternatives.iter().zip(&found) {
                prop_assert_eq!(alternative.to_string(), format!("/{key}"));
            }
        }
    }
}
