//! Formatting drift detection.
//!
//! Rules match byte-exact blocks, so a reformatted target silently stops
//! matching. These helpers tell a missing block apart from one that is still
//! there with different whitespace.

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when `needle` is absent from `haystack` byte-for-byte but present once
/// whitespace differences are ignored.
pub fn has_whitespace_drift(haystack: &str, needle: &str) -> bool {
    if needle.trim().is_empty() || haystack.contains(needle) {
        return false;
    }

    normalize_whitespace(haystack).contains(&normalize_whitespace(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_whitespace("  a,\n\t  b,  "), "a, b,");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_drift_on_reindented_block() {
        let haystack = "fn(\n  one,\n  two,\n)";
        assert!(has_whitespace_drift(haystack, "    one,\n    two,"));
    }

    #[test]
    fn test_no_drift_when_absent() {
        assert!(!has_whitespace_drift("one, three", "one,\n two,"));
    }

    #[test]
    fn test_exact_match_is_not_drift() {
        assert!(!has_whitespace_drift("a,\n  b,", "a,\n  b,"));
    }

    #[test]
    fn test_no_drift_for_blank_needle() {
        assert!(!has_whitespace_drift("anything", " \n "));
    }
}
