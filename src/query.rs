//! Query-string decoding.

use std::collections::HashMap;

/// Decodes a raw query string into a flat key → value map.
///
/// Follows the standard query-string convention: percent-escapes are decoded
/// and `+` reads as a space. A leading `?` is tolerated. Duplicate keys keep
/// the last occurrence. All values are strings — typed interpretation is a
/// middleware concern.
pub fn parse(raw: &str) -> HashMap<String, String> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs() {
        let q = parse("tab=info&sort=desc");
        assert_eq!(q.len(), 2);
        assert_eq!(q["tab"], "info");
        assert_eq!(q["sort"], "desc");
    }

    #[test]
    fn tolerates_leading_question_mark() {
        assert_eq!(parse("?tab=info")["tab"], "info");
    }

    #[test]
    fn plus_reads_as_space_and_escapes_decode() {
        let q = parse("name=jo%C3%A3o+silva");
        assert_eq!(q["name"], "joão silva");
    }

    #[test]
    fn last_duplicate_wins() {
        assert_eq!(parse("a=1&a=2&a=3")["a"], "3");
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parse("").is_empty());
        assert!(parse("?").is_empty());
    }
}
