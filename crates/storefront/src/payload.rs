//! Tolerant parsing of the `data-external-links` attribute.
//!
//! The canonical encoding is a strict JSON array. A previously buggy
//! persistence path shipped an HTML-entity-escaped pseudo-JSON using `=>`
//! key/value separators; that shape is still tolerated on read. Anything
//! unparseable after both attempts renders nothing - a broken attribute
//! must never take the product page down.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use buylink_core::ExternalLink;

/// Quotes bare identifiers in key position: `{url: ...}` -> `{"url": ...}`.
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid literal pattern")
});

/// Parse the attribute value into link records.
///
/// Strict JSON first; on failure, one legacy-recovery attempt; on total
/// failure, an empty list.
#[must_use]
pub fn parse_payload(raw: &str) -> Vec<ExternalLink> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(links) = serde_json::from_str::<Vec<ExternalLink>>(trimmed) {
        return links;
    }

    let recovered = recover_legacy(trimmed);
    match serde_json::from_str::<Vec<ExternalLink>>(&recovered) {
        Ok(links) => links,
        Err(error) => {
            debug!(%error, "external links payload unparseable, rendering nothing");
            Vec::new()
        }
    }
}

/// Rewrite the legacy entity-escaped pseudo-JSON into parseable JSON.
fn recover_legacy(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let rewritten = decoded.replace("=>", ":");
    BARE_KEY.replace_all(&rewritten, "$1\"$2\":").into_owned()
}

/// Minimal entity decoding; only the entities the legacy writer produced.
fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json_parses() {
        let links = parse_payload(r#"[{"url":"https://a.com","text":"A","enabled":true}]"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://a.com");
    }

    #[test]
    fn test_empty_string_renders_nothing() {
        assert!(parse_payload("").is_empty());
        assert!(parse_payload("   ").is_empty());
    }

    #[test]
    fn test_empty_array_is_fine() {
        assert!(parse_payload("[]").is_empty());
    }

    #[test]
    fn test_garbage_renders_nothing_without_panicking() {
        assert!(parse_payload("not json at all").is_empty());
        assert!(parse_payload("{\"object\":\"not an array\"}").is_empty());
        assert!(parse_payload("[{\"url\":12}]").is_empty());
    }

    #[test]
    fn test_entity_escaped_legacy_payload_recovers() {
        let raw = "[{&quot;url&quot;=&gt;&quot;https://a.com&quot;, &quot;text&quot;=&gt;&quot;Buy&quot;, &quot;enabled&quot;=&gt;true}]";
        let links = parse_payload(raw);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://a.com");
        assert_eq!(links[0].text, "Buy");
        assert!(links[0].enabled);
    }

    #[test]
    fn test_bare_key_legacy_payload_recovers() {
        let raw = "[{url=>\"https://a.com\", text=>\"Buy\", enabled=>false}]";
        let links = parse_payload(raw);
        assert_eq!(links.len(), 1);
        assert!(!links[0].enabled);
    }

    #[test]
    fn test_missing_enabled_defaults_true() {
        let links = parse_payload(r#"[{"url":"https://a.com","text":"A"}]"#);
        assert!(links[0].enabled);
    }

    #[test]
    fn test_arrow_inside_quoted_value_survives_strict_parse() {
        // `=>` rewriting only runs on the fallback path, so a valid JSON
        // payload containing the sequence in a value is untouched.
        let links = parse_payload(r#"[{"url":"https://a.com","text":"a => b","enabled":true}]"#);
        assert_eq!(links[0].text, "a => b");
    }
}
