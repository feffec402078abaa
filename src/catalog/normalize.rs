use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*-\s*").expect("numeric prefix pattern"));

static REPLY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:re|rv|fwd*)\s*:?\s*").expect("reply marker pattern"));

static EXTENSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\.(?:msg|eml)$").expect("extension suffix pattern"));

/// Reduce a raw subject or file name to its canonical comparison key.
///
/// Strips, in order: a leading digit-sequence-and-dash prefix, a leading
/// reply/forward marker (`re`, `rv`, `fw`/`fwd`, optional colon), a
/// trailing message-file extension, and surrounding whitespace. The rules
/// run to a fixpoint, so stacked markers ("RE: RE: x") and repeated
/// prefixes collapse and `normalize(normalize(s)) == normalize(s)` holds
/// for every input.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let mut next = NUMERIC_PREFIX.replace(&current, "").into_owned();
        next = REPLY_MARKER.replace(&next, "").into_owned();
        next = EXTENSION_SUFFIX.replace(&next, "").into_owned();
        let next = next.trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}
