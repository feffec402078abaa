use std::path::Path;
use std::time::SystemTime;

/// Truncate `input` to at most `max_chars` Unicode characters, stripping
/// control characters and appending `…` when truncated.
pub fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    let clean: String = input.chars().filter(|c| !c.is_control()).collect();
    if clean.chars().count() > max_chars {
        let mut s: String = clean.chars().take(max_chars).collect();
        s.push('…');
        s
    } else {
        clean
    }
}

/// Seconds since `path` was last modified, when the filesystem can say.
pub fn file_age_secs(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    SystemTime::now().duration_since(modified).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::truncate_with_ellipsis;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_with_ellipsis("abc", 5), "abc");
    }

    #[test]
    fn long_strings_are_cut_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc…");
    }

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(truncate_with_ellipsis("a\tb\nc", 10), "abc");
    }
}
