//! Wildcard path matching.
//!
//! Used both for classifying assets by filename pattern (e.g. `*.sprite.css`)
//! and for resolving the glob produced from a sprite-image template
//! (e.g. `img/logo-*.png`).

/// Match a slash-separated path against a wildcard pattern.
///
/// `*` matches any run of characters within a single path segment; a
/// segment consisting of `**` matches any number of whole segments
/// (including zero). Matching is case-sensitive and anchored at both ends.
pub fn matches(path: &str, pattern: &str) -> bool {
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    match_segments(&path_segments, &pattern_segments)
}

fn match_segments(path: &[&str], pattern: &[&str]) -> bool {
    match pattern.first() {
        None => path.is_empty(),
        Some(&"**") => {
            // `**` may swallow zero or more leading path segments.
            (0..=path.len()).any(|skip| match_segments(&path[skip..], &pattern[1..]))
        }
        Some(seg) => match path.first() {
            Some(first) => match_segment(first, seg) && match_segments(&path[1..], &pattern[1..]),
            None => false,
        },
    }
}

/// Match a single segment against a pattern that may contain `*`.
fn match_segment(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_chars(&text, &pattern)
}

fn match_chars(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            (0..=text.len()).any(|skip| match_chars(&text[skip..], &pattern[1..]))
        }
        Some(c) => text.first() == Some(c) && match_chars(&text[1..], &pattern[1..]),
    }
}
