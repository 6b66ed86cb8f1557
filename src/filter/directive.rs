//! Sprite directive parsing and path templating.
//!
//! A sprite directive is a structured comment embedded in CSS source:
//!
//! ```css
//! /** sprite: logo; sprite-image: url('/img/${sprite}-${date}.png'); sprite-layout: vertical */
//! ```
//!
//! Parsing produces a typed [`SpriteDirective`]; turning the image template
//! into a filesystem glob is a separate, pure step so both halves test in
//! isolation.

use crate::error::{Result, SpritelyError};

/// Substring whose presence marks directive-bearing content.
pub const DIRECTIVE_MARKER: &str = "sprite:";

/// A parsed sprite directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDirective {
    /// Sprite name, substituted for `${sprite}` in the image template.
    pub name: String,
    /// Image URL template, possibly containing `${...}` placeholders.
    pub image_template: String,
    /// Optional layout hint (`horizontal`/`vertical`), passed through.
    pub layout: Option<String>,
}

impl SpriteDirective {
    /// Produce the filesystem glob for the generated image.
    ///
    /// `${sprite}` becomes the literal sprite name; every other `${...}`
    /// placeholder becomes `*`, since the tool fills those in with values
    /// (timestamps, hashes) unknown until after generation.
    pub fn glob_pattern(&self) -> String {
        let mut result = String::with_capacity(self.image_template.len());
        let mut rest = self.image_template.as_str();

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    if &after[..end] == "sprite" {
                        result.push_str(&self.name);
                    } else {
                        result.push('*');
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // Unterminated placeholder: keep the tail verbatim.
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);

        result
    }
}

/// Whether the content carries a sprite directive at all.
pub fn contains_directive(content: &str) -> bool {
    content.contains(DIRECTIVE_MARKER)
}

/// Parse the first sprite directive out of rendered source content.
///
/// The directive comment is split into `key: value` pairs on `;`. The
/// `sprite` and `sprite-image` keys are required; `sprite-layout` is
/// optional. Fails with `DirectiveParse` when no well-formed directive is
/// present.
pub fn parse_directive(content: &str) -> Result<SpriteDirective> {
    let marker = content.find(DIRECTIVE_MARKER).ok_or_else(|| {
        SpritelyError::DirectiveParse {
            message: "no sprite directive found in content".to_string(),
            help: Some("Expected a comment like /** sprite: name; sprite-image: url(...) */".to_string()),
        }
    })?;

    let body = directive_body(content, marker);

    let mut name = None;
    let mut image = None;
    let mut layout = None;

    for pair in body.split(';') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "sprite" => name = Some(value.to_string()),
            "sprite-image" => image = Some(strip_url(value)?),
            "sprite-layout" => layout = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.filter(|n| !n.is_empty()).ok_or_else(|| {
        SpritelyError::DirectiveParse {
            message: "directive is missing a sprite name".to_string(),
            help: Some("Add `sprite: <name>` to the directive comment".to_string()),
        }
    })?;

    let image_template = image.ok_or_else(|| SpritelyError::DirectiveParse {
        message: format!("sprite '{}' has no sprite-image declaration", name),
        help: Some("Add `sprite-image: url(<template>)` to the directive comment".to_string()),
    })?;

    Ok(SpriteDirective {
        name,
        image_template,
        layout,
    })
}

/// Slice out the comment body surrounding the directive marker.
///
/// Bounded by `/*`..`*/` when the directive sits in a CSS comment; falls
/// back to the marker's line otherwise.
fn directive_body(content: &str, marker_offset: usize) -> &str {
    let before = &content[..marker_offset];
    let after = &content[marker_offset..];

    let start = match before.rfind("/*") {
        Some(open) if before[open..].find("*/").is_none() => open + 2,
        _ => before.rfind('\n').map(|i| i + 1).unwrap_or(0),
    };

    let end = match after.find("*/") {
        Some(close) => marker_offset + close,
        None => marker_offset + after.find('\n').unwrap_or(after.len()),
    };

    content[start..end].trim_start_matches('*').trim()
}

/// Unwrap `url(...)` and surrounding quotes from a sprite-image value.
fn strip_url(value: &str) -> Result<String> {
    let inner = value
        .strip_prefix("url(")
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| SpritelyError::DirectiveParse {
            message: format!("sprite-image value is not a url(): {}", value),
            help: Some("Use sprite-image: url('/path/${sprite}.png')".to_string()),
        })?;

    Ok(inner.trim_matches(|c| c == '\'' || c == '"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DESCRIPTOR: &str = "\
/** sprite: logo; sprite-image: url('/img/${sprite}-${date}.png'); sprite-layout: vertical */
.logo { background-repeat: no-repeat; }
";

    #[test]
    fn test_contains_directive() {
        assert!(contains_directive(DESCRIPTOR));
        assert!(!contains_directive("body { color: red; }"));
    }

    #[test]
    fn test_parse_full_directive() {
        let directive = parse_directive(DESCRIPTOR).unwrap();

        assert_eq!(directive.name, "logo");
        assert_eq!(directive.image_template, "/img/${sprite}-${date}.png");
        assert_eq!(directive.layout.as_deref(), Some("vertical"));
    }

    #[test]
    fn test_parse_directive_without_layout() {
        let content = "/** sprite: nav; sprite-image: url(/img/${sprite}.png) */";
        let directive = parse_directive(content).unwrap();

        assert_eq!(directive.name, "nav");
        assert_eq!(directive.image_template, "/img/${sprite}.png");
        assert_eq!(directive.layout, None);
    }

    #[test]
    fn test_parse_directive_unquoted_url() {
        let content = "/** sprite: nav; sprite-image: url(img/nav.png) */";
        let directive = parse_directive(content).unwrap();
        assert_eq!(directive.image_template, "img/nav.png");
    }

    #[test]
    fn test_parse_directive_missing_image() {
        let content = "/** sprite: logo */";
        let err = parse_directive(content).unwrap_err();
        assert!(matches!(err, SpritelyError::DirectiveParse { .. }));
    }

    #[test]
    fn test_parse_directive_missing_name() {
        let content = "/** sprite: ; sprite-image: url(a.png) */";
        let err = parse_directive(content).unwrap_err();
        assert!(matches!(err, SpritelyError::DirectiveParse { .. }));
    }

    #[test]
    fn test_parse_directive_no_marker() {
        let err = parse_directive("body {}").unwrap_err();
        assert!(matches!(err, SpritelyError::DirectiveParse { .. }));
    }

    #[test]
    fn test_parse_directive_not_a_url() {
        let content = "/** sprite: logo; sprite-image: logo.png */";
        let err = parse_directive(content).unwrap_err();
        assert!(matches!(err, SpritelyError::DirectiveParse { .. }));
    }

    #[test]
    fn test_glob_pattern_substitution() {
        let directive = SpriteDirective {
            name: "logo".to_string(),
            image_template: "/img/${sprite}-${date}.png".to_string(),
            layout: None,
        };

        assert_eq!(directive.glob_pattern(), "/img/logo-*.png");
    }

    #[test]
    fn test_glob_pattern_no_placeholders() {
        let directive = SpriteDirective {
            name: "logo".to_string(),
            image_template: "/img/fixed.png".to_string(),
            layout: None,
        };

        assert_eq!(directive.glob_pattern(), "/img/fixed.png");
    }

    #[test]
    fn test_glob_pattern_multiple_unknown_placeholders() {
        let directive = SpriteDirective {
            name: "icons".to_string(),
            image_template: "/img/${sprite}/${md5}-${date}.png".to_string(),
            layout: None,
        };

        assert_eq!(directive.glob_pattern(), "/img/icons/*-*.png");
    }

    #[test]
    fn test_glob_pattern_unterminated_placeholder() {
        let directive = SpriteDirective {
            name: "logo".to_string(),
            image_template: "/img/${sprite".to_string(),
            layout: None,
        };

        // Kept verbatim rather than guessed at.
        assert_eq!(directive.glob_pattern(), "/img/${sprite");
    }

    #[test]
    fn test_parse_directive_on_marker_line_without_comment() {
        let content = "sprite: logo; sprite-image: url(/img/${sprite}.png)\n.rule {}";
        let directive = parse_directive(content).unwrap();
        assert_eq!(directive.name, "logo");
    }
}
