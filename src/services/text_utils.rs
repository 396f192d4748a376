//! Shared text normalization utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters scene groups never put into a release name
const SCENE_BAD_CHARS: &[char] = &[',', ':', '(', ')', '\'', '!', '?', '\u{2019}'];

static REPEATED_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

/// Normalize a show name the way scene releases spell it.
///
/// Punctuation is dropped, word separators become dots and `&` becomes `and`.
///
/// # Example
/// ```ignore
/// assert_eq!(sanitize_scene_name("Law & Order: SVU"), "Law.and.Order.SVU");
/// ```
pub fn sanitize_scene_name(name: &str) -> String {
    let name: String = name.chars().filter(|c| !SCENE_BAD_CHARS.contains(c)).collect();

    let name = name
        .replace("- ", ".")
        .replace(' ', ".")
        .replace('&', "and")
        .replace('/', ".");

    let name = REPEATED_DOTS.replace_all(&name, ".");

    name.strip_suffix('.').unwrap_or(&name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_scene_name() {
        assert_eq!(sanitize_scene_name("Law & Order: SVU"), "Law.and.Order.SVU");
        assert_eq!(
            sanitize_scene_name("James May's Things You Need to Know"),
            "James.Mays.Things.You.Need.to.Know"
        );
        assert_eq!(sanitize_scene_name("Mr. Robot"), "Mr.Robot");
        assert_eq!(sanitize_scene_name("Face/Off"), "Face.Off");
        assert_eq!(sanitize_scene_name("Star Wars - Rebels"), "Star.Wars.Rebels");
    }

    #[test]
    fn test_sanitize_strips_single_trailing_dot() {
        assert_eq!(sanitize_scene_name("S.H.I.E.L.D."), "S.H.I.E.L.D");
        assert_eq!(sanitize_scene_name("What If...?"), "What.If");
    }
}
