//! Markup removal for provider display names

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Strip HTML tags and decode the handful of entities the search API emits
pub fn strip_markup(text: &str) -> String {
    TAG.replace_all(text, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bold_tags() {
        assert_eq!(strip_markup("<b>스타벅스</b> 강남역점"), "스타벅스 강남역점");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(strip_markup("Tom &amp; Toms"), "Tom & Toms");
        assert_eq!(strip_markup("&lt;b&gt;"), "<b>");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_markup("올리브영"), "올리브영");
    }
}
