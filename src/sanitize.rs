//! Turns a human-readable title into a keyword the catalogs accept.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Classification;

static RE_MATURE_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
// Colons survive so season/part markers ("Final Season: Part 2") reach the catalog.
static RE_STANDARD_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s:]").unwrap());

/// Sanitize `title` for the given chain.
///
/// Every character that is not a word character or whitespace is replaced by a
/// space, then the result is percent-encoded. On the standard path an encoded
/// colon is restored to a literal `:`. Returns `None` when nothing searchable
/// is left.
pub fn sanitize_title(title: &str, classification: Classification) -> Option<String> {
    let stripped = match classification {
        Classification::Mature => RE_MATURE_STRIP.replace_all(title, " "),
        Classification::Standard => RE_STANDARD_STRIP.replace_all(title, " "),
    };

    if !stripped.chars().any(char::is_alphanumeric) {
        return None;
    }

    let encoded = urlencoding::encode(&stripped);
    Some(match classification {
        Classification::Mature => encoded.into_owned(),
        Classification::Standard => encoded.replace("%3A", ":"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_path_restores_literal_colon() {
        let keyword =
            sanitize_title("Attack on Titan: Final Season", Classification::Standard).unwrap();
        assert_eq!(keyword, "Attack%20on%20Titan:%20Final%20Season");
        assert!(!keyword.contains("%3A"));
    }

    #[test]
    fn mature_path_strips_colon_and_punctuation() {
        let keyword = sanitize_title("Title: Part 2!", Classification::Mature).unwrap();
        assert_eq!(keyword, "Title%20%20Part%202%20");
    }

    #[test]
    fn punctuation_becomes_spaces_not_deletions() {
        let keyword = sanitize_title("Re:Zero", Classification::Mature).unwrap();
        assert_eq!(keyword, "Re%20Zero");
    }

    #[test]
    fn non_ascii_word_characters_are_kept_and_encoded() {
        let keyword = sanitize_title("進撃の巨人", Classification::Mature).unwrap();
        assert_eq!(keyword, urlencoding::encode("進撃の巨人"));
    }

    #[test]
    fn nothing_searchable_yields_none() {
        assert_eq!(sanitize_title("", Classification::Standard), None);
        assert_eq!(sanitize_title("?!  ...", Classification::Mature), None);
        assert_eq!(sanitize_title(":::", Classification::Standard), None);
    }
}
