//! Name normalization and path helpers

use std::borrow::Cow;

/// Strip everything outside `[A-Za-z0-9/]` and lowercase the rest.
///
/// Used for both file names and queries so that substring containment
/// ignores punctuation, spacing and case.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// URL-decode a path, leaving it untouched if it is not valid percent-encoding
pub fn decode(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Decoded last path segment, across both `/` and `\` separators
pub fn file_name_with_ext(path: &str) -> String {
    let decoded = decode(path);
    decoded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Decoded file name up to its first `.`
pub fn file_name(path: &str) -> String {
    let name = file_name_with_ext(path);
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

/// Text after the last `.` of a path
fn extension(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or_default()
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "svg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["webm", "mp4", "m4v"];

/// Whether the path points to an image
pub fn is_image(path: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(path))
}

/// Whether the path points to a video
pub fn is_video(path: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension(path))
}

/// Parse an excluded-keyword setting such as `"and, for"` into normalized words
pub fn parse_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(normalize)
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Tavern_Night (v2).webp"), "tavernnightv2webp");
        assert_eq!(normalize("Assets/Maps/Ça va"), "assets/maps/ava");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "The Lost Temple",
            "assets/maps/Tavern%20Night.webp",
            "s3:bucket:maps/City-Gate",
            "  ~~ ",
            "ÄÖÜ/äöü/123",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_file_names() {
        let path = "assets/maps/Tavern%20Night.v2.webp";
        assert_eq!(file_name_with_ext(path), "Tavern Night.v2.webp");
        assert_eq!(file_name(path), "Tavern Night");
        assert_eq!(file_name("C:\\maps\\Forest.png"), "Forest");
        assert_eq!(file_name("noext"), "noext");
    }

    #[test]
    fn test_decode_invalid_sequence_falls_back() {
        assert_eq!(decode("maps/100%25.png"), "maps/100%.png");
        assert_eq!(decode("maps/%E0%A4%A.png"), "maps/%E0%A4%A.png");
    }

    #[test]
    fn test_media_types() {
        assert!(is_image("maps/a.webp"));
        assert!(is_image("maps/a.jpeg"));
        assert!(!is_image("maps/a.PNG"));
        assert!(is_video("maps/a.m4v"));
        assert!(!is_video("maps/a.png"));
        assert!(!is_image("maps/readme"));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_keywords("and,for"), vec!["and", "for"]);
        assert_eq!(parse_keywords(" The, of ;;A-n"), vec!["the", "of", "a", "n"]);
        assert!(parse_keywords("").is_empty());
    }
}
