//! Java-style properties decoding

use crate::snapshot::FlatMap;

/// Decode a properties document.
///
/// Line-oriented and forgiving: blank lines and `#`/`!` comment lines
/// are skipped, the first `=` or `:` splits key from value, and a line
/// with neither separator becomes a key with an empty value. Decoding
/// never fails; invalid UTF-8 is replaced rather than rejected.
pub fn decode(bytes: &[u8]) -> FlatMap {
    let text = String::from_utf8_lossy(bytes);
    let mut map = FlatMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = match line.find(['=', ':']) {
            Some(at) => (&line[..at], &line[at + 1..]),
            None => (line, ""),
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), value.trim().to_string());
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_separator() {
        let map = decode(b"db.url=jdbc:postgresql://localhost/app\n");
        assert_eq!(
            map.get("db.url").map(String::as_str),
            Some("jdbc:postgresql://localhost/app")
        );
    }

    #[test]
    fn colon_separates_too() {
        let map = decode(b"app.name: billing\n");
        assert_eq!(map.get("app.name").map(String::as_str), Some("billing"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = decode(b"# heading\n! also a comment\n\napp.name=billing\n");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn bare_key_gets_empty_value() {
        let map = decode(b"feature.enabled\n");
        assert_eq!(map.get("feature.enabled").map(String::as_str), Some(""));
    }

    #[test]
    fn later_duplicate_wins() {
        let map = decode(b"app.name=first\napp.name=second\n");
        assert_eq!(map.get("app.name").map(String::as_str), Some("second"));
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        let map = decode(b"  app.name =  billing  \n");
        assert_eq!(map.get("app.name").map(String::as_str), Some("billing"));
    }
}
