//! Filename sanitization for media titles.

/// Characters stripped from a title before it is used as a filename.
pub const STRIPPED_CHARS: &[char] = &['#', ':', '/', '\\', '$', '!', '*'];

/// Removes every character in [`STRIPPED_CHARS`] from `title`.
///
/// Everything else (spaces, unicode, dots) is kept as-is.
pub fn sanitize_filename(title: &str) -> String {
    title.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_path_separators() {
        assert_eq!(sanitize_filename("a/b\\c"), "abc");
    }

    #[test]
    fn removes_fixed_set() {
        assert_eq!(sanitize_filename("#1: $ave me!*"), "1 ave me");
    }

    #[test]
    fn keeps_other_characters() {
        assert_eq!(
            sanitize_filename("Ünïcode - live (2024) v1.2"),
            "Ünïcode - live (2024) v1.2"
        );
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("#:/"), "");
    }
}
