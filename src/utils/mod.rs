/// Strips everything except ASCII word characters, whitespace and hyphens.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect()
}

/// `title` sanitized into a filename stem with `ext` appended.
pub fn media_filename(title: &str, ext: &str) -> String {
    let stem = sanitize_filename(title);
    let stem = stem.trim();
    if stem.is_empty() {
        format!("video.{ext}")
    } else {
        format!("{stem}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Best Song! (2024)"), "Best Song 2024");
        assert_eq!(sanitize_filename("lo-fi_beats"), "lo-fi_beats");
        assert_eq!(sanitize_filename("a/b\\c:d*e?"), "abcde");
        assert_eq!(sanitize_filename("café 🎵"), "caf ");
    }

    #[test]
    fn test_media_filename() {
        let name = media_filename("Best Song! (2024)", "mp4");
        assert_eq!(name, "Best Song 2024.mp4");
        let stem = name.strip_suffix(".mp4").unwrap();
        assert!(stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' '));

        assert_eq!(media_filename("!!!", "mp4"), "video.mp4");
    }
}
