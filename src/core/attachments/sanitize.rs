//! Filesystem-safe names and human-readable sizes

/// Directory token used when an identifier sanitizes to nothing
pub const FALLBACK_TOKEN: &str = "file";

/// Turn an arbitrary part identifier into a directory name
///
/// Lowercases, replaces spaces with underscores, then drops every character
/// outside `[a-z0-9_-]`. Never returns an empty string.
pub fn sanitize_identifier(name: &str) -> String {
    let safe: String = name
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect();

    if safe.is_empty() {
        FALLBACK_TOKEN.to_string()
    } else {
        safe
    }
}

/// Final path component of an uploaded file name
///
/// Both `/` and `\` count as separators so a Windows-style client path cannot
/// smuggle directory segments in on a Unix host.
pub fn base_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => FALLBACK_TOKEN.to_string(),
        name => name.to_string(),
    }
}

/// Format a byte count with 1024-based units and two decimals
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNIT: f64 = 1024.0;
    const SIZES: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut i = 0;
    while size >= UNIT && i < SIZES.len() - 1 {
        size /= UNIT;
        i += 1;
    }

    format!("{:.2} {}", size, SIZES[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_lowercases_and_replaces_spaces() {
        assert_eq!(sanitize_identifier("P-100"), "p-100");
        assert_eq!(sanitize_identifier("Bracket Left 2"), "bracket_left_2");
    }

    #[test]
    fn test_sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize_identifier("../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_identifier("A/B\\C:D*E"), "abcde");
        assert_eq!(sanitize_identifier("Größe 3"), "gre_3");
    }

    #[test]
    fn test_sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_identifier(""), "file");
        assert_eq!(sanitize_identifier("!!!"), "file");
        assert_eq!(sanitize_identifier("日本"), "file");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = ["P-100", "  Mixed Case  ", "", "a b/c", "x__y--z", "Ünïcödé", "###"];
        for s in samples {
            let once = sanitize_identifier(s);
            assert_eq!(sanitize_identifier(&once), once, "input {:?}", s);
            assert!(!once.is_empty());
        }
    }

    #[test]
    fn test_base_file_name_strips_directories() {
        assert_eq!(base_file_name("a.jpg"), "a.jpg");
        assert_eq!(base_file_name("../../secret.txt"), "secret.txt");
        assert_eq!(base_file_name("C:\\Users\\me\\drawing.pdf"), "drawing.pdf");
        assert_eq!(base_file_name("dir/"), "file");
        assert_eq!(base_file_name(".."), "file");
    }

    #[test]
    fn test_base_file_name_keeps_spaces() {
        assert_eq!(base_file_name("front view.png"), "front view.png");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(1), "1.00 Bytes");
        assert_eq!(format_size(1023), "1023.00 Bytes");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(10240), "10.00 KB");
        assert_eq!(format_size(1536 * 1024), "1.50 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048.00 GB");
    }
}
