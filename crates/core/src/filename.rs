//! Storage-safe filenames for uploaded files.
//!
//! A safe filename is `<YYYYMMDD_HHMMSS>_<12 hex chars>_<sanitized base name>`.
//! The timestamp is UTC with second resolution and the token carries 48 bits
//! from the OS random source, so two uploads of the same file never share a key
//! in practice.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;

/// Timestamp layout used as the first key component.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Random bytes per token. Hex encoding doubles this to 12 characters.
const TOKEN_BYTES: usize = 6;

/// Filename generation errors.
#[derive(Debug, Error)]
pub enum FilenameError {
    /// The OS random source could not be read.
    #[error("random source unavailable: {0}")]
    Entropy(String),
}

/// Builds a collision-resistant, path-safe object name from a client filename.
///
/// # Errors
///
/// Returns [`FilenameError::Entropy`] if the random source is unavailable.
pub fn build_safe_filename(original: &str) -> Result<String, FilenameError> {
    build_safe_filename_at(original, Utc::now())
}

fn build_safe_filename_at(original: &str, now: DateTime<Utc>) -> Result<String, FilenameError> {
    let base = sanitize(basename(original));
    let token = random_token()?;
    Ok(format!("{}_{token}_{base}", now.format(TIMESTAMP_FORMAT)))
}

/// Generates a 12 character lowercase hex token.
///
/// # Errors
///
/// Returns [`FilenameError::Entropy`] if the random source is unavailable.
pub fn random_token() -> Result<String, FilenameError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| FilenameError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Lowercase extension of the final path component, without the dot.
///
/// Returns an empty string when the name has no extension.
#[must_use]
pub fn extension_lower(filename: &str) -> String {
    let base = basename(filename);
    base.rfind('.')
        .map(|idx| base[idx + 1..].to_lowercase())
        .unwrap_or_default()
}

/// Checks an extension against the allow-list. An empty extension is never allowed.
#[must_use]
pub fn is_allowed_extension(ext: &str, allowed: &BTreeSet<String>) -> bool {
    !ext.is_empty() && allowed.contains(&ext.to_lowercase())
}

/// Last path component. Both `/` and `\` separate directories.
fn basename(name: &str) -> &str {
    name.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

fn sanitize(name: &str) -> String {
    let mut cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();

    // "..." collapses to ".." in one pass.
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }

    if cleaned.is_empty() || cleaned == "." {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use std::collections::HashSet;

    /// Asserts `<8 digits>_<6 digits>_<12 hex>_` and returns the remainder.
    fn split_well_formed(name: &str) -> &str {
        let bytes = name.as_bytes();
        assert!(name.len() > 29, "name too short: {name}");
        assert!(bytes[..8].iter().all(u8::is_ascii_digit), "date: {name}");
        assert_eq!(bytes[8], b'_');
        assert!(bytes[9..15].iter().all(u8::is_ascii_digit), "time: {name}");
        assert_eq!(bytes[15], b'_');
        assert!(
            bytes[16..28]
                .iter()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b)),
            "token: {name}"
        );
        assert_eq!(bytes[28], b'_');
        &name[29..]
    }

    #[rstest]
    #[case("photo.png", "photo.png")]
    #[case("my holiday photo.jpg", "my_holiday_photo.jpg")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\bob\\report.pdf", "report.pdf")]
    #[case("dir/sub/", "sub")]
    #[case("evil...txt", "evil.txt")]
    #[case("  padded.txt  ", "padded.txt")]
    #[case("tab\there.txt", "tab_here.txt")]
    #[case("", "file")]
    #[case("..", "file")]
    #[case("/", "file")]
    fn test_sanitized_base(#[case] input: &str, #[case] expected: &str) {
        let name = build_safe_filename(input).expect("random source available");
        assert_eq!(split_well_formed(&name), expected);
    }

    #[test]
    fn test_timestamp_component() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("valid timestamp");
        let name = build_safe_filename_at("a.txt", now).expect("random source available");
        assert!(name.starts_with("20240309_070501_"));
        assert!(name.ends_with("_a.txt"));
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<String> = (0..1000)
            .map(|_| build_safe_filename("same.png").expect("random source available"))
            .collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn test_random_token_shape() {
        let token = random_token().expect("random source available");
        assert_eq!(token.len(), 12);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[rstest]
    #[case("photo.PNG", "png")]
    #[case("archive.tar.gz", "gz")]
    #[case("noext", "")]
    #[case("trailing.", "")]
    #[case("dir.v2/readme", "")]
    #[case(".env", "env")]
    fn test_extension_lower(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extension_lower(input), expected);
    }

    #[test]
    fn test_is_allowed_extension() {
        let allowed: BTreeSet<String> = ["png", "pdf"].into_iter().map(String::from).collect();
        assert!(is_allowed_extension("png", &allowed));
        assert!(is_allowed_extension("PDF", &allowed));
        assert!(!is_allowed_extension("exe", &allowed));
        assert!(!is_allowed_extension("", &allowed));
    }
}
