//! Key namespacing and public URL construction shared by every adapter.

/// Normalized key prefix: trimmed, no leading `/`, and ending in `/` unless empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Normalizes a configured prefix.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            Self(String::new())
        } else if trimmed.ends_with('/') {
            Self(trimmed.to_string())
        } else {
            Self(format!("{trimmed}/"))
        }
    }

    /// The normalized prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full provider key for a caller key.
    ///
    /// Keys that already carry the prefix are returned unchanged, so keys handed
    /// out in `FileInfo` can be passed straight back.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        if self.0.is_empty() || key.starts_with(&self.0) {
            key.to_string()
        } else {
            format!("{}{key}", self.0)
        }
    }
}

/// Public address of an object: base URL plus the escaped key.
///
/// Each segment is percent-encoded; the `/` between segments is kept.
/// Returns `None` when no usable base URL is configured.
#[must_use]
pub fn public_url(base: Option<&str>, key: &str) -> Option<String> {
    let base = base.map(|b| b.trim().trim_end_matches('/'))?;
    if base.is_empty() {
        return None;
    }

    let escaped = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Some(format!("{base}/{escaped}"))
}
