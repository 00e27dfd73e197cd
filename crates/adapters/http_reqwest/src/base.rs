//! API base resolution.

/// The root URL every relay path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// Normalise `raw` by trimming whitespace and one trailing `/`.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self(trimmed.strip_suffix('/').unwrap_or(trimmed).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve `path` to a full URL.
    ///
    /// Absolute `http(s)://` URLs pass through unchanged, relative paths are
    /// joined with exactly one `/`, and an empty path yields the base.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            return if self.0.is_empty() {
                "/".to_string()
            } else {
                self.0.clone()
            };
        }
        if is_absolute(path) {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.0)
        } else {
            format!("{}/{path}", self.0)
        }
    }
}

fn is_absolute(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_trim_trailing_slash() {
        assert_eq!(ApiBase::new("https://api.example.com/").as_str(), "https://api.example.com");
    }

    #[test]
    fn should_join_with_single_slash() {
        let base = ApiBase::new("https://api.example.com/");
        assert_eq!(base.resolve("/phones"), "https://api.example.com/phones");
        assert_eq!(base.resolve("phones"), "https://api.example.com/phones");
    }

    #[test]
    fn should_pass_absolute_urls_through() {
        let base = ApiBase::new("https://api.example.com");
        assert_eq!(base.resolve("HTTP://other/x"), "HTTP://other/x");
        assert_eq!(base.resolve("https://other/y"), "https://other/y");
    }

    #[test]
    fn should_resolve_empty_path_to_base() {
        assert_eq!(ApiBase::new("http://h:1").resolve(""), "http://h:1");
        assert_eq!(ApiBase::new("").resolve(""), "/");
    }

    #[test]
    fn should_keep_path_relative_without_base() {
        assert_eq!(ApiBase::new("").resolve("/status"), "/status");
    }
}
