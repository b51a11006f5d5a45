//! Path exclusion matching.
//!
//! An exclusion pattern either names a single path, which also matches when
//! written with one trailing slash, or ends with `*` and matches every path
//! sharing its prefix.

const WILDCARD: char = '*';

/// Returns `true` when `path` must be authenticated given `excluded_paths`.
///
/// A missing path, or a missing or empty exclusion list, always requires
/// authentication. Otherwise the first matching pattern exempts the path.
///
/// ```rust
/// use api_auth::path::require_auth;
///
/// let excluded = ["/api/v1/status/", "/api/v1/stat*"];
///
/// assert!(!require_auth(Some("/api/v1/status"), Some(&excluded[..])));
/// assert!(!require_auth(Some("/api/v1/stats"), Some(&excluded[..])));
/// assert!(require_auth(Some("/api/v1/users"), Some(&excluded[..])));
/// assert!(require_auth(None, Some(&excluded[..])));
/// ```
pub fn require_auth<P: AsRef<str>>(path: Option<&str>, excluded_paths: Option<&[P]>) -> bool {
    let Some(path) = path else {
        return true;
    };

    match excluded_paths {
        Some(patterns) if !patterns.is_empty() => {
            !patterns.iter().any(|pattern| matches(pattern.as_ref(), path))
        }
        _ => true,
    }
}

fn matches(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix(WILDCARD) {
        return path.starts_with(prefix);
    }

    pattern == path
        || pattern
            .strip_suffix('/')
            .is_some_and(|stripped| stripped == path)
}
