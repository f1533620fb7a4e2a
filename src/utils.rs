//! Utility functions for uploaded file names and unique identifiers

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of tokens produced by [`random_token`]
const TOKEN_LEN: usize = 16;

/// Reduce a client-supplied file name to a safe single path component
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_` and
/// everything else (including path separators) is dropped. Leading dots and
/// underscores are stripped so the result is never hidden or a `..` segment.
/// Returns `None` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use keysearch::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Archive.zip").as_deref(), Some("My_Archive.zip"));
/// assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
/// assert_eq!(sanitize_filename("..."), None);
/// ```
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Only the last component of a client path is meaningful
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Random alphanumeric token for upload names and artifact stems
pub fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("locked.zip").as_deref(), Some("locked.zip"));
        assert_eq!(
            sanitize_filename("backup-2024_01.7z").as_deref(),
            Some("backup-2024_01.7z")
        );
    }

    #[test]
    fn test_sanitize_takes_last_component() {
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\secret.zip").as_deref(),
            Some("secret.zip")
        );
        assert_eq!(
            sanitize_filename("/var/tmp/secret.zip").as_deref(),
            Some("secret.zip")
        );
    }

    #[test]
    fn test_sanitize_drops_unsafe_characters() {
        assert_eq!(
            sanitize_filename("résumé (final).zip").as_deref(),
            Some("rsum_final.zip")
        );
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
    }

    #[test]
    fn test_sanitize_rejects_empty_results() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename("???"), None);
    }

    #[test]
    fn test_random_token_shape() {
        let a = random_token();
        let b = random_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
