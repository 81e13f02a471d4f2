//! Key validation.
//!
//! Keys are `/`-separated, and the local backend maps them straight onto the
//! filesystem, so they must never be able to escape the storage root.

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage key.
///
/// Empty segments and `.` are dropped, `..` pops the previous segment but may
/// never climb above the root. Null bytes and backslashes are rejected.
///
/// # Examples
///
/// ```
/// use trendinghubs_storage::validate_key;
/// // Valid keys
/// assert!(validate_key("feed/cache.json").is_ok());
/// assert!(validate_key("a/../feed.json").is_ok()); // (never leaves the root)
/// // Invalid keys
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("a\\b").is_err());
/// assert!(validate_key("").is_err());
/// // Keys get resolved
/// assert_eq!(validate_key("wrong/.././feed//cache.json/").unwrap(), "feed/cache.json");
/// ```
pub fn validate(key: impl AsRef<str>) -> Result<String> {
    let key = key.as_ref();
    let invalid = || ErrorKind::InvalidKey(key.escape_debug().to_string());
    let mut segments = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
            s if s.contains(['\0', '\\']) => exn::bail!(invalid()),
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(segments.join("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("feed/cache.json", "feed/cache.json")]
    #[case("simple", "simple")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("a/b/..", "a")]
    #[case("/leading/slash", "leading/slash")]
    #[case("trailing/slash///", "trailing/slash")]
    fn test_valid_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./.")]
    #[case("//")]
    #[case("..")]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("a\0b")]
    #[case("a\\..\\b")]
    fn test_invalid_keys(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(_)));
    }
}
