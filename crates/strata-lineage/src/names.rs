//! Branch name validation following git-style conventions.
//!
//! Valid branch names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot)
//! - Must not start or end with `.` or `/`
//! - Must not contain consecutive slashes (`//`)
//! - Components between slashes must be non-empty

use crate::error::{LineageError, Result};

/// Characters that are forbidden anywhere in a branch name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use strata_lineage::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    let invalid = |reason: String| {
        Err(LineageError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("branch name must not be empty".into());
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return invalid(format!("contains forbidden character: {ch:?}"));
        }
    }

    if name.contains("..") {
        return invalid("must not contain '..'".into());
    }

    if name.starts_with('.') || name.ends_with('.') {
        return invalid("must not start or end with '.'".into());
    }

    if name.starts_with('/') || name.ends_with('/') {
        return invalid("must not start or end with '/'".into());
    }

    if name.contains("//") {
        return invalid("must not contain consecutive slashes '//'".into());
    }

    for component in name.split('/') {
        if component.starts_with('.') {
            return invalid(format!("component must not start with '.': {component:?}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        for name in ["main", "feature/auth", "hotfix-2024", "team/ann/wip"] {
            assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_branch_name("").is_err());
    }

    #[test]
    fn rejects_forbidden_characters() {
        for name in ["has space", "tilde~1", "star*", "back\\slash", "colon:x"] {
            assert!(validate_branch_name(name).is_err(), "{name} should be invalid");
        }
    }

    #[test]
    fn rejects_dot_patterns() {
        for name in ["bad..name", ".hidden", "trailing.", "a/.b"] {
            assert!(validate_branch_name(name).is_err(), "{name} should be invalid");
        }
    }

    #[test]
    fn rejects_slash_abuse() {
        for name in ["/lead", "trail/", "a//b"] {
            assert!(validate_branch_name(name).is_err(), "{name} should be invalid");
        }
    }
}
