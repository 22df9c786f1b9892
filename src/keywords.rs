//! Keyword validation
//!
//! Keywords are restricted to lowercase ASCII letters, digits, `_` and `-`.
//! They are checked before a request is built so a bad keyword never
//! reaches the wire.

use crate::error::{ApplicationError, ApplicationErrorKind, Result};

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Check a single keyword
pub fn validate_keyword(keyword: &str) -> Result<()> {
    if keyword.is_empty() {
        return Err(
            ApplicationError::new(ApplicationErrorKind::InvalidKeyword, "invalid keyword: empty")
                .into(),
        );
    }
    if let Some(bad) = keyword.chars().find(|c| !is_keyword_char(*c)) {
        return Err(ApplicationError::new(
            ApplicationErrorKind::InvalidKeyword,
            format!("invalid keyword {:?}: character {:?} not allowed", keyword, bad),
        )
        .into());
    }
    Ok(())
}

/// Check every keyword, failing on the first bad one
pub fn validate_keywords<S: AsRef<str>>(keywords: &[S]) -> Result<()> {
    keywords.iter().try_for_each(|k| validate_keyword(k.as_ref()))
}

/// Whether a keyword would pass [`validate_keyword`]
pub fn is_valid_keyword(keyword: &str) -> bool {
    !keyword.is_empty() && keyword.chars().all(is_keyword_char)
}
