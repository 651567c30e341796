//! Message validation
//!
//! Runs on the raw message before any normalization or index query.

use profanity_common::config::ValidationConfig;
use profanity_common::errors::{AppError, Result};

/// Check presence and size limits, returning the message on success
pub fn validate_message<'a>(message: Option<&'a str>, limits: &ValidationConfig) -> Result<&'a str> {
    let message = message.ok_or_else(|| AppError::MissingField {
        field: "message".to_string(),
    })?;

    let words = message.split_whitespace().count();
    let chars = message.chars().count();

    if words > limits.max_words {
        return Err(AppError::MessageTooLong {
            message: format!("{} words exceeds limit of {}", words, limits.max_words),
        });
    }
    if chars > limits.max_chars {
        return Err(AppError::MessageTooLong {
            message: format!("{} characters exceeds limit of {}", chars, limits.max_chars),
        });
    }
    if words < limits.min_words {
        return Err(AppError::MessageTooShort {
            words,
            min: limits.min_words,
        });
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn test_missing_message() {
        assert!(matches!(
            validate_message(None, &limits()),
            Err(AppError::MissingField { .. })
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            validate_message(Some("hello"), &limits()),
            Err(AppError::MessageTooShort { words: 1, min: 2 })
        ));
        assert!(matches!(
            validate_message(Some("   "), &limits()),
            Err(AppError::MessageTooShort { words: 0, .. })
        ));
    }

    #[test]
    fn test_word_limit() {
        let at_limit = vec!["word"; 35].join(" ");
        assert!(validate_message(Some(&at_limit), &limits()).is_ok());

        let over = vec!["word"; 36].join(" ");
        assert!(matches!(
            validate_message(Some(&over), &limits()),
            Err(AppError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_char_limit() {
        let long = format!("{} end", "a".repeat(1000));
        assert!(matches!(
            validate_message(Some(&long), &limits()),
            Err(AppError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_valid_message_passes_through_unchanged() {
        assert_eq!(
            validate_message(Some("hello  world"), &limits()).unwrap(),
            "hello  world"
        );
    }
}
