/// A validation failure attached to a single form field.
///
/// Dialogs render these inline next to the offending input; they never leave
/// the dialog that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Return the message for `field`, if any.
pub fn error_for<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}

/// Check that `value` has at least `min` characters after trimming.
pub fn require_min_chars(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    min: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(FieldError::new(field, "This field is required"));
    } else if len < min {
        errors.push(FieldError::new(
            field,
            format!("Must be at least {min} characters"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_chars_counts_unicode_characters() {
        let mut errors = Vec::new();
        require_min_chars(&mut errors, "title", "目标", 2);
        assert!(errors.is_empty());
        require_min_chars(&mut errors, "title", " a ", 2);
        assert_eq!(error_for(&errors, "title"), Some("Must be at least 2 characters"));
    }

    #[test]
    fn empty_value_is_required() {
        let mut errors = Vec::new();
        require_min_chars(&mut errors, "title", "   ", 1);
        assert_eq!(error_for(&errors, "title"), Some("This field is required"));
    }
}
