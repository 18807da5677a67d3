//! Input validation helpers shared by request DTOs.
//!
//! DTOs derive [`validator::Validate`]; handlers call [`validate_input`] before
//! touching the database so malformed requests never reach a transaction.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Run a DTO's validation rules and flatten failures into [`CoreError::Validation`].
///
/// The message lists `field: reason` pairs sorted by field path, e.g.
/// `"tags[0].name: must not be empty; title: must not be empty"`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|errors| {
        let mut messages = Vec::new();
        collect_messages(&errors, "", &mut messages);
        messages.sort();
        CoreError::Validation(messages.join("; "))
    })
}

/// Field rule: reject empty and whitespace-only strings.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be empty"));
        return Err(err);
    }
    Ok(())
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let reason = err
                        .message
                        .as_deref()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("failed '{}' check", err.code));
                    out.push(format!("{path}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "crate::validation::non_blank"))]
        title: String,
        #[validate(range(min = -90.0, max = 90.0))]
        latitude: f64,
    }

    #[test]
    fn test_non_blank() {
        assert!(non_blank("coffee").is_ok());
        assert!(non_blank("").is_err());
        assert!(non_blank("  \t").is_err());
    }

    #[test]
    fn test_valid_input_passes() {
        let sample = Sample {
            title: "Coffee Shop".into(),
            latitude: 37.77,
        };
        assert!(validate_input(&sample).is_ok());
    }

    #[test]
    fn test_invalid_input_lists_each_field() {
        let sample = Sample {
            title: " ".into(),
            latitude: 123.0,
        };
        let err = validate_input(&sample).unwrap_err();
        let CoreError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.starts_with("latitude: "), "got {msg}");
        assert!(msg.contains("title: must not be empty"), "got {msg}");
    }
}
