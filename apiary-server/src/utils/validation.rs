//! Input validation helpers

use shared::error::AppError;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

// ── Text length limits ──────────────────────────────────────────────

/// Order notes
pub const MAX_NOTE_LEN: usize = 500;

/// URLs / image paths (custom logos may be data URLs)
pub const MAX_URL_LEN: usize = 2_000_000;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Helpers ─────────────────────────────────────────────────────────

/// Run `validator` on a payload, mapping failures to a 400 [`AppError`]
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(validation_error)
}

/// Flatten validator errors into one message plus per-field details
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut messages = Vec::new();
    collect_messages("", &errors, &mut messages);
    messages.sort();

    let summary = messages
        .iter()
        .map(|(_, msg)| msg.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let mut err = AppError::validation(if summary.is_empty() {
        "Validation failed".to_string()
    } else {
        summary
    });
    for (field, msg) in messages {
        err = err.with_detail(field, msg);
    }
    err
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{path} is invalid ({})", e.code));
                    out.push((path.clone(), msg));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}
