//! Boundary validation for request parameters and bodies.
//!
//! Each input shape has an explicit function that walks the raw JSON and
//! either returns a typed value or every problem it found as [`FieldIssue`]s.
//! Validation never touches storage.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{FieldIssue, GradError};
use crate::types::{
    ApprovalState, ApprovalUpdate, ChecklistItemUpdate, DocumentStatus, LoginInput,
};

pub const CHECKLIST_REMARKS_MAX: usize = 1000;
pub const APPROVAL_REMARKS_MAX: usize = 2000;
pub const PASSWORD_MIN: usize = 8;

static STUDENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("static regex"));

pub type Result<T> = std::result::Result<T, GradError>;

/// Accumulates issues so a single response can report all of them.
#[derive(Debug, Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldIssue::new(path, message));
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(GradError::Validation(self.0))
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn as_object<'a>(body: &'a Value, path: &str, issues: &mut Issues) -> Option<&'a Map<String, Value>> {
    match body {
        Value::Object(map) => Some(map),
        other => {
            issues.push(path, format!("expected object, received {}", kind(other)));
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    issues: &mut Issues,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        None => {
            issues.push(join(prefix, key), "Required");
            None
        }
        Some(other) => {
            issues.push(
                join(prefix, key),
                format!("expected string, received {}", kind(other)),
            );
            None
        }
    }
}

fn required_bool(obj: &Map<String, Value>, prefix: &str, key: &str, issues: &mut Issues) -> Option<bool> {
    match obj.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        None => {
            issues.push(join(prefix, key), "Required");
            None
        }
        Some(other) => {
            issues.push(
                join(prefix, key),
                format!("expected boolean, received {}", kind(other)),
            );
            None
        }
    }
}

fn required_enum<T>(
    obj: &Map<String, Value>,
    prefix: &str,
    key: &str,
    allowed: &[&str],
    issues: &mut Issues,
) -> Option<T>
where
    T: FromStr,
{
    let raw = required_str(obj, prefix, key, issues)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            issues.push(
                join(prefix, key),
                format!(
                    "Invalid enum value. Expected {}, received '{raw}'",
                    allowed.join(" | ")
                ),
            );
            None
        }
    }
}

fn required_uuid(obj: &Map<String, Value>, prefix: &str, key: &str, issues: &mut Issues) -> Option<Uuid> {
    let raw = required_str(obj, prefix, key, issues)?;
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            issues.push(join(prefix, key), "Invalid uuid");
            None
        }
    }
}

/// Optional, nullable, trimmed free text. `Err(())` means an issue was recorded.
/// Blank text after trimming is stored as absent.
fn optional_text(
    obj: &Map<String, Value>,
    prefix: &str,
    key: &str,
    max: usize,
    issues: &mut Issues,
) -> std::result::Result<Option<String>, ()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.chars().count() > max {
                issues.push(
                    join(prefix, key),
                    format!("String must contain at most {max} character(s)"),
                );
                Err(())
            } else if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(other) => {
            issues.push(
                join(prefix, key),
                format!("expected string, received {}", kind(other)),
            );
            Err(())
        }
    }
}

fn names<T: AsRef<str>>(values: &[T]) -> Vec<&str> {
    values.iter().map(AsRef::as_ref).collect()
}

// ── Path parameters ───────────────────────────────────────────

pub fn validate_uuid(field: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| GradError::invalid(field, "Invalid uuid"))
}

pub fn validate_student_number(raw: &str) -> Result<String> {
    if STUDENT_NUMBER.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(GradError::invalid(
            "studentNumber",
            "studentNumber must be exactly 9 digits",
        ))
    }
}

// ── Bodies ────────────────────────────────────────────────────

/// `{username, password}`: username trimmed and non-empty, password at least 8 chars.
pub fn validate_login(body: &Value) -> Result<LoginInput> {
    let mut issues = Issues::default();
    let Some(obj) = as_object(body, "", &mut issues) else {
        return Err(GradError::Validation(issues.0));
    };

    let username = required_str(obj, "", "username", &mut issues).map(str::trim);
    if username == Some("") {
        issues.push("username", "String must contain at least 1 character(s)");
    }
    let password = required_str(obj, "", "password", &mut issues);
    if let Some(pw) = password {
        if pw.chars().count() < PASSWORD_MIN {
            issues.push(
                "password",
                format!("String must contain at least {PASSWORD_MIN} character(s)"),
            );
        }
    }

    issues.finish(|| LoginInput {
        username: username.unwrap_or_default().to_string(),
        password: password.unwrap_or_default().to_string(),
    })
}

/// `{items: [{documentTypeId, status, remarks?}, ...]}` with at least one item.
pub fn validate_checklist_update(body: &Value) -> Result<Vec<ChecklistItemUpdate>> {
    let mut issues = Issues::default();
    let Some(obj) = as_object(body, "", &mut issues) else {
        return Err(GradError::Validation(issues.0));
    };

    let raw_items = match obj.get("items") {
        Some(Value::Array(items)) => items,
        None => {
            issues.push("items", "Required");
            return Err(GradError::Validation(issues.0));
        }
        Some(other) => {
            issues.push("items", format!("expected array, received {}", kind(other)));
            return Err(GradError::Validation(issues.0));
        }
    };
    if raw_items.is_empty() {
        issues.push("items", "Array must contain at least 1 element(s)");
    }

    let allowed = names(&DocumentStatus::ALL);
    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        let prefix = format!("items.{index}");
        let Some(item) = as_object(raw, &prefix, &mut issues) else {
            continue;
        };
        let document_type_id = required_uuid(item, &prefix, "documentTypeId", &mut issues);
        let status = required_enum::<DocumentStatus>(item, &prefix, "status", &allowed, &mut issues);
        let remarks = optional_text(item, &prefix, "remarks", CHECKLIST_REMARKS_MAX, &mut issues);
        if let (Some(document_type_id), Some(status), Ok(remarks)) = (document_type_id, status, remarks) {
            items.push(ChecklistItemUpdate {
                document_type_id,
                status,
                remarks,
            });
        }
    }

    issues.finish(|| items)
}

/// `{approvalStatus, vpaaApproved, finalApproved, remarks?}`.
pub fn validate_approval_update(body: &Value) -> Result<ApprovalUpdate> {
    let mut issues = Issues::default();
    let Some(obj) = as_object(body, "", &mut issues) else {
        return Err(GradError::Validation(issues.0));
    };

    let allowed = names(&ApprovalState::ALL);
    let approval_status = required_enum::<ApprovalState>(obj, "", "approvalStatus", &allowed, &mut issues);
    let vpaa_approved = required_bool(obj, "", "vpaaApproved", &mut issues);
    let final_approved = required_bool(obj, "", "finalApproved", &mut issues);
    let remarks = optional_text(obj, "", "remarks", APPROVAL_REMARKS_MAX, &mut issues);

    match (approval_status, vpaa_approved, final_approved, remarks) {
        (Some(approval_status), Some(vpaa_approved), Some(final_approved), Ok(remarks)) => {
            issues.finish(|| ApprovalUpdate {
                approval_status,
                vpaa_approved,
                final_approved,
                remarks,
            })
        }
        _ => Err(GradError::Validation(issues.0)),
    }
}
