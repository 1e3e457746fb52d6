use serde::Serialize;

use crate::users::dto::CreateUserRequest;

pub const MIN_PASSWORD_LEN: usize = 6;

/// One violated rule, shaped like the entries of an `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// What the client sent for this field; omitted when the field was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub msg: String,
    pub param: &'static str,
    pub location: &'static str,
}

impl FieldError {
    fn body(param: &'static str, value: Option<&str>, msg: impl Into<String>) -> Self {
        Self {
            value: value.map(Into::into),
            msg: msg.into(),
            param,
            location: "body",
        }
    }
}

fn is_blank(v: Option<&str>) -> bool {
    v.map_or(true, str::is_empty)
}

/// Checks every rule and reports all failures, not just the first.
pub fn validate_create(req: &CreateUserRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if is_blank(req.name.as_deref()) {
        errors.push(FieldError::body("name", req.name.as_deref(), "name is required"));
    }
    if is_blank(req.email.as_deref()) {
        errors.push(FieldError::body("email", req.email.as_deref(), "email is required"));
    }
    let password_len = req.password.as_deref().map_or(0, |p| p.chars().count());
    if password_len < MIN_PASSWORD_LEN {
        errors.push(FieldError::body(
            "password",
            req.password.as_deref(),
            "password is required",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
