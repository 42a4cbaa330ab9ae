use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::NewContent;

/// Per-field messages plus messages about the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub form: Vec<String>,
}

impl FormErrors {
    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Messages keyed by field, with an entry (possibly empty) for each of
    /// `names`, ready for a template.
    pub fn by_field(&self, names: &[&str]) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = names
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        for (name, messages) in &self.fields {
            out.entry(name.clone()).or_default().extend(messages.iter().cloned());
        }
        out
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add_field(&field.to_string(), message);
            }
        }
        out
    }
}

/// A form that failed validation, kept so it can be shown again.
#[derive(Debug)]
pub struct Rejected<F> {
    pub form: F,
    pub errors: FormErrors,
}

/// Normalize, then validate.
pub trait CleanForm: Validate + Sized {
    fn normalize(self) -> Self;

    fn clean(self) -> Result<Self, Rejected<Self>> {
        let form = self.normalize();
        match form.validate() {
            Ok(()) => Ok(form),
            Err(errors) => Err(Rejected {
                form,
                errors: errors.into(),
            }),
        }
    }
}

fn message(code: &'static str, text: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(text));
    err
}

/// Text columns cannot store NUL, so it never gets past a form.
fn no_null_chars(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(message("null_characters_not_allowed", "Null characters are not allowed."));
    }
    Ok(())
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(message("required", "This field is required."));
    }
    no_null_chars(value)
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(message(
            "invalid",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn valid_password(value: &str) -> Result<(), ValidationError> {
    no_null_chars(value)?;
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return Err(message("password_entirely_numeric", "This password is entirely numeric."));
    }
    Ok(())
}

/// Title and body of a new resource or forum post.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ContentForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub content: String,
}

impl CleanForm for ContentForm {
    fn normalize(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

impl From<ContentForm> for NewContent {
    fn from(form: ContentForm) -> Self {
        NewContent {
            title: form.title,
            content: form.content,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 2000, message = "Ensure this value has at most 2000 characters.")
    )]
    pub body: String,
}

impl CleanForm for CommentForm {
    fn normalize(self) -> Self {
        Self {
            body: self.body.trim().to_string(),
        }
    }
}

/// Registration form. Passwords are never echoed back into a page.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(
        custom(function = "valid_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(
        length(min = 8, message = "This password is too short. It must contain at least 8 characters."),
        custom(function = "valid_password")
    )]
    pub password: String,

    #[serde(default, skip_serializing)]
    #[validate(must_match(other = "password", message = "The two password fields didn't match."))]
    pub password_confirm: String,
}

impl CleanForm for SignupForm {
    fn normalize(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(custom(function = "required"))]
    pub password: String,

    /// Where to go after logging in
    #[serde(default)]
    pub next: Option<String>,
}

impl CleanForm for LoginForm {
    fn normalize(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            next: self.next.filter(|next| !next.is_empty()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str, body: &str) -> ContentForm {
        ContentForm {
            title: title.to_string(),
            content: body.to_string(),
        }
    }

    fn signup(username: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn content_form_trims_and_accepts() {
        let form = content("  Nutrition Guide ", "Eat well.\n").clean().unwrap();
        assert_eq!(form.title, "Nutrition Guide");
        assert_eq!(form.content, "Eat well.");
    }

    #[test]
    fn content_form_requires_both_fields() {
        let rejected = content("   ", "").clean().unwrap_err();
        assert_eq!(rejected.errors.field("title"), ["This field is required."]);
        assert_eq!(rejected.errors.field("content"), ["This field is required."]);
        assert!(rejected.errors.form.is_empty());
    }

    #[test]
    fn content_form_limits_title_length() {
        let rejected = content(&"x".repeat(201), "body").clean().unwrap_err();
        assert_eq!(
            rejected.errors.field("title"),
            ["Ensure this value has at most 200 characters."]
        );
        assert!(content(&"x".repeat(200), "body").clean().is_ok());
    }

    #[test]
    fn comment_form_rejects_blank_body() {
        let rejected = CommentForm { body: " \n ".into() }.clean().unwrap_err();
        assert_eq!(rejected.form.body, "");
        assert_eq!(rejected.errors.field("body"), ["This field is required."]);
    }

    #[test]
    fn signup_form_rules() {
        assert!(signup("alice", "correct horse", "correct horse").clean().is_ok());

        let rejected = signup("al ice", "12345678", "12345679").clean().unwrap_err();
        assert_eq!(rejected.errors.field("username").len(), 1);
        assert_eq!(rejected.errors.field("password"), ["This password is entirely numeric."]);
        assert_eq!(
            rejected.errors.field("password_confirm"),
            ["The two password fields didn't match."]
        );

        let rejected = signup("bob", "short", "short").clean().unwrap_err();
        assert!(rejected.errors.field("password")[0].starts_with("This password is too short."));
    }

    #[test]
    fn null_characters_are_rejected_everywhere() {
        const NULL_CHARS: &str = "Null characters are not allowed.";

        let rejected = content("a\0b", "x\0").clean().unwrap_err();
        assert_eq!(rejected.errors.field("title"), [NULL_CHARS]);
        assert_eq!(rejected.errors.field("content"), [NULL_CHARS]);

        let rejected = CommentForm { body: "hi\0".into() }.clean().unwrap_err();
        assert_eq!(rejected.errors.field("body"), [NULL_CHARS]);

        let rejected = signup("al\0ice", "pass\0word", "pass\0word").clean().unwrap_err();
        assert_eq!(rejected.errors.field("username"), [NULL_CHARS]);
        assert_eq!(rejected.errors.field("password"), [NULL_CHARS]);

        let rejected = LoginForm {
            username: "alice\0".into(),
            password: "\0".into(),
            next: None,
        }
        .clean()
        .unwrap_err();
        assert_eq!(rejected.errors.field("username"), [NULL_CHARS]);
        assert_eq!(rejected.errors.field("password"), [NULL_CHARS]);
    }

    #[test]
    fn signup_form_never_serializes_passwords() {
        let json = serde_json::to_value(signup("alice", "secret-pass", "secret-pass")).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "alice" }));
    }

    #[test]
    fn login_form_drops_empty_next() {
        let form = LoginForm {
            username: " alice ".into(),
            password: "pw".into(),
            next: Some(String::new()),
        }
        .clean()
        .unwrap();
        assert_eq!(form.username, "alice");
        assert_eq!(form.next, None);
    }
}
