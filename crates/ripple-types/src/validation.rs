use std::sync::OnceLock;

use regex::Regex;

use crate::forms::{PictureMeta, UserForm};

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_MICROPOST_LENGTH: usize = 140;
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;
pub const PICTURE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Full-sentence messages, one per violated constraint, in field order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Whether a blank password is acceptable (profile edits keep the old one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    Required,
    KeepIfBlank,
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i-u)^[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+$")
            .expect("Regex should compile")
    })
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Password fields left empty on a profile edit mean "unchanged".
pub fn password_unchanged(form: &UserForm) -> bool {
    form.password.is_empty() && form.password_confirmation.is_empty()
}

/// Checks everything about a user that does not need the database.
/// Email uniqueness is checked by the caller against storage.
pub fn validate_user(form: &UserForm, policy: PasswordPolicy) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(&form.name) {
        errors.add("Name can't be blank");
    } else if form.name.chars().count() > MAX_NAME_LENGTH {
        errors.add(format!(
            "Name is too long (maximum is {} characters)",
            MAX_NAME_LENGTH
        ));
    }

    if is_blank(&form.email) {
        errors.add("Email can't be blank");
    } else if form.email.chars().count() > MAX_EMAIL_LENGTH {
        errors.add(format!(
            "Email is too long (maximum is {} characters)",
            MAX_EMAIL_LENGTH
        ));
    } else if !email_regex().is_match(&form.email) {
        errors.add("Email is invalid");
    }

    if !(policy == PasswordPolicy::KeepIfBlank && password_unchanged(form)) {
        validate_password(form, &mut errors);
    }

    errors.into_result()
}

fn validate_password(form: &UserForm, errors: &mut ValidationErrors) {
    if is_blank(&form.password) {
        errors.add("Password can't be blank");
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(format!(
            "Password is too short (minimum is {} characters)",
            MIN_PASSWORD_LENGTH
        ));
    }
    if form.password != form.password_confirmation {
        errors.add("Password confirmation doesn't match Password");
    }
}

pub fn validate_micropost(
    content: &str,
    picture: Option<&PictureMeta>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(content) {
        errors.add("Content can't be blank");
    } else if content.chars().count() > MAX_MICROPOST_LENGTH {
        errors.add(format!(
            "Content is too long (maximum is {} characters)",
            MAX_MICROPOST_LENGTH
        ));
    }

    if let Some(picture) = picture {
        if !PICTURE_CONTENT_TYPES.contains(&picture.content_type.as_str()) {
            errors.add("Picture must be a JPEG, PNG or GIF image");
        }
        if picture.size >= MAX_PICTURE_BYTES {
            errors.add("Picture should be less than 5MB");
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> UserForm {
        UserForm {
            name: "Example User".into(),
            email: "user@example.com".into(),
            password: "foobar".into(),
            password_confirmation: "foobar".into(),
        }
    }

    fn rejects(form: &UserForm) -> bool {
        validate_user(form, PasswordPolicy::Required).is_err()
    }

    #[test]
    fn valid_user_passes() {
        assert!(validate_user(&valid_form(), PasswordPolicy::Required).is_ok());
    }

    #[test]
    fn name_must_be_present_and_short() {
        let mut form = valid_form();
        form.name = "   ".into();
        assert!(rejects(&form));

        form.name = "a".repeat(51);
        assert!(rejects(&form));

        form.name = "a".repeat(50);
        assert!(!rejects(&form));
    }

    #[test]
    fn email_must_be_present_and_short() {
        let mut form = valid_form();
        form.email = " ".into();
        assert!(rejects(&form));

        form.email = format!("{}@example.com", "a".repeat(244));
        let errors = validate_user(&form, PasswordPolicy::Required).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["Email is too long (maximum is 255 characters)"]
        );
    }

    #[test]
    fn email_accepts_valid_addresses() {
        for address in [
            "user@example.com",
            "USER@foo.COM",
            "A_US-ER@foo.bar.org",
            "first.last@foo.jp",
            "alice+bob@baz.cn",
        ] {
            let mut form = valid_form();
            form.email = address.into();
            assert!(!rejects(&form), "{address:?} should be valid");
        }
    }

    #[test]
    fn email_rejects_invalid_addresses() {
        for address in [
            "user@example,com",
            "user_at_foo.org",
            "user.name@example.",
            "foo@bar_baz.com",
            "foo@bar+baz.com",
            "foo@bar..com",
            "josé@example.com",
            "用户@example.com",
            "user@exa١mple.com",
            "user@example.\u{212A}om",
        ] {
            let mut form = valid_form();
            form.email = address.into();
            assert!(rejects(&form), "{address:?} should be invalid");
        }
    }

    #[test]
    fn password_must_be_non_blank_and_long_enough() {
        let mut form = valid_form();
        form.password = " ".repeat(6);
        form.password_confirmation = form.password.clone();
        assert!(rejects(&form));

        form.password = "a".repeat(5);
        form.password_confirmation = form.password.clone();
        assert!(rejects(&form));
    }

    #[test]
    fn password_must_match_confirmation() {
        let mut form = valid_form();
        form.password_confirmation = "barfoo".into();
        let errors = validate_user(&form, PasswordPolicy::Required).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["Password confirmation doesn't match Password"]
        );
    }

    #[test]
    fn blank_password_is_kept_on_edit() {
        let mut form = valid_form();
        form.password.clear();
        form.password_confirmation.clear();
        assert!(validate_user(&form, PasswordPolicy::KeepIfBlank).is_ok());
        assert!(validate_user(&form, PasswordPolicy::Required).is_err());
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(normalize_email("Foo@ExAMPle.CoM"), "foo@example.com");
    }

    #[test]
    fn micropost_content_rules() {
        assert!(validate_micropost("hello", None).is_ok());
        assert!(validate_micropost("   ", None).is_err());
        assert!(validate_micropost(&"a".repeat(140), None).is_ok());
        assert!(validate_micropost(&"a".repeat(141), None).is_err());
    }

    #[test]
    fn micropost_picture_rules() {
        let png = PictureMeta { content_type: "image/png".into(), size: 1024 };
        assert!(validate_micropost("pic", Some(&png)).is_ok());

        let pdf = PictureMeta { content_type: "application/pdf".into(), size: 1024 };
        assert!(validate_micropost("pic", Some(&pdf)).is_err());

        let huge = PictureMeta { content_type: "image/gif".into(), size: MAX_PICTURE_BYTES };
        let errors = validate_micropost("pic", Some(&huge)).unwrap_err();
        assert_eq!(errors.messages(), ["Picture should be less than 5MB"]);
    }
}
