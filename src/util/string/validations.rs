use crate::errors::code_error::{CodeErrorResp, FieldErrors, validation_err};

pub const MAX_STRING_LEN: usize = 255;

/// Collects per-field failures; `finish` turns any into a 422.
#[derive(Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_owned()).or_default().push(message);
    }

    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) if !v.trim().is_empty() => {
                if v.chars().count() > MAX_STRING_LEN {
                    self.push(
                        field,
                        format!("The {field} field must not be greater than {MAX_STRING_LEN} characters."),
                    );
                }
            }
            _ => self.push(field, format!("The {field} field is required.")),
        }
        self
    }

    /// Like `required` but only for fields whose column is unbounded text.
    pub fn required_text(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.push(field, format!("The {field} field is required."));
        }
        self
    }

    /// Present-but-blank fails; absent passes.
    pub fn sometimes(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.is_some() {
            self.required(field, value);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) if !v.trim().is_empty() => {
                if !email_address::EmailAddress::is_valid(v) {
                    self.push(field, format!("The {field} field must be a valid email address."));
                }
            }
            Some(_) | None => self.push(field, format!("The {field} field is required.")),
        }
        self
    }

    pub fn confirmed(
        &mut self,
        field: &str,
        value: Option<&str>,
        confirmation: Option<&str>,
    ) -> &mut Self {
        if value.is_some() && value != confirmation {
            self.push(field, format!("The {field} field confirmation does not match."));
        }
        self
    }

    /// Only checks length; pair with `required`/`sometimes` for presence.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.trim().chars().count() > max) {
            self.push(field, format!("The {field} field must not be greater than {max} characters."));
        }
        self
    }

    pub fn in_range(&mut self, field: &str, value: Option<i16>, min: i16, max: i16) -> &mut Self {
        if let Some(v) = value {
            if v < min || v > max {
                self.push(field, format!("The {field} field must be between {min} and {max}."));
            }
        }
        self
    }

    /// Records a failure the built-in rules don't cover.
    pub fn invalid(&mut self, field: &str, message: &str) -> &mut Self {
        self.push(field, message.to_owned());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> Result<(), CodeErrorResp> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(validation_err(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_are_required_failures() {
        let mut v = Validator::new();
        v.required("first_name", None).required("last_name", Some("   "));
        let err = v.finish().unwrap_err();

        let errors = err.errors.unwrap();
        assert_eq!(errors["first_name"], vec!["The first_name field is required."]);
        assert_eq!(errors["last_name"], vec!["The last_name field is required."]);
    }

    #[test]
    fn test_email_and_confirmation() {
        let mut v = Validator::new();
        v.email("email", Some("a@b.com"))
            .required("password", Some("hunter22"))
            .confirmed("password", Some("hunter22"), Some("hunter22"));
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.email("email", Some("not-an-email"))
            .confirmed("password", Some("hunter22"), None);
        let errors = v.finish().unwrap_err().errors.unwrap();
        assert!(errors.contains_key("email"));
        assert_eq!(
            errors["password"],
            vec!["The password field confirmation does not match."]
        );
    }

    #[test]
    fn test_sometimes_skips_absent_fields() {
        let mut v = Validator::new();
        v.sometimes("nickname", None);
        assert!(v.is_valid());

        v.sometimes("nickname", Some(""));
        assert!(!v.is_valid());
    }

    #[test]
    fn test_max_len() {
        let mut v = Validator::new();
        v.max_len("type", Some("editor"), 32).max_len("type", None, 32);
        assert!(v.is_valid());

        v.max_len("type", Some(&"x".repeat(33)), 32);
        let errors = v.finish().unwrap_err().errors.unwrap();
        assert_eq!(
            errors["type"],
            vec!["The type field must not be greater than 32 characters."]
        );
    }

    #[test]
    fn test_status_range() {
        let mut v = Validator::new();
        v.in_range("status", Some(3), 0, 3).in_range("status", None, 0, 3);
        assert!(v.is_valid());

        v.in_range("status", Some(4), 0, 3);
        assert!(!v.is_valid());
    }
}
