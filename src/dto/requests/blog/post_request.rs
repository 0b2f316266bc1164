use chrono::{DateTime, Utc};
use serde_derive::Deserialize;

use crate::{
    domain::{blog::post::PostStatus, search_filter::filters::parse_timestamp},
    errors::code_error::CodeErrorResp,
    util::string::validations::Validator,
};

#[derive(Deserialize)]
pub struct PostRequest {
    pub title: Option<String>,
    pub short: Option<String>,
    pub content: Option<String>,
    pub thumb: Option<String>,
    pub status: Option<i16>,
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`; only read when `status` is 3.
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub categories: Vec<i64>,
}

/// A post body that passed validation.
pub struct ValidPost<'a> {
    pub title: &'a str,
    pub short: &'a str,
    pub content: &'a str,
    pub thumb: Option<&'a str>,
    pub status: Option<PostStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl PostRequest {
    pub fn validate(&self) -> Result<ValidPost<'_>, CodeErrorResp> {
        let mut validator = Validator::new();
        validator
            .required("title", self.title.as_deref())
            .required_text("short", self.short.as_deref())
            .required_text("content", self.content.as_deref())
            .sometimes("thumb", self.thumb.as_deref())
            .in_range("status", self.status, PostStatus::Draft.as_i16(), PostStatus::Scheduled.as_i16());

        let scheduled_at = match self.scheduled_at.as_deref() {
            Some(raw) if self.status == Some(PostStatus::Scheduled.as_i16()) => {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    validator.invalid("scheduled_at", "The scheduled_at field must be a valid date.");
                }
                parsed
            }
            _ => None,
        };

        validator.finish()?;

        Ok(ValidPost {
            title: self.title.as_deref().unwrap_or_default(),
            short: self.short.as_deref().unwrap_or_default(),
            content: self.content.as_deref().unwrap_or_default(),
            thumb: self.thumb.as_deref(),
            status: self.status.and_then(PostStatus::from_i16),
            scheduled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> PostRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_required_fields() {
        let err = request(r#"{"title":"x"}"#).validate().err().unwrap();
        let errors = err.errors.unwrap();
        assert!(errors.contains_key("short"));
        assert!(errors.contains_key("content"));
        assert!(!errors.contains_key("title"));
    }

    #[test]
    fn test_status_out_of_range() {
        let err = request(r#"{"title":"t","short":"s","content":"c","status":7}"#)
            .validate()
            .err()
            .unwrap();
        assert!(err.errors.unwrap().contains_key("status"));
    }

    #[test]
    fn test_scheduled_post_parses_timestamp() {
        let req = request(
            r#"{"title":"t","short":"s","content":"c","status":3,"scheduled_at":"2030-01-02 03:04:05","categories":[1,2]}"#,
        );
        let valid = req.validate().unwrap();
        assert_eq!(valid.status, Some(PostStatus::Scheduled));
        assert_eq!(valid.scheduled_at.unwrap().to_rfc3339(), "2030-01-02T03:04:05+00:00");
        assert_eq!(req.categories, vec![1, 2]);
    }

    #[test]
    fn test_bad_schedule_is_rejected() {
        let err = request(r#"{"title":"t","short":"s","content":"c","status":3,"scheduled_at":"soon"}"#)
            .validate()
            .err()
            .unwrap();
        assert!(err.errors.unwrap().contains_key("scheduled_at"));
    }
}
