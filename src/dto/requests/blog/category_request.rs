use serde::{Deserialize, Deserializer};

use crate::{
    domain::blog::category::{CATEGORY_ACTIVE, CATEGORY_INACTIVE, Category, CategoryForm},
    errors::code_error::CodeErrorResp,
    util::string::validations::Validator,
};

/// Absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub parent_id: Option<Option<i64>>,
    pub status: Option<i16>,
}

impl CategoryRequest {
    /// Shape checks only; the caller still has to confirm `parent_id` exists.
    /// On update, `current` supplies whatever the body leaves out; an explicit
    /// `"parent_id": null` moves the category to the top level.
    pub fn into_form(self, current: Option<&Category>) -> Result<CategoryForm, CodeErrorResp> {
        let parent_id = match (self.parent_id, current) {
            (Some(parent_id), _) => parent_id,
            (None, Some(current)) => current.parent_id,
            (None, None) => None,
        };

        let mut validator = Validator::new();
        validator
            .required("name", self.name.as_deref())
            .in_range("status", self.status, CATEGORY_INACTIVE, CATEGORY_ACTIVE);
        if let Some(current) = current {
            if parent_id == Some(current.id) {
                validator.invalid("parent_id", "A category cannot be its own parent.");
            }
        }
        validator.finish()?;

        Ok(CategoryForm {
            parent_id,
            name: self.name.unwrap_or_default().trim().to_owned(),
            content: self.content.or_else(|| current.and_then(|c| c.content.clone())),
            status: self
                .status
                .or(current.map(|c| c.status))
                .unwrap_or(CATEGORY_ACTIVE),
        })
    }
}
