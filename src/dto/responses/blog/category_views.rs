use serde_derive::Serialize;

use crate::domain::blog::category::{Category, CategoryBrief, CategoryChild};

impl From<Category> for CategoryBrief {
    fn from(category: Category) -> Self {
        CategoryBrief {
            id: category.id,
            name: category.name,
        }
    }
}

/// Authenticated listing row; content stays hidden.
#[derive(Serialize)]
pub struct CategoryListItem {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub status: i16,
}

impl From<Category> for CategoryListItem {
    fn from(category: Category) -> Self {
        CategoryListItem {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            status: category.status,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub content: Option<String>,
}

impl From<Category> for CategoryRecord {
    fn from(category: Category) -> Self {
        CategoryRecord {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            content: category.content,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub content: Option<String>,
    pub parent: Option<CategoryBrief>,
    pub children: Vec<CategoryChild>,
}

impl CategoryDetail {
    pub fn new(category: Category, parent: Option<CategoryBrief>, children: Vec<CategoryChild>) -> Self {
        CategoryDetail {
            id: category.id,
            name: category.name,
            content: category.content,
            parent,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Category {
        Category {
            id: 5,
            parent_id: Some(1),
            name: "Async".into(),
            content: Some("about async".into()),
            status: 1,
            deleted_at: None,
        }
    }

    #[test]
    fn test_brief_is_id_and_name() {
        let json = serde_json::to_value(CategoryBrief::from(sample())).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "name": "Async"}));
    }

    #[test]
    fn test_detail_nests_relations() {
        let detail = CategoryDetail::new(
            sample(),
            Some(CategoryBrief {
                id: 1,
                name: "Rust".into(),
            }),
            vec![],
        );
        let json = serde_json::to_value(detail).unwrap();
        assert_eq!(json["parent"]["name"], "Rust");
        assert_eq!(json["children"], serde_json::json!([]));
        assert!(json.get("parent_id").is_none());
        assert!(json.get("status").is_none());
    }
}
