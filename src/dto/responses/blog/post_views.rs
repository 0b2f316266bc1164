use chrono::{DateTime, Utc};
use serde_derive::Serialize;

use crate::domain::{
    blog::{
        category::CategoryBrief,
        post::{LoadedPost, Post, display_thumb, display_title},
    },
    user::Author,
};

/// Public and trash listings: no body, no status, no author id.
#[derive(Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub short: String,
    pub thumb: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryBrief>,
    pub author: Option<Author>,
}

impl From<LoadedPost> for PostSummary {
    fn from(loaded: LoadedPost) -> Self {
        let LoadedPost {
            post,
            categories,
            author,
        } = loaded;
        PostSummary {
            id: post.id,
            title: display_title(&post.title),
            thumb: display_thumb(post.thumb.as_deref()),
            short: post.short,
            created_at: post.created_at,
            updated_at: post.updated_at,
            categories: categories.unwrap_or_default(),
            author,
        }
    }
}

/// The authenticated listing keeps `author_id` and `status`.
#[derive(Serialize)]
pub struct PostListItem {
    pub id: i64,
    pub author_id: Option<i64>,
    pub title: String,
    pub short: String,
    pub thumb: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryBrief>,
    pub author: Option<Author>,
}

impl From<LoadedPost> for PostListItem {
    fn from(loaded: LoadedPost) -> Self {
        let LoadedPost {
            post,
            categories,
            author,
        } = loaded;
        PostListItem {
            id: post.id,
            author_id: post.author_id,
            title: display_title(&post.title),
            thumb: display_thumb(post.thumb.as_deref()),
            short: post.short,
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
            categories: categories.unwrap_or_default(),
            author,
        }
    }
}

#[derive(Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub short: String,
    pub content: String,
    pub thumb: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryBrief>,
    pub author: Option<Author>,
}

impl From<LoadedPost> for PostDetail {
    fn from(loaded: LoadedPost) -> Self {
        let LoadedPost {
            post,
            categories,
            author,
        } = loaded;
        PostDetail {
            id: post.id,
            title: display_title(&post.title),
            thumb: display_thumb(post.thumb.as_deref()),
            short: post.short,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            categories: categories.unwrap_or_default(),
            author,
        }
    }
}

/// What create, update and restore hand back under `data`.
#[derive(Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub short: String,
    pub content: String,
    pub thumb: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<i64>>,
}

impl PostRecord {
    pub fn new(post: Post, categories: Option<Vec<i64>>) -> Self {
        PostRecord {
            id: post.id,
            title: display_title(&post.title),
            thumb: display_thumb(post.thumb.as_deref()),
            short: post.short,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoadedPost {
        let now = Utc::now();
        LoadedPost {
            post: Post {
                id: 4,
                author_id: Some(9),
                title: "rust in production".into(),
                short: "short".into(),
                content: "long body".into(),
                thumb: None,
                status: 1,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
            categories: Some(vec![CategoryBrief {
                id: 2,
                name: "Systems".into(),
            }]),
            author: None,
        }
    }

    #[test]
    fn test_summary_hides_private_fields() {
        let json = serde_json::to_value(PostSummary::from(sample())).unwrap();
        assert_eq!(json["title"], "Rust in production");
        assert_eq!(json["thumb"], "No Image");
        assert_eq!(json["categories"][0]["name"], "Systems");
        for hidden in ["content", "author_id", "status", "deleted_at"] {
            assert!(json.get(hidden).is_none(), "{hidden} leaked");
        }
    }

    #[test]
    fn test_list_item_keeps_status() {
        let json = serde_json::to_value(PostListItem::from(sample())).unwrap();
        assert_eq!(json["status"], 1);
        assert_eq!(json["author_id"], 9);
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_detail_includes_content() {
        let json = serde_json::to_value(PostDetail::from(sample())).unwrap();
        assert_eq!(json["content"], "long body");
        assert!(json.get("status").is_none());
    }
}
