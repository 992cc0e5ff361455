//! Post DTOs.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates. Timestamps stay
//! opaque strings because the client only displays them.

use serde::{Deserialize, Serialize};

use crate::resource::{is_blank, Resource, Validate};

/// A post as returned by `GET /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub date: String,
    pub title: String,
    pub read_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Post {
    /// The editable fields of this post, e.g. to prefill an edit form.
    pub fn fields(&self) -> PostFields {
        PostFields {
            date: self.date.clone(),
            title: self.title.clone(),
            read_time: self.read_time.clone(),
        }
    }
}

impl Resource for Post {
    type Fields = PostFields;

    const PATH: &'static str = "/api/posts";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Request payload for creating or replacing a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    pub date: String,
    pub title: String,
    pub read_time: String,
}

impl PostFields {
    pub fn new(date: impl Into<String>, title: impl Into<String>, read_time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            read_time: read_time.into(),
        }
    }
}

impl Validate for PostFields {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("date", &self.date),
            ("title", &self.title),
            ("readTime", &self.read_time),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name)
        .collect()
    }
}
