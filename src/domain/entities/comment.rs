use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_COMMENT_AVATAR, DEFAULT_USER_AVATAR};

/// Comment joined with its registered author, when there is one.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub author_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub author_username: Option<String>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentInsert {
    pub blog_id: Uuid,
    pub author_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub content: String,
    pub parent_id: Option<Uuid>,
}

/// Body of a comment submission. Every field is optional on the wire so that
/// missing values are reported as field errors instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Registered visitor submitting a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commenter {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub author_name: String,
    pub avatar_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_reply: bool,
    pub parent_id: Option<Uuid>,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct PostedComment {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: String,
    pub avatar_url: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PostedCommentResponse {
    pub success: bool,
    pub comment: PostedComment,
    pub message: String,
}

/// Admin listing row, including moderated comments.
#[derive(Debug, Serialize)]
pub struct CommentAdminView {
    pub id: Uuid,
    pub author: String,
    pub email: Option<String>,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CommentModerationRequest {
    pub active: bool,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_registered(&self) -> bool {
        self.author_id.is_some()
    }

    /// Full name, then username for registered authors; the supplied name,
    /// then "Anonymous" otherwise.
    pub fn author_name(&self) -> String {
        if self.is_registered() {
            let full_name = format!(
                "{} {}",
                self.author_first_name.as_deref().unwrap_or_default(),
                self.author_last_name.as_deref().unwrap_or_default()
            );
            let full_name = full_name.trim();
            if !full_name.is_empty() {
                return full_name.to_string();
            }
            if let Some(username) = self.author_username.as_deref().filter(|u| !u.is_empty()) {
                return username.to_string();
            }
        }

        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Anonymous")
            .to_string()
    }

    /// `static_url` is the site's static asset prefix, e.g. `/static/`.
    pub fn avatar_url(&self, static_url: &str) -> String {
        let static_asset = |path: &str| {
            format!("{}/{}", static_url.trim_end_matches('/'), path)
        };

        if self.is_registered() {
            self.author_avatar_url
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| static_asset(DEFAULT_USER_AVATAR))
        } else {
            static_asset(DEFAULT_COMMENT_AVATAR)
        }
    }

    pub fn to_posted(&self, static_url: &str) -> PostedComment {
        PostedComment {
            id: self.id,
            author: self.author_name(),
            content: self.content.clone(),
            created_at: self.created_at.format("%b %d, %Y, %I:%M %p").to_string(),
            avatar_url: self.avatar_url(static_url),
            parent_id: self.parent_id,
        }
    }

    pub fn to_admin_view(&self) -> CommentAdminView {
        CommentAdminView {
            id: self.id,
            author: self.author_name(),
            email: self.email.clone(),
            content: self.content.clone(),
            parent_id: self.parent_id,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    pub fn anonymous(blog_id: Uuid, name: Option<&str>, minutes: i64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            blog_id,
            author_id: None,
            name: name.map(String::from),
            email: None,
            content: format!("comment at {minutes}"),
            parent_id: None,
            active: true,
            created_at: Utc::now() + Duration::minutes(minutes),
            author_username: None,
            author_first_name: None,
            author_last_name: None,
            author_avatar_url: None,
        }
    }

    pub fn registered(blog_id: Uuid, username: &str, first: &str, last: &str) -> Comment {
        Comment {
            author_id: Some(Uuid::new_v4()),
            name: None,
            author_username: Some(username.into()),
            author_first_name: Some(first.into()),
            author_last_name: Some(last.into()),
            ..anonymous(blog_id, None, 0)
        }
    }
}
