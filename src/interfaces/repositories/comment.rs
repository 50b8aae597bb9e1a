use async_trait::async_trait;
use std::borrow::Cow;
use uuid::Uuid;

use crate::{
    entities::comment::{Comment, CommentInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxCommentRepo,
};

const PARENT_CONSTRAINT: &str = "comments_parent_same_post_fkey";

const COMMENT_COLUMNS: &str = r#"
    c.id, c.blog_id, c.author_id, c.name, c.email, c.content, c.parent_id, c.active, c.created_at,
    u.username AS author_username,
    u.first_name AS author_first_name,
    u.last_name AS author_last_name,
    u.avatar_url AS author_avatar_url
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Active comments of a post, oldest first.
    async fn active_for_post(&self, blog_id: &Uuid) -> Result<Vec<Comment>, AppError>;
    /// Every comment of a post regardless of moderation state, newest first.
    async fn list_for_post(&self, blog_id: &Uuid) -> Result<Vec<Comment>, AppError>;
    async fn belongs_to_post(&self, comment_id: &Uuid, blog_id: &Uuid) -> Result<bool, AppError>;
    async fn insert(&self, comment: &CommentInsert) -> Result<Comment, AppError>;
    async fn set_active(&self, id: &Uuid, active: bool) -> Result<Comment, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxCommentRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxCommentRepo { pool }
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepo {
    async fn active_for_post(&self, blog_id: &Uuid) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c LEFT JOIN users u ON u.id = c.author_id \
             WHERE c.blog_id = $1 AND c.active ORDER BY c.created_at ASC, c.id ASC"
        );

        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(blog_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn list_for_post(&self, blog_id: &Uuid) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c LEFT JOIN users u ON u.id = c.author_id \
             WHERE c.blog_id = $1 ORDER BY c.created_at DESC"
        );

        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(blog_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn belongs_to_post(&self, comment_id: &Uuid, blog_id: &Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1 AND blog_id = $2)",
        )
        .bind(comment_id)
        .bind(blog_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, comment: &CommentInsert) -> Result<Comment, AppError> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (blog_id, author_id, name, email, content, parent_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS} FROM c LEFT JOIN users u ON u.id = c.author_id
            "#
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.blog_id)
            .bind(comment.author_id)
            .bind(&comment.name)
            .bind(&comment.email)
            .bind(&comment.content)
            .bind(comment.parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                // The composite key rejects parents that live on another post.
                sqlx::Error::Database(db_err) if db_err.constraint() == Some(PARENT_CONSTRAINT) => {
                    AppError::invalid_field("parent", "Invalid parent comment.")
                }
                sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23514")) => {
                    AppError::invalid_field("content", "Comment content cannot be empty.")
                }
                _ => AppError::from(e),
            })
    }

    async fn set_active(&self, id: &Uuid, active: bool) -> Result<Comment, AppError> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE comments SET active = $2 WHERE id = $1 RETURNING *
            )
            SELECT {COMMENT_COLUMNS} FROM c LEFT JOIN users u ON u.id = c.author_id
            "#
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        Ok(())
    }
}
