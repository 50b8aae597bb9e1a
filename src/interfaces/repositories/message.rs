use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::message::{Message, MessageInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxMessageRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &MessageInsert) -> Result<Message, AppError>;
    async fn list(&self) -> Result<Vec<Message>, AppError>;
    async fn mark_read(&self, id: &Uuid, is_read: bool) -> Result<Message, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxMessageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxMessageRepo { pool }
    }
}

#[async_trait]
impl MessageRepository for SqlxMessageRepo {
    async fn insert(&self, message: &MessageInsert) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list(&self) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>("SELECT * FROM messages ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn mark_read(&self, id: &Uuid, is_read: bool) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>("UPDATE messages SET is_read = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(is_read)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Message not found".to_string()));
        }

        Ok(())
    }
}
