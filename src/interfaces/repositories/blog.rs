use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
    entities::blog::{Blog, BlogChanges, BlogFilter, BlogInsert, LikeOutcome, Tag},
    errors::AppError,
    repositories::sqlx_repo::{slug_conflict, SqlxBlogRepo},
};

const SLUG_CONSTRAINT: &str = "blogs_slug_key";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn count_published(&self, filter: &BlogFilter) -> Result<i64, AppError>;
    async fn list_published(&self, filter: &BlogFilter, limit: i64, offset: i64) -> Result<Vec<Blog>, AppError>;
    async fn recent_published(&self, limit: i64) -> Result<Vec<Blog>, AppError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>, AppError>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Blog>, AppError>;
    /// Bumps the view counter of a published post and returns the updated row.
    async fn record_view(&self, slug: &str) -> Result<Option<Blog>, AppError>;
    async fn tags_for(&self, blog_ids: &[Uuid]) -> Result<Vec<(Uuid, Tag)>, AppError>;
    async fn related(&self, blog_id: &Uuid, limit: i64) -> Result<Vec<Blog>, AppError>;
    async fn toggle_like(&self, blog_id: &Uuid, visitor_id: &Uuid) -> Result<LikeOutcome, AppError>;
    async fn is_liked(&self, blog_id: &Uuid, visitor_id: &Uuid) -> Result<bool, AppError>;
    async fn list_all(&self) -> Result<Vec<Blog>, AppError>;
    async fn create(&self, blog: &BlogInsert) -> Result<Blog, AppError>;
    async fn update(&self, id: &Uuid, changes: &BlogChanges) -> Result<Blog, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxBlogRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxBlogRepo { pool }
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_published_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BlogFilter) {
    qb.push(" WHERE b.status = 'published'");

    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM blog_tags bt JOIN tags t ON t.id = bt.tag_id \
             WHERE bt.blog_id = b.id AND (t.slug = ",
        );
        qb.push_bind(tag.clone());
        qb.push(" OR LOWER(t.name) = LOWER(");
        qb.push_bind(tag.clone());
        qb.push(")))");
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (b.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR b.content ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR b.excerpt ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(
            " OR EXISTS (SELECT 1 FROM blog_tags bt JOIN tags t ON t.id = bt.tag_id \
             WHERE bt.blog_id = b.id AND t.name ILIKE ",
        );
        qb.push_bind(pattern);
        qb.push("))");
    }
}

/// Replaces the post's tag links, creating tags that do not exist yet.
async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    blog_id: &Uuid,
    tags: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM blog_tags WHERE blog_id = $1")
        .bind(blog_id)
        .execute(&mut **tx)
        .await?;

    for name in tags {
        let tag_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO tags (name, slug) VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(slug::slugify(name))
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(blog_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl BlogRepository for SqlxBlogRepo {
    async fn count_published(&self, filter: &BlogFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blogs b");
        push_published_filters(&mut qb, filter);

        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list_published(&self, filter: &BlogFilter, limit: i64, offset: i64) -> Result<Vec<Blog>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT b.* FROM blogs b");
        push_published_filters(&mut qb, filter);
        qb.push(" ORDER BY b.published_at DESC NULLS LAST, b.created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let blogs = qb.build_query_as::<Blog>().fetch_all(&self.pool).await?;
        Ok(blogs)
    }

    async fn recent_published(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        let blogs = sqlx::query_as::<_, Blog>(
            "SELECT * FROM blogs WHERE status = 'published' ORDER BY published_at DESC NULLS LAST LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(blogs)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>, AppError> {
        sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Blog>, AppError> {
        sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn record_view(&self, slug: &str) -> Result<Option<Blog>, AppError> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET views = views + 1
            WHERE slug = $1 AND status = 'published'
            RETURNING *
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn tags_for(&self, blog_ids: &[Uuid]) -> Result<Vec<(Uuid, Tag)>, AppError> {
        if blog_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, Uuid, String, String)>(
            r#"
            SELECT bt.blog_id, t.id, t.name, t.slug
            FROM blog_tags bt
            JOIN tags t ON t.id = bt.tag_id
            WHERE bt.blog_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(blog_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(blog_id, id, name, slug)| (blog_id, Tag { id, name, slug }))
            .collect())
    }

    async fn related(&self, blog_id: &Uuid, limit: i64) -> Result<Vec<Blog>, AppError> {
        let blogs = sqlx::query_as::<_, Blog>(
            r#"
            SELECT b.* FROM blogs b
            WHERE b.status = 'published'
              AND b.id <> $1
              AND EXISTS (
                  SELECT 1 FROM blog_tags mine
                  JOIN blog_tags theirs ON theirs.tag_id = mine.tag_id
                  WHERE mine.blog_id = $1 AND theirs.blog_id = b.id
              )
            ORDER BY b.published_at DESC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(blog_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(blogs)
    }

    async fn toggle_like(&self, blog_id: &Uuid, visitor_id: &Uuid) -> Result<LikeOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes toggles on the same post.
        let locked: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM blogs WHERE id = $1 AND status = 'published' FOR UPDATE",
        )
        .bind(blog_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Err(AppError::NotFound("Blog post not found".to_string()));
        }

        let removed = sqlx::query("DELETE FROM blog_likes WHERE blog_id = $1 AND visitor_id = $2")
            .bind(blog_id)
            .bind(visitor_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let likes_count: i64 = if removed {
            sqlx::query_scalar(
                "UPDATE blogs SET likes_count = GREATEST(likes_count - 1, 0) WHERE id = $1 RETURNING likes_count",
            )
            .bind(blog_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query("INSERT INTO blog_likes (blog_id, visitor_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(blog_id)
                .bind(visitor_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query_scalar("UPDATE blogs SET likes_count = likes_count + 1 WHERE id = $1 RETURNING likes_count")
                .bind(blog_id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;

        Ok(LikeOutcome { likes_count, liked: !removed })
    }

    async fn is_liked(&self, blog_id: &Uuid, visitor_id: &Uuid) -> Result<bool, AppError> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM blog_likes WHERE blog_id = $1 AND visitor_id = $2)",
        )
        .bind(blog_id)
        .bind(visitor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked)
    }

    async fn list_all(&self) -> Result<Vec<Blog>, AppError> {
        let blogs = sqlx::query_as::<_, Blog>("SELECT * FROM blogs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(blogs)
    }

    async fn create(&self, blog: &BlogInsert) -> Result<Blog, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (title, slug, content, excerpt, featured_image_url, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6,
                    CASE WHEN $6::blog_status = 'published' THEN NOW() END)
            RETURNING *
            "#,
        )
        .bind(&blog.title)
        .bind(&blog.slug)
        .bind(&blog.content)
        .bind(&blog.excerpt)
        .bind(&blog.featured_image_url)
        .bind(blog.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| slug_conflict(e, SLUG_CONSTRAINT, "blog post", &blog.slug))?;

        replace_tags(&mut tx, &created.id, &blog.tags).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update(&self, id: &Uuid, changes: &BlogChanges) -> Result<Blog, AppError> {
        let mut tx = self.pool.begin().await?;

        // published_at is stamped the first time the post goes live and never again.
        let updated = sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET title = $2,
                slug = $3,
                content = $4,
                excerpt = $5,
                featured_image_url = $6,
                status = $7,
                published_at = CASE
                    WHEN published_at IS NULL AND $7::blog_status = 'published' THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.excerpt)
        .bind(&changes.featured_image_url)
        .bind(changes.status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| slug_conflict(e, SLUG_CONSTRAINT, "blog post", &changes.slug))?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

        if let Some(tags) = &changes.tags {
            replace_tags(&mut tx, id, tags).await?;
        }
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Blog post not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    }

    #[test]
    fn filters_only_add_clauses_that_are_set() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blogs b");
        push_published_filters(&mut qb, &BlogFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM blogs b WHERE b.status = 'published'");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blogs b");
        push_published_filters(&mut qb, &BlogFilter { tag: Some("rust".into()), search: Some("async".into()) });
        let sql = qb.sql();
        assert!(sql.contains("t.slug = $1"));
        assert!(sql.contains("b.title ILIKE $3"));
        assert!(sql.contains("t.name ILIKE $6"));
    }
}
