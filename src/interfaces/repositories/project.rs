use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use std::borrow::Cow;
use uuid::Uuid;

use crate::{
    entities::{
        project::{NewProjectImageRequest, Project, ProjectImage, ProjectInsert},
        skill::Skill,
    },
    errors::AppError,
    repositories::sqlx_repo::{slug_conflict, SqlxProjectRepo},
};

const SLUG_CONSTRAINT: &str = "projects_slug_key";
const LISTING_ORDER: &str = "featured DESC, end_date DESC NULLS LAST, created_at DESC";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn count(&self) -> Result<i64, AppError>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Project>, AppError>;
    /// Most recently created featured projects.
    async fn featured(&self, limit: i64) -> Result<Vec<Project>, AppError>;
    async fn list_completed(&self) -> Result<Vec<Project>, AppError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, AppError>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Project>, AppError>;
    async fn technologies_for(&self, project_ids: &[Uuid]) -> Result<Vec<(Uuid, Skill)>, AppError>;
    async fn images_for(&self, project_ids: &[Uuid]) -> Result<Vec<ProjectImage>, AppError>;
    /// Completed projects sharing at least one technology.
    async fn related(&self, project_id: &Uuid, limit: i64) -> Result<Vec<Project>, AppError>;
    async fn create(&self, project: &ProjectInsert) -> Result<Project, AppError>;
    async fn update(&self, id: &Uuid, project: &ProjectInsert, with_technologies: bool) -> Result<Project, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
    async fn add_image(&self, project_id: &Uuid, image: &NewProjectImageRequest) -> Result<ProjectImage, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

async fn replace_technologies(
    tx: &mut Transaction<'_, Postgres>,
    project_id: &Uuid,
    technology_ids: &[Uuid],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM project_technologies WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut **tx)
        .await?;

    if technology_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO project_technologies (project_id, skill_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(technology_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23503")) => {
            AppError::invalid_field("technology_ids", "Unknown technology.")
        }
        _ => AppError::from(e),
    })?;

    Ok(())
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Project>, AppError> {
        let sql = format!("SELECT * FROM projects ORDER BY {LISTING_ORDER} LIMIT $1 OFFSET $2");

        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn featured(&self, limit: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE featured ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn list_completed(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE status = 'completed' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn technologies_for(&self, project_ids: &[Uuid]) -> Result<Vec<(Uuid, Skill)>, AppError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(sqlx::FromRow)]
        struct Row {
            project_id: Uuid,
            #[sqlx(flatten)]
            skill: Skill,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT pt.project_id, s.*
            FROM project_technologies pt
            JOIN skills s ON s.id = pt.skill_id
            WHERE pt.project_id = ANY($1)
            ORDER BY s.sort_order, s.name
            "#,
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.project_id, row.skill)).collect())
    }

    async fn images_for(&self, project_ids: &[Uuid]) -> Result<Vec<ProjectImage>, AppError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = sqlx::query_as::<_, ProjectImage>(
            "SELECT * FROM project_images WHERE project_id = ANY($1) ORDER BY sort_order",
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn related(&self, project_id: &Uuid, limit: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.* FROM projects p
            WHERE p.status = 'completed'
              AND p.id <> $1
              AND EXISTS (
                  SELECT 1 FROM project_technologies mine
                  JOIN project_technologies theirs ON theirs.skill_id = mine.skill_id
                  WHERE mine.project_id = $1 AND theirs.project_id = p.id
              )
            ORDER BY p.featured DESC, p.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn create(&self, project: &ProjectInsert) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                title, slug, short_description, description, full_description, key_features,
                challenges_and_solutions, featured_image_url, thumbnail_url, live_url, github_url,
                documentation_url, project_type, client, version, seo_description, seo_keywords,
                status, start_date, end_date, featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            RETURNING *
            "#,
        )
        .bind(&project.title)
        .bind(&project.slug)
        .bind(&project.short_description)
        .bind(&project.description)
        .bind(&project.full_description)
        .bind(&project.key_features)
        .bind(&project.challenges_and_solutions)
        .bind(&project.featured_image_url)
        .bind(&project.thumbnail_url)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.documentation_url)
        .bind(&project.project_type)
        .bind(&project.client)
        .bind(&project.version)
        .bind(&project.seo_description)
        .bind(&project.seo_keywords)
        .bind(project.status)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.featured)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| slug_conflict(e, SLUG_CONSTRAINT, "project", &project.slug))?;

        replace_technologies(&mut tx, &created.id, &project.technology_ids).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update(&self, id: &Uuid, project: &ProjectInsert, with_technologies: bool) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $2, slug = $3, short_description = $4, description = $5,
                full_description = $6, key_features = $7, challenges_and_solutions = $8,
                featured_image_url = $9, thumbnail_url = $10, live_url = $11, github_url = $12,
                documentation_url = $13, project_type = $14, client = $15, version = $16,
                seo_description = $17, seo_keywords = $18, status = $19, start_date = $20,
                end_date = $21, featured = $22, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&project.title)
        .bind(&project.slug)
        .bind(&project.short_description)
        .bind(&project.description)
        .bind(&project.full_description)
        .bind(&project.key_features)
        .bind(&project.challenges_and_solutions)
        .bind(&project.featured_image_url)
        .bind(&project.thumbnail_url)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.documentation_url)
        .bind(&project.project_type)
        .bind(&project.client)
        .bind(&project.version)
        .bind(&project.seo_description)
        .bind(&project.seo_keywords)
        .bind(project.status)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.featured)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| slug_conflict(e, SLUG_CONSTRAINT, "project", &project.slug))?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        if with_technologies {
            replace_technologies(&mut tx, id, &project.technology_ids).await?;
        }
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        Ok(())
    }

    async fn add_image(&self, project_id: &Uuid, image: &NewProjectImageRequest) -> Result<ProjectImage, AppError> {
        sqlx::query_as::<_, ProjectImage>(
            r#"
            INSERT INTO project_images (project_id, image_url, caption, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(&image.image_url)
        .bind(&image.caption)
        .bind(image.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict(format!(
                    "An image with sort order {} already exists for this project",
                    image.sort_order
                ))
            }
            sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23503")) => {
                AppError::NotFound("Project not found".to_string())
            }
            _ => AppError::from(e),
        })
    }
}
