use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxBlogRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCommentRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProfileRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSiteRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxMessageRepo {
    pub pool: PgPool,
}

/// Maps a unique violation on `constraint` to a conflict naming the slug.
pub(crate) fn slug_conflict(err: sqlx::Error, constraint: &str, kind: &str, slug: &str) -> crate::errors::AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint) => {
            crate::errors::AppError::Conflict(format!("A {} with slug '{}' already exists", kind, slug))
        }
        _ => crate::errors::AppError::from(err),
    }
}
