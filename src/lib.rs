use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, password, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes, templates};
pub use infrastructure::{auth, db, mail, utils};

use auth::jwt::JwtService;
use mail::Mailer;
use repositories::sqlx_repo::{
    SqlxBlogRepo, SqlxCommentRepo, SqlxMessageRepo, SqlxProfileRepo, SqlxProjectRepo, SqlxSiteRepo, SqlxUserRepo,
};
use use_cases::{
    auth::AuthHandler,
    blog::BlogHandler,
    comment::CommentHandler,
    contact::{ContactHandler, ContactSettings},
    project::ProjectHandler,
    site::SiteHandler,
};

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub blog_handler: AppBlogHandler,
    pub comment_handler: AppCommentHandler,
    pub project_handler: AppProjectHandler,
    pub site_handler: AppSiteHandler,
    pub contact_handler: AppContactHandler,
    pub static_url: String,
    pub secure_cookies: bool,
    pub environment: String,
}

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppBlogHandler = BlogHandler<SqlxBlogRepo>;
pub type AppCommentHandler = CommentHandler<SqlxBlogRepo, SqlxCommentRepo>;
pub type AppProjectHandler = ProjectHandler<SqlxProjectRepo>;
pub type AppSiteHandler = SiteHandler<SqlxSiteRepo, SqlxProfileRepo>;
pub type AppContactHandler = ContactHandler<SqlxMessageRepo>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool, mailer: Arc<dyn Mailer>) -> Self {
        let jwt_service = JwtService::new(config);

        AppState {
            auth_handler: AuthHandler::new(SqlxUserRepo::new(pool.clone()), jwt_service),
            blog_handler: BlogHandler::new(SqlxBlogRepo::new(pool.clone())),
            comment_handler: CommentHandler::new(
                SqlxBlogRepo::new(pool.clone()),
                SqlxCommentRepo::new(pool.clone()),
                config.static_url.clone(),
            ),
            project_handler: ProjectHandler::new(SqlxProjectRepo::new(pool.clone())),
            site_handler: SiteHandler::new(SqlxSiteRepo::new(pool.clone()), SqlxProfileRepo::new(pool.clone())),
            contact_handler: ContactHandler::new(
                SqlxMessageRepo::new(pool),
                mailer,
                ContactSettings::from_config(config),
            ),
            static_url: config.static_url.clone(),
            secure_cookies: config.secure_cookies,
            environment: config.env.to_string(),
        }
    }
}
