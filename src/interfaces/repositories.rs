pub mod blog;
pub mod comment;
pub mod message;
pub mod profile;
pub mod project;
pub mod site;
pub mod sqlx_repo;
pub mod token;
pub mod user;
