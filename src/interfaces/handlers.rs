pub mod admin;
pub mod auth;
pub mod blog;
pub mod comments;
pub mod contact;
pub mod pages;
pub mod projects;
pub mod system;
pub mod users;
