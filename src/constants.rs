use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const PROJECTS_PAGE_SIZE: i64 = 9;
pub const BLOG_PAGE_SIZE: i64 = 10;
pub const HOME_FEATURED_PROJECTS: i64 = 3;
pub const HOME_RECENT_POSTS: i64 = 3;
pub const RELATED_ITEMS: i64 = 3;

pub const WORDS_PER_MINUTE: usize = 200;

pub const VISITOR_COOKIE: &str = "visitor_id";
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub const DEFAULT_USER_AVATAR: &str = "images/default_user_avatar.jpg";
pub const DEFAULT_COMMENT_AVATAR: &str = "images/default_comment_avatar.jpg";

pub const DEFAULT_CONTACT_SUBJECT: &str = "Portfolio Contact Form Submission";
