use std::borrow::Cow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    constants::WORDS_PER_MINUTE,
    entities::option_fields::OptionField,
    utils::markdown::{safe_markdown_to_html, word_count},
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 200;
const MAX_SLUG_LENGTH: u64 = 200;
const MAX_EXCERPT_LENGTH: u64 = 500;
const MAX_TAGS: usize = 10;
const MAX_TAG_LENGTH: usize = 50;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blog_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: BlogStatus,
    pub views: i64,
    pub likes_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A post together with its tag set.
#[derive(Debug, Clone, Serialize)]
pub struct BlogWithTags {
    #[serde(flatten)]
    pub blog: Blog,
    pub tags: Vec<Tag>,
}

#[derive(Debug)]
pub struct BlogInsert {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: BlogStatus,
    pub tags: Vec<String>,
}

/// Column values for an update, already resolved against the stored row.
#[derive(Debug)]
pub struct BlogChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: BlogStatus,
    pub tags: Option<Vec<String>>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct NewBlogRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(custom(function = "validate_optional_slug_str"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,

    #[validate(length(max = MAX_EXCERPT_LENGTH, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub featured_image_url: Option<String>,

    #[serde(default)]
    pub status: BlogStatus,

    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateBlogRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"))]
    pub title: OptionField<String>,

    #[validate(length(max = MAX_SLUG_LENGTH), custom(function = "validate_optional_slug"))]
    pub slug: OptionField<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: OptionField<String>,

    #[validate(length(max = MAX_EXCERPT_LENGTH, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub featured_image_url: OptionField<String>,

    pub status: OptionField<BlogStatus>,

    #[validate(custom(function = "validate_optional_tags"))]
    pub tags: OptionField<Vec<String>>,
}

/// Query string of the public blog index.
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    pub page: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

impl BlogListQuery {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn filter(&self) -> BlogFilter {
        BlogFilter {
            tag: self.tag().map(String::from),
            search: self.search().map(String::from),
        }
    }
}

/// Restrictions on the published listing. `tag` matches a tag slug or name,
/// `search` is a case-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
}

// ───── Like toggle ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub likes_count: i64,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes_count: i64,
    pub liked: bool,
    pub message: String,
}

impl From<LikeOutcome> for LikeResponse {
    fn from(outcome: LikeOutcome) -> Self {
        let message = if outcome.liked {
            "Post liked successfully!"
        } else {
            "Post unliked."
        };
        LikeResponse {
            success: true,
            likes_count: outcome.likes_count,
            liked: outcome.liked,
            message: message.to_string(),
        }
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

/// Accepts an empty slug, which means "derive it from the title".
pub fn validate_optional_slug_str(slug: &str) -> Result<(), ValidationError> {
    if slug.trim().is_empty() {
        return Ok(());
    }
    validate_slug(slug)
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(new_validation_error("slug_edge_hyphen", "Slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(new_validation_error("slug_double_hyphen", "Slug must not contain consecutive hyphens"));
    }
    Ok(())
}

pub fn validate_optional_slug(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(slug) = value {
        validate_optional_slug_str(slug)?;
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

pub fn validate_optional_tags(value: &OptionField<Vec<String>>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(tags) = value {
        validate_tags(tags)?;
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(new_validation_error("too_many_tags", "Too many tags provided"));
    }
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || tag.chars().count() > MAX_TAG_LENGTH {
            return Err(new_validation_error("invalid_tag_length", "Tags must be between 1 and 50 characters"));
        }
        if slug::slugify(tag).is_empty() {
            return Err(new_validation_error("invalid_tag_chars", "Tags must contain at least one letter or digit"));
        }
    }
    Ok(())
}

pub fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

/// Slug to store for a new entity: the supplied one, or one derived from `source`.
pub fn slug_or_derive(slug: Option<&str>, source: &str) -> Result<String, ValidationErrors> {
    match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(s.to_string()),
        None => {
            let generated = slug::slugify(source);
            if generated.is_empty() {
                let mut errors = ValidationErrors::new();
                errors.add("slug", new_validation_error("slug_underivable", "Could not derive a slug from the title; please provide one"));
                return Err(errors);
            }
            Ok(generated)
        }
    }
}

/// Slug after an update. Only an explicitly blank or null slug is regenerated,
/// from the new title when one is supplied, otherwise from the stored title.
pub fn resolve_slug_for_update(
    slug_field: &OptionField<String>,
    title_field: &OptionField<String>,
    current_slug: &str,
    current_title: &str,
) -> Result<String, ValidationErrors> {
    match slug_field {
        OptionField::SetToValue(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        OptionField::Unchanged => Ok(current_slug.to_string()),
        OptionField::SetToValue(_) | OptionField::SetToNull => {
            let title = title_field.flatten_str().unwrap_or(current_title);
            slug_or_derive(None, title)
        }
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !out.iter().any(|t| slug::slugify(t) == slug::slugify(&tag)) {
            out.push(tag);
        }
    }
    out
}

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewBlogRequest> for BlogInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewBlogRequest) -> Result<Self, Self::Error> {
        value.validate()?;

        let slug = slug_or_derive(value.slug.as_deref(), &value.title)?;

        Ok(BlogInsert {
            title: value.title.trim().to_string(),
            slug,
            content: value.content,
            excerpt: value.excerpt.filter(|e| !e.trim().is_empty()),
            featured_image_url: value.featured_image_url,
            status: value.status,
            tags: normalize_tags(value.tags),
        })
    }
}

impl UpdateBlogRequest {
    pub fn resolve(self, current: &Blog) -> Result<BlogChanges, ValidationErrors> {
        self.validate()?;

        let slug = resolve_slug_for_update(&self.slug, &self.title, &current.slug, &current.title)?;

        Ok(BlogChanges {
            title: self.title.apply(Some(current.title.clone())).unwrap_or_else(|| current.title.clone()),
            slug,
            content: self.content.apply(Some(current.content.clone())).unwrap_or_else(|| current.content.clone()),
            excerpt: self.excerpt.apply(current.excerpt.clone()),
            featured_image_url: self.featured_image_url.apply(current.featured_image_url.clone()),
            status: self.status.apply(Some(current.status)).unwrap_or(current.status),
            tags: match self.tags {
                OptionField::Unchanged => None,
                OptionField::SetToNull => Some(Vec::new()),
                OptionField::SetToValue(tags) => Some(normalize_tags(tags)),
            },
        })
    }
}

impl Blog {
    pub fn is_published(&self) -> bool {
        self.status == BlogStatus::Published
    }

    pub fn content_html(&self) -> String {
        safe_markdown_to_html(&self.content)
    }

    /// Whole minutes at 200 words per minute, never less than one.
    pub fn reading_time(&self) -> usize {
        (word_count(&self.content_html()) / WORDS_PER_MINUTE).max(1)
    }

    /// Excerpt for listings, falling back to the opening of the content.
    pub fn summary(&self) -> String {
        match self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(excerpt) => excerpt.to_string(),
            None => {
                let words: Vec<&str> = self.content.split_whitespace().take(30).collect();
                let mut summary = words.join(" ");
                if self.content.split_whitespace().count() > 30 {
                    summary.push_str("...");
                }
                summary
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn published(slug: &str) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: slug.replace('-', " "),
            slug: slug.into(),
            content: "Some content".into(),
            excerpt: None,
            featured_image_url: None,
            status: BlogStatus::Published,
            views: 0,
            likes_count: 0,
            published_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn draft(slug: &str) -> Blog {
        Blog {
            status: BlogStatus::Draft,
            published_at: None,
            ..published(slug)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(content: &str) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: "Hello World".into(),
            slug: "hello-world".into(),
            content: content.into(),
            excerpt: None,
            featured_image_url: None,
            status: BlogStatus::Draft,
            views: 0,
            likes_count: 0,
            published_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_request(title: &str, slug: Option<&str>) -> NewBlogRequest {
        NewBlogRequest {
            title: title.into(),
            slug: slug.map(String::from),
            content: "Body".into(),
            excerpt: None,
            featured_image_url: None,
            status: BlogStatus::Draft,
            tags: vec!["Rust".into(), " rust ".into(), "Web Dev".into()],
        }
    }

    #[test]
    fn empty_slug_is_derived_from_title() {
        let insert = BlogInsert::try_from(new_request("Hello World", Some(""))).unwrap();
        assert_eq!(insert.slug, "hello-world");

        let insert = BlogInsert::try_from(new_request("Hello World", None)).unwrap();
        assert_eq!(insert.slug, "hello-world");
    }

    #[test]
    fn explicit_slug_is_kept_and_validated() {
        let insert = BlogInsert::try_from(new_request("Hello World", Some("greetings"))).unwrap();
        assert_eq!(insert.slug, "greetings");

        assert!(BlogInsert::try_from(new_request("Hello World", Some("Not A Slug"))).is_err());
    }

    #[test]
    fn punctuation_only_title_needs_an_explicit_slug() {
        let errors = BlogInsert::try_from(new_request("!!!", None)).unwrap_err();
        assert!(errors.field_errors().contains_key("slug"));
    }

    #[test]
    fn duplicate_tags_collapse_by_slug() {
        let insert = BlogInsert::try_from(new_request("Tags", None)).unwrap();
        assert_eq!(insert.tags, vec!["Rust".to_string(), "Web Dev".to_string()]);
    }

    #[test]
    fn update_keeps_slug_unless_blanked() {
        let current = blog("x");
        let rename = UpdateBlogRequest {
            title: OptionField::SetToValue("Brand New".into()),
            ..Default::default()
        };
        assert_eq!(rename.resolve(&current).unwrap().slug, "hello-world");

        let reslug = UpdateBlogRequest {
            title: OptionField::SetToValue("Brand New".into()),
            slug: OptionField::SetToValue(String::new()),
            ..Default::default()
        };
        assert_eq!(reslug.resolve(&current).unwrap().slug, "brand-new");
    }

    #[test]
    fn reading_time_is_at_least_one_minute() {
        assert_eq!(blog("just a few words").reading_time(), 1);

        let long = "word ".repeat(650);
        assert_eq!(blog(&long).reading_time(), 3);
    }

    #[test]
    fn summary_falls_back_to_content() {
        let post = blog(&"lorem ".repeat(40));
        let summary = post.summary();
        assert!(summary.ends_with("..."));
        assert_eq!(summary.trim_end_matches("...").split_whitespace().count(), 30);
    }

    #[test]
    fn like_response_messages() {
        let liked = LikeResponse::from(LikeOutcome { likes_count: 1, liked: true });
        assert_eq!(liked.message, "Post liked successfully!");

        let unliked = LikeResponse::from(LikeOutcome { likes_count: 0, liked: false });
        assert_eq!(unliked.message, "Post unliked.");
    }
}
