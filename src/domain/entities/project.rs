use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::entities::{
    blog::{resolve_slug_for_update, slug_or_derive, validate_optional_slug, validate_optional_slug_str, validate_optional_url_field, validate_url},
    option_fields::OptionField,
    skill::{Skill, SkillCategory},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
    Planned,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub full_description: Option<String>,
    pub key_features: Option<String>,
    pub challenges_and_solutions: Option<String>,
    pub featured_image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub documentation_url: Option<String>,
    pub project_type: Option<String>,
    pub client: Option<String>,
    pub version: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
}

/// Project with its technologies and ordered gallery.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub technologies: Vec<Skill>,
    pub images: Vec<ProjectImage>,
}

/// Shape served by `/api/projects/`.
#[derive(Debug, Serialize)]
pub struct ProjectApiItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub full_description: Option<String>,
    pub category: &'static str,
    pub completion_date: Option<String>,
    pub technologies: Vec<String>,
    pub featured_image_url: Option<String>,
    pub gallery_images_urls: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub documentation_url: Option<String>,
    pub key_features: Vec<String>,
    pub challenges_and_solutions: String,
    pub project_type: Option<String>,
    pub client: Option<String>,
    pub version: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
}

#[derive(Debug)]
pub struct ProjectInsert {
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub full_description: Option<String>,
    pub key_features: Option<String>,
    pub challenges_and_solutions: Option<String>,
    pub featured_image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub documentation_url: Option<String>,
    pub project_type: Option<String>,
    pub client: Option<String>,
    pub version: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub featured: bool,
    pub technology_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(custom(function = "validate_optional_slug_str"))]
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = 300))]
    pub short_description: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    pub full_description: Option<String>,
    pub key_features: Option<String>,
    pub challenges_and_solutions: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub featured_image_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub thumbnail_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub live_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub documentation_url: Option<String>,

    #[validate(length(max = 100))]
    pub project_type: Option<String>,

    #[validate(length(max = 200))]
    pub client: Option<String>,

    #[validate(length(max = 50))]
    pub version: Option<String>,

    #[validate(length(max = 300))]
    pub seo_description: Option<String>,

    #[validate(length(max = 300))]
    pub seo_keywords: Option<String>,

    #[serde(default)]
    pub status: ProjectStatus,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub technology_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: OptionField<String>,

    #[validate(custom(function = "validate_optional_slug"))]
    pub slug: OptionField<String>,

    #[validate(length(max = 300))]
    pub short_description: OptionField<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: OptionField<String>,

    pub full_description: OptionField<String>,
    pub key_features: OptionField<String>,
    pub challenges_and_solutions: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub featured_image_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub live_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub github_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub documentation_url: OptionField<String>,

    pub status: OptionField<ProjectStatus>,
    pub start_date: OptionField<NaiveDate>,
    pub end_date: OptionField<NaiveDate>,
    pub featured: OptionField<bool>,
    pub technology_ids: OptionField<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewProjectImageRequest {
    #[validate(custom(function = "validate_url"))]
    pub image_url: String,

    #[validate(length(max = 255))]
    pub caption: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub sort_order: i32,
}

/// Classifies a project by the categories of its technologies.
pub fn main_category<I>(categories: I) -> &'static str
where
    I: IntoIterator<Item = SkillCategory>,
{
    let categories: HashSet<SkillCategory> = categories.into_iter().collect();
    let frontend = categories.contains(&SkillCategory::Frontend);
    let backend = categories.contains(&SkillCategory::Backend);

    match (frontend, backend) {
        (true, true) => "fullstack",
        (true, false) => "frontend",
        (false, true) => "backend",
        _ if categories.contains(&SkillCategory::Mobile) => "mobile",
        _ => "other",
    }
}

/// Non-empty lines of the free-text feature list.
pub fn feature_lines(key_features: Option<&str>) -> Vec<String> {
    key_features
        .map(|text| {
            text.trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl Project {
    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    /// "Month YYYY" of the end date, falling back to the start date.
    pub fn completion_date(&self) -> Option<String> {
        self.end_date
            .or(self.start_date)
            .map(|date| date.format("%B %Y").to_string())
    }

    pub fn card_description(&self) -> &str {
        if self.short_description.trim().is_empty() {
            &self.description
        } else {
            &self.short_description
        }
    }
}

impl ProjectDetail {
    pub fn main_category(&self) -> &'static str {
        main_category(self.technologies.iter().map(|t| t.category))
    }

    pub fn key_features(&self) -> Vec<String> {
        feature_lines(self.project.key_features.as_deref())
    }

    pub fn to_api_item(&self) -> ProjectApiItem {
        let gallery_images_urls: Vec<String> =
            self.images.iter().map(|img| img.image_url.clone()).collect();
        let project = &self.project;

        ProjectApiItem {
            id: project.id,
            title: project.title.clone(),
            slug: project.slug.clone(),
            short_description: project.short_description.clone(),
            description: project.description.clone(),
            full_description: project.full_description.clone(),
            category: self.main_category(),
            completion_date: project.completion_date(),
            technologies: self.technologies.iter().map(|t| t.name.clone()).collect(),
            featured_image_url: project
                .featured_image_url
                .clone()
                .or_else(|| gallery_images_urls.first().cloned()),
            gallery_images_urls,
            live_url: project.live_url.clone(),
            github_url: project.github_url.clone(),
            documentation_url: project.documentation_url.clone(),
            key_features: self.key_features(),
            challenges_and_solutions: project.challenges_and_solutions.clone().unwrap_or_default(),
            project_type: project.project_type.clone(),
            client: project.client.clone(),
            version: project.version.clone(),
            seo_description: project.seo_description.clone(),
            seo_keywords: project.seo_keywords.clone(),
        }
    }
}

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        value.validate()?;

        let slug = slug_or_derive(value.slug.as_deref(), &value.title)?;

        Ok(ProjectInsert {
            title: value.title.trim().to_string(),
            slug,
            short_description: value.short_description,
            description: value.description,
            full_description: value.full_description,
            key_features: value.key_features,
            challenges_and_solutions: value.challenges_and_solutions,
            featured_image_url: value.featured_image_url,
            thumbnail_url: value.thumbnail_url,
            live_url: value.live_url,
            github_url: value.github_url,
            documentation_url: value.documentation_url,
            project_type: value.project_type,
            client: value.client,
            version: value.version,
            seo_description: value.seo_description,
            seo_keywords: value.seo_keywords,
            status: value.status,
            start_date: value.start_date,
            end_date: value.end_date,
            featured: value.featured,
            technology_ids: value.technology_ids,
        })
    }
}

impl UpdateProjectRequest {
    /// Merges the patch over the stored project. Technologies are returned
    /// separately: `None` leaves the links untouched.
    pub fn resolve(self, current: &Project) -> Result<(ProjectInsert, Option<Vec<Uuid>>), ValidationErrors> {
        self.validate()?;

        let slug = resolve_slug_for_update(&self.slug, &self.title, &current.slug, &current.title)?;
        let technologies = match self.technology_ids {
            OptionField::Unchanged => None,
            OptionField::SetToNull => Some(Vec::new()),
            OptionField::SetToValue(ids) => Some(ids),
        };

        let merged = ProjectInsert {
            title: self.title.apply(Some(current.title.clone())).unwrap_or_else(|| current.title.clone()),
            slug,
            short_description: self.short_description.apply(Some(current.short_description.clone())).unwrap_or_default(),
            description: self.description.apply(Some(current.description.clone())).unwrap_or_else(|| current.description.clone()),
            full_description: self.full_description.apply(current.full_description.clone()),
            key_features: self.key_features.apply(current.key_features.clone()),
            challenges_and_solutions: self.challenges_and_solutions.apply(current.challenges_and_solutions.clone()),
            featured_image_url: self.featured_image_url.apply(current.featured_image_url.clone()),
            thumbnail_url: current.thumbnail_url.clone(),
            live_url: self.live_url.apply(current.live_url.clone()),
            github_url: self.github_url.apply(current.github_url.clone()),
            documentation_url: self.documentation_url.apply(current.documentation_url.clone()),
            project_type: current.project_type.clone(),
            client: current.client.clone(),
            version: current.version.clone(),
            seo_description: current.seo_description.clone(),
            seo_keywords: current.seo_keywords.clone(),
            status: self.status.apply(Some(current.status)).unwrap_or(current.status),
            start_date: self.start_date.apply(current.start_date),
            end_date: self.end_date.apply(current.end_date),
            featured: self.featured.apply(Some(current.featured)).unwrap_or(current.featured),
            technology_ids: technologies.clone().unwrap_or_default(),
        };

        Ok((merged, technologies))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn project(slug: &str, status: ProjectStatus) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: slug.replace('-', " "),
            slug: slug.into(),
            short_description: String::new(),
            description: "A site".into(),
            full_description: None,
            key_features: None,
            challenges_and_solutions: None,
            featured_image_url: None,
            thumbnail_url: None,
            live_url: None,
            github_url: None,
            documentation_url: None,
            project_type: None,
            client: None,
            version: None,
            seo_description: None,
            seo_keywords: None,
            status,
            start_date: None,
            end_date: None,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
