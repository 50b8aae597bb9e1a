use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::{
    entities::{
        award::Award,
        certification::Certification,
        education::Education,
        experience::Experience,
        service::{NewServiceRequest, Service},
        site::{ContactInfo, ContactInfoRequest, NewSocialLinkRequest, SiteContext, SiteSetting, SiteSettingRequest},
        skill::Skill,
        testimonial::Testimonial,
    },
    errors::AppError,
    repositories::{
        profile::{ProfileRepository, ShowcaseSection},
        site::SiteRepository,
    },
    utils::valid_uuid::valid_uuid,
};

/// Collections shown on the about page.
#[derive(Debug, Default)]
pub struct AboutSections {
    pub skills: Vec<Skill>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub awards: Vec<Award>,
}

/// Collections shown on the landing page.
#[derive(Debug, Default)]
pub struct Showcase {
    pub about: AboutSections,
    pub services: Vec<Service>,
    pub testimonials: Vec<Testimonial>,
}

pub struct SiteHandler<S, P>
where
    S: SiteRepository,
    P: ProfileRepository,
{
    pub site_repo: S,
    pub profile_repo: P,
}

impl<S, P> SiteHandler<S, P>
where
    S: SiteRepository,
    P: ProfileRepository,
{
    pub fn new(site_repo: S, profile_repo: P) -> Self {
        SiteHandler { site_repo, profile_repo }
    }

    /// Settings, active social links and contact details for page chrome.
    /// Missing singletons fall back to defaults.
    pub async fn context(&self) -> Result<SiteContext, AppError> {
        Ok(SiteContext {
            settings: self.site_repo.settings().await?.unwrap_or_default(),
            social_links: self.site_repo.active_social_links().await?,
            contact_info: self.site_repo.contact_info().await?,
        })
    }

    pub async fn about(&self) -> Result<AboutSections, AppError> {
        Ok(AboutSections {
            skills: self.profile_repo.skills().await?,
            experiences: self.profile_repo.experiences().await?,
            educations: self.profile_repo.educations().await?,
            certifications: self.profile_repo.certifications().await?,
            awards: self.profile_repo.awards().await?,
        })
    }

    pub async fn showcase(&self) -> Result<Showcase, AppError> {
        Ok(Showcase {
            about: self.about().await?,
            services: self.profile_repo.services().await?,
            testimonials: self.profile_repo.testimonials().await?,
        })
    }

    // ───── Singletons ────────────────────────────────────────────────

    pub async fn settings(&self) -> Result<SiteSetting, AppError> {
        self.site_repo
            .settings()
            .await?
            .ok_or_else(|| AppError::NotFound("Site settings have not been created".to_string()))
    }

    /// Creates the settings row once; a second create is a conflict.
    pub async fn create_settings(&self, request: SiteSettingRequest) -> Result<SiteSetting, AppError> {
        request.validate()?;
        let settings = request.apply_to(SiteSetting::default());

        if !self.site_repo.create_settings(&settings).await? {
            return Err(AppError::Conflict("Site settings already exist".to_string()));
        }
        Ok(settings)
    }

    pub async fn update_settings(&self, request: SiteSettingRequest) -> Result<SiteSetting, AppError> {
        request.validate()?;
        let current = self.site_repo.settings().await?.unwrap_or_default();
        self.site_repo.save_settings(&request.apply_to(current)).await
    }

    pub async fn contact_info(&self) -> Result<ContactInfo, AppError> {
        self.site_repo
            .contact_info()
            .await?
            .ok_or_else(|| AppError::NotFound("Contact information has not been created".to_string()))
    }

    pub async fn create_contact_info(&self, request: ContactInfoRequest) -> Result<ContactInfo, AppError> {
        request.validate()?;
        let info = request.apply_to(ContactInfo::default());
        if info.email.trim().is_empty() {
            return Err(AppError::invalid_field("email", "This field is required."));
        }

        if !self.site_repo.create_contact_info(&info).await? {
            return Err(AppError::Conflict("Contact information already exists".to_string()));
        }
        Ok(info)
    }

    pub async fn update_contact_info(&self, request: ContactInfoRequest) -> Result<ContactInfo, AppError> {
        request.validate()?;
        let current = self.contact_info().await?;
        self.site_repo.save_contact_info(&request.apply_to(current)).await
    }

    // ───── Showcase entries ──────────────────────────────────────────

    /// Creates an entry in one of the showcase collections from a raw JSON
    /// body and returns the stored row.
    pub async fn create_entry(&self, section: ShowcaseSection, body: Value) -> Result<Value, AppError> {
        let created = match section {
            ShowcaseSection::Skills => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_skill(&request).await?)
            }
            ShowcaseSection::Experiences => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_experience(&request).await?)
            }
            ShowcaseSection::Educations => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_education(&request).await?)
            }
            ShowcaseSection::Certifications => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_certification(&request).await?)
            }
            ShowcaseSection::Awards => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_award(&request).await?)
            }
            ShowcaseSection::Services => {
                let request: NewServiceRequest = parse(body)?;
                let slug = request.checked_slug()?;
                to_json(self.profile_repo.create_service(&request, &slug).await?)
            }
            ShowcaseSection::Testimonials => {
                let request = parse_valid(body)?;
                to_json(self.profile_repo.create_testimonial(&request).await?)
            }
            ShowcaseSection::SocialLinks => {
                let request: NewSocialLinkRequest = parse_valid(body)?;
                to_json(self.site_repo.create_social_link(&request).await?)
            }
        }?;

        tracing::info!(section = ?section, "Showcase entry created");
        Ok(created)
    }

    pub async fn delete_entry(&self, section: ShowcaseSection, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.profile_repo.delete_entry(section, &id).await
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::invalid_field("body", e.to_string()))
}

fn parse_valid<T: DeserializeOwned + Validate>(body: Value) -> Result<T, AppError> {
    let request: T = parse(body)?;
    request.validate()?;
    Ok(request)
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{profile::MockProfileRepository, site::MockSiteRepository};
    use serde_json::json;

    fn handler(site: MockSiteRepository, profile: MockProfileRepository) -> SiteHandler<MockSiteRepository, MockProfileRepository> {
        SiteHandler::new(site, profile)
    }

    #[tokio::test]
    async fn context_falls_back_to_default_settings() {
        let mut site = MockSiteRepository::new();
        site.expect_settings().returning(|| Ok(None));
        site.expect_active_social_links().returning(|| Ok(vec![]));
        site.expect_contact_info().returning(|| Ok(None));

        let context = handler(site, MockProfileRepository::new()).context().await.unwrap();

        assert_eq!(context.settings.site_title, "My Portfolio");
        assert!(context.contact_info.is_none());
    }

    #[tokio::test]
    async fn second_settings_create_is_a_conflict() {
        let mut site = MockSiteRepository::new();
        site.expect_create_settings().returning(|_| Ok(false));

        let request: SiteSettingRequest = serde_json::from_value(json!({"site_title": "Mine"})).unwrap();
        let result = handler(site, MockProfileRepository::new()).create_settings(request).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn settings_update_patches_existing_row() {
        let mut site = MockSiteRepository::new();
        site.expect_settings().returning(|| {
            Ok(Some(SiteSetting { tagline: Some("Builder".into()), ..SiteSetting::default() }))
        });
        site.expect_save_settings()
            .withf(|s| s.site_title == "New title" && s.tagline.as_deref() == Some("Builder"))
            .returning(|s| Ok(s.clone()));

        let request: SiteSettingRequest = serde_json::from_value(json!({"site_title": "New title"})).unwrap();
        let saved = handler(site, MockProfileRepository::new()).update_settings(request).await.unwrap();

        assert_eq!(saved.site_title, "New title");
    }

    #[tokio::test]
    async fn contact_info_requires_an_email() {
        let mut site = MockSiteRepository::new();
        site.expect_create_contact_info().never();

        let request: ContactInfoRequest = serde_json::from_value(json!({"city": "Lagos"})).unwrap();
        let result = handler(site, MockProfileRepository::new()).create_contact_info(request).await;

        match result {
            Err(AppError::ValidationError(errors)) => assert!(errors.contains_key("email")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_skill_is_rejected_before_storage() {
        let mut profile = MockProfileRepository::new();
        profile.expect_create_skill().never();

        let result = handler(MockSiteRepository::new(), profile)
            .create_entry(ShowcaseSection::Skills, json!({"name": "Rust", "proficiency": 120}))
            .await;

        match result {
            Err(AppError::ValidationError(errors)) => assert!(errors.contains_key("proficiency")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_entry_body_is_a_validation_error() {
        let result = handler(MockSiteRepository::new(), MockProfileRepository::new())
            .create_entry(ShowcaseSection::Awards, json!({"title": 42}))
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
