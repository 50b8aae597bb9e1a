use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    blog::{validate_optional_url_field, validate_url},
    option_fields::OptionField,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SiteSetting {
    pub site_title: String,
    pub tagline: Option<String>,
    pub about_me: Option<String>,
    pub profile_picture_url: Option<String>,
    pub resume_url: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub google_analytics_id: Option<String>,
    pub maintenance_mode: bool,
}

impl Default for SiteSetting {
    fn default() -> Self {
        SiteSetting {
            site_title: "My Portfolio".to_string(),
            tagline: None,
            about_me: None,
            profile_picture_url: None,
            resume_url: None,
            seo_description: None,
            seo_keywords: None,
            google_analytics_id: None,
            maintenance_mode: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct ContactInfo {
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub map_embed_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "social_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Github,
    Linkedin,
    Twitter,
    Facebook,
    Instagram,
    Youtube,
    Medium,
    Dev,
    Other,
}

impl SocialPlatform {
    pub fn display_name(&self) -> &'static str {
        match self {
            SocialPlatform::Github => "GitHub",
            SocialPlatform::Linkedin => "LinkedIn",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Youtube => "YouTube",
            SocialPlatform::Medium => "Medium",
            SocialPlatform::Dev => "Dev.to",
            SocialPlatform::Other => "Other",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            SocialPlatform::Github => "github",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Youtube => "youtube",
            SocialPlatform::Medium => "medium",
            SocialPlatform::Dev => "dev",
            SocialPlatform::Other => "other",
        }
    }

    /// Font Awesome brand icon class.
    pub fn default_icon(&self) -> String {
        format!("fab fa-{}", self.slug())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SocialLink {
    pub id: Uuid,
    pub platform: SocialPlatform,
    pub name: String,
    pub url: String,
    pub icon: String,
    pub sort_order: i32,
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewSocialLinkRequest {
    pub platform: SocialPlatform,

    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub url: String,

    #[validate(length(max = 50))]
    pub icon: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub sort_order: i32,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewSocialLinkRequest {
    pub fn resolved_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.platform.display_name().to_string())
    }

    pub fn resolved_icon(&self) -> String {
        self.icon
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.platform.default_icon())
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct SiteSettingRequest {
    #[validate(length(min = 1, max = 255))]
    pub site_title: OptionField<String>,
    #[validate(length(max = 255))]
    pub tagline: OptionField<String>,
    pub about_me: OptionField<String>,
    #[validate(custom(function = "validate_optional_url_field"))]
    pub profile_picture_url: OptionField<String>,
    #[validate(custom(function = "validate_optional_url_field"))]
    pub resume_url: OptionField<String>,
    pub seo_description: OptionField<String>,
    #[validate(length(max = 255))]
    pub seo_keywords: OptionField<String>,
    #[validate(length(max = 50))]
    pub google_analytics_id: OptionField<String>,
    pub maintenance_mode: OptionField<bool>,
}

impl SiteSettingRequest {
    pub fn apply_to(&self, current: SiteSetting) -> SiteSetting {
        SiteSetting {
            site_title: self.site_title.apply(Some(current.site_title.clone())).unwrap_or(current.site_title),
            tagline: self.tagline.apply(current.tagline),
            about_me: self.about_me.apply(current.about_me),
            profile_picture_url: self.profile_picture_url.apply(current.profile_picture_url),
            resume_url: self.resume_url.apply(current.resume_url),
            seo_description: self.seo_description.apply(current.seo_description),
            seo_keywords: self.seo_keywords.apply(current.seo_keywords),
            google_analytics_id: self.google_analytics_id.apply(current.google_analytics_id),
            maintenance_mode: self.maintenance_mode.apply(Some(current.maintenance_mode)).unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct ContactInfoRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: OptionField<String>,
    #[validate(length(max = 255))]
    pub address: OptionField<String>,
    #[validate(length(max = 100))]
    pub city: OptionField<String>,
    #[validate(length(max = 100))]
    pub country: OptionField<String>,
    pub map_embed_code: OptionField<String>,
}

impl ContactInfoRequest {
    pub fn apply_to(&self, current: ContactInfo) -> ContactInfo {
        ContactInfo {
            email: self.email.clone().unwrap_or(current.email),
            phone_number: self.phone_number.apply(current.phone_number),
            address: self.address.apply(current.address),
            city: self.city.apply(current.city),
            country: self.country.apply(current.country),
            map_embed_code: self.map_embed_code.apply(current.map_embed_code),
        }
    }
}

/// Site-wide values rendered by every page.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    pub settings: SiteSetting,
    pub social_links: Vec<SocialLink>,
    pub contact_info: Option<ContactInfo>,
}
