use async_trait::async_trait;

use crate::{
    entities::site::{ContactInfo, NewSocialLinkRequest, SiteSetting, SocialLink},
    errors::AppError,
    repositories::sqlx_repo::SqlxSiteRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn settings(&self) -> Result<Option<SiteSetting>, AppError>;
    /// Inserts the singleton unless it already exists. Returns whether a row was created.
    async fn create_settings(&self, settings: &SiteSetting) -> Result<bool, AppError>;
    async fn save_settings(&self, settings: &SiteSetting) -> Result<SiteSetting, AppError>;

    async fn contact_info(&self) -> Result<Option<ContactInfo>, AppError>;
    async fn create_contact_info(&self, info: &ContactInfo) -> Result<bool, AppError>;
    async fn save_contact_info(&self, info: &ContactInfo) -> Result<ContactInfo, AppError>;

    async fn active_social_links(&self) -> Result<Vec<SocialLink>, AppError>;
    async fn create_social_link(&self, link: &NewSocialLinkRequest) -> Result<SocialLink, AppError>;
}

impl SqlxSiteRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxSiteRepo { pool }
    }
}

const UPSERT_SETTINGS: &str = r#"
    INSERT INTO site_settings (
        id, site_title, tagline, about_me, profile_picture_url, resume_url,
        seo_description, seo_keywords, google_analytics_id, maintenance_mode
    )
    VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const UPSERT_CONTACT_INFO: &str = r#"
    INSERT INTO contact_info (id, email, phone_number, address, city, country, map_embed_code)
    VALUES (1, $1, $2, $3, $4, $5, $6)
"#;

#[async_trait]
impl SiteRepository for SqlxSiteRepo {
    async fn settings(&self) -> Result<Option<SiteSetting>, AppError> {
        sqlx::query_as::<_, SiteSetting>("SELECT * FROM site_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn create_settings(&self, settings: &SiteSetting) -> Result<bool, AppError> {
        let sql = format!("{UPSERT_SETTINGS} ON CONFLICT (id) DO NOTHING");

        let result = sqlx::query(&sql)
            .bind(&settings.site_title)
            .bind(&settings.tagline)
            .bind(&settings.about_me)
            .bind(&settings.profile_picture_url)
            .bind(&settings.resume_url)
            .bind(&settings.seo_description)
            .bind(&settings.seo_keywords)
            .bind(&settings.google_analytics_id)
            .bind(settings.maintenance_mode)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_settings(&self, settings: &SiteSetting) -> Result<SiteSetting, AppError> {
        let sql = format!(
            r#"{UPSERT_SETTINGS}
            ON CONFLICT (id) DO UPDATE SET
                site_title = EXCLUDED.site_title,
                tagline = EXCLUDED.tagline,
                about_me = EXCLUDED.about_me,
                profile_picture_url = EXCLUDED.profile_picture_url,
                resume_url = EXCLUDED.resume_url,
                seo_description = EXCLUDED.seo_description,
                seo_keywords = EXCLUDED.seo_keywords,
                google_analytics_id = EXCLUDED.google_analytics_id,
                maintenance_mode = EXCLUDED.maintenance_mode
            RETURNING *"#
        );

        sqlx::query_as::<_, SiteSetting>(&sql)
            .bind(&settings.site_title)
            .bind(&settings.tagline)
            .bind(&settings.about_me)
            .bind(&settings.profile_picture_url)
            .bind(&settings.resume_url)
            .bind(&settings.seo_description)
            .bind(&settings.seo_keywords)
            .bind(&settings.google_analytics_id)
            .bind(settings.maintenance_mode)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn contact_info(&self) -> Result<Option<ContactInfo>, AppError> {
        sqlx::query_as::<_, ContactInfo>("SELECT * FROM contact_info WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn create_contact_info(&self, info: &ContactInfo) -> Result<bool, AppError> {
        let sql = format!("{UPSERT_CONTACT_INFO} ON CONFLICT (id) DO NOTHING");

        let result = sqlx::query(&sql)
            .bind(&info.email)
            .bind(&info.phone_number)
            .bind(&info.address)
            .bind(&info.city)
            .bind(&info.country)
            .bind(&info.map_embed_code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_contact_info(&self, info: &ContactInfo) -> Result<ContactInfo, AppError> {
        let sql = format!(
            r#"{UPSERT_CONTACT_INFO}
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                country = EXCLUDED.country,
                map_embed_code = EXCLUDED.map_embed_code
            RETURNING *"#
        );

        sqlx::query_as::<_, ContactInfo>(&sql)
            .bind(&info.email)
            .bind(&info.phone_number)
            .bind(&info.address)
            .bind(&info.city)
            .bind(&info.country)
            .bind(&info.map_embed_code)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn active_social_links(&self) -> Result<Vec<SocialLink>, AppError> {
        let links = sqlx::query_as::<_, SocialLink>(
            "SELECT * FROM social_links WHERE active ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn create_social_link(&self, link: &NewSocialLinkRequest) -> Result<SocialLink, AppError> {
        sqlx::query_as::<_, SocialLink>(
            r#"
            INSERT INTO social_links (platform, name, url, icon, sort_order, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(link.platform)
        .bind(link.resolved_name())
        .bind(link.url.trim())
        .bind(link.resolved_icon())
        .bind(link.sort_order)
        .bind(link.active)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }
}
