use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::{
        award::{Award, NewAwardRequest},
        certification::{Certification, NewCertificationRequest},
        education::{Education, NewEducationRequest},
        experience::{Experience, NewExperienceRequest},
        service::{NewServiceRequest, Service},
        skill::{NewSkillRequest, Skill},
        testimonial::{NewTestimonialRequest, Testimonial},
    },
    errors::AppError,
    repositories::sqlx_repo::{slug_conflict, SqlxProfileRepo},
};

/// Showcase collections managed through the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShowcaseSection {
    Skills,
    Experiences,
    Educations,
    Certifications,
    Awards,
    Services,
    Testimonials,
    SocialLinks,
}

impl ShowcaseSection {
    fn table(&self) -> &'static str {
        match self {
            ShowcaseSection::Skills => "skills",
            ShowcaseSection::Experiences => "experiences",
            ShowcaseSection::Educations => "educations",
            ShowcaseSection::Certifications => "certifications",
            ShowcaseSection::Awards => "awards",
            ShowcaseSection::Services => "services",
            ShowcaseSection::Testimonials => "testimonials",
            ShowcaseSection::SocialLinks => "social_links",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn skills(&self) -> Result<Vec<Skill>, AppError>;
    async fn experiences(&self) -> Result<Vec<Experience>, AppError>;
    async fn educations(&self) -> Result<Vec<Education>, AppError>;
    async fn certifications(&self) -> Result<Vec<Certification>, AppError>;
    async fn awards(&self) -> Result<Vec<Award>, AppError>;
    async fn services(&self) -> Result<Vec<Service>, AppError>;
    async fn testimonials(&self) -> Result<Vec<Testimonial>, AppError>;

    async fn create_skill(&self, skill: &NewSkillRequest) -> Result<Skill, AppError>;
    async fn create_experience(&self, experience: &NewExperienceRequest) -> Result<Experience, AppError>;
    async fn create_education(&self, education: &NewEducationRequest) -> Result<Education, AppError>;
    async fn create_certification(&self, certification: &NewCertificationRequest) -> Result<Certification, AppError>;
    async fn create_award(&self, award: &NewAwardRequest) -> Result<Award, AppError>;
    async fn create_service(&self, service: &NewServiceRequest, slug: &str) -> Result<Service, AppError>;
    async fn create_testimonial(&self, testimonial: &NewTestimonialRequest) -> Result<Testimonial, AppError>;

    async fn delete_entry(&self, section: ShowcaseSection, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxProfileRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProfileRepo { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepo {
    async fn skills(&self) -> Result<Vec<Skill>, AppError> {
        let skills = sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY sort_order, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(skills)
    }

    async fn experiences(&self) -> Result<Vec<Experience>, AppError> {
        let experiences = sqlx::query_as::<_, Experience>("SELECT * FROM experiences ORDER BY start_date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(experiences)
    }

    async fn educations(&self) -> Result<Vec<Education>, AppError> {
        let educations = sqlx::query_as::<_, Education>("SELECT * FROM educations ORDER BY graduation_date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(educations)
    }

    async fn certifications(&self) -> Result<Vec<Certification>, AppError> {
        let certifications = sqlx::query_as::<_, Certification>(
            "SELECT * FROM certifications ORDER BY issue_date DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(certifications)
    }

    async fn awards(&self) -> Result<Vec<Award>, AppError> {
        let awards = sqlx::query_as::<_, Award>("SELECT * FROM awards ORDER BY date_received DESC NULLS LAST")
            .fetch_all(&self.pool)
            .await?;
        Ok(awards)
    }

    async fn services(&self) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY sort_order, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            "SELECT * FROM testimonials ORDER BY featured DESC, date_given DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(testimonials)
    }

    async fn create_skill(&self, skill: &NewSkillRequest) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name, description, category, proficiency, icon, sort_order, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(skill.name.trim())
        .bind(&skill.description)
        .bind(skill.category)
        .bind(skill.proficiency)
        .bind(&skill.icon)
        .bind(skill.sort_order)
        .bind(skill.featured)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn create_experience(&self, experience: &NewExperienceRequest) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"
            INSERT INTO experiences (title, company, location, start_date, end_date, current, description, employment_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(experience.title.trim())
        .bind(experience.company.trim())
        .bind(&experience.location)
        .bind(experience.start_date)
        .bind(experience.normalized_end_date())
        .bind(experience.current)
        .bind(&experience.description)
        .bind(experience.employment_type)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn create_education(&self, education: &NewEducationRequest) -> Result<Education, AppError> {
        sqlx::query_as::<_, Education>(
            r#"
            INSERT INTO educations (degree, institution, major, start_date, graduation_date, description, gpa, currently_attending, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(education.degree.trim())
        .bind(education.institution.trim())
        .bind(&education.major)
        .bind(education.start_date)
        .bind(education.graduation_date)
        .bind(&education.description)
        .bind(education.gpa)
        .bind(education.currently_attending)
        .bind(&education.logo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn create_certification(&self, certification: &NewCertificationRequest) -> Result<Certification, AppError> {
        sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO certifications (name, issuing_organization, credential_id, issue_date, expiry_date, certificate_link, credential_url, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(certification.name.trim())
        .bind(certification.issuing_organization.trim())
        .bind(&certification.credential_id)
        .bind(certification.issue_date)
        .bind(certification.expiry_date)
        .bind(&certification.certificate_link)
        .bind(&certification.credential_url)
        .bind(&certification.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn create_award(&self, award: &NewAwardRequest) -> Result<Award, AppError> {
        sqlx::query_as::<_, Award>(
            r#"
            INSERT INTO awards (name, awarding_organization, date_received, description, link, featured)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(award.name.trim())
        .bind(award.awarding_organization.trim())
        .bind(award.date_received)
        .bind(&award.description)
        .bind(&award.link)
        .bind(award.featured)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn create_service(&self, service: &NewServiceRequest, slug: &str) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, slug, description, icon, featured, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(service.name.trim())
        .bind(slug)
        .bind(&service.description)
        .bind(&service.icon)
        .bind(service.featured)
        .bind(service.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, "services_slug_key", "service", slug))
    }

    async fn create_testimonial(&self, testimonial: &NewTestimonialRequest) -> Result<Testimonial, AppError> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            INSERT INTO testimonials (name, company, role, testimonial_text, date_given, avatar_url, featured, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(testimonial.name.trim())
        .bind(&testimonial.company)
        .bind(&testimonial.role)
        .bind(&testimonial.testimonial_text)
        .bind(testimonial.date_given)
        .bind(&testimonial.avatar_url)
        .bind(testimonial.featured)
        .bind(testimonial.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn delete_entry(&self, section: ShowcaseSection, id: &Uuid) -> Result<(), AppError> {
        // Table names come from a closed enum, never from input.
        let sql = format!("DELETE FROM {} WHERE id = $1", section.table());

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Entry not found".to_string()));
        }

        Ok(())
    }
}
