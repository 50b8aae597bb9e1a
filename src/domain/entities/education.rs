use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::blog::validate_url;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Education {
    pub id: Uuid,
    pub degree: String,
    pub institution: String,
    pub major: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub graduation_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub gpa: Option<f32>,
    pub currently_attending: bool,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewEducationRequest {
    #[validate(length(min = 1, max = 200))]
    pub degree: String,

    #[validate(length(min = 1, max = 200))]
    pub institution: String,

    #[validate(length(max = 200))]
    pub major: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub graduation_date: Option<NaiveDate>,
    pub description: Option<String>,

    #[validate(range(min = 0.0, max = 9.99, message = "GPA must be between 0.00 and 9.99"))]
    pub gpa: Option<f32>,

    #[serde(default)]
    pub currently_attending: bool,

    #[validate(custom(function = "validate_url"))]
    pub logo_url: Option<String>,
}
