use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::blog::validate_url;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Award {
    pub id: Uuid,
    pub name: String,
    pub awarding_organization: String,
    pub date_received: Option<NaiveDate>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAwardRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub awarding_organization: String,

    pub date_received: Option<NaiveDate>,
    pub description: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub link: Option<String>,

    #[serde(default)]
    pub featured: bool,
}
