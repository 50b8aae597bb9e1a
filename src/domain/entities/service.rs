use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::entities::blog::{slug_or_derive, validate_optional_slug_str};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewServiceRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(custom(function = "validate_optional_slug_str"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[validate(length(max = 50))]
    pub icon: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub sort_order: i32,
}

impl NewServiceRequest {
    /// Validates and returns the slug to store.
    pub fn checked_slug(&self) -> Result<String, ValidationErrors> {
        self.validate()?;
        slug_or_derive(self.slug.as_deref(), &self.name)
    }
}
