use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::blog::validate_url;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub testimonial_text: String,
    pub date_given: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub featured: bool,
    pub rating: i32,
}

impl Testimonial {
    /// Filled and empty star counts for the rating widget.
    pub fn stars(&self) -> (usize, usize) {
        let filled = self.rating.clamp(0, 5) as usize;
        (filled, 5 - filled)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTestimonialRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 100))]
    pub company: Option<String>,

    #[validate(length(max = 100))]
    pub role: Option<String>,

    #[validate(length(min = 1, message = "Testimonial text cannot be empty"))]
    pub testimonial_text: String,

    pub date_given: Option<NaiveDate>,

    #[validate(custom(function = "validate_url"))]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

fn default_rating() -> i32 {
    5
}
