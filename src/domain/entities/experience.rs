use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: String,
    pub employment_type: EmploymentType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewExperienceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 200))]
    pub company: String,

    #[validate(length(max = 200))]
    pub location: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub current: bool,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[serde(default)]
    pub employment_type: EmploymentType,
}

impl NewExperienceRequest {
    /// A current position has no end date.
    pub fn normalized_end_date(&self) -> Option<NaiveDate> {
        if self.current { None } else { self.end_date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_position_drops_end_date() {
        let request: NewExperienceRequest = serde_json::from_str(
            r#"{"title":"Engineer","company":"Acme","start_date":"2022-01-01",
                "end_date":"2023-01-01","current":true,"description":"Built things",
                "employment_type":"part-time"}"#,
        )
        .unwrap();

        assert_eq!(request.normalized_end_date(), None);
        assert_eq!(request.employment_type, EmploymentType::PartTime);
    }
}
