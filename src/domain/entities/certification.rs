use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::blog::validate_url;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Certification {
    pub id: Uuid,
    pub name: String,
    pub issuing_organization: String,
    pub credential_id: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_link: Option<String>,
    pub credential_url: Option<String>,
    pub image_url: Option<String>,
}

impl Certification {
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Utc::now().date_naive())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCertificationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub issuing_organization: String,

    #[validate(length(max = 100))]
    pub credential_id: Option<String>,

    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_url"))]
    pub certificate_link: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub credential_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut cert = Certification {
            id: Uuid::new_v4(),
            name: "Cloud".into(),
            issuing_organization: "Vendor".into(),
            credential_id: None,
            issue_date: None,
            expiry_date: None,
            certificate_link: None,
            credential_url: None,
            image_url: None,
        };
        assert!(!cert.is_expired_on(today));

        cert.expiry_date = Some(today);
        assert!(!cert.is_expired_on(today));

        cert.expiry_date = today.pred_opt();
        assert!(cert.is_expired_on(today));
    }
}
