use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::{constants::DEFAULT_CONTACT_SUBJECT, entities::blog::new_validation_error};

/// Persisted contact submission.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageInsert {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Contact form body, accepted as JSON or urlencoded.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactForm {
    #[serde(default)]
    #[validate(
        custom(function = "required_text"),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "required_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub subject: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "required_text"))]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageReadRequest {
    pub is_read: bool,
}

/// Result of a contact submission once the message is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactOutcome {
    Delivered { message_id: Uuid },
    /// Stored, but the owner notification failed.
    DeliveryFailed { message_id: Uuid, reason: String },
}

fn required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("required", "This field is required."));
    }
    Ok(())
}

fn required_email(value: &str) -> Result<(), ValidationError> {
    required_text(value)?;
    if !value.trim().validate_email() {
        return Err(new_validation_error("email", "Enter a valid email address."));
    }
    Ok(())
}

impl ContactForm {
    /// Trimmed values with the subject defaulted; call after validation.
    pub fn into_insert(self) -> MessageInsert {
        let subject = self
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTACT_SUBJECT)
            .to_string();

        MessageInsert {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject,
            message: self.message.trim().to_string(),
        }
    }
}

impl MessageInsert {
    pub fn notification_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\n\nMessage:\n{}",
            self.name, self.email, self.message
        )
    }
}
