use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    entities::message::{ContactForm, ContactOutcome, Message, MessageInsert},
    errors::{AppError, MailError},
    mail::{Mailer, OutgoingMail},
    repositories::message::MessageRepository,
    settings::AppConfig,
    utils::valid_uuid::valid_uuid,
};

/// Addresses and limits used when notifying about a submission.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub owner_email: String,
    pub from_email: String,
    pub timeout: Duration,
    pub send_confirmation_copy: bool,
}

impl ContactSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        ContactSettings {
            owner_email: config.contact_email.clone(),
            from_email: config.default_from_email.clone(),
            timeout: Duration::from_secs(config.mail_timeout_secs),
            send_confirmation_copy: config.send_confirmation_copy,
        }
    }
}

pub struct ContactHandler<R>
where
    R: MessageRepository,
{
    pub message_repo: R,
    mailer: Arc<dyn Mailer>,
    settings: ContactSettings,
}

impl<R> ContactHandler<R>
where
    R: MessageRepository,
{
    pub fn new(message_repo: R, mailer: Arc<dyn Mailer>, settings: ContactSettings) -> Self {
        ContactHandler { message_repo, mailer, settings }
    }

    /// Validates, stores and forwards a contact submission.
    ///
    /// The message is persisted before any mail is sent and is never rolled
    /// back; a failed owner notification is reported as
    /// [`ContactOutcome::DeliveryFailed`].
    pub async fn submit(&self, form: ContactForm) -> Result<ContactOutcome, AppError> {
        form.validate()?;
        let insert = form.into_insert();

        let message = self.message_repo.insert(&insert).await?;
        tracing::info!(message_id = %message.id, "Contact message stored");

        if let Err(e) = self.deliver(&self.owner_notification(&insert)).await {
            tracing::error!(message_id = %message.id, error = %e, "Contact notification failed");
            return Ok(ContactOutcome::DeliveryFailed {
                message_id: message.id,
                reason: e.to_string(),
            });
        }

        if self.settings.send_confirmation_copy {
            if let Err(e) = self.deliver(&self.confirmation_copy(&insert)).await {
                tracing::warn!(message_id = %message.id, error = %e, "Confirmation copy failed");
            }
        }

        Ok(ContactOutcome::Delivered { message_id: message.id })
    }

    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match tokio::time::timeout(self.settings.timeout, self.mailer.send(mail)).await {
            Ok(result) => result,
            Err(_) => Err(MailError::Timeout(self.settings.timeout.as_secs())),
        }
    }

    fn owner_notification(&self, insert: &MessageInsert) -> OutgoingMail {
        OutgoingMail {
            from: self.settings.from_email.clone(),
            to: vec![self.settings.owner_email.clone()],
            reply_to: Some(insert.email.clone()),
            subject: insert.subject.clone(),
            text: insert.notification_body(),
        }
    }

    fn confirmation_copy(&self, insert: &MessageInsert) -> OutgoingMail {
        OutgoingMail {
            from: self.settings.from_email.clone(),
            to: vec![insert.email.clone()],
            reply_to: None,
            subject: format!("Copy of your message: {}", insert.subject),
            text: format!(
                "Hi {},\n\nThanks for getting in touch. This is a copy of your message.\n\n{}",
                insert.name, insert.message
            ),
        }
    }

    // ───── Admin ─────────────────────────────────────────────────────

    pub async fn list(&self) -> Result<Vec<Message>, AppError> {
        self.message_repo.list().await
    }

    pub async fn mark_read(&self, id: &str, is_read: bool) -> Result<Message, AppError> {
        let id = valid_uuid(id)?;
        self.message_repo.mark_read(&id, is_read).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.message_repo.delete(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MockMailer;
    use crate::repositories::message::MockMessageRepository;
    use chrono::Utc;
    use uuid::Uuid;

    fn settings(send_confirmation_copy: bool) -> ContactSettings {
        ContactSettings {
            owner_email: "owner@example.com".into(),
            from_email: "noreply@example.com".into(),
            timeout: Duration::from_millis(200),
            send_confirmation_copy,
        }
    }

    fn form() -> ContactForm {
        ContactForm {
            name: " Ada ".into(),
            email: "ada@example.com".into(),
            subject: None,
            message: "Hello there".into(),
        }
    }

    fn storing_repo() -> MockMessageRepository {
        let mut repo = MockMessageRepository::new();
        repo.expect_insert().times(1).returning(|insert| {
            Ok(Message {
                id: Uuid::new_v4(),
                name: insert.name.clone(),
                email: insert.email.clone(),
                subject: insert.subject.clone(),
                message: insert.message.clone(),
                created_at: Utc::now(),
                is_read: false,
            })
        });
        repo
    }

    #[tokio::test]
    async fn delivered_submission_notifies_owner() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail| {
                mail.to == vec!["owner@example.com".to_string()]
                    && mail.reply_to.as_deref() == Some("ada@example.com")
                    && mail.subject == "Portfolio Contact Form Submission"
                    && mail.text == "Name: Ada\nEmail: ada@example.com\n\nMessage:\nHello there"
            })
            .times(1)
            .returning(|_| Ok(()));

        let handler = ContactHandler::new(storing_repo(), Arc::new(mailer), settings(false));
        let outcome = handler.submit(form()).await.unwrap();

        assert!(matches!(outcome, ContactOutcome::Delivered { .. }));
    }

    #[tokio::test]
    async fn failed_delivery_keeps_the_message() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(MailError::Rejected(503)));

        let handler = ContactHandler::new(storing_repo(), Arc::new(mailer), settings(true));
        let outcome = handler.submit(form()).await.unwrap();

        match outcome {
            ContactOutcome::DeliveryFailed { reason, .. } => assert!(reason.contains("503")),
            other => panic!("expected delivery failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_form_stores_and_sends_nothing() {
        let mut repo = MockMessageRepository::new();
        repo.expect_insert().never();
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let handler = ContactHandler::new(repo, Arc::new(mailer), settings(false));
        let result = handler
            .submit(ContactForm { email: "nope".into(), ..form() })
            .await;

        match result {
            Err(AppError::ValidationError(errors)) => assert!(errors.contains_key("email")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn confirmation_copy_failure_is_not_a_delivery_failure() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail| mail.to == vec!["owner@example.com".to_string()])
            .times(1)
            .returning(|_| Ok(()));
        mailer
            .expect_send()
            .withf(|mail| mail.to == vec!["ada@example.com".to_string()])
            .times(1)
            .returning(|_| Err(MailError::Transport("connection reset".into())));

        let handler = ContactHandler::new(storing_repo(), Arc::new(mailer), settings(true));
        let outcome = handler.submit(form()).await.unwrap();

        assert!(matches!(outcome, ContactOutcome::Delivered { .. }));
    }

    struct SlowMailer;

    #[async_trait::async_trait]
    impl Mailer for SlowMailer {
        async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_mailer_times_out_as_delivery_failure() {
        let handler = ContactHandler::new(storing_repo(), Arc::new(SlowMailer), settings(false));
        let outcome = handler.submit(form()).await.unwrap();

        assert!(matches!(outcome, ContactOutcome::DeliveryFailed { .. }));
    }
}
