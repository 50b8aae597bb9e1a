use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::message::{ContactForm, ContactOutcome},
    AppState,
};

/// Stores a contact message and notifies the site owner. A failed
/// notification still answers 202 because the message is kept.
#[instrument(skip_all)]
pub async fn submit_contact(
    state: web::Data<AppState>,
    body: web::Either<web::Json<ContactForm>, web::Form<ContactForm>>,
) -> impl Responder {
    let form = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };

    match state.contact_handler.submit(form).await {
        Ok(ContactOutcome::Delivered { .. }) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Message sent successfully!"
        })),
        Ok(ContactOutcome::DeliveryFailed { message_id, reason }) => {
            tracing::warn!(%message_id, "Contact notification not delivered: {}", reason);
            HttpResponse::Accepted().json(serde_json::json!({
                "success": false,
                "saved": true,
                "message": "Your message was saved, but the email notification could not be sent. It may be delayed."
            }))
        }
        Err(e) => e.to_http_response(),
    }
}
