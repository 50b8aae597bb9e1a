use actix_web::{web, HttpResponse, Responder};

use crate::{use_cases::extractors::AuthClaims, AppState};

pub async fn me(
    state: web::Data<AppState>,
    claims: AuthClaims,
) -> impl Responder {
    match state.auth_handler.me(&claims.0.sub).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.to_http_response(),
    }
}
