use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    post, web, HttpResponse, Responder, ResponseError,
};

use crate::{
    constants::ACCESS_TOKEN_COOKIE,
    entities::{
        token::RefreshTokenRequest,
        user::{LoginUser, NewUser},
    },
    AppState,
};

#[post("/register/")]
pub async fn register(
    state: web::Data<AppState>,
    user: web::Json<NewUser>
) -> impl Responder {
    match state.auth_handler.register(user.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.to_http_response(),
    }
}

/// Issues a token pair; the access token is also set as an HttpOnly cookie
/// so that the public pages recognise the signed-in visitor.
#[post("/login/")]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>
) -> impl Responder {
    match state.auth_handler.login(user.into_inner()).await {
        Ok(auth_response) => {
            let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, auth_response.access_token.clone())
                .path("/")
                .http_only(true)
                .secure(state.secure_cookies)
                .same_site(SameSite::Lax)
                .max_age(CookieDuration::seconds(state.auth_handler.token_service.access_ttl_seconds()))
                .finish();

            HttpResponse::Ok().cookie(cookie).json(auth_response)
        }
        Err(e) => e.error_response(),
    }
}

#[post("/refresh/")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> impl Responder {
    match state.auth_handler.refresh_token(&request.refresh_token).await {
        Ok(auth_response) => HttpResponse::Ok().json(auth_response),
        Err(e) => e.error_response(),
    }
}
