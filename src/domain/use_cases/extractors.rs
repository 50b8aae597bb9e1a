use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{
    entities::{comment::Commenter, token::Claims},
    errors::{AppError, AuthError},
};

/// Extractor for authenticated claims, ensuring the user is authenticated.
/// Returns 401 if the user is not authenticated.
/// Usage: Add `claims: AuthClaims` as a parameter to your handler function.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthClaims(claims.clone()))),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// Extractor for admin claims, ensuring the user has admin privileges.
/// Returns 403 if the user is not an admin.
/// Returns 401 if the user is not authenticated.
#[derive(Debug)]
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) if claims.admin => ready(Ok(AdminClaims(claims.clone()))),
            Some(_) => ready(Err(AuthError::Forbidden("Admin access required".into()).into())),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// Claims when the visitor is signed in, on pages that also serve anonymous
/// visitors. Never fails.
#[derive(Debug)]
pub struct MaybeClaims(pub Option<Claims>);

impl MaybeClaims {
    /// The signed-in visitor as a comment author.
    pub fn commenter(&self) -> Option<Commenter> {
        self.0
            .as_ref()
            .and_then(|claims| Uuid::parse_str(&claims.sub).ok())
            .map(|user_id| Commenter { user_id })
    }
}

impl FromRequest for MaybeClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeClaims(req.extensions().get::<Claims>().cloned())))
    }
}

/// Anonymous visitor identity, issued by the session middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorId(pub Uuid);

impl FromRequest for VisitorId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<VisitorId>() {
            Some(visitor) => ready(Ok(*visitor)),
            None => {
                tracing::error!("Visitor id missing; is the session middleware mounted?");
                ready(Err(AppError::InternalError("Visitor session unavailable".into()).into()))
            }
        }
    }
}

/// CSRF token of the current session, for embedding into rendered pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl FromRequest for CsrfToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<CsrfToken>().cloned().unwrap_or(CsrfToken(String::new()))))
    }
}
