use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{
    rc::Rc,
    task::{Context, Poll},
};

use crate::{
    constants::ACCESS_TOKEN_COOKIE, entities::token::Claims, errors::AuthError, repositories::token::TokenService,
    AppState,
};

const API_PREFIX: &str = "/api/v1";
const ADMIN_PREFIX: &str = "/api/v1/admin";

/// Resolves the caller's JWT into [`Claims`].
///
/// `/api/v1` routes need a bearer token except for the public auth
/// endpoints, and `/api/v1/admin` additionally needs the admin claim. Site
/// pages never require a token; the `access_token` cookie set at login is
/// honoured there so that comments are attributed to the signed-in user.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path().trim_end_matches('/').to_string();
            let is_api = path.starts_with(API_PREFIX);

            if req.method() == actix_web::http::Method::OPTIONS || is_public_api_route(&path) {
                return service.call(req).await;
            }

            let token = extract_token(&req, is_api);
            let claims = match token {
                Some(token) => match decode_claims(&req, &token) {
                    Ok(claims) => Some(claims),
                    Err(AuthError::MissingJwtService) => {
                        tracing::error!("AppState missing in auth middleware");
                        return Ok(req.into_response(HttpResponse::InternalServerError().json(
                            serde_json::json!({"error": "Internal server error"}),
                        )));
                    }
                    Err(e) => {
                        tracing::debug!("Rejected token on {}: {}", path, e);
                        None
                    }
                },
                None => None,
            };

            if is_api {
                let Some(claims) = claims else {
                    tracing::warn!("Missing or invalid credentials for {}", path);
                    return Ok(req.into_response(HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "Missing or invalid credentials"
                    }))));
                };

                if let Err(forbidden) = enforce_admin_access(&path, &claims) {
                    return Ok(req.into_response(forbidden));
                }

                req.extensions_mut().insert(claims);
            } else if let Some(claims) = claims {
                req.extensions_mut().insert(claims);
            }

            service.call(req).await
        })
    }
}

fn is_public_api_route(path: &str) -> bool {
    matches!(
        path,
        "/api/v1/auth/register" | "/api/v1/auth/login" | "/api/v1/auth/refresh"
    )
}

/// Bearer header first; outside the API the login cookie is accepted too.
fn extract_token(req: &ServiceRequest, is_api: bool) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        });

    if bearer.is_some() || is_api {
        return bearer;
    }

    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn decode_claims(req: &ServiceRequest, token: &str) -> Result<Claims, AuthError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(AuthError::MissingJwtService)?;

    let decoded = state.auth_handler.token_service.decode_jwt(token)?;
    Ok(decoded.claims)
}

fn enforce_admin_access(path: &str, claims: &Claims) -> Result<(), HttpResponse> {
    if path.starts_with(ADMIN_PREFIX) && !claims.admin {
        tracing::warn!(user = %claims.sub, "Admin access required for path: {}", path);
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Admin access required"
        })));
    }
    Ok(())
}
