use actix_web::{
    body::BoxBody,
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

use crate::{
    constants::{CSRF_COOKIE, CSRF_FORM_FIELD, CSRF_HEADER, VISITOR_COOKIE},
    use_cases::extractors::{CsrfToken, VisitorId},
};

const VISITOR_COOKIE_DAYS: i64 = 365;

/// Anonymous visitor session and CSRF protection for the site.
///
/// Every request gets a durable `visitor_id` and a `csrftoken` cookie, issued
/// on first contact. Unsafe methods outside `/api/v1` must echo the token in
/// the `X-CSRFToken` header or the `csrfmiddlewaretoken` query parameter.
pub struct SessionMiddleware {
    secure_cookies: bool,
}

impl SessionMiddleware {
    pub fn new(secure_cookies: bool) -> Self {
        SessionMiddleware { secure_cookies }
    }
}

impl<S> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService {
            service: Rc::new(service),
            secure_cookies: self.secure_cookies,
        })
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    secure_cookies: bool,
}

impl<S> Service<ServiceRequest> for SessionMiddlewareService<S>
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
        let secure = self.secure_cookies;

        Box::pin(async move {
            let existing_csrf = req
                .cookie(CSRF_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty());

            if requires_csrf_check(req.method(), req.path()) {
                let supplied = supplied_csrf_token(&req);
                if !tokens_match(existing_csrf.as_deref(), supplied.as_deref()) {
                    tracing::warn!(path = %req.path(), "CSRF verification failed");
                    return Ok(req.into_response(HttpResponse::Forbidden().json(serde_json::json!({
                        "success": false,
                        "error": "CSRF verification failed."
                    }))));
                }
            }

            let existing_visitor = req
                .cookie(VISITOR_COOKIE)
                .and_then(|c| Uuid::parse_str(c.value()).ok());

            let visitor = existing_visitor.unwrap_or_else(Uuid::new_v4);
            let csrf = existing_csrf.clone().unwrap_or_else(new_csrf_token);

            req.extensions_mut().insert(VisitorId(visitor));
            req.extensions_mut().insert(CsrfToken(csrf.clone()));

            let mut res = service.call(req).await?;

            if existing_visitor.is_none() {
                let cookie = Cookie::build(VISITOR_COOKIE, visitor.to_string())
                    .path("/")
                    .http_only(true)
                    .secure(secure)
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::days(VISITOR_COOKIE_DAYS))
                    .finish();
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    tracing::error!("Failed to set visitor cookie: {}", e);
                }
            }

            if existing_csrf.is_none() {
                // Readable by page scripts, which echo it back in the header.
                let cookie = Cookie::build(CSRF_COOKIE, csrf)
                    .path("/")
                    .secure(secure)
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::days(VISITOR_COOKIE_DAYS))
                    .finish();
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    tracing::error!("Failed to set CSRF cookie: {}", e);
                }
            }

            Ok(res)
        })
    }
}

fn new_csrf_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn requires_csrf_check(method: &Method, path: &str) -> bool {
    let safe_method = [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method);
    !safe_method && !path.starts_with("/api/v1")
}

fn supplied_csrf_token(req: &ServiceRequest) -> Option<String> {
    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    header.or_else(|| {
        url::form_urlencoded::parse(req.query_string().as_bytes())
            .find(|(key, _)| key == CSRF_FORM_FIELD)
            .map(|(_, value)| value.into_owned())
    })
}

fn tokens_match(cookie: Option<&str>, supplied: Option<&str>) -> bool {
    match (cookie, supplied) {
        (Some(expected), Some(given)) => {
            expected.len() == given.len()
                && expected.bytes().zip(given.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn ok_handler(visitor: VisitorId) -> HttpResponse {
        HttpResponse::Ok().body(visitor.0.to_string())
    }

    #[::core::prelude::v1::test]
    fn only_unsafe_site_requests_are_checked() {
        assert!(requires_csrf_check(&Method::POST, "/blog/hello/like/"));
        assert!(requires_csrf_check(&Method::DELETE, "/contact/"));
        assert!(!requires_csrf_check(&Method::GET, "/blog/"));
        assert!(!requires_csrf_check(&Method::POST, "/api/v1/auth/login/"));
    }

    #[::core::prelude::v1::test]
    fn token_comparison_requires_both_sides() {
        assert!(tokens_match(Some("abc"), Some("abc")));
        assert!(!tokens_match(Some("abc"), Some("abd")));
        assert!(!tokens_match(Some("abc"), None));
        assert!(!tokens_match(None, Some("abc")));
    }

    #[actix_rt::test]
    async fn first_visit_issues_cookies() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(false))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert!(res.status().is_success());
        let names: Vec<String> = res.response().cookies().map(|c| c.name().to_string()).collect();
        assert!(names.contains(&VISITOR_COOKIE.to_string()));
        assert!(names.contains(&CSRF_COOKIE.to_string()));
    }

    #[actix_rt::test]
    async fn post_without_token_is_forbidden() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(false))
                .route("/like/", web::post().to(ok_handler)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/like/")
            .cookie(Cookie::new(CSRF_COOKIE, "token"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn post_with_matching_header_or_query_passes() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(false))
                .route("/like/", web::post().to(ok_handler)),
        )
        .await;

        let with_header = test::TestRequest::post()
            .uri("/like/")
            .cookie(Cookie::new(CSRF_COOKIE, "token"))
            .insert_header((CSRF_HEADER, "token"))
            .to_request();
        assert!(test::call_service(&app, with_header).await.status().is_success());

        let with_query = test::TestRequest::post()
            .uri("/like/?csrfmiddlewaretoken=token")
            .cookie(Cookie::new(CSRF_COOKIE, "token"))
            .to_request();
        assert!(test::call_service(&app, with_query).await.status().is_success());
    }

    #[actix_rt::test]
    async fn returning_visitor_keeps_identity() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(false))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        let id = Uuid::new_v4();
        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(VISITOR_COOKIE, id.to_string()))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, id.to_string());
    }
}
