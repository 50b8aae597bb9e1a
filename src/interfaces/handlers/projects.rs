use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::pagination::PageQuery,
    errors::AppError,
    handlers::pages::load_chrome,
    templates::{error_page, render, ProjectDetailTemplate, ProjectsTemplate},
    use_cases::extractors::{CsrfToken, MaybeClaims},
    AppState,
};

#[instrument(skip_all)]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    csrf: CsrfToken,
    claims: MaybeClaims,
) -> impl Responder {
    let page = async {
        Ok::<_, AppError>(ProjectsTemplate {
            page: load_chrome(&state, csrf, &claims).await?,
            projects: state.project_handler.list(query.page.as_deref()).await?,
        })
    };

    match page.await {
        Ok(template) => render(&template),
        Err(e) => error_page(&e),
    }
}

#[instrument(skip(state, csrf, claims))]
pub async fn project_detail(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    csrf: CsrfToken,
    claims: MaybeClaims,
) -> impl Responder {
    let page = async {
        let project = state.project_handler.detail(&slug).await?;
        Ok::<_, AppError>(ProjectDetailTemplate {
            page: load_chrome(&state, csrf, &claims).await?,
            key_features: project.detail.key_features(),
            detail: project.detail,
            related: project.related,
        })
    };

    match page.await {
        Ok(template) => render(&template),
        Err(e) => error_page(&e),
    }
}

/// Completed projects for the client-side gallery.
#[instrument(skip_all)]
pub async fn projects_api(state: web::Data<AppState>) -> impl Responder {
    match state.project_handler.api_items().await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => e.to_http_response(),
    }
}
