use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    constants::{HOME_FEATURED_PROJECTS, HOME_RECENT_POSTS},
    errors::AppError,
    templates::{error_page, render, AboutTemplate, IndexTemplate, PageChrome},
    use_cases::extractors::{CsrfToken, MaybeClaims},
    AppState,
};

/// Loads the site-wide context every page layout renders.
pub async fn load_chrome(state: &AppState, csrf: CsrfToken, claims: &MaybeClaims) -> Result<PageChrome, AppError> {
    Ok(PageChrome {
        site: state.site_handler.context().await?,
        csrf_token: csrf.0,
        static_url: state.static_url.clone(),
        signed_in: claims.0.is_some(),
    })
}

#[instrument(skip_all)]
pub async fn index(state: web::Data<AppState>, csrf: CsrfToken, claims: MaybeClaims) -> impl Responder {
    let page = async {
        Ok::<_, AppError>(IndexTemplate {
            page: load_chrome(&state, csrf, &claims).await?,
            showcase: state.site_handler.showcase().await?,
            featured_projects: state.project_handler.featured(HOME_FEATURED_PROJECTS).await?,
            recent_posts: state.blog_handler.recent(HOME_RECENT_POSTS).await?,
        })
    };

    match page.await {
        Ok(template) => render(&template),
        Err(e) => error_page(&e),
    }
}

#[instrument(skip_all)]
pub async fn about(state: web::Data<AppState>, csrf: CsrfToken, claims: MaybeClaims) -> impl Responder {
    let page = async {
        Ok::<_, AppError>(AboutTemplate {
            page: load_chrome(&state, csrf, &claims).await?,
            about: state.site_handler.about().await?,
        })
    };

    match page.await {
        Ok(template) => render(&template),
        Err(e) => error_page(&e),
    }
}

/// Fallback for unknown site paths.
pub async fn not_found() -> HttpResponse {
    error_page(&AppError::NotFound("Page not found".to_string()))
}
