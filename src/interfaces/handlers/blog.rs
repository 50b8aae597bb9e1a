use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::blog::{BlogListQuery, LikeResponse},
    errors::AppError,
    handlers::pages::load_chrome,
    templates::{error_page, render, BlogDetailTemplate, BlogTemplate},
    use_cases::{
        comment::flatten_thread,
        extractors::{CsrfToken, MaybeClaims, VisitorId},
    },
    AppState,
};

#[instrument(skip(state, csrf, claims))]
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<BlogListQuery>,
    csrf: CsrfToken,
    claims: MaybeClaims,
) -> impl Responder {
    let query = query.into_inner();
    let page = async {
        Ok::<_, AppError>(BlogTemplate {
            page: load_chrome(&state, csrf, &claims).await?,
            posts: state.blog_handler.list(&query).await?,
            tag: query.tag().map(String::from),
            q: query.search().map(String::from),
        })
    };

    match page.await {
        Ok(template) => render(&template),
        Err(e) => error_page(&e),
    }
}

/// Renders a published post and counts the view.
#[instrument(skip(state, visitor, csrf, claims))]
pub async fn post_detail(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    visitor: VisitorId,
    csrf: CsrfToken,
    claims: MaybeClaims,
) -> impl Responder {
    let detail = match state.blog_handler.detail(&slug, Some(visitor.0)).await {
        Ok(detail) => detail,
        Err(e) => return error_page(&e),
    };

    let thread = match state.comment_handler.thread_for_blog(&detail.post.blog.id).await {
        Ok(thread) => thread,
        Err(e) => return error_page(&e),
    };

    let page = match load_chrome(&state, csrf, &claims).await {
        Ok(page) => page,
        Err(e) => return error_page(&e),
    };

    let comments = flatten_thread(&thread);
    let template = BlogDetailTemplate {
        page,
        content_html: detail.post.blog.content_html(),
        reading_time: detail.post.blog.reading_time(),
        comment_count: comments.len(),
        comments,
        post: detail.post,
        related: detail.related,
        liked: detail.liked,
    };

    render(&template)
}

#[instrument(skip(state, visitor))]
pub async fn like_post(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    visitor: VisitorId,
) -> impl Responder {
    match state.blog_handler.toggle_like(&slug, &visitor.0).await {
        Ok(outcome) => HttpResponse::Ok().json(LikeResponse::from(outcome)),
        Err(e) => e.to_http_response(),
    }
}
