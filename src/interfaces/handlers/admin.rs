use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        blog::{NewBlogRequest, UpdateBlogRequest},
        comment::CommentModerationRequest,
        message::MessageReadRequest,
        project::{NewProjectImageRequest, NewProjectRequest, UpdateProjectRequest},
        site::{ContactInfoRequest, SiteSettingRequest},
    },
    repositories::profile::ShowcaseSection,
    use_cases::extractors::AdminClaims,
    AppState,
};

// ───── Blogs ─────────────────────────────────────────────────────────

pub async fn list_blogs(_admin: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    match state.blog_handler.list_all().await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => e.to_http_response(),
    }
}

pub async fn get_blog(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    blog_id: web::Path<String>,
) -> impl Responder {
    match state.blog_handler.get(&blog_id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn create_blog(
    admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<NewBlogRequest>,
) -> impl Responder {
    match state.blog_handler.create(body.into_inner()).await {
        Ok(post) => HttpResponse::Created().json(post),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn update_blog(
    admin: AdminClaims,
    state: web::Data<AppState>,
    blog_id: web::Path<String>,
    body: web::Json<UpdateBlogRequest>,
) -> impl Responder {
    match state.blog_handler.update(&blog_id, body.into_inner()).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn delete_blog(
    admin: AdminClaims,
    state: web::Data<AppState>,
    blog_id: web::Path<String>,
) -> impl Responder {
    match state.blog_handler.delete(&blog_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}

// ───── Projects ──────────────────────────────────────────────────────

pub async fn get_project(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> impl Responder {
    match state.project_handler.get(&project_id).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn create_project(
    admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<NewProjectRequest>,
) -> impl Responder {
    match state.project_handler.create(body.into_inner()).await {
        Ok(project) => HttpResponse::Created().json(project),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn update_project(
    admin: AdminClaims,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
    body: web::Json<UpdateProjectRequest>,
) -> impl Responder {
    match state.project_handler.update(&project_id, body.into_inner()).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn delete_project(
    admin: AdminClaims,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> impl Responder {
    match state.project_handler.delete(&project_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}

pub async fn add_project_image(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
    body: web::Json<NewProjectImageRequest>,
) -> impl Responder {
    match state.project_handler.add_image(&project_id, body.into_inner()).await {
        Ok(image) => HttpResponse::Created().json(image),
        Err(e) => e.to_http_response(),
    }
}

// ───── Comments ──────────────────────────────────────────────────────

pub async fn list_comments(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    blog_id: web::Path<String>,
) -> impl Responder {
    match state.comment_handler.list_for_moderation(&blog_id).await {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn moderate_comment(
    admin: AdminClaims,
    state: web::Data<AppState>,
    comment_id: web::Path<String>,
    body: web::Json<CommentModerationRequest>,
) -> impl Responder {
    match state.comment_handler.moderate(&comment_id, body.active).await {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => e.to_http_response(),
    }
}

/// Replies go with their parent.
#[instrument(skip_all, fields(admin = %admin.0.sub))]
pub async fn delete_comment(
    admin: AdminClaims,
    state: web::Data<AppState>,
    comment_id: web::Path<String>,
) -> impl Responder {
    match state.comment_handler.delete(&comment_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}

// ───── Messages ──────────────────────────────────────────────────────

pub async fn list_messages(_admin: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    match state.contact_handler.list().await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => e.to_http_response(),
    }
}

pub async fn mark_message_read(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    message_id: web::Path<String>,
    body: web::Json<MessageReadRequest>,
) -> impl Responder {
    match state.contact_handler.mark_read(&message_id, body.is_read).await {
        Ok(message) => HttpResponse::Ok().json(message),
        Err(e) => e.to_http_response(),
    }
}

pub async fn delete_message(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    message_id: web::Path<String>,
) -> impl Responder {
    match state.contact_handler.delete(&message_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}

// ───── Site settings & contact info ──────────────────────────────────

pub async fn get_settings(_admin: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    match state.site_handler.settings().await {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => e.to_http_response(),
    }
}

pub async fn create_settings(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<SiteSettingRequest>,
) -> impl Responder {
    match state.site_handler.create_settings(body.into_inner()).await {
        Ok(settings) => HttpResponse::Created().json(settings),
        Err(e) => e.to_http_response(),
    }
}

pub async fn update_settings(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<SiteSettingRequest>,
) -> impl Responder {
    match state.site_handler.update_settings(body.into_inner()).await {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => e.to_http_response(),
    }
}

pub async fn get_contact_info(_admin: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    match state.site_handler.contact_info().await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => e.to_http_response(),
    }
}

pub async fn create_contact_info(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<ContactInfoRequest>,
) -> impl Responder {
    match state.site_handler.create_contact_info(body.into_inner()).await {
        Ok(info) => HttpResponse::Created().json(info),
        Err(e) => e.to_http_response(),
    }
}

pub async fn update_contact_info(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    body: web::Json<ContactInfoRequest>,
) -> impl Responder {
    match state.site_handler.update_contact_info(body.into_inner()).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => e.to_http_response(),
    }
}

// ───── Showcase ──────────────────────────────────────────────────────

#[instrument(skip(_admin, state, body))]
pub async fn create_showcase_entry(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    section: web::Path<ShowcaseSection>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    match state.site_handler.create_entry(section.into_inner(), body.into_inner()).await {
        Ok(entry) => HttpResponse::Created().json(entry),
        Err(e) => e.to_http_response(),
    }
}

#[instrument(skip(_admin, state))]
pub async fn delete_showcase_entry(
    _admin: AdminClaims,
    state: web::Data<AppState>,
    path: web::Path<(ShowcaseSection, String)>,
) -> impl Responder {
    let (section, id) = path.into_inner();
    match state.site_handler.delete_entry(section, &id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}
