use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::comment::{CommentForm, PostedCommentResponse},
    use_cases::extractors::MaybeClaims,
    AppState,
};

/// Accepts a comment or reply as JSON or as a urlencoded form.
#[instrument(skip(state, body, claims))]
pub async fn post_comment(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    body: web::Either<web::Json<CommentForm>, web::Form<CommentForm>>,
    claims: MaybeClaims,
) -> impl Responder {
    let form = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };

    match state.comment_handler.submit(&slug, form, claims.commenter()).await {
        Ok(comment) => HttpResponse::Created().json(PostedCommentResponse {
            success: true,
            comment: comment.to_posted(state.comment_handler.static_url()),
            message: "Comment posted successfully!".to_string(),
        }),
        Err(e) => e.to_http_response(),
    }
}
