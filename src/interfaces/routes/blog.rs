use actix_web::web;

use crate::handlers::{blog, comments};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog")
            .service(
                web::resource("/")
                    .route(web::get().to(blog::list_posts))
            )
            .service(
                web::resource("/{slug}/")
                    .route(web::get().to(blog::post_detail))
            )
            .service(
                web::resource("/{slug}/comment/")
                    .route(web::post().to(comments::post_comment))
            )
            .service(
                web::resource("/{slug}/like/")
                    .route(web::post().to(blog::like_post))
            )
    );
}
