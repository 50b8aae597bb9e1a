use actix_web::web;

use crate::handlers::{admin, system::admin_health_check};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("/health/")
                    .route(web::get().to(admin_health_check))
            )
            .service(
                web::resource("/blogs/")
                    .route(web::get().to(admin::list_blogs))
                    .route(web::post().to(admin::create_blog))
            )
            .service(
                web::resource("/blogs/{blog_id}/")
                    .route(web::get().to(admin::get_blog))
                    .route(web::patch().to(admin::update_blog))
                    .route(web::delete().to(admin::delete_blog))
            )
            .service(
                web::resource("/blogs/{blog_id}/comments/")
                    .route(web::get().to(admin::list_comments))
            )
            .service(
                web::resource("/comments/{comment_id}/")
                    .route(web::patch().to(admin::moderate_comment))
                    .route(web::delete().to(admin::delete_comment))
            )
            .service(
                web::resource("/projects/")
                    .route(web::post().to(admin::create_project))
            )
            .service(
                web::resource("/projects/{project_id}/")
                    .route(web::get().to(admin::get_project))
                    .route(web::patch().to(admin::update_project))
                    .route(web::delete().to(admin::delete_project))
            )
            .service(
                web::resource("/projects/{project_id}/images/")
                    .route(web::post().to(admin::add_project_image))
            )
            .service(
                web::resource("/messages/")
                    .route(web::get().to(admin::list_messages))
            )
            .service(
                web::resource("/messages/{message_id}/")
                    .route(web::patch().to(admin::mark_message_read))
                    .route(web::delete().to(admin::delete_message))
            )
            .service(
                web::resource("/settings/")
                    .route(web::get().to(admin::get_settings))
                    .route(web::post().to(admin::create_settings))
                    .route(web::patch().to(admin::update_settings))
            )
            .service(
                web::resource("/contact-info/")
                    .route(web::get().to(admin::get_contact_info))
                    .route(web::post().to(admin::create_contact_info))
                    .route(web::patch().to(admin::update_contact_info))
            )
            .service(
                web::resource("/showcase/{section}/")
                    .route(web::post().to(admin::create_showcase_entry))
            )
            .service(
                web::resource("/showcase/{section}/{entry_id}/")
                    .route(web::delete().to(admin::delete_showcase_entry))
            )
    );
}
