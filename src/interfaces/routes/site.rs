use actix_web::web;

use crate::handlers::{contact, pages, projects};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(pages::index)))
        .service(web::resource("/about/").route(web::get().to(pages::about)))
        .service(web::resource("/api/projects/").route(web::get().to(projects::projects_api)))
        .service(
            web::scope("/projects")
                .service(
                    web::resource("/")
                        .route(web::get().to(projects::list_projects))
                )
                .service(
                    web::resource("/{slug}/")
                        .route(web::get().to(projects::project_detail))
                )
        )
        .service(
            web::scope("/contact")
                .service(
                    web::resource("/")
                        .route(web::post().to(contact::submit_contact))
                )
                .service(
                    web::resource("/submit/")
                        .route(web::post().to(contact::submit_contact))
                )
        );
}
