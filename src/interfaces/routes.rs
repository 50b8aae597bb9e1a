use actix_web::web;

use crate::handlers::{pages, system};

mod admin;
mod auth;
mod blog;
mod json_error;
mod site;
mod users;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health/").route(web::get().to(system::health_check)));

    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(admin::config_routes)
            .configure(users::config_routes)
    );

    cfg.configure(site::config_routes);
    cfg.configure(blog::config_routes);
    cfg.configure(json_error::config_routes);

    cfg.default_service(web::to(pages::not_found));
}
