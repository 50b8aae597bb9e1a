use actix_cors::Cors;
use anyhow::Context;
use actix_web::{
    http::{header, Method},
    middleware::{NormalizePath, TrailingSlash},
    web, App, HttpServer,
};
use portfolio_site::{
    db::postgres::create_pool,
    graceful_shutdown::shutdown_signal,
    mail::mailer_from_config,
    middlewares::{auth::AuthMiddleware, session::SessionMiddleware},
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header("X-CSRFToken")
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().context("Failed to load configuration")?;

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to create database connection pool")?;

    let mailer = mailer_from_config(&config).context("Mail transport setup failed")?;

    let app_state = web::Data::new(AppState::new(&config, pool, mailer));

    let server_addr = format!("{}:{}", config.host, config.port);
    let origins = config.cors_origins();
    let secure_cookies = config.secure_cookies;

    tracing::info!(
        "Starting {} v{} on {} ({})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.env
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes)
            .wrap(AuthMiddleware)
            .wrap(SessionMiddleware::new(secure_cookies))
            .wrap(build_cors(&origins))
            .wrap(TracingLogger::default())
            .wrap(NormalizePath::new(TrailingSlash::Always))
    })
    .workers(config.worker_count)
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run();

    tokio::select! {
        res = server => res.context("Server terminated with an error"),
        _ = shutdown_signal() => Ok(()),
    }
}
