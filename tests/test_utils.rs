#![allow(dead_code)]

use actix_web::{
    middleware::{NormalizePath, TrailingSlash},
    web, App, HttpServer,
};
use async_trait::async_trait;
use portfolio_site::{
    auth::password::hash_password,
    db::postgres::create_pool,
    entities::{token::AuthResponse, user::LoginUser},
    errors::MailError,
    mail::{Mailer, OutgoingMail},
    middlewares::{auth::AuthMiddleware, session::SessionMiddleware},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::{Client, RequestBuilder};
use sqlx::PgPool;
use std::{
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub client: Client,
    pub config: AppConfig,
}

/// Keeps every mail instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".into()))
    }
}

/// Anonymous browser session: the cookies the session middleware would
/// have issued.
pub struct Visitor {
    pub id: Uuid,
    pub csrf: String,
}

impl Visitor {
    pub fn new() -> Self {
        Visitor {
            id: Uuid::new_v4(),
            csrf: Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn cookie_header(&self) -> String {
        format!("visitor_id={}; csrftoken={}", self.id, self.csrf)
    }
}

impl TestApp {
    /// Starts the site on a random port. Returns `None` when
    /// `TEST_DATABASE_URL` is not set so that the suite can run without a
    /// database.
    pub async fn spawn(mailer: Arc<dyn Mailer>) -> Option<Self> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping integration test");
            return None;
        };

        let config = test_config(database_url);

        let db_pool = create_pool(&config.database_url, config.database_max_connections)
            .await
            .expect("Failed to create test DB pool");

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = web::Data::new(AppState::new(&config, db_pool.clone(), mailer));

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(configure_routes)
                .wrap(AuthMiddleware)
                .wrap(SessionMiddleware::new(false))
                .wrap(NormalizePath::new(TrailingSlash::Always))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health/", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Some(Self {
            address,
            db_pool,
            client,
            config,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST from a site page, with the session cookies and CSRF header set.
    pub fn site_post(&self, visitor: &Visitor, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Cookie", visitor.cookie_header())
            .header("X-CSRFToken", &visitor.csrf)
    }

    pub fn site_get(&self, visitor: &Visitor, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Cookie", visitor.cookie_header())
    }

    /// Inserts a post with a unique slug and returns `(id, slug)`.
    pub async fn seed_post(&self, published: bool) -> (Uuid, String) {
        let slug = format!("post-{}", Uuid::new_v4().simple());
        let status = if published { "published" } else { "draft" };

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO blogs (title, slug, content, status, published_at)
            VALUES ($1, $2, $3, $4::blog_status, CASE WHEN $4 = 'published' THEN NOW() END)
            RETURNING id
            "#,
        )
        .bind(format!("Post {}", slug))
        .bind(&slug)
        .bind("Some **markdown** content for the post.")
        .bind(status)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to seed blog post");

        (id, slug)
    }

    pub async fn blog_counters(&self, id: &Uuid) -> (i64, i64) {
        sqlx::query_as("SELECT views, likes_count FROM blogs WHERE id = $1")
            .bind(id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to read blog counters")
    }

    pub async fn comment_count(&self, blog_id: &Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE blog_id = $1")
            .bind(blog_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count comments")
    }

    pub async fn messages_from(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE email = $1")
            .bind(email)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count messages")
    }
}

#[async_trait]
pub trait AuthTestHelpers: Send + Sync {
    async fn insert_user(&self, is_admin: bool) -> LoginUser;
    async fn login_user(&self, credentials: &LoginUser) -> AuthResponse;
}

#[async_trait]
impl AuthTestHelpers for TestApp {
    async fn insert_user(&self, is_admin: bool) -> LoginUser {
        let tag = Uuid::new_v4().simple().to_string();
        let email = format!("user-{}@example.com", tag);
        let password = "ValidPass123!";
        let password_hash = hash_password(password).expect("Failed to hash password");

        sqlx::query(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash, is_admin)
            VALUES ($1, $2, 'Ada', 'Lovelace', $3, $4)
            "#,
        )
        .bind(&email)
        .bind(format!("user-{}", tag))
        .bind(password_hash)
        .bind(is_admin)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert user");

        LoginUser {
            email,
            password: password.into(),
        }
    }

    async fn login_user(&self, credentials: &LoginUser) -> AuthResponse {
        let response = self.client
            .post(self.url("/api/v1/auth/login/"))
            .json(credentials)
            .send()
            .await
            .expect("Failed to login user");

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            panic!("Login failed: ({}): {}", status, body);
        }

        response.json().await.expect("Failed to parse login response")
    }
}

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url,
        database_max_connections: 5,
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        jwt_expiration_minutes: 5,
        refresh_token_secret: "test_refresh_secret_that_is_long_enough_1234567890".into(),
        refresh_token_exp_days: 1,
        contact_email: "owner@example.com".into(),
        default_from_email: "noreply@example.com".into(),
        mail_api_url: None,
        mail_api_key: None,
        mail_timeout_secs: 2,
        send_confirmation_copy: false,
        static_url: "/static/".into(),
        secure_cookies: false,
    }
}
