#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use imagen_erp::config::Config;

pub const ADMIN_EMAIL: &str = "admin@imagen.test";
pub const ADMIN_PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    base_url: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create the first admin through `/api/auth/setup`.
    pub async fn setup(&self, email: &str, password: &str, nombre: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/setup"))
            .json(&json!({ "email": email, "password": password, "nombre": nombre }))
            .send()
            .await
            .expect("setup request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Set up the admin account and return its session token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.setup(ADMIN_EMAIL, ADMIN_PASSWORD, "Admin").await;
        assert_eq!(status, StatusCode::CREATED, "bootstrap setup failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Invite `email` with `rol`, accept the invitation and return the new
    /// user's token. SMTP is off in tests, so the invite answers the token.
    pub async fn create_user(&self, admin_token: &str, email: &str, rol: &str) -> String {
        let (inv, status) = self
            .post_auth("/api/invitaciones", admin_token, &json!({ "email": email, "rol": rol }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "invite failed: {inv}");
        let invite_token = inv["token"].as_str().unwrap();

        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "token": invite_token, "nombre": email, "password": "password123" }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn patch_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Unauthenticated JSON POST, as the public site sends it.
    pub async fn post_public(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("public post failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Create a billboard face and return it.
    pub async fn create_soporte(&self, token: &str, codigo: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/inventario",
                token,
                &json!({
                    "codigo": codigo,
                    "titulo": format!("Valla {codigo}"),
                    "tipo": "valla",
                    "ciudad": "La Paz",
                    "ancho_m": 12.0,
                    "alto_m": 4.0,
                    "precio_mensual_centavos": 450_000,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create soporte failed: {body}");
        body
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database. `None` when
/// `DATABASE_URL` is not set, so the suite is skipped.
pub async fn spawn_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping end-to-end test");
        return None;
    };

    let db_name = format!("imagen_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:0".to_string(),
        log_level: "warn".to_string(),
        max_body_size: 1_048_576,
        trusted_proxies: vec![],
        cookie_secure: false,
        cors_origins: vec![],
        form_rate_limit: 5,
        form_rate_window_secs: 600,
        smtp: None,
    };

    let (app, _state) = imagen_erp::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    Some(TestApp {
        addr,
        pool,
        client,
        db_name,
        base_url,
    })
}

/// Drop the test database after the test.
pub async fn cleanup(app: TestApp) {
    let TestApp { pool, db_name, base_url, .. } = app;
    pool.close().await;

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
