//! Router checks that never reach the database: auth rejection, input
//! validation, public form intake and response headers.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use imagen_erp::config::Config;

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused@127.0.0.1:1/unused".to_string(),
        jwt_secret: "router-test-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost".to_string(),
        log_level: "warn".to_string(),
        max_body_size: 4096,
        trusted_proxies: vec![],
        cookie_secure: false,
        cors_origins: vec![],
        form_rate_limit: 2,
        form_rate_window_secs: 600,
        smtp: None,
    }
}

fn app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    imagen_erp::build_app(pool, config).0
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn health_sets_security_headers() {
    let resp = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let h = resp.headers();
    assert_eq!(h["x-content-type-options"], "nosniff");
    assert_eq!(h["x-frame-options"], "DENY");
    assert_eq!(h["referrer-policy"], "strict-origin-when-cross-origin");
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    for uri in ["/api/contactos", "/api/auth/me", "/api/notificaciones/contador", "/api/permisos"] {
        let resp = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body_json(resp).await["error"], "No autenticado");
    }
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let req = Request::get("/api/contactos")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "Sesión inválida o expirada");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let req = json_request(
        Method::POST,
        "/api/auth/login",
        &json!({ "email": "  ", "password": "" }),
    );
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_form_lists_missing_fields() {
    let req = json_request(Method::POST, "/api/form/submit", &json!({ "telefono": "700" }));
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Faltan campos requeridos");
    assert_eq!(
        body["detalles"],
        json!(["nombre es requerido", "email es requerido", "mensaje es requerido"])
    );
}

#[tokio::test]
async fn contact_form_rejects_bad_email() {
    let req = json_request(
        Method::POST,
        "/api/form/submit",
        &json!({ "nombre": "Ana", "email": "no-es-email", "mensaje": "Hola" }),
    );
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn honeypot_answers_success_without_storing() {
    let req = json_request(
        Method::POST,
        "/api/form/submit",
        &json!({ "nombre": "Bot", "email": "bot@spam.test", "mensaje": "x", "website": "http://spam" }),
    );
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "success": true }));
}

#[tokio::test]
async fn form_rate_limit_applies_before_validation() {
    let app = app();
    let spam = json!({ "website": "x" });

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/form/submit", &spam))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/form/submit", &spam))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn quote_request_validates_before_lookups() {
    let req = json_request(
        Method::POST,
        "/api/solicitudes",
        &json!({ "empresa": "Andina", "contacto": "Lucía", "email": "l@andina.test", "soporte_id": "abc" }),
    );
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "soporte_id inválido");
}

#[tokio::test]
async fn public_forms_answer_cors_preflight() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/form/submit")
        .header(header::ORIGIN, "https://imagen.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let big = "x".repeat(8192);
    let body = json!({ "nombre": "Ana", "email": "ana@x.test", "mensaje": big }).to_string();
    let req = Request::post("/api/form/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
