mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use imagen_erp::auth::session;

macro_rules! app_or_skip {
    () => {
        match common::spawn_app().await {
            Some(app) => app,
            None => return,
        }
    };
}

fn id(v: &Value) -> String {
    v["id"].as_str().unwrap().to_string()
}

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = app_or_skip!();

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Setup & Auth ────────────────────────────────────────────────

#[tokio::test]
async fn setup_only_works_once() {
    let app = app_or_skip!();

    let (body, status) = app.setup("admin@imagen.test", "password123", "Admin").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["rol"], "admin");
    assert!(body["token"].is_string());

    let (_, status) = app.setup("otro@imagen.test", "password123", "Otro").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn setup_rejects_short_password() {
    let app = app_or_skip!();

    let (_, status) = app.setup("admin@imagen.test", "short", "Admin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let app = app_or_skip!();
    app.bootstrap().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": common::ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["email"], common::ADMIN_EMAIL);

    // The cookie alone authenticates
    let session = cookie.split(';').next().unwrap();
    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .header("cookie", session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_invalid_credentials() {
    let app = app_or_skip!();
    app.bootstrap().await;

    let (body, status) = app.login(common::ADMIN_EMAIL, "wrongpassword").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Credenciales inválidas");

    let (_, status) = app.login("nadie@imagen.test", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_brute_force_is_limited() {
    let app = app_or_skip!();
    app.bootstrap().await;

    for _ in 0..5 {
        let (_, status) = app.login(common::ADMIN_EMAIL, "wrongpassword").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (_, status) = app.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    common::cleanup(app).await;
}

#[tokio::test]
async fn forgot_password_never_reveals_accounts() {
    let app = app_or_skip!();
    app.bootstrap().await;

    let (_, known) = app
        .post_public("/api/auth/forgot-password", &json!({ "email": common::ADMIN_EMAIL }))
        .await;
    let (_, unknown) = app
        .post_public("/api/auth/forgot-password", &json!({ "email": "nadie@imagen.test" }))
        .await;
    assert_eq!(known, StatusCode::OK);
    assert_eq!(unknown, StatusCode::OK);

    common::cleanup(app).await;
}

/// Wait for the spawned forgot-password task to store its token, then swap
/// the hash for one whose plaintext the test knows.
async fn known_reset_token(app: &common::TestApp, token: &str) {
    for _ in 0..100 {
        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens")
            .fetch_one(&app.pool)
            .await
            .unwrap();
        if stored > 0 {
            sqlx::query("UPDATE password_reset_tokens SET token_hash = $1")
                .bind(session::hash_token(token))
                .execute(&app.pool)
                .await
                .unwrap();
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("forgot-password never stored a reset token");
}

#[tokio::test]
async fn reset_password_is_single_use() {
    let app = app_or_skip!();
    app.bootstrap().await;

    app.post_public("/api/auth/forgot-password", &json!({ "email": common::ADMIN_EMAIL }))
        .await;
    known_reset_token(&app, "enlace-de-prueba").await;

    let (_, status) = app
        .post_public(
            "/api/auth/reset-password",
            &json!({ "token": "enlace-de-prueba", "password": "corta" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (body, status) = app
        .post_public(
            "/api/auth/reset-password",
            &json!({ "token": "enlace-de-prueba", "password": "nuevaclave123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, status) = app.login(common::ADMIN_EMAIL, "nuevaclave123").await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (err, status) = app
        .post_public(
            "/api/auth/reset-password",
            &json!({ "token": "enlace-de-prueba", "password": "otraclave123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Enlace inválido o vencido");

    common::cleanup(app).await;
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let app = app_or_skip!();
    app.bootstrap().await;

    sqlx::query(
        "INSERT INTO password_reset_tokens (usuario_id, token_hash, expires_at)
         SELECT id, $1, now() - interval '1 minute' FROM usuarios WHERE email = $2",
    )
    .bind(session::hash_token("enlace-vencido"))
    .bind(common::ADMIN_EMAIL)
    .execute(&app.pool)
    .await
    .unwrap();

    let (err, status) = app
        .post_public(
            "/api/auth/reset-password",
            &json!({ "token": "enlace-vencido", "password": "nuevaclave123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Enlace inválido o vencido");

    let (_, status) = app.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn change_password_requires_current() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (_, status) = app
        .post_auth(
            "/api/auth/change-password",
            &token,
            &json!({ "current_password": "nope", "new_password": "otraclave123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, status) = app
        .post_auth(
            "/api/auth/change-password",
            &token,
            &json!({ "current_password": common::ADMIN_PASSWORD, "new_password": "otraclave123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.login(common::ADMIN_EMAIL, "otraclave123").await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

// ── Invitations & Permissions ───────────────────────────────────

#[tokio::test]
async fn invitation_flow_assigns_role() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (inv, status) = app
        .post_auth("/api/invitaciones", &admin, &json!({ "email": "ana@imagen.test", "rol": "ventas" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(inv.get("token_hash").is_none());
    let token = inv["token"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/api/invitaciones/verificar?token={token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let verified: Value = resp.json().await.unwrap();
    assert_eq!(verified["rol"], "ventas");

    let (body, status) = app
        .post_public(
            "/api/auth/register",
            &json!({ "token": token, "nombre": "Ana", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["rol"], "ventas");

    // A used invitation cannot be replayed
    let (_, status) = app
        .post_public(
            "/api/auth/register",
            &json!({ "token": token, "nombre": "Ana", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post_auth("/api/invitaciones", &admin, &json!({ "email": "ana@imagen.test", "rol": "ventas" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn revoked_invitation_stops_verifying() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (inv, _) = app
        .post_auth("/api/invitaciones", &admin, &json!({ "email": "luis@imagen.test", "rol": "visor" }))
        .await;
    let token = inv["token"].as_str().unwrap();
    let verificar = app.url(&format!("/api/invitaciones/verificar?token={token}"));

    let resp = app.client.get(&verificar).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let path = format!("/api/invitaciones/{}", id(&inv));
    let (_, status) = app.delete_auth(&path, &admin).await;
    assert_eq!(status, StatusCode::OK);

    let resp = app.client.get(&verificar).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let (_, status) = app
        .post_public(
            "/api/auth/register",
            &json!({ "token": token, "nombre": "Luis", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only pending invitations can be revoked
    let (_, status) = app.delete_auth(&path, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn permissions_follow_role_grants() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let visor = app.create_user(&admin, "visor@imagen.test", "visor").await;

    let (mapa, status) = app.get_auth("/api/permisos", &visor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mapa["rol"], "visor");
    assert_eq!(mapa["permisos"]["contactos"]["ver"], true);
    assert_eq!(mapa["permisos"]["contactos"]["editar"], false);
    assert_eq!(mapa["permisos"]["contabilidad"]["ver"], false);

    let (_, status) = app.get_auth("/api/contactos", &visor).await;
    assert_eq!(status, StatusCode::OK);

    let nuevo = json!({ "nombre": "Cliente Uno" });
    let (body, status) = app.post_auth("/api/contactos", &visor, &nuevo).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Permiso denegado: contactos:editar");

    // Grant editar on contactos to visor; the running session picks it up
    let (roles, _) = app.get_auth("/api/roles", &admin).await;
    let visor_role = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["nombre"] == "visor")
        .unwrap()
        .clone();
    let (_, status) = app
        .put_auth(
            &format!("/api/roles/{}/permisos", id(&visor_role)),
            &admin,
            &json!({ "permisos": [{ "modulo": "contactos", "accion": "editar" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.post_auth("/api/contactos", &visor, &nuevo).await;
    assert_eq!(status, StatusCode::CREATED);

    // Inventory was not part of the new grant set
    let (_, status) = app.get_auth("/api/inventario", &visor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn admin_role_grants_cannot_be_edited() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (roles, _) = app.get_auth("/api/roles", &admin).await;
    let admin_role = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["nombre"] == "admin")
        .unwrap()
        .clone();

    let (_, status) = app
        .put_auth(
            &format!("/api/roles/{}/permisos", id(&admin_role)),
            &admin,
            &json!({ "permisos": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .delete_auth(&format!("/api/roles/{}", id(&admin_role)), &admin)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn role_in_use_cannot_be_deleted() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (rol, status) = app
        .post_auth("/api/roles", &admin, &json!({ "nombre": "taller", "descripcion": "Taller" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, status) = app
        .post_auth("/api/roles", &admin, &json!({ "nombre": "taller", "descripcion": "" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = app
        .post_auth("/api/roles", &admin, &json!({ "nombre": "Mal Nombre", "descripcion": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_user(&admin, "taller@imagen.test", "taller").await;
    let (_, status) = app.delete_auth(&format!("/api/roles/{}", id(&rol)), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn admin_cannot_lock_themselves_out() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (me, _) = app.get_auth("/api/auth/me", &admin).await;
    let path = format!("/api/usuarios/{}", id(&me));

    let (_, status) = app.put_auth(&path, &admin, &json!({ "activo": false })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app.put_auth(&path, &admin, &json!({ "rol": "visor" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn deactivated_user_loses_access() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let ventas = app.create_user(&admin, "ventas@imagen.test", "ventas").await;

    let (me, _) = app.get_auth("/api/auth/me", &ventas).await;
    let (_, status) = app
        .put_auth(&format!("/api/usuarios/{}", id(&me)), &admin, &json!({ "activo": false }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.get_auth("/api/contactos", &ventas).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, status) = app.login("ventas@imagen.test", "password123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

// ── Contacts ────────────────────────────────────────────────────

#[tokio::test]
async fn contacts_crud_and_search() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (_, status) = app.post_auth("/api/contactos", &token, &json!({ "nombre": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (c, status) = app
        .post_auth(
            "/api/contactos",
            &token,
            &json!({ "nombre": "Cervecería Andina", "tipo": "empresa", "email": "compras@andina.test" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(c["relacion"], "cliente");

    app.post_auth("/api/contactos", &token, &json!({ "nombre": "Imprenta Sur", "relacion": "proveedor" }))
        .await;

    let (page, _) = app.get_auth("/api/contactos?search=andina", &token).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["nombre"], "Cervecería Andina");

    let (page, _) = app.get_auth("/api/contactos?relacion=proveedor", &token).await;
    assert_eq!(page["total"], 1);

    let (_, status) = app.delete_auth(&format!("/api/contactos/{}", id(&c)), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app.get_auth(&format!("/api/contactos/{}", id(&c)), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

// ── Quotes ──────────────────────────────────────────────────────

#[tokio::test]
async fn quote_totals_and_transitions() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let body = json!({
        "cliente_nombre": "Cervecería Andina",
        "impuesto_pct": 13,
        "lineas": [
            { "descripcion": "Valla Av. Arce", "cantidad": 2, "meses": 3, "precio_unitario_centavos": 100_000, "descuento_pct": 10 },
            { "descripcion": "Impresión lona", "cantidad": 1, "precio_unitario_centavos": 33_333 }
        ]
    });
    let (cot, status) = app.post_auth("/api/cotizaciones", &token, &body).await;
    assert_eq!(status, StatusCode::CREATED, "{cot}");
    assert!(cot["codigo"].as_str().unwrap().starts_with("COT-"));
    assert_eq!(cot["estado"], "borrador");
    assert_eq!(cot["lineas"][0]["importe_centavos"], 540_000);
    assert_eq!(cot["subtotal_centavos"], 573_333);
    assert_eq!(cot["impuesto_centavos"], 74_533);
    assert_eq!(cot["total_centavos"], 647_866);

    let path = format!("/api/cotizaciones/{}", id(&cot));

    let (_, status) = app
        .post_auth(&format!("{path}/estado"), &token, &json!({ "estado": "aprobada" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (sent, status) = app
        .post_auth(&format!("{path}/estado"), &token, &json!({ "estado": "enviada" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["estado"], "enviada");

    let (_, status) = app.put_auth(&path, &token, &body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, status) = app.delete_auth(&path, &token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn quote_validation() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (_, status) = app
        .post_auth("/api/cotizaciones", &token, &json!({ "cliente_nombre": "X", "lineas": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post_auth(
            "/api/cotizaciones",
            &token,
            &json!({
                "cliente_nombre": "X",
                "lineas": [{ "descripcion": "a", "cantidad": 0, "precio_unitario_centavos": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (err, status) = app
        .post_auth(
            "/api/cotizaciones",
            &token,
            &json!({
                "cliente_nombre": "X",
                "lineas": [{ "descripcion": "a", "cantidad": 1000, "meses": 60, "precio_unitario_centavos": i64::MAX }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "importe demasiado grande");

    let (page, _) = app.get_auth("/api/cotizaciones", &token).await;
    assert_eq!(page["total"], 0);

    common::cleanup(app).await;
}

// ── Inventory & Rentals ─────────────────────────────────────────

#[tokio::test]
async fn inventory_validates_and_reports_area() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let soporte = app.create_soporte(&token, "V-001").await;
    assert_eq!(soporte["area_m2"], 48.0);
    assert_eq!(soporte["estado"], "disponible");

    let dup = json!({ "codigo": "V-001", "titulo": "Otra", "ancho_m": 1.0, "alto_m": 1.0 });
    let (_, status) = app.post_auth("/api/inventario", &token, &dup).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let bad = json!({ "codigo": "V-002", "titulo": "Otra", "ancho_m": 0.0, "alto_m": 1.0 });
    let (_, status) = app.post_auth("/api/inventario", &token, &bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad = json!({ "codigo": "V-002", "titulo": "Otra", "ancho_m": 1.0, "alto_m": 1.0, "latitud": 95.0 });
    let (_, status) = app.post_auth("/api/inventario", &token, &bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn rentals_cannot_overlap() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;
    let soporte = app.create_soporte(&token, "V-010").await;
    let soporte_path = format!("/api/inventario/{}", id(&soporte));

    let enero = json!({
        "soporte_id": id(&soporte),
        "fecha_inicio": "2026-01-01",
        "fecha_fin": "2026-01-31",
        "importe_centavos": 450_000
    });
    let (alq, status) = app.post_auth("/api/alquileres", &token, &enero).await;
    assert_eq!(status, StatusCode::CREATED, "{alq}");
    assert_eq!(alq["estado"], "reservado");
    assert!(alq["codigo"].as_str().unwrap().starts_with("ALQ-"));

    let (s, _) = app.get_auth(&soporte_path, &token).await;
    assert_eq!(s["estado"], "reservado");

    // Sharing the last day counts as overlap
    let choque = json!({
        "soporte_id": id(&soporte),
        "fecha_inicio": "2026-01-31",
        "fecha_fin": "2026-02-15",
        "importe_centavos": 0
    });
    let (_, status) = app.post_auth("/api/alquileres", &token, &choque).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let febrero = json!({
        "soporte_id": id(&soporte),
        "fecha_inicio": "2026-02-01",
        "fecha_fin": "2026-02-28",
        "importe_centavos": 450_000
    });
    let (feb, status) = app.post_auth("/api/alquileres", &token, &febrero).await;
    assert_eq!(status, StatusCode::CREATED);

    let alq_path = format!("/api/alquileres/{}", id(&alq));
    let (_, status) = app
        .post_auth(&format!("{alq_path}/estado"), &token, &json!({ "estado": "activo" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (s, _) = app.get_auth(&soporte_path, &token).await;
    assert_eq!(s["estado"], "ocupado");

    // Finishing January leaves February's reservation holding the face
    let (_, status) = app
        .post_auth(&format!("{alq_path}/estado"), &token, &json!({ "estado": "finalizado" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (s, _) = app.get_auth(&soporte_path, &token).await;
    assert_eq!(s["estado"], "reservado");

    let (_, status) = app
        .post_auth(&format!("{alq_path}/estado"), &token, &json!({ "estado": "activo" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let feb_path = format!("/api/alquileres/{}", id(&feb));
    let (_, status) = app.delete_auth(&feb_path, &token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = app
        .post_auth(&format!("{feb_path}/estado"), &token, &json!({ "estado": "cancelado" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (s, _) = app.get_auth(&soporte_path, &token).await;
    assert_eq!(s["estado"], "disponible");

    // A cancelled rental frees its dates
    let (_, status) = app.post_auth("/api/alquileres", &token, &febrero).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, status) = app.delete_auth(&feb_path, &token).await;
    assert_eq!(status, StatusCode::OK);

    let (page, _) = app
        .get_auth("/api/alquileres?desde=2026-01-15&hasta=2026-01-20", &token)
        .await;
    assert_eq!(page["total"], 1);

    common::cleanup(app).await;
}

#[tokio::test]
async fn rental_validation() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;
    let soporte = app.create_soporte(&token, "V-020").await;

    let (_, status) = app
        .post_auth(
            "/api/alquileres",
            &token,
            &json!({
                "soporte_id": id(&soporte),
                "fecha_inicio": "2026-03-10",
                "fecha_fin": "2026-03-01",
                "importe_centavos": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post_auth(
            "/api/alquileres",
            &token,
            &json!({
                "soporte_id": "00000000-0000-0000-0000-000000000000",
                "fecha_inicio": "2026-03-01",
                "fecha_fin": "2026-03-10",
                "importe_centavos": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn face_with_rentals_cannot_be_deleted() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;
    let soporte = app.create_soporte(&token, "V-030").await;

    app.post_auth(
        "/api/alquileres",
        &token,
        &json!({
            "soporte_id": id(&soporte),
            "fecha_inicio": "2026-04-01",
            "fecha_fin": "2026-04-30",
            "importe_centavos": 0
        }),
    )
    .await;

    let (_, status) = app
        .delete_auth(&format!("/api/inventario/{}", id(&soporte)), &token)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

// ── Materials ───────────────────────────────────────────────────

#[tokio::test]
async fn stock_adjustments_never_go_negative() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (r, status) = app
        .post_auth(
            "/api/recursos",
            &token,
            &json!({ "codigo": "LONA-13", "nombre": "Lona 13 oz", "unidad": "m2", "cantidad": 10.0, "stock_minimo": 5.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(r["bajo_stock"], false);
    let path = format!("/api/recursos/{}/ajuste", id(&r));

    let (_, status) = app
        .post_auth(&path, &token, &json!({ "delta": -11.0, "motivo": "Impresión" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = app.post_auth(&path, &token, &json!({ "delta": -2.0, "motivo": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app.post_auth(&path, &token, &json!({ "delta": 0.0, "motivo": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (r, status) = app
        .post_auth(&path, &token, &json!({ "delta": -6.0, "motivo": "Valla V-001" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(r["cantidad"], 4.0);
    assert_eq!(r["bajo_stock"], true);

    let (page, _) = app.get_auth("/api/recursos?bajo_stock=true", &token).await;
    assert_eq!(page["total"], 1);

    let (audit, _) = app.get_auth("/api/auditoria?recurso_tipo=recurso", &token).await;
    let ajuste = audit["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["accion"] == "recurso.ajuste")
        .unwrap()
        .clone();
    assert_eq!(ajuste["detalles"]["delta"], -6.0);

    common::cleanup(app).await;
}

// ── Accounting ──────────────────────────────────────────────────

#[tokio::test]
async fn voucher_approval_checks_balance() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let unbalanced = json!({
        "tipo": "ingreso",
        "fecha": "2026-05-02",
        "glosa": "Cobro alquiler V-001",
        "detalles": [
            { "cuenta": "1.1.01 Caja", "debe_centavos": 113_000 },
            { "cuenta": "4.1.01 Alquileres", "haber_centavos": 100_000 }
        ]
    });
    let (cb, status) = app.post_auth("/api/comprobantes", &token, &unbalanced).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cb["estado"], "borrador");
    assert_eq!(cb["numero"].as_str().unwrap().get(..8), Some("CB-2026-"));
    let path = format!("/api/comprobantes/{}", id(&cb));

    let (err, status) = app.post_auth(&format!("{path}/aprobar"), &token, &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Comprobante inválido");
    assert_eq!(
        err["detalles"][0],
        "Comprobante desbalanceado: debe 113000 != haber 100000"
    );

    let mut balanced = unbalanced.clone();
    balanced["detalles"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "cuenta": "2.1.05 IVA débito", "haber_centavos": 13_000 }));
    let (_, status) = app.put_auth(&path, &token, &balanced).await;
    assert_eq!(status, StatusCode::OK);

    let (ok, status) = app.post_auth(&format!("{path}/aprobar"), &token, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ok["estado"], "aprobado");
    assert!(ok["aprobado_at"].is_string());

    let (_, status) = app.put_auth(&path, &token, &balanced).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, status) = app.post_auth(&format!("{path}/aprobar"), &token, &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (anulado, status) = app.post_auth(&format!("{path}/anular"), &token, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(anulado["estado"], "anulado");
    let (_, status) = app.post_auth(&format!("{path}/anular"), &token, &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn approved_vouchers_stay_balanced_under_concurrent_edits() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let draft = |debe: i64, haber: i64| {
        json!({
            "tipo": "diario",
            "fecha": "2026-05-02",
            "glosa": "Ajuste concurrente",
            "detalles": [
                { "cuenta": "1.1.01 Caja", "debe_centavos": debe },
                { "cuenta": "4.1.01 Alquileres", "haber_centavos": haber }
            ]
        })
    };

    for _ in 0..25 {
        let (cb, status) = app.post_auth("/api/comprobantes", &token, &draft(100, 100)).await;
        assert_eq!(status, StatusCode::CREATED);
        let path = format!("/api/comprobantes/{}", id(&cb));
        let aprobar = format!("{path}/aprobar");
        let unbalanced = draft(999, 1);
        let empty = json!({});

        let ((_, approve), (_, edit)) = tokio::join!(
            app.post_auth(&aprobar, &token, &empty),
            app.put_auth(&path, &token, &unbalanced),
        );

        let (stored, _) = app.get_auth(&path, &token).await;
        if stored["estado"] == "aprobado" {
            assert_eq!(approve, StatusCode::OK);
            assert_eq!(edit, StatusCode::CONFLICT);
            assert_eq!(stored["total_debe_centavos"], stored["total_haber_centavos"]);
            let lines = stored["detalles"].as_array().unwrap();
            let debe: i64 = lines.iter().map(|l| l["debe_centavos"].as_i64().unwrap()).sum();
            let haber: i64 = lines.iter().map(|l| l["haber_centavos"].as_i64().unwrap()).sum();
            assert_eq!(debe, haber);
        } else {
            assert_eq!(stored["estado"], "borrador");
            assert_eq!(edit, StatusCode::OK);
            assert_eq!(approve, StatusCode::BAD_REQUEST);
        }
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn approval_needs_admin_action() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let visor = app.create_user(&admin, "visor@imagen.test", "visor").await;

    let (cb, _) = app
        .post_auth(
            "/api/comprobantes",
            &admin,
            &json!({ "tipo": "diario", "fecha": "2026-05-02", "glosa": "Ajuste", "detalles": [] }),
        )
        .await;

    let (_, status) = app
        .post_auth(&format!("/api/comprobantes/{}/aprobar", id(&cb)), &visor, &json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

// ── Production ──────────────────────────────────────────────────

#[tokio::test]
async fn production_order_lifecycle() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (orden, status) = app
        .post_auth(
            "/api/produccion",
            &token,
            &json!({ "tipo": "instalacion", "descripcion": "Instalar lona V-001" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(orden["estado"], "pendiente");
    assert!(orden["codigo"].as_str().unwrap().starts_with("OP-"));
    let path = format!("/api/produccion/{}", id(&orden));

    let (_, status) = app
        .post_auth(&format!("{path}/estado"), &token, &json!({ "estado": "completada" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.post_auth(&format!("{path}/estado"), &token, &json!({ "estado": "en_proceso" }))
        .await;
    let (_, status) = app.delete_auth(&path, &token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (done, status) = app
        .post_auth(&format!("{path}/estado"), &token, &json!({ "estado": "completada" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(done["completada_at"].is_string());

    let (_, status) = app
        .post_auth("/api/produccion", &token, &json!({ "tipo": "pintura", "descripcion": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Sales pipeline ──────────────────────────────────────────────

#[tokio::test]
async fn opportunity_stages_and_pipeline() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let (op, status) = app
        .post_auth(
            "/api/ventas/opportunities",
            &token,
            &json!({ "titulo": "Campaña verano", "valor_estimado_centavos": 1_000_000, "etapa": "propuesta" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(op["probabilidad"], 50);

    app.post_auth(
        "/api/ventas/opportunities",
        &token,
        &json!({ "titulo": "Pantalla LED", "valor_estimado_centavos": 200_000 }),
    )
    .await;

    let etapa = format!("/api/ventas/opportunities/{}/etapa", id(&op));
    let (_, status) = app.post_auth(&etapa, &token, &json!({ "etapa": "perdida" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (won, status) = app.post_auth(&etapa, &token, &json!({ "etapa": "ganada" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(won["probabilidad"], 100);
    assert!(won["cerrada_at"].is_string());

    let (_, status) = app.post_auth(&etapa, &token, &json!({ "etapa": "negociacion" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (pipeline, status) = app.get_auth("/api/ventas/pipeline", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pipeline["etapas"][0]["etapa"], "prospeccion");
    assert_eq!(pipeline["etapas"][0]["valor_ponderado_centavos"], 20_000);
    assert_eq!(pipeline["etapas"][4]["cantidad"], 1);
    assert_eq!(pipeline["cantidad"], 2);
    assert_eq!(pipeline["valor_total_centavos"], 1_200_000);
    assert_eq!(pipeline["valor_ponderado_centavos"], 1_020_000);

    common::cleanup(app).await;
}

#[tokio::test]
async fn closed_stages_only_come_from_stage_moves() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    for etapa in ["ganada", "perdida"] {
        let (_, status) = app
            .post_auth(
                "/api/ventas/opportunities",
                &token,
                &json!({ "titulo": "Cierre directo", "valor_estimado_centavos": 10_000, "etapa": etapa, "probabilidad": 30 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{etapa}");
    }

    let (op, _) = app
        .post_auth(
            "/api/ventas/opportunities",
            &token,
            &json!({ "titulo": "Mupis centro", "valor_estimado_centavos": 300_000 }),
        )
        .await;
    let path = format!("/api/ventas/opportunities/{}", id(&op));
    let (lost, status) = app
        .post_auth(
            &format!("{path}/etapa"),
            &token,
            &json!({ "etapa": "perdida", "motivo_perdida": "Presupuesto recortado" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lost["probabilidad"], 0);
    assert_eq!(lost["motivo_perdida"], "Presupuesto recortado");

    let (_, status) = app
        .put_auth(
            &path,
            &token,
            &json!({ "titulo": "Mupis centro", "valor_estimado_centavos": 300_000, "probabilidad": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (edited, status) = app
        .put_auth(
            &path,
            &token,
            &json!({ "titulo": "Mupis zona sur", "valor_estimado_centavos": 300_000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["titulo"], "Mupis zona sur");
    assert_eq!(edited["etapa"], "perdida");
    assert_eq!(edited["probabilidad"], 0);

    common::cleanup(app).await;
}

// ── Public forms & notifications ────────────────────────────────

#[tokio::test]
async fn contact_form_stores_message_and_notifies() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let produccion = app.create_user(&admin, "taller@imagen.test", "produccion").await;

    let (body, status) = app
        .post_public(
            "/api/form/submit",
            &json!({ "nombre": "Lucía", "email": "lucia@cliente.test", "mensaje": "Quiero una valla" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (msg, status) = app
        .get_auth(&format!("/api/mensajes/{}", body["id"].as_str().unwrap()), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["estado"], "nuevo");
    assert_eq!(msg["metadata"]["ip"], "127.0.0.1");

    let (contador, _) = app.get_auth("/api/notificaciones/contador", &admin).await;
    assert_eq!(contador["no_leidas"], 1);

    // The production role has no grant on mensajes
    let (contador, _) = app.get_auth("/api/notificaciones/contador", &produccion).await;
    assert_eq!(contador["no_leidas"], 0);

    let (lista, _) = app.get_auth("/api/notificaciones?no_leidas=true", &admin).await;
    let notif_id = id(&lista["items"][0]);

    // Someone else's notification looks missing
    let (_, status) = app
        .post_auth(&format!("/api/notificaciones/{notif_id}/leer"), &produccion, &json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (leida, status) = app
        .post_auth(&format!("/api/notificaciones/{notif_id}/leer"), &admin, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leida["leida"], true);

    let (contador, _) = app.get_auth("/api/notificaciones/contador", &admin).await;
    assert_eq!(contador["no_leidas"], 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn notifications_mark_all_and_delete() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let ventas = app.create_user(&admin, "ventas@imagen.test", "ventas").await;

    for nombre in ["Lucía", "Pedro", "Marta"] {
        let (_, status) = app
            .post_public(
                "/api/form/submit",
                &json!({ "nombre": nombre, "email": "cliente@cliente.test", "mensaje": "Hola" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (lista, _) = app.get_auth("/api/notificaciones", &admin).await;
    assert_eq!(lista["total"], 3);
    let first = id(&lista["items"][0]);
    let path = format!("/api/notificaciones/{first}");

    // Another user's notification looks missing and survives
    let (_, status) = app.delete_auth(&path, &ventas).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, status) = app.delete_auth(&path, &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app.delete_auth(&path, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (body, status) = app
        .post_auth("/api/notificaciones/leer-todas", &admin, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "actualizadas": 2 }));

    let (contador, _) = app.get_auth("/api/notificaciones/contador", &admin).await;
    assert_eq!(contador["no_leidas"], 0);

    let (body, _) = app
        .post_auth("/api/notificaciones/leer-todas", &admin, &json!({}))
        .await;
    assert_eq!(body, json!({ "actualizadas": 0 }));

    common::cleanup(app).await;
}

#[tokio::test]
async fn contact_form_accepts_urlencoded() {
    let app = app_or_skip!();
    app.bootstrap().await;

    let resp = app
        .client
        .post(app.url("/api/form/submit"))
        .form(&[("nombre", "Pedro"), ("email", "pedro@cliente.test"), ("mensaje", "Hola")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn honeypot_is_silently_dropped() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;

    let (body, status) = app
        .post_public(
            "/api/form/submit",
            &json!({ "nombre": "Bot", "email": "bot@spam.test", "mensaje": "buy", "website": "http://spam" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (page, _) = app.get_auth("/api/mensajes", &admin).await;
    assert_eq!(page["total"], 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn contact_form_rate_limited_per_ip() {
    let app = app_or_skip!();

    let form = json!({ "nombre": "Lucía", "email": "lucia@cliente.test", "mensaje": "Hola" });
    for _ in 0..5 {
        let (_, status) = app.post_public("/api/form/submit", &form).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, status) = app.post_public("/api/form/submit", &form).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Each form keeps its own budget
    let (_, status) = app
        .post_public(
            "/api/solicitudes",
            &json!({ "empresa": "Andina", "contacto": "Lucía", "email": "lucia@cliente.test" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn quote_request_gets_code() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let soporte = app.create_soporte(&admin, "V-040").await;

    let (_, status) = app
        .post_public(
            "/api/solicitudes",
            &json!({
                "empresa": "Andina",
                "contacto": "Lucía",
                "email": "lucia@cliente.test",
                "soporte_id": "00000000-0000-0000-0000-000000000000"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post_public(
            "/api/solicitudes",
            &json!({ "empresa": "Andina", "contacto": "Lucía", "email": "lucia@cliente.test", "meses": 61 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (body, status) = app
        .post_public(
            "/api/solicitudes",
            &json!({
                "empresa": "Andina",
                "contacto": "Lucía",
                "email": "lucia@cliente.test",
                "soporte_id": id(&soporte),
                "fecha_inicio": "2026-06-01",
                "meses": 3,
                "servicios": ["impresion", "instalacion"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["codigo"].as_str().unwrap().starts_with("SOL-"));

    let (page, status) = app.get_auth("/api/solicitudes", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["servicios"], json!(["impresion", "instalacion"]));

    let (updated, status) = app
        .patch_auth(
            &format!("/api/solicitudes/{}", body["id"].as_str().unwrap()),
            &admin,
            &json!({ "estado": "en_revision" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["estado"], "en_revision");

    common::cleanup(app).await;
}

#[tokio::test]
async fn public_catalogue_hides_maintenance_and_busy_prices() {
    let app = app_or_skip!();
    let token = app.bootstrap().await;

    let libre = app.create_soporte(&token, "V-050").await;
    let ocupada = app.create_soporte(&token, "V-051").await;
    let taller = app.create_soporte(&token, "V-052").await;

    let mut body = json!({
        "codigo": "V-052",
        "titulo": "Valla V-052",
        "ancho_m": 12.0,
        "alto_m": 4.0,
        "estado": "mantenimiento"
    });
    let (_, status) = app
        .put_auth(&format!("/api/inventario/{}", id(&taller)), &token, &body)
        .await;
    assert_eq!(status, StatusCode::OK);

    body["codigo"] = json!("V-051");
    body["titulo"] = json!("Valla V-051");
    body["estado"] = json!("ocupado");
    body["precio_mensual_centavos"] = json!(450_000);
    app.put_auth(&format!("/api/inventario/{}", id(&ocupada)), &token, &body)
        .await;

    let resp = app.client.get(app.url("/api/public/soportes")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 2);

    let items = page["items"].as_array().unwrap();
    let find = |codigo: &str| items.iter().find(|s| s["codigo"] == codigo).cloned();
    assert_eq!(find("V-050").unwrap()["precio_mensual_centavos"], 450_000);
    assert!(find("V-051").unwrap()["precio_mensual_centavos"].is_null());
    assert!(find("V-052").is_none());

    let resp = app
        .client
        .get(app.url(&format!("/api/public/soportes/{}", id(&taller))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .client
        .get(app.url(&format!("/api/public/soportes/{}", id(&libre))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    common::cleanup(app).await;
}

// ── Audit ───────────────────────────────────────────────────────

#[tokio::test]
async fn audit_log_records_mutations() {
    let app = app_or_skip!();
    let admin = app.bootstrap().await;
    let visor = app.create_user(&admin, "visor@imagen.test", "visor").await;

    app.post_auth("/api/contactos", &admin, &json!({ "nombre": "Cliente" })).await;

    let (page, status) = app.get_auth("/api/auditoria?recurso_tipo=contacto", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["accion"], "contacto.creado");

    let (_, status) = app.get_auth("/api/auditoria", &visor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}
