use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::profile::{ProfileDao, Role};
use fb_error::Error;
use fb_token_jwt::kind::JwtTokenKind;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        auth::{AdminSessionReqJson, AuthTokenResJson, PasswordBasedReqJson, RegisterReqJson},
        Response,
    },
};

pub fn auth_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/token", web::get().to(token))
        .route("/auth/register", web::post().to(register))
        .route("/auth/password-based", web::post().to(password_based))
        .route("/auth/admin", web::post().to(admin_session));
}

async fn token(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let jwt = ctx.token().jwt();
    let token = match jwt.need_renew(session.claim()) {
        Ok(true) => match jwt.renew(session.claim()) {
            Ok(token) => token,
            Err(err) => return Response::error(&Error::internal(err)),
        },
        Ok(false) => match &auth {
            Some(auth) => auth.token().to_owned(),
            None => return Response::error(&Error::Unauthorized("Login required".to_owned())),
        },
        Err(err) => return Response::error(&Error::internal(err)),
    };

    Response::data(&StatusCode::OK, &None, &AuthTokenResJson::new(&token))
}

async fn register(ctx: web::Data<ApiRestCtx>, data: web::Json<RegisterReqJson>) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    match ProfileDao::db_select_by_email(ctx.dao().db(), data.email()).await {
        Ok(Some(_)) => {
            return Response::error_raw(&StatusCode::BAD_REQUEST, "Account has been registered")
        }
        Ok(None) => (),
        Err(err) => return Response::error(&Error::internal(err)),
    }

    let password_hash = match ctx.hash().argon2().hash_password(data.password()) {
        Ok(hash) => hash,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let profile_data = ProfileDao::new(
        data.email(),
        &password_hash,
        data.full_name(),
        &Role::User,
    );
    if let Err(err) = profile_data.db_insert(ctx.dao().db()).await {
        return Response::error(&Error::internal(err));
    }

    match ctx.token().jwt().encode(profile_data.id(), &JwtTokenKind::User) {
        Ok(token) => Response::data(&StatusCode::CREATED, &None, &AuthTokenResJson::new(&token)),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn password_based(
    ctx: web::Data<ApiRestCtx>,
    data: web::Json<PasswordBasedReqJson>,
) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let profile_data = match ProfileDao::db_select_by_email(ctx.dao().db(), data.email()).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Response::error_raw(&StatusCode::BAD_REQUEST, "Wrong email or password")
        }
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if !ctx
        .hash()
        .argon2()
        .verify_password(data.password(), profile_data.password_hash())
    {
        return Response::error_raw(&StatusCode::BAD_REQUEST, "Wrong email or password");
    }

    match ctx.token().jwt().encode(profile_data.id(), &JwtTokenKind::User) {
        Ok(token) => Response::data(&StatusCode::OK, &None, &AuthTokenResJson::new(&token)),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn admin_session(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    data: web::Json<AdminSessionReqJson>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if !session.profile().is_admin() {
        return Response::error_raw(&StatusCode::FORBIDDEN, "Access denied: admin role required");
    }

    if ctx.admin_password().is_empty() {
        return Response::error_raw(&StatusCode::FORBIDDEN, "Admin login is not configured");
    }

    if !admin_password_matches(data.password(), ctx.admin_password()) {
        return Response::error_raw(&StatusCode::BAD_REQUEST, "Wrong admin password");
    }

    match ctx
        .token()
        .jwt()
        .encode(session.profile().id(), &JwtTokenKind::AdminSession)
    {
        Ok(token) => Response::data(&StatusCode::OK, &None, &AuthTokenResJson::new(&token)),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

/// Compares SHA-256 digests in constant time so neither the content nor the
/// length of the configured password leaks through timing.
fn admin_password_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::profile::{ProfileDao, Role};
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp, ADMIN_PASSWORD};

    use super::admin_password_matches;

    #[actix_web::test]
    async fn admin_password_comparison() {
        assert!(admin_password_matches(ADMIN_PASSWORD, ADMIN_PASSWORD));
        assert!(!admin_password_matches("admin-secreT", ADMIN_PASSWORD));
        assert!(!admin_password_matches("admin", ADMIN_PASSWORD));
        assert!(!admin_password_matches("", ADMIN_PASSWORD));
    }

    #[actix_web::test]
    async fn register_then_log_in() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/rest/auth/register")
            .set_json(json!({
                "email": "new@example.com",
                "password": "password123",
                "full_name": "New Funder",
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let profile = ProfileDao::db_select_by_email(app.db(), "new@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.role(), &Role::User);

        let req = test::TestRequest::post()
            .uri("/api/rest/auth/register")
            .set_json(json!({
                "email": "new@example.com",
                "password": "password123",
                "full_name": "Someone Else",
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/rest/auth/password-based")
            .set_json(json!({"email": "new@example.com", "password": "password123"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert!(body["data"]["token"].is_string());

        let req = test::TestRequest::post()
            .uri("/api/rest/auth/password-based")
            .set_json(json!({"email": "new@example.com", "password": "wrong-password"}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn admin_session_requires_role_and_password() {
        let app = TestApp::new().await;
        let (_, user_token) = app.profile("user@example.com", &Role::User).await;
        let (_, admin_token) = app.profile("admin@example.com", &Role::Admin).await;
        let service = init_app!(app);

        let admin_req = |token: &str, password: &str| {
            test::TestRequest::post()
                .uri("/api/rest/auth/admin")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({"password": password}))
                .to_request()
        };

        let res = test::call_service(&service, admin_req(&user_token, ADMIN_PASSWORD)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = test::call_service(&service, admin_req(&admin_token, "nope")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value =
            test::call_and_read_body_json(&service, admin_req(&admin_token, ADMIN_PASSWORD)).await;
        let token = body["data"]["token"].as_str().unwrap();
        let claim = app.ctx.token().jwt().decode(token).unwrap();
        assert!(claim.is_admin_session());
    }
}
