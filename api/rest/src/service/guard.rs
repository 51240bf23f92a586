use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::{
    context::ApiRestCtx,
    guard::{evaluate, resolve_session, AuthSession, RouteAccess},
    model::{
        guard::{GuardReqQuery, GuardResJson},
        Response,
    },
};

pub fn guard_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/guard", web::get().to(guard));
}

async fn guard(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    query: web::Query<GuardReqQuery>,
) -> HttpResponse {
    let session = match resolve_session(&ctx, &auth).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };
    let guard_session = session.as_ref().map(AuthSession::guard_session);

    let decision = evaluate(&RouteAccess::of_path(query.path()), guard_session.as_ref());

    Response::data(
        &StatusCode::OK,
        &None,
        &GuardResJson::new(decision.redirect_to()),
    )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::profile::{ProfileDao, Role};
    use fb_token_jwt::kind::JwtTokenKind;
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp};

    fn guard_req(path: &str, token: Option<&str>) -> test::TestRequest {
        let req = test::TestRequest::get().uri(&format!("/api/rest/guard?path={path}"));
        match token {
            Some(token) => req.insert_header(("Authorization", format!("Bearer {token}"))),
            None => req,
        }
    }

    #[actix_web::test]
    async fn guard_decisions() {
        let app = TestApp::new().await;
        let (user, user_token) = app.profile("user@example.com", &Role::User).await;
        let (admin, admin_token) = app.profile("admin@example.com", &Role::Admin).await;
        let admin_session_token = app.token(admin.id(), &JwtTokenKind::AdminSession);
        let user_session_token = app.token(user.id(), &JwtTokenKind::AdminSession);
        let garbage_token = "garbage".to_owned();
        let service = init_app!(app);

        let cases = [
            ("/fund-project", None, json!({"allow": true, "redirect_to": null})),
            ("/dashboard", None, json!({"allow": false, "redirect_to": "/login"})),
            ("/somewhere-else", None, json!({"allow": false, "redirect_to": "/login"})),
            ("/dashboard", Some(&user_token), json!({"allow": true, "redirect_to": null})),
            ("/admin/dashboard", Some(&user_token), json!({"allow": false, "redirect_to": "/"})),
            (
                "/admin/dashboard",
                Some(&user_session_token),
                json!({"allow": false, "redirect_to": "/"}),
            ),
            (
                "/admin/dashboard",
                Some(&admin_token),
                json!({"allow": false, "redirect_to": "/admin/login"}),
            ),
            (
                "/admin/dashboard",
                Some(&admin_session_token),
                json!({"allow": true, "redirect_to": null}),
            ),
            (
                "/dashboard",
                Some(&garbage_token),
                json!({"allow": false, "redirect_to": "/login"}),
            ),
        ];

        for (path, token, expected) in cases {
            let req = guard_req(path, token.map(String::as_str)).to_request();
            let body: Value = test::call_and_read_body_json(&service, req).await;
            assert_eq!(body["data"], expected, "path {path}");
        }
    }

    #[actix_web::test]
    async fn role_is_read_from_the_store_on_every_request() {
        let app = TestApp::new().await;
        let (admin, _) = app.profile("admin@example.com", &Role::Admin).await;
        let admin_session_token = app.token(admin.id(), &JwtTokenKind::AdminSession);
        let service = init_app!(app);

        let req = test::TestRequest::get()
            .uri("/api/rest/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {admin_session_token}")))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let mut demoted = ProfileDao::db_select(app.db(), admin.id())
            .await
            .unwrap()
            .unwrap();
        demoted.set_role(&Role::User);
        demoted.db_update(app.db()).await.unwrap();

        let req = test::TestRequest::get()
            .uri("/api/rest/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {admin_session_token}")))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = guard_req("/admin/dashboard", Some(&admin_session_token)).to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["redirect_to"], "/");
    }

    #[actix_web::test]
    async fn protected_handlers_map_redirects_to_statuses() {
        let app = TestApp::new().await;
        let (_, user_token) = app.profile("user@example.com", &Role::User).await;
        let service = init_app!(app);

        let req = test::TestRequest::get().uri("/api/rest/dashboard").to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"]["status"], "Unauthorized");

        let req = test::TestRequest::get()
            .uri("/api/rest/profiles")
            .insert_header(("Authorization", format!("Bearer {user_token}")))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
