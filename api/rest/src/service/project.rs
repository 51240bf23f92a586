use std::str::FromStr;

use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::{
    profile::ProfileDao,
    project::{ProjectDao, ProjectStatus},
    subscription_plan::SubscriptionPlanDao,
    user_subscription::UserSubscriptionDao,
};
use fb_error::Error;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, resolve_session, RouteAccess},
    model::{
        project::{
            DeleteProjectResJson, InsertOneProjectReqJson, ProjectReqPath, ProjectResJson,
            UpdateOneProjectReqJson, UpdateProjectStatusReqJson,
        },
        PaginationRes, Response,
    },
};

pub fn project_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/project", web::post().to(insert_one))
        .route("/project/{project_id}", web::get().to(find_one))
        .route("/project/{project_id}", web::patch().to(update_one))
        .route("/project/{project_id}", web::delete().to(delete_one))
        .route("/project/{project_id}/status", web::patch().to(update_status))
        .route("/projects", web::get().to(find_many_approved))
        .route("/projects/mine", web::get().to(find_many_mine));
}

async fn insert_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    data: web::Json<InsertOneProjectReqJson>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let db = ctx.dao().db();
    let user_id = session.profile().id();

    let subscription_data = match UserSubscriptionDao::db_select_active_by_user_id(db, user_id)
        .await
    {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Response::error(&Error::Forbidden(
                "An active subscription is required to submit a project".to_owned(),
            ))
        }
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let plan_data = match SubscriptionPlanDao::db_select(db, subscription_data.plan_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Response::error(&Error::Forbidden(
                "The subscribed plan no longer exists".to_owned(),
            ))
        }
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let project_count = match ProjectDao::db_count_by_user_id(db, user_id).await {
        Ok(count) => count,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if !plan_data.allows_another_project(&project_count) {
        return Response::error(&Error::Forbidden(format!(
            "The {} plan allows at most {} projects",
            plan_data.name(),
            plan_data.max_projects().unwrap_or_default()
        )));
    }

    let project_data = ProjectDao::new(
        user_id,
        data.title(),
        data.description(),
        data.target_amount(),
        data.duration_months(),
    );
    if let Err(err) = project_data.db_insert(db).await {
        return Response::error(&Error::internal(err));
    }

    let project = ProjectResJson::from_dao(&project_data, ctx.payment().currency());
    if let Err(err) = ctx.websocket().broadcaster().project_inserted(&project) {
        fb_log::warn(
            None,
            format!("[ApiRestServer] Failed to broadcast new project: {err}"),
        );
    }

    Response::data(&StatusCode::CREATED, &None, &project)
}

async fn find_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    let project_data = match ProjectDao::db_select(ctx.dao().db(), path.project_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if !project_data.status().is_public() {
        let session = match resolve_session(&ctx, &auth).await {
            Ok(session) => session,
            Err(err) => return Response::error(&err),
        };
        let visible = session.is_some_and(|session| {
            session.profile().id() == project_data.user_id() || session.profile().is_admin()
        });
        if !visible {
            return Response::error(&Error::NotFound("Project not found".to_owned()));
        }
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &ProjectResJson::from_dao(&project_data, ctx.payment().currency()),
    )
}

async fn update_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
    data: web::Json<UpdateOneProjectReqJson>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let mut project_data = match ProjectDao::db_select(ctx.dao().db(), path.project_id()).await {
        Ok(Some(data)) if data.user_id() == session.profile().id() => data,
        Ok(_) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if *project_data.status() != ProjectStatus::Pending {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            "Only pending projects can be edited",
        );
    }

    if let Some(title) = data.title() {
        project_data.set_title(title);
    }
    if let Some(description) = data.description() {
        project_data.set_description(description);
    }
    match project_data.db_update(ctx.dao().db()).await {
        Ok(true) => (),
        Ok(false) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                "Only pending projects can be edited",
            )
        }
        Err(err) => return Response::error(&Error::internal(err)),
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &ProjectResJson::from_dao(&project_data, ctx.payment().currency()),
    )
}

async fn delete_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let project_data = match ProjectDao::db_select(ctx.dao().db(), path.project_id()).await {
        Ok(Some(data))
            if data.user_id() == session.profile().id() || session.profile().is_admin() =>
        {
            data
        }
        Ok(_) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if !session.profile().is_admin() && *project_data.status() != ProjectStatus::Pending {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            "Only pending projects can be deleted",
        );
    }

    match ProjectDao::db_delete(ctx.dao().db(), project_data.id()).await {
        Ok(true) => (),
        Ok(false) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                "Projects with funding records can't be deleted",
            )
        }
        Err(err) => return Response::error(&Error::internal(err)),
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &DeleteProjectResJson::new(project_data.id()),
    )
}

async fn update_status(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
    data: web::Json<UpdateProjectStatusReqJson>,
) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    let status = match ProjectStatus::from_str(data.status()) {
        Ok(status) => status,
        Err(_) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                &format!("Unknown project status '{}'", data.status()),
            )
        }
    };

    let db = ctx.dao().db();
    let mut project_data = match ProjectDao::db_select(db, path.project_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let from = *project_data.status();
    if !from.can_review_to(&status) {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            &format!("Can't change project status from {from} to {status}"),
        );
    }

    match project_data.db_review(db, &status).await {
        Ok(true) => (),
        Ok(false) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                "Project status was changed by another request",
            )
        }
        Err(err) => return Response::error(&Error::internal(err)),
    }

    fb_log::info(
        None,
        format!(
            "[ApiRestServer] Project {} reviewed: {from} -> {status}",
            project_data.id()
        ),
    );

    let project = ProjectResJson::from_dao(&project_data, ctx.payment().currency());
    if let Err(err) = ctx.websocket().broadcaster().project_updated(&project) {
        fb_log::warn(
            None,
            format!("[ApiRestServer] Failed to broadcast project update: {err}"),
        );
    }

    if ctx.mailer().is_some() {
        match ProfileDao::db_select(db, project_data.user_id()).await {
            Ok(Some(owner)) => ctx.notify(
                owner.email(),
                &format!("Your project has been {status}"),
                &format!(
                    "Hello {},\n\nYour project \"{}\" has been {status}.",
                    owner.full_name(),
                    project_data.title()
                ),
            ),
            Ok(None) => (),
            Err(err) => fb_log::warn(
                None,
                format!("[ApiRestServer] Failed to load project owner: {err}"),
            ),
        }
    }

    Response::data(&StatusCode::OK, &None, &project)
}

async fn find_many_approved(ctx: web::Data<ApiRestCtx>) -> HttpResponse {
    match ProjectDao::db_select_many_by_status(ctx.dao().db(), &ProjectStatus::Approved).await {
        Ok(projects_data) => projects_res(&ctx, &projects_data),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn find_many_mine(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    match ProjectDao::db_select_many_by_user_id(ctx.dao().db(), session.profile().id()).await {
        Ok(projects_data) => projects_res(&ctx, &projects_data),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

fn projects_res(ctx: &ApiRestCtx, projects_data: &[ProjectDao]) -> HttpResponse {
    let total = projects_data.len();
    Response::data(
        &StatusCode::OK,
        &Some(PaginationRes::new(&total, &total)),
        &projects_data
            .iter()
            .map(|data| ProjectResJson::from_dao(data, ctx.payment().currency()))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::profile::Role;
    use fb_token_jwt::kind::JwtTokenKind;
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp};

    fn project_json(title: &str) -> Value {
        json!({
            "title": title,
            "description": "Community solar panels for the market square",
            "target_amount": 10000,
            "duration_months": 6,
        })
    }

    #[actix_web::test]
    async fn submission_limit_follows_the_plan() {
        let app = TestApp::new().await;
        let (user, token) = app.profile("owner@example.com", &Role::User).await;
        let plan = app.plan("Basic", &5000, &Some(2)).await;
        let service = init_app!(app);

        let submit = |title: &str| {
            test::TestRequest::post()
                .uri("/api/rest/project")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(project_json(title))
                .to_request()
        };

        let res = test::call_service(&service, submit("Solar kiosk")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        app.subscribe(user.id(), plan.id()).await;

        for title in ["Solar kiosk", "Water well"] {
            let res = test::call_service(&service, submit(title)).await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["data"]["status"], "pending");
            assert_eq!(body["data"]["current_amount"], 0);
        }

        let res = test::call_service(&service, submit("Bakery oven")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = test::call_service(&service, submit("Oven")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unlimited_plans_never_block_submission() {
        let app = TestApp::new().await;
        let (user, token) = app.profile("owner@example.com", &Role::User).await;
        let plan = app.plan("Enterprise", &50000, &None).await;
        app.subscribe(user.id(), plan.id()).await;
        let service = init_app!(app);

        for n in 0..4 {
            let req = test::TestRequest::post()
                .uri("/api/rest/project")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(project_json(&format!("Project number {n}")))
                .to_request();
            let res = test::call_service(&service, req).await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }
    }

    #[actix_web::test]
    async fn review_only_moves_pending_projects() {
        let app = TestApp::new().await;
        let (owner, owner_token) = app.profile("owner@example.com", &Role::User).await;
        let (_, other_token) = app.profile("other@example.com", &Role::User).await;
        let (admin, _) = app.profile("admin@example.com", &Role::Admin).await;
        let admin_token = app.token(admin.id(), &JwtTokenKind::AdminSession);
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        app.subscribe(owner.id(), plan.id()).await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/rest/project")
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .set_json(project_json("Solar kiosk"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        let project_id = body["data"]["id"].as_str().unwrap().to_owned();

        let get = |token: Option<&str>| {
            let req = test::TestRequest::get().uri(&format!("/api/rest/project/{project_id}"));
            let req = match token {
                Some(token) => req.insert_header(("Authorization", format!("Bearer {token}"))),
                None => req,
            };
            req.to_request()
        };
        let review = |token: &str, status: &str| {
            test::TestRequest::patch()
                .uri(&format!("/api/rest/project/{project_id}/status"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({"status": status}))
                .to_request()
        };

        let res = test::call_service(&service, get(None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = test::call_service(&service, get(Some(&other_token))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = test::call_service(&service, get(Some(&owner_token))).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(&service, review(&owner_token, "approved")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let res = test::call_service(&service, review(&admin_token, "funded")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = test::call_service(&service, review(&admin_token, "archived")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(&service, review(&admin_token, "approved")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["status"], "approved");

        let res = test::call_service(&service, review(&admin_token, "rejected")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(&service, get(None)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/rest/projects").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["id"], project_id.as_str());
    }

    #[actix_web::test]
    async fn text_limits_apply_after_trimming() {
        let app = TestApp::new().await;
        let (owner, token) = app.profile("owner@example.com", &Role::User).await;
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        app.subscribe(owner.id(), plan.id()).await;
        let service = init_app!(app);

        let submit = |body: Value| {
            test::TestRequest::post()
                .uri("/api/rest/project")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(body)
                .to_request()
        };

        let mut padded = project_json("    ab    ");
        let res = test::call_service(&service, submit(padded.clone())).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        padded["title"] = json!("  Solar kiosk  ");
        padded["description"] = json!("x                    ");
        let res = test::call_service(&service, submit(padded.clone())).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        padded["description"] = json!("  Community solar panels for the market square\n");
        let res = test::call_service(&service, submit(padded)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["title"], "Solar kiosk");
        assert_eq!(
            body["data"]["description"],
            "Community solar panels for the market square"
        );
        let project_id = body["data"]["id"].as_str().unwrap().to_owned();

        let edit = |body: Value| {
            test::TestRequest::patch()
                .uri(&format!("/api/rest/project/{project_id}"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(body)
                .to_request()
        };

        let res = test::call_service(&service, edit(json!({"title": "    ab    "}))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = test::call_service(
            &service,
            edit(json!({"description": "x                    "})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value =
            test::call_and_read_body_json(&service, edit(json!({"title": " Solar kiosk v2 "})))
                .await;
        assert_eq!(body["data"]["title"], "Solar kiosk v2");
    }

    #[actix_web::test]
    async fn projects_with_fundings_are_kept() {
        let app = TestApp::new().await;
        let (owner, owner_token) = app.profile("owner@example.com", &Role::User).await;
        let (_, funder_token) = app.profile("funder@example.com", &Role::User).await;
        let (admin, _) = app.profile("admin@example.com", &Role::Admin).await;
        let admin_token = app.token(admin.id(), &JwtTokenKind::AdminSession);
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        app.subscribe(owner.id(), plan.id()).await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/rest/project")
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .set_json(project_json("Solar kiosk"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        let project_id = body["data"]["id"].as_str().unwrap().to_owned();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/rest/project/{project_id}/status"))
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({"status": "approved"}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/rest/project/{project_id}/fund"))
            .insert_header(("Authorization", format!("Bearer {funder_token}")))
            .set_json(json!({"amount": 2500}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/rest/project/{project_id}"))
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/rest/project/{project_id}"))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn only_pending_projects_are_edited_by_their_owner() {
        let app = TestApp::new().await;
        let (owner, owner_token) = app.profile("owner@example.com", &Role::User).await;
        let (_, other_token) = app.profile("other@example.com", &Role::User).await;
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        app.subscribe(owner.id(), plan.id()).await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/rest/project")
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .set_json(project_json("Solar kiosk"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        let project_id = body["data"]["id"].as_str().unwrap().to_owned();

        let edit = |token: &str| {
            test::TestRequest::patch()
                .uri(&format!("/api/rest/project/{project_id}"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({"title": "Solar kiosk v2"}))
                .to_request()
        };

        let res = test::call_service(&service, edit(&other_token)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::call_and_read_body_json(&service, edit(&owner_token)).await;
        assert_eq!(body["data"]["title"], "Solar kiosk v2");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/rest/project/{project_id}"))
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/rest/projects/mine")
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"], json!([]));
    }
}
