use std::str::FromStr;

use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::{
    project::{ProjectDao, ProjectStatus},
    project_funding::{FundingStatus, ProjectFundingDao},
};
use fb_error::Error;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        funding::{
            FundingReqPath, FundingResJson, InsertOneFundingReqJson, UpdateFundingStatusReqJson,
        },
        project::{ProjectReqPath, ProjectResJson},
        PaginationRes, Response,
    },
};

pub fn funding_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/project/{project_id}/fund", web::post().to(insert_one))
        .route(
            "/project/{project_id}/fundings",
            web::get().to(find_many_by_project),
        )
        .route("/fundings/mine", web::get().to(find_many_mine))
        .route("/funding/{funding_id}/status", web::patch().to(update_status));
}

async fn insert_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
    data: web::Json<InsertOneFundingReqJson>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let db = ctx.dao().db();
    let project_data = match ProjectDao::db_select(db, path.project_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if *project_data.status() != ProjectStatus::Approved {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            "Project is not open for funding",
        );
    }

    if *data.amount() > project_data.remaining_amount() {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            "Amount exceeds the remaining target of the project",
        );
    }

    let funding_data =
        ProjectFundingDao::new(project_data.id(), session.profile().id(), data.amount());
    if let Err(err) = funding_data.db_insert(db).await {
        return Response::error(&Error::internal(err));
    }

    Response::data(
        &StatusCode::CREATED,
        &None,
        &FundingResJson::from_dao(&funding_data, ctx.payment().currency()),
    )
}

async fn find_many_by_project(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let db = ctx.dao().db();
    match ProjectDao::db_select(db, path.project_id()).await {
        Ok(Some(data))
            if data.user_id() == session.profile().id() || session.profile().is_admin() => {}
        Ok(_) => return Response::error(&Error::NotFound("Project not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    }

    match ProjectFundingDao::db_select_many_by_project_id(db, path.project_id()).await {
        Ok(fundings_data) => fundings_res(&ctx, &fundings_data),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn find_many_mine(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    match ProjectFundingDao::db_select_many_by_funder_id(ctx.dao().db(), session.profile().id())
        .await
    {
        Ok(fundings_data) => fundings_res(&ctx, &fundings_data),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn update_status(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<FundingReqPath>,
    data: web::Json<UpdateFundingStatusReqJson>,
) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    let status = match FundingStatus::from_str(data.status()) {
        Ok(status) => status,
        Err(_) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                &format!("Unknown funding status '{}'", data.status()),
            )
        }
    };

    let db = ctx.dao().db();
    let mut funding_data = match ProjectFundingDao::db_select(db, path.funding_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Funding not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let from = *funding_data.status();
    if !from.can_settle_to(&status) {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            &format!("Can't change funding status from {from} to {status}"),
        );
    }

    match funding_data.db_settle(db, &status).await {
        Ok(true) => (),
        Ok(false) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                "Funding can't be settled: the project is not open for funding or the amount exceeds its target",
            )
        }
        Err(err) => return Response::error(&Error::internal(err)),
    }

    if status == FundingStatus::Completed {
        match ProjectDao::db_select(db, funding_data.project_id()).await {
            Ok(Some(project_data)) => {
                let project = ProjectResJson::from_dao(&project_data, ctx.payment().currency());
                if let Err(err) = ctx.websocket().broadcaster().project_updated(&project) {
                    fb_log::warn(
                        None,
                        format!("[ApiRestServer] Failed to broadcast project update: {err}"),
                    );
                }
            }
            Ok(None) => (),
            Err(err) => return Response::error(&Error::internal(err)),
        }
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &FundingResJson::from_dao(&funding_data, ctx.payment().currency()),
    )
}

fn fundings_res(ctx: &ApiRestCtx, fundings_data: &[ProjectFundingDao]) -> HttpResponse {
    let total = fundings_data.len();
    Response::data(
        &StatusCode::OK,
        &Some(PaginationRes::new(&total, &total)),
        &fundings_data
            .iter()
            .map(|data| FundingResJson::from_dao(data, ctx.payment().currency()))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::{
        profile::Role,
        project::{ProjectDao, ProjectStatus},
    };
    use fb_token_jwt::kind::JwtTokenKind;
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp};

    #[actix_web::test]
    async fn completed_fundings_never_exceed_the_target() {
        let app = TestApp::new().await;
        let (owner, owner_token) = app.profile("owner@example.com", &Role::User).await;
        let (_, funder_token) = app.profile("funder@example.com", &Role::User).await;
        let (admin, _) = app.profile("admin@example.com", &Role::Admin).await;
        let admin_token = app.token(admin.id(), &JwtTokenKind::AdminSession);

        let mut project = ProjectDao::new(
            owner.id(),
            "Solar kiosk",
            "Community solar panels for the market square",
            &10000,
            &6,
        );
        project.db_insert(app.db()).await.unwrap();
        let project_id = *project.id();
        let service = init_app!(app);

        let fund = |amount: i64| {
            test::TestRequest::post()
                .uri(&format!("/api/rest/project/{project_id}/fund"))
                .insert_header(("Authorization", format!("Bearer {funder_token}")))
                .set_json(json!({"amount": amount}))
                .to_request()
        };
        let settle = |funding_id: &str, status: &str| {
            test::TestRequest::patch()
                .uri(&format!("/api/rest/funding/{funding_id}/status"))
                .insert_header(("Authorization", format!("Bearer {admin_token}")))
                .set_json(json!({"status": status}))
                .to_request()
        };

        let res = test::call_service(&service, fund(1000)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        assert!(project
            .db_review(app.db(), &ProjectStatus::Approved)
            .await
            .unwrap());

        let res = test::call_service(&service, fund(0)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let mut funding_ids = Vec::new();
        for amount in [6000, 4000, 4000] {
            let res = test::call_service(&service, fund(amount)).await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["data"]["status"], "pending");
            funding_ids.push(body["data"]["id"].as_str().unwrap().to_owned());
        }

        let res = test::call_service(&service, settle(&funding_ids[0], "completed")).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(&service, fund(5000)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(&service, settle(&funding_ids[1], "completed")).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(&service, settle(&funding_ids[2], "completed")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(&service, settle(&funding_ids[0], "failed")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let project = ProjectDao::db_select(app.db(), &project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*project.current_amount(), 10000);
        assert_eq!(project.status(), &ProjectStatus::Funded);

        let req = test::TestRequest::get()
            .uri(&format!("/api/rest/project/{project_id}/fundings"))
            .insert_header(("Authorization", format!("Bearer {owner_token}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        let statuses = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|funding| funding["status"] == "pending")
            .count();
        assert_eq!(statuses, 1);

        let req = test::TestRequest::get()
            .uri("/api/rest/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["total_funding"], 10000);
        assert_eq!(body["data"]["formatted_total_funding"], "10,000 XAF");
        assert_eq!(body["data"]["total_users"], 3);
        assert_eq!(body["data"]["pending_projects"], json!([]));
    }
}
