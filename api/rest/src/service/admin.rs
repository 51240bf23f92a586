use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use ahash::{HashMap, HashMapExt};
use fb_api_websocket::{message::Target, session::UserSession};
use fb_dao::{
    profile::ProfileDao,
    project::{ProjectDao, ProjectStatus},
    project_funding::{FundingStatus, ProjectFundingDao},
};
use fb_error::Error;
use uuid::Uuid;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        auth::TokenReqQuery,
        dashboard::{AdminDashboardResJson, PendingProjectResJson},
        project::ProjectResJson,
        Response,
    },
    util::format::format_amount,
};

pub fn admin_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/dashboard", web::get().to(dashboard))
        .route("/admin/ws", web::get().to(websocket));
}

async fn dashboard(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    let db = ctx.dao().db();
    let (projects_data, total_users, total_funding) = match tokio::try_join!(
        ProjectDao::db_select_many_by_status(db, &ProjectStatus::Pending),
        ProfileDao::db_count(db),
        ProjectFundingDao::db_sum_by_status(db, &FundingStatus::Completed),
    ) {
        Ok(data) => data,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let currency = ctx.payment().currency();
    let mut owner_names: HashMap<Uuid, Option<String>> = HashMap::new();
    let mut pending_projects = Vec::with_capacity(projects_data.len());
    for project_data in &projects_data {
        let owner_name = match owner_names.get(project_data.user_id()) {
            Some(name) => name.clone(),
            None => {
                let name = match ProfileDao::db_select(db, project_data.user_id()).await {
                    Ok(profile) => profile.map(|profile| profile.full_name().to_owned()),
                    Err(err) => return Response::error(&Error::internal(err)),
                };
                owner_names.insert(*project_data.user_id(), name.clone());
                name
            }
        };
        pending_projects.push(PendingProjectResJson::new(
            ProjectResJson::from_dao(project_data, currency),
            owner_name,
        ));
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &AdminDashboardResJson::new(
            pending_projects,
            &total_users,
            &total_funding,
            &format_amount(&total_funding, currency),
        ),
    )
}

/// Upgrades to the admin realtime feed. Browsers can't set headers on a
/// websocket handshake, so the token comes from the query string.
async fn websocket(
    ctx: web::Data<ApiRestCtx>,
    req: HttpRequest,
    query: web::Query<TokenReqQuery>,
    stream: web::Payload,
) -> HttpResponse {
    let claim = match ctx.token().jwt().decode(query.token()) {
        Ok(claim) => claim,
        Err(_) => return Response::error(&Error::Unauthorized("Login required".to_owned())),
    };

    if !claim.is_admin_session() {
        return Response::error(&Error::Forbidden("Admin session required".to_owned()));
    }

    match ProfileDao::db_select(ctx.dao().db(), claim.id()).await {
        Ok(Some(profile)) if profile.is_admin() => (),
        Ok(_) => {
            return Response::error(&Error::Forbidden(
                "Access denied: admin role required".to_owned(),
            ))
        }
        Err(err) => return Response::error(&Error::internal(err)),
    }

    let (res, session, msg_stream) = match actix_ws_ng::handle(&req, stream) {
        Ok(res) => res,
        Err(err) => return Response::error(&Error::BadRequest(err.to_string())),
    };

    let handler = ctx.websocket().handler().clone();
    let user_session = UserSession::Admin(*claim.id());
    actix_web::rt::spawn(async move {
        if let Err(err) = handler
            .connection(user_session, Target::Projects, session, msg_stream)
            .await
        {
            fb_log::error(None, format!("[ApiWebSocketServer] Connection failed: {err}"));
        }
    });

    res
}
