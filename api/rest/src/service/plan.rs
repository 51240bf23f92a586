use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::subscription_plan::SubscriptionPlanDao;
use fb_error::Error;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        plan::{
            DeletePlanResJson, InsertOnePlanReqJson, PlanReqPath, PlanResJson,
            UpdateOnePlanReqJson,
        },
        PaginationRes, Response,
    },
};

pub fn plan_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/plans", web::get().to(find_many))
        .route("/plan", web::post().to(insert_one))
        .route("/plan/{plan_id}", web::get().to(find_one))
        .route("/plan/{plan_id}", web::patch().to(update_one))
        .route("/plan/{plan_id}", web::delete().to(delete_one));
}

async fn find_many(ctx: web::Data<ApiRestCtx>) -> HttpResponse {
    let plans_data = match SubscriptionPlanDao::db_select_all(ctx.dao().db()).await {
        Ok(data) => data,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let total = plans_data.len();
    Response::data(
        &StatusCode::OK,
        &Some(PaginationRes::new(&total, &total)),
        &plans_data
            .iter()
            .map(|data| PlanResJson::from_dao(data, ctx.payment().currency()))
            .collect::<Vec<_>>(),
    )
}

async fn find_one(ctx: web::Data<ApiRestCtx>, path: web::Path<PlanReqPath>) -> HttpResponse {
    match SubscriptionPlanDao::db_select(ctx.dao().db(), path.plan_id()).await {
        Ok(Some(data)) => Response::data(
            &StatusCode::OK,
            &None,
            &PlanResJson::from_dao(&data, ctx.payment().currency()),
        ),
        Ok(None) => Response::error(&Error::NotFound("Plan not found".to_owned())),
        Err(err) => Response::error(&Error::internal(err)),
    }
}

async fn insert_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    data: web::Json<InsertOnePlanReqJson>,
) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let plan_data = SubscriptionPlanDao::new(
        data.name(),
        data.description(),
        data.price(),
        data.features(),
        data.max_projects(),
    );
    if let Err(err) = plan_data.db_insert(ctx.dao().db()).await {
        return Response::error(&Error::internal(err));
    }

    Response::data(
        &StatusCode::CREATED,
        &None,
        &PlanResJson::from_dao(&plan_data, ctx.payment().currency()),
    )
}

async fn update_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<PlanReqPath>,
    data: web::Json<UpdateOnePlanReqJson>,
) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let mut plan_data = match SubscriptionPlanDao::db_select(ctx.dao().db(), path.plan_id()).await
    {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Plan not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    if !data.is_all_none() {
        if let Some(name) = data.name() {
            plan_data.set_name(name);
        }
        if let Some(description) = data.description() {
            plan_data.set_description(description);
        }
        if let Some(price) = data.price() {
            plan_data.set_price(price);
        }
        if let Some(features) = data.features() {
            plan_data.set_features(features);
        }
        if let Some(max_projects) = data.max_projects() {
            plan_data.set_max_projects(max_projects);
        }

        if let Err(err) = plan_data.db_update(ctx.dao().db()).await {
            return Response::error(&Error::internal(err));
        }
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &PlanResJson::from_dao(&plan_data, ctx.payment().currency()),
    )
}

async fn delete_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<PlanReqPath>,
) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    match SubscriptionPlanDao::db_select(ctx.dao().db(), path.plan_id()).await {
        Ok(Some(_)) => (),
        Ok(None) => return Response::error(&Error::NotFound("Plan not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    }

    if let Err(err) = SubscriptionPlanDao::db_delete(ctx.dao().db(), path.plan_id()).await {
        return Response::error(&Error::internal(err));
    }

    Response::data(&StatusCode::OK, &None, &DeletePlanResJson::new(path.plan_id()))
}
