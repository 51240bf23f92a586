use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::{
    profile::ProfileDao,
    subscription_plan::SubscriptionPlanDao,
    user_subscription::{SubscriptionStatus, UserSubscriptionDao},
    Db,
};
use fb_error::Error;
use uuid::Uuid;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        plan::PlanResJson,
        subscription::{ReceiptResJson, SubscriptionReqPath, SubscriptionResJson},
        PaginationRes, Response,
    },
    util::format::format_amount,
};

pub fn subscription_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/subscription", web::get().to(find_active))
        .route("/subscriptions", web::get().to(find_many))
        .route(
            "/subscription/{subscription_id}/cancel",
            web::post().to(cancel_one),
        )
        .route(
            "/subscription/{subscription_id}/receipt",
            web::get().to(receipt),
        );
}

async fn find_active(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let subscription_data =
        match UserSubscriptionDao::db_select_active_by_user_id(ctx.dao().db(), session.profile().id())
            .await
        {
            Ok(data) => data,
            Err(err) => return Response::error(&Error::internal(err)),
        };

    match subscription_data {
        Some(data) => match with_plan(&ctx, &data).await {
            Ok(res) => Response::data(&StatusCode::OK, &None, &res),
            Err(err) => Response::error(&err),
        },
        None => Response::data(&StatusCode::OK, &None, &None::<SubscriptionResJson>),
    }
}

async fn find_many(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let subscriptions_data =
        match UserSubscriptionDao::db_select_many_by_user_id(ctx.dao().db(), session.profile().id())
            .await
        {
            Ok(data) => data,
            Err(err) => return Response::error(&Error::internal(err)),
        };

    let mut subscriptions = Vec::with_capacity(subscriptions_data.len());
    for data in &subscriptions_data {
        match with_plan(&ctx, data).await {
            Ok(res) => subscriptions.push(res),
            Err(err) => return Response::error(&err),
        }
    }

    let total = subscriptions.len();
    Response::data(
        &StatusCode::OK,
        &Some(PaginationRes::new(&total, &total)),
        &subscriptions,
    )
}

async fn cancel_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<SubscriptionReqPath>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let mut subscription_data =
        match find_owned(ctx.dao().db(), path.subscription_id(), session.profile()).await {
            Ok(data) => data,
            Err(err) => return Response::error(&err),
        };

    if !subscription_data.is_active() {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            &format!("Subscription is already {}", subscription_data.status()),
        );
    }

    if let Err(err) = subscription_data
        .db_update_status(ctx.dao().db(), &SubscriptionStatus::Cancelled)
        .await
    {
        return Response::error(&Error::internal(err));
    }

    match with_plan(&ctx, &subscription_data).await {
        Ok(res) => Response::data(&StatusCode::OK, &None, &res),
        Err(err) => Response::error(&err),
    }
}

async fn receipt(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<SubscriptionReqPath>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let db = ctx.dao().db();
    let subscription_data = match find_owned(db, path.subscription_id(), session.profile()).await
    {
        Ok(data) => data,
        Err(err) => return Response::error(&err),
    };

    let customer_data = if subscription_data.user_id() == session.profile().id() {
        None
    } else {
        match ProfileDao::db_select(db, subscription_data.user_id()).await {
            Ok(Some(data)) => Some(data),
            Ok(None) => return Response::error(&Error::NotFound("User not found".to_owned())),
            Err(err) => return Response::error(&Error::internal(err)),
        }
    };
    let customer = customer_data.as_ref().unwrap_or(session.profile());

    let plan_data = match SubscriptionPlanDao::db_select(db, subscription_data.plan_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => return Response::error(&Error::NotFound("Plan not found".to_owned())),
        Err(err) => return Response::error(&Error::internal(err)),
    };

    Response::data(
        &StatusCode::OK,
        &None,
        &ReceiptResJson::new(
            subscription_data.created_at(),
            subscription_data.id(),
            customer.email(),
            customer.full_name(),
            plan_data.name(),
            plan_data.price(),
            &format_amount(plan_data.price(), ctx.payment().currency()),
            subscription_data.end_date(),
        ),
    )
}

/// Owners see their subscriptions. Admins see everyone's.
async fn find_owned(
    db: &Db,
    subscription_id: &Uuid,
    profile: &ProfileDao,
) -> Result<UserSubscriptionDao, Error> {
    let subscription_data = UserSubscriptionDao::db_select(db, subscription_id)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::NotFound("Subscription not found".to_owned()))?;

    if subscription_data.user_id() != profile.id() && !profile.is_admin() {
        return Err(Error::NotFound("Subscription not found".to_owned()));
    }

    Ok(subscription_data)
}

async fn with_plan(
    ctx: &ApiRestCtx,
    data: &UserSubscriptionDao,
) -> Result<SubscriptionResJson, Error> {
    let plan = SubscriptionPlanDao::db_select(ctx.dao().db(), data.plan_id())
        .await
        .map_err(Error::internal)?
        .map(|plan| PlanResJson::from_dao(&plan, ctx.payment().currency()));
    Ok(SubscriptionResJson::from_dao(data, plan))
}
