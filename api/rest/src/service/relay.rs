use actix_web::{http::StatusCode, web, HttpResponse};
use ahash::{HashMap, HashMapExt};
use fb_dao::{
    profile::ProfileDao, subscription_plan::SubscriptionPlanDao,
    user_subscription::UserSubscriptionDao,
};
use fb_payment::CheckoutParams;
use uuid::Uuid;

use crate::{
    context::ApiRestCtx,
    model::{
        plan::PlanResJson,
        relay::{
            relay_data, relay_error, CheckoutSessionResJson, CreateCheckoutSessionReqJson,
            DebugEnvResJson, VerifyPaymentReqJson, VerifyPaymentResJson,
        },
        subscription::SubscriptionResJson,
    },
    util::format::format_amount,
};

const METADATA_USER_ID: &str = "userId";
const METADATA_PLAN_ID: &str = "planId";

pub fn relay_api(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/create-checkout-session",
        web::post().to(create_checkout_session),
    )
    .route("/api/verify-payment", web::post().to(verify_payment))
    .route("/api/debug/env", web::get().to(debug_env));
}

async fn create_checkout_session(
    ctx: web::Data<ApiRestCtx>,
    data: web::Json<CreateCheckoutSessionReqJson>,
) -> HttpResponse {
    let (Some(plan_id), Some(user_id), Some(user_email)) =
        (data.plan_id(), data.user_id(), data.user_email())
    else {
        return relay_error(
            &StatusCode::BAD_REQUEST,
            "Missing required fields: planId, userId and userEmail",
        );
    };

    let plan_data = match Uuid::parse_str(plan_id) {
        Ok(plan_id) => match SubscriptionPlanDao::db_select(ctx.dao().db(), &plan_id).await {
            Ok(Some(data)) => data,
            Ok(None) => return relay_error(&StatusCode::NOT_FOUND, "Plan not found"),
            Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
        },
        Err(_) => return relay_error(&StatusCode::NOT_FOUND, "Plan not found"),
    };

    let user_exists = match Uuid::parse_str(user_id) {
        Ok(user_id) => match ProfileDao::db_select(ctx.dao().db(), &user_id).await {
            Ok(data) => data.is_some(),
            Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
        },
        Err(_) => false,
    };
    if !user_exists {
        return relay_error(&StatusCode::NOT_FOUND, "User not found");
    }

    let mut metadata = HashMap::with_capacity(2);
    metadata.insert(METADATA_USER_ID.to_owned(), user_id.to_owned());
    metadata.insert(METADATA_PLAN_ID.to_owned(), plan_data.id().to_string());

    let payment = ctx.payment();
    let params = CheckoutParams {
        currency: payment.currency().to_owned(),
        product_name: plan_data.name().to_owned(),
        product_description: plan_data.description().to_owned(),
        unit_amount: *plan_data.price(),
        customer_email: user_email.to_owned(),
        success_url: payment.success_url(),
        cancel_url: payment.cancel_url(),
        metadata,
    };

    match payment.provider().create_checkout_session(params).await {
        Ok(session) => {
            fb_log::info(
                None,
                format!(
                    "[ApiRestServer] Created checkout session {} for plan '{}'",
                    session.id,
                    plan_data.name()
                ),
            );
            relay_data(&CheckoutSessionResJson::new(&session.id))
        }
        Err(err) => relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

async fn verify_payment(
    ctx: web::Data<ApiRestCtx>,
    data: web::Json<VerifyPaymentReqJson>,
) -> HttpResponse {
    let Some(session_id) = data.session_id() else {
        return relay_error(&StatusCode::BAD_REQUEST, "Missing sessionId");
    };

    let session = match ctx
        .payment()
        .provider()
        .retrieve_checkout_session(session_id)
        .await
    {
        Ok(session) => session,
        Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    if !session.is_paid() {
        return relay_data(&VerifyPaymentResJson::unpaid());
    }

    let (Some(user_id), Some(plan_id)) = (
        session
            .metadata_value(METADATA_USER_ID)
            .and_then(|id| Uuid::parse_str(id).ok()),
        session
            .metadata_value(METADATA_PLAN_ID)
            .and_then(|id| Uuid::parse_str(id).ok()),
    ) else {
        return relay_error(
            &StatusCode::INTERNAL_SERVER_ERROR,
            "Checkout session metadata has no valid userId and planId",
        );
    };

    let db = ctx.dao().db();
    let already_activated = match UserSubscriptionDao::db_select_by_payment_id(db, &session.id)
        .await
    {
        Ok(data) => data.is_some(),
        Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    let subscription_data = match UserSubscriptionDao::activate(
        db,
        &user_id,
        &plan_id,
        &session.id,
        ctx.payment().subscription_days(),
    )
    .await
    {
        Ok(data) => data,
        Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    let plan_data = match SubscriptionPlanDao::db_select(db, subscription_data.plan_id()).await {
        Ok(data) => data,
        Err(err) => return relay_error(&StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    if !already_activated {
        fb_log::info(
            None,
            format!(
                "[ApiRestServer] Activated subscription {} from checkout session {}",
                subscription_data.id(),
                session.id
            ),
        );
        if let (Some(plan_data), Some(email)) = (&plan_data, &session.customer_email) {
            ctx.notify(
                email,
                "Your subscription receipt",
                &format!(
                    "Thank you for subscribing to {}.\nReceipt no: {}\nAmount: {}\nValid until: {}",
                    plan_data.name(),
                    subscription_data.id(),
                    format_amount(plan_data.price(), ctx.payment().currency()),
                    subscription_data.end_date().format("%Y-%m-%d"),
                ),
            );
        }
    }

    let receipt_url = format!("/api/rest/subscription/{}/receipt", subscription_data.id());
    let plan = plan_data.map(|data| PlanResJson::from_dao(&data, ctx.payment().currency()));

    relay_data(&VerifyPaymentResJson::paid(
        session,
        &receipt_url,
        SubscriptionResJson::from_dao(&subscription_data, plan),
    ))
}

async fn debug_env(ctx: web::Data<ApiRestCtx>) -> HttpResponse {
    relay_data(&DebugEnvResJson::new(
        ctx.dao().db().driver_name(),
        ctx.payment().stripe_key_set(),
        ctx.payment().frontend_url(),
        &!ctx.admin_password().is_empty(),
        &ctx.mailer().is_some(),
    ))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::{profile::Role, user_subscription::UserSubscriptionDao};
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp};

    #[actix_web::test]
    async fn checkout_session_for_a_known_plan() {
        let app = TestApp::new().await;
        let (user, _) = app.profile("funder@example.com", &Role::User).await;
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({
                "planId": plan.id().to_string(),
                "userId": user.id().to_string(),
                "userEmail": user.email(),
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(app.payment.session_count().await, 1);

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({
                "planId": uuid::Uuid::now_v7().to_string(),
                "userId": user.id().to_string(),
                "userEmail": user.email(),
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "Plan not found"}));

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({
                "planId": plan.id().to_string(),
                "userId": "not-a-user",
                "userEmail": user.email(),
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn checkout_session_requires_every_field() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({"planId": "", "userEmail": "a@example.com"}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn provider_failure_is_a_server_error() {
        let app = TestApp::new().await;
        let (user, _) = app.profile("funder@example.com", &Role::User).await;
        let plan = app.plan("Basic", &5000, &Some(2)).await;
        let service = init_app!(app);
        app.payment.set_fail_next(true).await;

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({
                "planId": plan.id().to_string(),
                "userId": user.id().to_string(),
                "userEmail": user.email(),
            }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(res).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn verify_payment_activates_one_subscription() {
        let app = TestApp::new().await;
        let (user, _) = app.profile("funder@example.com", &Role::User).await;
        let plan = app.plan("Pro", &15000, &Some(5)).await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(json!({
                "planId": plan.id().to_string(),
                "userId": user.id().to_string(),
                "userEmail": user.email(),
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        let session_id = body["id"].as_str().unwrap().to_owned();

        let req = test::TestRequest::post()
            .uri("/api/verify-payment")
            .set_json(json!({"sessionId": session_id}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"success": false}));

        app.payment.mark_paid(&session_id).await.unwrap();
        let mut receipt_urls = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/verify-payment")
                .set_json(json!({"sessionId": session_id}))
                .to_request();
            let body: Value = test::call_and_read_body_json(&service, req).await;
            assert_eq!(body["success"], true);
            assert_eq!(body["subscription"]["plan"]["name"], "Pro");
            receipt_urls.push(body["receiptUrl"].as_str().unwrap().to_owned());
        }
        assert_eq!(receipt_urls[0], receipt_urls[1]);

        let subscriptions = UserSubscriptionDao::db_select_many_by_user_id(app.db(), user.id())
            .await
            .unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert!(subscriptions[0].is_active());
    }

    #[actix_web::test]
    async fn verify_payment_requires_a_session_id() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = test::TestRequest::post()
            .uri("/api/verify-payment")
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn debug_env_reports_presence_only() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = test::TestRequest::get().uri("/api/debug/env").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(
            body,
            json!({
                "databaseDriver": "sqlite",
                "stripeKey": "missing",
                "frontendUrl": "http://localhost:5173",
                "adminPassword": "set",
                "mailer": "missing",
            })
        );
    }
}
