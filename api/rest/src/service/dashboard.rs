use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::{
    project::{ProjectDao, ProjectStatus},
    subscription_plan::SubscriptionPlanDao,
    user_subscription::UserSubscriptionDao,
};
use fb_error::Error;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        dashboard::{DashboardResJson, ProjectCountsResJson, QuotaResJson},
        plan::PlanResJson,
        project::ProjectResJson,
        subscription::SubscriptionResJson,
        Response,
    },
};

pub fn dashboard_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(dashboard));
}

async fn dashboard(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let db = ctx.dao().db();
    let user_id = session.profile().id();
    let (projects_data, subscription_data, plans_data) = match tokio::try_join!(
        ProjectDao::db_select_many_by_user_id(db, user_id),
        UserSubscriptionDao::db_select_active_by_user_id(db, user_id),
        SubscriptionPlanDao::db_select_all(db),
    ) {
        Ok(data) => data,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let currency = ctx.payment().currency();
    let subscribed_plan = subscription_data.as_ref().and_then(|subscription| {
        plans_data
            .iter()
            .find(|plan| plan.id() == subscription.plan_id())
    });

    let used = i64::try_from(projects_data.len()).unwrap_or(i64::MAX);
    let limit = match (&subscription_data, subscribed_plan) {
        (Some(_), Some(plan)) => *plan.max_projects(),
        _ => Some(0),
    };

    Response::data(
        &StatusCode::OK,
        &None,
        &DashboardResJson::new(
            projects_data
                .iter()
                .map(|data| ProjectResJson::from_dao(data, currency))
                .collect(),
            count_by_status(&projects_data),
            subscription_data.as_ref().map(|data| {
                SubscriptionResJson::from_dao(
                    data,
                    subscribed_plan.map(|plan| PlanResJson::from_dao(plan, currency)),
                )
            }),
            QuotaResJson::new(&used, &limit),
            plans_data
                .iter()
                .map(|data| PlanResJson::from_dao(data, currency))
                .collect(),
        ),
    )
}

fn count_by_status(projects: &[ProjectDao]) -> ProjectCountsResJson {
    let mut counts = ProjectCountsResJson {
        total: projects.len(),
        ..Default::default()
    };
    for project in projects {
        match project.status() {
            ProjectStatus::Pending => counts.pending += 1,
            ProjectStatus::Approved => counts.approved += 1,
            ProjectStatus::Rejected => counts.rejected += 1,
            ProjectStatus::Funded => counts.funded += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use fb_dao::{profile::Role, project::ProjectDao};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::count_by_status;
    use crate::{
        model::dashboard::ProjectCountsResJson,
        test_util::{init_app, TestApp},
    };

    #[actix_web::test]
    async fn counts_new_projects_as_pending() {
        let user_id = Uuid::now_v7();
        let projects = vec![
            ProjectDao::new(&user_id, "Solar kiosk", "Solar powered phone charging", &5000, &6),
            ProjectDao::new(&user_id, "Water well", "A well for the village school", &9000, &12),
        ];

        assert_eq!(
            count_by_status(&projects),
            ProjectCountsResJson {
                total: 2,
                pending: 2,
                ..Default::default()
            }
        );
        assert_eq!(count_by_status(&[]), ProjectCountsResJson::default());
    }

    #[actix_web::test]
    async fn quota_follows_the_active_subscription() {
        let app = TestApp::new().await;
        let (user, token) = app.profile("owner@example.com", &Role::User).await;
        let plan = app.plan("Basic", &5000, &Some(2)).await;
        app.plan("Enterprise", &50000, &None).await;
        let service = init_app!(app);

        let dashboard = || {
            test::TestRequest::get()
                .uri("/api/rest/dashboard")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request()
        };

        let body: Value = test::call_and_read_body_json(&service, dashboard()).await;
        assert_eq!(body["data"]["quota"], json!({"used": 0, "limit": 0}));
        assert!(body["data"]["subscription"].is_null());
        assert_eq!(body["data"]["plans"].as_array().map(Vec::len), Some(2));

        app.subscribe(user.id(), plan.id()).await;
        ProjectDao::new(user.id(), "Solar kiosk", "Solar powered phone charging", &5000, &6)
            .db_insert(app.db())
            .await
            .unwrap();

        let body: Value = test::call_and_read_body_json(&service, dashboard()).await;
        assert_eq!(body["data"]["quota"], json!({"used": 1, "limit": 2}));
        assert_eq!(body["data"]["counts"]["pending"], 1);
        assert_eq!(body["data"]["projects"][0]["formatted_target_amount"], "5,000 XAF");
        assert_eq!(body["data"]["subscription"]["plan"]["name"], "Basic");
    }
}
