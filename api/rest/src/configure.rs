use actix_web::web;

use crate::service::{
    admin::admin_api, auth::auth_api, dashboard::dashboard_api, funding::funding_api,
    guard::guard_api, plan::plan_api, profile::profile_api, project::project_api,
    relay::relay_api, root::root_api, subscription::subscription_api,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(root_api).configure(relay_api).service(
        web::scope("/api/rest")
            .configure(guard_api)
            .configure(auth_api)
            .configure(profile_api)
            .configure(plan_api)
            .configure(subscription_api)
            .configure(project_api)
            .configure(funding_api)
            .configure(dashboard_api)
            .configure(admin_api),
    );
}
