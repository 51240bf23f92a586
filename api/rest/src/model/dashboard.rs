use serde::Serialize;

use super::{plan::PlanResJson, project::ProjectResJson, subscription::SubscriptionResJson};

#[derive(Serialize)]
pub struct DashboardResJson {
    projects: Vec<ProjectResJson>,
    counts: ProjectCountsResJson,
    subscription: Option<SubscriptionResJson>,
    quota: QuotaResJson,
    plans: Vec<PlanResJson>,
}

impl DashboardResJson {
    pub fn new(
        projects: Vec<ProjectResJson>,
        counts: ProjectCountsResJson,
        subscription: Option<SubscriptionResJson>,
        quota: QuotaResJson,
        plans: Vec<PlanResJson>,
    ) -> Self {
        Self {
            projects,
            counts,
            subscription,
            quota,
            plans,
        }
    }
}

#[derive(Serialize, Default, PartialEq, Eq, Debug)]
pub struct ProjectCountsResJson {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub funded: usize,
}

/// `limit` is absent for unlimited plans and zero without a subscription.
#[derive(Serialize)]
pub struct QuotaResJson {
    used: i64,
    limit: Option<i32>,
}

impl QuotaResJson {
    pub fn new(used: &i64, limit: &Option<i32>) -> Self {
        Self {
            used: *used,
            limit: *limit,
        }
    }
}

#[derive(Serialize)]
pub struct AdminDashboardResJson {
    pending_projects: Vec<PendingProjectResJson>,
    total_users: i64,
    total_funding: i64,
    formatted_total_funding: String,
}

impl AdminDashboardResJson {
    pub fn new(
        pending_projects: Vec<PendingProjectResJson>,
        total_users: &i64,
        total_funding: &i64,
        formatted_total_funding: &str,
    ) -> Self {
        Self {
            pending_projects,
            total_users: *total_users,
            total_funding: *total_funding,
            formatted_total_funding: formatted_total_funding.to_owned(),
        }
    }
}

#[derive(Serialize)]
pub struct PendingProjectResJson {
    #[serde(flatten)]
    project: ProjectResJson,
    owner_name: Option<String>,
}

impl PendingProjectResJson {
    pub fn new(project: ProjectResJson, owner_name: Option<String>) -> Self {
        Self {
            project,
            owner_name,
        }
    }
}
