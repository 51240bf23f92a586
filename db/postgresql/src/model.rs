pub mod profile;
pub mod project;
pub mod project_funding;
pub mod subscription_plan;
pub mod user_subscription;
