pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod funding;
pub mod guard;
pub mod plan;
pub mod profile;
pub mod project;
pub mod relay;
pub mod root;
pub mod subscription;
