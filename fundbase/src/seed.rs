use anyhow::Result;
use fb_config::{auth::InitialAdminConfig, plan::PlanConfig};
use fb_dao::{
    profile::{ProfileDao, Role},
    subscription_plan::SubscriptionPlanDao,
    Db,
};
use fb_hash_argon2::argon2::Argon2Hash;

/// Creates the configured admin, or promotes the profile holding its email.
pub async fn initial_admin(
    db: &Db,
    argon2: &Argon2Hash,
    config: &InitialAdminConfig,
) -> Result<()> {
    match ProfileDao::db_select_by_email(db, config.email()).await? {
        Some(mut profile) if !profile.is_admin() => {
            profile.set_role(&Role::Admin);
            profile.db_update(db).await?;
            fb_log::info(
                Some("🔑"),
                format!("[Fundbase] Promoted {} to admin", config.email()),
            );
        }
        Some(_) => (),
        None => {
            let password_hash = argon2.hash_password(config.password())?;
            ProfileDao::new(
                config.email(),
                &password_hash,
                config.full_name(),
                &Role::Admin,
            )
            .db_insert(db)
            .await?;
            fb_log::info(
                Some("🔑"),
                format!("[Fundbase] Created initial admin {}", config.email()),
            );
        }
    }
    Ok(())
}

pub async fn plans(db: &Db, config: &[PlanConfig]) -> Result<()> {
    let plans = config
        .iter()
        .map(|plan| {
            SubscriptionPlanDao::new(
                plan.name(),
                plan.description(),
                plan.price(),
                plan.features(),
                plan.max_projects(),
            )
        })
        .collect::<Vec<_>>();

    let seeded = SubscriptionPlanDao::db_seed(db, &plans).await?;
    if seeded > 0 {
        fb_log::info(
            Some("🌱"),
            format!("[Fundbase] Seeded {seeded} subscription plans"),
        );
    }
    Ok(())
}
