use std::str::FromStr;

use actix_web::{http::StatusCode, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::profile::{ProfileDao, Role};
use fb_error::Error;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    guard::{authorize, RouteAccess},
    model::{
        profile::{
            ProfileReqPath, ProfileResJson, UpdateOneProfileReqJson, UpdatePasswordReqJson,
            UpdateProfileRoleReqJson,
        },
        PaginationRes, Response,
    },
};

pub fn profile_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(find_one))
        .route("/profile", web::patch().to(update_one))
        .route("/profile/password", web::patch().to(update_password))
        .route("/profiles", web::get().to(find_many))
        .route("/profile/{profile_id}/role", web::patch().to(update_role));
}

async fn find_one(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => Response::data(
            &StatusCode::OK,
            &None,
            &ProfileResJson::from_dao(session.profile()),
        ),
        Err(err) => Response::error(&err),
    }
}

async fn update_one(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    data: web::Json<UpdateOneProfileReqJson>,
) -> HttpResponse {
    let mut session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let profile_data = session.profile_mut();
    profile_data.set_full_name(data.full_name());
    if let Err(err) = profile_data.db_update(ctx.dao().db()).await {
        return Response::error(&Error::internal(err));
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &ProfileResJson::from_dao(session.profile()),
    )
}

async fn update_password(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    data: web::Json<UpdatePasswordReqJson>,
) -> HttpResponse {
    let mut session = match authorize(&ctx, &auth, &RouteAccess::Protected).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let argon2 = ctx.hash().argon2();
    if !argon2.verify_password(data.old_password(), session.profile().password_hash()) {
        return Response::error_raw(&StatusCode::BAD_REQUEST, "Wrong password");
    }

    let password_hash = match argon2.hash_password(data.new_password()) {
        Ok(hash) => hash,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let profile_data = session.profile_mut();
    profile_data.set_password_hash(&password_hash);
    if let Err(err) = profile_data.db_update(ctx.dao().db()).await {
        return Response::error(&Error::internal(err));
    }

    Response::data(
        &StatusCode::OK,
        &None,
        &ProfileResJson::from_dao(session.profile()),
    )
}

async fn find_many(ctx: web::Data<ApiRestCtx>, auth: Option<BearerAuth>) -> HttpResponse {
    if let Err(err) = authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        return Response::error(&err);
    }

    let profiles_data = match ProfileDao::db_select_many(ctx.dao().db()).await {
        Ok(data) => data,
        Err(err) => return Response::error(&Error::internal(err)),
    };

    let total = profiles_data.len();
    Response::data(
        &StatusCode::OK,
        &Some(PaginationRes::new(&total, &total)),
        &profiles_data
            .iter()
            .map(ProfileResJson::from_dao)
            .collect::<Vec<_>>(),
    )
}

async fn update_role(
    ctx: web::Data<ApiRestCtx>,
    auth: Option<BearerAuth>,
    path: web::Path<ProfileReqPath>,
    data: web::Json<UpdateProfileRoleReqJson>,
) -> HttpResponse {
    let session = match authorize(&ctx, &auth, &RouteAccess::AdminOnly).await {
        Ok(session) => session,
        Err(err) => return Response::error(&err),
    };

    let role = match Role::from_str(data.role()) {
        Ok(role) => role,
        Err(_) => {
            return Response::error_raw(
                &StatusCode::BAD_REQUEST,
                &format!("Unknown role '{}'", data.role()),
            )
        }
    };

    if session.profile().id() == path.profile_id() && role != Role::Admin {
        return Response::error_raw(
            &StatusCode::BAD_REQUEST,
            "Admins can't remove their own admin role",
        );
    }

    let mut profile_data = match ProfileDao::db_select(ctx.dao().db(), path.profile_id()).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Response::error(&Error::NotFound(format!(
                "Profile {} not found",
                path.profile_id()
            )))
        }
        Err(err) => return Response::error(&Error::internal(err)),
    };

    profile_data.set_role(&role);
    if let Err(err) = profile_data.db_update(ctx.dao().db()).await {
        return Response::error(&Error::internal(err));
    }

    fb_log::info(
        None,
        format!(
            "[ApiRestServer] Profile {} role set to '{role}'",
            profile_data.id()
        ),
    );

    Response::data(
        &StatusCode::OK,
        &None,
        &ProfileResJson::from_dao(&profile_data),
    )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fb_dao::profile::Role;
    use serde_json::{json, Value};

    use crate::test_util::{init_app, TestApp};

    #[actix_web::test]
    async fn full_name_is_trimmed_before_validation() {
        let app = TestApp::new().await;
        let (_, token) = app.profile("owner@example.com", &Role::User).await;
        let service = init_app!(app);

        let rename = |full_name: &str| {
            test::TestRequest::patch()
                .uri("/api/rest/profile")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({"full_name": full_name}))
                .to_request()
        };

        let res = test::call_service(&service, rename("   ")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::call_and_read_body_json(&service, rename("  Ada Lovelace ")).await;
        assert_eq!(body["data"]["full_name"], "Ada Lovelace");
    }
}
