use actix_web_httpauth::extractors::bearer::BearerAuth;
use fb_dao::profile::{ProfileDao, Role};
use fb_error::Error;
use fb_token_jwt::claim::Claim;

use crate::context::ApiRestCtx;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RouteAccess {
    Public,
    Protected,
    AdminOnly,
}

impl RouteAccess {
    /// Access level of a frontend route. Unknown paths are protected.
    pub fn of_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            path => path,
        };
        match path {
            "/" | "/login" | "/signup" | "/fund-project" | "/subscription-plans" => Self::Public,
            "/admin/dashboard" => Self::AdminOnly,
            _ => Self::Protected,
        }
    }
}

pub struct GuardSession {
    role: Role,
    admin_session: bool,
}

impl GuardSession {
    pub fn new(role: &Role, admin_session: &bool) -> Self {
        Self {
            role: *role,
            admin_session: *admin_session,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuardDecision {
    Allow,
    RedirectLogin,
    RedirectHome,
    RedirectAdminLogin,
}

impl GuardDecision {
    pub fn redirect_to(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin => Some("/login"),
            Self::RedirectHome => Some("/"),
            Self::RedirectAdminLogin => Some("/admin/login"),
        }
    }

    /// Login redirects become 401, every other redirect 403.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::RedirectLogin => Err(Error::Unauthorized("Login required".to_owned())),
            Self::RedirectHome => Err(Error::Forbidden("Admin role required".to_owned())),
            Self::RedirectAdminLogin => Err(Error::Forbidden(
                "Admin session required, re-enter the admin password".to_owned(),
            )),
        }
    }
}

pub fn evaluate(access: &RouteAccess, session: Option<&GuardSession>) -> GuardDecision {
    if *access == RouteAccess::Public {
        return GuardDecision::Allow;
    }
    let Some(session) = session else {
        return GuardDecision::RedirectLogin;
    };
    if *access == RouteAccess::AdminOnly {
        if session.role != Role::Admin {
            return GuardDecision::RedirectHome;
        }
        if !session.admin_session {
            return GuardDecision::RedirectAdminLogin;
        }
    }
    GuardDecision::Allow
}

pub struct AuthSession {
    profile: ProfileDao,
    claim: Claim,
}

impl AuthSession {
    pub fn profile(&self) -> &ProfileDao {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileDao {
        &mut self.profile
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn guard_session(&self) -> GuardSession {
        GuardSession::new(self.profile.role(), &self.claim.is_admin_session())
    }
}

/// Resolves the bearer token to a session. The role always comes from the
/// stored profile. Invalid tokens and deleted profiles count as no session.
pub async fn resolve_session(
    ctx: &ApiRestCtx,
    auth: &Option<BearerAuth>,
) -> Result<Option<AuthSession>, Error> {
    let Some(auth) = auth else {
        return Ok(None);
    };
    let claim = match ctx.token().jwt().decode(auth.token()) {
        Ok(claim) => claim,
        Err(_) => return Ok(None),
    };
    match ProfileDao::db_select(ctx.dao().db(), claim.id()).await {
        Ok(Some(profile)) => Ok(Some(AuthSession { profile, claim })),
        Ok(None) => Ok(None),
        Err(err) => Err(Error::internal(err)),
    }
}

/// Resolves the session and applies the guard for `access`.
pub async fn authorize(
    ctx: &ApiRestCtx,
    auth: &Option<BearerAuth>,
    access: &RouteAccess,
) -> Result<AuthSession, Error> {
    let session = resolve_session(ctx, auth).await?;
    let guard_session = session.as_ref().map(AuthSession::guard_session);
    evaluate(access, guard_session.as_ref()).into_result()?;
    session.ok_or_else(|| Error::Unauthorized("Login required".to_owned()))
}
