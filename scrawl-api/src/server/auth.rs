//! Bearer-session authentication.
//!
//! Guarded handlers take [`AuthenticatedUser`]; any way the check can fail
//! short of an internal error sends the caller to the login page with a
//! `next` parameter pointing back at the requested path. Public handlers
//! that merely personalize take `Option<AuthenticatedUser>` and see an
//! anonymous viewer when the check fails.

use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use scrawl_common::model::{auth::SessionToken, user::User};
use scrawl_db::client::DbClient;
use std::{convert::Infallible, sync::Arc};
use time::UtcDateTime;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser {
    user: User,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Login-page URL carrying the originally requested path.
#[must_use]
pub fn login_redirect(next: &str) -> String {
    format!("/auth/login/?next={next}")
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let next = parts.uri.path().to_owned();
        let login = || ServerError::LoginRequired(login_redirect(&next));

        let header =
            <AuthorizationHeader as FromRequestParts<S>>::from_request_parts(parts, state).await;
        let Ok(header) = header else {
            return Err(login());
        };
        let Ok(token) = header.token().parse::<SessionToken>() else {
            return Err(login());
        };

        let token_hash = token.hash()?;

        let db = Arc::<DbClient>::from_ref(state);
        let Some(session) = db.fetch_session(&token_hash).await? else {
            return Err(login());
        };

        if session.user != token.user_id || session.is_expired(UtcDateTime::now()) {
            return Err(login());
        }

        let Some(user) = db.fetch_user(session.user).await? else {
            return Err(login());
        };

        Ok(Self { user })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }

        let user = <Self as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(user.ok())
    }
}

#[cfg(test)]
mod tests {
    use crate::server::auth::login_redirect;

    #[test]
    fn login_redirect_carries_next() {
        assert_eq!(login_redirect("/create/"), "/auth/login/?next=/create/");
        assert_eq!(login_redirect("/follow/"), "/auth/login/?next=/follow/");
    }
}
