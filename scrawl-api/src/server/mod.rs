use crate::server::{
    json::{ErrorBody, Json},
    routes::feed::{HOME_CACHE_TTL, HomeCache},
};
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use scrawl_common::{
    forms::FormErrors,
    model::{
        Id, auth::SessionTokenHashError, group::Slug, post::PostMarker, user::Username,
    },
};
use scrawl_db::client::{DbClient, DbError};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

pub mod auth;
pub mod cache;
pub mod json;
pub mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub home_cache: Arc<HomeCache>,
}

impl ServerState {
    #[must_use]
    pub fn new(db_client: Arc<DbClient>) -> Self {
        Self {
            db_client,
            home_cache: Arc::new(HomeCache::new(HOME_CACHE_TTL)),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

/// `?page=` parameter shared by every feed route.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authentication required, redirecting to {0}")]
    LoginRequired(String),
    #[error("The session token could not be hashed: {0}")]
    SessionTokenHash(#[from] SessionTokenHashError),
    #[error(transparent)]
    Validation(#[from] FormErrors),
    #[error("Post {0} can only be edited by its author")]
    NotPostAuthor(Id<PostMarker>),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Group with slug {0} was not found.")]
    GroupBySlugNotFound(Slug),
    #[error("User with username {0} was not found.")]
    UserByUsernameNotFound(Username),
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::GroupBySlugNotFound(_)
            | ServerError::UserByUsernameNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::LoginRequired(_) | ServerError::NotPostAuthor(_) => {
                StatusCode::SEE_OTHER
            }
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::Database(_)
            | ServerError::SessionTokenHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            // The original-destination redirects are part of the page flow,
            // not error pages.
            ServerError::LoginRequired(target) => Redirect::to(&target).into_response(),
            ServerError::NotPostAuthor(id) => {
                Redirect::to(&format!("/posts/{id}/")).into_response()
            }
            ServerError::Validation(errors) => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                error!(error = %errors, %status, "Replying with validation errors");

                (status, Json(ErrorBody::with_errors(status, errors))).into_response()
            }
            other => {
                let status = other.status();
                error!(error = %other, %status, "Replying with error");

                (status, Json(ErrorBody::new(status))).into_response()
            }
        }
    }
}
