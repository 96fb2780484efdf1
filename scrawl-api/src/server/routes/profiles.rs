use crate::server::{
    PageQuery, Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json,
};
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::routing::{RouterExt, TypedPath};
use scrawl_common::{
    model::{
        Id,
        post::Post,
        user::{User, UserMarker, Username},
    },
    pagination::{Page, PageNumber, paginate},
};
use scrawl_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(profile)
        .typed_get(profile_follow)
        .typed_get(profile_unfollow)
}

/// A follow request only creates an edge between two distinct users;
/// following yourself is silently skipped.
fn creates_edge(requester: Id<UserMarker>, target: Id<UserMarker>) -> bool {
    requester != target
}

fn profile_redirect(username: &Username) -> Redirect {
    Redirect::to(&format!("/profile/{username}/"))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/", rejection(ServerError))]
struct ProfilePath {
    username: Username,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ProfileContext {
    author: User,
    posts_number: usize,
    following: bool,
    page_obj: Page<Post>,
}

async fn profile(
    ProfilePath { username }: ProfilePath,
    Query(query): Query<PageQuery>,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
) -> Result<Json<ProfileContext>> {
    let author = db
        .fetch_user_by_username(&username)
        .await?
        .ok_or(ServerError::UserByUsernameNotFound(username))?;

    let posts = db.list_author_posts(author.id).await?;
    let posts_number = posts.len();

    let following = match viewer {
        Some(viewer) => db.is_following(viewer.user().id, author.id).await?,
        None => false,
    };

    let page = PageNumber::from_query(query.page.as_deref());
    Ok(Json(ProfileContext {
        author,
        posts_number,
        following,
        page_obj: paginate(posts, page),
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/follow/", rejection(ServerError))]
struct ProfileFollowPath {
    username: Username,
}

async fn profile_follow(
    ProfileFollowPath { username }: ProfileFollowPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Redirect> {
    let target = db
        .fetch_user_by_username(&username)
        .await?
        .ok_or(ServerError::UserByUsernameNotFound(username))?;

    if creates_edge(user.user().id, target.id) {
        db.create_follow(user.user().id, target.id).await?;
    }

    Ok(profile_redirect(&target.username))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/unfollow/", rejection(ServerError))]
struct ProfileUnfollowPath {
    username: Username,
}

async fn profile_unfollow(
    ProfileUnfollowPath { username }: ProfileUnfollowPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Redirect> {
    let target = db
        .fetch_user_by_username(&username)
        .await?
        .ok_or(ServerError::UserByUsernameNotFound(username))?;

    if creates_edge(user.user().id, target.id) {
        db.delete_follow(user.user().id, target.id).await?;
    }

    Ok(profile_redirect(&target.username))
}

#[cfg(test)]
mod tests {
    use crate::server::routes::profiles::creates_edge;

    #[test]
    fn self_follow_never_creates_an_edge() {
        assert!(!creates_edge(1.into(), 1.into()));
        assert!(creates_edge(1.into(), 2.into()));
    }
}
