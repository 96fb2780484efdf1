use crate::server::{
    PageQuery, Result, ServerError, ServerRouter, auth::AuthenticatedUser, cache::TimedCache,
    json::Json,
};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use scrawl_common::{
    model::post::Post,
    pagination::{Page, PageNumber, paginate},
};
use scrawl_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

/// Expiration of the cached home feed. Post writes do not invalidate it.
pub const HOME_CACHE_TTL: Duration = Duration::from_secs(20);

pub type HomeCache = TimedCache<PageNumber, HomeContext>;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(home).typed_get(follow_index)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
struct HomePath();

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct HomeContext {
    pub page_obj: Page<Post>,
}

async fn home(
    HomePath(): HomePath,
    Query(query): Query<PageQuery>,
    State(db): State<Arc<DbClient>>,
    State(cache): State<Arc<HomeCache>>,
) -> Result<Json<HomeContext>> {
    let page = PageNumber::from_query(query.page.as_deref());

    if let Some(context) = cache.get(&page) {
        return Ok(Json(context));
    }

    let posts = db.list_posts().await?;
    let context = HomeContext {
        page_obj: paginate(posts, page),
    };

    // Key by the clamped page number, so the key set is bounded by the
    // page count no matter what `?page=` values clients send.
    cache.insert(PageNumber::new(context.page_obj.number), context.clone());

    Ok(Json(context))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/follow/", rejection(ServerError))]
struct FollowIndexPath();

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct FollowContext {
    page_obj: Page<Post>,
}

/// Posts by every author the requester follows, newest first.
async fn follow_index(
    FollowIndexPath(): FollowIndexPath,
    Query(query): Query<PageQuery>,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<FollowContext>> {
    let page = PageNumber::from_query(query.page.as_deref());
    let posts = db.list_followed_posts(user.user().id).await?;

    Ok(Json(FollowContext {
        page_obj: paginate(posts, page),
    }))
}
