use crate::server::{PageQuery, Result, ServerError, ServerRouter, json::Json};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use scrawl_common::{
    model::{
        group::{Group, Slug},
        post::Post,
    },
    pagination::{Page, PageNumber, paginate},
};
use scrawl_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(group_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/group/{slug}/", rejection(ServerError))]
struct GroupPath {
    slug: Slug,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct GroupContext {
    group: Group,
    page_obj: Page<Post>,
}

async fn group_posts(
    GroupPath { slug }: GroupPath,
    Query(query): Query<PageQuery>,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<GroupContext>> {
    let group = db
        .fetch_group_by_slug(&slug)
        .await?
        .ok_or(ServerError::GroupBySlugNotFound(slug))?;

    let page = PageNumber::from_query(query.page.as_deref());
    let posts = db.list_group_posts(group.id).await?;

    Ok(Json(GroupContext {
        group,
        page_obj: paginate(posts, page),
    }))
}
