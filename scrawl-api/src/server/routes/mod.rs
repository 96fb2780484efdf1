use crate::server::ServerRouter;
use axum::Router;

pub mod about;
pub mod feed;
pub mod groups;
pub mod posts;
pub mod profiles;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(about::routes())
        .merge(feed::routes())
        .merge(groups::routes())
        .merge(posts::routes())
        .merge(profiles::routes())
}
