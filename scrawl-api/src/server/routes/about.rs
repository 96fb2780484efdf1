use crate::server::{ServerError, ServerRouter, json::Json};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(about_author)
        .typed_get(about_tech)
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct StaticPage {
    title: &'static str,
    body: &'static str,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/about/author/", rejection(ServerError))]
struct AboutAuthorPath();

async fn about_author(AboutAuthorPath(): AboutAuthorPath) -> Json<StaticPage> {
    Json(StaticPage {
        title: "About the author",
        body: "A social-blogging service, written as a study project.",
    })
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/about/tech/", rejection(ServerError))]
struct AboutTechPath();

async fn about_tech(AboutTechPath(): AboutTechPath) -> Json<StaticPage> {
    Json(StaticPage {
        title: "Technologies",
        body: "Served by axum on tokio, backed by Postgres through sqlx.",
    })
}
