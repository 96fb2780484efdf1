use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::{extract::State, response::Redirect};
use axum_extra::routing::{RouterExt, TypedPath};
use scrawl_common::{
    forms::{CommentForm, FormDescriptor, FormErrors, PostForm, PostInput},
    model::{
        Id,
        comment::{Comment, NewComment},
        post::{NewPost, Post, PostMarker},
        user::User,
    },
};
use scrawl_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::UtcDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(post_detail)
        .typed_get(post_create_form)
        .typed_post(post_create)
        .typed_get(post_edit_form)
        .typed_post(post_edit)
        .typed_post(add_comment)
}

fn post_detail_redirect(id: Id<PostMarker>) -> Redirect {
    Redirect::to(&format!("/posts/{id}/"))
}

/// Resolves the validated form against the store: the optional group slug
/// becomes a group id, an unknown slug is a field error like any other
/// invalid submission.
async fn resolve_post(db: &DbClient, input: PostInput) -> Result<NewPost> {
    let group = match input.group {
        Some(slug) => {
            let group = db.fetch_group_by_slug(&slug).await?.ok_or_else(|| {
                ServerError::Validation(FormErrors::single("group", "Unknown group"))
            })?;
            Some(group.id)
        }
        None => None,
    };

    Ok(NewPost {
        text: input.text,
        group,
        image: input.image,
    })
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/", rejection(ServerError))]
struct PostDetailPath {
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct PostDetailContext {
    post: Post,
    author: User,
    posts_number: u64,
    comments: Vec<Comment>,
    form: FormDescriptor,
}

async fn post_detail(
    PostDetailPath { id }: PostDetailPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<PostDetailContext>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    let comments = db.list_comments(id).await?;
    let posts_number = db.count_author_posts(post.author.id).await?;

    Ok(Json(PostDetailContext {
        author: post.author.clone(),
        posts_number,
        comments,
        form: CommentForm::descriptor(),
        post,
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/create/", rejection(ServerError))]
struct CreatePostPath();

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct PostFormContext {
    form: FormDescriptor,
    is_edit: bool,
}

async fn post_create_form(
    CreatePostPath(): CreatePostPath,
    _user: AuthenticatedUser,
) -> Json<PostFormContext> {
    Json(PostFormContext {
        form: PostForm::descriptor(),
        is_edit: false,
    })
}

async fn post_create(
    CreatePostPath(): CreatePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(form): Json<PostForm>,
) -> Result<Redirect> {
    let input = form.validate()?;
    let new_post = resolve_post(&db, input).await?;

    db.create_post(user.user().id, &new_post, UtcDateTime::now())
        .await?;

    Ok(Redirect::to(&format!("/profile/{}/", user.user().username)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/edit/", rejection(ServerError))]
struct EditPostPath {
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct PostEditContext {
    form: FormDescriptor,
    values: PostForm,
    is_edit: bool,
}

async fn post_edit_form(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<PostEditContext>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    if !post.is_author(user.user().id) {
        return Err(ServerError::NotPostAuthor(id));
    }

    let values = PostForm {
        text: post.text,
        group: post.group.map(|group| group.slug.into_inner()),
        image: post.image,
    };

    Ok(Json(PostEditContext {
        form: PostForm::descriptor(),
        values,
        is_edit: true,
    }))
}

async fn post_edit(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(form): Json<PostForm>,
) -> Result<Redirect> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    // Only the author mutates; everyone else is sent back to the detail
    // view with the post untouched.
    if !post.is_author(user.user().id) {
        return Err(ServerError::NotPostAuthor(id));
    }

    let input = form.validate()?;
    let new_post = resolve_post(&db, input).await?;
    db.update_post(id, &new_post).await?;

    Ok(post_detail_redirect(id))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comment/", rejection(ServerError))]
struct AddCommentPath {
    id: Id<PostMarker>,
}

async fn add_comment(
    AddCommentPath { id }: AddCommentPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(form): Json<CommentForm>,
) -> Result<Redirect> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    let input = form.validate()?;
    let comment = NewComment { text: input.text };
    db.create_comment(post.id, user.user().id, &comment).await?;

    Ok(post_detail_redirect(post.id))
}
