use crate::model::{Id, post::PostMarker, user::User};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post: Id<PostMarker>,
    pub author: User,
    pub text: String,
    pub created: UtcDateTime,
}

/// Validated comment payload; post and author are supplied by the caller.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct NewComment {
    pub text: String,
}
