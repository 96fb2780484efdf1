use crate::model::{
    Id,
    group::{Group, GroupMarker},
    user::{User, UserMarker},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use time::UtcDateTime;

/// Number of characters shown when a post is rendered as a one-liner.
pub const POST_PREVIEW_LEN: usize = 15;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: User,
    pub text: String,
    pub group: Option<Group>,
    pub image: Option<String>,
    pub published: UtcDateTime,
}

/// Validated create/update payload. The author and publication time are
/// stamped by the caller, never taken from the submission.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct NewPost {
    pub text: String,
    pub group: Option<Id<GroupMarker>>,
    pub image: Option<String>,
}

impl Post {
    #[must_use]
    pub fn is_author(&self, user: Id<UserMarker>) -> bool {
        self.author.id == user
    }

    /// The first [`POST_PREVIEW_LEN`] characters of the text.
    #[must_use]
    pub fn preview(&self) -> String {
        self.text.chars().take(POST_PREVIEW_LEN).collect()
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.preview(), f)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        post::Post,
        user::{User, Username},
    };
    use time::macros::utc_datetime;

    fn post_with_text(text: &str) -> Post {
        Post {
            id: 1.into(),
            author: User {
                id: 1.into(),
                username: Username::new("auth".to_owned()).unwrap(),
            },
            text: text.to_owned(),
            group: None,
            image: None,
            published: utc_datetime!(2023-02-01 12:00),
        }
    }

    #[test]
    fn display_truncates_to_fifteen_chars() {
        let post = post_with_text("a post that is certainly longer than fifteen characters");
        assert_eq!(post.to_string(), "a post that is ");

        let short = post_with_text("short");
        assert_eq!(short.to_string(), "short");
    }

    #[test]
    fn display_truncates_on_char_boundaries() {
        let post = post_with_text("Тестовая группа с длинным текстом");
        assert_eq!(post.to_string(), "Тестовая группа");
    }

    #[test]
    fn author_check() {
        let post = post_with_text("text");
        assert!(post.is_author(1.into()));
        assert!(!post.is_author(2.into()));
    }
}
