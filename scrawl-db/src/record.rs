//! Row shapes as fetched, converted into validated model types before
//! they leave this crate.

use scrawl_common::model::{
    ModelValidationError,
    auth::Session,
    comment::Comment,
    group::{Group, Slug},
    post::Post,
    user::{User, Username},
};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct GroupRecord {
    pub group_id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Post joined with its author and (left-joined) group.
#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub text: String,
    pub image: Option<String>,
    pub published: OffsetDateTime,
    pub author_id: i64,
    pub username: String,
    pub group_id: Option<i64>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub group_description: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: i64,
    pub post_id: i64,
    pub text: String,
    pub created: OffsetDateTime,
    pub author_id: i64,
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct SessionRecord {
    pub user_id: i64,
    pub token_hash: Vec<u8>,
    pub created_at: OffsetDateTime,
    pub expires_after_seconds: Option<i64>,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
        })
    }
}

impl TryFrom<GroupRecord> for Group {
    type Error = ModelValidationError;

    fn try_from(value: GroupRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.group_id.into(),
            title: value.title,
            slug: Slug::new(value.slug)?,
            description: value.description,
        })
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let group = match value.group_id {
            Some(group_id) => Some(Group {
                id: group_id.into(),
                title: value.group_title.unwrap_or_default(),
                slug: Slug::new(value.group_slug.unwrap_or_default())?,
                description: value.group_description.unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Self {
            id: value.post_id.into(),
            author: User {
                id: value.author_id.into(),
                username: Username::new(value.username)?,
            },
            text: value.text,
            group,
            image: value.image,
            published: value.published.to_utc(),
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            post: value.post_id.into(),
            author: User {
                id: value.author_id.into(),
                username: Username::new(value.username)?,
            },
            text: value.text,
            created: value.created.to_utc(),
        })
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            user: value.user_id.into(),
            token_hash: value.token_hash.try_into()?,
            created_at: value.created_at.to_utc(),
            expires_after: value.expires_after_seconds.map(Duration::seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{PostRecord, SessionRecord, UserRecord};
    use scrawl_common::model::{auth::Session, post::Post, user::User};
    use time::macros::datetime;

    fn post_record() -> PostRecord {
        PostRecord {
            post_id: 3,
            text: "Test text".to_owned(),
            image: None,
            published: datetime!(2023-02-01 12:00 UTC),
            author_id: 1,
            username: "auth".to_owned(),
            group_id: None,
            group_title: None,
            group_slug: None,
            group_description: None,
        }
    }

    #[test]
    fn post_without_group_converts() {
        let post = Post::try_from(post_record()).unwrap();
        assert_eq!(post.id, 3.into());
        assert_eq!(post.author.username.get(), "auth");
        assert_eq!(post.group, None);
    }

    #[test]
    fn post_with_group_converts() {
        let record = PostRecord {
            group_id: Some(7),
            group_title: Some("Test group".to_owned()),
            group_slug: Some("test_slug".to_owned()),
            group_description: Some(String::new()),
            ..post_record()
        };

        let post = Post::try_from(record).unwrap();
        let group = post.group.unwrap();
        assert_eq!(group.id, 7.into());
        assert_eq!(group.slug.get(), "test_slug");
    }

    #[test]
    fn invalid_username_is_rejected() {
        let record = UserRecord {
            user_id: 1,
            username: String::new(),
        };
        assert!(User::try_from(record).is_err());
    }

    #[test]
    fn session_with_wrong_hash_length_is_rejected() {
        let record = SessionRecord {
            user_id: 1,
            token_hash: vec![0; 5],
            created_at: datetime!(2023-02-01 12:00 UTC),
            expires_after_seconds: None,
        };
        assert!(Session::try_from(record.clone()).is_err());

        let record = SessionRecord {
            token_hash: vec![0; 32],
            expires_after_seconds: Some(3600),
            ..record
        };
        let session = Session::try_from(record).unwrap();
        assert_eq!(session.expires_after, Some(time::Duration::hours(1)));
    }
}
