use crate::record::{CommentRecord, GroupRecord, PostRecord, SessionRecord, UserRecord};
use scrawl_common::model::{
    Id, ModelValidationError,
    auth::{Session, SessionTokenHash},
    comment::{Comment, CommentMarker, NewComment},
    group::{Group, GroupMarker, Slug},
    post::{NewPost, Post, PostMarker},
    user::{User, UserMarker, Username},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use time::{OffsetDateTime, UtcDateTime};

pub use sqlx::migrate::MigrateError;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Columns of the post/author/group join used by every feed query.
const POST_SELECT: &str = "
    SELECT
        posts.post_id, posts.text, posts.image, posts.published,
        users.user_id AS author_id, users.username,
        groups.group_id, groups.title AS group_title,
        groups.slug AS group_slug, groups.description AS group_description
    FROM posts
    JOIN users ON users.user_id = posts.author_id
    LEFT JOIN groups ON groups.group_id = posts.group_id
";

/// Feeds are reverse chronological, id as tiebreak for equal timestamps.
const POST_ORDER: &str = " ORDER BY posts.published DESC, posts.post_id DESC";

pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username FROM users WHERE user_id = $1",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::try_from).transpose()?)
    }

    pub async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username FROM users WHERE username = $1",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::try_from).transpose()?)
    }

    pub async fn fetch_group_by_slug(&self, slug: &Slug) -> Result<Option<Group>> {
        let record = sqlx::query_as::<_, GroupRecord>(
            "SELECT group_id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Group::try_from).transpose()?)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let query = format!("{POST_SELECT} WHERE posts.post_id = $1");
        let record = sqlx::query_as::<_, PostRecord>(&query)
            .bind(post_id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Post::try_from).transpose()?)
    }

    /// Home feed: every post, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let query = format!("{POST_SELECT}{POST_ORDER}");
        let records = sqlx::query_as::<_, PostRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        collect_posts(records)
    }

    pub async fn list_group_posts(&self, group_id: Id<GroupMarker>) -> Result<Vec<Post>> {
        let query = format!("{POST_SELECT} WHERE posts.group_id = $1{POST_ORDER}");
        let records = sqlx::query_as::<_, PostRecord>(&query)
            .bind(group_id.get())
            .fetch_all(&self.pool)
            .await?;

        collect_posts(records)
    }

    pub async fn list_author_posts(&self, author_id: Id<UserMarker>) -> Result<Vec<Post>> {
        let query = format!("{POST_SELECT} WHERE posts.author_id = $1{POST_ORDER}");
        let records = sqlx::query_as::<_, PostRecord>(&query)
            .bind(author_id.get())
            .fetch_all(&self.pool)
            .await?;

        collect_posts(records)
    }

    /// Posts by every author the given user follows, newest first.
    pub async fn list_followed_posts(&self, user_id: Id<UserMarker>) -> Result<Vec<Post>> {
        let query = format!(
            "{POST_SELECT} WHERE posts.author_id IN \
             (SELECT author_id FROM follows WHERE user_id = $1){POST_ORDER}"
        );
        let records = sqlx::query_as::<_, PostRecord>(&query)
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await?;

        collect_posts(records)
    }

    pub async fn count_author_posts(&self, author_id: Id<UserMarker>) -> Result<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE author_id = $1")
                .bind(author_id.get())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.cast_unsigned())
    }

    pub async fn create_post(
        &self,
        author_id: Id<UserMarker>,
        post: &NewPost,
        published: UtcDateTime,
    ) -> Result<Id<PostMarker>> {
        let post_id = sqlx::query_scalar::<_, i64>(
            "
            INSERT INTO posts (author_id, group_id, text, image, published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING post_id
            ",
        )
        .bind(author_id.get())
        .bind(post.group.map(Id::get))
        .bind(&post.text)
        .bind(post.image.as_deref())
        .bind(OffsetDateTime::from(published))
        .fetch_one(&self.pool)
        .await?;

        Ok(post_id.into())
    }

    /// Updates text, group and image in place; id, author and publication
    /// time are preserved.
    pub async fn update_post(&self, post_id: Id<PostMarker>, post: &NewPost) -> Result<()> {
        sqlx::query("UPDATE posts SET text = $2, group_id = $3, image = $4 WHERE post_id = $1")
            .bind(post_id.get())
            .bind(&post.text)
            .bind(post.group.map(Id::get))
            .bind(post.image.as_deref())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Comments of a post, oldest first.
    pub async fn list_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            "
            SELECT
                comments.comment_id, comments.post_id, comments.text, comments.created,
                users.user_id AS author_id, users.username
            FROM comments
            JOIN users ON users.user_id = comments.author_id
            WHERE comments.post_id = $1
            ORDER BY comments.created, comments.comment_id
            ",
        )
        .bind(post_id.get())
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(|record| Comment::try_from(record).map_err(DbError::from))
            .collect()
    }

    pub async fn create_comment(
        &self,
        post_id: Id<PostMarker>,
        author_id: Id<UserMarker>,
        comment: &NewComment,
    ) -> Result<Id<CommentMarker>> {
        let comment_id = sqlx::query_scalar::<_, i64>(
            "
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING comment_id
            ",
        )
        .bind(post_id.get())
        .bind(author_id.get())
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_id.into())
    }

    pub async fn is_following(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id.get())
        .bind(author_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Idempotent: an existing edge is left as is.
    pub async fn create_follow(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO follows (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id.get())
        .bind(author_id.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Idempotent: deleting a missing edge is a no-op.
    pub async fn delete_follow(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<()> {
        sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id.get())
            .bind(author_id.get())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "
            SELECT user_id, token_hash, created_at, expires_after_seconds
            FROM sessions
            WHERE token_hash = $1
            ",
        )
        .bind(&token_hash.0[..])
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Session::try_from).transpose()?)
    }
}

fn collect_posts(records: Vec<PostRecord>) -> Result<Vec<Post>> {
    records
        .into_iter()
        .map(|record| Post::try_from(record).map_err(DbError::from))
        .collect()
}
