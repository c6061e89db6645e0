//! Row mapping between SQLite and the picnest-types entities.

use std::fmt;

use rusqlite::{Connection, OptionalExtension, Row};

use picnest_types::{
    Comment, CommentId, Follower, FollowerId, Like, LikeId, Message, MessageId, Post, PostId,
    SavedPost, SavedPostId, Story, StoryId, User, UserId,
};

use crate::clock::decode;
use crate::error::{Result, StoreError};

/// A stored entity: which table it lives in and how to read a row of it.
pub trait Entity: Sized {
    type Id: RowId<Entity = Self>;

    const TABLE: &'static str;
    /// Select list, in the order `from_row` reads it.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn id(&self) -> Self::Id;
}

/// Typed primary key. Resolves an id back to its entity type.
pub trait RowId: Copy + fmt::Display {
    type Entity: Entity<Id = Self>;

    fn raw(self) -> i64;
}

macro_rules! row_id {
    ($id:ty => $entity:ty) => {
        impl RowId for $id {
            type Entity = $entity;

            fn raw(self) -> i64 {
                self.0
            }
        }
    };
}

row_id!(UserId => User);
row_id!(PostId => Post);
row_id!(CommentId => Comment);
row_id!(FollowerId => Follower);
row_id!(LikeId => Like);
row_id!(StoryId => Story);
row_id!(MessageId => Message);
row_id!(SavedPostId => SavedPost);

impl Entity for User {
    type Id = UserId;
    const TABLE: &'static str = "user";
    const COLUMNS: &'static str = "id, username, email, password";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: UserId(row.get(0)?),
            username: row.get(1)?,
            email: row.get(2)?,
            password: row.get(3)?,
        })
    }

    fn id(&self) -> UserId {
        self.id
    }
}

impl Entity for Post {
    type Id = PostId;
    const TABLE: &'static str = "post";
    const COLUMNS: &'static str = "id, user_id, image_url, caption, timestamp";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Post {
            id: PostId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            image_url: row.get(2)?,
            caption: row.get(3)?,
            timestamp: decode(4, &row.get::<_, String>(4)?)?,
        })
    }

    fn id(&self) -> PostId {
        self.id
    }
}

impl Entity for Comment {
    type Id = CommentId;
    const TABLE: &'static str = "comment";
    const COLUMNS: &'static str = "id, post_id, user_id, text, timestamp";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: CommentId(row.get(0)?),
            post_id: PostId(row.get(1)?),
            user_id: UserId(row.get(2)?),
            text: row.get(3)?,
            timestamp: decode(4, &row.get::<_, String>(4)?)?,
        })
    }

    fn id(&self) -> CommentId {
        self.id
    }
}

impl Entity for Follower {
    type Id = FollowerId;
    const TABLE: &'static str = "follower";
    const COLUMNS: &'static str = "id, user_id, follower_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Follower {
            id: FollowerId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            follower_id: UserId(row.get(2)?),
        })
    }

    fn id(&self) -> FollowerId {
        self.id
    }
}

impl Entity for Like {
    type Id = LikeId;
    const TABLE: &'static str = "like";
    const COLUMNS: &'static str = "id, user_id, post_id, timestamp";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Like {
            id: LikeId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            post_id: PostId(row.get(2)?),
            timestamp: decode(3, &row.get::<_, String>(3)?)?,
        })
    }

    fn id(&self) -> LikeId {
        self.id
    }
}

impl Entity for Story {
    type Id = StoryId;
    const TABLE: &'static str = "story";
    const COLUMNS: &'static str = "id, user_id, media_url, caption, timestamp, expires_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Story {
            id: StoryId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            media_url: row.get(2)?,
            caption: row.get(3)?,
            timestamp: decode(4, &row.get::<_, String>(4)?)?,
            expires_at: decode(5, &row.get::<_, String>(5)?)?,
        })
    }

    fn id(&self) -> StoryId {
        self.id
    }
}

impl Entity for Message {
    type Id = MessageId;
    const TABLE: &'static str = "message";
    const COLUMNS: &'static str = "id, sender_id, receiver_id, content, timestamp";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Message {
            id: MessageId(row.get(0)?),
            sender_id: UserId(row.get(1)?),
            receiver_id: UserId(row.get(2)?),
            content: row.get(3)?,
            timestamp: decode(4, &row.get::<_, String>(4)?)?,
        })
    }

    fn id(&self) -> MessageId {
        self.id
    }
}

impl Entity for SavedPost {
    type Id = SavedPostId;
    const TABLE: &'static str = "saved_post";
    const COLUMNS: &'static str = "id, user_id, post_id, saved_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SavedPost {
            id: SavedPostId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            post_id: PostId(row.get(2)?),
            saved_at: decode(3, &row.get::<_, String>(3)?)?,
        })
    }

    fn id(&self) -> SavedPostId {
        self.id
    }
}

pub(crate) fn fetch_optional<E: Entity>(conn: &Connection, id: E::Id) -> Result<Option<E>> {
    let sql = format!("SELECT {} FROM \"{}\" WHERE id = ?1", E::COLUMNS, E::TABLE);
    let row = conn.query_row(&sql, [id.raw()], E::from_row).optional()?;
    Ok(row)
}

pub(crate) fn fetch<E: Entity>(conn: &Connection, id: E::Id) -> Result<E> {
    fetch_optional(conn, id)?.ok_or(StoreError::NotFound {
        entity: E::TABLE,
        id: id.raw(),
    })
}

/// `NotFound` unless the row behind `id` exists.
pub(crate) fn require<Id: RowId>(conn: &Connection, id: Id) -> Result<()> {
    let table = <Id::Entity as Entity>::TABLE;
    let sql = format!("SELECT 1 FROM \"{}\" WHERE id = ?1", table);
    let found: Option<i64> = conn.query_row(&sql, [id.raw()], |r| r.get(0)).optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound {
            entity: table,
            id: id.raw(),
        }),
    }
}
