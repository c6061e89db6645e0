use rusqlite::Connection;

use picnest_types::api::NewLike;
use picnest_types::{Like, LikeId, PostId};

use super::Insert;
use crate::clock::encode;
use crate::error::Result;
use crate::models::require;
use crate::validate;
use crate::{Database, WriteCtx};

/// No (user, post) uniqueness: repeated likes are separate rows.
impl Insert for NewLike {
    type Output = Like;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Like> {
        require(conn, self.user_id)?;
        require(conn, self.post_id)?;

        let timestamp = match self.timestamp {
            Some(ts) => validate::timestamp("like.timestamp", ts)?,
            None => ctx.now,
        };
        conn.execute(
            "INSERT INTO \"like\" (user_id, post_id, timestamp) VALUES (?1, ?2, ?3)",
            (self.user_id.0, self.post_id.0, encode(timestamp)),
        )?;

        Ok(Like {
            id: LikeId(conn.last_insert_rowid()),
            user_id: self.user_id,
            post_id: self.post_id,
            timestamp,
        })
    }
}

impl Database {
    pub fn like_count(&self, post_id: PostId) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM \"like\" WHERE post_id = ?1",
                [post_id.0],
                |r| r.get(0),
            )?;
            Ok(count)
        })
    }
}
