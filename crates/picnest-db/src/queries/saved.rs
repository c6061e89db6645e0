use rusqlite::Connection;

use picnest_types::api::NewSavedPost;
use picnest_types::{SavedPost, SavedPostId};

use super::Insert;
use crate::clock::encode;
use crate::error::Result;
use crate::models::require;
use crate::validate;
use crate::WriteCtx;

impl Insert for NewSavedPost {
    type Output = SavedPost;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<SavedPost> {
        require(conn, self.user_id)?;
        require(conn, self.post_id)?;

        let saved_at = match self.saved_at {
            Some(ts) => validate::timestamp("saved_post.saved_at", ts)?,
            None => ctx.now,
        };
        conn.execute(
            "INSERT INTO saved_post (user_id, post_id, saved_at) VALUES (?1, ?2, ?3)",
            (self.user_id.0, self.post_id.0, encode(saved_at)),
        )?;

        Ok(SavedPost {
            id: SavedPostId(conn.last_insert_rowid()),
            user_id: self.user_id,
            post_id: self.post_id,
            saved_at,
        })
    }
}
