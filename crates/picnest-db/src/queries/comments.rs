use rusqlite::Connection;

use picnest_types::api::{CommentPatch, NewComment};
use picnest_types::{Comment, CommentId};

use super::{Insert, Patch};
use crate::clock::encode;
use crate::error::Result;
use crate::models::{fetch, require};
use crate::validate;
use crate::WriteCtx;

impl Insert for NewComment {
    type Output = Comment;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Comment> {
        validate::text(ctx.schema, "comment", "text", &self.text)?;
        require(conn, self.post_id)?;
        require(conn, self.user_id)?;

        let timestamp = match self.timestamp {
            Some(ts) => validate::timestamp("comment.timestamp", ts)?,
            None => ctx.now,
        };
        conn.execute(
            "INSERT INTO comment (post_id, user_id, text, timestamp) VALUES (?1, ?2, ?3, ?4)",
            (self.post_id.0, self.user_id.0, &self.text, encode(timestamp)),
        )?;

        Ok(Comment {
            id: CommentId(conn.last_insert_rowid()),
            post_id: self.post_id,
            user_id: self.user_id,
            text: self.text,
            timestamp,
        })
    }
}

impl Patch for CommentPatch {
    type Target = Comment;

    fn apply(self, conn: &Connection, ctx: &WriteCtx<'_>, id: CommentId) -> Result<Comment> {
        let mut comment: Comment = fetch(conn, id)?;

        if let Some(text) = self.text {
            validate::text(ctx.schema, "comment", "text", &text)?;
            comment.text = text;
        }

        conn.execute(
            "UPDATE comment SET text = ?1 WHERE id = ?2",
            (&comment.text, id.0),
        )?;
        Ok(comment)
    }
}
