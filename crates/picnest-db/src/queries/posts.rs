use rusqlite::Connection;

use picnest_types::api::{NewPost, PostPatch};
use picnest_types::{Post, PostId};

use super::{Insert, Patch};
use crate::clock::encode;
use crate::error::Result;
use crate::models::{fetch, require};
use crate::validate;
use crate::WriteCtx;

impl Insert for NewPost {
    type Output = Post;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Post> {
        validate::text(ctx.schema, "post", "image_url", &self.image_url)?;
        validate::optional_text(ctx.schema, "post", "caption", self.caption.as_deref())?;
        require(conn, self.user_id)?;

        let timestamp = match self.timestamp {
            Some(ts) => validate::timestamp("post.timestamp", ts)?,
            None => ctx.now,
        };
        conn.execute(
            "INSERT INTO post (user_id, image_url, caption, timestamp) VALUES (?1, ?2, ?3, ?4)",
            (self.user_id.0, &self.image_url, &self.caption, encode(timestamp)),
        )?;

        Ok(Post {
            id: PostId(conn.last_insert_rowid()),
            user_id: self.user_id,
            image_url: self.image_url,
            caption: self.caption,
            timestamp,
        })
    }
}

impl Patch for PostPatch {
    type Target = Post;

    fn apply(self, conn: &Connection, ctx: &WriteCtx<'_>, id: PostId) -> Result<Post> {
        let mut post: Post = fetch(conn, id)?;

        if let Some(image_url) = self.image_url {
            validate::text(ctx.schema, "post", "image_url", &image_url)?;
            post.image_url = image_url;
        }
        if let Some(caption) = self.caption {
            validate::optional_text(ctx.schema, "post", "caption", caption.as_deref())?;
            post.caption = caption;
        }

        conn.execute(
            "UPDATE post SET image_url = ?1, caption = ?2 WHERE id = ?3",
            (&post.image_url, &post.caption, id.0),
        )?;
        Ok(post)
    }
}
