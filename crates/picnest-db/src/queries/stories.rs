use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::info;

use picnest_types::api::{NewStory, StoryPatch};
use picnest_types::{Story, StoryId, UserId};

use super::{Insert, Patch};
use crate::clock::{encode, encode_bound, story_expiry};
use crate::error::{Result, StoreError};
use crate::models::{fetch, require};
use crate::relations::{Listing, USER_STORIES};
use crate::validate;
use crate::{Database, WriteCtx};

impl Insert for NewStory {
    type Output = Story;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Story> {
        validate::text(ctx.schema, "story", "media_url", &self.media_url)?;
        validate::optional_text(ctx.schema, "story", "caption", self.caption.as_deref())?;
        require(conn, self.user_id)?;

        let timestamp = match self.timestamp {
            Some(ts) => validate::timestamp("story.timestamp", ts)?,
            None => ctx.now,
        };
        let expires_at = story_expiry(timestamp)
            .ok_or_else(|| StoreError::validation("story.timestamp", "expiry is out of range"))
            .and_then(|at| validate::timestamp("story.timestamp", at))?;
        conn.execute(
            "INSERT INTO story (user_id, media_url, caption, timestamp, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                self.user_id.0,
                &self.media_url,
                &self.caption,
                encode(timestamp),
                encode(expires_at),
            ),
        )?;

        Ok(Story {
            id: StoryId(conn.last_insert_rowid()),
            user_id: self.user_id,
            media_url: self.media_url,
            caption: self.caption,
            timestamp,
            expires_at,
        })
    }
}

/// `expires_at` stays put even when the media is swapped.
impl Patch for StoryPatch {
    type Target = Story;

    fn apply(self, conn: &Connection, ctx: &WriteCtx<'_>, id: StoryId) -> Result<Story> {
        let mut story: Story = fetch(conn, id)?;

        if let Some(media_url) = self.media_url {
            validate::text(ctx.schema, "story", "media_url", &media_url)?;
            story.media_url = media_url;
        }
        if let Some(caption) = self.caption {
            validate::optional_text(ctx.schema, "story", "caption", caption.as_deref())?;
            story.caption = caption;
        }

        conn.execute(
            "UPDATE story SET media_url = ?1, caption = ?2 WHERE id = ?3",
            (&story.media_url, &story.caption, id.0),
        )?;
        Ok(story)
    }
}

impl Database {
    /// Stories of `user_id` still visible at `now` (`now < expires_at`).
    /// Expired rows are skipped, not removed.
    pub fn active_stories(&self, user_id: UserId, now: DateTime<Utc>) -> Listing<'_, Story> {
        self.list_by(user_id, USER_STORIES)
            .filter("expires_at > ?4", encode_bound(now))
    }

    /// Delete every story with `expires_at <= now`. Returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = encode_bound(now);
        let purged = self.with_tx(|conn, _ctx| {
            let purged = conn.execute("DELETE FROM story WHERE expires_at <= ?1", [&cutoff])?;
            Ok(purged)
        })?;

        if purged > 0 {
            info!("Purged {} expired stories", purged);
        }
        Ok(purged)
    }
}
