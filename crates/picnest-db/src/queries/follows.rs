use rusqlite::Connection;

use picnest_types::api::NewFollower;
use picnest_types::{Follower, FollowerId};

use super::Insert;
use crate::error::Result;
use crate::models::require;
use crate::WriteCtx;

/// Edges are not deduplicated and a user may follow themselves.
impl Insert for NewFollower {
    type Output = Follower;

    fn insert(self, conn: &Connection, _ctx: &WriteCtx<'_>) -> Result<Follower> {
        require(conn, self.user_id)?;
        require(conn, self.follower_id)?;

        conn.execute(
            "INSERT INTO follower (user_id, follower_id) VALUES (?1, ?2)",
            (self.user_id.0, self.follower_id.0),
        )?;

        Ok(Follower {
            id: FollowerId(conn.last_insert_rowid()),
            user_id: self.user_id,
            follower_id: self.follower_id,
        })
    }
}
