use rusqlite::Connection;

use picnest_types::api::{MessagePatch, NewMessage};
use picnest_types::{Message, MessageId};

use super::{Insert, Patch};
use crate::clock::encode;
use crate::error::Result;
use crate::models::{fetch, require};
use crate::validate;
use crate::WriteCtx;

impl Insert for NewMessage {
    type Output = Message;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Message> {
        validate::text(ctx.schema, "message", "content", &self.content)?;
        require(conn, self.sender_id)?;
        require(conn, self.receiver_id)?;

        let timestamp = match self.timestamp {
            Some(ts) => validate::timestamp("message.timestamp", ts)?,
            None => ctx.now,
        };
        conn.execute(
            "INSERT INTO message (sender_id, receiver_id, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
            (self.sender_id.0, self.receiver_id.0, &self.content, encode(timestamp)),
        )?;

        Ok(Message {
            id: MessageId(conn.last_insert_rowid()),
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            timestamp,
        })
    }
}

impl Patch for MessagePatch {
    type Target = Message;

    fn apply(self, conn: &Connection, ctx: &WriteCtx<'_>, id: MessageId) -> Result<Message> {
        let mut message: Message = fetch(conn, id)?;

        if let Some(content) = self.content {
            validate::text(ctx.schema, "message", "content", &content)?;
            message.content = content;
        }

        conn.execute(
            "UPDATE message SET content = ?1 WHERE id = ?2",
            (&message.content, id.0),
        )?;
        Ok(message)
    }
}
