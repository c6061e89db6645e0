//! Insert payloads (`New*`) and partial updates (`*Patch`).
//!
//! Patches only carry the mutable columns of each entity. Foreign keys and
//! timestamps have no patch field, and `deny_unknown_fields` makes a JSON
//! patch naming one of them fail to parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{PostId, UserId};

// -- Inserts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// PHC-format password hash.
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password_hash.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPost {
    pub user_id: UserId,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Defaults to the store clock when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn new(user_id: UserId, image_url: impl Into<String>) -> Self {
        Self {
            user_id,
            image_url: image_url.into(),
            caption: None,
            timestamp: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewComment {
    pub fn new(post_id: PostId, user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            post_id,
            user_id,
            text: text.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFollower {
    /// The user being followed.
    pub user_id: UserId,
    pub follower_id: UserId,
}

impl NewFollower {
    /// `follower` starts following `followed`.
    pub fn new(followed: UserId, follower: UserId) -> Self {
        Self {
            user_id: followed,
            follower_id: follower,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLike {
    pub user_id: UserId,
    pub post_id: PostId,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewLike {
    pub fn new(user_id: UserId, post_id: PostId) -> Self {
        Self {
            user_id,
            post_id,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStory {
    pub user_id: UserId,
    pub media_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Creation time; `expires_at` is derived from it.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewStory {
    pub fn new(user_id: UserId, media_url: impl Into<String>) -> Self {
        Self {
            user_id,
            media_url: media_url.into(),
            caption: None,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn new(sender_id: UserId, receiver_id: UserId, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            receiver_id,
            content: content.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSavedPost {
    pub user_id: UserId,
    pub post_id: PostId,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl NewSavedPost {
    pub fn new(user_id: UserId, post_id: PostId) -> Self {
        Self {
            user_id,
            post_id,
            saved_at: None,
        }
    }
}

// -- Patches --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Replacement PHC hash.
    #[serde(default)]
    pub password: Option<String>,
}

/// `caption: Some(None)` clears the caption; `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub caption: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentPatch {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryPatch {
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub caption: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagePatch {
    #[serde(default)]
    pub content: Option<String>,
}

/// Distinguishes an explicit `null` (clear) from an absent key (keep).
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_patch_caption_states() {
        let keep: PostPatch = serde_json::from_str(r#"{"image_url":"b.png"}"#).unwrap();
        assert!(keep.caption.is_none());
        assert_eq!(keep.image_url.as_deref(), Some("b.png"));

        let clear: PostPatch = serde_json::from_str(r#"{"caption":null}"#).unwrap();
        assert_eq!(clear.caption, Some(None));

        let set: PostPatch = serde_json::from_str(r#"{"caption":"sunset"}"#).unwrap();
        assert_eq!(set.caption, Some(Some("sunset".to_string())));
    }

    #[test]
    fn test_patch_rejects_foreign_key_fields() {
        let err = serde_json::from_str::<CommentPatch>(r#"{"post_id":9,"text":"x"}"#);
        assert!(err.is_err());

        let err = serde_json::from_str::<MessagePatch>(r#"{"sender_id":1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_new_post_timestamp_optional() {
        let post: NewPost = serde_json::from_str(r#"{"user_id":1,"image_url":"a.png"}"#).unwrap();
        assert_eq!(post.user_id, UserId(1));
        assert!(post.timestamp.is_none());
        assert!(post.caption.is_none());
    }
}
