use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{
    CommentId, FollowerId, LikeId, MessageId, PostId, SavedPostId, StoryId, UserId,
};

/// A registered account. `password` always holds a PHC hash string,
/// never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub image_url: String,
    pub caption: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Directed follow edge: `follower_id` follows `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: FollowerId,
    /// The user being followed.
    pub user_id: UserId,
    /// The user doing the following.
    pub follower_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub timestamp: DateTime<Utc>,
}

/// Ephemeral content. `expires_at` is fixed when the row is created and
/// never re-evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub user_id: UserId,
    pub media_url: String,
    pub caption: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Story {
    /// A story is expired once `now` reaches `expires_at`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Direct message from `sender_id` to `receiver_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPost {
    pub id: SavedPostId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_story_activity_boundary() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let story = Story {
            id: StoryId(1),
            user_id: UserId(1),
            media_url: "clip.mp4".into(),
            caption: None,
            timestamp: created,
            expires_at: created + Duration::hours(24),
        };

        assert!(story.is_active_at(created));
        assert!(story.is_active_at(created + Duration::hours(24) - Duration::seconds(1)));
        assert!(!story.is_active_at(created + Duration::hours(24)));
    }

    #[test]
    fn test_user_password_not_serialized() {
        let user = User {
            id: UserId(3),
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "$argon2id$secret".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }
}
