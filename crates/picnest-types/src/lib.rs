//! Entity and payload types shared by the picnest store and its callers.
//! Kept free of any storage dependency.

pub mod api;
pub mod ids;
pub mod models;

pub use ids::{CommentId, FollowerId, LikeId, MessageId, PostId, SavedPostId, StoryId, UserId};
pub use models::{Comment, Follower, Like, Message, Post, SavedPost, Story, User};
