use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Primary key of a `user` row.
    UserId
);
id_type!(
    /// Primary key of a `post` row.
    PostId
);
id_type!(CommentId);
id_type!(
    /// Primary key of a `follower` edge row (not a user id).
    FollowerId
);
id_type!(LikeId);
id_type!(StoryId);
id_type!(MessageId);
id_type!(SavedPostId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");

        let back: PostId = serde_json::from_str("7").unwrap();
        assert_eq!(back, PostId(7));
        assert_eq!(back.to_string(), "7");
    }
}
