//! One-to-many traversal between entities.
//!
//! A [`Relation`] names the foreign-key column that links a child entity to
//! its parent. [`Database::list_by`] turns one into a [`Listing`]: a lazy,
//! restartable sequence that pages through the children in insertion
//! order.

use std::marker::PhantomData;

use rusqlite::ToSql;

use picnest_types::{
    Comment, Follower, Like, Message, Post, PostId, SavedPost, Story, UserId,
};

use crate::Database;
use crate::error::Result;
use crate::models::{Entity, RowId};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Children of type `E` owned by a parent identified by `P`.
pub struct Relation<P, E> {
    name: &'static str,
    column: &'static str,
    _marker: PhantomData<fn(P) -> E>,
}

impl<P, E> Clone for Relation<P, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, E> Copy for Relation<P, E> {}

impl<P, E> Relation<P, E> {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Foreign-key column on the child table.
    pub fn column(&self) -> &'static str {
        self.column
    }
}

// -- User --

pub const USER_POSTS: Relation<UserId, Post> = Relation::new("user.posts", "user_id");
pub const USER_COMMENTS: Relation<UserId, Comment> = Relation::new("user.comments", "user_id");
pub const USER_STORIES: Relation<UserId, Story> = Relation::new("user.stories", "user_id");
pub const USER_LIKES: Relation<UserId, Like> = Relation::new("user.likes", "user_id");
pub const USER_SENT_MESSAGES: Relation<UserId, Message> =
    Relation::new("user.sent_messages", "sender_id");
pub const USER_RECEIVED_MESSAGES: Relation<UserId, Message> =
    Relation::new("user.received_messages", "receiver_id");
pub const USER_SAVED_POSTS: Relation<UserId, SavedPost> =
    Relation::new("user.saved_posts", "user_id");
/// Edges where the user is the one being followed.
pub const USER_FOLLOWERS: Relation<UserId, Follower> = Relation::new("user.followers", "user_id");
/// Edges where the user is the follower.
pub const USER_FOLLOWING: Relation<UserId, Follower> =
    Relation::new("user.following", "follower_id");

// -- Post --

pub const POST_COMMENTS: Relation<PostId, Comment> = Relation::new("post.comments", "post_id");
pub const POST_LIKES: Relation<PostId, Like> = Relation::new("post.likes", "post_id");
pub const POST_SAVED_BY: Relation<PostId, SavedPost> = Relation::new("post.saved_by", "post_id");

/// Lazy sequence of related rows. Iterating it again starts over from the
/// first row; each page is a fresh read.
pub struct Listing<'db, E> {
    db: &'db Database,
    column: &'static str,
    parent: i64,
    filter: Option<(&'static str, String)>,
    page_size: usize,
    _marker: PhantomData<fn() -> E>,
}

impl<'db, E: Entity> Listing<'db, E> {
    pub(crate) fn new(db: &'db Database, column: &'static str, parent: i64) -> Self {
        Self {
            db,
            column,
            parent,
            filter: None,
            page_size: DEFAULT_PAGE_SIZE,
            _marker: PhantomData,
        }
    }

    /// Extra predicate; `clause` refers to its value as `?4`.
    pub(crate) fn filter(mut self, clause: &'static str, value: String) -> Self {
        self.filter = Some((clause, value));
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn iter(&self) -> ListingIter<'_, 'db, E> {
        ListingIter {
            listing: self,
            page: Vec::new().into_iter(),
            cursor: 0,
            exhausted: false,
        }
    }

    /// Drain the whole sequence, stopping at the first error.
    pub fn to_vec(&self) -> Result<Vec<E>> {
        self.iter().collect()
    }

    fn fetch_page(&self, after: i64) -> Result<Vec<E>> {
        let extra = match &self.filter {
            Some((clause, _)) => format!(" AND {}", clause),
            None => String::new(),
        };
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE \"{}\" = ?1 AND id > ?2{} ORDER BY id LIMIT ?3",
            E::COLUMNS,
            E::TABLE,
            self.column,
            extra
        );
        let limit = self.page_size as i64;

        self.db.with_conn(|conn| {
            let mut params: Vec<&dyn ToSql> = vec![&self.parent, &after, &limit];
            if let Some((_, value)) = &self.filter {
                params.push(value);
            }

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), E::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

impl<'a, 'db, E: Entity> IntoIterator for &'a Listing<'db, E> {
    type Item = Result<E>;
    type IntoIter = ListingIter<'a, 'db, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ListingIter<'a, 'db, E> {
    listing: &'a Listing<'db, E>,
    page: std::vec::IntoIter<E>,
    cursor: i64,
    exhausted: bool,
}

impl<E: Entity> Iterator for ListingIter<'_, '_, E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.page.next() {
                self.cursor = row.id().raw();
                return Some(Ok(row));
            }
            if self.exhausted {
                return None;
            }

            match self.listing.fetch_page(self.cursor) {
                Ok(rows) => {
                    if rows.len() < self.listing.page_size {
                        self.exhausted = true;
                    }
                    if rows.is_empty() {
                        return None;
                    }
                    self.page = rows.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl Database {
    /// Children of `parent` along `relation`, oldest first.
    pub fn list_by<P: RowId, E: Entity>(&self, parent: P, relation: Relation<P, E>) -> Listing<'_, E> {
        Listing::new(self, relation.column(), parent.raw())
    }
}
