use rusqlite::{Connection, OptionalExtension};

use picnest_types::api::{NewUser, UserPatch};
use picnest_types::{User, UserId};

use super::{Insert, Patch};
use crate::error::{Result, StoreError};
use crate::models::{Entity, fetch};
use crate::validate;
use crate::{Database, WriteCtx};

impl Insert for NewUser {
    type Output = User;

    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<User> {
        validate::text(ctx.schema, "user", "username", &self.username)?;
        validate::text(ctx.schema, "user", "email", &self.email)?;
        validate::password_hash(ctx.schema, &self.password)?;

        ensure_unique(conn, "username", &self.username, None)?;
        ensure_unique(conn, "email", &self.email, None)?;

        conn.execute(
            "INSERT INTO \"user\" (username, email, password) VALUES (?1, ?2, ?3)",
            (&self.username, &self.email, &self.password),
        )?;

        Ok(User {
            id: UserId(conn.last_insert_rowid()),
            username: self.username,
            email: self.email,
            password: self.password,
        })
    }
}

impl Patch for UserPatch {
    type Target = User;

    fn apply(self, conn: &Connection, ctx: &WriteCtx<'_>, id: UserId) -> Result<User> {
        let mut user: User = fetch(conn, id)?;

        if let Some(username) = self.username {
            validate::text(ctx.schema, "user", "username", &username)?;
            ensure_unique(conn, "username", &username, Some(id))?;
            user.username = username;
        }
        if let Some(email) = self.email {
            validate::text(ctx.schema, "user", "email", &email)?;
            ensure_unique(conn, "email", &email, Some(id))?;
            user.email = email;
        }
        if let Some(password) = self.password {
            validate::password_hash(ctx.schema, &password)?;
            user.password = password;
        }

        conn.execute(
            "UPDATE \"user\" SET username = ?1, email = ?2, password = ?3 WHERE id = ?4",
            (&user.username, &user.email, &user.password, id.0),
        )?;
        Ok(user)
    }
}

/// `Conflict` if another user already holds `value` in `column`.
fn ensure_unique(conn: &Connection, column: &str, value: &str, except: Option<UserId>) -> Result<()> {
    let sql = format!("SELECT id FROM \"user\" WHERE \"{}\" = ?1", column);
    let holder: Option<i64> = conn.query_row(&sql, [value], |r| r.get(0)).optional()?;

    match holder {
        Some(holder) if Some(UserId(holder)) != except => Err(StoreError::Conflict(format!(
            "{} '{}' is already taken",
            column, value
        ))),
        _ => Ok(()),
    }
}

impl Database {
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM \"user\" WHERE username = ?1", User::COLUMNS);
            let user = conn.query_row(&sql, [username], User::from_row).optional()?;
            Ok(user)
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM \"user\" WHERE email = ?1", User::COLUMNS);
            let user = conn.query_row(&sql, [email], User::from_row).optional()?;
            Ok(user)
        })
    }

    /// Users following `user_id`.
    pub fn follower_users(&self, user_id: UserId) -> Result<Vec<User>> {
        self.users_across_edges(user_id, "user_id", "follower_id")
    }

    /// Users that `user_id` follows.
    pub fn followed_users(&self, user_id: UserId) -> Result<Vec<User>> {
        self.users_across_edges(user_id, "follower_id", "user_id")
    }

    /// One row per edge, in edge insertion order; duplicate edges repeat
    /// the user.
    fn users_across_edges(&self, user_id: UserId, from: &str, to: &str) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT u.id, u.username, u.email, u.password
                 FROM follower f
                 JOIN \"user\" u ON u.id = f.\"{to}\"
                 WHERE f.\"{from}\" = ?1
                 ORDER BY f.id",
            );
            let mut stmt = conn.prepare(&sql)?;
            let users = stmt
                .query_map([user_id.0], User::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }
}
