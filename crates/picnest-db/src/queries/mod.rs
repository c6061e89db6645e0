//! CRUD for every entity. Each submodule implements [`Insert`] and, where
//! the entity has mutable columns, [`Patch`] for its payload types.

mod comments;
mod follows;
mod likes;
mod messages;
mod posts;
mod saved;
mod stories;
mod users;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::models::{Entity, RowId, fetch, require};
use crate::schema::Schema;
use crate::{Database, WriteCtx};

/// A payload that can be inserted as a new row.
pub trait Insert {
    type Output: Entity;

    /// Validate and insert. Runs inside the caller's write transaction.
    fn insert(self, conn: &Connection, ctx: &WriteCtx<'_>) -> Result<Self::Output>;
}

/// A partial update over the mutable columns of one entity.
pub trait Patch {
    type Target: Entity;

    fn apply(
        self,
        conn: &Connection,
        ctx: &WriteCtx<'_>,
        id: <Self::Target as Entity>::Id,
    ) -> Result<Self::Target>;
}

/// What happens to rows that reference the one being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Refuse with `Conflict` while any dependent row exists.
    #[default]
    Restrict,
    /// Delete every dependent row, transitively, in the same transaction.
    Cascade,
}

impl Database {
    pub fn create<I: Insert>(&self, input: I) -> Result<I::Output> {
        let row = self.with_tx(|conn, ctx| input.insert(conn, ctx))?;
        debug!("Created {} {}", <I::Output as Entity>::TABLE, row.id());
        Ok(row)
    }

    pub fn get<Id: RowId>(&self, id: Id) -> Result<Id::Entity> {
        self.with_conn(|conn| fetch(conn, id))
    }

    pub fn update<P: Patch>(&self, id: <P::Target as Entity>::Id, patch: P) -> Result<P::Target> {
        let row = self.with_tx(|conn, ctx| patch.apply(conn, ctx, id))?;
        debug!("Updated {} {}", <P::Target as Entity>::TABLE, id);
        Ok(row)
    }

    pub fn delete<Id: RowId>(&self, id: Id, policy: DeletePolicy) -> Result<()> {
        let table = <Id::Entity as Entity>::TABLE;
        let removed = self.with_tx(|conn, ctx| {
            require(conn, id)?;
            delete_row(conn, ctx.schema, table, id.raw(), policy)
        });
        match removed {
            Ok(count) => {
                debug!("Deleted {} {} ({} rows, {:?})", table, id, count, policy);
                Ok(())
            }
            Err(e) => {
                if matches!(e, StoreError::Conflict(_)) {
                    warn!("Delete of {} {} blocked: {}", table, id, e);
                }
                Err(e)
            }
        }
    }
}

/// Delete one row after resolving its dependents per `policy`. Returns the
/// number of rows removed, dependents included.
fn delete_row(
    conn: &Connection,
    schema: &Schema,
    table: &str,
    id: i64,
    policy: DeletePolicy,
) -> Result<usize> {
    let mut removed = 0;
    let mut blocking = Vec::new();

    for (dep_table, column) in schema.dependents_of(table) {
        match policy {
            DeletePolicy::Restrict => {
                let sql = format!(
                    "SELECT COUNT(*) FROM \"{}\" WHERE \"{}\" = ?1",
                    dep_table.name, column.name
                );
                let count: i64 = conn.query_row(&sql, [id], |r| r.get(0))?;
                if count > 0 {
                    blocking.push(format!("{} {}.{}", count, dep_table.name, column.name));
                }
            }
            DeletePolicy::Cascade => {
                let sql = format!(
                    "SELECT id FROM \"{}\" WHERE \"{}\" = ?1",
                    dep_table.name, column.name
                );
                let mut stmt = conn.prepare(&sql)?;
                let children = stmt
                    .query_map([id], |r| r.get::<_, i64>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                for child in children {
                    removed += delete_row(conn, schema, dep_table.name, child, policy)?;
                }
            }
        }
    }

    if !blocking.is_empty() {
        return Err(StoreError::Conflict(format!(
            "{} {} is still referenced by {}",
            table,
            id,
            blocking.join(", ")
        )));
    }

    let sql = format!("DELETE FROM \"{}\" WHERE id = ?1", table);
    removed += conn.execute(&sql, [id])?;
    Ok(removed)
}
