use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::schema::Schema;

pub const CURRENT_VERSION: i64 = 1;

pub fn run(conn: &mut Connection, schema: &Schema) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 ({} tables)", schema.tables().len());
        let tx = conn.transaction()?;
        tx.execute_batch(&schema.ddl())?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", CURRENT_VERSION);
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}
