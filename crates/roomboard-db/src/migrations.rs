use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const LATEST_VERSION: i64 = 2;

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;
    let tx = conn.transaction()?;

    if version < 1 {
        info!("DB: running migration v1 (interviewers table)");
        // IF NOT EXISTS adopts a store file created before versioning existed.
        tx.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS interviewers (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                room        TEXT NOT NULL,
                interviewee TEXT
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("DB: running migration v2 (updated_at, room index)");
        if !has_column(&tx, "interviewers", "updated_at")? {
            tx.execute_batch("ALTER TABLE interviewers ADD COLUMN updated_at INTEGER;")?;
        }
        tx.execute_batch(
            "
            -- Rows already busy get a start time so updated_at stays NULL iff interviewee is.
            UPDATE interviewers
               SET updated_at = CAST(strftime('%s', 'now') AS INTEGER) * 1000
             WHERE interviewee IS NOT NULL AND updated_at IS NULL;

            CREATE INDEX IF NOT EXISTS idx_interviewers_room ON interviewers(room);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    tx.commit()?;

    info!("Database migrations complete");
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

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}
