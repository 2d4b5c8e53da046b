use rusqlite::Connection;

use crate::error::Result;

/// Family member table. One row per person node; parent and spouse edges
/// are nullable self-references. `birth_date` is ISO-8601 text.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS family_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    family_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    gender TEXT,
    father_id INTEGER REFERENCES family_members(id),
    mother_id INTEGER REFERENCES family_members(id),
    spouse_id INTEGER REFERENCES family_members(id),
    is_registered INTEGER NOT NULL DEFAULT 0,
    standard_role TEXT,
    relationship TEXT,
    birth_date TEXT
);

CREATE INDEX IF NOT EXISTS idx_family_members_family ON family_members(family_id);
";

/// Create the schema if it does not exist. Safe to run on every startup.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
