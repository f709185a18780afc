use ::duckdb::{Connection, ToSql};

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_stocks_schema",
        sql: r#"
CREATE SCHEMA IF NOT EXISTS stocks;

CREATE TABLE IF NOT EXISTS ingest_log (
    run_id TEXT NOT NULL,
    symbol TEXT NOT NULL,
    status TEXT NOT NULL,
    detail TEXT,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_ingest_log_run_symbol ON ingest_log(run_id, symbol);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let params: [&dyn ToSql; 1] = [&migration.version];
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                params.as_slice(),
            )?;
        }
    }

    Ok(())
}

/// DDL for one ticker's daily price table, keyed by an already-quoted identifier.
pub(crate) fn price_table_ddl(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
    "Date" DATE NOT NULL,
    "Open" DOUBLE NOT NULL,
    "High" DOUBLE NOT NULL,
    "Low" DOUBLE NOT NULL,
    "Close" DOUBLE NOT NULL,
    "Volume" BIGINT NOT NULL,
    "Dividends" DOUBLE NOT NULL,
    "Stock_Splits" DOUBLE NOT NULL,
    date_modification TIMESTAMP
);"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let connection = Connection::open_in_memory().expect("in-memory db");
        apply_migrations(&connection).expect("first apply");
        apply_migrations(&connection).expect("second apply");

        let versions: i64 = connection
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .expect("count");
        assert_eq!(versions, MIGRATIONS.len() as i64);
    }
}
