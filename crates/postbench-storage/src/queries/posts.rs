// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The post mutation: upsert the user, append the post, in one IMMEDIATE
//! transaction.
//!
//! These functions take the connection directly and are only ever called on
//! the writer thread.

use postbench_core::{NewPost, Post, WriteError};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use crate::database::map_write_err;

pub const INSERT_USER: &str = "INSERT OR IGNORE INTO users (email) VALUES (?1)";

pub const INSERT_POST: &str = "
INSERT INTO posts   (content,   user_id)
SELECT              ?1,         id
FROM        users
WHERE       email = ?2
RETURNING   id, user_id, content, created_at, updated_at
";

/// Compile both statements into the connection's statement cache.
///
/// Called once at writer startup so a broken schema fails the process
/// instead of every request.
pub fn prepare(conn: &Connection) -> rusqlite::Result<()> {
    conn.prepare_cached(INSERT_USER)?;
    conn.prepare_cached(INSERT_POST)?;
    Ok(())
}

/// Run `exec` inside `BEGIN IMMEDIATE ... COMMIT`.
///
/// Write intent is taken at BEGIN, so the upsert and the insert never have
/// to upgrade a read lock. On `Err` the transaction is dropped, which rolls
/// it back.
pub fn immediate_tx<T, F>(conn: &mut Connection, exec: F) -> Result<T, WriteError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, WriteError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(map_write_err)?;
    let value = exec(&tx)?;
    tx.commit().map_err(map_write_err)?;
    Ok(value)
}

/// Insert the user if absent, then insert the post joined on the email.
///
/// A post insert that returns no row means the join found no user inside
/// our own transaction; it is reported as a constraint failure and nothing
/// is committed.
pub fn create_post(conn: &mut Connection, np: &NewPost) -> Result<Post, WriteError> {
    immediate_tx(conn, |tx| {
        tx.prepare_cached(INSERT_USER)
            .and_then(|mut stmt| stmt.execute(params![np.email]))
            .map_err(map_write_err)?;

        let post = tx
            .prepare_cached(INSERT_POST)
            .and_then(|mut stmt| {
                stmt.query_row(params![np.content, np.email], post_from_row)
                    .optional()
            })
            .map_err(map_write_err)?;

        post.ok_or_else(|| {
            WriteError::Constraint(format!(
                "post insert affected zero rows: no user matched email `{}`",
                np.email
            ))
        })
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use postbench_config::model::StorageConfig;
    use tempfile::tempdir;

    fn open(dir: &tempfile::TempDir) -> Connection {
        let config = StorageConfig {
            database_path: dir.path().join("q.sqlite").to_str().unwrap().to_string(),
            busy_timeout_ms: 1_000,
        };
        Database::open(&config).unwrap().into_connection()
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn statements_prepare_against_schema() {
        let dir = tempdir().unwrap();
        let conn = open(&dir);
        prepare(&conn).unwrap();
    }

    #[test]
    fn create_post_upserts_user_once() {
        let dir = tempdir().unwrap();
        let mut conn = open(&dir);

        let first = create_post(&mut conn, &NewPost::new("a@b.com", "hi")).unwrap();
        let second = create_post(&mut conn, &NewPost::new("a@b.com", "bye")).unwrap();

        assert_eq!(first.user_id, second.user_id);
        assert!(second.id > first.id);
        assert_eq!(second.content, "bye");
        assert!(first.created_at > 0);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(count(&conn, "users"), 1);
        assert_eq!(count(&conn, "posts"), 2);
    }

    #[test]
    fn check_violation_rolls_back_user_upsert() {
        let dir = tempdir().unwrap();
        let mut conn = open(&dir);

        let err = create_post(&mut conn, &NewPost::new("new@b.com", "")).unwrap_err();
        assert!(matches!(err, WriteError::Constraint(_)), "got {err:?}");
        assert_eq!(count(&conn, "users"), 0);
        assert_eq!(count(&conn, "posts"), 0);
        assert!(conn.is_autocommit(), "no transaction may be left open");
    }

    #[test]
    fn zero_row_insert_is_constraint_failure() {
        let dir = tempdir().unwrap();
        let mut conn = open(&dir);
        conn.execute_batch(
            "CREATE TRIGGER vanish_user AFTER INSERT ON users
             BEGIN DELETE FROM users WHERE id = NEW.id; END;",
        )
        .unwrap();

        let err = create_post(&mut conn, &NewPost::new("ghost@b.com", "boo")).unwrap_err();
        match err {
            WriteError::Constraint(msg) => assert!(msg.contains("zero rows")),
            other => panic!("expected Constraint, got {other:?}"),
        }
        assert_eq!(count(&conn, "posts"), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn immediate_tx_rolls_back_on_error() {
        let dir = tempdir().unwrap();
        let mut conn = open(&dir);

        let result: Result<(), WriteError> = immediate_tx(&mut conn, |tx| {
            tx.execute("INSERT INTO users (email) VALUES ('x@y.com')", [])
                .map_err(map_write_err)?;
            Err(WriteError::Constraint("forced".into()))
        });
        assert!(result.is_err());
        assert_eq!(count(&conn, "users"), 0);
    }
}
