//! SQLite database: schema and shared helpers

use std::future::Future;

use rusqlite::{Connection, ErrorCode};

use super::pool::{DbPool, PoolConfig};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::generate_id;

/// How many times a colliding random id is regenerated before giving up
const MAX_ID_ATTEMPTS: usize = 5;

/// Handle to the users / routes / favorite_routes tables
#[derive(Clone)]
pub struct Database {
    pub(super) pool: DbPool,
}

impl Database {
    /// Open (or create) the database described by `config` and apply the schema
    pub fn open(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.database_url)?;

        let pool_config = PoolConfig::new(config.db_path())
            .with_max_size(config.pool.max_size)
            .with_connection_timeout(config.connection_timeout());

        Self::with_pool(DbPool::new(&pool_config)?)
    }

    /// Wrap an existing pool and apply the schema
    pub fn with_pool(pool: DbPool) -> Result<Self> {
        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("Database schema ready");
        Ok(())
    }

    pub(super) async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.pool.run(f).await
    }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at TEXT NOT NULL,
    token TEXT
);

CREATE TABLE IF NOT EXISTS routes (
    route_id TEXT PRIMARY KEY,
    created_by TEXT NOT NULL,
    route_name TEXT NOT NULL,
    start_city TEXT NOT NULL,
    start_location TEXT NOT NULL,
    coordinates TEXT NOT NULL,
    polyline_encoded TEXT NOT NULL,
    img_url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_routes_city ON routes(start_city);
CREATE INDEX IF NOT EXISTS idx_routes_created_by ON routes(created_by);

CREATE TABLE IF NOT EXISTS favorite_routes (
    route_id TEXT NOT NULL REFERENCES routes(route_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    route_name TEXT NOT NULL,
    username TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (route_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_favorite_routes_user ON favorite_routes(user_id);
"#;

/// If `err` is a constraint violation, the SQLite message naming the columns
/// (e.g. `UNIQUE constraint failed: users.email`)
pub(super) fn constraint_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            Some(msg.as_str())
        }
        _ => None,
    }
}

/// Run `attempt` with fresh random ids until it stops reporting an id collision
pub async fn with_fresh_id<T, F, Fut>(mut attempt: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last = String::new();
    for _ in 0..MAX_ID_ATTEMPTS {
        match attempt(generate_id()).await {
            Err(Error::IdCollision(id)) => {
                tracing::debug!(%id, "Generated id already taken, retrying");
                last = id;
            }
            other => return other,
        }
    }
    Err(Error::IdCollision(last))
}
