//! SQLite result store

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use triager_common::{ProbeResult, ProbeTarget, ResultStore, TriagerError, TriagerResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://triager.db";

const CREATE_HOSTS: &str = "CREATE TABLE IF NOT EXISTS hosts (
    domain      TEXT    NOT NULL,
    ip_address  TEXT    NOT NULL,
    port        INTEGER NOT NULL,
    proto       TEXT    NOT NULL,
    httprescode TEXT    NOT NULL,
    httpheader  TEXT    NOT NULL,
    httpbody    TEXT    NOT NULL,
    respsize    INTEGER NOT NULL,
    last_seen   TEXT    NOT NULL,
    UNIQUE (domain, port, proto)
)";

const UPSERT_HOST: &str = "INSERT INTO hosts
    (domain, ip_address, port, proto, httprescode, httpheader, httpbody, respsize, last_seen)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (domain, port, proto) DO UPDATE SET
        ip_address = excluded.ip_address,
        httprescode = excluded.httprescode,
        httpheader = excluded.httpheader,
        httpbody = excluded.httpbody,
        respsize = excluded.respsize,
        last_seen = excluded.last_seen";

/// A row of the `hosts` table, in its stored (sentinel-string) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredHost {
    pub domain: String,
    pub ip_address: String,
    pub port: u16,
    pub protocol: String,
    pub status: String,
    pub headers: String,
    pub body: String,
    pub response_size: i64,
    pub last_seen: String,
}

/// Result store backed by a single-connection SQLite pool, so statements
/// execute one at a time.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> TriagerResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        sqlx::query(CREATE_HOSTS)
            .execute(&pool)
            .await
            .map_err(storage_error)?;

        info!("Connected to result store {}", url);
        Ok(Self { pool })
    }

    /// Stored row for a (domain, port, protocol) key.
    pub async fn fetch(&self, target: &ProbeTarget) -> TriagerResult<Option<StoredHost>> {
        let row = sqlx::query(
            "SELECT domain, ip_address, port, proto, httprescode, httpheader, httpbody, respsize, last_seen
             FROM hosts WHERE domain = ? AND port = ? AND proto = ?",
        )
        .bind(&target.domain)
        .bind(i64::from(target.port))
        .bind(target.protocol.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let port: i64 = row.try_get("port").map_err(storage_error)?;
        Ok(Some(StoredHost {
            domain: row.try_get("domain").map_err(storage_error)?,
            ip_address: row.try_get("ip_address").map_err(storage_error)?,
            port: u16::try_from(port)
                .map_err(|e| TriagerError::Storage(format!("stored port {}: {}", port, e)))?,
            protocol: row.try_get("proto").map_err(storage_error)?,
            status: row.try_get("httprescode").map_err(storage_error)?,
            headers: row.try_get("httpheader").map_err(storage_error)?,
            body: row.try_get("httpbody").map_err(storage_error)?,
            response_size: row.try_get("respsize").map_err(storage_error)?,
            last_seen: row.try_get("last_seen").map_err(storage_error)?,
        }))
    }

    /// Number of stored rows.
    pub async fn count(&self) -> TriagerResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM hosts")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        row.try_get("n").map_err(storage_error)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn upsert(&self, result: &ProbeResult) -> TriagerResult<()> {
        sqlx::query(UPSERT_HOST)
            .bind(&result.domain)
            .bind(result.ip_address.to_string())
            .bind(i64::from(result.port))
            .bind(result.protocol.as_str())
            .bind(result.status_field())
            .bind(result.headers_field())
            .bind(result.body_field())
            .bind(result.response_size as i64)
            .bind(result.probed_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!("Upserted {}", result.target());
        Ok(())
    }
}

fn storage_error(e: sqlx::Error) -> TriagerError {
    TriagerError::Storage(e.to_string())
}
