//! Named cache operations on the SQLite backend.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::storage::{CacheStorage, ensure_cacheable};
use crate::Error;
use crate::http::{Request, Response};

/// Owned row data, so it can move onto the database thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: i64,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        Ok(Self {
            key_hash: request.cache_key(),
            method: request.method().to_string(),
            url: request.url().to_string(),
            status: i64::from(response.status()),
            status_text: response.status_text().to_string(),
            headers_json: serde_json::to_string(response.headers())?,
            body: response.body().to_vec(),
        })
    }
}

fn insert_cache(conn: &rusqlite::Connection, name: &str, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO caches (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![name, now],
    )?;
    Ok(())
}

fn upsert_entry(conn: &rusqlite::Connection, name: &str, row: &EntryRow, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO cache_entries (
            cache_name, key_hash, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            name,
            &row.key_hash,
            &row.method,
            &row.url,
            row.status,
            &row.status_text,
            &row.headers_json,
            &row.body,
            now
        ],
    )?;
    Ok(())
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                insert_cache(conn, &name, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_request(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let name = name.to_string();
        let key_hash = request.cache_key();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, headers_json, body
                    FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![name, key_hash], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                });

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match row {
            Some((status, status_text, headers_json, body)) => {
                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                Ok(Some(Response::from_parts(status, status_text, headers, Bytes::from(body))))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        ensure_cacheable(request)?;

        let name = name.to_string();
        let row = EntryRow::new(request, response)?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                insert_cache(conn, &name, &now)?;
                upsert_entry(conn, &name, &row, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, name: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| {
                ensure_cacheable(request)?;
                EntryRow::new(request, response)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                insert_cache(&tx, &name, &now)?;
                for row in &rows {
                    upsert_entry(&tx, &name, row, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn requests(&self, name: &str) -> Result<Vec<Request>, Error> {
        let name = name.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM cache_entries WHERE cache_name = ?1 ORDER BY stored_at ASC, rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(String, String)>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.iter()
            .map(|(method, url)| Request::parse(method, url))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> Request {
        Request::parse("GET", &format!("https://example.test{path}")).unwrap()
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("/img/logo.webp");
        let resp = Response::new(200, Bytes::from_static(b"\x89webp"))
            .with_status_text("OK")
            .with_header("content-type", "image/webp");

        db.put("images-v1", &req, &resp).await.unwrap();

        let stored = db.match_request("images-v1", &req).await.unwrap().unwrap();
        assert_eq!(stored, resp);
        assert!(db.has("images-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open("static-v1").await.unwrap();
        let result = db.match_request("static-v1", &get("/")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_entries_are_scoped_to_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("/");
        db.put("static-v1", &req, &Response::new(200, "shell")).await.unwrap();

        assert!(db.match_request("images-v1", &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = Request::parse("POST", "https://example.test/api/contact").unwrap();

        let result = db.put("connect-digitals-v1", &req, &Response::new(200, "")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!db.has("connect-digitals-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_last_writer_wins() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("/api/data");

        db.put("connect-digitals-v1", &req, &Response::new(200, "old")).await.unwrap();
        db.put("connect-digitals-v1", &req, &Response::new(200, "new")).await.unwrap();

        let stored = db.match_request("connect-digitals-v1", &req).await.unwrap().unwrap();
        assert_eq!(stored.body_text(), "new");
        assert_eq!(db.requests("connect-digitals-v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("/");
        db.put("static-v0", &req, &Response::new(200, "old shell")).await.unwrap();

        assert!(db.delete("static-v0").await.unwrap());
        assert!(!db.delete("static-v0").await.unwrap());
        assert!(db.match_request("static-v0", &req).await.unwrap().is_none());

        // Re-opening yields an empty cache, not the old entries.
        db.open("static-v0").await.unwrap();
        assert!(db.requests("static-v0").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open("static-v1").await.unwrap();
        db.open("images-v1").await.unwrap();
        db.open("static-v1").await.unwrap();
        db.open("connect-digitals-v1").await.unwrap();

        let keys = db.keys().await.unwrap();
        assert_eq!(keys, vec!["static-v1", "images-v1", "connect-digitals-v1"]);
    }

    #[tokio::test]
    async fn test_put_all_is_atomic() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = vec![
            (get("/"), Response::new(200, "index")),
            (Request::parse("POST", "https://example.test/manifest.json").unwrap(), Response::new(200, "{}")),
        ];

        let result = db.put_all("static-v1", &entries).await;
        assert!(result.is_err());
        assert!(!db.has("static-v1").await.unwrap());
        assert!(db.match_request("static-v1", &get("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_all_writes_every_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = vec![
            (get("/"), Response::new(200, "index")),
            (get("/manifest.json"), Response::new(200, "{}")),
        ];

        db.put_all("static-v1", &entries).await.unwrap();

        let urls: Vec<String> = db
            .requests("static-v1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.url().to_string())
            .collect();
        assert_eq!(urls, vec!["https://example.test/", "https://example.test/manifest.json"]);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caches.sqlite");
        let req = get("/img/hero-bg.webp");

        {
            let db = CacheDb::open(&path).await.unwrap();
            db.put("images-v1", &req, &Response::new(200, "pixels")).await.unwrap();
        }

        let db = CacheDb::open(&path).await.unwrap();
        let stored = db.match_request("images-v1", &req).await.unwrap().unwrap();
        assert_eq!(stored.body_text(), "pixels");
    }
}
