use crate::model::{Listing, StorageError};
use chrono::Utc;
use rusqlite::{Connection, params};
use std::collections::HashSet;
use std::path::Path;

/// Seen-set of delivered listings, keyed by link. Rows are only ever added.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and runs migrations
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS listings (
                link TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                price TEXT NOT NULL,
                details TEXT NOT NULL,
                img_url TEXT,
                first_seen TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Checks whether a listing with this link was already delivered
    #[cfg(test)]
    pub fn contains(&self, link: &str) -> Result<bool, StorageError> {
        let mut stmt = self.conn.prepare("SELECT 1 FROM listings WHERE link = ?1")?;
        let mut rows = stmt.query(params![link])?;
        Ok(rows.next()?.is_some())
    }

    /// Snapshot of every known link, used for one filtering pass
    pub fn known_links(&self) -> Result<HashSet<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT link FROM listings")?;
        let links = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(links)
    }

    /// Appends a single listing. Recording a known link is a no-op.
    #[cfg(test)]
    pub fn record(&self, source: &str, listing: &Listing) -> Result<(), StorageError> {
        Self::insert(&self.conn, source, listing)?;
        Ok(())
    }

    /// Appends a whole batch in one transaction: either all rows land or none.
    pub fn record_all(&mut self, source: &str, listings: &[Listing]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        for listing in listings {
            inserted += Self::insert(&tx, source, listing)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Makes every insert fail until `allow_writes` is called.
    #[cfg(test)]
    pub fn reject_writes(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TRIGGER reject_writes BEFORE INSERT ON listings
             BEGIN SELECT RAISE(ABORT, 'listings are read-only'); END;",
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn allow_writes(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("DROP TRIGGER IF EXISTS reject_writes;")?;
        Ok(())
    }

    fn insert(conn: &Connection, source: &str, listing: &Listing) -> Result<usize, rusqlite::Error> {
        conn.execute(
            "INSERT OR IGNORE INTO listings (link, source, title, price, details, img_url, first_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &listing.link,
                source,
                &listing.title,
                &listing.price,
                &listing.details,
                &listing.image_url,
                Utc::now().to_rfc3339(),
            ],
        )
    }
}
