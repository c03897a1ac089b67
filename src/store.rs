//! Local Record Store
//!
//! SQLite-backed mirror of the character list. Rows are keyed by character id
//! and every write replaces the existing row for that id; there is no merge.
//! A revision counter is bumped on each mutation so readers can watch the
//! table for changes.

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use crate::models::{CachedCharacter, CharacterFilter};

const COLUMNS: &str = "id, name, status, species, type, gender, image, \
                       origin_name, location_name, created, last_updated";

const LAST_REFRESH_KEY: &str = "last_refresh_at";

/// Local storage backend using SQLite
pub struct LocalStore {
    conn: Connection,
    revision: watch::Sender<u64>,
}

impl LocalStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open a store in the default location (user data directory)
    pub fn open_default(app_name: &str) -> SqliteResult<Self> {
        let data_dir = default_data_dir(app_name);
        std::fs::create_dir_all(&data_dir).map_err(|_| rusqlite::Error::InvalidPath(data_dir.clone()))?;
        Self::open(data_dir.join("characters.db"))
    }

    fn with_connection(conn: Connection) -> SqliteResult<Self> {
        let (revision, _) = watch::channel(0);
        let store = Self { conn, revision };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> SqliteResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS characters (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                species TEXT NOT NULL,
                type TEXT NOT NULL,
                gender TEXT NOT NULL,
                image TEXT NOT NULL,
                origin_name TEXT NOT NULL,
                location_name TEXT NOT NULL,
                created TEXT NOT NULL,
                last_updated INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS store_metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Subscribe to the mutation counter. The value changes after every
    /// insert, clear or replace; re-read with [`LocalStore::get_all`].
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // === Reads ===

    /// All cached records ordered by id
    pub fn get_all(&self) -> SqliteResult<Vec<CachedCharacter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM characters ORDER BY id"))?;
        let rows = stmt.query_map([], map_row)?;
        rows.collect()
    }

    pub fn get_by_id(&self, id: i64) -> SqliteResult<Option<CachedCharacter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM characters WHERE id = ?1"))?;
        stmt.query_row(params![id], map_row).optional()
    }

    /// Records matching every provided predicate.
    ///
    /// Name is a case-insensitive substring match; the other fields compare
    /// by value with ASCII case folding.
    pub fn search(&self, filter: &CharacterFilter) -> SqliteResult<Vec<CachedCharacter>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM characters
             WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0)
             AND (?2 IS NULL OR status = ?2 COLLATE NOCASE)
             AND (?3 IS NULL OR species = ?3 COLLATE NOCASE)
             AND (?4 IS NULL OR gender = ?4 COLLATE NOCASE)
             ORDER BY id"
        ))?;

        let rows = stmt.query_map(
            params![filter.name(), filter.status(), filter.species(), filter.gender()],
            map_row,
        )?;
        rows.collect()
    }

    /// Positional window over the whole table; pages start at 1
    pub fn page(&self, page: u32, page_size: u32) -> SqliteResult<Vec<CachedCharacter>> {
        if page == 0 || page_size == 0 {
            return Ok(Vec::new());
        }
        let offset = i64::from(page - 1) * i64::from(page_size);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM characters ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![i64::from(page_size), offset], map_row)?;
        rows.collect()
    }

    pub fn count(&self) -> SqliteResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // === Writes ===

    /// Insert or replace a single record
    pub fn insert(&mut self, record: &CachedCharacter) -> SqliteResult<()> {
        upsert(&self.conn, record)?;
        self.bump();
        Ok(())
    }

    /// Insert or replace many records in one transaction
    pub fn insert_all(&mut self, records: &[CachedCharacter]) -> SqliteResult<()> {
        let tx = self.conn.transaction()?;
        for record in records {
            upsert(&tx, record)?;
        }
        tx.commit()?;

        self.bump();
        Ok(())
    }

    /// Remove every cached record
    pub fn clear_all(&mut self) -> SqliteResult<()> {
        self.conn.execute("DELETE FROM characters", [])?;
        self.bump();
        Ok(())
    }

    /// Clear the table and insert `records` as one unit. Either the whole
    /// new set lands or the previous content stays untouched.
    pub fn replace_all(&mut self, records: &[CachedCharacter]) -> SqliteResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM characters", [])?;
        for record in records {
            upsert(&tx, record)?;
        }
        tx.commit()?;

        self.bump();
        Ok(())
    }

    // === Metadata ===

    pub fn set_metadata(&mut self, key: &str, value: &str) -> SqliteResult<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.conn.execute(
            "INSERT INTO store_metadata (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at",
            params![key, value, now],
        )?;

        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> SqliteResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM store_metadata WHERE key = ?1")?;

        stmt.query_row(params![key], |row| row.get(0)).optional()
    }

    /// Milliseconds since epoch of the last successful full refresh
    pub fn last_refresh_at(&self) -> SqliteResult<Option<i64>> {
        Ok(self
            .get_metadata(LAST_REFRESH_KEY)?
            .and_then(|v| v.parse().ok()))
    }

    pub fn set_last_refresh_at(&mut self, millis: i64) -> SqliteResult<()> {
        self.set_metadata(LAST_REFRESH_KEY, &millis.to_string())
    }

    /// Close the database connection
    pub fn close(self) -> SqliteResult<()> {
        self.conn.close().map_err(|e| e.1)
    }
}

/// `<data dir>/<app_name>`, falling back to the working directory
pub fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        .join(app_name)
}

fn upsert(conn: &Connection, record: &CachedCharacter) -> SqliteResult<usize> {
    conn.execute(
        "INSERT INTO characters (id, name, status, species, type, gender, image,
                                 origin_name, location_name, created, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
         name = excluded.name,
         status = excluded.status,
         species = excluded.species,
         type = excluded.type,
         gender = excluded.gender,
         image = excluded.image,
         origin_name = excluded.origin_name,
         location_name = excluded.location_name,
         created = excluded.created,
         last_updated = excluded.last_updated",
        params![
            record.id,
            record.name,
            record.status,
            record.species,
            record.kind,
            record.gender,
            record.image,
            record.origin_name,
            record.location_name,
            record.created,
            record.last_updated_millis(),
        ],
    )
}

fn map_row(row: &Row<'_>) -> SqliteResult<CachedCharacter> {
    let last_updated: i64 = row.get(10)?;
    Ok(CachedCharacter {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        species: row.get(3)?,
        kind: row.get(4)?,
        gender: row.get(5)?,
        image: row.get(6)?,
        origin_name: row.get(7)?,
        location_name: row.get(8)?,
        created: row.get(9)?,
        last_updated: CachedCharacter::timestamp_from_millis(last_updated),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(id: i64, name: &str, status: &str, species: &str, gender: &str) -> CachedCharacter {
        CachedCharacter {
            id,
            name: name.to_string(),
            status: status.to_string(),
            species: species.to_string(),
            kind: String::new(),
            gender: gender.to_string(),
            image: format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
            origin_name: "Earth (C-137)".to_string(),
            location_name: "Citadel of Ricks".to_string(),
            created: "2017-11-04T18:48:46.250Z".to_string(),
            last_updated: CachedCharacter::timestamp_from_millis(1_000),
        }
    }

    fn seeded_store() -> LocalStore {
        let mut store = LocalStore::open_in_memory().unwrap();
        store
            .insert_all(&[
                record(1, "Rick Sanchez", "Alive", "Human", "Male"),
                record(2, "Morty Smith", "Alive", "Human", "Male"),
                record(3, "Summer Smith", "Alive", "Human", "Female"),
                record(4, "Beth Smith", "Alive", "Human", "Female"),
                record(5, "Jerry Smith", "Alive", "Human", "Male"),
                record(6, "Abadango Cluster Princess", "Alive", "Alien", "Female"),
                record(7, "Abradolf Lincler", "unknown", "Human", "Male"),
                record(8, "Adjudicator Rick", "Dead", "Human", "Male"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_insert_same_id_replaces() {
        let mut store = LocalStore::open_in_memory().unwrap();

        store.insert(&record(1, "Rick", "Alive", "Human", "Male")).unwrap();
        let mut updated = record(1, "Rick Sanchez", "Dead", "Human", "Male");
        updated.last_updated = CachedCharacter::timestamp_from_millis(2_000);
        store.insert(&updated).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let stored = store.get_by_id(1).unwrap().unwrap();
        assert_eq!(stored.name, "Rick Sanchez");
        assert_eq!(stored.status, "Dead");
        assert_eq!(stored.last_updated_millis(), 2_000);
    }

    #[test]
    fn test_get_missing_record() {
        let store = LocalStore::open_in_memory().unwrap();
        assert!(store.get_by_id(99).unwrap().is_none());
    }

    #[test]
    fn test_search_name_substring_ignores_case() {
        let store = seeded_store();

        let smiths = store.search(&CharacterFilter::default().with_name("smith")).unwrap();
        let ids: Vec<i64> = smiths.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_search_name_treats_wildcards_literally() {
        let store = seeded_store();
        let results = store.search(&CharacterFilter::default().with_name("%")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_combines_with_and() {
        let store = seeded_store();

        let filter = CharacterFilter::default()
            .with_name("smith")
            .with_status("alive")
            .with_gender("female");
        let ids: Vec<i64> = store.search(&filter).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 4]);

        let filter = CharacterFilter::default().with_species("Alien");
        let ids: Vec<i64> = store.search(&filter).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let store = seeded_store();
        assert_eq!(store.search(&CharacterFilter::default()).unwrap().len(), 8);
    }

    #[test]
    fn test_page_windows_by_offset() {
        let store = seeded_store();

        let first: Vec<i64> = store.page(1, 3).unwrap().iter().map(|c| c.id).collect();
        let third: Vec<i64> = store.page(3, 3).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(third, vec![7, 8]);
        assert!(store.page(4, 3).unwrap().is_empty());
        assert!(store.page(0, 3).unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_drops_missing_records() {
        let mut store = seeded_store();

        store
            .replace_all(&[record(100, "Fresh", "Alive", "Human", "Male")])
            .unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 100);
    }

    #[test]
    fn test_clear_all() {
        let mut store = seeded_store();
        store.clear_all().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_changes_bumps_on_mutation() {
        let mut store = LocalStore::open_in_memory().unwrap();
        let rx = store.changes();
        assert_eq!(*rx.borrow(), 0);

        store.insert(&record(1, "Rick", "Alive", "Human", "Male")).unwrap();
        store.clear_all().unwrap();
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn test_metadata_and_last_refresh() {
        let mut store = LocalStore::open_in_memory().unwrap();
        assert_eq!(store.last_refresh_at().unwrap(), None);

        store.set_last_refresh_at(1_700_000_000_000).unwrap();
        assert_eq!(store.last_refresh_at().unwrap(), Some(1_700_000_000_000));

        store.set_metadata("schema", "1").unwrap();
        assert_eq!(store.get_metadata("schema").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("characters.db");

        {
            let mut store = LocalStore::open(&path).unwrap();
            store.insert(&record(1, "Rick", "Alive", "Human", "Male")).unwrap();
            store.close().unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
