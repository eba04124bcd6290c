//! Fragment record persistence
//!
//! Records for a whole extraction run are inserted in one transaction, so a
//! failed run never leaves a partial catalog visible to reconstruction.

use rusqlite::{Connection, params};
use std::path::Path;

use crate::analysis::regions::BoundingBox;
use crate::fragments::fragment::FragmentKind;
use crate::io::error::{PersistenceContext, Result, invalid_data};
use crate::storage::fragments::StorageReference;
use crate::storage::record::{FragmentRecord, NewRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fragment_records (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    image_index        INTEGER NOT NULL,
    region_id          INTEGER NOT NULL,
    kind               TEXT    NOT NULL CHECK (kind IN ('overlap', 'non_overlap')),
    bbox_minr          INTEGER NOT NULL,
    bbox_minc          INTEGER NOT NULL,
    bbox_maxr          INTEGER NOT NULL,
    bbox_maxc          INTEGER NOT NULL,
    fragment_reference TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_fragment_records_image ON fragment_records (image_index);
";

/// Table-like storage of fragment records
pub trait RecordStore {
    /// Insert all records atomically; either every row becomes visible or none
    ///
    /// # Errors
    ///
    /// Returns a persistence error if any insert or the commit fails
    fn insert_records(&mut self, records: &[NewRecord]) -> Result<()>;

    /// Records describing `image_index`, in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is malformed
    fn records_for(&self, image_index: usize) -> Result<Vec<FragmentRecord>>;

    /// Every image index with at least one record, ascending
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn image_indexes(&self) -> Result<Vec<usize>>;

    /// Total number of stored records
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn record_count(&self) -> Result<usize>;
}

/// `SQLite`-backed record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot
    /// be created
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).persistence("open database")?;
        Self::initialize(conn)
    }

    /// Open a store that lives only as long as the handle
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().persistence("open in-memory database")?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).persistence("create schema")?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn insert_records(&mut self, records: &[NewRecord]) -> Result<()> {
        let tx = self.conn.transaction().persistence("begin transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO fragment_records (image_index, region_id, kind, bbox_minr,
                     bbox_minc, bbox_maxr, bbox_maxc, fragment_reference)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .persistence("prepare insert")?;

            for record in records {
                stmt.execute(params![
                    to_sql_int(record.image_index)?,
                    record.region_id,
                    record.kind.as_str(),
                    to_sql_int(record.bbox.min_row)?,
                    to_sql_int(record.bbox.min_col)?,
                    to_sql_int(record.bbox.max_row)?,
                    to_sql_int(record.bbox.max_col)?,
                    record.reference.as_str(),
                ])
                .persistence("insert record")?;
            }
        }
        tx.commit().persistence("commit records")
    }

    fn records_for(&self, image_index: usize) -> Result<Vec<FragmentRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, image_index, region_id, kind, bbox_minr, bbox_minc, bbox_maxr,
                 bbox_maxc, fragment_reference
                 FROM fragment_records WHERE image_index = ?1 ORDER BY id",
            )
            .persistence("prepare record query")?;

        let rows = stmt
            .query_map(params![to_sql_int(image_index)?], |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    image_index: row.get(1)?,
                    region_id: row.get(2)?,
                    kind: row.get(3)?,
                    bbox: [row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?],
                    reference: row.get(8)?,
                })
            })
            .persistence("query records")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .persistence("read records")?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }

    fn image_indexes(&self) -> Result<Vec<usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT image_index FROM fragment_records ORDER BY image_index")
            .persistence("prepare index query")?;

        let indexes = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .persistence("query image indexes")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .persistence("read image indexes")?;

        indexes.into_iter().map(from_sql_int).collect()
    }

    fn record_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fragment_records", [], |row| row.get(0))
            .persistence("count records")?;
        from_sql_int(count)
    }
}

// Row as stored, before range and enum validation
struct RawRecord {
    id: i64,
    image_index: i64,
    region_id: u32,
    kind: String,
    bbox: [i64; 4],
    reference: String,
}

impl RawRecord {
    fn into_record(self) -> Result<FragmentRecord> {
        let kind = FragmentKind::parse(&self.kind).ok_or_else(|| {
            invalid_data(&format!(
                "record {} has unknown kind '{}'",
                self.id, self.kind
            ))
        })?;
        let [min_row, min_col, max_row, max_col] = self.bbox;

        Ok(FragmentRecord {
            id: self.id,
            image_index: from_sql_int(self.image_index)?,
            region_id: self.region_id,
            bbox: BoundingBox {
                min_row: from_sql_int(min_row)?,
                min_col: from_sql_int(min_col)?,
                max_row: from_sql_int(max_row)?,
                max_col: from_sql_int(max_col)?,
            },
            reference: StorageReference::new(self.reference),
            kind,
        })
    }
}

fn to_sql_int(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|e| invalid_data(&format!("{value} does not fit the store: {e}")))
}

fn from_sql_int(value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|e| invalid_data(&format!("stored value {value} is invalid: {e}")))
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}
