//! SQLite record store for questions and upload history

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{NewPyq, Pyq, UploadRecord};

/// SQLite-backed record store
#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

/// Row counts for the info endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub pyqs: usize,
    pub uploads: usize,
    pub embeddings: usize,
}

/// Question ids bound per embedding lookup, below SQLite's variable limit
const EMBEDDING_LOOKUP_BATCH: usize = 500;

const PYQ_COLUMNS: &str =
    "id, subject, sub_topic, question, marks, year, semester, branch, unit";

impl RecordStore {
    /// Create or open the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::Storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            -- Previous year questions
            CREATE TABLE IF NOT EXISTS pyqs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                sub_topic TEXT NOT NULL DEFAULT '',
                question TEXT NOT NULL,
                marks REAL NOT NULL DEFAULT 0,
                year TEXT NOT NULL DEFAULT '',
                semester TEXT,
                branch TEXT,
                unit TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_pyqs_subject ON pyqs(subject);
            CREATE INDEX IF NOT EXISTS idx_pyqs_sub_topic ON pyqs(sub_topic);
            CREATE INDEX IF NOT EXISTS idx_pyqs_question ON pyqs(question);

            -- Upload history
            CREATE TABLE IF NOT EXISTS pdf_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                subject TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pdf_history_subject ON pdf_history(subject);
            CREATE INDEX IF NOT EXISTS idx_pdf_history_timestamp ON pdf_history(timestamp);

            -- Question vectors, one per embedding model
            CREATE TABLE IF NOT EXISTS pyq_embeddings (
                pyq_id INTEGER NOT NULL,
                model TEXT NOT NULL,
                dimensions INTEGER NOT NULL,
                vector BLOB NOT NULL,
                PRIMARY KEY (pyq_id, model),
                FOREIGN KEY (pyq_id) REFERENCES pyqs(id) ON DELETE CASCADE
            );
        "#,
        )
        .map_err(|e| Error::Storage(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    // ==================== Question Operations ====================

    /// Insert a batch of questions for a subject in one transaction
    ///
    /// Records without a question are skipped. Returns the number inserted.
    pub fn insert_pyqs(&self, subject: &str, records: &[NewPyq]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO pyqs (subject, sub_topic, question, marks, year, semester, branch, unit)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;

            for record in records {
                let Some(question) = record.valid_question() else {
                    continue;
                };

                stmt.execute(params![
                    subject,
                    record.sub_topic.as_deref().unwrap_or(""),
                    question,
                    record.marks.unwrap_or(0.0),
                    record.year.as_deref().unwrap_or(""),
                    record.semester,
                    record.branch,
                    record.unit,
                ])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        tracing::debug!("Inserted {} of {} questions for '{}'", inserted, records.len(), subject);
        Ok(inserted)
    }

    /// All questions for a subject
    pub fn pyqs_by_subject(&self, subject: &str) -> Result<Vec<Pyq>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pyqs WHERE subject = ?1 ORDER BY id",
            PYQ_COLUMNS
        ))?;

        let rows = stmt.query_map(params![subject], row_to_pyq)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Every stored question
    pub fn all_pyqs(&self) -> Result<Vec<Pyq>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM pyqs ORDER BY id", PYQ_COLUMNS))?;

        let rows = stmt.query_map([], row_to_pyq)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Distinct subjects with at least one question
    pub fn subjects(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT DISTINCT subject FROM pyqs ORDER BY subject")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    // ==================== Embedding Cache ====================

    /// Cached vectors for the given questions under `model`
    pub fn embeddings_for(&self, model: &str, ids: &[i64]) -> Result<HashMap<i64, Vec<f32>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.conn.lock();
        let mut found = HashMap::new();

        for batch in ids.chunks(EMBEDDING_LOOKUP_BATCH) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "SELECT pyq_id, vector FROM pyq_embeddings WHERE model = ? AND pyq_id IN ({})",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;

            let values = std::iter::once(Value::from(model.to_string()))
                .chain(batch.iter().map(|id| Value::from(*id)));
            let mut rows = stmt.query(params_from_iter(values))?;
            while let Some(row) = rows.next()? {
                let id: i64 = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                found.insert(id, blob_to_vector(&blob));
            }
        }

        Ok(found)
    }

    /// Cache the vector for a question under `model`
    pub fn store_embedding(&self, pyq_id: i64, model: &str, vector: &[f32]) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO pyq_embeddings (pyq_id, model, dimensions, vector)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(pyq_id, model) DO UPDATE SET
                dimensions = excluded.dimensions,
                vector = excluded.vector
            "#,
            params![pyq_id, model, vector.len() as i64, vector_to_blob(vector)],
        )?;
        Ok(())
    }

    // ==================== Upload History ====================

    /// Record an upload stamped with the current UTC time
    pub fn record_upload(&self, filename: &str, subject: &str) -> Result<UploadRecord> {
        self.record_upload_at(filename, subject, Utc::now())
    }

    /// Record an upload with an explicit timestamp
    pub fn record_upload_at(
        &self,
        filename: &str,
        subject: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<UploadRecord> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO pdf_history (filename, subject, timestamp) VALUES (?1, ?2, ?3)",
            params![
                filename,
                subject,
                timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        )?;

        Ok(UploadRecord {
            id: conn.last_insert_rowid(),
            filename: filename.to_string(),
            subject: subject.to_string(),
            timestamp,
        })
    }

    /// Upload history, newest first
    pub fn list_uploads(&self) -> Result<Vec<UploadRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, filename, subject, timestamp FROM pdf_history ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, filename, subject, timestamp) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| Error::Storage(format!("Bad timestamp '{}': {}", timestamp, e)))?
                .with_timezone(&Utc);
            records.push(UploadRecord {
                id,
                filename,
                subject,
                timestamp,
            });
        }

        Ok(records)
    }

    /// Row counts
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            pyqs: count("pyqs")?,
            uploads: count("pdf_history")?,
            embeddings: count("pyq_embeddings")?,
        })
    }
}

fn row_to_pyq(row: &Row<'_>) -> rusqlite::Result<Pyq> {
    Ok(Pyq {
        id: row.get(0)?,
        subject: row.get(1)?,
        sub_topic: row.get(2)?,
        question: row.get(3)?,
        marks: row.get(4)?,
        year: row.get(5)?,
        semester: row.get(6)?,
        branch: row.get(7)?,
        unit: row.get(8)?,
    })
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seeded() -> RecordStore {
        let store = RecordStore::in_memory().unwrap();
        store
            .insert_pyqs(
                "Cyber Security",
                &[
                    NewPyq {
                        question: Some("What is a firewall?".to_string()),
                        sub_topic: Some("Firewall".to_string()),
                        marks: Some(5.0),
                        year: Some("2021".to_string()),
                        ..Default::default()
                    },
                    NewPyq::question("Explain phishing."),
                ],
            )
            .unwrap();
        store
            .insert_pyqs("Environmental Sciences", &[NewPyq::question("Define BOD.")])
            .unwrap();
        store
    }

    #[test]
    fn test_insert_skips_missing_questions() {
        let store = RecordStore::in_memory().unwrap();
        let inserted = store
            .insert_pyqs(
                "Cyber Security",
                &[
                    NewPyq::question("Valid one"),
                    NewPyq::default(),
                    NewPyq::question("   "),
                ],
            )
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.stats().unwrap().pyqs, 1);
    }

    #[test]
    fn test_insert_defaults() {
        let store = seeded();
        let pyqs = store.pyqs_by_subject("Cyber Security").unwrap();

        assert_eq!(pyqs.len(), 2);
        assert_eq!(pyqs[0].sub_topic, "Firewall");
        assert_eq!(pyqs[0].marks, 5.0);
        assert_eq!(pyqs[1].question, "Explain phishing.");
        assert_eq!(pyqs[1].sub_topic, "");
        assert_eq!(pyqs[1].marks, 0.0);
        assert_eq!(pyqs[1].year, "");
    }

    #[test]
    fn test_subject_filter() {
        let store = seeded();
        assert_eq!(store.pyqs_by_subject("Environmental Sciences").unwrap().len(), 1);
        assert!(store.pyqs_by_subject("History").unwrap().is_empty());
        assert_eq!(store.all_pyqs().unwrap().len(), 3);
        assert_eq!(
            store.subjects().unwrap(),
            vec!["Cyber Security".to_string(), "Environmental Sciences".to_string()]
        );
    }

    #[test]
    fn test_embedding_cache() {
        let store = seeded();
        let ids: Vec<i64> = store.all_pyqs().unwrap().iter().map(|p| p.id).collect();

        store.store_embedding(ids[0], "m1", &[0.5, -1.25, 3.0]).unwrap();
        store.store_embedding(ids[1], "m2", &[1.0]).unwrap();

        let cached = store.embeddings_for("m1", &ids).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[&ids[0]], vec![0.5, -1.25, 3.0]);

        // Overwrite keeps a single row
        store.store_embedding(ids[0], "m1", &[2.0, 2.0]).unwrap();
        let cached = store.embeddings_for("m1", &ids[..1]).unwrap();
        assert_eq!(cached[&ids[0]], vec![2.0, 2.0]);
        assert_eq!(store.stats().unwrap().embeddings, 2);
    }

    #[test]
    fn test_embedding_lookup_only_returns_requested_ids() {
        let store = RecordStore::in_memory().unwrap();
        let questions: Vec<NewPyq> = (0..EMBEDDING_LOOKUP_BATCH + 20)
            .map(|i| NewPyq::question(&format!("Question {}", i)))
            .collect();
        store.insert_pyqs("Cyber Security", &questions).unwrap();

        let ids: Vec<i64> = store.all_pyqs().unwrap().iter().map(|p| p.id).collect();
        for id in &ids {
            store.store_embedding(*id, "m1", &[*id as f32]).unwrap();
        }

        // spans two lookup batches
        let cached = store.embeddings_for("m1", &ids).unwrap();
        assert_eq!(cached.len(), ids.len());
        assert_eq!(cached[&ids[EMBEDDING_LOOKUP_BATCH + 5]], vec![ids[EMBEDDING_LOOKUP_BATCH + 5] as f32]);

        let subset = [ids[3], ids[EMBEDDING_LOOKUP_BATCH + 1]];
        let cached = store.embeddings_for("m1", &subset).unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cached.contains_key(&ids[3]));
        assert!(!cached.contains_key(&ids[4]));

        assert!(store.embeddings_for("m2", &ids).unwrap().is_empty());
    }

    #[test]
    fn test_history_newest_first() {
        let store = RecordStore::in_memory().unwrap();
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        store.record_upload_at("a.pdf", "Cyber Security", older).unwrap();
        store.record_upload_at("b.pdf", "Environmental Sciences", newer).unwrap();

        let history = store.list_uploads().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].filename, "b.pdf");
        assert_eq!(history[0].timestamp, newer);
        assert_eq!(history[1].filename, "a.pdf");
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");

        let store = RecordStore::open(&path).unwrap();
        store.record_upload("notes.pdf", "Cyber Security").unwrap();
        drop(store);

        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.list_uploads().unwrap().len(), 1);
    }
}
