//! SqliteStore - one table per collection, statements built per call.
//!
//! The store knows nothing about collections beyond what the database
//! schema tells it. Column names come from the table's own declaration
//! (`pragma_table_info`) and values are always bound as parameters, so a
//! caller-supplied field set can shape a statement but never inject into it.
//!
//! ## Example
//!
//! ```
//! use dive_catalog::record::Record;
//! use dive_catalog::store::{RowKey, SqliteStore};
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//!
//! let mut course = Record::new();
//! course.set_id("c1");
//! course.insert("title", "Beginner Diver");
//! store.insert("courses", &course).unwrap();
//!
//! let mut changes = Record::new();
//! changes.insert("price", "$450");
//! let matched = store.update("courses", &RowKey::Id("c1".into()), &changes).unwrap();
//! assert_eq!(matched, 1);
//!
//! assert_eq!(store.list("courses").unwrap().len(), 1);
//! ```

mod error;
pub mod schema;
pub mod seed;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::record::{coercion, Record, Value, ID_FIELD};

pub use error::StoreError;
pub use schema::{Column, TableSchema, ADMIN_TABLE, CATALOG_TABLES};
pub use seed::{AdminCredential, SeedCollection};

/// How an update locates its target row(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    /// The primary key.
    Id(String),
    /// Gallery rows that predate generated ids are addressed by their
    /// `(url, alt)` pair.
    UrlAlt { url: String, alt: String },
}

/// SQLite-backed record store.
///
/// Holds a single connection behind a mutex. Every public operation is one
/// statement (apart from `populate` and `repair_gallery_ids`, which run in a
/// transaction).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure all tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database with all tables created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    /// Schema of a collection, or `UnknownCollection`.
    pub fn table_schema(&self, collection: &str) -> Result<TableSchema, StoreError> {
        let conn = self.connection("schema")?;
        TableSchema::load(&conn, collection)
    }

    /// All rows of a collection, in store-native order. Array fields are
    /// returned in their stored text form.
    pub fn list(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let conn = self.connection("list")?;
        list_rows(&conn, collection)
    }

    /// Insert one row built from the record's fields.
    pub fn insert(&self, collection: &str, record: &Record) -> Result<(), StoreError> {
        let conn = self.connection("insert")?;
        insert_row(&conn, collection, record)
    }

    /// Assign every supplied field except `id` on the rows matched by `key`.
    /// Returns the number of matched rows.
    pub fn update(
        &self,
        collection: &str,
        key: &RowKey,
        fields: &Record,
    ) -> Result<usize, StoreError> {
        let conn = self.connection("update")?;
        let schema = TableSchema::load(&conn, collection)?;

        let assignable: Vec<(&String, &Value)> =
            fields.iter().filter(|(name, _)| name.as_str() != ID_FIELD).collect();
        if assignable.is_empty() {
            return Err(StoreError::NothingToUpdate(collection.to_string()));
        }

        let columns = schema.resolve(assignable.iter().map(|(name, _)| *name))?;
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column.quoted(), i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let mut values: Vec<SqlValue> = assignable.iter().map(|(_, v)| to_sql(v)).collect();
        let next = values.len() + 1;
        let filter = match key {
            RowKey::Id(id) => {
                values.push(SqlValue::Text(id.clone()));
                format!("{} = ?{}", schema::quote_ident(ID_FIELD), next)
            }
            RowKey::UrlAlt { url, alt } => {
                values.push(SqlValue::Text(url.clone()));
                values.push(SqlValue::Text(alt.clone()));
                format!("\"url\" = ?{} AND \"alt\" = ?{}", next, next + 1)
            }
        };

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            schema.quoted_name(),
            assignments,
            filter
        );
        debug!(%sql, "update");
        let matched = conn.execute(&sql, params_from_iter(values))?;
        Ok(matched)
    }

    /// Delete by id. Returns the number of removed rows (0 or 1).
    pub fn delete(&self, collection: &str, id: &str) -> Result<usize, StoreError> {
        let conn = self.connection("delete")?;
        let schema = TableSchema::load(&conn, collection)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            schema.quoted_name(),
            schema::quote_ident(ID_FIELD)
        );
        debug!(%sql, "delete");
        Ok(conn.execute(&sql, [id])?)
    }

    /// First row whose `field` equals `value`.
    pub fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, StoreError> {
        let conn = self.connection("find")?;
        let schema = TableSchema::load(&conn, collection)?;
        let column = schema
            .column(field)
            .ok_or_else(|| StoreError::UnknownField {
                collection: collection.to_string(),
                field: field.to_string(),
            })?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
            schema.select_list(),
            schema.quoted_name(),
            column.quoted()
        );
        let mut stmt = conn.prepare(&sql)?;
        let record = stmt
            .query_row([value], |row| read_row(row, &schema.columns))
            .optional()?;
        Ok(record)
    }

    /// Names of all user tables.
    pub fn tables(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connection("tables")?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Give every gallery row with an empty or NULL id a fresh one.
    /// Rows are located by `(url, alt)`. Returns the number repaired.
    pub fn repair_gallery_ids(&self) -> Result<usize, StoreError> {
        let mut conn = self.connection("repair")?;
        let tx = conn.transaction()?;

        let orphans: Vec<(Option<String>, Option<String>)> = {
            let mut stmt =
                tx.prepare("SELECT url, alt FROM gallery WHERE id = '' OR id IS NULL")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for (url, alt) in &orphans {
            tx.execute(
                "UPDATE gallery SET id = ?1 WHERE url IS ?2 AND alt IS ?3 AND (id = '' OR id IS NULL)",
                rusqlite::params![uuid::Uuid::new_v4().to_string(), url, alt],
            )?;
        }

        tx.commit()?;
        info!(repaired = orphans.len(), "repaired gallery ids");
        Ok(orphans.len())
    }

    /// Replace the catalog collections with `seed` and make sure the admin
    /// credential exists. Runs in one transaction. Returns the number of
    /// catalog rows inserted.
    pub fn populate(
        &self,
        seed: &[SeedCollection],
        admin: &AdminCredential,
    ) -> Result<usize, StoreError> {
        let mut conn = self.connection("populate")?;
        let tx = conn.transaction()?;

        let mut inserted = 0;
        for collection in seed {
            let schema = TableSchema::load(&tx, collection.name)?;
            tx.execute(&format!("DELETE FROM {}", schema.quoted_name()), [])?;
            for record in &collection.records {
                insert_row(&tx, collection.name, record)?;
                inserted += 1;
            }
        }

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM admin WHERE username = ?1",
                [&admin.username],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_none() {
            tx.execute(
                "INSERT INTO admin (id, username, password) VALUES (?1, ?2, ?3)",
                rusqlite::params![
                    uuid::Uuid::new_v4().to_string(),
                    admin.username,
                    admin.password_hash
                ],
            )?;
            info!(username = %admin.username, "created admin credential");
        }

        tx.commit()?;
        info!(inserted, "populated catalog");
        Ok(inserted)
    }
}

fn list_rows(conn: &Connection, collection: &str) -> Result<Vec<Record>, StoreError> {
    let schema = TableSchema::load(conn, collection)?;
    let sql = format!("SELECT {} FROM {}", schema.select_list(), schema.quoted_name());
    debug!(%sql, "list");
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], |row| read_row(row, &schema.columns))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn insert_row(conn: &Connection, collection: &str, record: &Record) -> Result<(), StoreError> {
    let schema = TableSchema::load(conn, collection)?;
    let columns = schema.resolve(record.field_names())?;

    let column_list = columns
        .iter()
        .map(|c| c.quoted())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.quoted_name(),
        column_list,
        placeholders
    );
    debug!(%sql, "insert");

    conn.execute(&sql, params_from_iter(record.iter().map(|(_, v)| to_sql(v))))?;
    Ok(())
}

fn read_row(row: &rusqlite::Row<'_>, columns: &[Column]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, column) in columns.iter().enumerate() {
        let value = from_sql(row.get_ref(i)?, column);
        record.insert(column.name.clone(), value);
    }
    Ok(record)
}

/// Bind form of a value. Arrays are stored as their JSON text.
fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::StringArray(_) => match coercion::encode_value(value.clone()) {
            Value::String(text) => SqlValue::Text(text),
            _ => SqlValue::Null,
        },
    }
}

fn from_sql(value: ValueRef<'_>, column: &Column) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if column.is_boolean() => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
