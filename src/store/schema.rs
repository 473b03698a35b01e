//! Table layout and the per-table column allow-list.

use rusqlite::Connection;

use super::StoreError;

/// The credential table. Never reachable through the generic resource surface.
pub const ADMIN_TABLE: &str = "admin";

/// Catalog collections, in seeding order.
pub const CATALOG_TABLES: &[&str] = &[
    "courses",
    "excursions",
    "packages",
    "gallery",
    "reviews",
    "team",
    "services",
];

const CREATE_TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS courses (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        level TEXT,
        description TEXT,
        duration TEXT,
        maxDepth TEXT,
        price TEXT,
        includes TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS excursions (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        location TEXT,
        duration TEXT,
        price TEXT,
        description TEXT,
        image TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS packages (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        price TEXT,
        popular BOOLEAN DEFAULT 0,
        description TEXT,
        features TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS gallery (
        id TEXT PRIMARY KEY,
        type TEXT,
        alt TEXT,
        url TEXT,
        categories TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS reviews (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        country TEXT,
        rating INTEGER,
        text TEXT,
        course TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS team (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        role TEXT,
        image TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS admin (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )"#,
];

/// Create every table that does not exist yet.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    for statement in CREATE_TABLES {
        conn.execute(statement, [])?;
    }
    Ok(())
}

/// A column as declared in the table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub declared_type: String,
}

impl Column {
    /// SQLite has no boolean storage class; declared `BOOLEAN` columns are
    /// read back as booleans.
    pub fn is_boolean(&self) -> bool {
        self.declared_type.eq_ignore_ascii_case("BOOLEAN")
    }

    pub fn quoted(&self) -> String {
        quote_ident(&self.name)
    }
}

/// The columns of one table, in declaration order.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Load the schema of `collection`. Names that are not plain lowercase
    /// identifiers, internal tables and missing tables are all unknown
    /// collections.
    pub fn load(conn: &Connection, collection: &str) -> Result<Self, StoreError> {
        if !is_collection_name(collection) {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }

        let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([collection], |row| {
                Ok(Column {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }

        Ok(Self {
            name: collection.to_string(),
            columns,
        })
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == field)
    }

    /// Map caller-supplied field names onto declared columns, preserving
    /// order. Any field outside the allow-list fails the whole statement.
    pub fn resolve<'a, I>(&self, fields: I) -> Result<Vec<&Column>, StoreError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        fields
            .into_iter()
            .map(|field| {
                self.column(field).ok_or_else(|| StoreError::UnknownField {
                    collection: self.name.clone(),
                    field: field.clone(),
                })
            })
            .collect()
    }

    pub fn quoted_name(&self) -> String {
        quote_ident(&self.name)
    }

    /// Comma-separated quoted column list for SELECT.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(Column::quoted)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lowercase identifier that is not an SQLite internal table.
pub fn is_collection_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    starts_ok
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with("sqlite_")
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
