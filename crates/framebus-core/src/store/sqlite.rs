//! SQLite store: one table per label, one row per frame row.
//!
//! Index levels become the leading fields (and the composite primary key);
//! data columns follow. Declared column types follow [`Affinity`], and
//! `BOOLEAN` fields are decoded on read by comparing the stored value with
//! the literal `1`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Transaction};
use tracing::{debug, info};

use super::{StoreBackend, StoreItem, LABEL_PLACEHOLDER};
use crate::config::{StoreConfig, StoreConfigMap};
use crate::error::{StoreError, StoreResult};
use crate::frame::{ColumnData, DType, Frame, Index, Value};

/// Declared SQLite column type for a dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Boolean,
    Text,
    Integer,
    Real,
    None,
}

impl Affinity {
    pub fn from_dtype(dtype: DType) -> Self {
        match dtype {
            DType::Bool => Self::Boolean,
            DType::Str => Self::Text,
            DType::Int64 => Self::Integer,
            DType::Float64 => Self::Real,
            DType::Object => Self::None,
        }
    }

    /// Affinity of a declared type, using SQLite's name rules.
    pub fn from_declared(decl: &str) -> Self {
        let decl = decl.to_ascii_uppercase();
        if decl == "BOOLEAN" {
            Self::Boolean
        } else if decl.contains("INT") {
            Self::Integer
        } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
            Self::Text
        } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
            Self::Real
        } else {
            Self::None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::None => "NONE",
        }
    }
}

/// SQLite-backed [`StoreBackend`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// File extensions this backend is selected for.
    pub const EXTENSIONS: &'static [&'static str] = &[".db", ".sqlite"];

    const BYTES_ONE: &'static [u8] = b"1";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_read_only(&self, label: Option<&str>) -> StoreResult<Connection> {
        if !self.path.exists() {
            return Err(match label {
                Some(label) => StoreError::NotFound {
                    label: label.to_string(),
                },
                None => StoreError::Io {
                    message: format!("no such store: {}", self.path.display()),
                },
            });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }
}

impl StoreBackend for SqliteStore {
    fn write(
        &self,
        items: &mut dyn Iterator<Item = StoreItem>,
        config: &StoreConfigMap,
    ) -> StoreResult<()> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        let mut tables = 0;
        for item in items {
            let (label, frame) = item?;
            let label = label.as_deref().unwrap_or(LABEL_PLACEHOLDER);
            frame_to_table(&tx, label, &frame, config.get(label))?;
            tables += 1;
        }
        tx.commit()?;
        info!(path = %self.path.display(), tables, "wrote frames to sqlite store");
        Ok(())
    }

    fn read(&self, label: &str, config: &StoreConfig) -> StoreResult<Frame> {
        let conn = self.open_read_only(Some(label))?;
        if !table_exists(&conn, label)? {
            return Err(StoreError::NotFound {
                label: label.to_string(),
            });
        }
        let fields = table_fields(&conn, label)?;

        let mut cells: Vec<Vec<SqlValue>> = vec![Vec::new(); fields.len()];
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(label)))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, column) in cells.iter_mut().enumerate() {
                column.push(row.get::<_, SqlValue>(i)?);
            }
        }
        debug!(label, fields = fields.len(), "read table from sqlite store");
        table_to_frame(label, fields, cells, config)
    }

    fn labels(&self) -> StoreResult<Box<dyn Iterator<Item = String> + '_>> {
        if !self.path.exists() {
            return Ok(Box::new(std::iter::empty()));
        }
        let conn = self.open_read_only(None)?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY rowid",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(names.into_iter()))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn default_index_name(depth: usize) -> String {
    format!("__index{}__", depth)
}

fn default_column_name(position: usize) -> String {
    format!("__col{}__", position)
}

fn encode_label(label: &[String]) -> StoreResult<String> {
    match label {
        [single] => Ok(single.clone()),
        parts => serde_json::to_string(parts).map_err(|e| StoreError::Schema {
            label: parts.join("/"),
            message: e.to_string(),
        }),
    }
}

/// Field names and dtypes in write order: index levels, then data columns.
fn field_names_and_dtypes(
    frame: &Frame,
    include_index: bool,
    include_columns: bool,
) -> StoreResult<Vec<(String, DType)>> {
    let mut fields = Vec::new();
    if include_index {
        let index = frame.index();
        for (depth, (name, level)) in index.names().iter().zip(index.levels()).enumerate() {
            let name = name.clone().unwrap_or_else(|| default_index_name(depth));
            fields.push((name, level.dtype()));
        }
    }
    for (position, (label, column)) in frame.columns().enumerate() {
        let name = if include_columns {
            encode_label(label)?
        } else {
            default_column_name(position)
        };
        fields.push((name, column.dtype()));
    }
    Ok(fields)
}

fn to_sql_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(b)),
        Value::Int(i) => SqlValue::Integer(i),
        Value::Float(f) if f.is_nan() => SqlValue::Null,
        Value::Float(f) => SqlValue::Real(f),
        Value::Str(s) => SqlValue::Text(s),
    }
}

fn frame_to_table(
    tx: &Transaction<'_>,
    label: &str,
    frame: &Frame,
    config: &StoreConfig,
) -> StoreResult<()> {
    let fields = field_names_and_dtypes(frame, config.include_index, config.include_columns)?;
    if fields.is_empty() {
        return Err(StoreError::Schema {
            label: label.to_string(),
            message: "frame has no fields to write".to_string(),
        });
    }

    let create_primary_key = if config.include_index {
        let primary_fields = fields[..frame.index().depth()]
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(", PRIMARY KEY ({})", primary_fields)
    } else {
        String::new()
    };
    let create_fields = fields
        .iter()
        .map(|(name, dtype)| {
            format!(
                "{} {}",
                quote_identifier(name),
                Affinity::from_dtype(*dtype).as_sql()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute(
        &format!(
            "CREATE TABLE {} ({}{})",
            quote_identifier(label),
            create_fields,
            create_primary_key
        ),
        [],
    )?;

    let insert_fields = fields
        .iter()
        .map(|(name, _)| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_template = vec!["?"; fields.len()].join(", ");
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(label),
        insert_fields,
        insert_template
    ))?;
    for row in 0..frame.rows() {
        let values = frame.row_values(row, config.include_index);
        stmt.execute(params_from_iter(values.into_iter().map(to_sql_value)))?;
    }
    debug!(label, rows = frame.rows(), fields = fields.len(), "created table");
    Ok(())
}

fn table_exists(conn: &Connection, label: &str) -> StoreResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![label],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// `(name, affinity)` of each field in declaration order.
fn table_fields(conn: &Connection, label: &str) -> StoreResult<Vec<(String, Affinity)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(label)))?;
    let fields = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let decl: String = row.get(2)?;
            Ok((name, Affinity::from_declared(&decl)))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fields)
}

fn stored_bytes(value: &SqlValue) -> Cow<'_, [u8]> {
    match value {
        SqlValue::Null => Cow::Borrowed(&[]),
        SqlValue::Integer(i) => Cow::Owned(i.to_string().into_bytes()),
        SqlValue::Real(f) => Cow::Owned(f.to_string().into_bytes()),
        SqlValue::Text(s) => Cow::Borrowed(s.as_bytes()),
        SqlValue::Blob(b) => Cow::Borrowed(b.as_slice()),
    }
}

fn to_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Int(i),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::Str(s),
        SqlValue::Blob(b) => Value::Str(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn as_float(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Null => Some(f64::NAN),
        SqlValue::Integer(i) => Some(*i as f64),
        SqlValue::Real(f) => Some(*f),
        _ => None,
    }
}

fn decode_column(affinity: Affinity, values: Vec<SqlValue>) -> ColumnData {
    match affinity {
        Affinity::Boolean if values.iter().any(|v| matches!(v, SqlValue::Null)) => {
            ColumnData::Object(
                values
                    .iter()
                    .map(|v| match v {
                        SqlValue::Null => Value::Null,
                        v => Value::Bool(stored_bytes(v).as_ref() == SqliteStore::BYTES_ONE),
                    })
                    .collect(),
            )
        }
        Affinity::Boolean => ColumnData::Bool(
            values
                .iter()
                .map(|v| stored_bytes(v).as_ref() == SqliteStore::BYTES_ONE)
                .collect(),
        ),
        Affinity::Integer if values.iter().all(|v| matches!(v, SqlValue::Integer(_))) => {
            ColumnData::Int64(
                values
                    .iter()
                    .filter_map(|v| match v {
                        SqlValue::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect(),
            )
        }
        Affinity::Text if values.iter().all(|v| matches!(v, SqlValue::Text(_))) => {
            ColumnData::Str(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        SqlValue::Text(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )
        }
        Affinity::Integer | Affinity::Real => {
            match values.iter().map(as_float).collect::<Option<Vec<_>>>() {
                Some(floats) => ColumnData::Float64(floats),
                None => ColumnData::Object(values.into_iter().map(to_value).collect()),
            }
        }
        Affinity::Text | Affinity::None => {
            ColumnData::Object(values.into_iter().map(to_value).collect())
        }
    }
}

fn table_to_frame(
    label: &str,
    fields: Vec<(String, Affinity)>,
    cells: Vec<Vec<SqlValue>>,
    config: &StoreConfig,
) -> StoreResult<Frame> {
    let schema_error = |message: String| StoreError::Schema {
        label: label.to_string(),
        message,
    };
    if config.index_depth > fields.len() {
        return Err(schema_error(format!(
            "index_depth {} exceeds {} stored fields",
            config.index_depth,
            fields.len()
        )));
    }
    if config.columns_depth == 0 {
        return Err(schema_error("columns_depth must be at least 1".to_string()));
    }
    let rows = cells.first().map(Vec::len).unwrap_or(0);

    let mut columns = Vec::with_capacity(fields.len());
    for ((name, affinity), values) in fields.into_iter().zip(cells) {
        let mut column = decode_column(affinity, values);
        if let Some(dtype) = config.dtypes.get(&name) {
            column = column.astype(*dtype)?;
        }
        columns.push((name, column));
    }
    let data_columns = columns.split_off(config.index_depth);

    let index = if columns.is_empty() {
        Index::positional(rows)
    } else {
        Index::from_levels(
            columns
                .into_iter()
                .enumerate()
                .map(|(depth, (name, level))| {
                    let name = (name != default_index_name(depth)).then_some(name);
                    (name, level)
                })
                .collect(),
        )?
    };

    let mut labels = Vec::with_capacity(data_columns.len());
    let mut data = Vec::with_capacity(data_columns.len());
    for (name, column) in data_columns {
        let parts = if config.columns_depth == 1 {
            vec![name]
        } else {
            let parts: Vec<String> = serde_json::from_str(&name).map_err(|e| {
                schema_error(format!("field {} is not a column label array: {}", name, e))
            })?;
            if parts.len() != config.columns_depth {
                return Err(schema_error(format!(
                    "field {} has {} label levels, expected {}",
                    name,
                    parts.len(),
                    config.columns_depth
                )));
            }
            parts
        };
        labels.push(parts);
        data.push(column);
    }

    Ok(Frame::from_parts(Some(label.to_string()), index, labels, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("frames.sqlite"));
        (store, temp_dir)
    }

    fn frame_a() -> Frame {
        Frame::from_columns([
            ("flag", ColumnData::Bool(vec![true, false, true])),
            ("count", ColumnData::Int64(vec![10, 20, 30])),
        ])
        .unwrap()
        .with_name("a")
    }

    fn frame_b() -> Frame {
        Frame::from_columns([
            ("x", ColumnData::Int64(vec![1, 2])),
            ("y", ColumnData::Int64(vec![3, 4])),
        ])
        .unwrap()
        .with_name("b")
    }

    fn write(store: &SqliteStore, frames: &[Frame]) -> StoreResult<()> {
        let items: Vec<_> = frames
            .iter()
            .map(|f| (f.name().map(str::to_string), f.clone()))
            .collect();
        store.write_frames(&items, &StoreConfigMap::default())
    }

    #[test]
    fn test_affinity_mapping() {
        assert_eq!(Affinity::from_dtype(DType::Bool).as_sql(), "BOOLEAN");
        assert_eq!(Affinity::from_dtype(DType::Str).as_sql(), "TEXT");
        assert_eq!(Affinity::from_dtype(DType::Int64).as_sql(), "INTEGER");
        assert_eq!(Affinity::from_dtype(DType::Float64).as_sql(), "REAL");
        assert_eq!(Affinity::from_dtype(DType::Object).as_sql(), "NONE");

        assert_eq!(Affinity::from_declared("boolean"), Affinity::Boolean);
        assert_eq!(Affinity::from_declared("BIGINT"), Affinity::Integer);
        assert_eq!(Affinity::from_declared("VARCHAR(20)"), Affinity::Text);
        assert_eq!(Affinity::from_declared("DOUBLE"), Affinity::Real);
        assert_eq!(Affinity::from_declared(""), Affinity::None);
    }

    #[test]
    fn test_roundtrip_preserves_shape_dtypes_and_bools() {
        let (store, _temp_dir) = create_test_store();
        write(&store, &[frame_a(), frame_b()]).unwrap();

        let config = StoreConfig::default();
        let a = store.read("a", &config).unwrap();
        assert_eq!(a.shape(), (3, 2));
        assert_eq!(a.column("flag").unwrap().dtype(), DType::Bool);
        assert!(a
            .column("flag")
            .unwrap()
            .equals(&ColumnData::Bool(vec![true, false, true])));
        assert_eq!(a, frame_a());

        let b = store.read("b", &config).unwrap();
        assert_eq!(b.shape(), (2, 2));
        assert_eq!(b, frame_b());
    }

    #[test]
    fn test_labels_enumerates_tables() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.labels().unwrap().count(), 0);

        write(&store, &[frame_a(), frame_b()]).unwrap();
        let mut labels: Vec<_> = store.labels().unwrap().collect();
        labels.sort();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn test_labels_keep_tables_resembling_internal_names() {
        let (store, _temp_dir) = create_test_store();
        let items: Vec<_> = ["sqlites", "SQLiteData", "sqlite"]
            .iter()
            .map(|label| (Some(label.to_string()), frame_b()))
            .collect();
        store
            .write_frames(&items, &StoreConfigMap::default())
            .unwrap();

        // AUTOINCREMENT creates the internal sqlite_sequence table
        let conn = Connection::open(store.path()).unwrap();
        conn.execute_batch("CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT);")
            .unwrap();
        drop(conn);

        let labels: Vec<_> = store.labels().unwrap().collect();
        assert_eq!(labels, ["sqlites", "SQLiteData", "sqlite", "counters"]);
    }

    #[test]
    fn test_read_missing_label() {
        let (store, _temp_dir) = create_test_store();
        let err = store.read("a", &StoreConfig::default()).unwrap_err();
        assert!(err.is_not_found());

        write(&store, &[frame_b()]).unwrap();
        let err = store.read("a", &StoreConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref label } if label == "a"));
    }

    #[test]
    fn test_unlabelled_frame_uses_placeholder() {
        let (store, _temp_dir) = create_test_store();
        store
            .write_frames(&[(None, frame_b())], &StoreConfigMap::default())
            .unwrap();
        let labels: Vec<_> = store.labels().unwrap().collect();
        assert_eq!(labels, [LABEL_PLACEHOLDER]);
        let frame = store
            .read(LABEL_PLACEHOLDER, &StoreConfig::default())
            .unwrap();
        assert!(frame.equals(&frame_b()));
    }

    #[test]
    fn test_failed_write_is_atomic() {
        let (store, _temp_dir) = create_test_store();
        write(&store, &[frame_b()]).unwrap();

        // second "b" collides with the existing table
        let err = write(&store, &[frame_a(), frame_b()]).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite { .. }));
        let labels: Vec<_> = store.labels().unwrap().collect();
        assert_eq!(labels, ["b"]);
    }

    #[test]
    fn test_composite_primary_key() {
        let (store, _temp_dir) = create_test_store();
        let index = Index::from_levels(vec![
            (
                Some("region".to_string()),
                ColumnData::Str(vec!["eu".into(), "eu".into(), "us".into()]),
            ),
            (Some("year".to_string()), ColumnData::Int64(vec![2020, 2021, 2020])),
        ])
        .unwrap();
        let frame = Frame::from_columns([("sales", ColumnData::Float64(vec![1.0, f64::NAN, 3.5]))])
            .unwrap()
            .with_index(index)
            .unwrap()
            .with_name("sales");
        write(&store, &[frame.clone()]).unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let pk: Vec<(String, i64)> = conn
            .prepare("PRAGMA table_info(\"sales\")")
            .unwrap()
            .query_map([], |row| Ok((row.get(1)?, row.get(5)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            pk,
            [
                ("region".to_string(), 1),
                ("year".to_string(), 2),
                ("sales".to_string(), 0)
            ]
        );
        drop(conn);

        let config = StoreConfig {
            index_depth: 2,
            ..StoreConfig::default()
        };
        let back = store.read("sales", &config).unwrap();
        assert_eq!(back.index().depth(), 2);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_multi_level_columns() {
        let (store, _temp_dir) = create_test_store();
        let frame = Frame::from_parts(
            Some("wide".to_string()),
            Index::positional(2),
            vec![
                vec!["price".to_string(), "open".to_string()],
                vec!["price".to_string(), "close".to_string()],
            ],
            vec![
                ColumnData::Float64(vec![1.0, 2.0]),
                ColumnData::Float64(vec![1.5, 2.5]),
            ],
        )
        .unwrap();
        write(&store, &[frame.clone()]).unwrap();

        let config = StoreConfig {
            columns_depth: 2,
            ..StoreConfig::default()
        };
        let back = store.read("wide", &config).unwrap();
        assert_eq!(back.columns_depth(), 2);
        assert_eq!(back, frame);

        let err = store.read("wide", &StoreConfig {
            columns_depth: 3,
            ..StoreConfig::default()
        });
        assert!(matches!(err, Err(StoreError::Schema { .. })));
    }

    #[test]
    fn test_dtype_override_and_index_depth_zero() {
        let (store, _temp_dir) = create_test_store();
        write(&store, &[frame_b()]).unwrap();

        let mut config = StoreConfig {
            index_depth: 0,
            ..StoreConfig::default()
        };
        config.dtypes.insert("x".to_string(), DType::Float64);
        let back = store.read("b", &config).unwrap();
        assert_eq!(back.shape(), (2, 3));
        assert!(back
            .column("x")
            .unwrap()
            .equals(&ColumnData::Float64(vec![1.0, 2.0])));
        assert_eq!(back.column("y").unwrap().dtype(), DType::Int64);

        let err = store.read("b", &StoreConfig {
            index_depth: 4,
            ..StoreConfig::default()
        });
        assert!(matches!(err, Err(StoreError::Schema { .. })));
    }

    #[test]
    fn test_boolean_decoding_compares_against_one() {
        let (store, _temp_dir) = create_test_store();
        let conn = Connection::open(store.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE flags (k INTEGER PRIMARY KEY, v BOOLEAN);
             INSERT INTO flags VALUES (0, 1), (1, 0), (2, '1'), (3, 'yes'), (4, NULL);",
        )
        .unwrap();
        drop(conn);

        let frame = store.read("flags", &StoreConfig::default()).unwrap();
        assert!(frame.column("v").unwrap().equals(&ColumnData::Object(vec![
            Value::Bool(true),
            Value::Bool(false),
            Value::Bool(true),
            Value::Bool(false),
            Value::Null,
        ])));
        assert_eq!(frame.index().names(), [Some("k".to_string())]);

        let conn = Connection::open(store.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE dense (k INTEGER PRIMARY KEY, v BOOLEAN);
             INSERT INTO dense VALUES (0, 1), (1, 'yes');",
        )
        .unwrap();
        drop(conn);
        let dense = store.read("dense", &StoreConfig::default()).unwrap();
        assert!(dense
            .column("v")
            .unwrap()
            .equals(&ColumnData::Bool(vec![true, false])));
    }

    #[test]
    fn test_object_and_text_columns() {
        let (store, _temp_dir) = create_test_store();
        let frame = Frame::from_columns([
            ("name", ColumnData::Str(vec!["x".into(), "y".into()])),
            (
                "mixed",
                ColumnData::Object(vec![Value::Int(1), Value::Str("two".into())]),
            ),
        ])
        .unwrap()
        .with_name("objects");
        write(&store, &[frame.clone()]).unwrap();

        let back = store.read("objects", &StoreConfig::default()).unwrap();
        assert_eq!(back.column("name").unwrap().dtype(), DType::Str);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_write_without_index_or_column_labels() {
        let (store, _temp_dir) = create_test_store();
        let config = StoreConfig {
            include_index: false,
            include_columns: false,
            index_depth: 0,
            ..StoreConfig::default()
        };
        store
            .write_frames(
                &[(Some("bare".to_string()), frame_b())],
                &StoreConfigMap::new(config.clone()),
            )
            .unwrap();
        let back = store.read("bare", &config).unwrap();
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.labels(), [vec!["__col0__".to_string()], vec!["__col1__".to_string()]]);
    }
}
