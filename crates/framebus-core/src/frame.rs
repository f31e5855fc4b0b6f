//! Immutable named tables.
//!
//! A [`Frame`] is the unit the bus caches and the stores persist. It owns an
//! [`Index`] of one or more levels, a list of column labels (each label has
//! `columns_depth` parts), and one [`ColumnData`] per column. Column buffers
//! are reference counted: cloning a frame is cheap and the clone reports the
//! same [`Frame::mloc`] identifiers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Bool,
    Int64,
    Float64,
    Str,
    Object,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Str => "str",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Equality that treats two NaN floats as equal.
    fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
            _ => self == other,
        }
    }

    fn cast_error(&self, dtype: DType) -> FrameError {
        FrameError::Cast {
            value: self.to_string(),
            dtype: dtype.to_string(),
        }
    }

    fn to_bool(&self) -> FrameResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) if !f.is_nan() => Ok(*f != 0.0),
            Value::Str(s) => match s.as_str() {
                "true" | "True" | "1" => Ok(true),
                "false" | "False" | "0" => Ok(false),
                _ => Err(self.cast_error(DType::Bool)),
            },
            _ => Err(self.cast_error(DType::Bool)),
        }
    }

    fn to_int(&self) -> FrameResult<i64> {
        match self {
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Int(i) => Ok(*i),
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Ok(*f as i64)
            }
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.cast_error(DType::Int64)),
            _ => Err(self.cast_error(DType::Int64)),
        }
    }

    fn to_float(&self) -> FrameResult<f64> {
        match self {
            Value::Null => Ok(f64::NAN),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.cast_error(DType::Float64)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Typed column buffer.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    /// Missing values are NaN.
    Float64(Vec<f64>),
    Str(Vec<String>),
    Object(Vec<Value>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::Int64(_) => DType::Int64,
            Self::Float64(_) => DType::Float64,
            Self::Str(_) => DType::Str,
            Self::Object(_) => DType::Object,
        }
    }

    /// Cell at `row` as a [`Value`]; `None` past the end.
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            Self::Bool(v) => v.get(row).map(|b| Value::Bool(*b)),
            Self::Int64(v) => v.get(row).map(|i| Value::Int(*i)),
            Self::Float64(v) => v.get(row).map(|x| Value::Float(*x)),
            Self::Str(v) => v.get(row).map(|s| Value::Str(s.clone())),
            Self::Object(v) => v.get(row).cloned(),
        }
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|row| self.get(row)).collect()
    }

    /// Approximate heap footprint of the buffer in bytes.
    pub fn nbytes(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int64(v) => v.len() * std::mem::size_of::<i64>(),
            Self::Float64(v) => v.len() * std::mem::size_of::<f64>(),
            Self::Str(v) => v
                .iter()
                .map(|s| s.len() + std::mem::size_of::<String>())
                .sum(),
            Self::Object(v) => v
                .iter()
                .map(|value| {
                    std::mem::size_of::<Value>()
                        + match value {
                            Value::Str(s) => s.len(),
                            _ => 0,
                        }
                })
                .sum(),
        }
    }

    /// Build a column of `dtype` from loose values.
    pub fn from_values(dtype: DType, values: Vec<Value>) -> FrameResult<Self> {
        Ok(match dtype {
            DType::Bool => Self::Bool(
                values
                    .iter()
                    .map(Value::to_bool)
                    .collect::<FrameResult<_>>()?,
            ),
            DType::Int64 => Self::Int64(
                values
                    .iter()
                    .map(Value::to_int)
                    .collect::<FrameResult<_>>()?,
            ),
            DType::Float64 => Self::Float64(
                values
                    .iter()
                    .map(Value::to_float)
                    .collect::<FrameResult<_>>()?,
            ),
            DType::Str => Self::Str(values.iter().map(ToString::to_string).collect()),
            DType::Object => Self::Object(values),
        })
    }

    /// Convert to another dtype.
    pub fn astype(&self, dtype: DType) -> FrameResult<Self> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        Self::from_values(dtype, self.values())
    }

    /// Structural equality; NaN equals NaN.
    pub fn equals(&self, other: &ColumnData) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float64(a), Self::Float64(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| float_eq(*x, *y))
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            _ => false,
        }
    }
}

/// Row labels of a frame, one or more levels deep.
#[derive(Debug, Clone)]
pub struct Index {
    names: Vec<Option<String>>,
    levels: Vec<Arc<ColumnData>>,
}

impl Index {
    /// Single unnamed level `0..len`.
    pub fn positional(len: usize) -> Self {
        Self {
            names: vec![None],
            levels: vec![Arc::new(ColumnData::Int64((0..len as i64).collect()))],
        }
    }

    /// Build from named levels of equal length.
    pub fn from_levels(levels: Vec<(Option<String>, ColumnData)>) -> FrameResult<Self> {
        let Some(first) = levels.first() else {
            return Err(FrameError::InvalidShape {
                message: "index needs at least one level".to_string(),
            });
        };
        let len = first.1.len();
        for (i, (name, level)) in levels.iter().enumerate() {
            if level.len() != len {
                return Err(FrameError::LengthMismatch {
                    column: name.clone().unwrap_or_else(|| format!("index level {}", i)),
                    expected: len,
                    actual: level.len(),
                });
            }
        }
        let (names, levels) = levels
            .into_iter()
            .map(|(name, level)| (name, Arc::new(level)))
            .unzip();
        Ok(Self { names, levels })
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn len(&self) -> usize {
        self.levels.first().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn level(&self, depth: usize) -> Option<&ColumnData> {
        self.levels.get(depth).map(|l| l.as_ref())
    }

    pub fn levels(&self) -> impl Iterator<Item = &ColumnData> {
        self.levels.iter().map(|l| l.as_ref())
    }

    pub fn nbytes(&self) -> usize {
        self.levels.iter().map(|l| l.nbytes()).sum()
    }

    pub fn equals(&self, other: &Index) -> bool {
        self.names == other.names
            && self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.equals(b))
    }
}

/// An immutable named table.
#[derive(Debug, Clone)]
pub struct Frame {
    name: Option<String>,
    index: Index,
    columns_depth: usize,
    labels: Vec<Vec<String>>,
    data: Vec<Arc<ColumnData>>,
}

impl Frame {
    /// Frame with single-level column labels and a positional index.
    pub fn from_columns<I, S>(columns: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = (S, ColumnData)>,
        S: Into<String>,
    {
        let (labels, data): (Vec<Vec<String>>, Vec<ColumnData>) = columns
            .into_iter()
            .map(|(label, column)| (vec![label.into()], column))
            .unzip();
        let rows = data.first().map(ColumnData::len).unwrap_or(0);
        Self::from_parts(None, Index::positional(rows), labels, data)
    }

    /// Frame from every part; labels must all have the same non-zero depth.
    pub fn from_parts(
        name: Option<String>,
        index: Index,
        labels: Vec<Vec<String>>,
        data: Vec<ColumnData>,
    ) -> FrameResult<Self> {
        if labels.len() != data.len() {
            return Err(FrameError::InvalidShape {
                message: format!("{} labels for {} columns", labels.len(), data.len()),
            });
        }
        let columns_depth = labels.first().map(Vec::len).unwrap_or(1);
        if columns_depth == 0 || labels.iter().any(|l| l.len() != columns_depth) {
            return Err(FrameError::InvalidShape {
                message: "column labels must share one non-zero depth".to_string(),
            });
        }
        let rows = index.len();
        for (label, column) in labels.iter().zip(&data) {
            if column.len() != rows {
                return Err(FrameError::LengthMismatch {
                    column: label.join("/"),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            name,
            index,
            columns_depth,
            labels,
            data: data.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the index; its length must match the row count.
    pub fn with_index(mut self, index: Index) -> FrameResult<Self> {
        if index.len() != self.rows() {
            return Err(FrameError::LengthMismatch {
                column: "index".to_string(),
                expected: self.rows(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn rows(&self) -> usize {
        self.index.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.data.len())
    }

    pub fn size(&self) -> usize {
        self.rows() * self.data.len()
    }

    pub fn columns_depth(&self) -> usize {
        self.columns_depth
    }

    pub fn labels(&self) -> &[Vec<String>] {
        &self.labels
    }

    pub fn column_at(&self, position: usize) -> Option<&ColumnData> {
        self.data.get(position).map(|c| c.as_ref())
    }

    /// Column whose (first-level) label is `label`.
    pub fn column(&self, label: &str) -> Option<&ColumnData> {
        self.labels
            .iter()
            .position(|l| l.first().map(String::as_str) == Some(label))
            .and_then(|i| self.column_at(i))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&[String], &ColumnData)> {
        self.labels
            .iter()
            .zip(&self.data)
            .map(|(l, c)| (l.as_slice(), c.as_ref()))
    }

    pub fn dtypes(&self) -> Vec<(Vec<String>, DType)> {
        self.columns()
            .map(|(label, column)| (label.to_vec(), column.dtype()))
            .collect()
    }

    /// Bytes held by index levels and data columns.
    pub fn nbytes(&self) -> usize {
        self.index.nbytes() + self.data.iter().map(|c| c.nbytes()).sum::<usize>()
    }

    /// Memory-location identifier of each data column buffer.
    pub fn mloc(&self) -> Vec<usize> {
        self.data
            .iter()
            .map(|c| Arc::as_ptr(c) as *const () as usize)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn column_refs(&self) -> Vec<std::sync::Weak<ColumnData>> {
        self.data.iter().map(Arc::downgrade).collect()
    }

    /// Row values in field order, index levels first when `include_index`.
    pub fn row_values(&self, row: usize, include_index: bool) -> Vec<Value> {
        let index = self
            .index
            .levels()
            .filter(|_| include_index)
            .filter_map(|level| level.get(row));
        let data = self.data.iter().filter_map(|c| c.get(row));
        index.chain(data).collect()
    }

    /// Structural equality of index, labels and cells; the name is ignored.
    pub fn equals(&self, other: &Frame) -> bool {
        self.columns_depth == other.columns_depth
            && self.labels == other.labels
            && self.index.equals(&other.index)
            && self.data.len() == other.data.len()
            && self.data.iter().zip(&other.data).all(|(a, b)| a.equals(b))
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.equals(other)
    }
}
