//! Table reshaping on a polars [`DataFrame`].
//!
//! Remote tables arrive as loosely typed JSON records. Each column gets the
//! narrowest polars type that holds all of its values; columns mixing kinds
//! (or holding lists and objects) are kept as JSON text and cannot be sorted.

use crate::client::Record;
use polars::prelude::*;
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column {column} cannot be sorted: {reason}")]
    Unsortable { column: String, reason: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    df: DataFrame,
    // columns stored as JSON text
    mixed: HashSet<String>,
}

impl Frame {
    /// Columns are the union of record keys in first-seen order; a record
    /// without a key contributes `null` to that column.
    pub fn from_records(records: Vec<Record>) -> Result<Self, FrameError> {
        let mut names: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<Value>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, record) in records.into_iter().enumerate() {
            for (key, value) in record {
                let position = *index.entry(key).or_insert_with_key(|key| {
                    names.push(key.clone());
                    cells.push(vec![Value::Null; row]);
                    cells.len() - 1
                });
                cells[position].push(value);
            }
            for column in &mut cells {
                if column.len() == row {
                    column.push(Value::Null);
                }
            }
        }

        let mut mixed = HashSet::new();
        let columns: Vec<Column> = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let kind = CellKind::infer(&values);
                let column = kind.column(&name, &values);
                if kind == CellKind::Mixed {
                    mixed.insert(name);
                }
                column
            })
            .collect();

        Ok(Self {
            df: DataFrame::new(columns)?,
            mixed,
        })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Values of one column, back as JSON.
    pub fn values(&self, name: &str) -> Result<Vec<Value>, FrameError> {
        if !self.contains(name) {
            return Err(FrameError::ColumnNotFound(name.to_owned()));
        }
        self.column_values(self.df.column(name)?)
    }

    /// Remove a column if present. Returns whether anything was removed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.mixed.remove(name);
        self.df.drop_in_place(name).is_ok()
    }

    /// Keep exactly `names`, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, FrameError> {
        let mut seen = HashSet::new();
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(FrameError::ColumnNotFound(name.to_owned()));
            }
            if !seen.insert(name) {
                return Err(FrameError::DuplicateColumn(name.to_owned()));
            }
        }

        let df = self.df.select(names.iter().map(|name| name.as_ref()))?;
        let mixed = self
            .mixed
            .iter()
            .filter(|name| seen.contains(name.as_str()))
            .cloned()
            .collect();
        Ok(Self { df, mixed })
    }

    /// Stable ascending sort by one column. Nulls go last.
    pub fn sort_by(&mut self, name: &str) -> Result<(), FrameError> {
        if !self.contains(name) {
            return Err(FrameError::ColumnNotFound(name.to_owned()));
        }
        if self.mixed.contains(name) {
            return Err(FrameError::Unsortable {
                column: name.to_owned(),
                reason: "values of different kinds are not comparable".to_owned(),
            });
        }

        self.df = self.df.sort(
            [name],
            SortMultipleOptions::default()
                .with_maintain_order(true)
                .with_nulls_last(true),
        )?;
        Ok(())
    }

    /// Rename columns found in `mapping`; others keep their name.
    pub fn rename(&mut self, mapping: &HashMap<String, String>) -> Result<(), FrameError> {
        let names = self
            .column_names()
            .into_iter()
            .map(|name| mapping.get(name).cloned().unwrap_or_else(|| name.to_owned()))
            .collect();
        self.set_names(names)
    }

    pub fn lowercase_names(&mut self) -> Result<(), FrameError> {
        let names = self
            .column_names()
            .into_iter()
            .map(str::to_lowercase)
            .collect();
        self.set_names(names)
    }

    fn set_names(&mut self, names: Vec<String>) -> Result<(), FrameError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(FrameError::DuplicateColumn(duplicate.clone()));
        }

        let mixed: HashSet<String> = self
            .column_names()
            .into_iter()
            .zip(&names)
            .filter(|(old, _)| self.mixed.contains(*old))
            .map(|(_, new)| new.clone())
            .collect();

        self.df.set_column_names(names.iter().map(String::as_str))?;
        self.mixed = mixed;
        Ok(())
    }

    /// One object per row.
    pub fn into_records(self) -> Result<Vec<Map<String, Value>>, FrameError> {
        let names: Vec<String> = self
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        Ok(self
            .into_rows()?
            .into_iter()
            .map(|row| names.iter().cloned().zip(row).collect())
            .collect())
    }

    /// One positional list per row, in column order.
    pub fn into_rows(self) -> Result<Vec<Vec<Value>>, FrameError> {
        let mut columns = self
            .df
            .get_columns()
            .iter()
            .map(|column| self.column_values(column).map(Vec::into_iter))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((0..self.df.height())
            .map(|_| {
                columns
                    .iter_mut()
                    .map(|values| values.next().unwrap_or(Value::Null))
                    .collect()
            })
            .collect())
    }

    fn column_values(&self, column: &Column) -> Result<Vec<Value>, FrameError> {
        let series = column.as_materialized_series();
        let values: Vec<Value> = match series.dtype() {
            DataType::Boolean => series
                .bool()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Bool))
                .collect(),
            DataType::Int64 => series
                .i64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::from))
                .collect(),
            DataType::Float64 => series
                .f64()?
                .into_iter()
                .map(|v| v.and_then(Number::from_f64).map_or(Value::Null, Value::Number))
                .collect(),
            DataType::String if self.mixed.contains(column.name().as_str()) => series
                .str()?
                .into_iter()
                .map(|v| {
                    v.and_then(|text| serde_json::from_str(text).ok())
                        .unwrap_or(Value::Null)
                })
                .collect(),
            DataType::String => text_values(series)?,
            _ => text_values(&series.cast(&DataType::String)?)?,
        };
        Ok(values)
    }
}

fn text_values(series: &Series) -> Result<Vec<Value>, FrameError> {
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map_or(Value::Null, |text| Value::String(text.to_owned())))
        .collect())
}

/// Storage kind of a column, from the JSON values it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Empty,
    Bool,
    Int,
    Float,
    Text,
    Mixed,
}

impl CellKind {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Number(n) if n.is_i64() => Some(Self::Int),
            Value::Number(_) => Some(Self::Float),
            Value::String(_) => Some(Self::Text),
            Value::Array(_) | Value::Object(_) => Some(Self::Mixed),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Mixed,
        }
    }

    fn infer(values: &[Value]) -> Self {
        values
            .iter()
            .filter_map(Self::of)
            .reduce(Self::merge)
            .unwrap_or(Self::Empty)
    }

    fn column(self, name: &str, values: &[Value]) -> Column {
        let name = PlSmallStr::from(name);
        let series = match self {
            Self::Bool => Series::new(name, values.iter().map(Value::as_bool).collect::<Vec<_>>()),
            Self::Int => Series::new(name, values.iter().map(Value::as_i64).collect::<Vec<_>>()),
            Self::Float => Series::new(name, values.iter().map(Value::as_f64).collect::<Vec<_>>()),
            Self::Text | Self::Empty => Series::new(
                name,
                values.iter().map(Value::as_str).collect::<Vec<Option<&str>>>(),
            ),
            Self::Mixed => Series::new(
                name,
                values
                    .iter()
                    .map(|v| (!v.is_null()).then(|| v.to_string()))
                    .collect::<Vec<Option<String>>>(),
            ),
        };
        series.into_column()
    }
}
