use std::collections::HashMap;

use crate::nav::{Bounds, Coordinate};

use super::column::ColumnDef;
use super::value::CellValue;

/// A row maps column keys to raw values
pub type Row = HashMap<String, CellValue>;

/// Column definitions plus the rows they describe
#[derive(Debug, Clone)]
pub struct Grid {
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
}

impl Grid {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Navigation bounds, or None when there is no cell to focus
    pub fn bounds(&self) -> Option<Bounds> {
        if self.is_empty() {
            None
        } else {
            Some(Bounds::new(self.row_count(), self.col_count()))
        }
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        at.row < self.row_count() && at.col < self.col_count()
    }

    pub fn column(&self, col: usize) -> Option<&ColumnDef> {
        self.columns.get(col)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Value shown in a cell (accessor aware)
    pub fn display_value(&self, at: Coordinate) -> Option<CellValue> {
        let column = self.column(at.col)?;
        let row = self.row(at.row)?;
        Some(column.value_of(row))
    }

    /// Value a draft is seeded from: the stored value under the column key,
    /// coerced to the column kind
    pub fn committed_value(&self, at: Coordinate) -> Option<CellValue> {
        let column = self.column(at.col)?;
        let row = self.row(at.row)?;
        Some(
            row.get(&column.key)
                .map(|v| v.coerce(column.kind))
                .unwrap_or_else(|| CellValue::empty(column.kind)),
        )
    }

    /// Store a committed value, returning the previous one
    pub fn set_value(&mut self, at: Coordinate, value: CellValue) -> Option<CellValue> {
        let key = self.columns.get(at.col)?.key.clone();
        let row = self.rows.get_mut(at.row)?;
        let old = row.get(&key).cloned();
        row.insert(key, value);
        Some(old.unwrap_or_else(|| CellValue::empty(self.columns[at.col].kind)))
    }
}
