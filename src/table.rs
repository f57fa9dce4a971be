use serde::Serialize;
use std::cmp::Ordering;

use crate::cell::Cell;
use crate::record::{COLUMNS, NUMERIC_COLUMNS, SERIAL_COLUMN};

/// The record table as the UI and the store adapter see it
///
/// `columns` is always the canonical list; every row holds exactly one cell
/// per column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Default for Table {
    fn default() -> Self {
        Table::empty()
    }
}

impl Table {
    /// Empty table with the canonical columns
    pub fn empty() -> Self {
        Table {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from rows in canonical order, padding short rows with
    /// empty text and dropping cells past the last column
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(COLUMNS.len(), Cell::default());
                row
            })
            .collect();
        Table {
            rows,
            ..Table::empty()
        }
    }

    /// Turn raw sheet values (header row first) into a canonical table
    ///
    /// Compatibility shim for sheets whose header drifted: canonical columns
    /// missing from the stored header are synthesized empty, unknown columns
    /// are dropped and the result is reordered canonically. A header mismatch
    /// is never an error.
    pub fn reconcile_schema(values: Vec<Vec<String>>) -> Self {
        let mut values = values.into_iter();
        let header = match values.next() {
            Some(header) => header,
            None => return Table::empty(),
        };

        // For each canonical column, where it sits in the stored header.
        // Duplicate header names resolve to the first occurrence.
        let mapping: Vec<Option<usize>> = COLUMNS
            .iter()
            .map(|name| header.iter().position(|h| h == name))
            .collect();

        let rows = values
            .map(|row| {
                mapping
                    .iter()
                    .map(|idx| match idx.and_then(|i| row.get(i)) {
                        Some(value) => Cell::text(value.as_str()),
                        None => Cell::default(),
                    })
                    .collect()
            })
            .collect();

        Table {
            rows,
            ..Table::empty()
        }
    }

    /// Coerce the numeric columns, turning anything unparseable into `Missing`
    pub fn normalize(mut self) -> Self {
        let numeric: Vec<usize> = NUMERIC_COLUMNS
            .iter()
            .filter_map(|name| self.position(name))
            .collect();
        for row in &mut self.rows {
            for &idx in &numeric {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = cell.to_numeric();
                }
            }
        }
        self
    }

    /// Stable sort by serial, ascending; rows without a serial go last
    pub fn sort_by_serial(mut self) -> Self {
        let Some(idx) = self.position(SERIAL_COLUMN) else {
            return self;
        };
        if self.rows.is_empty() {
            return self;
        }
        self.rows.sort_by(|a, b| {
            let a = a.get(idx).and_then(Cell::as_number);
            let b = b.get(idx).and_then(Cell::as_number);
            match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        self
    }

    /// Serial suggested for the next record: integer part of the largest
    /// serial plus one, never below 1
    pub fn next_serial(&self) -> u32 {
        let Some(idx) = self.position(SERIAL_COLUMN) else {
            return 1;
        };
        let max = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(Cell::as_number))
            .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))));

        match max {
            Some(max) if max >= 1.0 && max < u32::MAX as f64 => max.trunc() as u32 + 1,
            _ => 1,
        }
    }

    /// Header plus all rows as plain strings, the store's wire format
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(COLUMNS.iter().map(|c| c.to_string()).collect());
        for row in &self.rows {
            values.push(row.iter().map(Cell::to_wire).collect());
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}
