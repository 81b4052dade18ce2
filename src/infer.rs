//! Column type inference for CSV text.
//!
//! Every cell is classified on its own, then a column takes the least
//! upper bound of its cells:
//!
//! ```text
//!            String
//!           /      \
//!       Float     Boolean
//!         |          |
//!       Int64        |
//!           \       /
//!             Null
//! ```

use std::{fmt, sync::Arc};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use csv::StringRecord;

/// Tokens read as missing values, on top of the empty string.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Null,
    Boolean,
    Int64,
    Float64,
    Utf8,
}

impl ColumnType {
    /// Classifies a single cell.
    pub fn of_cell(cell: &str) -> Self {
        if is_null(cell) {
            ColumnType::Null
        } else if parse_bool(cell).is_some() {
            ColumnType::Boolean
        } else if parse_int(cell).is_some() {
            ColumnType::Int64
        } else if parse_float(cell).is_some() {
            ColumnType::Float64
        } else {
            ColumnType::Utf8
        }
    }

    /// Least upper bound of two types.
    pub fn merge(self, other: Self) -> Self {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, t) | (t, Null) => t,
            (Int64, Float64) | (Float64, Int64) => Float64,
            _ => Utf8,
        }
    }

    /// Whether every value of `other` can be stored in a column of `self`.
    pub fn accepts(self, other: Self) -> bool {
        self.merge(other) == self
    }

    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Null => DataType::Null,
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Null => "null",
            ColumnType::Boolean => "boolean",
            ColumnType::Int64 => "integer",
            ColumnType::Float64 => "float",
            ColumnType::Utf8 => "string",
        };
        f.write_str(name)
    }
}

pub fn is_null(cell: &str) -> bool {
    cell.is_empty() || NULL_TOKENS.contains(&cell)
}

pub fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

pub fn parse_int(cell: &str) -> Option<i64> {
    cell.trim().parse().ok()
}

pub fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse().ok()
}

/// Ordered column names and types shared by every batch of one container.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    columns: Vec<(String, ColumnType)>,
}

impl TableSchema {
    /// Infers a schema from the rows of one batch.
    ///
    /// Columns without any present value are typed [`ColumnType::Null`],
    /// so an empty `records` slice yields an all-null schema.
    pub fn infer(header: &[String], records: &[StringRecord]) -> Self {
        let mut types = vec![ColumnType::Null; header.len()];
        for record in records {
            for (ty, cell) in types.iter_mut().zip(record.iter()) {
                if *ty != ColumnType::Utf8 {
                    *ty = ty.merge(ColumnType::of_cell(cell));
                }
            }
        }

        TableSchema {
            columns: header.iter().cloned().zip(types).collect(),
        }
    }

    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    pub fn types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.columns.iter().map(|(_, ty)| *ty)
    }

    /// Returns the first column where `other` holds a type this schema
    /// cannot store, as `(name, ours, theirs)`.
    pub fn first_conflict(&self, other: &TableSchema) -> Option<(&str, ColumnType, ColumnType)> {
        self.columns
            .iter()
            .zip(other.columns.iter())
            .find(|((_, ours), (_, theirs))| !ours.accepts(*theirs))
            .map(|((name, ours), (_, theirs))| (name.as_str(), *ours, *theirs))
    }

    pub fn to_arrow(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|(name, ty)| Field::new(name, ty.data_type(), true))
            .collect();
        Arc::new(Schema::new(fields))
    }
}
