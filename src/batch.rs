use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, NullBuilder, RecordBatch,
    StringBuilder,
};
use csv::StringRecord;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    infer::{self, ColumnType, TableSchema},
};

#[derive(Debug)]
enum ColumnBuilder {
    Null(NullBuilder),
    Boolean(BooleanBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
}

impl ColumnBuilder {
    fn new(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Null => ColumnBuilder::Null(NullBuilder::new()),
            ColumnType::Boolean => ColumnBuilder::Boolean(BooleanBuilder::new()),
            ColumnType::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            ColumnType::Float64 => ColumnBuilder::Float64(Float64Builder::new()),
            ColumnType::Utf8 => ColumnBuilder::Utf8(StringBuilder::new()),
        }
    }

    fn column_type(&self) -> ColumnType {
        match self {
            ColumnBuilder::Null(_) => ColumnType::Null,
            ColumnBuilder::Boolean(_) => ColumnType::Boolean,
            ColumnBuilder::Int64(_) => ColumnType::Int64,
            ColumnBuilder::Float64(_) => ColumnType::Float64,
            ColumnBuilder::Utf8(_) => ColumnType::Utf8,
        }
    }

    /// Appends one cell, returning `false` if it does not fit the column type.
    fn append(&mut self, cell: &str) -> bool {
        if infer::is_null(cell) {
            match self {
                ColumnBuilder::Null(b) => b.append_null(),
                ColumnBuilder::Boolean(b) => b.append_null(),
                ColumnBuilder::Int64(b) => b.append_null(),
                ColumnBuilder::Float64(b) => b.append_null(),
                ColumnBuilder::Utf8(b) => b.append_null(),
            }
            return true;
        }

        match self {
            ColumnBuilder::Null(_) => return false,
            ColumnBuilder::Boolean(b) => match infer::parse_bool(cell) {
                Some(v) => b.append_value(v),
                None => return false,
            },
            ColumnBuilder::Int64(b) => match infer::parse_int(cell) {
                Some(v) => b.append_value(v),
                None => return false,
            },
            ColumnBuilder::Float64(b) => match infer::parse_float(cell) {
                Some(v) => b.append_value(v),
                None => return false,
            },
            ColumnBuilder::Utf8(b) => b.append_value(cell),
        }
        true
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Null(b) => Arc::new(b.finish()),
            ColumnBuilder::Boolean(b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(b) => Arc::new(b.finish()),
            ColumnBuilder::Utf8(b) => Arc::new(b.finish()),
        }
    }
}

/// Accumulates CSV records into a [`RecordBatch`] of a fixed schema.
#[derive(Debug)]
pub struct BatchBuilder {
    schema: TableSchema,
    columns: Vec<ColumnBuilder>,
}

impl BatchBuilder {
    pub fn new(schema: &TableSchema) -> Self {
        BatchBuilder {
            schema: schema.clone(),
            columns: schema.types().map(ColumnBuilder::new).collect(),
        }
    }

    pub fn append(&mut self, record: &StringRecord) -> Result<()> {
        for ((column, cell), (name, _)) in self
            .columns
            .iter_mut()
            .zip(record.iter())
            .zip(self.schema.columns())
        {
            if !column.append(cell) {
                return Err(Error::InvalidCell {
                    column: name.clone(),
                    expected: column.column_type(),
                    value: cell.to_string(),
                    line: record.position().map_or(0, |p| p.line()),
                });
            }
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = self.columns.iter_mut().map(ColumnBuilder::finish).collect();
        Ok(RecordBatch::try_new(self.schema.to_arrow(), arrays)?)
    }
}

/// Builds one batch from `records`, decoding every cell with `schema`.
pub fn records_to_batch(schema: &TableSchema, records: &[StringRecord]) -> Result<RecordBatch> {
    let mut builder = BatchBuilder::new(schema);
    for record in records {
        builder.append(record)?;
    }
    builder.finish()
}
