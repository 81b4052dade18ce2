use std::{num::NonZeroUsize, path::Path};

use tracing::{info, warn};

use crate::{
    batch::records_to_batch,
    error::{Error, Result},
    infer::TableSchema,
    reader::CsvSource,
    writer::{Codec, ParquetSink},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub codec: Codec,
    /// Rows per batch. `None` loads the whole file before writing.
    pub chunk_size: Option<NonZeroUsize>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: Option<NonZeroUsize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertSummary {
    pub rows: usize,
    pub batches: usize,
    pub schema: TableSchema,
}

/// Converts the CSV file at `src` into a parquet file at `dst`.
///
/// `dst` is overwritten. If the run fails after `dst` was created, the file
/// is still closed, but its contents are partial and must be treated as
/// invalid output.
pub fn convert_to_parquet(
    src: &Path,
    dst: &Path,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    info!(
        src = %src.display(),
        dst = %dst.display(),
        codec = %options.codec,
        chunk_size = options.chunk_size.map(NonZeroUsize::get),
        "converting"
    );

    let summary = match options.chunk_size {
        None => convert_whole(src, dst, options.codec)?,
        Some(chunk_size) => convert_chunked(src, dst, options.codec, chunk_size)?,
    };

    info!(
        rows = summary.rows,
        batches = summary.batches,
        columns = summary.schema.columns().len(),
        "finished"
    );
    Ok(summary)
}

fn convert_whole(src: &Path, dst: &Path, codec: Codec) -> Result<ConvertSummary> {
    let mut source = CsvSource::open(src)?;
    let records = source.next_chunk(None)?.unwrap_or_default();
    let schema = TableSchema::infer(source.header(), &records);
    let batch = records_to_batch(&schema, &records)?;
    drop(records);

    let mut sink = ParquetSink::create(dst, schema.to_arrow(), codec)?;
    if let Err(err) = sink.write(&batch) {
        close_after_failure(sink);
        return Err(err);
    }
    let rows = sink.finish()?;

    Ok(ConvertSummary {
        rows,
        batches: 1,
        schema,
    })
}

fn convert_chunked(
    src: &Path,
    dst: &Path,
    codec: Codec,
    chunk_size: NonZeroUsize,
) -> Result<ConvertSummary> {
    let mut source = CsvSource::open(src)?;
    let mut output: Option<(TableSchema, ParquetSink)> = None;

    let batches = match append_chunks(&mut source, dst, codec, chunk_size, &mut output) {
        Ok(batches) => batches,
        Err(err) => {
            if let Some((_, sink)) = output {
                close_after_failure(sink);
            }
            return Err(err);
        }
    };

    // A header-only input still gets a container carrying the header.
    let (schema, sink) = match output {
        Some(output) => output,
        None => {
            let schema = TableSchema::infer(source.header(), &[]);
            let sink = ParquetSink::create(dst, schema.to_arrow(), codec)?;
            (schema, sink)
        }
    };
    let rows = sink.finish()?;

    Ok(ConvertSummary {
        rows,
        batches,
        schema,
    })
}

/// Appends every chunk of `source`, opening the sink on the first one.
/// Returns the number of batches appended.
fn append_chunks(
    source: &mut CsvSource,
    dst: &Path,
    codec: Codec,
    chunk_size: NonZeroUsize,
    output: &mut Option<(TableSchema, ParquetSink)>,
) -> Result<usize> {
    let mut batches = 0;

    while let Some(records) = source.next_chunk(Some(chunk_size))? {
        let inferred = TableSchema::infer(source.header(), &records);

        let (schema, sink) = match output {
            Some((schema, sink)) => {
                if let Some((column, expected, found)) = schema.first_conflict(&inferred) {
                    return Err(Error::SchemaMismatch {
                        batch: batches + 1,
                        column: column.to_string(),
                        expected,
                        found,
                    });
                }
                (&*schema, sink)
            }
            None => {
                let sink = ParquetSink::create(dst, inferred.to_arrow(), codec)?;
                let (schema, sink) = output.insert((inferred, sink));
                (&*schema, sink)
            }
        };

        let batch = records_to_batch(schema, &records)?;
        sink.write(&batch)?;
        batches += 1;
    }

    Ok(batches)
}

fn close_after_failure(sink: ParquetSink) {
    if let Err(err) = sink.finish() {
        warn!(error = %err, "failed to close parquet file after error");
    }
}
