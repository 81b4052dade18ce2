//! Parquet output container.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
};

use arrow::{array::RecordBatch, datatypes::SchemaRef};
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression, GzipLevel},
    file::properties::WriterProperties,
};
use tracing::debug;

use crate::error::{Error, Result};

/// Compression codecs accepted for the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    None,
    #[default]
    Snappy,
    Gzip,
    Brotli,
}

impl Codec {
    pub fn compression(self) -> Compression {
        match self {
            Codec::None => Compression::UNCOMPRESSED,
            Codec::Snappy => Compression::SNAPPY,
            Codec::Gzip => Compression::GZIP(GzipLevel::default()),
            Codec::Brotli => Compression::BROTLI(BrotliLevel::default()),
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Codec::None),
            "snappy" => Ok(Codec::Snappy),
            "gzip" => Ok(Codec::Gzip),
            "brotli" => Ok(Codec::Brotli),
            _ => Err(Error::UnsupportedCompression(s.to_string())),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::None => "none",
            Codec::Snappy => "snappy",
            Codec::Gzip => "gzip",
            Codec::Brotli => "brotli",
        };
        f.write_str(name)
    }
}

/// A single parquet file receiving batches of one schema.
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    path: PathBuf,
    rows_written: usize,
}

impl ParquetSink {
    /// Creates (or truncates) `path` and writes the parquet header.
    pub fn create(path: &Path, schema: SchemaRef, codec: Codec) -> Result<Self> {
        let file = File::create(path).map_err(|source| Error::OutputAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let properties = WriterProperties::builder()
            .set_compression(codec.compression())
            .build();

        let writer = ArrowWriter::try_new(file, schema, Some(properties))?;

        Ok(ParquetSink {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        if batch.num_rows() == 0 {
            return Ok(());
        }
        self.writer.write(batch)?;
        self.rows_written += batch.num_rows();
        debug!(rows = batch.num_rows(), total = self.rows_written, "appended batch");
        Ok(())
    }

    /// Flushes buffered rows, writes the footer and closes the file.
    pub fn finish(self) -> Result<usize> {
        self.writer.close()?;
        debug!(path = %self.path.display(), rows = self.rows_written, "closed parquet file");
        Ok(self.rows_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::Int64Array,
        datatypes::{DataType, Field, Schema},
    };
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::sync::Arc;

    #[test]
    fn parses_supported_codecs() {
        assert_eq!("none".parse::<Codec>().unwrap(), Codec::None);
        assert_eq!("snappy".parse::<Codec>().unwrap(), Codec::Snappy);
        assert_eq!("GZIP".parse::<Codec>().unwrap(), Codec::Gzip);
        assert_eq!("Brotli".parse::<Codec>().unwrap(), Codec::Brotli);
        assert_eq!(Codec::default(), Codec::Snappy);
    }

    #[test]
    fn rejects_unknown_codecs() {
        for name in ["zstd-unknown", "lzo", ""] {
            assert!(matches!(
                name.parse::<Codec>(),
                Err(Error::UnsupportedCompression(_))
            ));
        }
    }

    #[test]
    fn writes_rows_with_codec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3]))],
        )
        .unwrap();

        let mut sink = ParquetSink::create(&path, schema, Codec::Gzip).unwrap();
        sink.write(&batch).unwrap();
        sink.write(&batch).unwrap();
        assert_eq!(sink.finish().unwrap(), 6);

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let metadata = reader.metadata();
        assert_eq!(metadata.file_metadata().num_rows(), 6);
        assert!(matches!(
            metadata.row_group(0).column(0).compression(),
            Compression::GZIP(_)
        ));
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
        assert!(matches!(
            ParquetSink::create(&path, schema, Codec::None),
            Err(Error::OutputAccess { .. })
        ));
    }
}
