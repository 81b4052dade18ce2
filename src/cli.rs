use std::{num::NonZeroUsize, path::PathBuf};

use clap::Parser;

#[derive(Parser)]
#[command(name = "csv2parquet")]
#[command(version)]
#[command(about = "Converts a CSV file into parquet.", long_about = None)]
pub struct Cli {
    /// CSV file with a header row
    #[arg(value_name = "INPUT CSV")]
    pub input_csv: PathBuf,

    /// Parquet file to write, overwritten if it exists
    #[arg(value_name = "OUTPUT PARQUET")]
    pub output_parquet: PathBuf,

    /// Parquet compression (snappy, gzip, brotli, none)
    #[arg(long, default_value = "snappy", value_name = "CODEC")]
    pub compression: String,

    /// Number of rows per chunk for streaming write
    #[arg(long, value_name = "N")]
    pub chunksize: Option<NonZeroUsize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_snappy_whole_file() {
        let cli = Cli::try_parse_from(["csv2parquet", "in.csv", "out.parquet"]).unwrap();
        assert_eq!(cli.input_csv, PathBuf::from("in.csv"));
        assert_eq!(cli.output_parquet, PathBuf::from("out.parquet"));
        assert_eq!(cli.compression, "snappy");
        assert!(cli.chunksize.is_none());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "csv2parquet",
            "in.csv",
            "out.parquet",
            "--compression",
            "gzip",
            "--chunksize",
            "100000",
        ])
        .unwrap();
        assert_eq!(cli.compression, "gzip");
        assert_eq!(cli.chunksize.map(NonZeroUsize::get), Some(100_000));
    }

    #[test]
    fn rejects_zero_chunksize() {
        let result =
            Cli::try_parse_from(["csv2parquet", "in.csv", "out.parquet", "--chunksize", "0"]);
        assert!(result.is_err());
    }
}
