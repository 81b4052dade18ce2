use clap::Parser;
use tracing_subscriber::EnvFilter;

mod batch;
mod cli;
mod convert;
mod error;
mod infer;
mod reader;
mod writer;

use convert::ConvertOptions;
use writer::Codec;

fn run(cli: &cli::Cli) -> error::Result<()> {
    let codec: Codec = cli.compression.parse()?;
    let options = ConvertOptions::new()
        .with_codec(codec)
        .with_chunk_size(cli.chunksize);
    convert::convert_to_parquet(&cli.input_csv, &cli.output_parquet, &options)?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
