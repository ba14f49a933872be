use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::Level;

use ballgown_counts::{CountColumn, IdLookup, MatrixLevel, PipelineOptions};

/// Build a DESeq2-ready count matrix from per-sample ballgown tables.
#[derive(Parser, Debug)]
#[command(name = "ballgown-counts")]
#[command(author, version, about)]
struct Cli {
    /// Reference annotation shared by all samples (.gtf, optionally .gz)
    annotation: PathBuf,

    /// Directory holding one sub-directory of ctab files per sample
    sample_root: PathBuf,

    /// Output TSV matrix
    output: PathBuf,

    /// Row granularity of the matrix
    #[arg(long, value_enum, default_value_t = LevelArg::Transcript)]
    level: LevelArg,

    /// e_data.ctab column that holds the exon count
    #[arg(long, value_enum, default_value_t = CountColumnArg::Ucount)]
    count_column: CountColumnArg,

    /// Find the transcript id by this attribute key instead of taking the
    /// second attribute field
    #[arg(long = "transcript-id-key", value_name = "KEY")]
    transcript_id_key: Option<String>,

    /// Log per-sample details
    #[arg(long, short)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LevelArg {
    Transcript,
    Gene,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CountColumnArg {
    Rcount,
    Ucount,
    Mrcount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::Debug } else { Level::Info };
    simple_logger::init_with_level(level).context("initialise logger")?;

    let opts = PipelineOptions::new()
        .level(match cli.level {
            LevelArg::Transcript => MatrixLevel::Transcript,
            LevelArg::Gene => MatrixLevel::Gene,
        })
        .count_column(match cli.count_column {
            CountColumnArg::Rcount => CountColumn::Rcount,
            CountColumnArg::Ucount => CountColumn::Ucount,
            CountColumnArg::Mrcount => CountColumn::Mrcount,
        })
        .id_lookup(match cli.transcript_id_key {
            Some(key) => IdLookup::ByKey(key),
            None => IdLookup::default(),
        });

    let annotation = std::path::absolute(&cli.annotation)
        .with_context(|| format!("resolve {}", cli.annotation.display()))?;
    let sample_root = std::path::absolute(&cli.sample_root)
        .with_context(|| format!("resolve {}", cli.sample_root.display()))?;

    println!("GTF = {}", annotation.display());
    println!("Target Dir = {}", sample_root.display());

    let matrix = ballgown_counts::run(&annotation, &sample_root, &cli.output, &opts)
        .with_context(|| format!("building count matrix from {}", sample_root.display()))?;

    let written = std::path::absolute(&cli.output).unwrap_or_else(|_| cli.output.clone());
    log::info!(
        "{} rows x {} samples",
        matrix.n_rows(),
        matrix.samples().len()
    );
    eprintln!("DESeq2 file written to {}", written.display());

    Ok(())
}
