//! Command-line leaf-index predictor for LightGBM text models.
//!
//! Usage:
//!   lgbm-leaves --model model.txt --row "0,1,63733,1111,36112,0,0,1,1"
//!   lgbm-leaves --model model.txt --input rows.csv --output raw --threads 4
//!
//! Prints one JSON array per input row on stdout. Rows given with `--row`
//! come first, followed by the rows of `--input` (`-` reads stdin).

use std::io::{self, BufRead, BufReader, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use lgbm_leaves::data::parse_row;
use lgbm_leaves::{Error, GbdtModel, PredictConfig, PredictKind, Predictor};

#[derive(Parser)]
#[command(
    name = "lgbm-leaves",
    version,
    about = "Report the leaf reached in every tree of a LightGBM model"
)]
struct Cli {
    /// LightGBM text model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input row as delimited feature values (repeatable)
    #[arg(short, long = "row", value_name = "VALUES")]
    rows: Vec<String>,

    /// Delimited file with one row per line, `-` for stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Field delimiter for rows
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// What to print for each row
    #[arg(short, long, value_enum, default_value_t = OutputArg::Leaf)]
    output: OutputArg,

    /// Use only the first N boosting iterations
    #[arg(long, value_name = "N")]
    iterations: Option<usize>,

    /// Worker threads (1 = sequential)
    #[arg(short = 't', long, value_name = "N")]
    threads: Option<NonZeroUsize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    /// Leaf index per tree
    Leaf,
    /// Raw score per output group
    Raw,
    /// Score after the objective's transform
    Transformed,
}

impl From<OutputArg> for PredictKind {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Leaf => PredictKind::LeafIndex,
            OutputArg::Raw => PredictKind::Raw,
            OutputArg::Transformed => PredictKind::Transformed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "prediction failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let model = GbdtModel::from_lightgbm_file(&cli.model)?;
    tracing::debug!(
        model = %cli.model.display(),
        n_trees = model.n_trees(),
        n_features = model.meta().n_features,
        "model loaded"
    );

    let mut rows = Vec::with_capacity(cli.rows.len());
    for row in &cli.rows {
        rows.push(parse_row(row, cli.delimiter)?);
    }
    if let Some(path) = &cli.input {
        rows.extend(read_rows(path, cli.delimiter)?);
    }
    if rows.is_empty() {
        tracing::warn!("no input rows given, use --row or --input");
        return Ok(());
    }

    let config = PredictConfig::builder()
        .output(cli.output.into())
        .maybe_n_iterations(cli.iterations)
        .maybe_n_threads(cli.threads)
        .build()?;
    let predictions = Predictor::for_model(&model).with_config(config).predict(&rows)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let lines = predictions.to_json_rows().map_err(io::Error::other)?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Read non-blank lines of `path` as rows.
fn read_rows(path: &Path, delimiter: char) -> Result<Vec<Vec<f64>>, Error> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(std::fs::File::open(path)?))
    };

    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(&line, delimiter)?);
    }
    tracing::debug!(path = %path.display(), n_rows = rows.len(), "rows read");
    Ok(rows)
}
