//! Build a labelled RFI feature dataset from raw IQ captures

use std::path::{Path, PathBuf};

use clap::Parser;

use rfi_dsp::config::load_json_config;
use rfi_dsp::{build_dataset, combine_existing, CaptureFile, DatasetConfig, Label, RfiError, SampleFormat};

#[derive(Parser, Debug)]
#[command(name = "rfi-dataset")]
#[command(about = "Window IQ captures around their energy peak and build a combined feature CSV")]
struct Args {
    /// Labelled input as LABEL=PATH; a directory adds every file in it (repeatable)
    #[arg(short = 'l', long = "label", value_parser = parse_labelled_path, required = true)]
    inputs: Vec<(Label, PathBuf)>,

    /// Directory for per-capture chunk CSVs (must contain only CSV files)
    #[arg(short = 'o', long)]
    output_dir: PathBuf,

    /// Combined CSV output path
    #[arg(short = 'c', long)]
    combined: PathBuf,

    /// JSON dataset configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames of 1536 samples read per capture
    #[arg(short = 'r', long)]
    rows: Option<usize>,

    /// Maximum chunk CSVs per capture
    #[arg(long)]
    chunks: Option<usize>,

    /// Columns kept around the energy peak
    #[arg(short = 'w', long)]
    window: Option<usize>,

    /// Moving-average width for the energy profile
    #[arg(long)]
    smoothing: Option<usize>,

    /// Captures hold unsigned 16-bit values
    #[arg(long)]
    unsigned: bool,

    /// Worker threads (default: available parallelism)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-capture deadline in seconds
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Re-combine chunk CSVs from an earlier run instead of regenerating them
    #[arg(long)]
    from_csv: bool,
}

fn parse_labelled_path(s: &str) -> Result<(Label, PathBuf), String> {
    let (label, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PATH, got '{}'", s))?;
    let label = Label::parse(label).ok_or_else(|| format!("unknown label '{}'", label))?;
    Ok((label, PathBuf::from(path)))
}

fn expand(label: Label, path: &Path) -> Result<Vec<CaptureFile>, RfiError> {
    if !path.exists() {
        return Err(RfiError::MissingResource(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Ok(vec![CaptureFile::new(path, label)]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| RfiError::io(path, e))? {
        let entry = entry.map_err(|e| RfiError::io(path, e))?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files.into_iter().map(|p| CaptureFile::new(p, label)).collect())
}

fn run(args: Args) -> Result<(), RfiError> {
    let mut config: DatasetConfig = match &args.config {
        Some(path) => load_json_config(path)?,
        None => DatasetConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.max_rows = rows;
    }
    if let Some(chunks) = args.chunks {
        config.num_files_per_capture = chunks;
    }
    if let Some(window) = args.window {
        config.extraction.extraction_window = window;
    }
    if let Some(k) = args.smoothing {
        config.extraction.moving_avg_window = k;
    }
    if args.unsigned {
        config.sample_format = SampleFormat::U16;
    }
    if args.jobs.is_some() {
        config.workers = args.jobs;
    }
    if args.timeout_secs.is_some() {
        config.task_timeout_secs = args.timeout_secs;
    }

    let mut files = Vec::new();
    for (label, path) in &args.inputs {
        files.extend(expand(*label, path)?);
    }
    log::info!("{} capture files across {} inputs", files.len(), args.inputs.len());

    if args.from_csv {
        let rows = combine_existing(
            &files,
            config.num_files_per_capture,
            &args.output_dir,
            &args.combined,
        )?;
        eprintln!("Combined {} rows into {}", rows, args.combined.display());
        return Ok(());
    }

    let summary = build_dataset(&files, &args.output_dir, &args.combined, &config)?;
    eprintln!(
        "Wrote {} rows ({} chunks of {} samples) to {}",
        summary.rows_written,
        summary.csv_files.len(),
        summary.sample_count,
        args.combined.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("ERROR: {}", e);
        if let RfiError::BuildAborted { partial_files, .. } = &e {
            for f in partial_files {
                eprintln!("  partial: {}", f.display());
            }
        }
        std::process::exit(1);
    }
}
