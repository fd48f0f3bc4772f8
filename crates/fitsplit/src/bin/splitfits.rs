use clap::Parser;
use fitsplit::{combine_map, split_file, CombineReport, Config, KeywordMatch, SplitReport};
use std::path::PathBuf;
use std::process;
use tracing::Level;

/// Split FITS files into header/data parts, or reassemble them from a map.
#[derive(Parser, Debug)]
#[command(name = "splitfits", version)]
struct Cli {
    /// Directory where output files are written (created if absent)
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Reconstruct original files from .part_map files
    #[arg(short, long)]
    combine: bool,

    /// Match header keywords on the whole 8-byte keyword field
    #[arg(long)]
    strict_keywords: bool,

    /// Logging level
    #[arg(short, long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// FITS files to split, or map files to combine
    #[arg(required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Output of a run that got as far as processing inputs.
#[derive(Debug, Default)]
struct Outcome {
    output: String,
    failures: Vec<String>,
}

fn format_split(report: &SplitReport) -> String {
    let mut out = format!("{}:\n", report.source.display());
    for part in &report.parts {
        let range = format!("[{}, {})", part.segment.start, part.segment.stop);
        match &part.path {
            Some(path) => out.push_str(&format!(
                "  part_{:<4} {:<6} {:<24} {} ({} bytes)\n",
                part.number,
                part.kind,
                range,
                path.display(),
                part.segment.len()
            )),
            None => out.push_str(&format!(
                "  part_{:<4} {:<6} {:<24} skipped (empty)\n",
                part.number, part.kind, range
            )),
        }
    }
    out.push_str(&format!("  map: {}\n", report.map_path.display()));
    out
}

fn format_combine(report: &CombineReport) -> String {
    format!(
        "Writing: {} ({} parts, {} bytes)\n",
        report.output.display(),
        report.parts,
        report.bytes
    )
}

fn run(cli: &Cli) -> Result<Outcome, String> {
    fitsplit::naming::ensure_inputs_exist(&cli.inputs).map_err(|e| format!("{e}\nExiting..."))?;

    if let Some(dir) = &cli.outdir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("{}: cannot create output directory: {}", dir.display(), e))?;
    }

    let keyword_match = if cli.strict_keywords {
        KeywordMatch::Exact
    } else {
        KeywordMatch::Prefix
    };
    let config = Config {
        outdir: cli.outdir.clone(),
        keyword_match,
    };

    let mut outcome = Outcome::default();
    for input in &cli.inputs {
        let result = if cli.combine {
            combine_map(input, &config).map(|r| format_combine(&r))
        } else {
            split_file(input, &config).map(|r| format_split(&r))
        };
        match result {
            Ok(text) => outcome.output.push_str(&text),
            Err(e) => {
                let verb = if cli.combine { "combine" } else { "split" };
                outcome
                    .failures
                    .push(format!("{}: {} failed: {}", input.display(), verb, e));
            }
        }
    }
    Ok(outcome)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(outcome) => {
            print!("{}", outcome.output);
            for failure in &outcome.failures {
                eprintln!("{}", failure);
            }
            if !outcome.failures.is_empty() {
                process::exit(1);
            }
        }
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    }
}
