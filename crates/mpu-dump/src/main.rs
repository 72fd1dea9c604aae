//! CLI entry point for the `mpu-dump` binary.
//!
//! Loads a captured MPU register snapshot and prints the region report. The
//! dump itself is compiled in only with the `regions-print` feature.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use mpu_inspect::{MpuRegisters, ReportConfig};
#[cfg(test)]
use tempfile as _;

mod snapshot;

use snapshot::Snapshot;

const USAGE_TEXT: &str = "\
Usage: mpu-dump <snapshot.json> [options]

Options:
  --delay-ms <n>  Pause after each region in milliseconds (default: 100)
  --json          Print decoded regions as JSON instead of the text report
  -h, --help      Show this help message

Set RUST_LOG=debug for decode diagnostics on stderr.

Examples:
  mpu-dump board.json
  mpu-dump board.json --delay-ms 0
  mpu-dump board.json --json
";

#[derive(Debug, PartialEq, Eq)]
struct DumpArgs {
    input: PathBuf,
    config: ReportConfig,
    json: bool,
}

#[derive(Debug)]
enum ParseResult {
    Dump(DumpArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut input: Option<PathBuf> = None;
    let mut config = ReportConfig::default();
    let mut json = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--json" {
            json = true;
            continue;
        }

        if arg == "--delay-ms" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --delay-ms".to_string())?;
            let millis: u64 = value
                .to_string_lossy()
                .parse()
                .map_err(|_| format!("invalid delay: {}", value.to_string_lossy()))?;
            config = ReportConfig::with_pacing(Duration::from_millis(millis));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(ParseResult::Dump(DumpArgs {
        input,
        config,
        json,
    }))
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .try_init();
}

fn run(args: &DumpArgs) -> Result<(), i32> {
    let snapshot = Snapshot::load(&args.input).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    log::debug!(
        "loaded {} regions from {}",
        snapshot.mpu.region_count(),
        args.input.display()
    );

    if !args.json {
        println!(
            "MPU snapshot {} ({} regions)",
            args.input.display(),
            snapshot.mpu.region_count()
        );
    }

    #[cfg(feature = "regions-print")]
    dump::regions(&snapshot, args)?;
    #[cfg(not(feature = "regions-print"))]
    log::info!("region dump disabled at build time (feature `regions-print`)");

    Ok(())
}

#[cfg(feature = "regions-print")]
mod dump {
    use mpu_inspect::{MpuReport, ThreadSleep};

    use crate::snapshot::{memory_map, Snapshot};
    use crate::DumpArgs;

    pub fn regions(snapshot: &Snapshot, args: &DumpArgs) -> Result<(), i32> {
        let known_regions = snapshot.known_regions();
        let report = MpuReport::new(&snapshot.mpu)
            .with_memory_map(memory_map(known_regions.as_deref()))
            .with_config(args.config);

        if args.json {
            let text = serde_json::to_string_pretty(&report.summaries()).map_err(|e| {
                eprintln!("error: failed to encode report: {e}");
                1
            })?;
            println!("{text}");
            return Ok(());
        }

        report.print_to_stdout(&mut ThreadSleep).map_err(|e| {
            eprintln!("error: failed to write report: {e}");
            1
        })
    }
}

fn main() {
    init_logging();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Dump(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
