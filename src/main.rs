use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use pclm_convert::color::ProfileSignature;
use pclm_convert::config::DeviceProfile;
use pclm_convert::pipeline::{RunConfig, run};
use pclm_convert::raster::RasterReader;

struct CliArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    device: Option<PathBuf>,
    profile: Option<PathBuf>,
}

fn usage() {
    eprintln!("Usage: pclm_convert [OPTIONS] [RASTER_FILE]");
    eprintln!("  Convert a raster page stream to a PCLm document.");
    eprintln!();
    eprintln!("  Reads from stdin when no RASTER_FILE is given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <PATH>   Write the document to PATH (default: stdout)");
    eprintln!("      --device <PATH>   Device capability YAML file");
    eprintln!("      --profile <PATH>  Color profile whose signature drives conversion");
    eprintln!("  -h, --help            Show this help");
    eprintln!("  -V, --version         Show version");
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        input: None,
        output: None,
        device: None,
        profile: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let value = iter.next().ok_or(format!("{arg} requires a path"))?;
                parsed.output = Some(PathBuf::from(value));
            }
            "--device" => {
                let value = iter.next().ok_or(format!("{arg} requires a path"))?;
                parsed.device = Some(PathBuf::from(value));
            }
            "--profile" => {
                let value = iter.next().ok_or(format!("{arg} requires a path"))?;
                parsed.profile = Some(PathBuf::from(value));
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            _ => {
                if parsed.input.is_some() {
                    return Err("more than one input file given".to_string());
                }
                parsed.input = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(parsed)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("pclm_convert {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match parse_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            usage();
            return ExitCode::FAILURE;
        }
    };

    let device = match &cli.device {
        Some(path) => match DeviceProfile::from_file(path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("ERROR: Failed to load device profile {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => DeviceProfile::default(),
    };

    // An unusable profile signature disables color management but does not
    // stop the run.
    let profile = match &cli.profile {
        Some(path) => match load_profile_signature(path) {
            Ok(Some(signature)) => Some(signature),
            Ok(None) => None,
            Err(e) => {
                eprintln!("ERROR: Failed to load color profile {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let config = RunConfig { device, profile };

    let summary = match cli.input {
        Some(path) => {
            let file = match std::fs::File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("ERROR: Unable to open raster file {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            };
            convert(BufReader::new(file), &config)
        }
        None => convert(BufReader::new(std::io::stdin().lock()), &config),
    };

    let summary = match summary {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(document) = summary.document else {
        eprintln!("ERROR: No pages were read from the raster stream");
        return ExitCode::FAILURE;
    };

    let written = match &cli.output {
        Some(path) => std::fs::write(path, &document),
        None => std::io::stdout().lock().write_all(&document),
    };
    if let Err(e) = written {
        eprintln!("ERROR: Failed to write output document: {e}");
        return ExitCode::FAILURE;
    }

    eprintln!("OK: {} pages written", summary.pages);
    ExitCode::SUCCESS
}

fn convert<R: Read>(
    input: R,
    config: &RunConfig,
) -> pclm_convert::error::Result<pclm_convert::pipeline::RunSummary> {
    let mut source = RasterReader::new(input)?;
    run(&mut source, config)
}

/// Read the declared color space signature from an ICC profile file.
/// Non-actionable signatures disable color management with a diagnostic.
fn load_profile_signature(
    path: &std::path::Path,
) -> pclm_convert::error::Result<Option<ProfileSignature>> {
    let bytes = std::fs::read(path)?;
    let signature = ProfileSignature::from_icc_bytes(&bytes)?;
    if signature.is_actionable() {
        Ok(Some(signature))
    } else {
        warn!(
            ?signature,
            "color profile signature not usable, color management disabled"
        );
        Ok(None)
    }
}
